//! Comment and docstring removal.
//!
//! Works line by line but carries string state across lines, so a `#` or a
//! triple quote inside a live multi-line literal is never mistaken for a
//! comment or a docstring.

/// Width of the leading whitespace of `line`. Tabs advance to the next
/// multiple of eight.
pub(crate) fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            '\x0c' => {}
            _ => break,
        }
    }
    width
}

/// An open string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quote {
    ch: char,
    triple: bool,
}

impl Quote {
    fn delimiter(self) -> &'static str {
        match (self.ch, self.triple) {
            ('"', true) => "\"\"\"",
            ('"', false) => "\"",
            (_, true) => "'''",
            (_, false) => "'",
        }
    }
}

/// A triple-quoted opener at the start of `text`, after a prefix of at
/// most two letters. Returns the quote and the offset just past it.
fn docstring_opener(text: &str) -> Option<(Quote, usize)> {
    let prefix = text
        .char_indices()
        .take_while(|(_, c)| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B'))
        .count();
    if prefix > 2 {
        return None;
    }
    let rest = &text[prefix..];
    for ch in ['"', '\''] {
        let quote = Quote { ch, triple: true };
        if rest.starts_with(quote.delimiter()) {
            return Some((quote, prefix + 3));
        }
    }
    None
}

/// Offset just past the closing `quote` in `text`, honoring escapes.
fn find_close(text: &str, quote: Quote) -> Option<usize> {
    let delimiter = quote.delimiter();
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if text[i..].starts_with(delimiter) {
            return Some(i + delimiter.len());
        }
    }
    None
}

/// What the code part of one line looked like.
struct LineScan {
    kept: String,
    /// A `#` comment was cut from the line.
    commented: bool,
    /// String still open at the end of the line.
    open: Option<Quote>,
    /// Bracket depth after the line.
    depth: usize,
}

/// Scan `line` starting inside `open` (if any), cutting a trailing comment.
fn scan_line(line: &str, mut open: Option<Quote>, mut depth: usize) -> LineScan {
    let mut kept = String::with_capacity(line.len());
    let mut commented = false;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(quote) = open {
            kept.push(c);
            if c == '\\' {
                if let Some((_, escaped)) = chars.next() {
                    kept.push(escaped);
                }
                continue;
            }
            if c == quote.ch && line[i..].starts_with(quote.delimiter()) {
                for _ in 1..quote.delimiter().len() {
                    if let Some((_, q)) = chars.next() {
                        kept.push(q);
                    }
                }
                open = None;
            }
            continue;
        }

        match c {
            '#' => {
                commented = true;
                break;
            }
            '"' | '\'' => {
                let triple = line[i..].starts_with(if c == '"' { "\"\"\"" } else { "'''" });
                kept.push(c);
                if triple {
                    for _ in 0..2 {
                        if let Some((_, q)) = chars.next() {
                            kept.push(q);
                        }
                    }
                }
                open = Some(Quote { ch: c, triple });
            }
            '(' | '[' | '{' => {
                depth += 1;
                kept.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                kept.push(c);
            }
            _ => kept.push(c),
        }
    }

    // Single-quoted literals never span lines.
    if matches!(open, Some(Quote { triple: false, .. })) {
        open = None;
    }
    if commented {
        kept.truncate(kept.trim_end().len());
    }
    LineScan {
        kept,
        commented,
        open,
        depth,
    }
}

fn is_header(code: &str) -> bool {
    let code = code.trim_start();
    code.starts_with("def ") || code.starts_with("async def ") || code.starts_with("class ")
}

/// Remove comments and docstrings from `source`.
///
/// A docstring is a triple-quoted literal that opens the first line of the
/// module or the first line of a definition body. Comment-only lines and
/// docstrings disappear with their line; blank lines stay, except at the
/// start and end of the text. Line endings are normalized to `\n`.
pub fn strip(source: &str) -> String {
    let normalized = source.replace("\r\n", "\n");
    let mut out: Vec<String> = Vec::new();

    let mut open: Option<Quote> = None;
    let mut skipping: Option<Quote> = None;
    let mut depth = 0usize;
    // Indentation a docstring must exceed to count; `None` once the
    // candidate line has passed.
    let mut docstring_after: Option<Option<usize>> = Some(None);
    let mut header_indent: Option<usize> = None;

    for line in normalized.split('\n') {
        if let Some(quote) = skipping {
            if find_close(line, quote).is_some() {
                skipping = None;
            }
            continue;
        }

        let live = open.is_some();
        if !live && line.trim().is_empty() {
            if !out.is_empty() {
                out.push(String::new());
            }
            continue;
        }

        if !live && line.trim_start().starts_with('#') {
            continue;
        }

        let indent = indent_width(line);
        if !live && depth == 0 {
            if let Some(min_indent) = docstring_after.take() {
                let deep_enough = min_indent.map_or(true, |min| indent > min);
                if deep_enough {
                    if let Some((quote, body)) = docstring_opener(line.trim_start()) {
                        let rest = &line.trim_start()[body..];
                        if find_close(rest, quote).is_none() {
                            skipping = Some(quote);
                        }
                        continue;
                    }
                }
            }
            if is_header(line) {
                header_indent = Some(indent);
            }
        }

        let scan = scan_line(line, open, depth);
        open = scan.open;
        depth = scan.depth;

        if scan.commented && !live && scan.kept.trim().is_empty() {
            continue;
        }

        if open.is_none() && depth == 0 {
            if let Some(header) = header_indent {
                if scan.kept.trim_end().ends_with(':') {
                    docstring_after = Some(Some(header));
                }
                header_indent = None;
            }
        }
        out.push(scan.kept);
    }

    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }
    let mut text = out.join("\n");
    if normalized.ends_with('\n') && !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 8);
        assert_eq!(indent_width("  \tx"), 8);
        assert_eq!(indent_width("x"), 0);
    }

    #[test]
    fn test_trailing_and_full_line_comments() {
        let source = "# header\nx = 1  # one\n# note\ny = 2\n";
        assert_eq!(strip(source), "x = 1\ny = 2\n");
    }

    #[test]
    fn test_hash_inside_string_kept() {
        assert_eq!(strip("tag = '#1'  # count"), "tag = '#1'");
        assert_eq!(strip("url = \"a#b\""), "url = \"a#b\"");
    }

    #[test]
    fn test_module_docstring() {
        let source = "\"\"\"Module docs.\n\nMore.\n\"\"\"\nimport os\n";
        assert_eq!(strip(source), "import os\n");
    }

    #[test]
    fn test_function_docstring_single_line() {
        let source = "def f(x):\n    \"\"\"Return x.\"\"\"\n    return x\n";
        assert_eq!(strip(source), "def f(x):\n    return x\n");
    }

    #[test]
    fn test_class_and_method_docstrings() {
        let source = "class A:\n    '''Doc.'''\n\n    def m(self):\n        r\"\"\"Raw\n        doc.\n        \"\"\"\n        return 1\n";
        assert_eq!(strip(source), "class A:\n\n    def m(self):\n        return 1\n");
    }

    #[test]
    fn test_string_statement_later_in_body_kept() {
        let source = "def f():\n    x = 1\n    \"\"\"not a docstring\"\"\"\n";
        assert_eq!(strip(source), source);
    }

    #[test]
    fn test_multiline_literal_keeps_hash() {
        let source = "text = \"\"\"\n# not a comment\n\"\"\"\n";
        assert_eq!(strip(source), source);
    }

    #[test]
    fn test_multiline_signature_docstring() {
        let source = "def f(\n    a,\n    b,\n):\n    \"\"\"Doc.\"\"\"\n    return a\n";
        assert_eq!(strip(source), "def f(\n    a,\n    b,\n):\n    return a\n");
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(strip("a = 1\r\nb = 2\r\n"), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_leading_blank_lines_dropped() {
        assert_eq!(strip("\n\n# c\n\nx = 1"), "x = 1");
    }
}
