//! String literal pieces: prefix, quotes, and f-string segments.

/// A string literal token split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal<'s> {
    pub prefix: &'s str,
    /// `'`, `"`, `'''` or `"""`.
    pub quote: &'s str,
    pub content: &'s str,
}

impl<'s> Literal<'s> {
    /// Split a complete token such as `rb'\d+'` or `f"""..."""`.
    /// Unterminated tokens keep whatever content they have.
    pub fn parse(token: &'s str) -> Option<Self> {
        let prefix_len = token
            .char_indices()
            .find(|(_, c)| !is_prefix_char(*c))
            .map_or(token.len(), |(i, _)| i);
        let (prefix, rest) = token.split_at(prefix_len);
        let quote = ["\"\"\"", "'''", "\"", "'"]
            .into_iter()
            .find(|q| rest.starts_with(q))?;
        let body = &rest[quote.len()..];
        let content = body.strip_suffix(quote).unwrap_or(body);
        Some(Self {
            prefix,
            quote,
            content,
        })
    }

    pub fn is_format(&self) -> bool {
        self.prefix.contains(|c| c == 'f' || c == 'F')
    }

    /// Reassemble with new content.
    pub fn render(&self, content: &str) -> String {
        format!("{}{}{}{}", self.prefix, self.quote, content, self.quote)
    }
}

pub fn is_prefix_char(c: char) -> bool {
    matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F')
}

/// Make `phrase` safe inside a literal delimited by `quote`.
pub fn escape_for(phrase: &str, quote: &str) -> String {
    let mut out = String::with_capacity(phrase.len());
    for c in phrase.chars() {
        if c == '\\' || quote.starts_with(c) {
            out.push('\\');
        }
        if quote.len() == 1 && c == '\n' {
            out.push_str("\\n");
            continue;
        }
        out.push(c);
    }
    out
}

/// One replacement field of an f-string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'s> {
    /// The expression before any conversion or format spec.
    pub expr: &'s str,
    /// `!r`, `:>10` and the like, kept verbatim.
    pub suffix: &'s str,
}

/// An f-string body split around its replacement fields.
/// `parts.len() == fields.len() + 1`; parts keep `{{`/`}}` escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString<'s> {
    pub parts: Vec<&'s str>,
    pub fields: Vec<Field<'s>>,
}

impl<'s> FormatString<'s> {
    pub fn split(content: &'s str) -> Self {
        let bytes = content.as_bytes();
        let mut parts = Vec::new();
        let mut fields = Vec::new();
        let mut part_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => i += 2,
                b'{' => {
                    parts.push(&content[part_start..i]);
                    let start = i + 1;
                    let end = field_end(content, start);
                    let (expr, suffix) = split_field(&content[start..end]);
                    fields.push(Field { expr, suffix });
                    i = (end + 1).min(bytes.len());
                    part_start = i;
                }
                _ => i += 1,
            }
        }
        parts.push(&content[part_start.min(content.len())..]);
        Self { parts, fields }
    }

    /// True when no part has visible text, as in `f"{a}{b}"`.
    pub fn is_all_fields(&self) -> bool {
        self.parts.iter().all(|p| p.trim().is_empty())
    }
}

/// Offset of the `}` closing a field that starts at `start`.
fn field_end(content: &str, start: usize) -> usize {
    let bytes = content.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'{' | b'[' | b'(' => depth += 1,
                b'}' | b']' | b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    bytes.len()
}

/// Split `name!r:>10` into the expression and its conversion/format suffix.
fn split_field(field: &str) -> (&str, &str) {
    let bytes = field.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'[' | b'(' | b'{' => depth += 1,
            b']' | b')' | b'}' => depth = depth.saturating_sub(1),
            b'!' if depth == 0 && bytes.get(i + 1) != Some(&b'=') => return field.split_at(i),
            b':' if depth == 0 => return field.split_at(i),
            _ => {}
        }
    }
    (field, "")
}

/// Spread the words of `phrase` over the parts that carry visible text,
/// keeping each part's surrounding whitespace. Whitespace-only parts are
/// returned unchanged.
pub fn distribute(phrase: &str, parts: &[&str]) -> Vec<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let slots: Vec<usize> = (0..parts.len())
        .filter(|&i| !parts[i].trim().is_empty())
        .collect();

    let mut out: Vec<String> = parts.iter().map(|p| (*p).to_string()).collect();
    let mut taken = 0;
    for (n, &slot) in slots.iter().enumerate() {
        let remaining_slots = slots.len() - n;
        let remaining_words = words.len() - taken;
        let take = if remaining_slots == 1 {
            remaining_words
        } else {
            remaining_words / remaining_slots
        };
        let chunk = words[taken..taken + take].join(" ");
        taken += take;

        let part = parts[slot];
        let lead = &part[..part.len() - part.trim_start().len()];
        let trail = &part[part.trim_end().len()..];
        out[slot] = format!("{lead}{chunk}{trail}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        let lit = Literal::parse("rb'abc'").unwrap();
        assert_eq!((lit.prefix, lit.quote, lit.content), ("rb", "'", "abc"));

        let lit = Literal::parse("f\"\"\"x\ny\"\"\"").unwrap();
        assert_eq!((lit.prefix, lit.quote, lit.content), ("f", "\"\"\"", "x\ny"));
        assert!(lit.is_format());

        assert_eq!(Literal::parse("\"\"").unwrap().content, "");
        assert!(Literal::parse("abc").is_none());
    }

    #[test]
    fn test_escape_for_quote() {
        assert_eq!(escape_for("it's", "'"), "it\\'s");
        assert_eq!(escape_for("it's", "\""), "it's");
        assert_eq!(escape_for("a\\b", "'"), "a\\\\b");
    }

    #[test]
    fn test_split_fields() {
        let fs = FormatString::split("Hello {name}, you are {age!r:>3} {{literal}}");
        assert_eq!(fs.parts, ["Hello ", ", you are ", " {{literal}}"]);
        assert_eq!(fs.fields[0], Field { expr: "name", suffix: "" });
        assert_eq!(fs.fields[1], Field { expr: "age", suffix: "!r:>3" });
    }

    #[test]
    fn test_split_nested_brackets_and_strings() {
        let fs = FormatString::split("{d['}']} and {f(a, {1: 2})}");
        assert_eq!(fs.fields[0].expr, "d['}']");
        assert_eq!(fs.fields[1].expr, "f(a, {1: 2})");
        assert_eq!(fs.parts, ["", " and ", ""]);
    }

    #[test]
    fn test_not_equal_is_not_conversion() {
        let fs = FormatString::split("{a != b}");
        assert_eq!(fs.fields[0], Field { expr: "a != b", suffix: "" });
    }

    #[test]
    fn test_all_fields() {
        assert!(FormatString::split("{a}{b}").is_all_fields());
        assert!(FormatString::split("{a} {b}").is_all_fields());
        assert!(!FormatString::split("{a}-{b}").is_all_fields());
    }

    #[test]
    fn test_distribute_over_visible_parts() {
        assert_eq!(distribute("Lorem Ipsum", &["Hello ", ""]), ["Lorem Ipsum ", ""]);
        assert_eq!(distribute("Lorem Ipsum", &["Hello ", ", welcome"]), ["Lorem ", "Ipsum"]);
        assert_eq!(
            distribute("Consectetur adipiscing elit", &["a", " ", "b"]),
            ["Consectetur", " ", "adipiscing elit"]
        );
    }
}
