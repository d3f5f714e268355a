//! Source location tracking.
//!
//! Every AST node carries a `Span`. Spans are only used for diagnostics
//! here, so line/column resolution is done lazily through `LineIndex`.

/// A byte range in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn empty(pos: u32) -> Self {
        Self { start: pos, end: pos }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start { self.start } else { other.start },
            end: if self.end > other.end { self.end } else { other.end },
        }
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        Self { line_starts }
    }

    /// Line and column of `offset`, both 1-based. The column counts
    /// characters, not bytes, so multi-byte text reports what an editor shows.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let start = self.line_starts[line] as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(start..end)
            .map_or(end.saturating_sub(start), |text| text.chars().count());
        (
            u32::try_from(line + 1).unwrap_or(u32::MAX),
            u32::try_from(column + 1).unwrap_or(u32::MAX),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 9);
        let b = Span::new(1, 6);
        assert_eq!(a.merge(b), Span::new(1, 9));
        assert_eq!(Span::empty(3).len(), 0);
    }

    #[test]
    fn test_line_col_is_one_based() {
        let source = "let a;\nlet b;\n  c";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(source, 0), (1, 1));
        assert_eq!(index.line_col(source, 7), (2, 1));
        assert_eq!(index.line_col(source, 16), (3, 3));
    }

    #[test]
    fn test_line_col_counts_chars() {
        let source = "\"héllo\" x";
        let index = LineIndex::new(source);
        let offset = u32::try_from(source.find('x').unwrap()).unwrap();
        assert_eq!(index.line_col(source, offset), (1, 9));
    }
}
