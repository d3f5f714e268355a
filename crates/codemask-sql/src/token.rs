//! SQL tokens.
//!
//! Whitespace and comments are tokens too, so the rewritten statement keeps
//! the input's layout.

/// Delimiters of a quoted identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// `"name"`
    Double,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl Wrap {
    pub fn apply(self, value: &str) -> String {
        match self {
            Wrap::Double => format!("\"{value}\""),
            Wrap::Backtick => format!("`{value}`"),
            Wrap::Bracket => format!("[{value}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare identifier or keyword.
    Word,
    Quoted(Wrap),
    /// `'text'`, with `''` escapes.
    String,
    Number,
    /// `?`, `$1`, `:name`, `@name`
    Placeholder,
    /// Punctuation and operators.
    Symbol,
    Whitespace,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    /// Byte offset in the source.
    pub offset: usize,
}

impl<'s> Token<'s> {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    /// Case-insensitive keyword match on a bare word.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(word)
    }

    /// The identifier this token spells, if any.
    pub fn ident(&self) -> Option<Ident<'s>> {
        match self.kind {
            TokenKind::Word => Some(Ident {
                value: self.text,
                wrap: None,
            }),
            TokenKind::Quoted(wrap) => {
                let inner = self.text.get(1..self.text.len().saturating_sub(1))?;
                Some(Ident {
                    value: inner,
                    wrap: Some(wrap),
                })
            }
            _ => None,
        }
    }
}

/// An identifier with its quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'s> {
    pub value: &'s str,
    pub wrap: Option<Wrap>,
}

impl Ident<'_> {
    /// Lookup key: unquoted identifiers are case-insensitive, quoted ones
    /// are exact.
    pub fn key(&self) -> String {
        match self.wrap {
            Some(_) => self.value.to_string(),
            None => self.value.to_ascii_lowercase(),
        }
    }

    /// `name` with this identifier's quoting.
    pub fn render(&self, name: &str) -> String {
        match self.wrap {
            Some(wrap) => wrap.apply(name),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_ident() {
        let token = Token {
            kind: TokenKind::Quoted(Wrap::Bracket),
            text: "[Order Lines]",
            offset: 0,
        };
        let ident = token.ident().unwrap();
        assert_eq!(ident.value, "Order Lines");
        assert_eq!(ident.key(), "Order Lines");
        assert_eq!(ident.render("Alpha"), "[Alpha]");
    }

    #[test]
    fn test_word_key_is_case_insensitive() {
        let token = Token {
            kind: TokenKind::Word,
            text: "Users",
            offset: 0,
        };
        assert_eq!(token.ident().unwrap().key(), "users");
        assert!(token.is_word("USERS"));
    }
}
