//! SQL tokenizer.
//!
//! Never fails: anything it does not recognize becomes a one-character
//! [`TokenKind::Symbol`], and unterminated literals or comments run to the
//! end of the input.

use crate::token::{Token, TokenKind, Wrap};

/// Two-character operators kept as one symbol.
const OPERATORS: [&str; 7] = ["<>", "!=", "<=", ">=", "||", "::", "=>"];

fn is_word_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_word_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn word_len(text: &str) -> usize {
    text.find(|c: char| !is_word_continue(c)).unwrap_or(text.len())
}

fn digits_len(text: &str) -> usize {
    text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len())
}

/// Length of a literal delimited by `quote`; a doubled quote is an escape
/// when `doubled` is set.
fn quoted_len(text: &str, quote: char, doubled: bool) -> usize {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            if doubled && chars.peek().is_some_and(|&(_, next)| next == quote) {
                chars.next();
                continue;
            }
            return i + c.len_utf8();
        }
    }
    text.len()
}

/// `12`, `3.5`, `.5`, `1e10`, `2.5E-3`
fn number_len(text: &str) -> usize {
    let mut len = digits_len(text);
    let rest = &text[len..];
    if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        len += 1 + digits_len(&rest[1..]);
    }
    let rest = &text[len..];
    if rest.starts_with(['e', 'E']) {
        let sign = usize::from(rest[1..].starts_with(['+', '-']));
        let exponent = digits_len(&rest[1 + sign..]);
        if exponent > 0 {
            len += 1 + sign + exponent;
        }
    }
    len
}

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    /// Split the whole input into tokens, trivia included.
    pub fn tokenize(mut self) -> Vec<Token<'s>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn next_token(&mut self) -> Option<Token<'s>> {
        let rest = &self.src[self.pos..];
        let c = rest.chars().next()?;
        let next = rest[c.len_utf8()..].chars().next();

        let (kind, len) = match c {
            c if c.is_whitespace() => (
                TokenKind::Whitespace,
                rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len()),
            ),
            '-' if next == Some('-') => (TokenKind::LineComment, rest.find('\n').unwrap_or(rest.len())),
            '/' if next == Some('*') => (
                TokenKind::BlockComment,
                rest[2..].find("*/").map_or(rest.len(), |i| i + 4),
            ),
            '\'' => (TokenKind::String, quoted_len(rest, '\'', true)),
            '"' => (TokenKind::Quoted(Wrap::Double), quoted_len(rest, '"', true)),
            '`' => (TokenKind::Quoted(Wrap::Backtick), quoted_len(rest, '`', false)),
            '[' => (
                TokenKind::Quoted(Wrap::Bracket),
                rest.find(']').map_or(rest.len(), |i| i + 1),
            ),
            c if c.is_ascii_digit() => (TokenKind::Number, number_len(rest)),
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                (TokenKind::Number, 1 + number_len(&rest[1..]))
            }
            c if is_word_start(c) => (TokenKind::Word, word_len(rest)),
            '?' => (TokenKind::Placeholder, 1),
            '$' if next.is_some_and(|n| n.is_ascii_digit()) => {
                (TokenKind::Placeholder, 1 + digits_len(&rest[1..]))
            }
            ':' | '@' if next.is_some_and(is_word_start) => {
                (TokenKind::Placeholder, 1 + word_len(&rest[1..]))
            }
            _ => {
                let len = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(*op))
                    .map_or(c.len_utf8(), |op| op.len());
                (TokenKind::Symbol, len)
            }
        };

        let start = self.pos;
        self.pos += len;
        Some(Token {
            kind,
            text: &self.src[start..self.pos],
            offset: start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(src)
            .tokenize()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_select_statement() {
        assert_eq!(
            kinds("SELECT u.id FROM users u"),
            [
                (TokenKind::Word, "SELECT"),
                (TokenKind::Word, "u"),
                (TokenKind::Symbol, "."),
                (TokenKind::Word, "id"),
                (TokenKind::Word, "FROM"),
                (TokenKind::Word, "users"),
                (TokenKind::Word, "u"),
            ]
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(kinds("'it''s'"), [(TokenKind::String, "'it''s'")]);
        assert_eq!(kinds("'open"), [(TokenKind::String, "'open")]);
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            kinds("\"a b\" `c` [d e]"),
            [
                (TokenKind::Quoted(Wrap::Double), "\"a b\""),
                (TokenKind::Quoted(Wrap::Backtick), "`c`"),
                (TokenKind::Quoted(Wrap::Bracket), "[d e]"),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a -- note\n/* block */ b"),
            [
                (TokenKind::Word, "a"),
                (TokenKind::LineComment, "-- note"),
                (TokenKind::BlockComment, "/* block */"),
                (TokenKind::Word, "b"),
            ]
        );
    }

    #[test]
    fn test_numbers_and_placeholders() {
        assert_eq!(
            kinds("1.5 .5 2e-3 ? $1 :email @id"),
            [
                (TokenKind::Number, "1.5"),
                (TokenKind::Number, ".5"),
                (TokenKind::Number, "2e-3"),
                (TokenKind::Placeholder, "?"),
                (TokenKind::Placeholder, "$1"),
                (TokenKind::Placeholder, ":email"),
                (TokenKind::Placeholder, "@id"),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a<>b x::int"),
            [
                (TokenKind::Word, "a"),
                (TokenKind::Symbol, "<>"),
                (TokenKind::Word, "b"),
                (TokenKind::Word, "x"),
                (TokenKind::Symbol, "::"),
                (TokenKind::Word, "int"),
            ]
        );
    }

    #[test]
    fn test_text_round_trips() {
        let src = "SELECT 'x' -- c\nFROM [t] WHERE a >= $2;";
        let joined: String = Lexer::new(src).tokenize().iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }
}
