//! Token types for JavaScript and JSX.
//!
//! Contextual words (`async`, `await`, `yield`, `static`, `get`, `set`,
//! `of`, `from`, `as`) are lexed as identifiers; the parser decides what
//! they mean from position.

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub had_newline_before: bool,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, had_newline_before: bool) -> Self {
        Self {
            kind,
            span,
            had_newline_before,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// `foo`, `_bar`, `$baz`
    Identifier(String),
    /// `#secret` (stored without the `#`)
    PrivateName(String),
    /// String literal, cooked value.
    String(String),
    /// Number literal, raw text.
    Number(String),
    /// BigInt literal, raw text including the `n` suffix.
    BigInt(String),
    Regex { pattern: String, flags: String },
    /// Template parts carry raw text.
    TemplateNoSub(String),
    TemplateHead(String),
    TemplateMiddle(String),
    TemplateTail(String),

    // === Keywords ===
    Var,
    Let,
    Const,
    Function,
    Class,
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    Delete,
    Typeof,
    Void,
    In,
    Instanceof,
    This,
    Super,
    Null,
    True,
    False,
    Import,
    Export,
    Extends,
    With,
    Debugger,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,
    Question,
    At,
    Arrow,
    Spread,
    QuestionDot,

    // === Operators ===
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    StarStarEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,
    GtGtGtEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    PlusPlus,
    MinusMinus,

    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,
    GtGtGt,

    AmpAmp,
    PipePipe,
    Bang,
    QuestionQuestion,

    // === JSX (only produced by the JSX scanning entry points) ===
    /// Raw text between tags.
    JsxText(String),
    /// `</`
    JsxCloseStart,

    // === Special ===
    Eof,
    /// A byte sequence the lexer could not classify.
    Invalid,
}

impl TokenKind {
    /// Whether this token can start an expression.
    pub fn can_start_expr(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::PrivateName(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::Regex { .. }
                | TokenKind::TemplateNoSub(_)
                | TokenKind::TemplateHead(_)
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::New
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Spread
                | TokenKind::Import
                | TokenKind::Lt
        )
    }

    /// Whether a `/` after this token starts a regular expression.
    pub fn allows_regex_after(&self) -> bool {
        !matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::PrivateName(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::Regex { .. }
                | TokenKind::TemplateNoSub(_)
                | TokenKind::TemplateTail(_)
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }

    /// Binding power of a binary operator (higher binds tighter), or `None`.
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::QuestionQuestion => Some(1),
            TokenKind::PipePipe => Some(2),
            TokenKind::AmpAmp => Some(3),
            TokenKind::Pipe => Some(4),
            TokenKind::Caret => Some(5),
            TokenKind::Amp => Some(6),
            TokenKind::EqEq | TokenKind::EqEqEq | TokenKind::BangEq | TokenKind::BangEqEq => Some(7),
            TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof => Some(8),
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => Some(9),
            TokenKind::Plus | TokenKind::Minus => Some(10),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(11),
            TokenKind::StarStar => Some(12),
            _ => None,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, TokenKind::StarStar)
    }

    /// The source spelling of a keyword token, used where keywords are
    /// valid property names (`obj.default`, `{ if: 1 }`).
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Function => "function",
            TokenKind::Class => "class",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::Delete => "delete",
            TokenKind::Typeof => "typeof",
            TokenKind::Void => "void",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::This => "this",
            TokenKind::Super => "super",
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Import => "import",
            TokenKind::Export => "export",
            TokenKind::Extends => "extends",
            TokenKind::With => "with",
            TokenKind::Debugger => "debugger",
            _ => return None,
        };
        Some(text)
    }
}

/// Look up a keyword from an identifier string.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "var" => Some(TokenKind::Var),
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "function" => Some(TokenKind::Function),
        "class" => Some(TokenKind::Class),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "return" => Some(TokenKind::Return),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "finally" => Some(TokenKind::Finally),
        "throw" => Some(TokenKind::Throw),
        "new" => Some(TokenKind::New),
        "delete" => Some(TokenKind::Delete),
        "typeof" => Some(TokenKind::Typeof),
        "void" => Some(TokenKind::Void),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "this" => Some(TokenKind::This),
        "super" => Some(TokenKind::Super),
        "null" => Some(TokenKind::Null),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "extends" => Some(TokenKind::Extends),
        "with" => Some(TokenKind::With),
        "debugger" => Some(TokenKind::Debugger),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["var", "class", "default", "instanceof", "debugger"] {
            let kind = keyword_from_str(word).unwrap();
            assert_eq!(kind.keyword_text(), Some(word));
        }
        assert!(keyword_from_str("async").is_none());
        assert!(keyword_from_str("of").is_none());
    }

    #[test]
    fn test_regex_context() {
        assert!(!TokenKind::Identifier("a".into()).allows_regex_after());
        assert!(!TokenKind::RParen.allows_regex_after());
        assert!(TokenKind::Return.allows_regex_after());
        assert!(TokenKind::Eq.allows_regex_after());
        assert!(TokenKind::LParen.allows_regex_after());
    }

    #[test]
    fn test_precedence_order() {
        let add = TokenKind::Plus.binary_precedence().unwrap();
        let mul = TokenKind::Star.binary_precedence().unwrap();
        let or = TokenKind::PipePipe.binary_precedence().unwrap();
        assert!(mul > add);
        assert!(add > or);
        assert!(TokenKind::StarStar.is_right_associative());
        assert_eq!(TokenKind::Arrow.binary_precedence(), None);
    }
}
