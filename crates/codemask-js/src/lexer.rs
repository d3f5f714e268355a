//! Lexer for JavaScript and JSX.
//!
//! The lexer is called on demand by the parser, which lets it resolve
//! context-sensitive cases (regex vs division, template continuations,
//! JSX text) from what the parser is doing at the time.

use crate::span::Span;
use crate::token::{keyword_from_str, Token, TokenKind};

#[derive(Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    source: &'a [u8],
    pos: usize,
    token_start: usize,
    /// Whether a `/` at this point starts a regex.
    allow_regex: bool,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        // A hashbang line is skipped like a comment.
        let pos = if source.starts_with("#!") {
            source.find('\n').unwrap_or(source.len())
        } else {
            0
        };
        Self {
            text: source,
            source: source.as_bytes(),
            pos,
            token_start: 0,
            allow_regex: true,
            saw_newline: false,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor back to `pos`. Only used to re-lex the current
    /// token under a different mode (JSX).
    pub fn reset(&mut self, pos: u32) {
        self.pos = (pos as usize).min(self.source.len());
        self.saw_newline = false;
    }

    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        self.skip_whitespace_and_comments();
        self.token_start = self.pos;

        if self.is_eof() {
            return self.make_token(TokenKind::Eof);
        }

        let ch = self.current();
        let kind = match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | b'\\' => self.scan_identifier(),
            0x80..=0xFF => self.scan_identifier(),
            b'0'..=b'9' => self.scan_number(),
            b'"' | b'\'' => self.scan_string(ch),
            b'`' => self.scan_template_head(),
            b'#' => self.scan_private_name(),

            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b';' => self.single(TokenKind::Semicolon),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b'@' => self.single(TokenKind::At),
            b'~' => self.single(TokenKind::Tilde),

            b'.' => self.scan_dot(),
            b'?' => self.scan_question(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_slash(),
            b'%' => self.scan_operator(TokenKind::Percent, TokenKind::PercentEq),
            b'^' => self.scan_operator(TokenKind::Caret, TokenKind::CaretEq),
            b'=' => self.scan_equals(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),

            _ => {
                self.advance();
                TokenKind::Invalid
            }
        };

        self.allow_regex = kind.allows_regex_after();
        self.make_token(kind)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        let saved = (self.pos, self.token_start, self.allow_regex, self.saw_newline);
        let token = self.next_token();
        (self.pos, self.token_start, self.allow_regex, self.saw_newline) = saved;
        token
    }

    // === JSX entry points ===

    /// Scan one JSX child token: text, `{`, `<` or `</`.
    pub fn next_jsx_child(&mut self) -> Token {
        self.saw_newline = false;
        self.token_start = self.pos;
        if self.is_eof() {
            return self.make_token(TokenKind::Eof);
        }
        let kind = match self.current() {
            b'{' => self.single(TokenKind::LBrace),
            b'<' if self.peek_char() == b'/' => {
                self.advance_n(2);
                TokenKind::JsxCloseStart
            }
            b'<' => self.single(TokenKind::Lt),
            _ => {
                while !self.is_eof() && !matches!(self.current(), b'<' | b'{') {
                    self.advance();
                }
                TokenKind::JsxText(self.slice(self.token_start, self.pos).to_string())
            }
        };
        self.allow_regex = true;
        self.make_token(kind)
    }

    /// Scan a JSX tag or attribute name, which may contain `-`.
    pub fn next_jsx_name(&mut self) -> Token {
        self.saw_newline = false;
        self.skip_whitespace_and_comments();
        self.token_start = self.pos;
        if self.is_eof() || !is_ident_start(self.current()) {
            return self.next_token();
        }
        while !self.is_eof() && (is_ident_part(self.current()) || self.current() == b'-') {
            self.advance();
        }
        let name = self.slice(self.token_start, self.pos).to_string();
        self.allow_regex = false;
        self.make_token(TokenKind::Identifier(name))
    }

    // === Helpers ===

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    fn current(&self) -> u8 {
        self.source.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    fn peek_char(&self) -> u8 {
        self.source.get(self.pos + 1).copied().unwrap_or(0)
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(to_u32(self.token_start), to_u32(self.pos)),
            self.saw_newline,
        )
    }

    /// Slice the source by byte offsets. Offsets always sit on ASCII
    /// boundaries or the ends of whole UTF-8 sequences.
    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end.min(self.text.len())).unwrap_or("")
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_eof() {
            match self.current() {
                b' ' | b'\t' | b'\x0B' | b'\x0C' => self.advance(),
                b'\n' | b'\r' => {
                    self.saw_newline = true;
                    self.advance();
                }
                b'/' if self.peek_char() == b'/' => {
                    while !self.is_eof() && !matches!(self.current(), b'\n' | b'\r') {
                        self.advance();
                    }
                }
                b'/' if self.peek_char() == b'*' => {
                    self.advance_n(2);
                    while !self.is_eof() && !(self.current() == b'*' && self.peek_char() == b'/') {
                        if matches!(self.current(), b'\n' | b'\r') {
                            self.saw_newline = true;
                        }
                        self.advance();
                    }
                    if !self.is_eof() {
                        self.advance_n(2);
                    }
                }
                // Non-breaking space and BOM
                0xC2 if self.peek_char() == 0xA0 => self.advance_n(2),
                0xEF if self.source.get(self.pos + 1..self.pos + 3) == Some(&[0xBB, 0xBF]) => {
                    self.advance_n(3);
                }
                0xE2 if self.source.get(self.pos + 1..self.pos + 3) == Some(&[0x80, 0xA8])
                    || self.source.get(self.pos + 1..self.pos + 3) == Some(&[0x80, 0xA9]) =>
                {
                    self.saw_newline = true;
                    self.advance_n(3);
                }
                _ => break,
            }
        }
    }

    // === Identifiers ===

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        let mut escaped = false;
        while !self.is_eof() {
            let ch = self.current();
            if is_ident_part(ch) {
                self.advance();
            } else if ch == b'\\' {
                // \uXXXX inside an identifier; kept verbatim
                escaped = true;
                self.advance();
                if self.current() == b'u' {
                    self.advance();
                }
            } else {
                break;
            }
        }
        if self.pos == start {
            self.advance();
            return TokenKind::Invalid;
        }
        let text = self.slice(start, self.pos);
        if !escaped {
            if let Some(keyword) = keyword_from_str(text) {
                return keyword;
            }
        }
        TokenKind::Identifier(text.to_string())
    }

    fn scan_private_name(&mut self) -> TokenKind {
        self.advance();
        let start = self.pos;
        while !self.is_eof() && is_ident_part(self.current()) {
            self.advance();
        }
        if self.pos == start {
            return TokenKind::Invalid;
        }
        TokenKind::PrivateName(self.slice(start, self.pos).to_string())
    }

    // === Numbers ===

    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;
        if self.current() == b'0' && matches!(self.peek_char(), b'x' | b'X' | b'o' | b'O' | b'b' | b'B') {
            self.advance_n(2);
            while self.current().is_ascii_hexdigit() || self.current() == b'_' {
                self.advance();
            }
        } else {
            self.scan_digits();
            if self.current() == b'.' {
                self.advance();
                self.scan_digits();
            }
            if matches!(self.current(), b'e' | b'E') {
                let next = self.peek_char();
                if next.is_ascii_digit()
                    || (matches!(next, b'+' | b'-')
                        && self.source.get(self.pos + 2).is_some_and(u8::is_ascii_digit))
                {
                    self.advance_n(2);
                    self.scan_digits();
                }
            }
        }

        if self.current() == b'n' {
            self.advance();
            return TokenKind::BigInt(self.slice(start, self.pos).to_string());
        }
        TokenKind::Number(self.slice(start, self.pos).to_string())
    }

    fn scan_digits(&mut self) {
        while self.current().is_ascii_digit() || self.current() == b'_' {
            self.advance();
        }
    }

    // === Strings ===

    fn scan_string(&mut self, quote: u8) -> TokenKind {
        self.advance();
        let mut value = String::new();
        let mut run_start = self.pos;

        loop {
            if self.is_eof() || matches!(self.current(), b'\n' | b'\r') {
                return TokenKind::Invalid;
            }
            let ch = self.current();
            if ch == quote {
                value.push_str(self.slice(run_start, self.pos));
                self.advance();
                return TokenKind::String(value);
            }
            if ch == b'\\' {
                value.push_str(self.slice(run_start, self.pos));
                self.advance();
                if let Some(c) = self.scan_escape_sequence() {
                    value.push(c);
                }
                run_start = self.pos;
            } else {
                self.advance();
            }
        }
    }

    /// Cook one escape sequence. Line continuations yield nothing.
    fn scan_escape_sequence(&mut self) -> Option<char> {
        if self.is_eof() {
            return None;
        }
        let ch = self.current();
        self.advance();
        let cooked = match ch {
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'b' => '\u{8}',
            b'f' => '\u{C}',
            b'v' => '\u{B}',
            b'0' if !self.current().is_ascii_digit() => '\0',
            b'x' => self.scan_hex_escape(2),
            b'u' if self.current() == b'{' => self.scan_unicode_escape_braces(),
            b'u' => self.scan_hex_escape(4),
            b'\r' => {
                if self.current() == b'\n' {
                    self.advance();
                }
                return None;
            }
            b'\n' => return None,
            0x80..=0xFF => {
                // Escaped multi-byte char: re-read it whole.
                self.pos -= 1;
                let rest = self.slice(self.pos, self.source.len());
                let c = rest.chars().next()?;
                self.advance_n(c.len_utf8());
                if matches!(c, '\u{2028}' | '\u{2029}') {
                    return None;
                }
                c
            }
            other => char::from(other),
        };
        Some(cooked)
    }

    fn scan_hex_escape(&mut self, len: usize) -> char {
        let mut value = 0u32;
        for _ in 0..len {
            match char::from(self.current()).to_digit(16) {
                Some(digit) => {
                    value = value * 16 + digit;
                    self.advance();
                }
                None => break,
            }
        }
        char::from_u32(value).unwrap_or('\u{FFFD}')
    }

    fn scan_unicode_escape_braces(&mut self) -> char {
        self.advance();
        let mut value = 0u32;
        while !self.is_eof() && self.current() != b'}' {
            match char::from(self.current()).to_digit(16) {
                Some(digit) => {
                    value = value.saturating_mul(16).saturating_add(digit);
                    self.advance();
                }
                None => break,
            }
        }
        if self.current() == b'}' {
            self.advance();
        }
        char::from_u32(value).unwrap_or('\u{FFFD}')
    }

    // === Templates ===

    fn scan_template_head(&mut self) -> TokenKind {
        self.advance();
        match self.scan_template_part() {
            Some((text, true)) => TokenKind::TemplateNoSub(text),
            Some((text, false)) => TokenKind::TemplateHead(text),
            None => TokenKind::Invalid,
        }
    }

    /// Scan a template middle or tail. Called by the parser when the
    /// current token is the `}` that closes a substitution.
    pub fn scan_template_continuation(&mut self) -> Token {
        self.saw_newline = false;
        self.token_start = self.pos;
        let kind = match self.scan_template_part() {
            Some((text, true)) => TokenKind::TemplateTail(text),
            Some((text, false)) => TokenKind::TemplateMiddle(text),
            None => TokenKind::Invalid,
        };
        self.allow_regex = kind.allows_regex_after();
        self.make_token(kind)
    }

    /// Raw text up to the closing backtick (`true`) or the next `${`.
    fn scan_template_part(&mut self) -> Option<(String, bool)> {
        let start = self.pos;
        while !self.is_eof() {
            match self.current() {
                b'`' => {
                    let text = self.slice(start, self.pos).to_string();
                    self.advance();
                    return Some((text, true));
                }
                b'$' if self.peek_char() == b'{' => {
                    let text = self.slice(start, self.pos).to_string();
                    self.advance_n(2);
                    return Some((text, false));
                }
                b'\\' => self.advance_n(2),
                _ => self.advance(),
            }
        }
        self.pos = self.source.len();
        None
    }

    // === Regex ===

    fn scan_regex(&mut self) -> TokenKind {
        self.advance();
        let pattern_start = self.pos;
        let mut in_class = false;
        loop {
            if self.is_eof() || matches!(self.current(), b'\n' | b'\r') {
                return TokenKind::Invalid;
            }
            match self.current() {
                b'/' if !in_class => break,
                b'[' => in_class = true,
                b']' => in_class = false,
                b'\\' => self.advance(),
                _ => {}
            }
            self.advance();
        }
        let pattern = self.slice(pattern_start, self.pos).to_string();
        self.advance();

        let flags_start = self.pos;
        while self.current().is_ascii_alphabetic() {
            self.advance();
        }
        let flags = self.slice(flags_start, self.pos).to_string();
        TokenKind::Regex { pattern, flags }
    }

    // === Multi-character operators ===

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek_char().is_ascii_digit() {
            return self.scan_number();
        }
        self.advance();
        if self.current() == b'.' && self.peek_char() == b'.' {
            self.advance_n(2);
            TokenKind::Spread
        } else {
            TokenKind::Dot
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'?' => {
                self.advance();
                self.scan_operator_tail(TokenKind::QuestionQuestion, TokenKind::QuestionQuestionEq)
            }
            b'.' if !self.peek_char().is_ascii_digit() => self.single(TokenKind::QuestionDot),
            _ => TokenKind::Question,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => self.single(TokenKind::PlusPlus),
            b'=' => self.single(TokenKind::PlusEq),
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => self.single(TokenKind::MinusMinus),
            b'=' => self.single(TokenKind::MinusEq),
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => {
                self.advance();
                self.scan_operator_tail(TokenKind::StarStar, TokenKind::StarStarEq)
            }
            b'=' => self.single(TokenKind::StarEq),
            _ => TokenKind::Star,
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.allow_regex {
            return self.scan_regex();
        }
        self.scan_operator(TokenKind::Slash, TokenKind::SlashEq)
    }

    /// `op` or `op=` for single-byte operators.
    fn scan_operator(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        self.advance();
        self.scan_operator_tail(plain, assign)
    }

    fn scan_operator_tail(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        if self.current() == b'=' {
            self.advance();
            assign
        } else {
            plain
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                self.scan_operator_tail(TokenKind::EqEq, TokenKind::EqEqEq)
            }
            b'>' => self.single(TokenKind::Arrow),
            _ => TokenKind::Eq,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            self.scan_operator_tail(TokenKind::BangEq, TokenKind::BangEqEq)
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                self.scan_operator_tail(TokenKind::LtLt, TokenKind::LtLtEq)
            }
            b'=' => self.single(TokenKind::LtEq),
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'>' => {
                self.advance();
                match self.current() {
                    b'>' => {
                        self.advance();
                        self.scan_operator_tail(TokenKind::GtGtGt, TokenKind::GtGtGtEq)
                    }
                    b'=' => self.single(TokenKind::GtGtEq),
                    _ => TokenKind::GtGt,
                }
            }
            b'=' => self.single(TokenKind::GtEq),
            _ => TokenKind::Gt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => {
                self.advance();
                self.scan_operator_tail(TokenKind::AmpAmp, TokenKind::AmpAmpEq)
            }
            b'=' => self.single(TokenKind::AmpEq),
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => {
                self.advance();
                self.scan_operator_tail(TokenKind::PipePipe, TokenKind::PipePipeEq)
            }
            b'=' => self.single(TokenKind::PipeEq),
            _ => TokenKind::Pipe,
        }
    }
}

/// Non-ASCII bytes are accepted wholesale so identifiers in any script
/// stay intact; whole UTF-8 sequences are always consumed together.
#[inline]
fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$' || ch >= 0x80
}

#[inline]
fn is_ident_part(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[inline]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
