//! JavaScript parser.
//!
//! Recursive descent for statements, precedence climbing for binary
//! expressions. Parenthesized arrow parameters are parsed as expressions
//! first and converted to bindings once the `=>` is seen.

use crate::ast::*;
use crate::jsx::JsxFollow;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parse error with the byte span it was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}

/// Function-level parsing context.
#[derive(Debug, Clone, Copy, Default)]
struct FnContext {
    in_function: bool,
    is_async: bool,
    is_generator: bool,
}

pub struct Parser<'a> {
    pub(crate) lexer: Lexer<'a>,
    pub(crate) current: Token,
    /// End offset of the last consumed token.
    pub(crate) prev_end: u32,
    /// When false, `in` is not a binary operator (for-in heads).
    allow_in: bool,
    context: FnContext,
    /// Current nesting of statements, expressions and bindings.
    depth: u32,
}

/// Deepest nesting accepted before the input is rejected.
const MAX_DEPTH: u32 = 64;

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            prev_end: 0,
            allow_in: true,
            context: FnContext::default(),
            depth: 0,
        }
    }

    /// Parse the whole source as a module.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let start = self.current.span.start;
        let mut body = self.parse_directives();
        while !self.is_eof() {
            body.push(self.parse_stmt()?);
        }
        Ok(Program {
            body,
            span: Span::new(start, self.prev_end),
        })
    }

    // =========================================================================
    // Token handling
    // =========================================================================

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.prev_end = self.current.span.end;
        std::mem::replace(&mut self.current, self.lexer.next_token())
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    /// Run `parse` one nesting level down, failing once [`MAX_DEPTH`] is reached.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new("Nesting too deep", self.current.span));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn unexpected(&self) -> ParseError {
        let message = match self.peek() {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            TokenKind::Invalid => "Unexpected character".to_string(),
            _ => {
                let span = self.current.span;
                let text = self.lexer.text().get(span.start as usize..span.end as usize).unwrap_or("");
                format!("Unexpected token '{text}'")
            }
        };
        ParseError::new(message, self.current.span)
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Identifier(name) if name == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Automatic semicolon insertion.
    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_eof()
            || self.current.had_newline_before
        {
            return Ok(());
        }
        Err(self.unexpected())
    }

    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Identifier(name) = self.peek() {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(self.unexpected())
    }

    /// An identifier or keyword, as allowed after `.` and in export lists.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            TokenKind::Identifier(name) => name.clone(),
            other => match other.keyword_text() {
                Some(text) => text.to_string(),
                None => return Err(self.unexpected()),
            },
        };
        self.advance();
        Ok(name)
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = self.peek() {
            let value = value.clone();
            self.advance();
            return Ok(value);
        }
        Err(self.unexpected())
    }

    fn with_context<T>(
        &mut self,
        context: FnContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved_context = std::mem::replace(&mut self.context, context);
        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let result = f(self);
        self.context = saved_context;
        self.allow_in = saved_in;
        result
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Leading string-literal statements of a program or function body.
    fn parse_directives(&mut self) -> Vec<Stmt> {
        let mut directives = Vec::new();
        while let TokenKind::String(value) = self.peek() {
            let value = value.clone();
            let next = self.lexer.peek();
            let ends = matches!(next.kind, TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
                || next.had_newline_before;
            if !ends {
                break;
            }
            let start = self.current.span.start;
            self.advance();
            self.eat(&TokenKind::Semicolon);
            directives.push(Stmt::new(StmtKind::Directive(value), self.span_from(start)));
        }
        directives
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::parse_stmt_at_depth)
    }

    fn parse_stmt_at_depth(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;

        match self.peek() {
            TokenKind::LBrace => {
                let body = self.parse_block()?;
                Ok(Stmt::new(StmtKind::Block(body), self.span_from(start)))
            }
            TokenKind::Var | TokenKind::Const => self.parse_var_stmt(),
            TokenKind::Let => self.parse_var_stmt(),
            TokenKind::Function => {
                let function = self.parse_function(false, start)?;
                Ok(Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(start)))
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                Ok(Stmt::new(StmtKind::Class(Box::new(class)), self.span_from(start)))
            }
            TokenKind::Identifier(name) if name == "async" => {
                let next = self.lexer.peek();
                if matches!(next.kind, TokenKind::Function) && !next.had_newline_before {
                    self.advance();
                    let function = self.parse_function(true, start)?;
                    return Ok(Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(start)));
                }
                self.parse_expr_or_labeled_stmt()
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Throw => {
                self.advance();
                if self.current.had_newline_before {
                    return Err(ParseError::new("Illegal newline after throw", self.current.span));
                }
                let arg = self.parse_expr()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Throw { arg }, self.span_from(start)))
            }
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::With => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let object = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::new(StmtKind::With { object, body }, self.span_from(start)))
            }
            TokenKind::Debugger => {
                self.advance();
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Debugger, self.span_from(start)))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::new(StmtKind::Empty, self.span_from(start)))
            }
            TokenKind::Import => {
                let next = self.lexer.peek();
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    return self.parse_expr_or_labeled_stmt();
                }
                self.parse_import_decl()
            }
            TokenKind::Export => self.parse_export_decl(),
            _ => self.parse_expr_or_labeled_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return Err(self.unexpected());
            }
            stmts.push(self.parse_stmt()?);
        }
        self.advance();
        Ok(stmts)
    }

    fn parse_expr_or_labeled_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        if let TokenKind::Identifier(label) = self.peek() {
            let label = label.clone();
            if matches!(self.lexer.peek().kind, TokenKind::Colon) {
                self.advance();
                self.advance();
                let body = Box::new(self.parse_stmt()?);
                return Ok(Stmt::new(StmtKind::Labeled { label, body }, self.span_from(start)));
            }
        }
        let expr = self.parse_expr()?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Expr(expr), self.span_from(start)))
    }

    fn var_kind(&self) -> Option<VarKind> {
        match self.peek() {
            TokenKind::Var => Some(VarKind::Var),
            TokenKind::Let => Some(VarKind::Let),
            TokenKind::Const => Some(VarKind::Const),
            _ => None,
        }
    }

    fn parse_var_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let (kind, decls) = self.parse_var_decls()?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Var { kind, decls }, self.span_from(start)))
    }

    /// `var|let|const a = 1, [b] = c` without the trailing semicolon.
    fn parse_var_decls(&mut self) -> Result<(VarKind, Vec<VarDeclarator>), ParseError> {
        let kind = self.var_kind().ok_or_else(|| self.unexpected())?;
        self.advance();
        let mut decls = Vec::new();
        loop {
            let start = self.current.span.start;
            let binding = self.parse_binding()?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assign_expr()?)
            } else {
                None
            };
            decls.push(VarDeclarator {
                binding,
                init,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok((kind, decls))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let consequent = Box::new(self.parse_stmt()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                test,
                consequent,
                alternate,
            },
            self.span_from(start),
        ))
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let discriminant = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let case_start = self.current.span.start;
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expr()?)
            } else if self.eat(&TokenKind::Default) {
                None
            } else {
                return Err(self.unexpected());
            };
            self.expect(&TokenKind::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.peek(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_stmt()?);
            }
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.span_from(case_start),
            });
        }
        Ok(Stmt::new(StmtKind::Switch { discriminant, cases }, self.span_from(start)))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let is_await = self.eat_word("await");
        self.expect(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            let saved_in = std::mem::replace(&mut self.allow_in, false);
            let init = if self.var_kind().is_some() {
                self.parse_var_decls().map(|(kind, decls)| ForInit::Var { kind, decls })
            } else {
                self.parse_expr().map(ForInit::Expr)
            };
            self.allow_in = saved_in;
            Some(init?)
        };

        if let Some(left) = init {
            if self.eat_word("of") {
                let right = self.parse_assign_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                return Ok(Stmt::new(
                    StmtKind::ForOf {
                        left,
                        right,
                        body,
                        is_await,
                    },
                    self.span_from(start),
                ));
            }
            if self.eat(&TokenKind::In) {
                let right = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                return Ok(Stmt::new(StmtKind::ForIn { left, right, body }, self.span_from(start)));
            }
            return self.finish_classic_for(start, Some(left));
        }
        self.finish_classic_for(start, None)
    }

    fn finish_classic_for(&mut self, start: u32, init: Option<ForInit>) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                test,
                update,
                body,
            },
            self.span_from(start),
        ))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::new(StmtKind::While { test, body }, self.span_from(start)))
    }

    fn parse_do_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let body = Box::new(self.parse_stmt()?);
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.eat(&TokenKind::Semicolon);
        Ok(Stmt::new(StmtKind::DoWhile { body, test }, self.span_from(start)))
    }

    fn parse_jump_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let is_break = self.check(&TokenKind::Break);
        self.advance();
        let label = match self.peek() {
            TokenKind::Identifier(name) if !self.current.had_newline_before => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        self.expect_semicolon()?;
        let kind = if is_break {
            StmtKind::Break { label }
        } else {
            StmtKind::Continue { label }
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let arg = if matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
            || self.current.had_newline_before
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Return { arg }, self.span_from(start)))
    }

    fn parse_try_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let block = self.parse_block()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span.start;
            self.advance();
            let param = if self.eat(&TokenKind::LParen) {
                let binding = self.parse_binding()?;
                self.expect(&TokenKind::RParen)?;
                Some(binding)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(catch_start),
            })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::new("Missing catch or finally clause", self.current.span));
        }

        Ok(Stmt::new(
            StmtKind::Try {
                block,
                handler,
                finalizer,
            },
            self.span_from(start),
        ))
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    pub(crate) fn parse_binding(&mut self) -> Result<Binding, ParseError> {
        self.nested(Self::parse_binding_at_depth)
    }

    fn parse_binding_at_depth(&mut self) -> Result<Binding, ParseError> {
        let start = self.current.span.start;
        match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Binding::new(BindingKind::Ident(name), self.span_from(start)))
            }
            TokenKind::LBracket => self.parse_array_binding(),
            TokenKind::LBrace => self.parse_object_binding(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_binding(&mut self) -> Result<Binding, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            let rest = self.eat(&TokenKind::Spread);
            let binding = self.parse_binding()?;
            let default = if !rest && self.eat(&TokenKind::Eq) {
                Some(self.parse_assign_expr()?)
            } else {
                None
            };
            elements.push(Some(ArrayPatternElement {
                binding,
                default,
                rest,
            }));
            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance();
        Ok(Binding::new(BindingKind::Array(elements), self.span_from(start)))
    }

    fn parse_object_binding(&mut self) -> Result<Binding, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.eat(&TokenKind::Spread) {
                let value = self.parse_binding()?;
                properties.push(ObjectPatternProperty {
                    key: PropertyKey::Ident(String::new()),
                    value,
                    default: None,
                    shorthand: false,
                    rest: true,
                });
            } else {
                let key_start = self.current.span.start;
                let key = self.parse_property_key()?;
                let (value, shorthand) = if self.eat(&TokenKind::Colon) {
                    (self.parse_binding()?, false)
                } else if let PropertyKey::Ident(name) = &key {
                    let binding = Binding::new(BindingKind::Ident(name.clone()), self.span_from(key_start));
                    (binding, true)
                } else {
                    return Err(self.unexpected());
                };
                let default = if self.eat(&TokenKind::Eq) {
                    Some(self.parse_assign_expr()?)
                } else {
                    None
                };
                properties.push(ObjectPatternProperty {
                    key,
                    value,
                    default,
                    shorthand,
                    rest: false,
                });
            }
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance();
        Ok(Binding::new(BindingKind::Object(properties), self.span_from(start)))
    }

    pub(crate) fn parse_property_key(&mut self) -> Result<PropertyKey, ParseError> {
        let key = match self.peek() {
            TokenKind::Identifier(name) => PropertyKey::Ident(name.clone()),
            TokenKind::String(value) => PropertyKey::String(value.clone()),
            TokenKind::Number(raw) | TokenKind::BigInt(raw) => PropertyKey::Number(raw.clone()),
            TokenKind::PrivateName(name) => PropertyKey::Private(name.clone()),
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assign_expr()?;
                self.expect(&TokenKind::RBracket)?;
                return Ok(PropertyKey::Computed(Box::new(expr)));
            }
            other => match other.keyword_text() {
                Some(text) => PropertyKey::Ident(text.to_string()),
                None => return Err(self.unexpected()),
            },
        };
        self.advance();
        Ok(key)
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    /// Parse from the `function` keyword. `start` covers a preceding `async`.
    fn parse_function(&mut self, is_async: bool, start: u32) -> Result<Function, ParseError> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star);
        let name = match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        let (params, body) = self.parse_function_rest(is_async, is_generator)?;
        Ok(Function {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    /// Parameters and body, from the opening `(`.
    fn parse_function_rest(
        &mut self,
        is_async: bool,
        is_generator: bool,
    ) -> Result<(Vec<Param>, Vec<Stmt>), ParseError> {
        let context = FnContext {
            in_function: true,
            is_async,
            is_generator,
        };
        self.with_context(context, |p| {
            let params = p.parse_params()?;
            let body = p.parse_function_body()?;
            Ok((params, body))
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let start = self.current.span.start;
            let rest = self.eat(&TokenKind::Spread);
            let binding = self.parse_binding()?;
            let default = if !rest && self.eat(&TokenKind::Eq) {
                Some(self.parse_assign_expr()?)
            } else {
                None
            };
            params.push(Param {
                binding,
                default,
                rest,
                span: self.span_from(start),
            });
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance();
        Ok(params)
    }

    fn parse_function_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = self.parse_directives();
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return Err(self.unexpected());
            }
            body.push(self.parse_stmt()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_class(&mut self) -> Result<Class, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Class)?;
        let name = match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        let super_class = if self.eat(&TokenKind::Extends) {
            Some(Box::new(self.parse_lhs_expr()?))
        } else {
            None
        };

        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_eof() {
                return Err(self.unexpected());
            }
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        self.advance();

        Ok(Class {
            name,
            super_class,
            body,
            span: self.span_from(start),
        })
    }

    /// Whether the current contextual word acts as a modifier, i.e. the
    /// next token is not what would follow a member named by it.
    fn is_modifier(&mut self) -> bool {
        let next = self.lexer.peek();
        !matches!(
            next.kind,
            TokenKind::LParen | TokenKind::Eq | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) && !next.had_newline_before
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, ParseError> {
        let start = self.current.span.start;

        let is_static = self.is_word("static") && {
            let next = self.lexer.peek();
            !matches!(
                next.kind,
                TokenKind::LParen | TokenKind::Eq | TokenKind::Semicolon | TokenKind::RBrace
            )
        };
        if is_static {
            self.advance();
            if self.check(&TokenKind::LBrace) {
                let body = self.with_context(FnContext { in_function: true, ..FnContext::default() }, Self::parse_block)?;
                return Ok(ClassMember {
                    kind: ClassMemberKind::StaticBlock(body),
                    span: self.span_from(start),
                });
            }
        }

        let is_async = self.is_word("async") && self.is_modifier();
        if is_async {
            self.advance();
        }
        let is_generator = self.eat(&TokenKind::Star);

        let mut kind = MethodKind::Method;
        if !is_async && !is_generator && (self.is_word("get") || self.is_word("set")) && self.is_modifier() {
            kind = if self.is_word("get") { MethodKind::Get } else { MethodKind::Set };
            self.advance();
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) {
            if !is_static && kind == MethodKind::Method && matches!(&key, PropertyKey::Ident(n) | PropertyKey::String(n) if n == "constructor") {
                kind = MethodKind::Constructor;
            }
            let fn_start = self.current.span.start;
            let (params, body) = self.parse_function_rest(is_async, is_generator)?;
            let value = Function {
                name: None,
                params,
                body,
                is_async,
                is_generator,
                span: self.span_from(fn_start),
            };
            return Ok(ClassMember {
                kind: ClassMemberKind::Method {
                    key,
                    value,
                    kind,
                    is_static,
                },
                span: self.span_from(start),
            });
        }

        let value = if self.eat(&TokenKind::Eq) {
            let context = FnContext {
                in_function: true,
                ..FnContext::default()
            };
            Some(self.with_context(context, Self::parse_assign_expr)?)
        } else {
            None
        };
        self.expect_semicolon()?;
        Ok(ClassMember {
            kind: ClassMemberKind::Property { key, value, is_static },
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_import_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Import)?;
        let mut specifiers = Vec::new();

        if !matches!(self.peek(), TokenKind::String(_)) {
            if let TokenKind::Identifier(local) = self.peek() {
                specifiers.push(ImportSpecifier::Default { local: local.clone() });
                self.advance();
                if !self.eat(&TokenKind::Comma) {
                    return self.finish_import(start, specifiers);
                }
            }

            if self.eat(&TokenKind::Star) {
                if !self.eat_word("as") {
                    return Err(self.unexpected());
                }
                let local = self.expect_identifier()?;
                specifiers.push(ImportSpecifier::Namespace { local });
            } else if self.eat(&TokenKind::LBrace) {
                while !self.eat(&TokenKind::RBrace) {
                    let imported = match self.peek() {
                        TokenKind::String(value) => {
                            let value = value.clone();
                            self.advance();
                            value
                        }
                        _ => self.expect_name()?,
                    };
                    let local = if self.eat_word("as") {
                        self.expect_identifier()?
                    } else {
                        imported.clone()
                    };
                    specifiers.push(ImportSpecifier::Named { imported, local });
                    if !self.check(&TokenKind::RBrace) {
                        self.expect(&TokenKind::Comma)?;
                    }
                }
            } else {
                return Err(self.unexpected());
            }
        }

        self.finish_import(start, specifiers)
    }

    fn finish_import(&mut self, start: u32, specifiers: Vec<ImportSpecifier>) -> Result<Stmt, ParseError> {
        if !specifiers.is_empty() && !self.eat_word("from") {
            return Err(self.unexpected());
        }
        let source = self.expect_string()?;
        self.skip_import_attributes()?;
        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Stmt::new(
            StmtKind::Import(Box::new(ImportDecl {
                specifiers,
                source,
                span,
            })),
            span,
        ))
    }

    /// `with { type: "json" }` / `assert { ... }` after a module source.
    fn skip_import_attributes(&mut self) -> Result<(), ParseError> {
        if (self.check(&TokenKind::With) || self.is_word("assert")) && !self.current.had_newline_before {
            self.advance();
            let _ = self.parse_object_literal()?;
        }
        Ok(())
    }

    fn parse_export_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Export)?;

        let decl = match self.peek() {
            TokenKind::Default => {
                self.advance();
                let default_start = self.current.span.start;
                let is_async_fn = self.is_word("async") && {
                    let next = self.lexer.peek();
                    matches!(next.kind, TokenKind::Function) && !next.had_newline_before
                };
                if is_async_fn {
                    self.advance();
                }
                if self.check(&TokenKind::Function) {
                    let function = self.parse_function(is_async_fn, default_start)?;
                    ExportDecl::Default(DefaultExport::Function(Box::new(function)))
                } else if self.check(&TokenKind::Class) {
                    let class = self.parse_class()?;
                    ExportDecl::Default(DefaultExport::Class(Box::new(class)))
                } else {
                    let expr = self.parse_assign_expr()?;
                    self.expect_semicolon()?;
                    ExportDecl::Default(DefaultExport::Expr(expr))
                }
            }
            TokenKind::Star => {
                self.advance();
                let exported = if self.eat_word("as") {
                    Some(self.expect_export_name()?)
                } else {
                    None
                };
                if !self.eat_word("from") {
                    return Err(self.unexpected());
                }
                let source = self.expect_string()?;
                self.skip_import_attributes()?;
                self.expect_semicolon()?;
                ExportDecl::All { exported, source }
            }
            TokenKind::LBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                while !self.eat(&TokenKind::RBrace) {
                    let local = self.expect_export_name()?;
                    let exported = if self.eat_word("as") {
                        self.expect_export_name()?
                    } else {
                        local.clone()
                    };
                    specifiers.push(ExportSpecifier { local, exported });
                    if !self.check(&TokenKind::RBrace) {
                        self.expect(&TokenKind::Comma)?;
                    }
                }
                let source = if self.eat_word("from") {
                    let source = self.expect_string()?;
                    self.skip_import_attributes()?;
                    Some(source)
                } else {
                    None
                };
                self.expect_semicolon()?;
                ExportDecl::Named { specifiers, source }
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const | TokenKind::Function | TokenKind::Class => {
                ExportDecl::Decl(self.parse_stmt()?)
            }
            TokenKind::Identifier(name) if name == "async" => ExportDecl::Decl(self.parse_stmt()?),
            _ => return Err(self.unexpected()),
        };

        Ok(Stmt::new(StmtKind::Export(Box::new(decl)), self.span_from(start)))
    }

    fn expect_export_name(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = self.peek() {
            let value = value.clone();
            self.advance();
            return Ok(value);
        }
        self.expect_name()
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let first = self.parse_assign_expr()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assign_expr()?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    pub(crate) fn parse_assign_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_assign_expr_at_depth)
    }

    fn parse_assign_expr_at_depth(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;

        if self.context.is_generator && self.is_word("yield") {
            return self.parse_yield_expr();
        }

        // Single-param arrow: `x => expr`
        if let TokenKind::Identifier(name) = self.peek() {
            let name = name.clone();
            let next = self.lexer.peek();
            if matches!(next.kind, TokenKind::Arrow) && !next.had_newline_before {
                self.advance();
                let param = Param {
                    binding: Binding::new(BindingKind::Ident(name), self.span_from(start)),
                    default: None,
                    rest: false,
                    span: self.span_from(start),
                };
                self.advance();
                return self.parse_arrow_body(vec![param], false, start);
            }
        }

        let left = self.parse_conditional_expr()?;

        if let Some(op) = self.assign_op() {
            self.advance();
            let right = self.parse_assign_expr()?;
            return Ok(Expr::new(
                ExprKind::Assign {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            ));
        }

        Ok(left)
    }

    fn parse_yield_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.advance();
        let delegate = !self.current.had_newline_before && self.eat(&TokenKind::Star);
        let has_arg = delegate
            || (!self.current.had_newline_before
                && self.peek().can_start_expr()
                && !matches!(self.peek(), TokenKind::Lt));
        let arg = if has_arg {
            Some(Box::new(self.parse_assign_expr()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Yield { arg, delegate }, self.span_from(start)))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        match self.peek() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::AddAssign),
            TokenKind::MinusEq => Some(AssignOp::SubAssign),
            TokenKind::StarEq => Some(AssignOp::MulAssign),
            TokenKind::SlashEq => Some(AssignOp::DivAssign),
            TokenKind::PercentEq => Some(AssignOp::ModAssign),
            TokenKind::StarStarEq => Some(AssignOp::PowAssign),
            TokenKind::LtLtEq => Some(AssignOp::ShlAssign),
            TokenKind::GtGtEq => Some(AssignOp::ShrAssign),
            TokenKind::GtGtGtEq => Some(AssignOp::UShrAssign),
            TokenKind::PipeEq => Some(AssignOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignOp::BitXorAssign),
            TokenKind::AmpEq => Some(AssignOp::BitAndAssign),
            TokenKind::AmpAmpEq => Some(AssignOp::AndAssign),
            TokenKind::PipePipeEq => Some(AssignOp::OrAssign),
            TokenKind::QuestionQuestionEq => Some(AssignOp::NullishAssign),
            _ => None,
        }
    }

    fn parse_conditional_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let test = self.parse_binary_expr(0)?;

        if self.eat(&TokenKind::Question) {
            let saved_in = std::mem::replace(&mut self.allow_in, true);
            let consequent = self.parse_assign_expr();
            self.allow_in = saved_in;
            let consequent = consequent?;
            self.expect(&TokenKind::Colon)?;
            let alternate = self.parse_assign_expr()?;
            return Ok(Expr::new(
                ExprKind::Conditional {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                },
                self.span_from(start),
            ));
        }

        Ok(test)
    }

    /// Precedence climbing over binary operators.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut left = self.parse_unary_expr()?;

        loop {
            let Some(prec) = self.peek().binary_precedence() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let Some(op) = self.binary_op() else {
                break;
            };
            let is_right_assoc = self.peek().is_right_associative();
            self.advance();

            let next_prec = if is_right_assoc { prec } else { prec + 1 };
            let right = self.nested(|p| p.parse_binary_expr(next_prec))?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }

        Ok(left)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.peek() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            TokenKind::StarStar => Some(BinaryOp::Pow),
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::BangEq => Some(BinaryOp::NotEq),
            TokenKind::EqEqEq => Some(BinaryOp::StrictEq),
            TokenKind::BangEqEq => Some(BinaryOp::StrictNotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::Pipe => Some(BinaryOp::BitOr),
            TokenKind::Caret => Some(BinaryOp::BitXor),
            TokenKind::Amp => Some(BinaryOp::BitAnd),
            TokenKind::LtLt => Some(BinaryOp::Shl),
            TokenKind::GtGt => Some(BinaryOp::Shr),
            TokenKind::GtGtGt => Some(BinaryOp::UShr),
            TokenKind::AmpAmp => Some(BinaryOp::And),
            TokenKind::PipePipe => Some(BinaryOp::Or),
            TokenKind::QuestionQuestion => Some(BinaryOp::NullishCoalesce),
            TokenKind::In if self.allow_in => Some(BinaryOp::In),
            TokenKind::Instanceof => Some(BinaryOp::Instanceof),
            _ => None,
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;

        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let arg = self.nested(Self::parse_unary_expr)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                },
                self.span_from(start),
            ));
        }

        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.check(&TokenKind::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.advance();
            let arg = self.nested(Self::parse_unary_expr)?;
            return Ok(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    arg: Box::new(arg),
                },
                self.span_from(start),
            ));
        }

        // `await` is an operator in async functions and at module top level.
        if self.is_word("await") && (self.context.is_async || !self.context.in_function) {
            let next = self.lexer.peek();
            if next.kind.can_start_expr() && !matches!(next.kind, TokenKind::Lt) {
                self.advance();
                let arg = self.nested(Self::parse_unary_expr)?;
                return Ok(Expr::new(ExprKind::Await(Box::new(arg)), self.span_from(start)));
            }
        }

        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let expr = self.parse_lhs_expr()?;

        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current.had_newline_before
        {
            let op = if self.check(&TokenKind::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.advance();
            return Ok(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    arg: Box::new(expr),
                },
                self.span_from(start),
            ));
        }

        Ok(expr)
    }

    /// Member access, calls, `new`, tagged templates.
    pub(crate) fn parse_lhs_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expr()?
        } else {
            self.parse_primary_expr()?
        };

        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    expr = member(expr, property, false, self.span_from(start));
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    expr = match self.peek() {
                        TokenKind::LParen => {
                            let args = self.parse_arguments()?;
                            Expr::new(
                                ExprKind::Call {
                                    callee: Box::new(expr),
                                    args,
                                    optional: true,
                                },
                                self.span_from(start),
                            )
                        }
                        TokenKind::LBracket => {
                            self.advance();
                            let property = self.parse_expr()?;
                            self.expect(&TokenKind::RBracket)?;
                            member(expr, MemberProp::Computed(Box::new(property)), true, self.span_from(start))
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            member(expr, property, true, self.span_from(start))
                        }
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let saved_in = std::mem::replace(&mut self.allow_in, true);
                    let property = self.parse_expr();
                    self.allow_in = saved_in;
                    let property = property?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = member(expr, MemberProp::Computed(Box::new(property)), false, self.span_from(start));
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            optional: false,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                    let (quasis, exprs) = self.parse_template_parts()?;
                    expr = Expr::new(
                        ExprKind::TaggedTemplate {
                            tag: Box::new(expr),
                            quasis,
                            exprs,
                        },
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_new_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::New)?;

        if self.eat(&TokenKind::Dot) {
            let property = self.expect_identifier()?;
            return Ok(Expr::new(
                ExprKind::MetaProperty {
                    meta: "new".to_string(),
                    property,
                },
                self.span_from(start),
            ));
        }

        // The callee is a member expression without calls.
        let mut callee = if self.check(&TokenKind::New) {
            self.nested(Self::parse_new_expr)?
        } else {
            self.parse_primary_expr()?
        };
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    callee = member(callee, property, false, self.span_from(start));
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    callee = member(callee, MemberProp::Computed(Box::new(property)), false, self.span_from(start));
                }
                _ => break,
            }
        }

        let args = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            self.span_from(start),
        ))
    }

    fn parse_member_name(&mut self) -> Result<MemberProp, ParseError> {
        if let TokenKind::PrivateName(name) = self.peek() {
            let name = name.clone();
            self.advance();
            return Ok(MemberProp::Private(name));
        }
        self.expect_name().map(MemberProp::Ident)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let mut args = Vec::new();
        let result = loop {
            if self.eat(&TokenKind::RParen) {
                break Ok(());
            }
            let start = self.current.span.start;
            let arg = if self.eat(&TokenKind::Spread) {
                self.parse_assign_expr()
                    .map(|e| Expr::new(ExprKind::Spread(Box::new(e)), self.span_from(start)))
            } else {
                self.parse_assign_expr()
            };
            match arg {
                Ok(arg) => args.push(arg),
                Err(err) => break Err(err),
            }
            if !self.check(&TokenKind::RParen) {
                if let Err(err) = self.expect(&TokenKind::Comma) {
                    break Err(err);
                }
            }
        };
        self.allow_in = saved_in;
        result.map(|()| args)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let simple = match self.peek() {
            TokenKind::Identifier(name) if name == "async" => return self.parse_async_primary(),
            TokenKind::Identifier(name) => Some(ExprKind::Ident(name.clone())),
            TokenKind::Number(raw) => Some(ExprKind::Number(raw.clone())),
            TokenKind::BigInt(raw) => Some(ExprKind::BigInt(raw.clone())),
            TokenKind::String(value) => Some(ExprKind::String(value.clone())),
            TokenKind::Regex { pattern, flags } => Some(ExprKind::Regex {
                pattern: pattern.clone(),
                flags: flags.clone(),
            }),
            TokenKind::Null => Some(ExprKind::Null),
            TokenKind::True => Some(ExprKind::Bool(true)),
            TokenKind::False => Some(ExprKind::Bool(false)),
            TokenKind::This => Some(ExprKind::This),
            TokenKind::Super => Some(ExprKind::Super),
            _ => None,
        };
        if let Some(kind) = simple {
            self.advance();
            return Ok(Expr::new(kind, self.span_from(start)));
        }

        match self.peek() {
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LParen => self.parse_paren_or_arrow(false, start),
            TokenKind::Function => {
                let function = self.parse_function(false, start)?;
                Ok(Expr::new(ExprKind::Function(Box::new(function)), self.span_from(start)))
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                Ok(Expr::new(ExprKind::Class(Box::new(class)), self.span_from(start)))
            }
            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                let (quasis, exprs) = self.parse_template_parts()?;
                Ok(Expr::new(ExprKind::Template { quasis, exprs }, self.span_from(start)))
            }
            TokenKind::Import => {
                self.advance();
                if self.eat(&TokenKind::Dot) {
                    let property = self.expect_identifier()?;
                    return Ok(Expr::new(
                        ExprKind::MetaProperty {
                            meta: "import".to_string(),
                            property,
                        },
                        self.span_from(start),
                    ));
                }
                self.expect(&TokenKind::LParen)?;
                let arg = self.parse_assign_expr()?;
                // Optional import options argument
                if self.eat(&TokenKind::Comma) && !self.check(&TokenKind::RParen) {
                    let _ = self.parse_assign_expr()?;
                    self.eat(&TokenKind::Comma);
                }
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::new(ExprKind::Import(Box::new(arg)), self.span_from(start)))
            }
            TokenKind::Lt => self.parse_jsx_element_or_fragment(JsxFollow::Expr),
            _ => Err(self.unexpected()),
        }
    }

    /// `async function`, `async (a) => b`, `async x => y`, or a plain
    /// identifier named `async`.
    fn parse_async_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let next = self.lexer.peek();
        if !next.had_newline_before {
            match next.kind {
                TokenKind::Function => {
                    self.advance();
                    let function = self.parse_function(true, start)?;
                    return Ok(Expr::new(ExprKind::Function(Box::new(function)), self.span_from(start)));
                }
                TokenKind::LParen => {
                    self.advance();
                    return self.parse_paren_or_arrow(true, start);
                }
                TokenKind::Identifier(_) => {
                    let saved = self.lexer.clone();
                    let _ = self.lexer.next_token();
                    let is_arrow = matches!(self.lexer.next_token().kind, TokenKind::Arrow);
                    self.lexer = saved;
                    if is_arrow {
                        self.advance();
                        let param_start = self.current.span.start;
                        let name = self.expect_identifier()?;
                        let span = self.span_from(param_start);
                        self.expect(&TokenKind::Arrow)?;
                        let param = Param {
                            binding: Binding::new(BindingKind::Ident(name), span),
                            default: None,
                            rest: false,
                            span,
                        };
                        return self.parse_arrow_body(vec![param], true, start);
                    }
                }
                _ => {}
            }
        }
        self.advance();
        Ok(Expr::new(ExprKind::Ident("async".to_string()), self.span_from(start)))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBracket)?;
        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let mut elements = Vec::new();
        let result = loop {
            if self.eat(&TokenKind::RBracket) {
                break Ok(());
            }
            if self.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            let elem_start = self.current.span.start;
            let element = if self.eat(&TokenKind::Spread) {
                self.parse_assign_expr()
                    .map(|e| Expr::new(ExprKind::Spread(Box::new(e)), self.span_from(elem_start)))
            } else {
                self.parse_assign_expr()
            };
            match element {
                Ok(element) => elements.push(Some(element)),
                Err(err) => break Err(err),
            }
            if !self.check(&TokenKind::RBracket) {
                if let Err(err) = self.expect(&TokenKind::Comma) {
                    break Err(err);
                }
            }
        };
        self.allow_in = saved_in;
        result?;
        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let mut props = Vec::new();
        let result = loop {
            if self.eat(&TokenKind::RBrace) {
                break Ok(());
            }
            match self.parse_object_prop() {
                Ok(prop) => props.push(prop),
                Err(err) => break Err(err),
            }
            if !self.check(&TokenKind::RBrace) {
                if let Err(err) = self.expect(&TokenKind::Comma) {
                    break Err(err);
                }
            }
        };
        self.allow_in = saved_in;
        result?;
        Ok(Expr::new(ExprKind::Object(props), self.span_from(start)))
    }

    fn parse_object_prop(&mut self) -> Result<ObjectProp, ParseError> {
        let start = self.current.span.start;
        if self.eat(&TokenKind::Spread) {
            let arg = self.parse_assign_expr()?;
            return Ok(ObjectProp::Spread(arg));
        }

        let is_async = self.is_word("async") && self.is_property_modifier();
        if is_async {
            self.advance();
        }
        let is_generator = self.eat(&TokenKind::Star);
        let mut kind = PropertyKind::Init;
        if !is_async && !is_generator && (self.is_word("get") || self.is_word("set")) && self.is_property_modifier() {
            kind = if self.is_word("get") { PropertyKind::Get } else { PropertyKind::Set };
            self.advance();
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) {
            let fn_start = self.current.span.start;
            let (params, body) = self.parse_function_rest(is_async, is_generator)?;
            let function = Function {
                name: None,
                params,
                body,
                is_async,
                is_generator,
                span: self.span_from(fn_start),
            };
            if kind == PropertyKind::Init {
                kind = PropertyKind::Method;
            }
            return Ok(ObjectProp::Property(Property {
                key,
                value: Expr::new(ExprKind::Function(Box::new(function)), self.span_from(fn_start)),
                kind,
                shorthand: false,
                span: self.span_from(start),
            }));
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.parse_assign_expr()?;
            return Ok(ObjectProp::Property(Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                span: self.span_from(start),
            }));
        }

        // Shorthand, possibly with a cover-grammar default: `{ a = 1 } = obj`
        let PropertyKey::Ident(name) = &key else {
            return Err(self.unexpected());
        };
        let mut value = Expr::new(ExprKind::Ident(name.clone()), self.span_from(start));
        if self.eat(&TokenKind::Eq) {
            let default = self.parse_assign_expr()?;
            value = Expr::new(
                ExprKind::Assign {
                    op: AssignOp::Assign,
                    left: Box::new(value),
                    right: Box::new(default),
                },
                self.span_from(start),
            );
        }
        Ok(ObjectProp::Property(Property {
            key,
            value,
            kind: PropertyKind::Init,
            shorthand: true,
            span: self.span_from(start),
        }))
    }

    fn is_property_modifier(&mut self) -> bool {
        let next = self.lexer.peek();
        !matches!(
            next.kind,
            TokenKind::LParen | TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::Eq
        )
    }

    /// `( ... )` as either a parenthesized expression or arrow parameters.
    fn parse_paren_or_arrow(&mut self, is_async: bool, outer_start: u32) -> Result<Expr, ParseError> {
        let paren_start = self.current.span.start;
        self.expect(&TokenKind::LParen)?;
        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let result = self.parse_paren_contents(is_async, outer_start, paren_start);
        self.allow_in = saved_in;
        result
    }

    fn parse_paren_contents(&mut self, is_async: bool, outer_start: u32, paren_start: u32) -> Result<Expr, ParseError> {
        let mut exprs = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Spread) {
                let rest_start = self.current.span.start;
                self.advance();
                let binding = self.parse_binding()?;
                rest = Some(Param {
                    binding,
                    default: None,
                    rest: true,
                    span: self.span_from(rest_start),
                });
                self.eat(&TokenKind::Comma);
                break;
            }
            exprs.push(self.parse_assign_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        if self.check(&TokenKind::Arrow) && !self.current.had_newline_before {
            self.advance();
            let mut params = self.exprs_to_params(exprs)?;
            params.extend(rest);
            return self.parse_arrow_body(params, is_async, outer_start);
        }

        if rest.is_some() {
            return Err(ParseError::new("Rest element must be an arrow parameter", self.current.span));
        }

        if is_async {
            let callee = Expr::new(ExprKind::Ident("async".to_string()), Span::new(outer_start, paren_start));
            return Ok(Expr::new(
                ExprKind::Call {
                    callee: Box::new(callee),
                    args: exprs,
                    optional: false,
                },
                self.span_from(outer_start),
            ));
        }

        match exprs.len() {
            0 => Err(self.unexpected()),
            1 => Ok(exprs.remove(0)),
            _ => Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(outer_start))),
        }
    }

    fn exprs_to_params(&self, exprs: Vec<Expr>) -> Result<Vec<Param>, ParseError> {
        exprs.into_iter().map(|expr| self.expr_to_param(expr)).collect()
    }

    fn expr_to_param(&self, expr: Expr) -> Result<Param, ParseError> {
        let span = expr.span;
        match expr.kind {
            ExprKind::Assign {
                op: AssignOp::Assign,
                left,
                right,
            } => Ok(Param {
                binding: self.expr_to_binding(*left)?,
                default: Some(*right),
                rest: false,
                span,
            }),
            kind => Ok(Param {
                binding: self.expr_to_binding(Expr::new(kind, span))?,
                default: None,
                rest: false,
                span,
            }),
        }
    }

    /// Reinterpret an expression as a binding pattern.
    pub(crate) fn expr_to_binding(&self, expr: Expr) -> Result<Binding, ParseError> {
        let span = expr.span;
        match expr.kind {
            ExprKind::Ident(name) => Ok(Binding::new(BindingKind::Ident(name), span)),
            ExprKind::Array(elements) => {
                let mut bindings = Vec::new();
                for element in elements {
                    let Some(element) = element else {
                        bindings.push(None);
                        continue;
                    };
                    let (binding, default, rest) = match element.kind {
                        ExprKind::Spread(inner) => (self.expr_to_binding(*inner)?, None, true),
                        ExprKind::Assign {
                            op: AssignOp::Assign,
                            left,
                            right,
                        } => (self.expr_to_binding(*left)?, Some(*right), false),
                        kind => (self.expr_to_binding(Expr::new(kind, element.span))?, None, false),
                    };
                    bindings.push(Some(ArrayPatternElement {
                        binding,
                        default,
                        rest,
                    }));
                }
                Ok(Binding::new(BindingKind::Array(bindings), span))
            }
            ExprKind::Object(props) => {
                let mut properties = Vec::new();
                for prop in props {
                    match prop {
                        ObjectProp::Spread(arg) => properties.push(ObjectPatternProperty {
                            key: PropertyKey::Ident(String::new()),
                            value: self.expr_to_binding(arg)?,
                            default: None,
                            shorthand: false,
                            rest: true,
                        }),
                        ObjectProp::Property(prop) => {
                            if prop.kind != PropertyKind::Init {
                                return Err(ParseError::new("Invalid destructuring target", prop.span));
                            }
                            let (value, default) = match prop.value.kind {
                                ExprKind::Assign {
                                    op: AssignOp::Assign,
                                    left,
                                    right,
                                } => (self.expr_to_binding(*left)?, Some(*right)),
                                kind => (self.expr_to_binding(Expr::new(kind, prop.value.span))?, None),
                            };
                            properties.push(ObjectPatternProperty {
                                key: prop.key,
                                value,
                                default,
                                shorthand: prop.shorthand,
                                rest: false,
                            });
                        }
                    }
                }
                Ok(Binding::new(BindingKind::Object(properties), span))
            }
            _ => Err(ParseError::new("Invalid destructuring target", span)),
        }
    }

    fn parse_arrow_body(&mut self, params: Vec<Param>, is_async: bool, start: u32) -> Result<Expr, ParseError> {
        let context = FnContext {
            in_function: true,
            is_async,
            is_generator: false,
        };
        let saved_in = self.allow_in;
        let body = if self.check(&TokenKind::LBrace) {
            ArrowBody::Block(self.with_context(context, Self::parse_function_body)?)
        } else {
            let saved_context = std::mem::replace(&mut self.context, context);
            let body = self.parse_assign_expr();
            self.context = saved_context;
            ArrowBody::Expr(Box::new(body?))
        };
        self.allow_in = saved_in;

        Ok(Expr::new(
            ExprKind::Arrow(Box::new(ArrowFunction {
                params,
                body,
                is_async,
                span: self.span_from(start),
            })),
            self.span_from(start),
        ))
    }

    /// Template parts from a `TemplateNoSub` or `TemplateHead` token.
    fn parse_template_parts(&mut self) -> Result<(Vec<String>, Vec<Expr>), ParseError> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();

        match self.peek() {
            TokenKind::TemplateNoSub(text) => {
                quasis.push(text.clone());
                self.advance();
                return Ok((quasis, exprs));
            }
            TokenKind::TemplateHead(text) => {
                quasis.push(text.clone());
                self.advance();
            }
            _ => return Err(self.unexpected()),
        }

        let saved_in = std::mem::replace(&mut self.allow_in, true);
        let result = loop {
            match self.parse_expr() {
                Ok(expr) => exprs.push(expr),
                Err(err) => break Err(err),
            }
            if !self.check(&TokenKind::RBrace) {
                break Err(self.unexpected());
            }
            // The lexer sits just past the `}`; read the continuation from there.
            self.current = self.lexer.scan_template_continuation();
            match self.peek() {
                TokenKind::TemplateMiddle(text) => {
                    quasis.push(text.clone());
                    self.advance();
                }
                TokenKind::TemplateTail(text) => {
                    quasis.push(text.clone());
                    self.advance();
                    break Ok(());
                }
                _ => break Err(ParseError::new("Unterminated template", self.current.span)),
            }
        };
        self.allow_in = saved_in;
        result.map(|()| (quasis, exprs))
    }
}

fn member(object: Expr, property: MemberProp, optional: bool, span: Span) -> Expr {
    Expr::new(
        ExprKind::Member {
            object: Box::new(object),
            property,
            optional,
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source).parse()
    }

    fn first_expr(source: &str) -> ExprKind {
        let program = parse(source).unwrap();
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr.kind,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_declaration() {
        let program = parse("let x = 1, y;").unwrap();
        assert_eq!(program.body.len(), 1);
        let StmtKind::Var { kind, decls } = &program.body[0].kind else {
            panic!("expected var");
        };
        assert_eq!(*kind, VarKind::Let);
        assert_eq!(decls.len(), 2);
    }

    #[test]
    fn test_function_declaration() {
        let program = parse("function foo(a, b = 2, ...rest) { return a + b; }").unwrap();
        let StmtKind::Function(function) = &program.body[0].kind else {
            panic!("expected function");
        };
        assert_eq!(function.name.as_deref(), Some("foo"));
        assert_eq!(function.params.len(), 3);
        assert!(function.params[1].default.is_some());
        assert!(function.params[2].rest);
    }

    #[test]
    fn test_binary_precedence() {
        let ExprKind::Binary { op, right, .. } = first_expr("1 + 2 * 3;") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(first_expr("(a, b) => a + b;"), ExprKind::Arrow(_)));
        assert!(matches!(first_expr("x => x * 2;"), ExprKind::Arrow(_)));
        assert!(matches!(first_expr("async (x) => await x;"), ExprKind::Arrow(a) if a.is_async));
        assert!(matches!(first_expr("({ a, b: [c] }, ...d) => c;"), ExprKind::Arrow(a) if a.params.len() == 2));
    }

    #[test]
    fn test_parenthesized_sequence() {
        assert!(matches!(first_expr("(a, b);"), ExprKind::Sequence(v) if v.len() == 2));
    }

    #[test]
    fn test_class_members() {
        let program = parse(
            "class Foo extends Bar { count = 0; static #secret; constructor() { super(); } get value() { return 1; } static { init(); } async *gen() {} }",
        )
        .unwrap();
        let StmtKind::Class(class) = &program.body[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.body.len(), 6);
        assert!(matches!(
            class.body[2].kind,
            ClassMemberKind::Method { kind: MethodKind::Constructor, .. }
        ));
        assert!(matches!(class.body[3].kind, ClassMemberKind::Method { kind: MethodKind::Get, .. }));
        assert!(matches!(class.body[4].kind, ClassMemberKind::StaticBlock(_)));
    }

    #[test]
    fn test_optional_chaining_and_nullish() {
        let ExprKind::Binary { op, left, .. } = first_expr("a?.b?.[c] ?? d;") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::NullishCoalesce);
        assert!(matches!(left.kind, ExprKind::Member { optional: true, .. }));
    }

    #[test]
    fn test_template_literal() {
        let ExprKind::Template { quasis, exprs } = first_expr("`a${b}c${d}`;") else {
            panic!("expected template");
        };
        assert_eq!(quasis, vec!["a", "c", ""]);
        assert_eq!(exprs.len(), 2);
    }

    #[test]
    fn test_tagged_template() {
        assert!(matches!(first_expr("tag`x${y}`;"), ExprKind::TaggedTemplate { .. }));
    }

    #[test]
    fn test_for_variants() {
        let program = parse("for (const [k, v] of map) {} for (let i = 0; i < n; i++) {} for (key in obj);").unwrap();
        assert!(matches!(program.body[0].kind, StmtKind::ForOf { .. }));
        assert!(matches!(program.body[1].kind, StmtKind::For { .. }));
        assert!(matches!(program.body[2].kind, StmtKind::ForIn { .. }));
    }

    #[test]
    fn test_imports_and_exports() {
        let program = parse(
            "import React, { useState as useS } from 'react';\nimport * as fs from 'fs';\nexport default function App() {}\nexport { a as b };\nexport const c = 1;",
        )
        .unwrap();
        let StmtKind::Import(import) = &program.body[0].kind else {
            panic!("expected import");
        };
        assert_eq!(import.specifiers.len(), 2);
        assert_eq!(import.specifiers[1].local(), "useS");
        assert_eq!(program.body.len(), 5);
    }

    #[test]
    fn test_asi() {
        let program = parse("let a = 1\nlet b = 2\nreturn_value()").unwrap();
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_directive_prologue() {
        let program = parse("'use strict';\nfoo();").unwrap();
        assert!(matches!(&program.body[0].kind, StmtKind::Directive(d) if d == "use strict"));
    }

    #[test]
    fn test_labels_and_regex() {
        let program = parse("outer: for (;;) { if (/a+/.test(s)) break outer; }").unwrap();
        assert!(matches!(program.body[0].kind, StmtKind::Labeled { .. }));
    }

    #[test]
    fn test_syntax_error_span() {
        let err = parse("let = ;").unwrap_err();
        assert_eq!(err.span.start, 4);
        assert!(err.message.starts_with("Unexpected token"));
        assert!(parse("function (").is_err());
        assert!(parse("a +").is_err());
    }
}
