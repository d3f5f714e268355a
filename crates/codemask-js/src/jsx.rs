//! JSX parsing (extension methods on Parser).
//!
//! JSX needs its own scanning modes: tag and attribute names may contain
//! `-`, and text between tags is not tokenized at all. The parser drives
//! the lexer through those modes by re-scanning from the end of the
//! current token.

use crate::ast::*;
use crate::parser::{ParseError, Parser};
use crate::span::Span;
use crate::token::TokenKind;

/// What the parser expects after the `>` that closes a JSX tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JsxFollow {
    /// Ordinary JavaScript, the element was an expression.
    Expr,
    /// More children of an enclosing element.
    Child,
    /// More attributes of an enclosing tag.
    Attribute,
}

enum JsxNode {
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
}

impl<'a> Parser<'a> {
    /// Parse a JSX element or fragment starting at `<`.
    pub(crate) fn parse_jsx_element_or_fragment(&mut self, follow: JsxFollow) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let node = self.parse_jsx_node(follow)?;
        let kind = match node {
            JsxNode::Element(element) => ExprKind::JsxElement(element),
            JsxNode::Fragment(fragment) => ExprKind::JsxFragment(fragment),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_jsx_node(&mut self, follow: JsxFollow) -> Result<JsxNode, ParseError> {
        let start = self.current.span.start;
        if !self.check(&TokenKind::Lt) {
            return Err(self.unexpected());
        }
        self.bump_jsx_name();

        // `<>children</>`
        if self.check(&TokenKind::Gt) {
            self.finish_jsx_tag(JsxFollow::Child)?;
            let children = self.parse_jsx_children()?;
            self.bump_jsx_name();
            if !self.check(&TokenKind::Gt) {
                return Err(ParseError::new(
                    "Expected corresponding closing tag for JSX fragment",
                    self.current.span,
                ));
            }
            self.finish_jsx_tag(follow)?;
            return Ok(JsxNode::Fragment(Box::new(JsxFragment {
                children,
                span: self.span_from(start),
            })));
        }

        let name = self.parse_jsx_element_name()?;
        let attributes = self.parse_jsx_attributes()?;

        // `<Tag ... />`
        if self.check(&TokenKind::Slash) {
            self.bump_jsx_name();
            self.finish_jsx_tag(follow)?;
            return Ok(JsxNode::Element(Box::new(JsxElement {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: self.span_from(start),
            })));
        }

        self.finish_jsx_tag(JsxFollow::Child)?;
        let children = self.parse_jsx_children()?;

        // `</Tag>`
        let close_start = self.current.span.start;
        self.bump_jsx_name();
        let closing = self.parse_jsx_element_name()?;
        if closing != name {
            return Err(ParseError::new(
                format!(
                    "Expected corresponding JSX closing tag for <{}>",
                    jsx_name_text(&name)
                ),
                Span::new(close_start, self.prev_end),
            ));
        }
        self.finish_jsx_tag(follow)?;

        Ok(JsxNode::Element(Box::new(JsxElement {
            name,
            attributes,
            children,
            self_closing: false,
            span: self.span_from(start),
        })))
    }

    /// `Tag`, `Foo.Bar.Baz` or `svg:rect`. Leaves the token after the name
    /// in JSX-name mode.
    fn parse_jsx_element_name(&mut self) -> Result<JsxElementName, ParseError> {
        let first = self.expect_jsx_identifier()?;

        if self.check(&TokenKind::Colon) {
            self.bump_jsx_name();
            let name = self.expect_jsx_identifier()?;
            return Ok(JsxElementName::NamespacedName { namespace: first, name });
        }

        if self.check(&TokenKind::Dot) {
            let mut parts = vec![first];
            while self.check(&TokenKind::Dot) {
                self.bump_jsx_name();
                parts.push(self.expect_jsx_identifier()?);
            }
            return Ok(JsxElementName::MemberExpr(parts));
        }

        Ok(JsxElementName::Ident(first))
    }

    fn expect_jsx_identifier(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            TokenKind::Identifier(name) => name.clone(),
            other => match other.keyword_text() {
                Some(text) => text.to_string(),
                None => return Err(self.unexpected()),
            },
        };
        self.bump_jsx_name();
        Ok(name)
    }

    fn parse_jsx_attributes(&mut self) -> Result<Vec<JsxAttribute>, ParseError> {
        let mut attributes = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Gt | TokenKind::Slash => break,
                // `{...props}`
                TokenKind::LBrace => {
                    self.advance();
                    self.expect(&TokenKind::Spread)?;
                    let arg = self.parse_assign_expr()?;
                    self.expect_jsx_close_brace()?;
                    self.bump_jsx_name();
                    attributes.push(JsxAttribute::Spread(arg));
                }
                TokenKind::Eof => return Err(self.unexpected()),
                _ => {
                    let first = self.expect_jsx_identifier()?;
                    let name = if self.check(&TokenKind::Colon) {
                        self.bump_jsx_name();
                        let name = self.expect_jsx_identifier()?;
                        JsxAttrName::NamespacedName { namespace: first, name }
                    } else {
                        JsxAttrName::Ident(first)
                    };

                    let value = if self.check(&TokenKind::Eq) {
                        self.bump_jsx_name();
                        Some(self.parse_jsx_attribute_value()?)
                    } else {
                        None
                    };
                    attributes.push(JsxAttribute::Attribute { name, value });
                }
            }
        }

        Ok(attributes)
    }

    fn parse_jsx_attribute_value(&mut self) -> Result<JsxAttrValue, ParseError> {
        match self.peek() {
            TokenKind::String(value) => {
                let value = value.clone();
                self.bump_jsx_name();
                Ok(JsxAttrValue::String(value))
            }
            TokenKind::LBrace => {
                self.advance();
                let expr = self.parse_assign_expr()?;
                self.expect_jsx_close_brace()?;
                self.bump_jsx_name();
                Ok(JsxAttrValue::Expr(expr))
            }
            TokenKind::Lt => match self.nested(|p| p.parse_jsx_node(JsxFollow::Attribute))? {
                JsxNode::Element(element) => Ok(JsxAttrValue::Element(element)),
                JsxNode::Fragment(fragment) => Ok(JsxAttrValue::Fragment(fragment)),
            },
            _ => Err(ParseError::new(
                "JSX value should be either an expression or a quoted JSX text",
                self.current.span,
            )),
        }
    }

    /// Children up to (not including) the `</` of the closing tag.
    fn parse_jsx_children(&mut self) -> Result<Vec<JsxChild>, ParseError> {
        let mut children = Vec::new();

        loop {
            match self.peek() {
                TokenKind::JsxCloseStart => break,
                TokenKind::JsxText(text) => {
                    children.push(JsxChild::Text(text.clone()));
                    self.bump_jsx_child();
                }
                TokenKind::LBrace => {
                    self.advance();
                    if self.check(&TokenKind::RBrace) {
                        children.push(JsxChild::Expr(None));
                    } else if self.eat(&TokenKind::Spread) {
                        children.push(JsxChild::Spread(self.parse_expr()?));
                    } else {
                        children.push(JsxChild::Expr(Some(self.parse_expr()?)));
                    }
                    self.expect_jsx_close_brace()?;
                    self.bump_jsx_child();
                }
                TokenKind::Lt => match self.nested(|p| p.parse_jsx_node(JsxFollow::Child))? {
                    JsxNode::Element(element) => children.push(JsxChild::Element(element)),
                    JsxNode::Fragment(fragment) => children.push(JsxChild::Fragment(fragment)),
                },
                _ => {
                    return Err(ParseError::new(
                        "Unterminated JSX contents",
                        self.current.span,
                    ))
                }
            }
        }

        Ok(children)
    }

    fn expect_jsx_close_brace(&self) -> Result<(), ParseError> {
        if self.check(&TokenKind::RBrace) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume the closing `>` of a tag and scan the next token in the
    /// mode `follow` asks for. A `>` glued to following text (`>=`, `>>`)
    /// is split here.
    fn finish_jsx_tag(&mut self, follow: JsxFollow) -> Result<(), ParseError> {
        if !matches!(
            self.peek(),
            TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::GtGt
                | TokenKind::GtGtEq
                | TokenKind::GtGtGt
                | TokenKind::GtGtGtEq
        ) {
            return Err(ParseError::new("Expected '>' in JSX tag", self.current.span));
        }
        let after = self.current.span.start + 1;
        self.prev_end = after;
        self.lexer.reset(after);
        self.current = match follow {
            JsxFollow::Expr => self.lexer.next_token(),
            JsxFollow::Child => self.lexer.next_jsx_child(),
            JsxFollow::Attribute => self.lexer.next_jsx_name(),
        };
        Ok(())
    }

    /// Consume the current token and scan the next as a JSX name.
    fn bump_jsx_name(&mut self) {
        let end = self.current.span.end;
        self.prev_end = end;
        self.lexer.reset(end);
        self.current = self.lexer.next_jsx_name();
    }

    /// Consume the current token and scan the next as a JSX child.
    fn bump_jsx_child(&mut self) {
        let end = self.current.span.end;
        self.prev_end = end;
        self.lexer.reset(end);
        self.current = self.lexer.next_jsx_child();
    }
}

fn jsx_name_text(name: &JsxElementName) -> String {
    match name {
        JsxElementName::Ident(name) => name.clone(),
        JsxElementName::MemberExpr(parts) => parts.join("."),
        JsxElementName::NamespacedName { namespace, name } => format!("{namespace}:{name}"),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::Parser;

    fn parse_jsx(source: &str) -> ExprKind {
        let program = Parser::new(source).parse().unwrap();
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr.kind,
            Some(StmtKind::Return { arg: Some(expr) }) => expr.kind,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn test_self_closing_element() {
        let ExprKind::JsxElement(element) = parse_jsx("<br />;") else {
            panic!("expected element");
        };
        assert!(element.self_closing);
        assert_eq!(element.name, JsxElementName::Ident("br".to_string()));
    }

    #[test]
    fn test_attributes() {
        let ExprKind::JsxElement(element) =
            parse_jsx(r#"<div className="box" data-id={id} hidden {...rest} />;"#)
        else {
            panic!("expected element");
        };
        assert_eq!(element.attributes.len(), 4);
        assert!(matches!(
            &element.attributes[1],
            JsxAttribute::Attribute { name: JsxAttrName::Ident(n), value: Some(JsxAttrValue::Expr(_)) } if n == "data-id"
        ));
        assert!(matches!(element.attributes[3], JsxAttribute::Spread(_)));
    }

    #[test]
    fn test_children_and_text() {
        let ExprKind::JsxElement(element) = parse_jsx("<p>Hello, {name}! <b>bold</b>{/* note */}</p>;") else {
            panic!("expected element");
        };
        assert_eq!(element.children.len(), 5);
        assert!(matches!(&element.children[0], JsxChild::Text(t) if t == "Hello, "));
        assert!(matches!(element.children[1], JsxChild::Expr(Some(_))));
        assert!(matches!(element.children[3], JsxChild::Element(_)));
        assert!(matches!(element.children[4], JsxChild::Expr(None)));
    }

    #[test]
    fn test_fragment_and_member_names() {
        let ExprKind::JsxFragment(fragment) = parse_jsx("<><Foo.Bar /><svg:rect /></>;") else {
            panic!("expected fragment");
        };
        assert_eq!(fragment.children.len(), 2);
        let JsxChild::Element(first) = &fragment.children[0] else {
            panic!("expected element");
        };
        assert_eq!(
            first.name,
            JsxElementName::MemberExpr(vec!["Foo".to_string(), "Bar".to_string()])
        );
    }

    #[test]
    fn test_jsx_in_return_and_after_expression() {
        let program = Parser::new("function App() { return <div>{items.map(i => <li>{i}</li>)}</div>; }\nlet x = a < b;")
            .parse()
            .unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = Parser::new("<div></span>;").parse().unwrap_err();
        assert!(err.message.contains("closing tag"));
    }
}
