//! Left-to-right rewrite of comment-free Python.
//!
//! [`Run`] owns everything that lives for one call: namers, the scope
//! stack, and the run-wide maps for definitions, properties and `self`
//! fields. [`Scanner`] walks one piece of text against a run. f-string
//! fields are rewritten by a nested scanner over the field text that
//! shares the same run.

use crate::comments::indent_width;
use crate::fsm::{Event, State};
use crate::fstring::{distribute, escape_for, is_prefix_char, FormatString, Literal};
use codemask_core::{FrameKind, FrontEndConfig, LiteralMasker, Namers, ReservedSet, Role, ScopeStack};
use rustc_hash::{FxHashMap, FxHashSet};

/// Keys for literals that must not share a phrase with ordinary strings.
const CASE_KEY: &str = "\u{0}case\u{0}";
const FORMAT_KEY: &str = "\u{0}f\u{0}";

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Per-call state.
pub struct Run<'c> {
    reserved: &'c ReservedSet,
    namers: Namers<'c>,
    scopes: ScopeStack,
    literals: LiteralMasker<'c>,
    functions: FxHashMap<String, String>,
    classes: FxHashMap<String, String>,
    properties: FxHashMap<String, String>,
    fields: FxHashMap<String, String>,
    imports: FxHashSet<String>,
}

impl<'c> Run<'c> {
    pub fn new(config: &'c FrontEndConfig, imports: FxHashSet<String>) -> Self {
        Self {
            reserved: &config.reserved,
            namers: Namers::new(&config.alphabet, config.overflow),
            scopes: ScopeStack::new(),
            literals: LiteralMasker::new(&config.phrases),
            functions: FxHashMap::default(),
            classes: FxHashMap::default(),
            properties: FxHashMap::default(),
            fields: FxHashMap::default(),
            imports,
        }
    }

    pub fn names_issued(&self) -> usize {
        self.namers.total_issued()
    }

    pub fn literals_masked(&self) -> usize {
        self.literals.len()
    }

    /// Names that are never rewritten.
    fn is_immune(&self, name: &str) -> bool {
        name == "self"
            || is_dunder(name)
            || self.reserved.contains(name)
            || self.imports.contains(name)
    }

    fn function(&mut self, name: &str) -> String {
        let namers = &mut self.namers;
        self.functions
            .entry(name.to_string())
            .or_insert_with(|| namers.next(Role::Function))
            .clone()
    }

    fn class(&mut self, name: &str) -> String {
        let namers = &mut self.namers;
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| namers.next(Role::Class))
            .clone()
    }

    fn property(&mut self, name: &str) -> String {
        let namers = &mut self.namers;
        self.properties
            .entry(name.to_string())
            .or_insert_with(|| namers.next(Role::Property))
            .clone()
    }

    /// `self.<name>`; a leading underscore survives renaming.
    fn field(&mut self, name: &str) -> String {
        let namers = &mut self.namers;
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| {
                let base = namers.next(Role::Field);
                if name.starts_with('_') {
                    format!("_{base}")
                } else {
                    base
                }
            })
            .clone()
    }

    /// An attribute after a dot: whichever run-wide map claims it.
    fn member(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .or_else(|| self.functions.get(name))
            .or_else(|| self.fields.get(name))
            .cloned()
    }

    /// A definition or class name used as a plain reference.
    fn definition(&self, name: &str) -> Option<String> {
        self.classes
            .get(name)
            .or_else(|| self.functions.get(name))
            .cloned()
    }

    /// Resolve through the scope stack, binding unknown names in the
    /// innermost frame.
    fn local(&mut self, name: &str) -> String {
        if let Some(found) = self.scopes.resolve(name) {
            return found.to_string();
        }
        self.scopes.declare(name, Role::Variable, &mut self.namers)
    }

    fn mask(&mut self, content: &str, case_pattern: bool) -> String {
        if case_pattern {
            self.literals.mask(&format!("{CASE_KEY}{content}"))
        } else {
            self.literals.mask(content)
        }
    }
}

/// The last significant token, for context decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    Ident { is_self: bool },
    Dot { after_self: bool },
    Punct(char),
    Other,
}

pub struct Scanner<'s, 'r, 'c> {
    src: &'s str,
    pos: usize,
    out: String,
    run: &'r mut Run<'c>,
    state: State,
    /// Open brackets on the current logical line.
    depth: usize,
    line_indent: usize,
    header_indent: usize,
    /// No significant token seen yet on this logical line.
    line_start: bool,
    prev: Prev,
    /// Scanning an f-string field: no line structure, no frames.
    fragment: bool,
    /// Header indents of the open class bodies, innermost last.
    class_bodies: Vec<usize>,
}

impl<'s, 'r, 'c> Scanner<'s, 'r, 'c> {
    pub fn new(src: &'s str, run: &'r mut Run<'c>) -> Self {
        Self {
            src,
            pos: 0,
            out: String::with_capacity(src.len()),
            run,
            state: State::Code,
            depth: 0,
            line_indent: indent_width(src),
            header_indent: 0,
            line_start: true,
            prev: Prev::None,
            fragment: false,
            class_bodies: Vec::new(),
        }
    }

    fn fragment(src: &'s str, run: &'r mut Run<'c>) -> Self {
        Self {
            fragment: true,
            line_start: false,
            ..Self::new(src, run)
        }
    }

    /// Rewrite the whole text.
    pub fn scan(mut self) -> String {
        while let Some(c) = self.peek() {
            match c {
                '\n' => self.newline(),
                '\\' if self.peek_at(1) == Some('\n') => self.copy(2),
                c if c.is_whitespace() => self.copy(c.len_utf8()),
                '#' => self.copy_to_line_end(),
                '\'' | '"' => self.string(self.pos),
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
                c if is_ident_start(c) => self.identifier(),
                c => self.punct(c),
            }
        }
        self.out
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn copy(&mut self, len: usize) {
        let end = (self.pos + len).min(self.src.len());
        self.out.push_str(&self.src[self.pos..end]);
        self.pos = end;
    }

    fn copy_to_line_end(&mut self) {
        let len = self.src[self.pos..].find('\n').unwrap_or(self.src.len() - self.pos);
        self.copy(len);
    }

    fn event(&mut self, event: Event) {
        self.state = self.state.next(event);
    }

    // =========================================================================
    // Lines and frames
    // =========================================================================

    fn newline(&mut self) {
        self.copy(1);
        if self.fragment || self.depth > 0 {
            return;
        }
        self.event(Event::Newline);
        self.line_start = true;
        self.prev = Prev::None;

        let rest = &self.src[self.pos..];
        let line = rest.split('\n').next().unwrap_or("");
        if line.trim().is_empty() {
            return;
        }
        let indent = indent_width(line);
        self.line_indent = indent;
        let popped = self.run.scopes.pop_while(|frame| {
            matches!(frame.kind(), FrameKind::Definition { indent: header } if indent <= header)
        });
        if popped > 0 {
            tracing::trace!(popped, indent, "closed definition frames");
        }
        while self.class_bodies.last().is_some_and(|&header| indent <= header) {
            self.class_bodies.pop();
        }
    }

    /// Copy an import statement through unchanged, up to the end of its
    /// logical line.
    fn import_statement(&mut self) {
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        let mut i = self.pos;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'\\' => i += 1,
                b'\n' if depth == 0 => break,
                _ => {}
            }
            i += 1;
        }
        self.copy(i.min(bytes.len()) - self.pos);
        self.prev = Prev::Other;
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn punct(&mut self, c: char) {
        let at_line_start = std::mem::replace(&mut self.line_start, false);
        self.copy(c.len_utf8());
        match c {
            '(' | '[' | '{' => self.depth += 1,
            ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }

        match c {
            '@' if at_line_start && !self.fragment => self.event(Event::At),
            '.' => {
                self.prev = Prev::Dot {
                    after_self: self.prev == Prev::Ident { is_self: true },
                };
                self.event(Event::Dot);
                return;
            }
            ':' if self.depth == 0 && self.peek() != Some('=') => {
                if self.state == State::ClassHeader {
                    self.run.scopes.push(FrameKind::Definition {
                        indent: self.header_indent,
                    });
                    self.class_bodies.push(self.header_indent);
                }
                self.event(Event::HeaderEnd);
            }
            _ => self.event(Event::Punct),
        }
        self.prev = Prev::Punct(c);
    }

    /// Numeric literals pass through unchanged (`1e-5`, `0xff`, `1_000`, `3j`).
    fn number(&mut self) {
        self.line_start = false;
        let start = self.pos;
        let hex = self.src[start..].starts_with("0x") || self.src[start..].starts_with("0X");
        let mut end = start;
        let mut last = ' ';
        for c in self.src[start..].chars() {
            let exponent_sign = matches!(c, '+' | '-') && matches!(last, 'e' | 'E') && !hex;
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                end += c.len_utf8();
                last = c;
            } else {
                break;
            }
        }
        self.copy(end - start);
        self.prev = Prev::Other;
    }

    fn read_identifier(&self) -> &'s str {
        let src = self.src;
        let rest = &src[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_ident_continue(c))
            .map_or(rest.len(), |(i, _)| i);
        &rest[..len]
    }

    fn identifier(&mut self) {
        let name = self.read_identifier();

        // String prefixes: at most two letters from `rRuUbBfF`.
        let next = self.src[self.pos + name.len()..].chars().next();
        if name.len() <= 2 && name.chars().all(is_prefix_char) && matches!(next, Some('\'' | '"')) {
            self.string(self.pos);
            return;
        }

        let at_line_start = std::mem::replace(&mut self.line_start, false);
        self.pos += name.len();

        if at_line_start && !self.fragment && matches!(name, "import" | "from") {
            self.out.push_str(name);
            self.import_statement();
            return;
        }

        let rendered = match name {
            "def" => {
                self.header_indent = self.line_indent;
                self.event(Event::Def);
                name.to_string()
            }
            "class" => {
                self.header_indent = self.line_indent;
                self.event(Event::Class);
                name.to_string()
            }
            "case" if at_line_start => {
                self.event(Event::Case);
                name.to_string()
            }
            "async" => name.to_string(),
            _ if at_line_start && self.at_class_attribute() => self.class_attribute(name),
            _ => self.classify(name),
        };

        self.out.push_str(&rendered);
        self.prev = Prev::Ident {
            is_self: name == "self",
        };
    }

    /// `name = ...` or `name: T` directly in a class body.
    fn at_class_attribute(&self) -> bool {
        if self.state != State::Code || self.depth > 0 {
            return false;
        }
        let in_class_body = matches!(
            self.run.scopes.current().kind(),
            FrameKind::Definition { indent } if self.class_bodies.last() == Some(&indent)
        );
        let rest = self.src[self.pos..].trim_start_matches([' ', '\t']);
        in_class_body
            && ((rest.starts_with('=') && !rest.starts_with("=="))
                || (rest.starts_with(':') && !rest.starts_with(":=")))
    }

    /// Class attributes share the field namespace with `self.<name>`.
    fn class_attribute(&mut self, name: &str) -> String {
        self.event(Event::Name);
        if self.run.is_immune(name) {
            return name.to_string();
        }
        let rendered = self.run.field(name);
        self.run.scopes.bind(name, &rendered);
        rendered
    }

    /// Render one identifier according to the scanner state.
    fn classify(&mut self, name: &str) -> String {
        match self.state {
            State::Decorator { .. } if name == "property" => {
                self.event(Event::Property);
                name.to_string()
            }
            State::Decorator { .. } => {
                self.event(Event::Name);
                self.decorator_name(name)
            }
            State::DecoratorName { .. } => {
                if matches!(self.prev, Prev::Dot { .. }) && matches!(name, "setter" | "getter" | "deleter") {
                    self.event(Event::Accessor);
                    return name.to_string();
                }
                self.event(Event::Name);
                self.member(name)
            }
            State::DefName { property } => {
                let rendered = if is_dunder(name) || self.run.is_immune(name) {
                    name.to_string()
                } else if property {
                    self.run.property(name)
                } else {
                    self.run.function(name)
                };
                self.event(Event::Name);
                self.run.scopes.push(FrameKind::Definition {
                    indent: self.header_indent,
                });
                rendered
            }
            State::ClassName => {
                self.event(Event::Name);
                if self.run.is_immune(name) {
                    name.to_string()
                } else {
                    self.run.class(name)
                }
            }
            State::CasePattern => {
                self.event(Event::Name);
                // Captures stay; names of known classes and constants resolve.
                if matches!(self.prev, Prev::Dot { .. }) {
                    self.member(name)
                } else {
                    self.run.definition(name).unwrap_or_else(|| name.to_string())
                }
            }
            State::Signature => {
                self.event(Event::Name);
                self.signature_name(name)
            }
            State::Code
            | State::PropertyPending
            | State::DecoratorArgs { .. }
            | State::ClassHeader => {
                self.event(Event::Name);
                self.reference(name, false)
            }
        }
    }

    fn decorator_name(&mut self, name: &str) -> String {
        if self.run.is_immune(name) {
            return name.to_string();
        }
        if let Some(found) = self.run.member(name) {
            return found;
        }
        if let Some(found) = self.run.scopes.resolve(name) {
            return found.to_string();
        }
        self.run.function(name)
    }

    /// An attribute after a dot.
    fn member(&mut self, name: &str) -> String {
        if self.run.is_immune(name) {
            return name.to_string();
        }
        if let Some(found) = self.run.member(name) {
            return found;
        }
        match self.prev {
            Prev::Dot { after_self: true } if self.followed_by_call() => self.run.function(name),
            Prev::Dot { after_self: true } => self.run.field(name),
            _ => name.to_string(),
        }
    }

    fn followed_by_call(&self) -> bool {
        self.src[self.pos..].trim_start_matches([' ', '\t']).starts_with('(')
    }

    /// Inside `def name(...)`: parameters bind in the new frame, defaults
    /// and annotations are references.
    fn signature_name(&mut self, name: &str) -> String {
        let parameter = self.depth == 1
            && matches!(self.prev, Prev::Punct('(' | ',' | '*'))
            && !self.run.is_immune(name);
        if parameter {
            let run = &mut *self.run;
            return run.scopes.declare(name, Role::Variable, &mut run.namers);
        }
        self.reference(name, true)
    }

    /// `name=` directly inside a call's argument list.
    fn is_keyword_argument(&self) -> bool {
        if self.state.in_signature() || self.depth == 0 {
            return false;
        }
        if !matches!(self.prev, Prev::Punct('(' | ',')) {
            return false;
        }
        let rest = self.src[self.pos..].trim_start_matches([' ', '\t']);
        rest.starts_with('=') && !rest.starts_with("==")
    }

    /// A plain identifier in expression position.
    fn reference(&mut self, name: &str, outer: bool) -> String {
        if matches!(self.prev, Prev::Dot { .. }) {
            return self.member(name);
        }
        if self.is_keyword_argument() {
            return name.to_string();
        }
        if let Some(found) = self.run.definition(name) {
            return found;
        }
        if self.run.is_immune(name) {
            return name.to_string();
        }
        if let Some(found) = self.run.scopes.resolve(name) {
            return found.to_string();
        }
        // Unknown call targets are functions defined elsewhere.
        if self.followed_by_call() {
            return self.run.function(name);
        }
        if outer {
            let run = &mut *self.run;
            return run.scopes.resolve_or_global(name, Role::Variable, &mut run.namers);
        }
        self.run.local(name)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Read the literal starting at `start` (prefix included) and emit its
    /// rewritten form.
    fn string(&mut self, start: usize) {
        self.line_start = false;
        let src = self.src;
        let end = self.string_end(start);
        let token = &src[start..end];
        self.pos = end;

        let rendered = match Literal::parse(token) {
            Some(literal) => self.rewrite_literal(&literal),
            None => token.to_string(),
        };
        self.out.push_str(&rendered);
        self.prev = Prev::Other;
    }

    fn string_end(&self, start: usize) -> usize {
        let src = self.src;
        let body_start = start
            + src[start..]
                .char_indices()
                .find(|&(_, c)| !is_prefix_char(c))
                .map_or(0, |(i, _)| i);
        let rest = &src[body_start..];
        let (delimiter, single_line) = if rest.starts_with("\"\"\"") {
            ("\"\"\"", false)
        } else if rest.starts_with("'''") {
            ("'''", false)
        } else if rest.starts_with('"') {
            ("\"", true)
        } else {
            ("'", true)
        };

        let mut chars = rest.char_indices().skip(delimiter.len());
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' if single_line => return body_start + i,
                _ if rest[i..].starts_with(delimiter) => return body_start + i + delimiter.len(),
                _ => {}
            }
        }
        src.len()
    }

    fn rewrite_literal(&mut self, literal: &Literal<'_>) -> String {
        let case_pattern = self.state.in_case_pattern();
        if !literal.is_format() {
            if literal.content.is_empty() {
                return literal.render("");
            }
            let phrase = self.run.mask(literal.content, case_pattern);
            return literal.render(&escape_for(&phrase, literal.quote));
        }

        let format = FormatString::split(literal.content);
        let parts: Vec<String> = if format.is_all_fields() {
            format.parts.iter().map(|p| (*p).to_string()).collect()
        } else {
            let phrase = self
                .run
                .literals
                .mask(&format!("{FORMAT_KEY}{}", literal.content));
            let phrase = escape_for(&phrase, literal.quote)
                .replace('{', "{{")
                .replace('}', "}}");
            distribute(&phrase, &format.parts)
        };

        let mut body = String::with_capacity(literal.content.len());
        for (i, field) in format.fields.iter().enumerate() {
            body.push_str(&parts[i]);
            body.push('{');
            body.push_str(&Scanner::fragment(field.expr, self.run).scan());
            body.push_str(field.suffix);
            body.push('}');
            let next_is_word = parts[i + 1]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if next_is_word {
                body.push(' ');
            }
        }
        if let Some(last) = parts.last() {
            body.push_str(last);
        }
        literal.render(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> String {
        let config = FrontEndConfig::python();
        let imports = crate::imports::collect(source);
        let mut run = Run::new(&config, imports);
        Scanner::new(source, &mut run).scan()
    }

    #[test]
    fn test_parameters_are_per_definition() {
        let source = "def f(x):\n    return x\n\ndef g(x):\n    return x\n";
        assert_eq!(
            scan(source),
            "def Function1(Alpha):\n    return Alpha\n\ndef Function2(Bravo):\n    return Bravo\n"
        );
    }

    #[test]
    fn test_module_globals_shared_with_bodies() {
        let source = "limit = 10\ndef check(value):\n    return value > limit\n";
        assert_eq!(
            scan(source),
            "Alpha = 10\ndef Function1(Bravo):\n    return Bravo > Alpha\n"
        );
    }

    #[test]
    fn test_locals_do_not_leak_between_functions() {
        let source = "def a():\n    total = 1\n    return total\ndef b():\n    total = 2\n    return total\n";
        let out = scan(source);
        assert!(out.contains("    Alpha = 1\n    return Alpha"));
        assert!(out.contains("    Bravo = 2\n    return Bravo"));
    }

    #[test]
    fn test_self_fields_keep_underscore() {
        let source = "class Account:\n    def __init__(self, owner):\n        self._owner = owner\n        self.balance = 0\n";
        assert_eq!(
            scan(source),
            "class Class1:\n    def __init__(self, Alpha):\n        self._Bravo = Alpha\n        self.Charlie = 0\n"
        );
    }

    #[test]
    fn test_class_attributes_match_self_fields() {
        let source = "class Client:\n    retries = 3\n    _timeout: float = 1.5\n\n    def bump(self):\n        self.retries += 1\n        return self._timeout\n\nlimit = Client.retries\n";
        assert_eq!(
            scan(source),
            "class Class1:\n    Alpha = 3\n    _Bravo: float = 1.5\n\n    def Function1(self):\n        self.Alpha += 1\n        return self._Bravo\n\nCharlie = Class1.Alpha\n"
        );
    }

    #[test]
    fn test_property_namespace() {
        let source = "class T:\n    @property\n    def size(self):\n        return self._size\n\n    @size.setter\n    def size(self, value):\n        self._size = value\n";
        let out = scan(source);
        assert!(out.contains("    @property\n    def Alpha(self):"));
        assert!(out.contains("    @Alpha.setter\n    def Alpha(self, "));
        assert!(!out.contains("Function"));
    }

    #[test]
    fn test_keyword_arguments_kept() {
        assert_eq!(scan("connect(host=server, retries=3)"), "Function1(host=Alpha, retries=3)");
        assert_eq!(scan("print(value, sep=', ')"), "print(Alpha, sep='Lorem Ipsum')");
        assert_eq!(scan("check(a == b)"), "Function1(Alpha == Bravo)");
    }

    #[test]
    fn test_numbers_untouched() {
        assert_eq!(scan("x = 1e-5 + 0xff + 1_000 + 3j + .5"), "Alpha = 1e-5 + 0xff + 1_000 + 3j + .5");
    }

    #[test]
    fn test_string_literals_content_addressed() {
        assert_eq!(
            scan("a = {'key': 1}\nb = a['key']\nc = \"other\""),
            "Alpha = {'Lorem Ipsum': 1}\nBravo = Alpha['Lorem Ipsum']\nCharlie = \"Dolor sit amet\""
        );
    }

    #[test]
    fn test_fstring_with_text() {
        assert_eq!(
            scan("name = 1\nmsg = f\"Hello {name}, welcome\""),
            "Alpha = 1\nBravo = f\"Lorem {Alpha} Ipsum\""
        );
    }

    #[test]
    fn test_fstring_fields_only() {
        assert_eq!(scan("a = 1\nb = 2\nc = f\"{a}{b!r}\""), "Alpha = 1\nBravo = 2\nCharlie = f\"{Alpha}{Bravo!r}\"");
    }

    #[test]
    fn test_case_patterns() {
        let source = "match command:\n    case \"quit\":\n        stop = \"quit\"\n    case Point(x=0, y=y):\n        pass\n";
        let out = scan(source);
        // The pattern literal and the ordinary literal get different phrases.
        assert!(out.contains("case \"Lorem Ipsum\":"));
        assert!(out.contains("Bravo = \"Dolor sit amet\""));
        assert!(out.contains("case Point(x=0, y=y):"));
    }

    #[test]
    fn test_imports_verbatim_and_immune() {
        let source = "import numpy as np\nfrom os import (\n    path,\n)\nx = np.zeros(path)\n";
        assert_eq!(
            scan(source),
            "import numpy as np\nfrom os import (\n    path,\n)\nAlpha = np.zeros(path)\n"
        );
    }

    #[test]
    fn test_decorator_function() {
        let source = "def cached(fn):\n    return fn\n\n@cached\ndef load():\n    pass\n";
        let out = scan(source);
        assert!(out.contains("@Function1\ndef Function2():"));
    }

    #[test]
    fn test_matrix_multiply_is_not_a_decorator() {
        assert_eq!(scan("c = a @ b"), "Alpha = Bravo @ Charlie");
    }

    #[test]
    fn test_self_must_be_whole_word() {
        assert_eq!(scan("myself.name = 1"), "Alpha.name = 1");
    }

    #[test]
    fn test_blank_line_inside_body_keeps_frame() {
        let source = "def f(a):\n    b = a\n\n    return b\nb = 0\n";
        let out = scan(source);
        assert!(out.contains("    Bravo = Alpha\n\n    return Bravo\n"));
        assert!(out.ends_with("Charlie = 0\n"));
    }

    #[test]
    fn test_multiline_call_does_not_close_frame() {
        let source = "def f(a):\n    g(a,\na)\n    return a\n";
        let out = scan(source);
        assert!(out.ends_with("    return Alpha\n"));
    }
}
