//! Scope-aware renaming over the AST.
//!
//! One [`Anonymizer`] is one run: every map and counter lives here and is
//! dropped with it. The traversal is a plain recursive walk; frames are
//! pushed on entry to functions, blocks, loops with lexical heads, switch
//! bodies and catch clauses, and popped on exit. Declarations are hoisted
//! when a frame is entered so that earlier references resolve to the same
//! name as the declaration.

use crate::ast::*;
use codemask_core::{FrontEndConfig, FrameKind, LiteralMasker, Namers, ReservedSet, Role, ScopeStack};
use rustc_hash::{FxHashMap, FxHashSet};

/// Which frame a binding pattern declares into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// The innermost frame (`let`, `const`, parameters, catch bindings).
    Current,
    /// The nearest function or program frame (`var`).
    Hoisted,
}

pub struct Anonymizer<'c> {
    reserved: &'c ReservedSet,
    namers: Namers<'c>,
    scopes: ScopeStack,
    literals: LiteralMasker<'c>,
    /// Function declarations and free call targets, stable across frames.
    functions: FxHashMap<String, String>,
    classes: FxHashMap<String, String>,
    /// Class method names, shared with `obj.method` call sites.
    methods: FxHashMap<String, String>,
    /// Class fields and `this.<name>` accesses.
    fields: FxHashMap<String, String>,
    /// Local names bound by import declarations.
    imports: FxHashSet<String>,
    class_member_depth: usize,
}

impl<'c> Anonymizer<'c> {
    pub fn new(config: &'c FrontEndConfig) -> Self {
        Self {
            reserved: &config.reserved,
            namers: Namers::new(&config.alphabet, config.overflow),
            scopes: ScopeStack::new(),
            literals: LiteralMasker::new(&config.phrases),
            functions: FxHashMap::default(),
            classes: FxHashMap::default(),
            methods: FxHashMap::default(),
            fields: FxHashMap::default(),
            imports: FxHashSet::default(),
            class_member_depth: 0,
        }
    }

    /// Rewrite `program` in place.
    pub fn run(&mut self, program: &mut Program) {
        for stmt in &program.body {
            if let StmtKind::Import(decl) = &stmt.kind {
                self.imports
                    .extend(decl.specifiers.iter().map(|s| s.local().to_string()));
            }
        }
        self.enter_body(&program.body);
        for stmt in &mut program.body {
            self.visit_stmt(stmt);
        }
    }

    /// Names allocated across all roles.
    pub fn names_issued(&self) -> usize {
        self.namers.total_issued()
    }

    /// Distinct literal contents replaced.
    pub fn literals_masked(&self) -> usize {
        self.literals.len()
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Hoist the declarations of a function or program body into the
    /// current frame.
    fn enter_body(&mut self, stmts: &[Stmt]) {
        let mut names = Vec::new();
        collect_var_names(stmts, &mut names);
        let target = self.scopes.hoist_target();
        for name in names {
            self.declare_at(target, &name);
        }
        self.hoist_lexical(stmts);
    }

    /// `let`, `const`, class and function declarations directly in `stmts`.
    fn hoist_lexical(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Var { kind, decls } if *kind != VarKind::Var => {
                    let mut names = Vec::new();
                    for decl in decls {
                        collect_binding_names(&decl.binding, &mut names);
                    }
                    let top = self.scopes.depth() - 1;
                    for name in names {
                        self.declare_at(top, &name);
                    }
                }
                StmtKind::Function(func) => {
                    if let Some(name) = &func.name {
                        self.bind_function(name);
                    }
                }
                StmtKind::Class(class) => {
                    if let Some(name) = &class.name {
                        self.bind_class(name);
                    }
                }
                StmtKind::Export(decl) => match decl.as_ref() {
                    ExportDecl::Decl(inner) => self.hoist_lexical(std::slice::from_ref(inner)),
                    ExportDecl::Default(DefaultExport::Function(func)) => {
                        if let Some(name) = &func.name {
                            self.bind_function(name);
                        }
                    }
                    ExportDecl::Default(DefaultExport::Class(class)) => {
                        if let Some(name) = &class.name {
                            self.bind_class(name);
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn declare_at(&mut self, index: usize, name: &str) -> Option<String> {
        if self.is_reserved(name) {
            return None;
        }
        let namers = &mut self.namers;
        Some(self.scopes.declare_at(index, name, || namers.next(Role::Variable)))
    }

    /// Bind a function declaration's name in the current frame, reusing the
    /// run-wide assignment for that name.
    fn bind_function(&mut self, name: &str) {
        if self.is_reserved(name) {
            return;
        }
        let namers = &mut self.namers;
        let assigned = self
            .functions
            .entry(name.to_string())
            .or_insert_with(|| namers.next(Role::Function))
            .clone();
        self.scopes.bind(name, &assigned);
    }

    fn bind_class(&mut self, name: &str) {
        if self.is_reserved(name) {
            return;
        }
        let namers = &mut self.namers;
        let assigned = self
            .classes
            .entry(name.to_string())
            .or_insert_with(|| namers.next(Role::Class))
            .clone();
        self.scopes.bind(name, &assigned);
    }

    /// Replace a declaration's own name with what its frame holds for it.
    fn rename_declared(&self, name: &mut String) {
        if let Some(assigned) = self.scopes.current().get(name) {
            *name = assigned.to_string();
        }
    }

    /// Rename the leaves of a binding pattern. Object-pattern keys stay.
    fn bind_pattern(&mut self, binding: &mut Binding, target: Target) {
        match &mut binding.kind {
            BindingKind::Ident(name) => {
                let index = match target {
                    Target::Current => self.scopes.depth() - 1,
                    Target::Hoisted => self.scopes.hoist_target(),
                };
                if let Some(assigned) = self.declare_at(index, name) {
                    *name = assigned;
                }
            }
            BindingKind::Array(elements) => {
                for element in elements.iter_mut().flatten() {
                    self.bind_pattern(&mut element.binding, target);
                    if let Some(default) = &mut element.default {
                        self.visit_expr(default);
                    }
                }
            }
            BindingKind::Object(properties) => {
                for prop in properties {
                    if let PropertyKey::Computed(key) = &mut prop.key {
                        self.visit_expr(key);
                    }
                    self.bind_pattern(&mut prop.value, target);
                    if let Some(default) = &mut prop.default {
                        self.visit_expr(default);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn visit_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_block(&mut self, stmts: &mut [Stmt]) {
        self.scopes.push(FrameKind::Block);
        self.hoist_lexical(stmts);
        self.visit_stmts(stmts);
        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Var { kind, decls } => self.visit_var_decls(*kind, decls),
            StmtKind::Function(func) => {
                if let Some(name) = &mut func.name {
                    self.rename_declared(name);
                }
                self.visit_function(func, false);
            }
            StmtKind::Class(class) => {
                if let Some(name) = &mut class.name {
                    self.rename_declared(name);
                }
                self.visit_class(class);
            }
            StmtKind::Block(stmts) => self.visit_block(stmts),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test);
                self.visit_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.visit_stmt(alternate);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.visit_expr(discriminant);
                self.scopes.push(FrameKind::Block);
                for case in cases.iter() {
                    self.hoist_lexical(&case.consequent);
                }
                for case in cases {
                    if let Some(test) = &mut case.test {
                        self.visit_expr(test);
                    }
                    self.visit_stmts(&mut case.consequent);
                }
                self.scopes.pop();
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.scopes.push(FrameKind::Block);
                if let Some(init) = init {
                    self.visit_for_init(init);
                }
                if let Some(test) = test {
                    self.visit_expr(test);
                }
                if let Some(update) = update {
                    self.visit_expr(update);
                }
                self.visit_stmt(body);
                self.scopes.pop();
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
                self.scopes.push(FrameKind::Block);
                self.visit_expr(right);
                self.visit_for_init(left);
                self.visit_stmt(body);
                self.scopes.pop();
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.visit_expr(test);
                self.visit_stmt(body);
            }
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    self.visit_expr(arg);
                }
            }
            StmtKind::Throw { arg } => self.visit_expr(arg),
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.visit_block(block);
                if let Some(handler) = handler {
                    self.scopes.push(FrameKind::Catch);
                    if let Some(param) = &mut handler.param {
                        self.bind_pattern(param, Target::Current);
                    }
                    self.hoist_lexical(&handler.body);
                    self.visit_stmts(&mut handler.body);
                    self.scopes.pop();
                }
                if let Some(finalizer) = finalizer {
                    self.visit_block(finalizer);
                }
            }
            StmtKind::Labeled { body, .. } => self.visit_stmt(body),
            StmtKind::Expr(expr) => self.visit_expr(expr),
            StmtKind::With { object, body } => {
                self.visit_expr(object);
                self.visit_stmt(body);
            }
            StmtKind::Import(decl) => {
                decl.source = self.literals.mask(&decl.source);
            }
            StmtKind::Export(decl) => self.visit_export(decl),
            StmtKind::Break { .. }
            | StmtKind::Continue { .. }
            | StmtKind::Directive(_)
            | StmtKind::Empty
            | StmtKind::Debugger => {}
        }
    }

    fn visit_var_decls(&mut self, kind: VarKind, decls: &mut [VarDeclarator]) {
        let target = if kind == VarKind::Var {
            Target::Hoisted
        } else {
            Target::Current
        };
        for decl in decls {
            self.bind_pattern(&mut decl.binding, target);
            if let Some(init) = &mut decl.init {
                self.visit_expr(init);
            }
        }
    }

    /// Loop heads run inside the loop's own frame.
    fn visit_for_init(&mut self, init: &mut ForInit) {
        match init {
            ForInit::Var { kind, decls } => self.visit_var_decls(*kind, decls),
            ForInit::Expr(expr) => self.visit_expr(expr),
        }
    }

    fn visit_export(&mut self, decl: &mut ExportDecl) {
        match decl {
            ExportDecl::Named { specifiers, source } => match source {
                Some(source) => *source = self.literals.mask(source),
                None => {
                    // The exported name is the module's interface; only the
                    // local side follows the renaming.
                    for spec in specifiers {
                        if self.is_reserved(&spec.local) {
                            continue;
                        }
                        if let Some(assigned) = self.scopes.resolve(&spec.local) {
                            spec.local = assigned.to_string();
                        }
                    }
                }
            },
            ExportDecl::Default(DefaultExport::Expr(expr)) => self.visit_expr(expr),
            ExportDecl::Default(DefaultExport::Function(func)) => {
                if let Some(name) = &mut func.name {
                    self.rename_declared(name);
                }
                self.visit_function(func, false);
            }
            ExportDecl::Default(DefaultExport::Class(class)) => {
                if let Some(name) = &mut class.name {
                    self.rename_declared(name);
                }
                self.visit_class(class);
            }
            ExportDecl::Decl(stmt) => self.visit_stmt(stmt),
            ExportDecl::All { source, .. } => *source = self.literals.mask(source),
        }
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    /// `own_name` is set for named function expressions, whose name is
    /// visible only inside the function itself.
    fn visit_function(&mut self, func: &mut Function, own_name: bool) {
        self.scopes.push(FrameKind::Function);
        if own_name {
            if let Some(name) = &mut func.name {
                self.bind_function(name);
                self.rename_declared(name);
            }
        }
        self.visit_params(&mut func.params);
        self.enter_body(&func.body);
        self.visit_stmts(&mut func.body);
        self.scopes.pop();
    }

    fn visit_arrow(&mut self, arrow: &mut ArrowFunction) {
        self.scopes.push(FrameKind::Function);
        self.visit_params(&mut arrow.params);
        match &mut arrow.body {
            ArrowBody::Expr(expr) => self.visit_expr(expr),
            ArrowBody::Block(stmts) => {
                self.enter_body(stmts);
                self.visit_stmts(stmts);
            }
        }
        self.scopes.pop();
    }

    /// Declare every parameter before visiting defaults.
    fn visit_params(&mut self, params: &mut [Param]) {
        for param in params.iter_mut() {
            self.bind_pattern(&mut param.binding, Target::Current);
        }
        for param in params {
            if let Some(default) = &mut param.default {
                self.visit_expr(default);
            }
        }
    }

    fn visit_class(&mut self, class: &mut Class) {
        if let Some(super_class) = &mut class.super_class {
            self.visit_expr(super_class);
        }

        // Members are visible to each other regardless of order.
        for member in &class.body {
            match &member.kind {
                ClassMemberKind::Method {
                    key: PropertyKey::Ident(name),
                    kind,
                    ..
                } if *kind != MethodKind::Constructor => {
                    self.claim_member(name, Role::Method);
                }
                ClassMemberKind::Property {
                    key: PropertyKey::Ident(name),
                    ..
                } => self.claim_member(name, Role::Field),
                _ => {}
            }
        }

        self.class_member_depth += 1;
        for member in &mut class.body {
            match &mut member.kind {
                ClassMemberKind::Method { key, value, kind, .. } => {
                    if *kind != MethodKind::Constructor {
                        self.rename_member_key(key, Role::Method);
                    }
                    self.visit_function(value, false);
                }
                ClassMemberKind::Property { key, value, .. } => {
                    self.rename_member_key(key, Role::Field);
                    if let Some(value) = value {
                        self.visit_expr(value);
                    }
                }
                ClassMemberKind::StaticBlock(stmts) => {
                    self.scopes.push(FrameKind::Function);
                    self.enter_body(stmts);
                    self.visit_stmts(stmts);
                    self.scopes.pop();
                }
            }
        }
        self.class_member_depth -= 1;
    }

    fn claim_member(&mut self, name: &str, role: Role) {
        if self.is_reserved(name) {
            return;
        }
        let namers = &mut self.namers;
        let map = match role {
            Role::Method => &mut self.methods,
            _ => &mut self.fields,
        };
        map.entry(name.to_string()).or_insert_with(|| namers.next(role));
    }

    fn rename_member_key(&mut self, key: &mut PropertyKey, role: Role) {
        match key {
            PropertyKey::Ident(name) => {
                let map = match role {
                    Role::Method => &self.methods,
                    _ => &self.fields,
                };
                if let Some(assigned) = map.get(name.as_str()) {
                    *name = assigned.clone();
                }
            }
            PropertyKey::String(value) => *value = self.literals.mask(value),
            PropertyKey::Computed(expr) => self.visit_expr(expr),
            PropertyKey::Number(_) | PropertyKey::Private(_) => {}
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::String(value) => *value = self.literals.mask(value),
            ExprKind::Template { quasis, exprs } => {
                self.mask_quasis(quasis, false);
                self.visit_exprs(exprs);
            }
            ExprKind::TaggedTemplate { tag, quasis, exprs } => {
                self.visit_callee(tag);
                self.mask_quasis(quasis, true);
                self.visit_exprs(exprs);
            }
            ExprKind::Ident(name) => self.rename_reference(name, false),
            ExprKind::Array(elements) => {
                for element in elements.iter_mut().flatten() {
                    self.visit_expr(element);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.visit_object_prop(prop);
                }
            }
            ExprKind::Function(func) => {
                let named = func.name.is_some();
                self.visit_function(func, named);
            }
            ExprKind::Arrow(arrow) => self.visit_arrow(arrow),
            ExprKind::Class(class) => {
                if let Some(name) = &mut class.name {
                    self.scopes.push(FrameKind::Block);
                    self.bind_class(name);
                    self.rename_declared(name);
                    self.visit_class(class);
                    self.scopes.pop();
                } else {
                    self.visit_class(class);
                }
            }
            ExprKind::Unary { arg, .. }
            | ExprKind::Update { arg, .. }
            | ExprKind::Await(arg)
            | ExprKind::Spread(arg)
            | ExprKind::Import(arg) => self.visit_expr(arg),
            ExprKind::Binary { left, right, .. } | ExprKind::Assign { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test);
                self.visit_expr(consequent);
                self.visit_expr(alternate);
            }
            ExprKind::Sequence(exprs) => self.visit_exprs(exprs),
            ExprKind::Member { object, property, .. } => self.visit_member(object, property),
            ExprKind::Call { callee, args, .. } => {
                self.visit_callee(callee);
                self.visit_exprs(args);
            }
            ExprKind::New { callee, args } => {
                self.visit_expr(callee);
                self.visit_exprs(args);
            }
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.visit_expr(arg);
                }
            }
            ExprKind::JsxElement(element) => self.visit_jsx_element(element),
            ExprKind::JsxFragment(fragment) => self.visit_jsx_children(&mut fragment.children),
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::BigInt(_)
            | ExprKind::Regex { .. }
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::MetaProperty { .. } => {}
        }
    }

    fn visit_exprs(&mut self, exprs: &mut [Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_callee(&mut self, callee: &mut Expr) {
        if let ExprKind::Ident(name) = &mut callee.kind {
            self.rename_reference(name, true);
        } else {
            self.visit_expr(callee);
        }
    }

    fn visit_object_prop(&mut self, prop: &mut ObjectProp) {
        let prop = match prop {
            ObjectProp::Spread(arg) => return self.visit_expr(arg),
            ObjectProp::Property(prop) => prop,
        };
        match &mut prop.key {
            PropertyKey::String(value) => *value = self.literals.mask(value),
            PropertyKey::Computed(expr) => self.visit_expr(expr),
            PropertyKey::Ident(_) | PropertyKey::Number(_) | PropertyKey::Private(_) => {}
        }
        match (&mut prop.value.kind, prop.kind) {
            (ExprKind::Function(func), PropertyKind::Method | PropertyKind::Get | PropertyKind::Set) => {
                self.visit_function(func, false);
            }
            _ => self.visit_expr(&mut prop.value),
        }
    }

    fn visit_member(&mut self, object: &mut Expr, property: &mut MemberProp) {
        let on_this = matches!(object.kind, ExprKind::This);
        self.visit_expr(object);

        let name = match property {
            MemberProp::Ident(name) => name,
            MemberProp::Computed(expr) => return self.visit_expr(expr),
            MemberProp::Private(_) => return,
        };
        if self.is_reserved(name) {
            return;
        }

        if on_this && self.class_member_depth > 0 {
            if let Some(assigned) = self.methods.get(name.as_str()) {
                *name = assigned.clone();
                return;
            }
            let namers = &mut self.namers;
            *name = self
                .fields
                .entry(name.clone())
                .or_insert_with(|| namers.next(Role::Field))
                .clone();
            return;
        }

        let reserved_root = matches!(&object.kind, ExprKind::Ident(root) if self.reserved.contains(root));
        if !reserved_root {
            if let Some(assigned) = self.methods.get(name.as_str()) {
                *name = assigned.clone();
            }
        }
    }

    /// Rename an identifier in reference position.
    fn rename_reference(&mut self, name: &mut String, is_callee: bool) {
        if self.is_reserved(name) {
            return;
        }
        if let Some(assigned) = self.scopes.resolve(name) {
            *name = assigned.to_string();
            return;
        }
        if self.imports.contains(name.as_str()) {
            return;
        }
        if is_callee {
            // An unknown call target is a function defined elsewhere.
            let namers = &mut self.namers;
            let assigned = self
                .functions
                .entry(name.clone())
                .or_insert_with(|| namers.next(Role::Function))
                .clone();
            self.scopes.bind_at(0, name, &assigned);
            *name = assigned;
        } else {
            *name = self.scopes.resolve_or_global(name, Role::Variable, &mut self.namers);
        }
    }

    /// Replace the text of template parts. Empty parts stay empty; tagged
    /// templates keep a trailing space before each substitution.
    fn mask_quasis(&mut self, quasis: &mut [String], tagged: bool) {
        for quasi in quasis {
            if quasi.is_empty() {
                continue;
            }
            let mut phrase = escape_template(&self.literals.mask(quasi));
            if tagged {
                phrase.push(' ');
            }
            *quasi = phrase;
        }
    }

    // =========================================================================
    // JSX
    // =========================================================================

    fn visit_jsx_element(&mut self, element: &mut JsxElement) {
        for attr in &mut element.attributes {
            match attr {
                JsxAttribute::Attribute { value: Some(value), .. } => match value {
                    JsxAttrValue::String(text) => *text = self.literals.mask(text),
                    JsxAttrValue::Expr(expr) => self.visit_expr(expr),
                    JsxAttrValue::Element(inner) => self.visit_jsx_element(inner),
                    JsxAttrValue::Fragment(inner) => self.visit_jsx_children(&mut inner.children),
                },
                JsxAttribute::Attribute { value: None, .. } => {}
                JsxAttribute::Spread(expr) => self.visit_expr(expr),
            }
        }
        self.visit_jsx_children(&mut element.children);
    }

    fn visit_jsx_children(&mut self, children: &mut [JsxChild]) {
        for child in children {
            match child {
                JsxChild::Text(text) => {
                    if let Some(masked) = self.mask_jsx_text(text) {
                        *text = masked;
                    }
                }
                JsxChild::Element(element) => self.visit_jsx_element(element),
                JsxChild::Fragment(fragment) => self.visit_jsx_children(&mut fragment.children),
                JsxChild::Expr(Some(expr)) | JsxChild::Spread(expr) => self.visit_expr(expr),
                JsxChild::Expr(None) => {}
            }
        }
    }

    /// Visible text is replaced, surrounding whitespace is kept.
    fn mask_jsx_text(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lead = text.len() - text.trim_start().len();
        let tail = text.trim_end().len();
        let phrase = self.literals.mask(trimmed);
        Some(format!("{}{}{}", &text[..lead], phrase, &text[tail..]))
    }
}

/// `var` names anywhere in `stmts`, not descending into nested functions.
fn collect_var_names(stmts: &[Stmt], names: &mut Vec<String>) {
    for stmt in stmts {
        collect_stmt_vars(stmt, names);
    }
}

fn collect_stmt_vars(stmt: &Stmt, names: &mut Vec<String>) {
    match &stmt.kind {
        StmtKind::Var {
            kind: VarKind::Var,
            decls,
        } => {
            for decl in decls {
                collect_binding_names(&decl.binding, names);
            }
        }
        StmtKind::Block(stmts) => collect_var_names(stmts, names),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            collect_stmt_vars(consequent, names);
            if let Some(alternate) = alternate {
                collect_stmt_vars(alternate, names);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                collect_var_names(&case.consequent, names);
            }
        }
        StmtKind::For { init, body, .. } => {
            if let Some(ForInit::Var {
                kind: VarKind::Var,
                decls,
            }) = init
            {
                for decl in decls {
                    collect_binding_names(&decl.binding, names);
                }
            }
            collect_stmt_vars(body, names);
        }
        StmtKind::ForIn { left, body, .. } | StmtKind::ForOf { left, body, .. } => {
            if let ForInit::Var {
                kind: VarKind::Var,
                decls,
            } = left
            {
                for decl in decls {
                    collect_binding_names(&decl.binding, names);
                }
            }
            collect_stmt_vars(body, names);
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Labeled { body, .. }
        | StmtKind::With { body, .. } => collect_stmt_vars(body, names),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            collect_var_names(block, names);
            if let Some(handler) = handler {
                collect_var_names(&handler.body, names);
            }
            if let Some(finalizer) = finalizer {
                collect_var_names(finalizer, names);
            }
        }
        StmtKind::Export(decl) => {
            if let ExportDecl::Decl(inner) = decl.as_ref() {
                collect_stmt_vars(inner, names);
            }
        }
        _ => {}
    }
}

/// Leaf names bound by a pattern, in source order.
fn collect_binding_names(binding: &Binding, names: &mut Vec<String>) {
    match &binding.kind {
        BindingKind::Ident(name) => names.push(name.clone()),
        BindingKind::Array(elements) => {
            for element in elements.iter().flatten() {
                collect_binding_names(&element.binding, names);
            }
        }
        BindingKind::Object(properties) => {
            for prop in properties {
                collect_binding_names(&prop.value, names);
            }
        }
    }
}

/// Phrases come from configuration and are spliced into raw template text.
fn escape_template(phrase: &str) -> String {
    phrase
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Codegen;
    use crate::parser::Parser;

    fn run(source: &str) -> String {
        let config = FrontEndConfig::javascript();
        let mut program = Parser::new(source).parse().unwrap();
        Anonymizer::new(&config).run(&mut program);
        Codegen::new(&program).generate()
    }

    #[test]
    fn test_parameters_and_locals() {
        let output = run("function add(a, b) { const sum = a + b; return sum; }");
        assert_eq!(
            output,
            "function Function1(Alpha, Bravo) {\n  const Charlie = Alpha + Bravo;\n  return Charlie;\n}"
        );
    }

    #[test]
    fn test_hoisted_function_call_before_declaration() {
        let output = run("run();\nfunction run() {}");
        assert_eq!(output, "Function1();\nfunction Function1() {}");
    }

    #[test]
    fn test_var_hoists_out_of_blocks() {
        let output = run("function f() { if (x) { var y = 1; } return y; }");
        assert!(output.contains("var Alpha = 1;"));
        assert!(output.contains("return Alpha;"));
    }

    #[test]
    fn test_block_shadowing() {
        let output = run("let x = 1; { let x = 2; use(x); } use(x);");
        assert_eq!(
            output,
            "let Alpha = 1;\n{\n  let Bravo = 2;\n  Function1(Bravo);\n}\nFunction1(Alpha);"
        );
    }

    #[test]
    fn test_free_variable_is_global() {
        let output = run("total = total + 1;");
        assert_eq!(output, "Alpha = Alpha + 1;");
    }

    #[test]
    fn test_object_pattern_keeps_keys() {
        let output = run("const { id, name: label = 'x', ...rest } = user;");
        assert_eq!(
            output,
            "const {id: Alpha, name: Bravo = \"Lorem Ipsum\", ...Charlie} = Delta;"
        );
    }

    #[test]
    fn test_object_shorthand_expands() {
        let output = run("const id = 1; send({ id });");
        assert!(output.contains("id: Alpha"));
    }

    #[test]
    fn test_reserved_untouched() {
        let output = run("console.log(Math.max(1, 2), JSON.stringify(window));");
        assert_eq!(output, "console.log(Math.max(1, 2), JSON.stringify(window));");
    }

    #[test]
    fn test_catch_param() {
        let output = run("try { risky(); } catch (err) { report(err); }");
        assert!(output.contains("catch (Alpha)"));
        assert!(output.contains("(Alpha);"));
    }

    #[test]
    fn test_class_fields_and_methods() {
        let output = run(
            "class Counter { count = 0; increment() { this.count += 1; return this.count; } }\nconst c = new Counter();\nc.increment();",
        );
        assert!(output.starts_with("class Class1 {"));
        // `c` is hoisted with the program body before the class is visited.
        assert!(output.contains("  Bravo = 0;"));
        assert!(output.contains("this.Bravo += 1;"));
        assert!(output.contains("Function1() {"));
        assert!(output.contains("new Class1()"));
        assert!(output.ends_with("Alpha.Function1();"));
    }

    #[test]
    fn test_this_method_call_uses_method_name() {
        let output = run("class A { a() { this.b(); } b() {} }");
        assert!(output.contains("this.Function2();"));
        assert!(output.contains("Function2() {}"));
    }

    #[test]
    fn test_imports_are_immune() {
        let output = run("import React, { useState } from 'react';\nconst [v, setV] = useState(0);\nReact.render(v);");
        assert!(output.contains("import React, { useState } from \"Lorem Ipsum\";"));
        assert!(output.contains("const [Alpha, Bravo] = useState(0);"));
        assert!(output.contains("React.render(Alpha);"));
    }

    #[test]
    fn test_strings_are_content_addressed() {
        let output = run("f('a', 'b', 'a');");
        assert_eq!(output, "Function1(\"Lorem Ipsum\", \"Dolor sit amet\", \"Lorem Ipsum\");");
    }

    #[test]
    fn test_template_parts() {
        let output = run("const s = `${a}text${b}`;");
        assert_eq!(output, "const Alpha = `${Bravo}Lorem Ipsum${Charlie}`;");
    }

    #[test]
    fn test_tagged_template_keeps_space() {
        let output = run("const q = sql`select ${x}`;");
        assert_eq!(output, "const Alpha = Function1`Lorem Ipsum ${Bravo}`;");
    }

    #[test]
    fn test_jsx_text_and_attributes() {
        let output = run("const el = <p title=\"Hi\">\n  Hello {name}\n</p>;");
        assert_eq!(
            output,
            "const Alpha = <p title=\"Lorem Ipsum\">\n  Dolor sit amet {Bravo}\n</p>;"
        );
    }

    #[test]
    fn test_labels_and_private_names_untouched() {
        let output = run("class A { #secret = 1; read() { return this.#secret; } }\nouter: for (;;) { break outer; }");
        assert!(output.contains("#secret = 1;"));
        assert!(output.contains("this.#secret"));
        assert!(output.contains("outer: for (;;)"));
        assert!(output.contains("break outer;"));
    }

    #[test]
    fn test_export_keeps_interface_name() {
        let output = run("const helper = 1;\nexport { helper };");
        assert!(output.ends_with("export { Alpha as helper };"));
    }

    #[test]
    fn test_directive_kept() {
        let output = run("'use strict';\nlet a;");
        assert_eq!(output, "\"use strict\";\nlet Alpha;");
    }
}
