//! JavaScript code generator.
//!
//! Converts an AST back to JavaScript source. Output uses two-space
//! indentation, double-quoted strings and one statement per line; comments
//! are not carried by the AST and so never appear.

use crate::ast::*;

const INDENT: &str = "  ";

/// The code generator.
pub struct Codegen<'a> {
    program: &'a Program,
    output: String,
    indent_level: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            output: String::new(),
            indent_level: 0,
        }
    }

    /// Generate JavaScript source code.
    pub fn generate(mut self) -> String {
        for (i, stmt) in self.program.body.iter().enumerate() {
            if i > 0 {
                self.emit_newline();
            }
            self.emit_stmt(stmt);
        }
        self.output
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_space(&mut self) {
        self.output.push(' ');
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent_level {
            self.output.push_str(INDENT);
        }
    }

    fn emit_semicolon(&mut self) {
        self.output.push(';');
    }

    fn emit_string(&mut self, s: &str) {
        self.output.push('"');
        self.output.push_str(&escape_string(s));
        self.output.push('"');
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn emit_list<T>(&mut self, items: &[T], mut emit_item: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            emit_item(self, item);
        }
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var { kind, decls } => {
                self.emit_var_decl(*kind, decls);
                self.emit_semicolon();
            }
            StmtKind::Function(func) => self.emit_function(func),
            StmtKind::Class(class) => self.emit_class(class),
            StmtKind::Block(stmts) => self.emit_block(stmts),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.emit("if (");
                self.emit_expr(test);
                self.emit(") ");
                self.emit_stmt(consequent);
                if let Some(alt) = alternate {
                    self.emit(" else ");
                    self.emit_stmt(alt);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.emit("switch (");
                self.emit_expr(discriminant);
                self.emit(") {");
                self.indent();
                for case in cases {
                    self.emit_newline();
                    if let Some(test) = &case.test {
                        self.emit("case ");
                        self.emit_expr(test);
                        self.emit(":");
                    } else {
                        self.emit("default:");
                    }
                    self.indent();
                    for stmt in &case.consequent {
                        self.emit_newline();
                        self.emit_stmt(stmt);
                    }
                    self.dedent();
                }
                self.dedent();
                self.emit_newline();
                self.emit("}");
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.emit("for (");
                if let Some(init) = init {
                    self.emit_for_init(init);
                }
                self.emit(";");
                if let Some(test) = test {
                    self.emit_space();
                    self.emit_expr(test);
                }
                self.emit(";");
                if let Some(update) = update {
                    self.emit_space();
                    self.emit_expr(update);
                }
                self.emit(") ");
                self.emit_stmt(body);
            }
            StmtKind::ForIn { left, right, body } => {
                self.emit("for (");
                self.emit_for_init(left);
                self.emit(" in ");
                self.emit_expr(right);
                self.emit(") ");
                self.emit_stmt(body);
            }
            StmtKind::ForOf {
                left,
                right,
                body,
                is_await,
            } => {
                self.emit(if *is_await { "for await (" } else { "for (" });
                self.emit_for_init(left);
                self.emit(" of ");
                self.emit_expr_with_prec(right, 2);
                self.emit(") ");
                self.emit_stmt(body);
            }
            StmtKind::While { test, body } => {
                self.emit("while (");
                self.emit_expr(test);
                self.emit(") ");
                self.emit_stmt(body);
            }
            StmtKind::DoWhile { body, test } => {
                self.emit("do ");
                self.emit_stmt(body);
                self.emit(" while (");
                self.emit_expr(test);
                self.emit(")");
                self.emit_semicolon();
            }
            StmtKind::Break { label } => {
                self.emit("break");
                if let Some(label) = label {
                    self.emit_space();
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Continue { label } => {
                self.emit("continue");
                if let Some(label) = label {
                    self.emit_space();
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Return { arg } => {
                self.emit("return");
                if let Some(arg) = arg {
                    self.emit_space();
                    self.emit_expr(arg);
                }
                self.emit_semicolon();
            }
            StmtKind::Throw { arg } => {
                self.emit("throw ");
                self.emit_expr(arg);
                self.emit_semicolon();
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.emit("try ");
                self.emit_block(block);
                if let Some(catch) = handler {
                    self.emit(" catch ");
                    if let Some(param) = &catch.param {
                        self.emit("(");
                        self.emit_binding(param);
                        self.emit(") ");
                    }
                    self.emit_block(&catch.body);
                }
                if let Some(finally) = finalizer {
                    self.emit(" finally ");
                    self.emit_block(finally);
                }
            }
            StmtKind::Labeled { label, body } => {
                self.emit(label);
                self.emit(": ");
                self.emit_stmt(body);
            }
            StmtKind::Expr(expr) => {
                if starts_ambiguously(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr(expr);
                }
                self.emit_semicolon();
            }
            StmtKind::Directive(value) => {
                self.emit_string(value);
                self.emit_semicolon();
            }
            StmtKind::Empty => self.emit(";"),
            StmtKind::Debugger => {
                self.emit("debugger");
                self.emit_semicolon();
            }
            StmtKind::With { object, body } => {
                self.emit("with (");
                self.emit_expr(object);
                self.emit(") ");
                self.emit_stmt(body);
            }
            StmtKind::Import(decl) => self.emit_import(decl),
            StmtKind::Export(decl) => self.emit_export(decl),
        }
    }

    fn emit_block(&mut self, stmts: &[Stmt]) {
        self.emit("{");
        if !stmts.is_empty() {
            self.indent();
            for stmt in stmts {
                self.emit_newline();
                self.emit_stmt(stmt);
            }
            self.dedent();
            self.emit_newline();
        }
        self.emit("}");
    }

    /// Declaration list without the trailing semicolon.
    fn emit_var_decl(&mut self, kind: VarKind, decls: &[VarDeclarator]) {
        self.emit(kind.as_str());
        self.emit_space();
        self.emit_list(decls, |this, decl| {
            this.emit_binding(&decl.binding);
            if let Some(init) = &decl.init {
                this.emit(" = ");
                this.emit_expr_with_prec(init, 2);
            }
        });
    }

    fn emit_for_init(&mut self, init: &ForInit) {
        match init {
            ForInit::Var { kind, decls } => self.emit_var_decl(*kind, decls),
            ForInit::Expr(expr) => {
                // `in` inside a for-init would be read as the loop's own `in`.
                if contains_in(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr(expr);
                }
            }
        }
    }

    fn emit_binding(&mut self, binding: &Binding) {
        match &binding.kind {
            BindingKind::Ident(name) => self.emit(name),
            BindingKind::Array(elements) => {
                self.emit("[");
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    if let Some(elem) = elem {
                        if elem.rest {
                            self.emit("...");
                        }
                        self.emit_binding(&elem.binding);
                        self.emit_default(elem.default.as_ref());
                    }
                }
                // A trailing hole needs its own comma.
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            BindingKind::Object(properties) => {
                self.emit("{");
                self.emit_list(properties, |this, prop| {
                    if prop.rest {
                        this.emit("...");
                        this.emit_binding(&prop.value);
                        return;
                    }
                    let shorthand = matches!(
                        (&prop.key, &prop.value.kind),
                        (PropertyKey::Ident(key), BindingKind::Ident(value)) if key == value
                    );
                    if !shorthand {
                        this.emit_property_key(&prop.key);
                        this.emit(": ");
                    }
                    this.emit_binding(&prop.value);
                    this.emit_default(prop.default.as_ref());
                });
                self.emit("}");
            }
        }
    }

    fn emit_default(&mut self, default: Option<&Expr>) {
        if let Some(default) = default {
            self.emit(" = ");
            self.emit_expr_with_prec(default, 2);
        }
    }

    fn emit_function(&mut self, func: &Function) {
        if func.is_async {
            self.emit("async ");
        }
        self.emit("function");
        if func.is_generator {
            self.emit("*");
        }
        if let Some(name) = &func.name {
            self.emit_space();
            self.emit(name);
        }
        self.emit_params(&func.params);
        self.emit_space();
        self.emit_block(&func.body);
    }

    fn emit_arrow(&mut self, arrow: &ArrowFunction) {
        if arrow.is_async {
            self.emit("async ");
        }
        self.emit_params(&arrow.params);
        self.emit(" => ");

        match &arrow.body {
            ArrowBody::Expr(expr) => {
                // An object literal body would read as a block.
                if leftmost_is_object(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr_with_prec(expr, 2);
                }
            }
            ArrowBody::Block(stmts) => self.emit_block(stmts),
        }
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.emit("(");
        self.emit_list(params, |this, param| {
            if param.rest {
                this.emit("...");
            }
            this.emit_binding(&param.binding);
            this.emit_default(param.default.as_ref());
        });
        self.emit(")");
    }

    fn emit_class(&mut self, class: &Class) {
        self.emit("class");
        if let Some(name) = &class.name {
            self.emit_space();
            self.emit(name);
        }
        if let Some(super_class) = &class.super_class {
            self.emit(" extends ");
            self.emit_expr_with_prec(super_class, 18);
        }
        self.emit(" {");
        self.indent();
        for member in &class.body {
            self.emit_newline();
            self.emit_class_member(member);
        }
        self.dedent();
        if !class.body.is_empty() {
            self.emit_newline();
        }
        self.emit("}");
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match &member.kind {
            ClassMemberKind::Method {
                key,
                value,
                kind,
                is_static,
            } => {
                if *is_static {
                    self.emit("static ");
                }
                match kind {
                    MethodKind::Get => self.emit("get "),
                    MethodKind::Set => self.emit("set "),
                    _ => {}
                }
                if value.is_async {
                    self.emit("async ");
                }
                if value.is_generator {
                    self.emit("*");
                }
                self.emit_property_key(key);
                self.emit_params(&value.params);
                self.emit_space();
                self.emit_block(&value.body);
            }
            ClassMemberKind::Property { key, value, is_static } => {
                if *is_static {
                    self.emit("static ");
                }
                self.emit_property_key(key);
                self.emit_default(value.as_ref());
                self.emit_semicolon();
            }
            ClassMemberKind::StaticBlock(stmts) => {
                self.emit("static ");
                self.emit_block(stmts);
            }
        }
    }

    fn emit_import(&mut self, decl: &ImportDecl) {
        self.emit("import ");

        let mut has_clause = false;
        let mut named = Vec::new();

        for spec in &decl.specifiers {
            match spec {
                ImportSpecifier::Default { local } => {
                    self.emit(local);
                    has_clause = true;
                }
                ImportSpecifier::Namespace { local } => {
                    if has_clause {
                        self.emit(", ");
                    }
                    self.emit("* as ");
                    self.emit(local);
                    has_clause = true;
                }
                ImportSpecifier::Named { imported, local } => named.push((imported, local)),
            }
        }

        if !named.is_empty() {
            if has_clause {
                self.emit(", ");
            }
            self.emit("{ ");
            self.emit_list(&named, |this, (imported, local)| {
                this.emit_module_name(imported);
                if imported != local {
                    this.emit(" as ");
                    this.emit(local);
                }
            });
            self.emit(" }");
            has_clause = true;
        }

        if has_clause {
            self.emit(" from ");
        }
        self.emit_string(&decl.source);
        self.emit_semicolon();
    }

    fn emit_export(&mut self, decl: &ExportDecl) {
        match decl {
            ExportDecl::Named { specifiers, source } => {
                self.emit("export {");
                if !specifiers.is_empty() {
                    self.emit_space();
                    self.emit_list(specifiers, |this, spec| {
                        this.emit_module_name(&spec.local);
                        if spec.local != spec.exported {
                            this.emit(" as ");
                            this.emit_module_name(&spec.exported);
                        }
                    });
                    self.emit_space();
                }
                self.emit("}");
                if let Some(source) = source {
                    self.emit(" from ");
                    self.emit_string(source);
                }
                self.emit_semicolon();
            }
            ExportDecl::Default(DefaultExport::Function(func)) => {
                self.emit("export default ");
                self.emit_function(func);
            }
            ExportDecl::Default(DefaultExport::Class(class)) => {
                self.emit("export default ");
                self.emit_class(class);
            }
            ExportDecl::Default(DefaultExport::Expr(expr)) => {
                self.emit("export default ");
                if starts_ambiguously(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr_with_prec(expr, 2);
                }
                self.emit_semicolon();
            }
            ExportDecl::Decl(stmt) => {
                self.emit("export ");
                self.emit_stmt(stmt);
            }
            ExportDecl::All { exported, source } => {
                self.emit("export *");
                if let Some(exported) = exported {
                    self.emit(" as ");
                    self.emit_module_name(exported);
                }
                self.emit(" from ");
                self.emit_string(source);
                self.emit_semicolon();
            }
        }
    }

    /// Export and import names may be arbitrary strings (`export { a as "b c" }`).
    fn emit_module_name(&mut self, name: &str) {
        if is_identifier_name(name) {
            self.emit(name);
        } else {
            self.emit_string(name);
        }
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        self.emit_expr_with_prec(expr, 0);
    }

    fn emit_args(&mut self, args: &[Expr]) {
        self.emit("(");
        self.emit_list(args, |this, arg| this.emit_expr_with_prec(arg, 2));
        self.emit(")");
    }

    fn emit_expr_with_prec(&mut self, expr: &Expr, min_prec: u8) {
        match &expr.kind {
            ExprKind::Null => self.emit("null"),
            ExprKind::Bool(b) => self.emit(if *b { "true" } else { "false" }),
            ExprKind::Number(raw) | ExprKind::BigInt(raw) => self.emit(raw),
            ExprKind::String(s) => self.emit_string(s),
            ExprKind::Regex { pattern, flags } => {
                self.emit("/");
                self.emit(pattern);
                self.emit("/");
                self.emit(flags);
            }
            ExprKind::Template { quasis, exprs } => self.emit_template(quasis, exprs),
            ExprKind::Ident(name) => self.emit(name),
            ExprKind::This => self.emit("this"),
            ExprKind::Super => self.emit("super"),
            ExprKind::Array(elements) => {
                self.emit("[");
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    if let Some(elem) = elem {
                        self.emit_expr_with_prec(elem, 2);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            ExprKind::Object(properties) => {
                if properties.is_empty() {
                    self.emit("{}");
                    return;
                }
                self.emit("{");
                self.indent();
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.emit(",");
                    }
                    self.emit_newline();
                    self.emit_object_property(prop);
                }
                self.dedent();
                self.emit_newline();
                self.emit("}");
            }
            ExprKind::Function(func) => self.emit_function(func),
            ExprKind::Arrow(arrow) => {
                self.wrap_if(min_prec > 2, |this| this.emit_arrow(arrow));
            }
            ExprKind::Class(class) => self.emit_class(class),
            ExprKind::Unary { op, arg } => {
                self.wrap_if(min_prec > 15, |this| {
                    let op_str = match op {
                        UnaryOp::Minus => "-",
                        UnaryOp::Plus => "+",
                        UnaryOp::Not => "!",
                        UnaryOp::BitNot => "~",
                        UnaryOp::Typeof => "typeof ",
                        UnaryOp::Void => "void ",
                        UnaryOp::Delete => "delete ",
                    };
                    this.emit(op_str);
                    // `- -x` and `+ ++x` must not fuse into `--x` / `+++x`.
                    if repeats_sign(*op, arg) {
                        this.emit_space();
                    }
                    this.emit_expr_with_prec(arg, 15);
                });
            }
            ExprKind::Binary { op, left, right } => {
                let (prec, op_str) = binary_op_info(*op);
                self.wrap_if(prec < min_prec, |this| {
                    // `(-a) ** b` needs its parentheses.
                    let left_prec = if *op == BinaryOp::Pow { prec + 2 } else { prec };
                    this.emit_operand(*op, left, left_prec);
                    this.emit_space();
                    this.emit(op_str);
                    this.emit_space();
                    let right_prec = if is_right_associative(*op) { prec } else { prec + 1 };
                    this.emit_operand(*op, right, right_prec);
                });
            }
            ExprKind::Assign { op, left, right } => {
                self.wrap_if(min_prec > 2, |this| {
                    this.emit_expr_with_prec(left, 3);
                    this.emit_space();
                    this.emit(assign_op_str(*op));
                    this.emit_space();
                    this.emit_expr_with_prec(right, 2);
                });
            }
            ExprKind::Update { op, prefix, arg } => {
                let op_str = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };
                if *prefix {
                    self.wrap_if(min_prec > 15, |this| {
                        this.emit(op_str);
                        this.emit_expr_with_prec(arg, 15);
                    });
                } else {
                    self.wrap_if(min_prec > 16, |this| {
                        this.emit_expr_with_prec(arg, 16);
                        this.emit(op_str);
                    });
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.wrap_if(min_prec > 3, |this| {
                    this.emit_expr_with_prec(test, 4);
                    this.emit(" ? ");
                    this.emit_expr_with_prec(consequent, 2);
                    this.emit(" : ");
                    this.emit_expr_with_prec(alternate, 2);
                });
            }
            ExprKind::Sequence(exprs) => {
                self.wrap_if(min_prec > 1, |this| {
                    this.emit_list(exprs, |this, expr| this.emit_expr_with_prec(expr, 2));
                });
            }
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                self.emit_member_object(object);
                match property {
                    MemberProp::Ident(name) => {
                        self.emit(if *optional { "?." } else { "." });
                        self.emit(name);
                    }
                    MemberProp::Private(name) => {
                        self.emit(if *optional { "?.#" } else { ".#" });
                        self.emit(name);
                    }
                    MemberProp::Computed(property) => {
                        self.emit(if *optional { "?.[" } else { "[" });
                        self.emit_expr(property);
                        self.emit("]");
                    }
                }
            }
            ExprKind::Call {
                callee,
                args,
                optional,
            } => {
                self.emit_member_object(callee);
                if *optional {
                    self.emit("?.");
                }
                self.emit_args(args);
            }
            ExprKind::New { callee, args } => {
                self.emit("new ");
                if contains_call(callee) {
                    self.emit("(");
                    self.emit_expr(callee);
                    self.emit(")");
                } else {
                    self.emit_expr_with_prec(callee, 17);
                }
                self.emit_args(args);
            }
            ExprKind::TaggedTemplate { tag, quasis, exprs } => {
                self.emit_member_object(tag);
                self.emit_template(quasis, exprs);
            }
            ExprKind::Spread(arg) => {
                self.emit("...");
                self.emit_expr_with_prec(arg, 2);
            }
            ExprKind::Yield { arg, delegate } => {
                self.wrap_if(min_prec > 2, |this| {
                    this.emit(if *delegate { "yield*" } else { "yield" });
                    if let Some(arg) = arg {
                        this.emit_space();
                        this.emit_expr_with_prec(arg, 2);
                    }
                });
            }
            ExprKind::Await(arg) => {
                self.wrap_if(min_prec > 15, |this| {
                    this.emit("await ");
                    this.emit_expr_with_prec(arg, 15);
                });
            }
            ExprKind::Import(arg) => {
                self.emit("import(");
                self.emit_expr_with_prec(arg, 2);
                self.emit(")");
            }
            ExprKind::MetaProperty { meta, property } => {
                self.emit(meta);
                self.emit(".");
                self.emit(property);
            }
            ExprKind::JsxElement(element) => self.emit_jsx_element(element),
            ExprKind::JsxFragment(fragment) => self.emit_jsx_fragment(fragment),
        }
    }

    fn wrap_if(&mut self, parens: bool, f: impl FnOnce(&mut Self)) {
        if parens {
            self.emit("(");
        }
        f(self);
        if parens {
            self.emit(")");
        }
    }

    /// Operand of a binary operator. `??` cannot be mixed with `||`/`&&`
    /// without parentheses.
    fn emit_operand(&mut self, op: BinaryOp, operand: &Expr, prec: u8) {
        let mixes_nullish = match &operand.kind {
            ExprKind::Binary { op: inner, .. } => {
                (op == BinaryOp::NullishCoalesce && matches!(inner, BinaryOp::Or | BinaryOp::And))
                    || (matches!(op, BinaryOp::Or | BinaryOp::And) && *inner == BinaryOp::NullishCoalesce)
            }
            _ => false,
        };
        if mixes_nullish {
            self.emit("(");
            self.emit_expr(operand);
            self.emit(")");
        } else {
            self.emit_expr_with_prec(operand, prec);
        }
    }

    /// Object of a member access, callee, or tag.
    fn emit_member_object(&mut self, object: &Expr) {
        // `1.toString()` would lex as a malformed number.
        let needs_parens = matches!(&object.kind, ExprKind::Number(raw) if raw.bytes().all(|b| b.is_ascii_digit()));
        if needs_parens {
            self.emit("(");
            self.emit_expr(object);
            self.emit(")");
        } else {
            self.emit_expr_with_prec(object, 18);
        }
    }

    fn emit_template(&mut self, quasis: &[String], exprs: &[Expr]) {
        self.emit("`");
        for (i, quasi) in quasis.iter().enumerate() {
            self.emit(quasi);
            if let Some(expr) = exprs.get(i) {
                self.emit("${");
                self.emit_expr(expr);
                self.emit("}");
            }
        }
        self.emit("`");
    }

    fn emit_object_property(&mut self, prop: &ObjectProp) {
        let prop = match prop {
            ObjectProp::Spread(arg) => {
                self.emit("...");
                self.emit_expr_with_prec(arg, 2);
                return;
            }
            ObjectProp::Property(prop) => prop,
        };

        match prop.kind {
            PropertyKind::Get | PropertyKind::Set | PropertyKind::Method => {
                let ExprKind::Function(func) = &prop.value.kind else {
                    self.emit_property_key(&prop.key);
                    self.emit(": ");
                    self.emit_expr_with_prec(&prop.value, 2);
                    return;
                };
                match prop.kind {
                    PropertyKind::Get => self.emit("get "),
                    PropertyKind::Set => self.emit("set "),
                    _ => {
                        if func.is_async {
                            self.emit("async ");
                        }
                        if func.is_generator {
                            self.emit("*");
                        }
                    }
                }
                self.emit_property_key(&prop.key);
                self.emit_params(&func.params);
                self.emit_space();
                self.emit_block(&func.body);
            }
            PropertyKind::Init => {
                if let (PropertyKey::Ident(key), true) = (&prop.key, prop.shorthand) {
                    match &prop.value.kind {
                        ExprKind::Ident(value) if value == key => {
                            self.emit(key);
                            return;
                        }
                        // Cover grammar default: `{ a = 1 } = obj`
                        ExprKind::Assign {
                            op: AssignOp::Assign,
                            left,
                            right,
                        } if matches!(&left.kind, ExprKind::Ident(value) if value == key) => {
                            self.emit(key);
                            self.emit(" = ");
                            self.emit_expr_with_prec(right, 2);
                            return;
                        }
                        _ => {}
                    }
                }
                self.emit_property_key(&prop.key);
                self.emit(": ");
                self.emit_expr_with_prec(&prop.value, 2);
            }
        }
    }

    fn emit_property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(name) => self.emit(name),
            PropertyKey::String(s) => self.emit_string(s),
            PropertyKey::Number(raw) => self.emit(raw),
            PropertyKey::Private(name) => {
                self.emit("#");
                self.emit(name);
            }
            PropertyKey::Computed(expr) => {
                self.emit("[");
                self.emit_expr_with_prec(expr, 2);
                self.emit("]");
            }
        }
    }

    // =========================================================================
    // JSX
    // =========================================================================

    fn emit_jsx_element(&mut self, element: &JsxElement) {
        let tag = jsx_element_name_string(&element.name);
        self.emit("<");
        self.emit(&tag);
        for attr in &element.attributes {
            self.emit_space();
            match attr {
                JsxAttribute::Attribute { name, value } => {
                    self.emit_jsx_attr_name(name);
                    if let Some(value) = value {
                        self.emit("=");
                        self.emit_jsx_attr_value(value);
                    }
                }
                JsxAttribute::Spread(arg) => {
                    self.emit("{...");
                    self.emit_expr_with_prec(arg, 2);
                    self.emit("}");
                }
            }
        }
        if element.self_closing {
            self.emit(" />");
            return;
        }
        self.emit(">");
        self.emit_jsx_children(&element.children);
        self.emit("</");
        self.emit(&tag);
        self.emit(">");
    }

    fn emit_jsx_fragment(&mut self, fragment: &JsxFragment) {
        self.emit("<>");
        self.emit_jsx_children(&fragment.children);
        self.emit("</>");
    }

    fn emit_jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                // Text is copied verbatim; its line breaks are significant.
                JsxChild::Text(text) => self.emit(text),
                JsxChild::Element(element) => self.emit_jsx_element(element),
                JsxChild::Fragment(fragment) => self.emit_jsx_fragment(fragment),
                JsxChild::Expr(Some(expr)) => {
                    self.emit("{");
                    self.emit_expr(expr);
                    self.emit("}");
                }
                JsxChild::Expr(None) => self.emit("{}"),
                JsxChild::Spread(expr) => {
                    self.emit("{...");
                    self.emit_expr(expr);
                    self.emit("}");
                }
            }
        }
    }

    fn emit_jsx_attr_value(&mut self, value: &JsxAttrValue) {
        match value {
            // JSX attribute strings have no escapes; fall back to an
            // expression container when the text holds a quote.
            JsxAttrValue::String(s) if s.contains('"') => {
                self.emit("{");
                self.emit_string(s);
                self.emit("}");
            }
            JsxAttrValue::String(s) => {
                self.emit("\"");
                self.emit(s);
                self.emit("\"");
            }
            JsxAttrValue::Expr(expr) => {
                self.emit("{");
                self.emit_expr(expr);
                self.emit("}");
            }
            JsxAttrValue::Element(element) => self.emit_jsx_element(element),
            JsxAttrValue::Fragment(fragment) => self.emit_jsx_fragment(fragment),
        }
    }

    fn emit_jsx_attr_name(&mut self, name: &JsxAttrName) {
        match name {
            JsxAttrName::Ident(s) => self.emit(s),
            JsxAttrName::NamespacedName { namespace, name } => {
                self.emit(namespace);
                self.emit(":");
                self.emit(name);
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn jsx_element_name_string(name: &JsxElementName) -> String {
    match name {
        JsxElementName::Ident(s) => s.clone(),
        JsxElementName::MemberExpr(parts) => parts.join("."),
        JsxElementName::NamespacedName { namespace, name } => format!("{namespace}:{name}"),
    }
}

/// Leftmost sub-expression of `expr`, following the operands that are
/// printed first.
fn leftmost(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Binary { left, .. } | ExprKind::Assign { left, .. } => leftmost(left),
        ExprKind::Conditional { test, .. } => leftmost(test),
        ExprKind::Sequence(exprs) => exprs.first().map_or(expr, leftmost),
        ExprKind::Member { object, .. } => leftmost(object),
        ExprKind::Call { callee, .. } => leftmost(callee),
        ExprKind::TaggedTemplate { tag, .. } => leftmost(tag),
        ExprKind::Update { prefix: false, arg, .. } => leftmost(arg),
        _ => expr,
    }
}

/// Whether an expression statement would be misread as a declaration or
/// block when printed bare.
fn starts_ambiguously(expr: &Expr) -> bool {
    match &leftmost(expr).kind {
        ExprKind::Function(_) | ExprKind::Class(_) | ExprKind::Object(_) => true,
        ExprKind::Member { object, .. } => matches!(&object.kind, ExprKind::Ident(name) if name == "let"),
        _ => false,
    }
}

fn leftmost_is_object(expr: &Expr) -> bool {
    matches!(leftmost(expr).kind, ExprKind::Object(_))
}

fn contains_call(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Member { object, .. } => contains_call(object),
        ExprKind::TaggedTemplate { tag, .. } => contains_call(tag),
        _ => false,
    }
}

/// Whether a top-level `in` operator appears outside any brackets.
fn contains_in(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op: BinaryOp::In, .. } => true,
        ExprKind::Binary { left, right, .. } => contains_in(left) || contains_in(right),
        ExprKind::Assign { left, right, .. } => contains_in(left) || contains_in(right),
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => contains_in(test) || contains_in(consequent) || contains_in(alternate),
        ExprKind::Sequence(exprs) => exprs.iter().any(contains_in),
        ExprKind::Unary { arg, .. } | ExprKind::Await(arg) => contains_in(arg),
        _ => false,
    }
}

fn repeats_sign(op: UnaryOp, arg: &Expr) -> bool {
    match (op, &arg.kind) {
        (UnaryOp::Minus, ExprKind::Unary { op: UnaryOp::Minus, .. })
        | (UnaryOp::Plus, ExprKind::Unary { op: UnaryOp::Plus, .. }) => true,
        (UnaryOp::Minus, ExprKind::Update { op: UpdateOp::Decrement, prefix: true, .. })
        | (UnaryOp::Plus, ExprKind::Update { op: UpdateOp::Increment, prefix: true, .. }) => true,
        _ => false,
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => result.push_str("\\0"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

fn binary_op_info(op: BinaryOp) -> (u8, &'static str) {
    match op {
        BinaryOp::Or => (4, "||"),
        BinaryOp::And => (5, "&&"),
        BinaryOp::NullishCoalesce => (4, "??"),
        BinaryOp::BitOr => (6, "|"),
        BinaryOp::BitXor => (7, "^"),
        BinaryOp::BitAnd => (8, "&"),
        BinaryOp::Eq => (9, "=="),
        BinaryOp::NotEq => (9, "!="),
        BinaryOp::StrictEq => (9, "==="),
        BinaryOp::StrictNotEq => (9, "!=="),
        BinaryOp::Lt => (10, "<"),
        BinaryOp::LtEq => (10, "<="),
        BinaryOp::Gt => (10, ">"),
        BinaryOp::GtEq => (10, ">="),
        BinaryOp::In => (10, "in"),
        BinaryOp::Instanceof => (10, "instanceof"),
        BinaryOp::Shl => (11, "<<"),
        BinaryOp::Shr => (11, ">>"),
        BinaryOp::UShr => (11, ">>>"),
        BinaryOp::Add => (12, "+"),
        BinaryOp::Sub => (12, "-"),
        BinaryOp::Mul => (13, "*"),
        BinaryOp::Div => (13, "/"),
        BinaryOp::Mod => (13, "%"),
        BinaryOp::Pow => (14, "**"),
    }
}

fn is_right_associative(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Pow)
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::AddAssign => "+=",
        AssignOp::SubAssign => "-=",
        AssignOp::MulAssign => "*=",
        AssignOp::DivAssign => "/=",
        AssignOp::ModAssign => "%=",
        AssignOp::PowAssign => "**=",
        AssignOp::ShlAssign => "<<=",
        AssignOp::ShrAssign => ">>=",
        AssignOp::UShrAssign => ">>>=",
        AssignOp::BitOrAssign => "|=",
        AssignOp::BitXorAssign => "^=",
        AssignOp::BitAndAssign => "&=",
        AssignOp::AndAssign => "&&=",
        AssignOp::OrAssign => "||=",
        AssignOp::NullishAssign => "??=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn roundtrip(source: &str) -> String {
        let program = Parser::new(source).parse().unwrap();
        Codegen::new(&program).generate()
    }

    /// Printing is a fixed point after the first pass.
    fn assert_stable(source: &str) -> String {
        let once = roundtrip(source);
        let twice = roundtrip(&once);
        assert_eq!(once, twice, "unstable output for {source:?}");
        once
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(roundtrip("let x = 1;"), "let x = 1;");
        assert_eq!(roundtrip("var a = 'q', b"), "var a = \"q\", b;");
    }

    #[test]
    fn test_function_declaration() {
        let output = roundtrip("function foo(a, b) { return a + b; }");
        assert_eq!(output, "function foo(a, b) {\n  return a + b;\n}");
    }

    #[test]
    fn test_comments_dropped() {
        let output = roundtrip("// leading\nlet x = /* inline */ 1; /* trailing */");
        assert_eq!(output, "let x = 1;");
    }

    #[test]
    fn test_precedence_parens() {
        assert_eq!(roundtrip("(a + b) * c;"), "(a + b) * c;");
        assert_eq!(roundtrip("a + b * c;"), "a + b * c;");
        assert_eq!(roundtrip("(-a) ** 2;"), "(-a) ** 2;");
        assert_eq!(roundtrip("(a || b) ?? c;"), "(a || b) ?? c;");
        assert_eq!(roundtrip("- -x;"), "- -x;");
        assert_eq!(roundtrip("f((a, b));"), "f((a, b));");
    }

    #[test]
    fn test_statement_start_parens() {
        assert_eq!(roundtrip("(function () {})();"), "(function() {}());");
        assert_eq!(roundtrip("({ a } = b);"), "({\n  a\n} = b);");
    }

    #[test]
    fn test_arrow_object_body() {
        assert_eq!(roundtrip("const f = () => ({ a: 1 });"), "const f = () => ({\n  a: 1\n});");
        assert_eq!(roundtrip("f(x => x * 2);"), "f((x) => x * 2);");
    }

    #[test]
    fn test_member_on_number() {
        assert_eq!(roundtrip("(1).toString();"), "(1).toString();");
        assert_eq!(roundtrip("1.5.toFixed();"), "1.5.toFixed();");
    }

    #[test]
    fn test_new_with_call_callee() {
        assert_eq!(roundtrip("new (foo())();"), "new (foo())();");
        assert_eq!(roundtrip("new Foo;"), "new Foo();");
    }

    #[test]
    fn test_jsx_preserved() {
        assert_eq!(
            roundtrip("const el = <div className=\"a\" {...p}>hi {name}<br /></div>;"),
            "const el = <div className=\"a\" {...p}>hi {name}<br /></div>;"
        );
    }

    #[test]
    fn test_stable_output() {
        assert_stable(
            "class A extends B { static x = 1; #y; get z() { return this.#y; } static { init(); } }",
        );
        assert_stable("for (const [k, v] of Object.entries(o)) { if (!v) continue; }");
        assert_stable("label: for (;;) { break label; }");
        assert_stable("const { a, b: { c = 1 }, ...rest } = obj;");
        assert_stable("const t = tag`x${y}z`;");
        assert_stable("try { a(); } catch { b(); } finally { c(); }");
        assert_stable("import x, { y as z } from 'm'; export { z as default }; export * as ns from 'n';");
        assert_stable("async function* g() { yield* other(); await x; }");
        assert_stable("a?.b?.(c)?.[d];");
        assert_stable("x ??= y || z;");
        assert_stable("switch (x) { case 1: f(); break; default: g(); }");
        assert_stable("do x++; while (x < 5);");
        assert_stable("for (const k in ('a' in o ? o : p)) {}");
        assert_stable("'use strict';\nconst re = /ab+c/gi.test(s);");
    }
}
