//! Type-name bookkeeping
//!
//! The parser treats a name as certainly naming a type once it has seen a
//! class, enum, typedef, alias or template type parameter introduce it.
//! [`collect_type_names`] recomputes the same set from a finished unit so
//! the writer can ask the parser how a fragment of output would read back.

use crate::parser::ast::*;
use rustc_hash::FxHashSet;

/// Library typedefs that are treated as types before any declaration
pub const BUILTIN_TYPEDEFS: &[&str] = &[
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
    "intmax_t",
    "uintmax_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "nullptr_t",
    "max_align_t",
    "FILE",
];

/// Every name the parser could have registered as a type while parsing `unit`
pub fn collect_type_names(unit: &ProgramUnit) -> FxHashSet<String> {
    let mut collector = Collector {
        names: BUILTIN_TYPEDEFS.iter().map(|s| s.to_string()).collect(),
    };
    for decl in &unit.declarations {
        collector.decl(decl);
    }
    collector.names
}

struct Collector {
    names: FxHashSet<String>,
}

impl Collector {
    fn insert_last(&mut self, name: &QualifiedName) {
        if let Some(ident) = name.last_ident() {
            self.names.insert(ident.to_string());
        }
        self.name(name);
    }

    fn decl(&mut self, decl: &Declaration) {
        match &decl.kind {
            DeclKind::Namespace(ns) => ns.members.iter().for_each(|d| self.decl(d)),
            DeclKind::Class(class) => self.class(class),
            DeclKind::Enum(e) => self.enumeration(e),
            DeclKind::Function(func) => {
                self.specifiers(&func.specifiers);
                self.name(&func.name);
                self.params(&func.params);
                self.qualifiers(&func.qualifiers);
                if let Some(ret) = &func.trailing_return {
                    self.type_id(ret);
                }
                for init in &func.member_inits {
                    self.name(&init.member);
                    self.initializer(&init.init);
                }
                if let FunctionBody::Defined(block) = &func.body {
                    self.block(block);
                }
            }
            DeclKind::Variable(var) => {
                self.specifiers(&var.specifiers);
                for d in &var.declarators {
                    self.declarator(&d.declarator);
                    if let Some(width) = &d.bit_width {
                        self.expr(width);
                    }
                    if let Some(init) = &d.init {
                        self.initializer(init);
                    }
                }
            }
            DeclKind::Typedef(td) => {
                self.specifiers(&td.specifiers);
                for d in &td.declarators {
                    self.declarator(d);
                    if let Some(name) = d.name() {
                        self.insert_last(name);
                    }
                }
            }
            DeclKind::Alias(alias) => {
                self.names.insert(alias.name.clone());
                self.type_id(&alias.target);
            }
            DeclKind::Template(tpl) => {
                self.template_params(&tpl.params);
                self.decl(&tpl.declaration);
            }
            DeclKind::Linkage { body, .. } => match body {
                LinkageBody::Block(decls) => decls.iter().for_each(|d| self.decl(d)),
                LinkageBody::Single(d) => self.decl(d),
            },
            DeclKind::StaticAssert { condition, message } => {
                self.expr(condition);
                if let Some(message) = message {
                    self.expr(message);
                }
            }
            DeclKind::UsingDirective(name) | DeclKind::UsingDeclaration { name, .. } => self.name(name),
            DeclKind::NamespaceAlias { target, .. } => self.name(target),
            DeclKind::Access(_) | DeclKind::Preprocessor(_) => {}
        }
    }

    fn template_params(&mut self, params: &[TemplateParam]) {
        for param in params {
            match param {
                TemplateParam::Type { name, default, .. } => {
                    if let Some(name) = name {
                        self.names.insert(name.clone());
                    }
                    if let Some(default) = default {
                        self.type_id(default);
                    }
                }
                TemplateParam::NonType(param) => self.param(param),
                TemplateParam::Template { params, name, default, .. } => {
                    self.template_params(params);
                    if let Some(name) = name {
                        self.names.insert(name.clone());
                    }
                    if let Some(default) = default {
                        self.name(default);
                    }
                }
            }
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        if let Some(name) = &class.name {
            self.insert_last(name);
        }
        for base in &class.bases {
            self.name(&base.name);
        }
        for member in class.members.iter().flatten() {
            self.decl(member);
        }
    }

    fn enumeration(&mut self, e: &EnumDecl) {
        if let Some(name) = &e.name {
            self.insert_last(name);
        }
        if let Some(underlying) = &e.underlying {
            self.type_spec(underlying);
        }
        for enumerator in e.enumerators.iter().flatten() {
            if let Some(value) = &enumerator.value {
                self.expr(value);
            }
        }
    }

    fn specifiers(&mut self, specs: &DeclSpecifiers) {
        if let Some(ty) = &specs.ty {
            self.type_spec(ty);
        }
    }

    fn type_spec(&mut self, spec: &TypeSpec) {
        match &spec.kind {
            TypeKind::Named(name) => self.name(name),
            TypeKind::Elaborated { key, name } => match key {
                ElaboratedKey::Class(_) | ElaboratedKey::Enum => self.insert_last(name),
                ElaboratedKey::Typename => self.name(name),
            },
            TypeKind::Decltype(expr) => self.expr(expr),
            TypeKind::Class(class) => self.class(class),
            TypeKind::Enum(e) => self.enumeration(e),
            TypeKind::Builtin(_) | TypeKind::DecltypeAuto | TypeKind::Auto => {}
        }
    }

    fn type_id(&mut self, ty: &TypeId) {
        self.type_spec(&ty.spec);
        self.declarator(&ty.declarator);
    }

    fn declarator(&mut self, declarator: &Declarator) {
        for op in &declarator.ptr_ops {
            if let PtrOp::MemberPointer { class, .. } = op {
                self.name(class);
            }
        }
        match &declarator.direct {
            DirectDeclarator::Name(name) => self.name(name),
            DirectDeclarator::Nested(inner) => self.declarator(inner),
            DirectDeclarator::Abstract | DirectDeclarator::Bindings(_) => {}
        }
        for suffix in &declarator.suffixes {
            match suffix {
                DeclSuffix::Array(Some(size)) => self.expr(size),
                DeclSuffix::Array(None) => {}
                DeclSuffix::Function(func) => {
                    self.params(&func.params);
                    self.qualifiers(&func.qualifiers);
                    if let Some(ret) = &func.trailing_return {
                        self.type_id(ret);
                    }
                }
            }
        }
    }

    fn qualifiers(&mut self, qualifiers: &FunctionQualifiers) {
        match &qualifiers.exception {
            Some(ExceptionSpec::Noexcept(Some(expr))) => self.expr(expr),
            Some(ExceptionSpec::Throw(types)) => types.iter().for_each(|t| self.type_id(t)),
            _ => {}
        }
    }

    fn params(&mut self, params: &[Param]) {
        params.iter().for_each(|p| self.param(p));
    }

    fn param(&mut self, param: &Param) {
        self.specifiers(&param.specifiers);
        self.declarator(&param.declarator);
        if let Some(default) = &param.default {
            self.expr(default);
        }
    }

    fn name(&mut self, name: &QualifiedName) {
        for segment in &name.segments {
            if let Identifier::Conversion(ty) = &segment.ident {
                self.type_id(ty);
            }
            for arg in segment.template_args.iter().flatten() {
                self.template_arg(arg);
            }
        }
    }

    fn template_arg(&mut self, arg: &TemplateArg) {
        match arg {
            TemplateArg::Type(ty) => self.type_id(ty),
            TemplateArg::Expr(expr) => self.expr(expr),
            TemplateArg::Pack(inner) => self.template_arg(inner),
        }
    }

    fn initializer(&mut self, init: &Initializer) {
        match init {
            Initializer::Assign(expr) => self.expr(expr),
            Initializer::Paren(exprs) | Initializer::Brace(exprs) => exprs.iter().for_each(|e| self.expr(e)),
        }
    }

    fn block(&mut self, block: &Block) {
        block.statements.iter().for_each(|s| self.stmt(s));
    }

    fn condition(&mut self, condition: &Condition) {
        match condition {
            Condition::Expr(expr) => self.expr(expr),
            Condition::Decl(decl) => self.decl(decl),
        }
    }

    fn stmt(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StmtKind::Expr(expr) | StmtKind::Case(expr) => self.expr(expr),
            StmtKind::Return(expr) => {
                if let Some(expr) = expr {
                    self.expr(expr);
                }
            }
            StmtKind::Compound(block) => self.block(block),
            StmtKind::Declaration(decl) => self.decl(decl),
            StmtKind::If {
                init,
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.condition(condition);
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch);
                }
            }
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(condition) = condition {
                    self.condition(condition);
                }
                if let Some(step) = step {
                    self.expr(step);
                }
                self.stmt(body);
            }
            StmtKind::RangeFor { init, decl, range, body } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.decl(decl);
                self.expr(range);
                self.stmt(body);
            }
            StmtKind::While { condition, body } => {
                self.condition(condition);
                self.stmt(body);
            }
            StmtKind::DoWhile { body, condition } => {
                self.stmt(body);
                self.expr(condition);
            }
            StmtKind::Switch { init, condition, body } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.condition(condition);
                self.stmt(body);
            }
            StmtKind::Try { body, handlers } => {
                self.block(body);
                for handler in handlers {
                    if let Some(param) = &handler.param {
                        self.param(param);
                    }
                    self.block(&handler.body);
                }
            }
            StmtKind::Default
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Goto(_)
            | StmtKind::Label(_)
            | StmtKind::Empty => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::This => {}
            Expr::Name(name) => self.name(name),
            Expr::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Call { callee, args } => {
                self.expr(callee);
                args.iter().for_each(|a| self.expr(a));
            }
            Expr::Index { object, index } => {
                self.expr(object);
                self.expr(index);
            }
            Expr::Member { object, member, .. } => {
                self.expr(object);
                self.name(member);
            }
            Expr::Cast { ty, expr, .. } => {
                self.type_id(ty);
                self.expr(expr);
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(condition);
                self.expr(then_expr);
                self.expr(else_expr);
            }
            Expr::InitList { ty, elements } => {
                if let Some(ty) = ty {
                    self.type_spec(ty);
                }
                elements.iter().for_each(|e| self.expr(e));
            }
            Expr::Sizeof(arg) => self.sizeof_arg(arg),
            Expr::Typeid(arg) => self.sizeof_arg(arg),
            Expr::Alignof(ty) => self.type_id(ty),
            Expr::New {
                placement,
                ty,
                array_size,
                init,
                ..
            } => {
                placement.iter().for_each(|e| self.expr(e));
                self.type_id(ty);
                if let Some(size) = array_size {
                    self.expr(size);
                }
                if let Some(init) = init {
                    self.initializer(init);
                }
            }
            Expr::Delete { expr, .. } | Expr::PackExpansion(expr) | Expr::Noexcept(expr) => self.expr(expr),
            Expr::Fold { left, right, .. } => {
                for operand in left.iter().chain(right.iter()) {
                    self.expr(operand);
                }
            }
            Expr::Throw(operand) => {
                if let Some(operand) = operand {
                    self.expr(operand);
                }
            }
            Expr::Lambda(lambda) => {
                for capture in &lambda.captures {
                    if let Capture::ByCopy { init: Some(init), .. } | Capture::ByRef { init: Some(init), .. } = capture {
                        self.expr(init);
                    }
                }
                if let Some(params) = &lambda.params {
                    self.params(params);
                }
                if let Some(ret) = &lambda.trailing_return {
                    self.type_id(ret);
                }
                self.block(&lambda.body);
            }
        }
    }

    fn sizeof_arg(&mut self, arg: &SizeofArg) {
        match arg {
            SizeofArg::Type(ty) => self.type_id(ty),
            SizeofArg::Expr(expr) => self.expr(expr),
            SizeofArg::Pack(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_collects_declared_types() {
        let unit = parse_str(
            "namespace n { struct Node; }\n\
             typedef int Count;\n\
             using Id = long;\n\
             template <typename T> class Box {};\n\
             void f() { enum Local { A }; struct Tag *t; }\n",
        )
        .unwrap();
        let names = collect_type_names(&unit);

        for name in ["Node", "Count", "Id", "T", "Box", "Local", "Tag", "size_t"] {
            assert!(names.contains(name), "missing {}", name);
        }
        assert!(!names.contains("f"));
        assert!(!names.contains("t"));
    }
}
