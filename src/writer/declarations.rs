//! Declaration emission
//!
//! Covers every [`DeclKind`] plus the type syntax shared with statements
//! and expressions: specifiers, declarators, parameter lists and names.
//!
//! Pointer operators of the first declarator attach to the type
//! (`int* p, *q`). Namespace and linkage bodies are not indented; access
//! specifiers sit at the class header's indent.

use super::expressions::{has_bare_gt, has_angle};
use super::{BraceStyle, Emitter};
use crate::parser::ast::*;
use crate::parser::reads_as_parameter_list;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Emitter<'_> {
    /// Sequence of declarations at the current indent
    pub(super) fn declarations(&mut self, decls: &[Declaration]) {
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 && decl.meta.blank_line_before {
                self.newline();
            }
            self.declaration(decl);
        }
    }

    /// One declaration on its own line(s), comments included
    pub(super) fn declaration(&mut self, decl: &Declaration) {
        match &decl.kind {
            DeclKind::Preprocessor(text) => {
                self.comment_lines(&decl.meta.leading_comments);
                self.write(text);
                self.newline();
            }
            DeclKind::Access(access) => {
                self.comment_lines(&decl.meta.leading_comments);
                let saved = self.indent;
                self.indent = saved.saturating_sub(1);
                self.write_indent();
                self.indent = saved;
                self.write(access.keyword());
                self.write(":");
                self.trailing(decl.meta.trailing_comment.as_deref());
                self.newline();
            }
            kind => {
                self.comment_lines(&decl.meta.leading_comments);
                self.write_indent();
                self.decl_kind(kind);
                self.trailing(decl.meta.trailing_comment.as_deref());
                self.newline();
            }
        }
    }

    /// Declaration text at the cursor, terminator included
    pub(super) fn decl_kind(&mut self, kind: &DeclKind) {
        match kind {
            DeclKind::Namespace(ns) => self.namespace(ns),
            DeclKind::NamespaceAlias { name, target } => {
                self.write("namespace ");
                self.write(name);
                self.write(" = ");
                self.name(target);
                self.write(";");
            }
            DeclKind::Class(class) => {
                self.class(class);
                self.write(";");
            }
            DeclKind::Function(func) => self.function(func),
            DeclKind::Variable(var) => {
                self.variable(var);
                self.write(";");
            }
            DeclKind::Typedef(td) => {
                self.write("typedef ");
                let specs = self.specifiers_text(&td.specifiers);
                for (i, declarator) in td.declarators.iter().enumerate() {
                    if i == 0 {
                        self.decl_head(&specs, declarator);
                    } else {
                        self.write(", ");
                        self.declarator_standalone(declarator);
                    }
                }
                self.write(";");
            }
            DeclKind::Alias(alias) => {
                self.write("using ");
                self.write(&alias.name);
                self.write(" = ");
                self.type_id(&alias.target);
                self.write(";");
            }
            DeclKind::Template(tpl) => self.template(tpl),
            DeclKind::Enum(e) => {
                self.enum_decl(e);
                self.write(";");
            }
            DeclKind::UsingDirective(name) => {
                self.write("using namespace ");
                self.name(name);
                self.write(";");
            }
            DeclKind::UsingDeclaration { typename_keyword, name } => {
                self.write("using ");
                if *typename_keyword {
                    self.write("typename ");
                }
                self.name(name);
                self.write(";");
            }
            DeclKind::Linkage { abi, body } => {
                self.write("extern ");
                self.write(abi);
                match body {
                    LinkageBody::Block(decls) => {
                        self.open_brace();
                        self.declarations(decls);
                        self.close_brace();
                    }
                    LinkageBody::Single(decl) => {
                        self.write(" ");
                        self.decl_kind(&decl.kind);
                        self.trailing(decl.meta.trailing_comment.as_deref());
                    }
                }
            }
            DeclKind::StaticAssert { condition, message } => {
                self.write("static_assert(");
                self.expr(condition, precedence::ASSIGN);
                if let Some(message) = message {
                    self.write(", ");
                    self.expr(message, precedence::ASSIGN);
                }
                self.write(");");
            }
            DeclKind::Access(access) => {
                self.write(access.keyword());
                self.write(":");
            }
            DeclKind::Preprocessor(text) => self.write(text),
        }
    }

    fn namespace(&mut self, ns: &NamespaceDecl) {
        if ns.is_inline {
            self.write("inline ");
        }
        self.write("namespace");
        if !ns.name.is_empty() {
            self.write(" ");
            self.write(&ns.name.join("::"));
        }
        self.open_brace();
        self.declarations(&ns.members);
        self.comment_lines(&ns.closing_comments);
        self.close_brace();
    }

    /// Class head and, for a definition, its member list
    fn class(&mut self, class: &ClassDecl) {
        self.write(class.key.keyword());
        for attribute in &class.attributes {
            self.write(" [[");
            self.write(attribute);
            self.write("]]");
        }
        for alignment in &class.alignment {
            self.write(" alignas(");
            self.write(alignment);
            self.write(")");
        }
        if let Some(name) = &class.name {
            self.write(" ");
            self.name(name);
        }
        if class.is_final {
            self.write(" final");
        }
        for (i, base) in class.bases.iter().enumerate() {
            self.write(if i == 0 { " : " } else { ", " });
            if let Some(access) = base.access {
                self.write(access.keyword());
                self.write(" ");
            }
            if base.is_virtual {
                self.write("virtual ");
            }
            self.name(&base.name);
            if base.pack {
                self.write("...");
            }
        }

        let Some(members) = &class.members else {
            return;
        };
        self.open_brace();
        self.indent += 1;
        self.declarations(members);
        self.comment_lines(&class.closing_comments);
        self.indent -= 1;
        self.close_brace();
    }

    fn enum_decl(&mut self, e: &EnumDecl) {
        self.write("enum");
        if let Some(key) = e.scoped {
            self.write(" ");
            self.write(key.keyword());
        }
        if let Some(name) = &e.name {
            self.write(" ");
            self.name(name);
        }
        if let Some(underlying) = &e.underlying {
            self.write(" : ");
            self.type_spec(underlying);
        }

        let Some(enumerators) = &e.enumerators else {
            return;
        };
        self.open_brace();
        self.indent += 1;
        for (i, enumerator) in enumerators.iter().enumerate() {
            if i > 0 && enumerator.meta.blank_line_before {
                self.newline();
            }
            self.comment_lines(&enumerator.meta.leading_comments);
            self.write_indent();
            self.write(&enumerator.name);
            if let Some(value) = &enumerator.value {
                self.write(" = ");
                self.expr(value, precedence::CONDITIONAL);
            }
            if i + 1 < enumerators.len() {
                self.write(",");
            }
            self.trailing(enumerator.meta.trailing_comment.as_deref());
            self.newline();
        }
        self.indent -= 1;
        self.close_brace();
    }

    fn template(&mut self, tpl: &TemplateDecl) {
        let inner = &tpl.declaration;
        if tpl.explicit_instantiation {
            self.write("template ");
            self.decl_kind(&inner.kind);
            self.trailing(inner.meta.trailing_comment.as_deref());
            return;
        }

        self.write("template ");
        self.template_params(&tpl.params);
        self.newline();
        self.comment_lines(&inner.meta.leading_comments);
        self.write_indent();
        self.decl_kind(&inner.kind);
        self.trailing(inner.meta.trailing_comment.as_deref());
    }

    fn template_params(&mut self, params: &[TemplateParam]) {
        self.write("<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match param {
                TemplateParam::Type {
                    key,
                    pack,
                    name,
                    default,
                } => {
                    self.type_param_key(*key, *pack, name.as_deref());
                    if let Some(default) = default {
                        self.write(" = ");
                        self.type_id(default);
                    }
                }
                TemplateParam::NonType(param) => self.param(param, true),
                TemplateParam::Template {
                    params,
                    key,
                    pack,
                    name,
                    default,
                } => {
                    self.write("template ");
                    self.template_params(params);
                    self.write(" ");
                    self.type_param_key(*key, *pack, name.as_deref());
                    if let Some(default) = default {
                        self.write(" = ");
                        self.name(default);
                    }
                }
            }
        }
        self.write(">");
    }

    fn type_param_key(&mut self, key: TypeParamKey, pack: bool, name: Option<&str>) {
        self.write(match key {
            TypeParamKey::Typename => "typename",
            TypeParamKey::Class => "class",
        });
        if pack {
            self.write("...");
        }
        if let Some(name) = name {
            self.write(" ");
            self.write(name);
        }
    }

    fn function(&mut self, func: &FunctionDecl) {
        let specs = self.specifiers_text(&func.specifiers);
        let ptrs = self.capture(|w| w.ptr_ops(&func.return_ptr_ops));
        if specs.is_empty() {
            self.write(&ptrs);
        } else {
            self.write(&specs);
            self.attach_ptr_ops(&ptrs);
            self.write(" ");
        }
        self.name(&func.name);
        self.params(&func.params, func.variadic, false);
        self.function_qualifiers(&func.qualifiers);
        if let Some(ret) = &func.trailing_return {
            self.write(" -> ");
            self.type_id(ret);
        }
        if func.is_override {
            self.write(" override");
        }
        if func.is_final {
            self.write(" final");
        }

        match &func.body {
            FunctionBody::Declared => self.write(";"),
            FunctionBody::Default => self.write(" = default;"),
            FunctionBody::Delete => self.write(" = delete;"),
            FunctionBody::Pure => self.write(" = 0;"),
            FunctionBody::Defined(block) => {
                for (i, init) in func.member_inits.iter().enumerate() {
                    self.write(if i == 0 { " : " } else { ", " });
                    self.name(&init.member);
                    self.initializer(&init.init, false);
                    if init.pack {
                        self.write("...");
                    }
                }
                self.braced_block(block);
            }
        }
    }

    /// Init-declarators of a variable, without the terminating `;`
    pub(super) fn variable(&mut self, var: &VariableDecl) {
        let specs = self.specifiers_text(&var.specifiers);
        // `friend class F;`, `friend A;`
        if var.declarators.is_empty() {
            self.write(&specs);
            return;
        }
        for (i, init_decl) in var.declarators.iter().enumerate() {
            if i == 0 {
                self.decl_head(&specs, &init_decl.declarator);
            } else {
                self.write(", ");
                self.declarator_standalone(&init_decl.declarator);
            }
            if let Some(width) = &init_decl.bit_width {
                self.write(if self.buf.ends_with(' ') { ": " } else { " : " });
                self.expr(width, precedence::CONDITIONAL);
            }
            if let Some(init) = &init_decl.init {
                self.initializer(init, true);
            }
        }
    }

    /// `= e`, `(args)` or `{args}`.
    ///
    /// With `declarator_context`, a parenthesized list that would read as a
    /// parameter list gets its first argument parenthesized.
    pub(super) fn initializer(&mut self, init: &Initializer, declarator_context: bool) {
        match init {
            Initializer::Assign(value) => {
                self.write(" = ");
                self.expr(value, precedence::ASSIGN);
            }
            Initializer::Paren(args) => {
                let mut texts = self.list_texts(args, precedence::ASSIGN);
                let mut text = format!("({})", texts.join(", "));
                if declarator_context && !texts.is_empty() && reads_as_parameter_list(&text, self.known_types) {
                    texts[0] = format!("({})", texts[0]);
                    text = format!("({})", texts.join(", "));
                }
                self.write(&text);
            }
            Initializer::Brace(args) => {
                let texts = self.list_texts(args, precedence::ASSIGN);
                self.write("{");
                self.write(&texts.join(", "));
                self.write("}");
            }
        }
    }

    // ===== Specifiers and declarators =====

    /// Attributes, modifiers and type joined by spaces
    pub(super) fn specifiers_text(&self, specs: &DeclSpecifiers) -> String {
        let mut parts = Vec::new();
        for attribute in &specs.attributes {
            parts.push(format!("[[{}]]", attribute));
        }
        for alignment in &specs.alignment {
            parts.push(format!("alignas({})", alignment));
        }
        for modifier in &specs.modifiers {
            parts.push(modifier.keyword().to_string());
        }
        if let Some(ty) = &specs.ty {
            parts.push(self.capture(|w| w.type_spec(ty)));
        }
        parts.join(" ")
    }

    /// First declarator after the specifiers text
    fn decl_head(&mut self, specs: &str, declarator: &Declarator) {
        if specs.is_empty() {
            self.declarator_standalone(declarator);
        } else {
            self.write(specs);
            self.declarator_after_type(declarator);
        }
    }

    pub(super) fn type_spec(&mut self, spec: &TypeSpec) {
        if spec.is_const {
            self.write("const ");
        }
        if spec.is_volatile {
            self.write("volatile ");
        }
        match &spec.kind {
            TypeKind::Builtin(words) => self.write(&words.join(" ")),
            TypeKind::Named(name) => self.name(name),
            TypeKind::Elaborated { key, name } => {
                self.write(match key {
                    ElaboratedKey::Class(class_key) => class_key.keyword(),
                    ElaboratedKey::Enum => "enum",
                    ElaboratedKey::Typename => "typename",
                });
                self.write(" ");
                self.name(name);
            }
            TypeKind::Decltype(expr) => {
                self.write("decltype(");
                self.expr(expr, precedence::COMMA);
                self.write(")");
            }
            TypeKind::DecltypeAuto => self.write("decltype(auto)"),
            TypeKind::Auto => self.write("auto"),
            TypeKind::Class(class) => self.class(class),
            TypeKind::Enum(e) => self.enum_decl(e),
        }
    }

    pub(super) fn type_id(&mut self, ty: &TypeId) {
        self.type_spec(&ty.spec);
        self.declarator_after_type(&ty.declarator);
    }

    pub(super) fn ptr_ops(&mut self, ops: &[PtrOp]) {
        for op in ops {
            let (is_const, is_volatile) = match op {
                PtrOp::Pointer { is_const, is_volatile } => {
                    self.write("*");
                    (*is_const, *is_volatile)
                }
                PtrOp::LRef => {
                    self.write("&");
                    (false, false)
                }
                PtrOp::RRef => {
                    self.write("&&");
                    (false, false)
                }
                PtrOp::MemberPointer {
                    class,
                    is_const,
                    is_volatile,
                } => {
                    if self.buf.ends_with(is_word_char) {
                        self.write(" ");
                    }
                    self.name(class);
                    self.write("::*");
                    (*is_const, *is_volatile)
                }
            };
            if is_const {
                self.write(" const");
            }
            if is_volatile {
                self.write(" volatile");
            }
        }
    }

    /// Pointer operators glued to the preceding type text
    pub(super) fn attach_ptr_ops(&mut self, ptrs: &str) {
        if ptrs.starts_with(|c: char| is_word_char(c) || c == ':') {
            self.write(" ");
        }
        self.write(ptrs);
    }

    /// Declarator following a type: `* p`, ` name[3]`, `(*)(int)`
    fn declarator_after_type(&mut self, declarator: &Declarator) {
        let ptrs = self.capture(|w| w.ptr_ops(&declarator.ptr_ops));
        self.attach_ptr_ops(&ptrs);
        let core = self.capture(|w| w.declarator_core(declarator));
        if core.is_empty() {
            return;
        }
        let abstract_suffix = matches!(declarator.direct, DirectDeclarator::Abstract) && !declarator.pack;
        if !(abstract_suffix || core.starts_with("...")) || ptrs.ends_with(is_word_char) {
            self.write(" ");
        }
        self.write(&core);
    }

    /// Declarator with no type before it (second and later declarators)
    fn declarator_standalone(&mut self, declarator: &Declarator) {
        self.ptr_ops(&declarator.ptr_ops);
        let core = self.capture(|w| w.declarator_core(declarator));
        if self.buf.ends_with(is_word_char) && core.starts_with(is_word_char) {
            self.write(" ");
        }
        self.write(&core);
    }

    /// Pack, name or nested declarator, then suffixes
    pub(super) fn declarator_core(&mut self, declarator: &Declarator) {
        if declarator.pack {
            self.write("...");
            if !matches!(declarator.direct, DirectDeclarator::Abstract) {
                self.write(" ");
            }
        }
        match &declarator.direct {
            DirectDeclarator::Abstract => {}
            DirectDeclarator::Name(name) => self.name(name),
            DirectDeclarator::Nested(inner) => {
                self.write("(");
                self.declarator_standalone(inner);
                self.write(")");
            }
            DirectDeclarator::Bindings(names) => {
                self.write("[");
                self.write(&names.join(", "));
                self.write("]");
            }
        }
        for suffix in &declarator.suffixes {
            match suffix {
                DeclSuffix::Array(size) => {
                    self.write("[");
                    if let Some(size) = size {
                        self.expr(size, precedence::COMMA);
                    }
                    self.write("]");
                }
                DeclSuffix::Function(func) => {
                    self.params(&func.params, func.variadic, false);
                    self.function_qualifiers(&func.qualifiers);
                    if let Some(ret) = &func.trailing_return {
                        self.write(" -> ");
                        self.type_id(ret);
                    }
                }
            }
        }
    }

    /// `(params)` with an optional trailing `...`
    pub(super) fn params(&mut self, params: &[Param], variadic: bool, in_template: bool) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.param(param, in_template);
        }
        if variadic {
            self.write(if params.is_empty() { "..." } else { ", ..." });
        }
        self.write(")");
    }

    /// A parameter; inside a template parameter list a default containing
    /// `<` or `>` is parenthesized
    pub(super) fn param(&mut self, param: &Param, in_template: bool) {
        let specs = self.specifiers_text(&param.specifiers);
        self.decl_head(&specs, &param.declarator);
        if let Some(default) = &param.default {
            self.write(" = ");
            let text = self.capture(|w| w.expr(default, precedence::ASSIGN));
            if in_template && (has_bare_gt(&text) || has_angle(&text)) {
                self.write("(");
                self.write(&text);
                self.write(")");
            } else {
                self.write(&text);
            }
        }
    }

    fn function_qualifiers(&mut self, qualifiers: &FunctionQualifiers) {
        if qualifiers.is_const {
            self.write(" const");
        }
        if qualifiers.is_volatile {
            self.write(" volatile");
        }
        match qualifiers.ref_qualifier {
            Some(RefQualifier::LValue) => self.write(" &"),
            Some(RefQualifier::RValue) => self.write(" &&"),
            None => {}
        }
        if let Some(spec) = &qualifiers.exception {
            self.write(" ");
            self.exception_spec(spec);
        }
    }

    pub(super) fn exception_spec(&mut self, spec: &ExceptionSpec) {
        match spec {
            ExceptionSpec::Noexcept(None) => self.write("noexcept"),
            ExceptionSpec::Noexcept(Some(expr)) => {
                self.write("noexcept(");
                self.expr(expr, precedence::COMMA);
                self.write(")");
            }
            ExceptionSpec::Throw(types) => {
                self.write("throw(");
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.type_id(ty);
                }
                self.write(")");
            }
        }
    }

    // ===== Names =====

    pub(super) fn name(&mut self, name: &QualifiedName) {
        if name.global {
            self.write("::");
        }
        for (i, segment) in name.segments.iter().enumerate() {
            if i > 0 {
                self.write("::");
            }
            if segment.template_keyword {
                self.write("template ");
            }
            match &segment.ident {
                Identifier::Plain(ident) => self.write(ident),
                Identifier::Destructor(ident) => {
                    self.write("~");
                    self.write(ident);
                }
                Identifier::Operator(symbol) => {
                    self.write("operator");
                    if symbol.starts_with(is_word_char) {
                        self.write(" ");
                    }
                    self.write(symbol);
                }
                Identifier::Conversion(ty) => {
                    self.write("operator ");
                    self.type_id(ty);
                }
            }
            if let Some(args) = &segment.template_args {
                self.template_args(args);
            }
        }
    }

    fn template_args(&mut self, args: &[TemplateArg]) {
        let saved = std::mem::replace(&mut self.gt_follows, false);
        self.write("<");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.template_arg(arg);
        }
        self.write(">");
        self.gt_follows = saved;
    }

    fn template_arg(&mut self, arg: &TemplateArg) {
        match arg {
            TemplateArg::Type(ty) => self.type_id(ty),
            TemplateArg::Expr(expr) => {
                let text = self.capture(|w| w.expr(expr, precedence::CONDITIONAL));
                // A bare name would read back as a type
                if matches!(expr, Expr::Name(_)) || has_bare_gt(&text) || has_angle(&text) {
                    self.write("(");
                    self.write(&text);
                    self.write(")");
                } else {
                    self.write(&text);
                }
            }
            TemplateArg::Pack(inner) => {
                self.template_arg(inner);
                self.write("...");
            }
        }
    }

    /// `{ ... }` body of a function or control statement, per brace style
    pub(super) fn braced_block(&mut self, block: &Block) {
        self.open_brace();
        self.indent += 1;
        self.block_statements(block);
        self.indent -= 1;
        self.close_brace();
    }

    pub(super) fn same_line_braces(&self) -> bool {
        self.options.brace_style == BraceStyle::SameLine
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_str;
    use crate::writer::Writer;

    fn render(source: &str) -> String {
        let unit = parse_str(source).unwrap();
        let text = Writer::default().render(&unit);
        let reparsed = parse_str(&text).unwrap_or_else(|e| panic!("{}\n---\n{}", e, text));
        assert_eq!(unit, reparsed, "round trip changed structure:\n{}", text);
        text
    }

    #[test]
    fn test_pointer_declarators_attach_to_type() {
        assert_eq!(render("int *p, **q, &r = x;"), "int* p, **q, &r = x;\n");
        assert_eq!(render("char const * const name;"), "const char* const name;\n");
    }

    #[test]
    fn test_function_pointer_and_arrays() {
        assert_eq!(render("void (*handler)(int, char*);"), "void (*handler)(int, char*);\n");
        assert_eq!(render("int grid[3][4];"), "int grid[3][4];\n");
    }

    #[test]
    fn test_class_with_access_sections() {
        let text = render("class Point : public Base { public: Point(int x) : x_(x) {} int x() const { return x_; } private: int x_; };");
        let expected = "\
class Point : public Base
{
public:
  Point(int x) : x_(x)
  {
  }
  int x() const
  {
    return x_;
  }
private:
  int x_;
};
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_namespace_members_not_indented() {
        let text = render("namespace app { int counter = 0; }");
        assert_eq!(text, "namespace app\n{\nint counter = 0;\n}\n");
    }

    #[test]
    fn test_template_and_enum() {
        let text = render("template <typename T, int N = 4> struct Array { T data[N]; };\nenum class Color : unsigned char { Red, Green = 2 };");
        assert!(text.starts_with("template <typename T, int N = 4>\nstruct Array\n{\n  T data[N];\n};\n"));
        assert!(text.contains("enum class Color : unsigned char\n{\n  Red,\n  Green = 2\n};\n"));
    }

    #[test]
    fn test_operators_and_special_members() {
        render("struct V { V& operator+=(const V& o); bool operator==(const V&) const = default; ~V(); explicit operator bool() const; virtual void f() = 0; };");
        render("template <class... Ts> void call(Ts&&... args) { g(std::forward<Ts>(args)...); }");
    }

    #[test]
    fn test_parenthesized_initializer_stays_variable() {
        let text = render("struct W {}; void f() { W w((W())); }");
        assert!(text.contains("W w((W()));"), "{}", text);
    }

    #[test]
    fn test_linkage_and_using() {
        let text = render("extern \"C\" { int puts(const char* s); }\nusing namespace std;\nusing Map = std::map<int, int>;");
        assert!(text.starts_with("extern \"C\"\n{\nint puts(const char* s);\n}\n"));
        assert!(text.contains("using Map = std::map<int, int>;"));
    }

    #[test]
    fn test_friend_members_keep_specifiers() {
        let text = render("class Node;\nstruct List { friend class Node; int size; };");
        assert!(text.contains("\n  friend class Node;\n  int size;\n"), "{}", text);

        let text = render("struct A {}; class B : A { friend A; };");
        assert!(text.contains("\n  friend A;\n"), "{}", text);
    }

    #[test]
    fn test_unnamed_bit_fields_and_alignas_round_trip() {
        let text = render("struct alignas(8) Flags { unsigned a : 3, : 2; unsigned : 0; alignas(4) char tag; };");
        assert!(text.starts_with("struct alignas(8) Flags\n"), "{}", text);
        assert!(text.contains("\n  unsigned a : 3, : 2;\n  unsigned : 0;\n  alignas(4) char tag;\n"), "{}", text);
    }
}
