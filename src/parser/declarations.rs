//! Declaration parsing implementation
//!
//! This module handles every declaration form that can appear at namespace,
//! class or block scope:
//!
//! - Namespaces, namespace aliases and `extern "C"` blocks
//! - Class, struct, union and enum definitions and forward declarations
//! - Templates, including explicit specializations and instantiations
//! - Functions: prototypes, definitions, `= default` / `= delete` / `= 0`,
//!   constructor member initializer lists
//! - Variables, typedefs and `using` aliases/declarations/directives
//! - `static_assert`, access specifiers and preprocessor lines
//!
//! # Grammar
//!
//! ```text
//! declaration ::= namespace_def | using_decl | template_decl | linkage_spec
//!               | static_assert | access_spec | directive | simple_decl
//! simple_decl ::= decl_specifiers (function_def | init_declarator_list ";")
//! function_def ::= declarator virt_specifiers (function_body | "= default;" | "= delete;" | "= 0;" | ";")
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use super::parse::{DeclContext, ParseError, Parser};
use super::types::DeclaratorMode;
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Punct, TokenKind};
use tracing::trace;

/// A plain `name(params)` declarator, which declares a function
fn is_function_declarator(declarator: &Declarator) -> bool {
    matches!(declarator.direct, DirectDeclarator::Name(_))
        && !declarator.pack
        && matches!(declarator.suffixes[..], [DeclSuffix::Function(_)])
}

impl Parser {
    /// Parse one declaration. Returns `None` for a stray `;`.
    pub(crate) fn parse_declaration(&mut self, ctx: DeclContext) -> Result<Option<Declaration>, ParseError> {
        self.nested(|p| p.parse_declaration_here(ctx))
    }

    fn parse_declaration_here(&mut self, ctx: DeclContext) -> Result<Option<Declaration>, ParseError> {
        let mut meta = self.start_meta();

        let kind = match self.peek_kind().clone() {
            TokenKind::Directive(text) => {
                self.advance();
                DeclKind::Preprocessor(text)
            }
            TokenKind::Punct(Punct::Semicolon) => {
                self.advance();
                return Ok(None);
            }
            TokenKind::Keyword(Keyword::Namespace) => self.parse_namespace(false)?,
            TokenKind::Keyword(Keyword::Inline) if self.check_keyword_ahead(1, Keyword::Namespace) => {
                self.advance();
                self.parse_namespace(true)?
            }
            TokenKind::Keyword(Keyword::Using) => self.parse_using()?,
            TokenKind::Keyword(Keyword::Template) => self.parse_template(ctx)?,
            TokenKind::Keyword(Keyword::Extern) if matches!(self.peek_ahead(1), TokenKind::StringLiteral(_)) => {
                self.parse_linkage()?
            }
            TokenKind::Keyword(Keyword::StaticAssert) => self.parse_static_assert()?,
            TokenKind::Keyword(Keyword::Public | Keyword::Protected | Keyword::Private) if ctx == DeclContext::Class => {
                let access = self.match_access().unwrap_or(Access::Public);
                self.expect_punct(Punct::Colon, "after access specifier")?;
                DeclKind::Access(access)
            }
            _ => self.parse_simple_declaration(ctx)?,
        };

        let wraps_trailing = matches!(
            kind,
            DeclKind::Template(_)
                | DeclKind::Linkage {
                    body: LinkageBody::Single(_),
                    ..
                }
        );
        if !wraps_trailing {
            meta.trailing_comment = self.trailing_comment();
        }

        let decl = Declaration::new(kind, meta);
        trace!(name = %decl.name(), line = decl.meta.location.line, "parsed declaration");
        Ok(Some(decl))
    }

    /// `[inline] namespace a::b { ... }` or `namespace alias = target;`
    fn parse_namespace(&mut self, is_inline: bool) -> Result<DeclKind, ParseError> {
        self.expect_keyword(Keyword::Namespace, "")?;

        let mut name = Vec::new();
        if self.check_ident() {
            name.push(self.expect_identifier("in namespace name")?);
            while self.match_punct(Punct::ColonColon) {
                name.push(self.expect_identifier("in nested namespace name")?);
            }
        }

        if name.len() == 1 && self.match_punct(Punct::Eq) {
            let target = self.parse_qualified_name(false)?;
            self.expect_semicolon("after namespace alias")?;
            return Ok(DeclKind::NamespaceAlias {
                name: name.remove(0),
                target,
            });
        }

        self.expect_punct(Punct::LBrace, "to open namespace body")?;
        let opening_comment = self.trailing_comment();
        let mut members = Vec::new();
        while !self.check_punct(Punct::RBrace) && !self.is_at_end() {
            if let Some(member) = self.parse_declaration(DeclContext::Namespace)? {
                members.push(member);
            }
        }
        let mut closing_comments = self.peek().leading_comments.clone();
        self.expect_punct(Punct::RBrace, "to close namespace body")?;

        if let Some(comment) = opening_comment {
            match members.first_mut() {
                Some(first) => first.meta.leading_comments.insert(0, comment),
                None => closing_comments.insert(0, comment),
            }
        }

        Ok(DeclKind::Namespace(NamespaceDecl {
            name,
            is_inline,
            members,
            closing_comments,
        }))
    }

    /// `using namespace X;`, `using X = T;` or `using [typename] A::b;`
    fn parse_using(&mut self) -> Result<DeclKind, ParseError> {
        self.expect_keyword(Keyword::Using, "")?;

        if self.match_keyword(Keyword::Namespace) {
            let name = self.parse_qualified_name(false)?;
            self.expect_semicolon("after using directive")?;
            return Ok(DeclKind::UsingDirective(name));
        }

        if self.check_ident() && self.check_punct_ahead(1, Punct::Eq) {
            let name = self.expect_identifier("in alias declaration")?;
            self.advance();
            let target = self.parse_type_id()?;
            self.declare_type(&name);
            self.expect_semicolon("after alias declaration")?;
            return Ok(DeclKind::Alias(AliasDecl { name, target }));
        }

        let typename_keyword = self.match_keyword(Keyword::Typename);
        let name = self.parse_qualified_name(false)?;
        self.expect_semicolon("after using declaration")?;
        Ok(DeclKind::UsingDeclaration { typename_keyword, name })
    }

    /// `template <params> declaration`, `template <> ...` or `template class X<T>;`
    fn parse_template(&mut self, ctx: DeclContext) -> Result<DeclKind, ParseError> {
        self.expect_keyword(Keyword::Template, "")?;

        let explicit_instantiation = !self.check_punct(Punct::Lt);
        let params = if explicit_instantiation {
            Vec::new()
        } else {
            self.parse_template_params()?
        };

        let location = self.current_location();
        let declaration = self.parse_declaration(ctx)?.ok_or_else(|| ParseError {
            location,
            expected: "declaration after template header".to_string(),
            found: "';'".to_string(),
        })?;

        Ok(DeclKind::Template(TemplateDecl {
            params,
            explicit_instantiation,
            declaration: Box::new(declaration),
        }))
    }

    pub(crate) fn parse_template_params(&mut self) -> Result<Vec<TemplateParam>, ParseError> {
        self.expect_punct(Punct::Lt, "to open template parameters")?;
        let params = self.with_template_args(true, |p| {
            let mut params = Vec::new();
            if p.check_punct(Punct::Gt) {
                return Ok(params);
            }
            loop {
                params.push(p.parse_template_param()?);
                if !p.match_punct(Punct::Comma) {
                    return Ok(params);
                }
            }
        })?;
        self.expect_template_close("to close template parameters")?;

        for param in &params {
            match param {
                TemplateParam::Type { name: Some(name), .. } | TemplateParam::Template { name: Some(name), .. } => {
                    self.declare_type(name);
                }
                _ => {}
            }
        }
        Ok(params)
    }

    fn parse_template_param(&mut self) -> Result<TemplateParam, ParseError> {
        if self.check_keyword(Keyword::Template) {
            self.advance();
            let params = self.parse_template_params()?;
            let key = self.parse_type_param_key()?;
            let pack = self.match_punct(Punct::Ellipsis);
            let name = self.optional_identifier();
            let default = if self.match_punct(Punct::Eq) {
                Some(self.parse_qualified_name(false)?)
            } else {
                None
            };
            return Ok(TemplateParam::Template {
                params,
                key,
                pack,
                name,
                default,
            });
        }

        // `typename T::type N` is a non-type parameter of dependent type
        let type_param = (self.check_keyword(Keyword::Typename) || self.check_keyword(Keyword::Class))
            && !(matches!(self.peek_ahead(1), TokenKind::Ident(_)) && self.check_punct_ahead(2, Punct::ColonColon));
        if type_param {
            let key = self.parse_type_param_key()?;
            let pack = self.match_punct(Punct::Ellipsis);
            let name = self.optional_identifier();
            let default = if self.match_punct(Punct::Eq) {
                Some(self.parse_type_id()?)
            } else {
                None
            };
            return Ok(TemplateParam::Type {
                key,
                pack,
                name,
                default,
            });
        }

        Ok(TemplateParam::NonType(self.parse_param()?))
    }

    fn parse_type_param_key(&mut self) -> Result<TypeParamKey, ParseError> {
        if self.match_keyword(Keyword::Typename) {
            Ok(TypeParamKey::Typename)
        } else if self.match_keyword(Keyword::Class) {
            Ok(TypeParamKey::Class)
        } else {
            Err(self.error_here("'typename' or 'class' in template parameter"))
        }
    }

    fn optional_identifier(&mut self) -> Option<String> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// `extern "C" { ... }` or `extern "C" declaration`
    fn parse_linkage(&mut self) -> Result<DeclKind, ParseError> {
        self.expect_keyword(Keyword::Extern, "")?;
        let abi = match self.advance().kind.clone() {
            TokenKind::StringLiteral(abi) => abi,
            _ => return Err(self.error_here("linkage string")),
        };

        if !self.match_punct(Punct::LBrace) {
            let location = self.current_location();
            let decl = self.parse_declaration(DeclContext::Namespace)?.ok_or_else(|| ParseError {
                location,
                expected: "declaration after linkage specification".to_string(),
                found: "';'".to_string(),
            })?;
            return Ok(DeclKind::Linkage {
                abi,
                body: LinkageBody::Single(Box::new(decl)),
            });
        }

        let mut decls = Vec::new();
        while !self.check_punct(Punct::RBrace) && !self.is_at_end() {
            if let Some(decl) = self.parse_declaration(DeclContext::Namespace)? {
                decls.push(decl);
            }
        }
        self.expect_punct(Punct::RBrace, "to close linkage block")?;
        Ok(DeclKind::Linkage {
            abi,
            body: LinkageBody::Block(decls),
        })
    }

    fn parse_static_assert(&mut self) -> Result<DeclKind, ParseError> {
        self.expect_keyword(Keyword::StaticAssert, "")?;
        self.expect_punct(Punct::LParen, "after 'static_assert'")?;
        let (condition, message) = self.with_template_args(false, |p| {
            let condition = p.parse_assignment()?;
            let message = if p.match_punct(Punct::Comma) {
                Some(p.parse_assignment()?)
            } else {
                None
            };
            Ok((condition, message))
        })?;
        self.expect_punct(Punct::RParen, "to close 'static_assert'")?;
        self.expect_semicolon("after 'static_assert'")?;
        Ok(DeclKind::StaticAssert { condition, message })
    }

    /// Specifiers followed by a function or a list of init-declarators
    fn parse_simple_declaration(&mut self, ctx: DeclContext) -> Result<DeclKind, ParseError> {
        let parsed = self.parse_decl_specifiers(ctx)?;
        let specs = parsed.specs;

        if self.match_punct(Punct::Semicolon) {
            return Ok(specifier_only_declaration(specs, parsed.is_typedef));
        }

        let first = self.parse_member_declarator(ctx)?;

        if parsed.is_typedef {
            let mut declarators = vec![first];
            while self.match_punct(Punct::Comma) {
                declarators.push(self.parse_declarator(DeclaratorMode::Named)?);
            }
            self.expect_semicolon("after typedef")?;
            for declarator in &declarators {
                if let Some(name) = declarator.name().and_then(|n| n.last_ident()).map(str::to_string) {
                    self.declare_type(&name);
                }
            }
            return Ok(DeclKind::Typedef(TypedefDecl {
                specifiers: specs,
                declarators,
            }));
        }

        if is_function_declarator(&first) && !self.check_punct(Punct::Comma) {
            return self.parse_function_rest(specs, first);
        }
        if specs.ty.is_none() {
            return Err(self.error_here("'(' after function name"));
        }

        let declarators = self.parse_init_declarators(first, ctx)?;
        self.expect_semicolon("after declaration")?;
        Ok(DeclKind::Variable(VariableDecl {
            specifiers: specs,
            declarators,
        }))
    }

    /// Initializers for `first` and any further comma-separated declarators
    fn parse_init_declarators(&mut self, first: Declarator, ctx: DeclContext) -> Result<Vec<InitDeclarator>, ParseError> {
        let mut declarators = Vec::new();
        let mut declarator = first;
        loop {
            let bit_width = if ctx == DeclContext::Class && self.match_punct(Punct::Colon) {
                Some(self.parse_conditional()?)
            } else {
                None
            };
            let init = self.parse_initializer()?;
            declarators.push(InitDeclarator {
                declarator,
                bit_width,
                init,
            });
            if !self.match_punct(Punct::Comma) {
                return Ok(declarators);
            }
            declarator = self.parse_member_declarator(ctx)?;
        }
    }

    /// A named declarator, or nothing before the `:` of an unnamed bit-field
    fn parse_member_declarator(&mut self, ctx: DeclContext) -> Result<Declarator, ParseError> {
        if ctx == DeclContext::Class && self.check_punct(Punct::Colon) {
            return Ok(Declarator::abstract_());
        }
        self.parse_declarator(DeclaratorMode::Named)
    }

    /// `= expr`, `{...}` or `(...)` after a declarator
    pub(crate) fn parse_initializer(&mut self) -> Result<Option<Initializer>, ParseError> {
        if self.match_punct(Punct::Eq) {
            return Ok(Some(Initializer::Assign(self.parse_initializer_clause()?)));
        }
        if self.check_punct(Punct::LBrace) {
            return Ok(Some(Initializer::Brace(self.parse_braced_list()?)));
        }
        if self.match_punct(Punct::LParen) {
            let args = self.parse_expression_list(Punct::RParen)?;
            return Ok(Some(Initializer::Paren(args)));
        }
        Ok(None)
    }

    /// Everything after a function declarator: virt-specifiers and the body
    fn parse_function_rest(&mut self, specifiers: DeclSpecifiers, declarator: Declarator) -> Result<DeclKind, ParseError> {
        let location = self.current_location();
        let Declarator {
            ptr_ops,
            direct,
            suffixes,
            ..
        } = declarator;
        let (DirectDeclarator::Name(name), Some(DeclSuffix::Function(suffix))) = (direct, suffixes.into_iter().next()) else {
            return Err(ParseError {
                location,
                expected: "function declarator".to_string(),
                found: "other declarator".to_string(),
            });
        };

        let mut is_override = false;
        let mut is_final = false;
        loop {
            if self.match_contextual("override") {
                is_override = true;
            } else if self.match_contextual("final") {
                is_final = true;
            } else {
                break;
            }
        }

        let mut member_inits = Vec::new();
        let body = if self.match_punct(Punct::Eq) {
            let body = if self.match_keyword(Keyword::Default) {
                FunctionBody::Default
            } else if self.match_keyword(Keyword::Delete) {
                FunctionBody::Delete
            } else if matches!(self.peek_kind(), TokenKind::IntLiteral(text) if text == "0") {
                self.advance();
                FunctionBody::Pure
            } else {
                return Err(self.error_here("'default', 'delete' or '0' after '='"));
            };
            self.expect_semicolon("after function declaration")?;
            body
        } else if self.check_punct(Punct::Colon) || self.check_punct(Punct::LBrace) {
            if self.match_punct(Punct::Colon) {
                member_inits = self.parse_member_inits()?;
            }
            FunctionBody::Defined(self.parse_block()?)
        } else {
            self.expect_semicolon("after function declaration")?;
            FunctionBody::Declared
        };

        Ok(DeclKind::Function(FunctionDecl {
            specifiers,
            return_ptr_ops: ptr_ops,
            name,
            params: suffix.params,
            variadic: suffix.variadic,
            qualifiers: suffix.qualifiers,
            trailing_return: suffix.trailing_return.map(|ty| *ty),
            is_override,
            is_final,
            member_inits,
            body,
        }))
    }

    /// Constructor initializer list after `:`
    fn parse_member_inits(&mut self) -> Result<Vec<MemberInit>, ParseError> {
        let mut inits = Vec::new();
        loop {
            let member = self.parse_qualified_name(false)?;
            let init = if self.check_punct(Punct::LBrace) {
                Initializer::Brace(self.parse_braced_list()?)
            } else {
                self.expect_punct(Punct::LParen, "in member initializer")?;
                Initializer::Paren(self.parse_expression_list(Punct::RParen)?)
            };
            let pack = self.match_punct(Punct::Ellipsis);
            inits.push(MemberInit { member, init, pack });
            if !self.match_punct(Punct::Comma) {
                return Ok(inits);
            }
        }
    }

    /// Declaration of a condition or range-for variable: no trailing `;`
    pub(crate) fn parse_single_declarator(&mut self, require_init: bool) -> Result<(Declaration, bool), ParseError> {
        let meta = self.start_meta();
        let parsed = self.parse_decl_specifiers(DeclContext::Block)?;
        if parsed.specs.ty.is_none() || parsed.is_typedef {
            return Err(self.error_here("type name"));
        }
        let declarator = self.parse_declarator(DeclaratorMode::Named)?;
        let plausible = parsed.certain || super::statements::plausible_declarator(&declarator);

        let init = if require_init {
            match self.parse_initializer()? {
                Some(Initializer::Paren(_)) | None => return Err(self.error_here("'=' or '{' in condition")),
                init => init,
            }
        } else {
            None
        };

        let decl = Declaration::new(
            DeclKind::Variable(VariableDecl {
                specifiers: parsed.specs,
                declarators: vec![InitDeclarator {
                    declarator,
                    bit_width: None,
                    init,
                }],
            }),
            meta,
        );
        Ok((decl, plausible))
    }
}

/// `struct S {...};`, `class C;`, `enum E {...};`, `friend class F;`
fn specifier_only_declaration(mut specs: DeclSpecifiers, is_typedef: bool) -> DeclKind {
    let plain =
        specs.attributes.is_empty() && specs.alignment.is_empty() && specs.modifiers.is_empty() && !is_typedef;
    if plain {
        match specs.ty.take() {
            Some(TypeSpec {
                is_const: false,
                is_volatile: false,
                kind: TypeKind::Class(class),
            }) => return DeclKind::Class(*class),
            Some(TypeSpec {
                is_const: false,
                is_volatile: false,
                kind: TypeKind::Enum(e),
            }) => return DeclKind::Enum(*e),
            Some(TypeSpec {
                is_const: false,
                is_volatile: false,
                kind:
                    TypeKind::Elaborated {
                        key: ElaboratedKey::Class(key),
                        name,
                    },
            }) => {
                return DeclKind::Class(ClassDecl {
                    key,
                    attributes: Vec::new(),
                    alignment: Vec::new(),
                    name: Some(name),
                    is_final: false,
                    bases: Vec::new(),
                    members: None,
                    closing_comments: Vec::new(),
                })
            }
            ty => specs.ty = ty,
        }
    }

    DeclKind::Variable(VariableDecl {
        specifiers: specs,
        declarators: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse_str;

    fn single(source: &str) -> DeclKind {
        let unit = parse_str(source).unwrap();
        assert_eq!(unit.declarations.len(), 1, "in {:?}", source);
        unit.declarations.into_iter().next().unwrap().kind
    }

    #[test]
    fn test_class_with_members() {
        let source = r#"
            class Counter : public Base {
            public:
                explicit Counter(int start) : value(start) {}
                ~Counter() override;
                int get() const { return value; }
                virtual void reset() = 0;
            private:
                int value = 0;
            };
        "#;
        let DeclKind::Class(class) = single(source) else {
            panic!("Expected class");
        };
        assert_eq!(class.key, ClassKey::Class);
        assert_eq!(class.bases.len(), 1);
        assert_eq!(class.bases[0].access, Some(Access::Public));

        let members = class.members.unwrap();
        let kinds: Vec<_> = members.iter().map(|m| &m.kind).collect();
        assert!(matches!(kinds[0], DeclKind::Access(Access::Public)));
        match kinds[1] {
            DeclKind::Function(ctor) => {
                assert!(ctor.specifiers.ty.is_none());
                assert_eq!(ctor.specifiers.modifiers, vec![Modifier::Explicit]);
                assert_eq!(ctor.member_inits.len(), 1);
            }
            other => panic!("Expected constructor, got {:?}", other),
        }
        match kinds[2] {
            DeclKind::Function(dtor) => {
                assert!(dtor.is_override);
                assert_eq!(dtor.name.segments[0].ident, Identifier::Destructor("Counter".into()));
            }
            other => panic!("Expected destructor, got {:?}", other),
        }
        match kinds[3] {
            DeclKind::Function(get) => assert!(get.qualifiers.is_const),
            other => panic!("Expected method, got {:?}", other),
        }
        match kinds[4] {
            DeclKind::Function(reset) => assert_eq!(reset.body, FunctionBody::Pure),
            other => panic!("Expected pure virtual, got {:?}", other),
        }
        assert!(matches!(kinds[6], DeclKind::Variable(_)));
    }

    #[test]
    fn test_namespace_and_alias() {
        let source = "namespace a::b { int x; }\nnamespace ab = a::b;";
        let unit = parse_str(source).unwrap();
        match &unit.declarations[0].kind {
            DeclKind::Namespace(ns) => {
                assert_eq!(ns.name, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(ns.members.len(), 1);
            }
            other => panic!("Expected namespace, got {:?}", other),
        }
        assert!(matches!(&unit.declarations[1].kind, DeclKind::NamespaceAlias { name, .. } if name == "ab"));
    }

    #[test]
    fn test_template_class() {
        let source = "template <typename T, int N = 4> struct Buffer { T items[N]; };";
        let DeclKind::Template(tpl) = single(source) else {
            panic!("Expected template");
        };
        assert_eq!(tpl.params.len(), 2);
        assert!(!tpl.explicit_instantiation);
        assert!(matches!(tpl.declaration.kind, DeclKind::Class(_)));
    }

    #[test]
    fn test_out_of_line_constructor() {
        let source = "Widget::Widget(int size) : size_(size) {}";
        let DeclKind::Function(func) = single(source) else {
            panic!("Expected function");
        };
        assert!(func.specifiers.ty.is_none());
        assert_eq!(func.name.segments.len(), 2);
    }

    #[test]
    fn test_operator_overload() {
        let source = "bool operator==(const Point& a, const Point& b);";
        let DeclKind::Function(func) = single(source) else {
            panic!("Expected function");
        };
        assert_eq!(func.name.segments[0].ident, Identifier::Operator("==".into()));
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.body, FunctionBody::Declared);
    }

    #[test]
    fn test_enum_class() {
        let source = "enum class Color : unsigned char { Red = 1, Green, Blue, };";
        let DeclKind::Enum(e) = single(source) else {
            panic!("Expected enum");
        };
        assert_eq!(e.scoped, Some(ClassKey::Class));
        assert_eq!(e.underlying, Some(TypeSpec::builtin(&["unsigned", "char"])));
        let enumerators = e.enumerators.unwrap();
        assert_eq!(enumerators.len(), 3);
        assert_eq!(enumerators[0].value, Some(Expr::int("1")));
    }

    #[test]
    fn test_typedef_registers_type() {
        let source = "typedef unsigned long ulong;\nulong (*table)[4];";
        let unit = parse_str(source).unwrap();
        assert!(matches!(unit.declarations[0].kind, DeclKind::Typedef(_)));
        assert!(matches!(unit.declarations[1].kind, DeclKind::Variable(_)));
    }

    #[test]
    fn test_extern_c_block() {
        let source = "extern \"C\" {\nint puts(const char*);\n}";
        match single(source) {
            DeclKind::Linkage { abi, body: LinkageBody::Block(decls) } => {
                assert_eq!(abi, "\"C\"");
                assert_eq!(decls.len(), 1);
            }
            other => panic!("Expected linkage block, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_declaration_and_friend() {
        let source = "class Node;\nstruct List { friend class Node; };";
        let unit = parse_str(source).unwrap();
        match &unit.declarations[0].kind {
            DeclKind::Class(class) => assert!(class.members.is_none()),
            other => panic!("Expected forward declaration, got {:?}", other),
        }
        let members = unit.declarations[1].children();
        match &members[0].kind {
            DeclKind::Variable(var) => {
                assert_eq!(var.specifiers.modifiers, vec![Modifier::Friend]);
                assert!(var.declarators.is_empty());
            }
            other => panic!("Expected friend declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_unnamed_bit_fields() {
        let DeclKind::Class(class) = single("struct Flags { unsigned a : 3, : 2; unsigned : 0; };") else {
            panic!("Expected class");
        };
        let members = class.members.unwrap();
        let DeclKind::Variable(var) = &members[0].kind else {
            panic!("Expected bit-fields");
        };
        assert_eq!(var.declarators.len(), 2);
        assert!(var.declarators[1].declarator.name().is_none());
        assert_eq!(var.declarators[1].bit_width, Some(Expr::int("2")));

        let DeclKind::Variable(var) = &members[1].kind else {
            panic!("Expected unnamed bit-field");
        };
        assert_eq!(var.declarators[0].declarator, Declarator::abstract_());
        assert_eq!(var.declarators[0].bit_width, Some(Expr::int("0")));
    }

    #[test]
    fn test_alignas() {
        let DeclKind::Class(class) = single("struct alignas(16) Vec4 { float v[4]; };") else {
            panic!("Expected class");
        };
        assert_eq!(class.alignment, vec!["16".to_string()]);
        assert_eq!(class.name.as_ref().and_then(|n| n.last_ident()), Some("Vec4"));

        let DeclKind::Variable(var) = single("alignas(alignof(double)) char buffer[64];") else {
            panic!("Expected variable");
        };
        assert_eq!(var.specifiers.alignment, vec!["alignof(double)".to_string()]);
        assert!(parse_str("struct alignas() S {};").is_err());
    }

    #[test]
    fn test_multiple_declarators() {
        let source = "static int a = 1, *b, c[3] = {1, 2, 3};";
        let DeclKind::Variable(var) = single(source) else {
            panic!("Expected variable");
        };
        assert_eq!(var.declarators.len(), 3);
        assert_eq!(var.declarators[1].declarator.ptr_ops.len(), 1);
        assert!(matches!(var.declarators[2].init, Some(Initializer::Assign(Expr::InitList { .. }))));
    }
}
