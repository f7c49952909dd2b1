//! Declaration specifier, declarator and name parsing
//!
//! Handles the parts of the grammar shared by declarations, parameters,
//! type-ids and expressions:
//! - Declaration specifiers (modifiers, cv-qualifiers, the type)
//! - Class and enum specifiers, including inline definitions
//! - Declarators: pointer operators, nested declarators, array and
//!   function suffixes
//! - Qualified names with template argument lists
//!
//! Every specifier parse also reports whether the type it found can only
//! be a type. Statement and cast disambiguation build on that flag.

use rustc_hash::FxHashSet;

use super::parse::{DeclContext, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Punct, TokenKind};

/// Declaration specifiers plus facts needed for disambiguation
pub(crate) struct ParsedSpecifiers {
    pub specs: DeclSpecifiers,
    pub is_typedef: bool,
    /// Keyword-led, a known type name, a template-id or elaborated
    pub certain: bool,
}

/// What a declarator may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclaratorMode {
    /// A name is required (variables, functions, typedefs)
    Named,
    /// The name may be omitted (parameters)
    Optional,
    /// No name allowed (type-ids)
    Abstract,
    /// Type-id of a `new` expression: pointer operators only
    New,
}

fn modifier_for(keyword: Keyword) -> Option<Modifier> {
    let modifier = match keyword {
        Keyword::Static => Modifier::Static,
        Keyword::Extern => Modifier::Extern,
        Keyword::Inline => Modifier::Inline,
        Keyword::Virtual => Modifier::Virtual,
        Keyword::Explicit => Modifier::Explicit,
        Keyword::Constexpr => Modifier::Constexpr,
        Keyword::Consteval => Modifier::Consteval,
        Keyword::Constinit => Modifier::Constinit,
        Keyword::Friend => Modifier::Friend,
        Keyword::Mutable => Modifier::Mutable,
        Keyword::ThreadLocal => Modifier::ThreadLocal,
        Keyword::Register => Modifier::Register,
        _ => return None,
    };
    Some(modifier)
}

/// Keywords that make a statement a declaration outright
pub(crate) fn starts_declaration(keyword: Keyword) -> bool {
    modifier_for(keyword).is_some()
        || matches!(
            keyword,
            Keyword::Typedef
                | Keyword::Using
                | Keyword::Namespace
                | Keyword::Template
                | Keyword::StaticAssert
                | Keyword::Class
                | Keyword::Struct
                | Keyword::Union
                | Keyword::Enum
                | Keyword::Typename
                | Keyword::Const
                | Keyword::Volatile
                | Keyword::Auto
                | Keyword::Alignas
        )
}

/// Join token spellings, spacing only between word-like tokens
pub(crate) fn join_spellings<'a>(tokens: impl IntoIterator<Item = &'a TokenKind>) -> String {
    let mut out = String::new();
    let mut prev_word = false;
    for kind in tokens {
        let word = !matches!(kind, TokenKind::Punct(_));
        if word && prev_word {
            out.push(' ');
        }
        out.push_str(kind.spelling());
        prev_word = word;
    }
    out
}

/// Would `text`, which starts with `(`, be read as a parameter list?
pub(crate) fn reads_as_parameter_list(text: &str, known_types: &FxHashSet<String>) -> bool {
    Parser::with_known_types(text, known_types)
        .map(|mut parser| parser.parameter_list_ahead())
        .unwrap_or(false)
}

impl Parser {
    /// Parse declaration specifiers up to the first declarator.
    ///
    /// A type is optional: constructors, destructors and conversion
    /// functions have none. Callers that need one check `specs.ty`.
    pub(crate) fn parse_decl_specifiers(&mut self, ctx: DeclContext) -> Result<ParsedSpecifiers, ParseError> {
        let mut specs = DeclSpecifiers::default();
        let mut is_typedef = false;
        let mut certain = false;
        let mut is_const = false;
        let mut is_volatile = false;
        let mut builtin: Vec<String> = Vec::new();
        let mut kind: Option<TypeKind> = None;

        loop {
            let has_type = kind.is_some() || !builtin.is_empty();
            match self.peek_kind().clone() {
                TokenKind::Punct(Punct::LBracket) if self.check_punct_ahead(1, Punct::LBracket) => {
                    specs.attributes.push(self.parse_attribute()?);
                    certain = true;
                }
                TokenKind::Keyword(Keyword::Extern) if matches!(self.peek_ahead(1), TokenKind::StringLiteral(_)) => {
                    break;
                }
                TokenKind::Keyword(Keyword::Alignas) => {
                    specs.alignment.push(self.parse_alignas()?);
                    certain = true;
                }
                TokenKind::Keyword(kw) => {
                    if let Some(modifier) = modifier_for(kw) {
                        self.advance();
                        specs.modifiers.push(modifier);
                        certain = true;
                        continue;
                    }
                    match kw {
                        Keyword::Typedef => is_typedef = true,
                        Keyword::Const => is_const = true,
                        Keyword::Volatile => is_volatile = true,
                        k if k.is_builtin_type() && kind.is_none() => builtin.push(k.as_str().to_string()),
                        Keyword::Auto if !has_type => kind = Some(TypeKind::Auto),
                        Keyword::Decltype if !has_type => {
                            kind = Some(self.parse_decltype()?);
                            certain = true;
                            continue;
                        }
                        Keyword::Class | Keyword::Struct | Keyword::Union if !has_type => {
                            kind = Some(self.parse_class_specifier()?);
                            certain = true;
                            continue;
                        }
                        Keyword::Enum if !has_type => {
                            kind = Some(self.parse_enum_specifier()?);
                            certain = true;
                            continue;
                        }
                        Keyword::Typename if !has_type => {
                            self.advance();
                            let name = self.parse_qualified_name(false)?;
                            kind = Some(TypeKind::Elaborated {
                                key: ElaboratedKey::Typename,
                                name,
                            });
                            certain = true;
                            continue;
                        }
                        _ => break,
                    }
                    self.advance();
                    certain = true;
                }
                TokenKind::Ident(_) | TokenKind::Punct(Punct::ColonColon) => {
                    if has_type || self.declarator_name_ahead(ctx) {
                        break;
                    }
                    let name = self.parse_qualified_name(false)?;
                    let template_id = name.segments.iter().any(|s| s.template_args.is_some());
                    if template_id || name.last_ident().is_some_and(|n| self.is_known_type(n)) {
                        certain = true;
                    }
                    kind = Some(TypeKind::Named(name));
                }
                _ => break,
            }
        }

        if !builtin.is_empty() {
            kind = Some(TypeKind::Builtin(builtin));
        }
        specs.ty = match kind {
            Some(kind) => Some(TypeSpec {
                is_const,
                is_volatile,
                kind,
            }),
            None if is_const || is_volatile => return Err(self.error_here("type name after cv-qualifier")),
            None => None,
        };

        Ok(ParsedSpecifiers {
            specs,
            is_typedef,
            certain,
        })
    }

    /// Is the name at the cursor the declarator of a constructor,
    /// destructor, operator or conversion function rather than a type?
    fn declarator_name_ahead(&mut self, ctx: DeclContext) -> bool {
        let class = self.class_stack.last().cloned();
        let mut is_declarator = false;
        self.lookahead(|p| {
            let name = p.parse_qualified_name(false)?;
            let segments = &name.segments;
            let Some(last) = segments.last() else {
                return Ok(());
            };
            is_declarator = match &last.ident {
                Identifier::Destructor(_) | Identifier::Operator(_) | Identifier::Conversion(_) => true,
                Identifier::Plain(ident) => {
                    let in_class = ctx == DeclContext::Class && segments.len() == 1 && class.as_deref() == Some(ident.as_str());
                    let out_of_class = segments.len() >= 2
                        && matches!(&segments[segments.len() - 2].ident, Identifier::Plain(prev) if prev == ident);
                    p.check_punct(Punct::LParen) && (in_class || out_of_class)
                }
            };
            Ok(())
        });
        is_declarator
    }

    /// `[[...]]`, returned as normalised token text without the brackets
    pub(crate) fn parse_attribute(&mut self) -> Result<String, ParseError> {
        self.expect_punct(Punct::LBracket, "to open attribute")?;
        self.expect_punct(Punct::LBracket, "to open attribute")?;
        let start = self.position;
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return Err(self.error_here("']]' to close attribute")),
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RBracket) if depth == 0 => break,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        let text = join_spellings(self.tokens[start..self.position].iter().map(|t| &t.kind));
        self.expect_punct(Punct::RBracket, "to close attribute")?;
        self.expect_punct(Punct::RBracket, "to close attribute")?;
        Ok(text)
    }

    /// `alignas(...)`, returned as normalised token text of the operand
    pub(crate) fn parse_alignas(&mut self) -> Result<String, ParseError> {
        self.expect_keyword(Keyword::Alignas, "")?;
        self.expect_punct(Punct::LParen, "after 'alignas'")?;
        let start = self.position;
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return Err(self.error_here("')' to close 'alignas'")),
                TokenKind::Punct(Punct::RParen) if depth == 0 => break,
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        if self.position == start {
            return Err(self.error_here("operand of 'alignas'"));
        }
        let text = join_spellings(self.tokens[start..self.position].iter().map(|t| &t.kind));
        self.expect_punct(Punct::RParen, "to close 'alignas'")?;
        Ok(text)
    }

    fn parse_decltype(&mut self) -> Result<TypeKind, ParseError> {
        self.expect_keyword(Keyword::Decltype, "")?;
        self.expect_punct(Punct::LParen, "after 'decltype'")?;
        if self.check_keyword(Keyword::Auto) && self.check_punct_ahead(1, Punct::RParen) {
            self.advance();
            self.advance();
            return Ok(TypeKind::DecltypeAuto);
        }
        let expr = self.with_template_args(false, |p| p.parse_expression())?;
        self.expect_punct(Punct::RParen, "to close 'decltype'")?;
        Ok(TypeKind::Decltype(Box::new(expr)))
    }

    /// `class`/`struct`/`union`, either a definition or an elaborated use
    fn parse_class_specifier(&mut self) -> Result<TypeKind, ParseError> {
        let key = match self.advance().kind {
            TokenKind::Keyword(Keyword::Struct) => ClassKey::Struct,
            TokenKind::Keyword(Keyword::Union) => ClassKey::Union,
            _ => ClassKey::Class,
        };

        let mut attributes = Vec::new();
        let mut alignment = Vec::new();
        loop {
            if self.check_punct(Punct::LBracket) && self.check_punct_ahead(1, Punct::LBracket) {
                attributes.push(self.parse_attribute()?);
            } else if self.check_keyword(Keyword::Alignas) {
                alignment.push(self.parse_alignas()?);
            } else {
                break;
            }
        }

        let name = if self.check_ident() || self.check_punct(Punct::ColonColon) {
            Some(self.parse_qualified_name(false)?)
        } else {
            None
        };
        if let Some(ident) = name.as_ref().and_then(|n| n.last_ident()) {
            let ident = ident.to_string();
            self.declare_type(&ident);
        }

        let is_final = self.check_contextual("final")
            && matches!(self.peek_ahead(1), TokenKind::Punct(Punct::LBrace | Punct::Colon));
        if is_final {
            self.advance();
        }

        if !self.check_punct(Punct::LBrace) && !self.check_punct(Punct::Colon) {
            return match name {
                Some(name) => Ok(TypeKind::Elaborated {
                    key: ElaboratedKey::Class(key),
                    name,
                }),
                None => Err(self.error_here(format!("'{{' to open {} body", key.keyword()))),
            };
        }

        let bases = if self.match_punct(Punct::Colon) {
            self.parse_base_specifiers()?
        } else {
            Vec::new()
        };

        let class_name = name
            .as_ref()
            .and_then(|n| n.last_ident())
            .unwrap_or_default()
            .to_string();
        let (members, closing_comments) = self.parse_member_list(class_name, key)?;

        Ok(TypeKind::Class(Box::new(ClassDecl {
            key,
            attributes,
            alignment,
            name,
            is_final,
            bases,
            members: Some(members),
            closing_comments,
        })))
    }

    fn parse_member_list(&mut self, class_name: String, key: ClassKey) -> Result<(Vec<Declaration>, Vec<String>), ParseError> {
        self.expect_punct(Punct::LBrace, &format!("to open {} body", key.keyword()))?;
        let opening_comment = self.trailing_comment();

        self.class_stack.push(class_name);
        let members = self.with_template_args(false, |p| {
            let mut members = Vec::new();
            while !p.check_punct(Punct::RBrace) && !p.is_at_end() {
                if let Some(member) = p.parse_declaration(DeclContext::Class)? {
                    members.push(member);
                }
            }
            Ok(members)
        });
        self.class_stack.pop();
        let mut members = members?;

        let mut closing_comments = self.peek().leading_comments.clone();
        self.expect_punct(Punct::RBrace, &format!("to close {} body", key.keyword()))?;
        if let Some(comment) = opening_comment {
            match members.first_mut() {
                Some(first) => first.meta.leading_comments.insert(0, comment),
                None => closing_comments.insert(0, comment),
            }
        }
        Ok((members, closing_comments))
    }

    fn parse_base_specifiers(&mut self) -> Result<Vec<BaseSpecifier>, ParseError> {
        let mut bases = Vec::new();
        loop {
            let mut is_virtual = self.match_keyword(Keyword::Virtual);
            let access = self.match_access();
            is_virtual |= self.match_keyword(Keyword::Virtual);
            let name = self.parse_qualified_name(false)?;
            let pack = self.match_punct(Punct::Ellipsis);
            bases.push(BaseSpecifier {
                access,
                is_virtual,
                name,
                pack,
            });
            if !self.match_punct(Punct::Comma) {
                break;
            }
        }
        Ok(bases)
    }

    pub(crate) fn match_access(&mut self) -> Option<Access> {
        let access = match self.peek_kind() {
            TokenKind::Keyword(Keyword::Public) => Access::Public,
            TokenKind::Keyword(Keyword::Protected) => Access::Protected,
            TokenKind::Keyword(Keyword::Private) => Access::Private,
            _ => return None,
        };
        self.advance();
        Some(access)
    }

    /// `enum [class] [Name] [: type] [{ ... }]`
    fn parse_enum_specifier(&mut self) -> Result<TypeKind, ParseError> {
        self.expect_keyword(Keyword::Enum, "")?;
        let scoped = if self.match_keyword(Keyword::Class) {
            Some(ClassKey::Class)
        } else if self.match_keyword(Keyword::Struct) {
            Some(ClassKey::Struct)
        } else {
            None
        };

        let name = if self.check_ident() || self.check_punct(Punct::ColonColon) {
            Some(self.parse_qualified_name(false)?)
        } else {
            None
        };
        if let Some(ident) = name.as_ref().and_then(|n| n.last_ident()) {
            let ident = ident.to_string();
            self.declare_type(&ident);
        }

        let underlying = if self.check_punct(Punct::Colon) && (name.is_some() || !self.check_punct_ahead(1, Punct::LBrace)) {
            self.advance();
            Some(self.parse_type_spec()?.0)
        } else {
            None
        };

        if !self.check_punct(Punct::LBrace) {
            return match name {
                Some(name) if scoped.is_none() && underlying.is_none() => Ok(TypeKind::Elaborated {
                    key: ElaboratedKey::Enum,
                    name,
                }),
                Some(name) => Ok(TypeKind::Enum(Box::new(EnumDecl {
                    scoped,
                    name: Some(name),
                    underlying,
                    enumerators: None,
                }))),
                None => Err(self.error_here("'{' to open enum body")),
            };
        }

        let enumerators = self.parse_enumerators()?;
        Ok(TypeKind::Enum(Box::new(EnumDecl {
            scoped,
            name,
            underlying,
            enumerators: Some(enumerators),
        })))
    }

    fn parse_enumerators(&mut self) -> Result<Vec<Enumerator>, ParseError> {
        self.expect_punct(Punct::LBrace, "to open enum body")?;
        let mut enumerators = Vec::new();

        self.with_template_args(false, |p| {
            while !p.check_punct(Punct::RBrace) {
                let mut meta = p.start_meta();
                let name = p.expect_identifier("in enumerator list")?;
                let value = if p.match_punct(Punct::Eq) {
                    Some(p.parse_conditional()?)
                } else {
                    None
                };
                let more = p.match_punct(Punct::Comma);
                meta.trailing_comment = p.trailing_comment();
                enumerators.push(Enumerator { name, value, meta });
                if !more {
                    break;
                }
            }
            Ok(())
        })?;

        self.expect_punct(Punct::RBrace, "to close enum body")?;
        Ok(enumerators)
    }

    /// A type with no modifiers, as in type-ids; also reports certainty
    pub(crate) fn parse_type_spec(&mut self) -> Result<(TypeSpec, bool), ParseError> {
        let location = self.current_location();
        let parsed = self.parse_decl_specifiers(DeclContext::Block)?;
        if !parsed.specs.modifiers.is_empty() || parsed.is_typedef {
            return Err(ParseError {
                location,
                expected: "type name".to_string(),
                found: "storage class specifier".to_string(),
            });
        }
        match parsed.specs.ty {
            Some(ty) => Ok((ty, parsed.certain)),
            None => Err(self.error_here("type name")),
        }
    }

    pub(crate) fn parse_type_id(&mut self) -> Result<TypeId, ParseError> {
        Ok(self.parse_type_id_certain()?.0)
    }

    /// Type-id plus whether it could only be read as a type
    pub(crate) fn parse_type_id_certain(&mut self) -> Result<(TypeId, bool), ParseError> {
        let (spec, certain) = self.parse_type_spec()?;
        let declarator = self.parse_declarator(DeclaratorMode::Abstract)?;
        let certain = certain || !declarator.is_abstract();
        Ok((TypeId { spec, declarator }, certain))
    }

    // ===== Declarators =====

    pub(crate) fn parse_declarator(&mut self, mode: DeclaratorMode) -> Result<Declarator, ParseError> {
        self.nested(|p| p.parse_declarator_here(mode))
    }

    fn parse_declarator_here(&mut self, mode: DeclaratorMode) -> Result<Declarator, ParseError> {
        let ptr_ops = self.parse_ptr_ops()?;
        if mode == DeclaratorMode::New {
            return Ok(Declarator {
                ptr_ops,
                ..Declarator::abstract_()
            });
        }
        let pack = self.match_punct(Punct::Ellipsis);
        let direct = self.parse_direct_declarator(mode)?;
        let suffixes = self.parse_declarator_suffixes(mode)?;
        Ok(Declarator {
            ptr_ops,
            pack,
            direct,
            suffixes,
        })
    }

    fn parse_ptr_ops(&mut self) -> Result<Vec<PtrOp>, ParseError> {
        let mut ops = Vec::new();
        loop {
            if self.match_punct(Punct::Star) {
                let (is_const, is_volatile) = self.parse_cv();
                ops.push(PtrOp::Pointer { is_const, is_volatile });
            } else if self.match_punct(Punct::Amp) {
                ops.push(PtrOp::LRef);
            } else if self.match_punct(Punct::AndAnd) {
                ops.push(PtrOp::RRef);
            } else if self.check_ident() || self.check_punct(Punct::ColonColon) {
                let class = self.attempt(|p| {
                    let class = p.parse_qualified_name(false)?;
                    p.expect_punct(Punct::ColonColon, "in member pointer")?;
                    p.expect_punct(Punct::Star, "in member pointer")?;
                    Ok(class)
                });
                let Some(class) = class else { break };
                let (is_const, is_volatile) = self.parse_cv();
                ops.push(PtrOp::MemberPointer {
                    class,
                    is_const,
                    is_volatile,
                });
            } else {
                break;
            }
        }
        Ok(ops)
    }

    fn parse_cv(&mut self) -> (bool, bool) {
        let mut is_const = false;
        let mut is_volatile = false;
        loop {
            if self.match_keyword(Keyword::Const) {
                is_const = true;
            } else if self.match_keyword(Keyword::Volatile) {
                is_volatile = true;
            } else {
                return (is_const, is_volatile);
            }
        }
    }

    fn parse_direct_declarator(&mut self, mode: DeclaratorMode) -> Result<DirectDeclarator, ParseError> {
        if self.check_punct(Punct::LParen) && self.nested_declarator_ahead() {
            self.advance();
            let inner = self.parse_declarator(mode)?;
            self.expect_punct(Punct::RParen, "to close declarator")?;
            return Ok(DirectDeclarator::Nested(Box::new(inner)));
        }

        if mode != DeclaratorMode::Abstract {
            let named = self.check_ident()
                || self.check_punct(Punct::ColonColon)
                || self.check_punct(Punct::Tilde)
                || self.check_keyword(Keyword::Operator);
            if named {
                return Ok(DirectDeclarator::Name(self.parse_qualified_name(false)?));
            }
            if mode == DeclaratorMode::Named && self.check_punct(Punct::LBracket) {
                return self.parse_bindings();
            }
        }

        if mode == DeclaratorMode::Named {
            return Err(self.error_here("declarator name"));
        }
        Ok(DirectDeclarator::Abstract)
    }

    /// `(` opening a nested declarator such as `(*fp)` or `(C::*pm)`
    fn nested_declarator_ahead(&self) -> bool {
        match self.peek_ahead(1) {
            TokenKind::Punct(Punct::Star | Punct::Amp | Punct::AndAnd) => true,
            TokenKind::Ident(_) => {
                self.check_punct_ahead(2, Punct::ColonColon) && self.check_punct_ahead(3, Punct::Star)
            }
            _ => false,
        }
    }

    /// Structured binding `[a, b, c]`
    fn parse_bindings(&mut self) -> Result<DirectDeclarator, ParseError> {
        self.expect_punct(Punct::LBracket, "to open structured binding")?;
        let mut names = vec![self.expect_identifier("in structured binding")?];
        while self.match_punct(Punct::Comma) {
            names.push(self.expect_identifier("in structured binding")?);
        }
        self.expect_punct(Punct::RBracket, "to close structured binding")?;
        Ok(DirectDeclarator::Bindings(names))
    }

    fn parse_declarator_suffixes(&mut self, mode: DeclaratorMode) -> Result<Vec<DeclSuffix>, ParseError> {
        let mut suffixes = Vec::new();
        loop {
            if self.check_punct(Punct::LBracket) && !self.check_punct_ahead(1, Punct::LBracket) {
                self.advance();
                let size = if self.check_punct(Punct::RBracket) {
                    None
                } else {
                    Some(Box::new(self.with_template_args(false, |p| p.parse_expression())?))
                };
                self.expect_punct(Punct::RBracket, "to close array bound")?;
                suffixes.push(DeclSuffix::Array(size));
            } else if self.check_punct(Punct::LParen) && (mode == DeclaratorMode::Abstract || self.parameter_list_ahead()) {
                suffixes.push(DeclSuffix::Function(self.parse_function_suffix()?));
            } else {
                return Ok(suffixes);
            }
        }
    }

    /// Does the `(` at the cursor open a parameter list rather than a
    /// parenthesized initializer? Ties go to the parameter list.
    pub(crate) fn parameter_list_ahead(&mut self) -> bool {
        match self.peek_ahead(1) {
            TokenKind::Punct(Punct::RParen | Punct::Ellipsis) => return true,
            TokenKind::Punct(Punct::LBracket) => return self.check_punct_ahead(2, Punct::LBracket),
            TokenKind::Keyword(k) => return k.is_builtin_type() || starts_declaration(*k) || *k == Keyword::Decltype,
            TokenKind::Ident(_) | TokenKind::Punct(Punct::ColonColon) => {}
            _ => return false,
        }

        self.lookahead(|p| {
            p.advance();
            let parsed = p.parse_decl_specifiers(DeclContext::Block)?;
            if parsed.specs.ty.is_none() {
                return Err(p.error_here("parameter type"));
            }
            if parsed.certain {
                return Ok(());
            }
            match p.peek_kind() {
                TokenKind::Ident(_) | TokenKind::Punct(Punct::Star | Punct::Amp | Punct::AndAnd | Punct::Ellipsis) => Ok(()),
                TokenKind::Punct(Punct::LParen) if p.nested_declarator_ahead() => Ok(()),
                _ => Err(p.error_here("parameter declarator")),
            }
        })
    }

    pub(crate) fn parse_function_suffix(&mut self) -> Result<FunctionSuffix, ParseError> {
        let (params, variadic) = self.parse_parameter_list()?;
        let qualifiers = self.parse_function_qualifiers()?;
        let trailing_return = if self.match_punct(Punct::Arrow) {
            Some(Box::new(self.parse_type_id()?))
        } else {
            None
        };
        Ok(FunctionSuffix {
            params,
            variadic,
            qualifiers,
            trailing_return,
        })
    }

    /// `( params )`; the flag is set for a trailing C-style `...`
    pub(crate) fn parse_parameter_list(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        self.expect_punct(Punct::LParen, "to open parameter list")?;
        let mut params = Vec::new();
        let mut variadic = false;

        self.with_template_args(false, |p| {
            if p.check_punct(Punct::RParen) {
                return Ok(());
            }
            loop {
                if p.match_punct(Punct::Ellipsis) {
                    variadic = true;
                    break;
                }
                params.push(p.parse_param()?);
                if p.match_punct(Punct::Ellipsis) {
                    variadic = true;
                    break;
                }
                if !p.match_punct(Punct::Comma) {
                    break;
                }
            }
            Ok(())
        })?;

        self.expect_punct(Punct::RParen, "to close parameter list")?;
        Ok((params, variadic))
    }

    pub(crate) fn parse_param(&mut self) -> Result<Param, ParseError> {
        let parsed = self.parse_decl_specifiers(DeclContext::Block)?;
        if parsed.specs.ty.is_none() {
            return Err(self.error_here("parameter type"));
        }
        let declarator = self.parse_declarator(DeclaratorMode::Optional)?;
        let default = if self.match_punct(Punct::Eq) {
            Some(self.parse_initializer_clause()?)
        } else {
            None
        };
        Ok(Param {
            specifiers: parsed.specs,
            declarator,
            default,
        })
    }

    pub(crate) fn parse_function_qualifiers(&mut self) -> Result<FunctionQualifiers, ParseError> {
        let mut qualifiers = FunctionQualifiers::default();
        loop {
            if self.match_keyword(Keyword::Const) {
                qualifiers.is_const = true;
            } else if self.match_keyword(Keyword::Volatile) {
                qualifiers.is_volatile = true;
            } else if self.match_punct(Punct::Amp) {
                qualifiers.ref_qualifier = Some(RefQualifier::LValue);
            } else if self.match_punct(Punct::AndAnd) {
                qualifiers.ref_qualifier = Some(RefQualifier::RValue);
            } else if self.check_keyword(Keyword::Noexcept) || self.check_keyword(Keyword::Throw) {
                qualifiers.exception = Some(self.parse_exception_spec()?);
            } else {
                return Ok(qualifiers);
            }
        }
    }

    pub(crate) fn parse_exception_spec(&mut self) -> Result<ExceptionSpec, ParseError> {
        if self.match_keyword(Keyword::Noexcept) {
            if !self.match_punct(Punct::LParen) {
                return Ok(ExceptionSpec::Noexcept(None));
            }
            let expr = self.with_template_args(false, |p| p.parse_expression())?;
            self.expect_punct(Punct::RParen, "to close 'noexcept'")?;
            return Ok(ExceptionSpec::Noexcept(Some(Box::new(expr))));
        }

        self.expect_keyword(Keyword::Throw, "in exception specification")?;
        self.expect_punct(Punct::LParen, "after 'throw'")?;
        let mut types = Vec::new();
        if !self.check_punct(Punct::RParen) {
            loop {
                types.push(self.parse_type_id()?);
                if !self.match_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RParen, "to close 'throw'")?;
        Ok(ExceptionSpec::Throw(types))
    }

    // ===== Names =====

    /// Parse `[::] seg (:: seg)*`.
    ///
    /// In expressions a `<` after a name only starts template arguments if
    /// the list closes and is followed by a token that can follow a
    /// template-id; otherwise it stays a less-than operator.
    pub(crate) fn parse_qualified_name(&mut self, in_expression: bool) -> Result<QualifiedName, ParseError> {
        let global = self.match_punct(Punct::ColonColon);
        let mut segments = Vec::new();

        loop {
            let template_keyword = self.match_keyword(Keyword::Template);
            let ident = if self.match_punct(Punct::Tilde) {
                Identifier::Destructor(self.expect_identifier("after '~'")?)
            } else if self.check_keyword(Keyword::Operator) {
                self.parse_operator_name()?
            } else {
                Identifier::Plain(self.expect_identifier("in name")?)
            };

            let plain = matches!(ident, Identifier::Plain(_));
            let template_args = if plain && self.check_punct(Punct::Lt) {
                self.try_template_args(in_expression)
            } else {
                None
            };
            segments.push(NameSegment {
                ident,
                template_args,
                template_keyword,
            });

            let continues = plain
                && self.check_punct(Punct::ColonColon)
                && matches!(
                    self.peek_ahead(1),
                    TokenKind::Ident(_)
                        | TokenKind::Keyword(Keyword::Template | Keyword::Operator)
                        | TokenKind::Punct(Punct::Tilde)
                );
            if !continues {
                break;
            }
            self.advance();
        }

        Ok(QualifiedName { global, segments })
    }

    /// `operator` followed by an operator symbol or a conversion type
    fn parse_operator_name(&mut self) -> Result<Identifier, ParseError> {
        self.expect_keyword(Keyword::Operator, "")?;

        let symbol = match self.peek_kind().clone() {
            TokenKind::Keyword(kw @ (Keyword::New | Keyword::Delete)) => {
                self.advance();
                let mut symbol = kw.as_str().to_string();
                if self.check_punct(Punct::LBracket) && self.check_punct_ahead(1, Punct::RBracket) {
                    self.advance();
                    self.advance();
                    symbol.push_str("[]");
                }
                symbol
            }
            TokenKind::Punct(Punct::LParen) if self.check_punct_ahead(1, Punct::RParen) => {
                self.advance();
                self.advance();
                "()".to_string()
            }
            TokenKind::Punct(Punct::LBracket) if self.check_punct_ahead(1, Punct::RBracket) => {
                self.advance();
                self.advance();
                "[]".to_string()
            }
            TokenKind::Punct(Punct::Gt) if self.peek().joint && self.check_punct_ahead(1, Punct::Gt) => {
                self.advance();
                self.advance();
                ">>".to_string()
            }
            TokenKind::Punct(Punct::Gt) if self.peek().joint && self.check_punct_ahead(1, Punct::GtEq) => {
                self.advance();
                self.advance();
                ">>=".to_string()
            }
            TokenKind::StringLiteral(text) if text.starts_with("\"\"") => {
                self.advance();
                let mut symbol = text;
                if let TokenKind::Ident(suffix) = self.peek_kind() {
                    symbol.push_str(suffix);
                    self.advance();
                }
                symbol
            }
            TokenKind::Punct(
                p @ (Punct::Plus
                | Punct::Minus
                | Punct::Star
                | Punct::Slash
                | Punct::Percent
                | Punct::Caret
                | Punct::Amp
                | Punct::Pipe
                | Punct::Tilde
                | Punct::Bang
                | Punct::Eq
                | Punct::Lt
                | Punct::Gt
                | Punct::LtEq
                | Punct::GtEq
                | Punct::EqEq
                | Punct::NotEq
                | Punct::Spaceship
                | Punct::AndAnd
                | Punct::OrOr
                | Punct::PlusPlus
                | Punct::MinusMinus
                | Punct::Shl
                | Punct::ShlEq
                | Punct::PlusEq
                | Punct::MinusEq
                | Punct::StarEq
                | Punct::SlashEq
                | Punct::PercentEq
                | Punct::CaretEq
                | Punct::AmpEq
                | Punct::PipeEq
                | Punct::Comma
                | Punct::Arrow
                | Punct::ArrowStar),
            ) => {
                self.advance();
                p.as_str().to_string()
            }
            _ => {
                let (spec, _) = self.parse_type_spec()?;
                let ptr_ops = self.parse_ptr_ops()?;
                return Ok(Identifier::Conversion(Box::new(TypeId {
                    spec,
                    declarator: Declarator {
                        ptr_ops,
                        ..Declarator::abstract_()
                    },
                })));
            }
        };
        Ok(Identifier::Operator(symbol))
    }

    fn try_template_args(&mut self, in_expression: bool) -> Option<Vec<TemplateArg>> {
        self.attempt(|p| {
            let args = p.parse_template_args()?;
            if in_expression && !p.can_follow_template_id() {
                return Err(p.error_here("token after template arguments"));
            }
            Ok(args)
        })
    }

    pub(crate) fn parse_template_args(&mut self) -> Result<Vec<TemplateArg>, ParseError> {
        self.expect_punct(Punct::Lt, "to open template arguments")?;
        let args = self.nested(|p| {
            p.with_template_args(true, |p| {
                let mut args = Vec::new();
                if p.check_punct(Punct::Gt) {
                    return Ok(args);
                }
                loop {
                    let mut arg = p.parse_template_arg()?;
                    if p.match_punct(Punct::Ellipsis) {
                        arg = TemplateArg::Pack(Box::new(arg));
                    }
                    args.push(arg);
                    if !p.match_punct(Punct::Comma) {
                        return Ok(args);
                    }
                }
            })
        })?;
        self.expect_template_close("to close template arguments")?;
        Ok(args)
    }

    /// A type-id when one parses up to `,` `>` or `...`, else an expression
    fn parse_template_arg(&mut self) -> Result<TemplateArg, ParseError> {
        let ty = self.attempt(|p| {
            let ty = p.parse_type_id()?;
            if p.check_punct(Punct::Comma) || p.check_punct(Punct::Gt) || p.check_punct(Punct::Ellipsis) {
                Ok(ty)
            } else {
                Err(p.error_here("',' or '>' after template argument"))
            }
        });
        match ty {
            Some(ty) => Ok(TemplateArg::Type(ty)),
            None => Ok(TemplateArg::Expr(self.parse_conditional()?)),
        }
    }

    fn can_follow_template_id(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Eof
                | TokenKind::Punct(
                    Punct::LParen
                        | Punct::RParen
                        | Punct::ColonColon
                        | Punct::LBrace
                        | Punct::RBrace
                        | Punct::Semicolon
                        | Punct::Comma
                        | Punct::RBracket
                        | Punct::Gt
                        | Punct::Ellipsis
                        | Punct::Dot
                        | Punct::Arrow
                        | Punct::Eq
                        | Punct::EqEq
                        | Punct::NotEq
                        | Punct::AndAnd
                        | Punct::OrOr
                        | Punct::Question
                        | Punct::Colon
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarator(source: &str, mode: DeclaratorMode) -> Declarator {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_declarator(mode).unwrap()
    }

    fn type_id(source: &str) -> TypeId {
        let mut parser = Parser::new(source).unwrap();
        let ty = parser.parse_type_id().unwrap();
        assert!(parser.is_at_end(), "trailing tokens in {:?}", source);
        ty
    }

    #[test]
    fn test_pointer_declarator() {
        let d = declarator("* const * p", DeclaratorMode::Named);
        assert_eq!(
            d.ptr_ops,
            vec![
                PtrOp::Pointer {
                    is_const: true,
                    is_volatile: false
                },
                PtrOp::Pointer {
                    is_const: false,
                    is_volatile: false
                },
            ]
        );
        assert_eq!(d.name(), Some(&QualifiedName::simple("p")));
    }

    #[test]
    fn test_function_pointer_declarator() {
        let d = declarator("(*callback)(int, char*)", DeclaratorMode::Named);
        match &d.direct {
            DirectDeclarator::Nested(inner) => {
                assert_eq!(inner.ptr_ops.len(), 1);
                assert_eq!(inner.name(), Some(&QualifiedName::simple("callback")));
            }
            other => panic!("Expected nested declarator, got {:?}", other),
        }
        match &d.suffixes[..] {
            [DeclSuffix::Function(func)] => assert_eq!(func.params.len(), 2),
            other => panic!("Expected function suffix, got {:?}", other),
        }
    }

    #[test]
    fn test_paren_initializer_is_not_parameters() {
        // `x(value)` with an unknown name keeps the parens for the initializer
        let mut parser = Parser::new("x(value)").unwrap();
        let d = parser.parse_declarator(DeclaratorMode::Named).unwrap();
        assert!(d.suffixes.is_empty());
        assert!(parser.check_punct(Punct::LParen));
    }

    #[test]
    fn test_template_type_id() {
        let ty = type_id("std::map<std::string, std::vector<int>>");
        match &ty.spec.kind {
            TypeKind::Named(name) => {
                assert_eq!(name.segments.len(), 2);
                let args = name.segments[1].template_args.as_ref().unwrap();
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected named type, got {:?}", other),
        }
    }

    #[test]
    fn test_function_type_argument() {
        let ty = type_id("std::function<void(int)>");
        let TypeKind::Named(name) = &ty.spec.kind else {
            panic!("Expected named type");
        };
        match name.segments[1].template_args.as_deref() {
            Some([TemplateArg::Type(arg)]) => {
                assert!(matches!(arg.declarator.suffixes[..], [DeclSuffix::Function(_)]));
            }
            other => panic!("Expected one type argument, got {:?}", other),
        }
    }

    #[test]
    fn test_expression_template_argument() {
        let ty = type_id("std::array<int, 3>");
        let TypeKind::Named(name) = &ty.spec.kind else {
            panic!("Expected named type");
        };
        let args = name.segments[1].template_args.as_ref().unwrap();
        assert_eq!(args[1], TemplateArg::Expr(Expr::int("3")));
    }

    #[test]
    fn test_operator_names() {
        for (source, symbol) in [
            ("operator==", "=="),
            ("operator()", "()"),
            ("operator new[]", "new[]"),
            ("operator>>", ">>"),
            ("operator<<=", "<<="),
        ] {
            let mut parser = Parser::new(source).unwrap();
            let name = parser.parse_qualified_name(false).unwrap();
            assert_eq!(name.segments[0].ident, Identifier::Operator(symbol.to_string()));
        }
    }

    #[test]
    fn test_builtin_type_words() {
        let ty = type_id("unsigned long long");
        assert_eq!(ty.spec, TypeSpec::builtin(&["unsigned", "long", "long"]));
    }

    #[test]
    fn test_member_pointer() {
        let ty = type_id("int Widget::*");
        assert!(matches!(ty.declarator.ptr_ops[..], [PtrOp::MemberPointer { .. }]));
    }
}
