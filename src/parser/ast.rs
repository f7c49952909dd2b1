// Program-unit definitions for parsed C++ translation units

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Formatting metadata attached to a declaration or statement.
///
/// `NodeMeta` never takes part in structural equality: two nodes that differ
/// only in location, comments or blank lines compare equal.
#[derive(Debug, Clone, Default)]
pub struct NodeMeta {
    pub location: SourceLocation,
    /// Comments on the lines directly above the node, verbatim
    pub leading_comments: Vec<String>,
    /// Comment on the same line as the node's last token
    pub trailing_comment: Option<String>,
    /// The node was separated from its predecessor by an empty line
    pub blank_line_before: bool,
}

impl NodeMeta {
    pub fn at(location: SourceLocation) -> Self {
        NodeMeta {
            location,
            ..NodeMeta::default()
        }
    }
}

impl PartialEq for NodeMeta {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for NodeMeta {}

// ===== Names =====

/// One component of an identifier as it appears in a qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Plain(String),
    /// `~Name`
    Destructor(String),
    /// `operator+`, `operator()`, `operator new[]`, `operator""_km`
    Operator(String),
    /// `operator int*`
    Conversion(Box<TypeId>),
}

/// `name`, `name<args>` or `template name<args>` inside a qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegment {
    pub ident: Identifier,
    pub template_args: Option<Vec<TemplateArg>>,
    /// Explicit `template` disambiguator before the segment
    pub template_keyword: bool,
}

impl NameSegment {
    pub fn plain(name: impl Into<String>) -> Self {
        NameSegment {
            ident: Identifier::Plain(name.into()),
            template_args: None,
            template_keyword: false,
        }
    }
}

/// A possibly-qualified name: `::std::vector<int>::iterator`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Leading `::`
    pub global: bool,
    pub segments: Vec<NameSegment>,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>) -> Self {
        QualifiedName {
            global: false,
            segments: vec![NameSegment::plain(name)],
        }
    }

    /// The last segment's plain identifier, if it has one
    pub fn last_ident(&self) -> Option<&str> {
        match self.segments.last().map(|s| &s.ident) {
            Some(Identifier::Plain(name)) | Some(Identifier::Destructor(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_simple(&self) -> bool {
        !self.global && self.segments.len() == 1 && self.segments[0].template_args.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg {
    Type(TypeId),
    Expr(Expr),
    /// `Ts...` in a template argument list
    Pack(Box<TemplateArg>),
}

// ===== Types =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
}

impl ClassKey {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKey::Class => "class",
            ClassKey::Struct => "struct",
            ClassKey::Union => "union",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElaboratedKey {
    Class(ClassKey),
    Enum,
    Typename,
}

/// The type part of a declaration's specifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Builtin keyword sequence in source order: `unsigned long long`
    Builtin(Vec<String>),
    Named(QualifiedName),
    /// `struct X`, `enum E`, `typename T::type`
    Elaborated { key: ElaboratedKey, name: QualifiedName },
    Decltype(Box<Expr>),
    /// `decltype(auto)`
    DecltypeAuto,
    Auto,
    /// Inline definition: `struct { int x; } point;`
    Class(Box<ClassDecl>),
    Enum(Box<EnumDecl>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub is_const: bool,
    pub is_volatile: bool,
    pub kind: TypeKind,
}

impl TypeSpec {
    pub fn new(kind: TypeKind) -> Self {
        TypeSpec {
            is_const: false,
            is_volatile: false,
            kind,
        }
    }

    pub fn builtin(words: &[&str]) -> Self {
        TypeSpec::new(TypeKind::Builtin(
            words.iter().map(|w| w.to_string()).collect(),
        ))
    }
}

/// Pointer-like operator in a declarator, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtrOp {
    Pointer { is_const: bool, is_volatile: bool },
    LRef,
    RRef,
    /// `Class::*`
    MemberPointer {
        class: QualifiedName,
        is_const: bool,
        is_volatile: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectDeclarator {
    /// No name: abstract declarator in a type-id or unnamed parameter
    Abstract,
    Name(QualifiedName),
    /// `(*name)` as in function pointers
    Nested(Box<Declarator>),
    /// Structured binding `[a, b]`
    Bindings(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefQualifier {
    LValue,
    RValue,
}

/// Exception specification of a function type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionSpec {
    Noexcept(Option<Box<Expr>>),
    /// Dynamic `throw(...)` specification
    Throw(Vec<TypeId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionQualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
    pub ref_qualifier: Option<RefQualifier>,
    pub exception: Option<ExceptionSpec>,
}

/// Parameter list and qualifiers of a function declarator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSuffix {
    pub params: Vec<Param>,
    /// Trailing C-style `...`
    pub variadic: bool,
    pub qualifiers: FunctionQualifiers,
    pub trailing_return: Option<Box<TypeId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclSuffix {
    Array(Option<Box<Expr>>),
    Function(FunctionSuffix),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator {
    pub ptr_ops: Vec<PtrOp>,
    /// `...` before the name (parameter packs)
    pub pack: bool,
    pub direct: DirectDeclarator,
    pub suffixes: Vec<DeclSuffix>,
}

impl Declarator {
    pub fn abstract_() -> Self {
        Declarator {
            ptr_ops: Vec::new(),
            pack: false,
            direct: DirectDeclarator::Abstract,
            suffixes: Vec::new(),
        }
    }

    pub fn named(name: QualifiedName) -> Self {
        Declarator {
            direct: DirectDeclarator::Name(name),
            ..Declarator::abstract_()
        }
    }

    /// Name declared by this declarator, looking through nesting
    pub fn name(&self) -> Option<&QualifiedName> {
        match &self.direct {
            DirectDeclarator::Name(name) => Some(name),
            DirectDeclarator::Nested(inner) => inner.name(),
            DirectDeclarator::Abstract | DirectDeclarator::Bindings(_) => None,
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.ptr_ops.is_empty()
            && !self.pack
            && matches!(self.direct, DirectDeclarator::Abstract)
            && self.suffixes.is_empty()
    }
}

/// A type as written in casts, template arguments and `sizeof`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeId {
    pub spec: TypeSpec,
    pub declarator: Declarator,
}

// ===== Declarations =====

/// Storage class and function specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Static,
    Extern,
    Inline,
    Virtual,
    Explicit,
    Constexpr,
    Consteval,
    Constinit,
    Friend,
    Mutable,
    ThreadLocal,
    Register,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Static => "static",
            Modifier::Extern => "extern",
            Modifier::Inline => "inline",
            Modifier::Virtual => "virtual",
            Modifier::Explicit => "explicit",
            Modifier::Constexpr => "constexpr",
            Modifier::Consteval => "consteval",
            Modifier::Constinit => "constinit",
            Modifier::Friend => "friend",
            Modifier::Mutable => "mutable",
            Modifier::ThreadLocal => "thread_local",
            Modifier::Register => "register",
        }
    }
}

/// Leading part of a declaration: attributes, modifiers and the type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclSpecifiers {
    /// Contents of `[[...]]` attribute lists, normalised token text
    pub attributes: Vec<String>,
    /// Operands of `alignas(...)`, normalised token text
    pub alignment: Vec<String>,
    pub modifiers: Vec<Modifier>,
    /// Absent for constructors, destructors and conversion functions
    pub ty: Option<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    /// `= expr` (the expression may be a braced list)
    Assign(Expr),
    /// `(a, b)`
    Paren(Vec<Expr>),
    /// `{a, b}`
    Brace(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitDeclarator {
    pub declarator: Declarator,
    pub bit_width: Option<Expr>,
    pub init: Option<Initializer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub specifiers: DeclSpecifiers,
    pub declarators: Vec<InitDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    pub specifiers: DeclSpecifiers,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDecl {
    pub name: String,
    pub target: TypeId,
}

/// Constructor member initializer: `count(0)` / `items{}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInit {
    pub member: QualifiedName,
    pub init: Initializer,
    pub pack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionBody {
    /// Prototype, terminated by `;`
    Declared,
    Defined(Block),
    Default,
    Delete,
    /// `= 0`
    Pure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub specifiers: DeclSpecifiers,
    /// Pointer operators applying to the return type: `char* name()`
    pub return_ptr_ops: Vec<PtrOp>,
    pub name: QualifiedName,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub qualifiers: FunctionQualifiers,
    pub trailing_return: Option<TypeId>,
    pub is_override: bool,
    pub is_final: bool,
    pub member_inits: Vec<MemberInit>,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSpecifier {
    pub access: Option<Access>,
    pub is_virtual: bool,
    pub name: QualifiedName,
    pub pack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub key: ClassKey,
    pub attributes: Vec<String>,
    pub alignment: Vec<String>,
    pub name: Option<QualifiedName>,
    pub is_final: bool,
    pub bases: Vec<BaseSpecifier>,
    /// `None` for a forward declaration
    pub members: Option<Vec<Declaration>>,
    pub closing_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<Expr>,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// `enum class` / `enum struct`
    pub scoped: Option<ClassKey>,
    pub name: Option<QualifiedName>,
    pub underlying: Option<TypeSpec>,
    /// `None` for an opaque declaration
    pub enumerators: Option<Vec<Enumerator>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Empty for an anonymous namespace; `a::b` for a nested definition
    pub name: Vec<String>,
    pub is_inline: bool,
    pub members: Vec<Declaration>,
    pub closing_comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeParamKey {
    Typename,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateParam {
    Type {
        key: TypeParamKey,
        pack: bool,
        name: Option<String>,
        default: Option<TypeId>,
    },
    NonType(Param),
    Template {
        params: Vec<TemplateParam>,
        key: TypeParamKey,
        pack: bool,
        name: Option<String>,
        default: Option<QualifiedName>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDecl {
    pub params: Vec<TemplateParam>,
    /// `template class Foo<int>;` has no parameter list at all
    pub explicit_instantiation: bool,
    pub declaration: Box<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkageBody {
    Block(Vec<Declaration>),
    Single(Box<Declaration>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Namespace(NamespaceDecl),
    NamespaceAlias { name: String, target: QualifiedName },
    Class(ClassDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
    Typedef(TypedefDecl),
    Alias(AliasDecl),
    Template(TemplateDecl),
    Enum(EnumDecl),
    UsingDirective(QualifiedName),
    UsingDeclaration { typename_keyword: bool, name: QualifiedName },
    Linkage { abi: String, body: LinkageBody },
    StaticAssert { condition: Expr, message: Option<Expr> },
    Access(Access),
    /// Preprocessor line, verbatim including continuations
    Preprocessor(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclKind,
    pub meta: NodeMeta,
}

fn render_name(name: &QualifiedName) -> String {
    let mut out = String::new();
    if name.global {
        out.push_str("::");
    }
    for (i, segment) in name.segments.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        match &segment.ident {
            Identifier::Plain(s) => out.push_str(s),
            Identifier::Destructor(s) => {
                out.push('~');
                out.push_str(s);
            }
            Identifier::Operator(op) => {
                out.push_str("operator");
                out.push_str(op);
            }
            Identifier::Conversion(_) => out.push_str("operator <conversion>"),
        }
    }
    out
}

impl Declaration {
    pub fn new(kind: DeclKind, meta: NodeMeta) -> Self {
        Declaration { kind, meta }
    }

    /// Declared name, empty for anonymous or nameless declarations
    pub fn name(&self) -> String {
        match &self.kind {
            DeclKind::Namespace(ns) => ns.name.join("::"),
            DeclKind::NamespaceAlias { name, .. } => name.clone(),
            DeclKind::Class(class) => class.name.as_ref().map(render_name).unwrap_or_default(),
            DeclKind::Function(func) => render_name(&func.name),
            DeclKind::Variable(var) => var
                .declarators
                .first()
                .and_then(|d| d.declarator.name())
                .map(render_name)
                .unwrap_or_default(),
            DeclKind::Typedef(td) => td
                .declarators
                .first()
                .and_then(|d| d.name())
                .map(render_name)
                .unwrap_or_default(),
            DeclKind::Alias(alias) => alias.name.clone(),
            DeclKind::Template(tpl) => tpl.declaration.name(),
            DeclKind::Enum(e) => e.name.as_ref().map(render_name).unwrap_or_default(),
            DeclKind::UsingDirective(name) => render_name(name),
            DeclKind::UsingDeclaration { name, .. } => render_name(name),
            DeclKind::Linkage { abi, .. } => abi.clone(),
            DeclKind::StaticAssert { .. }
            | DeclKind::Access(_)
            | DeclKind::Preprocessor(_) => String::new(),
        }
    }

    /// Storage class and function specifiers of the declaration
    pub fn modifiers(&self) -> &[Modifier] {
        match &self.kind {
            DeclKind::Function(func) => &func.specifiers.modifiers,
            DeclKind::Variable(var) => &var.specifiers.modifiers,
            DeclKind::Typedef(td) => &td.specifiers.modifiers,
            DeclKind::Template(tpl) => tpl.declaration.modifiers(),
            _ => &[],
        }
    }

    /// Nested member declarations (namespace, class, linkage block)
    pub fn children(&self) -> &[Declaration] {
        match &self.kind {
            DeclKind::Namespace(ns) => &ns.members,
            DeclKind::Class(class) => class.members.as_deref().unwrap_or(&[]),
            DeclKind::Linkage {
                body: LinkageBody::Block(decls),
                ..
            } => decls,
            DeclKind::Template(tpl) => tpl.declaration.children(),
            _ => &[],
        }
    }

    /// Function body block, if this is a function definition
    pub fn body(&self) -> Option<&Block> {
        match &self.kind {
            DeclKind::Function(FunctionDecl {
                body: FunctionBody::Defined(block),
                ..
            }) => Some(block),
            DeclKind::Template(tpl) => tpl.declaration.body(),
            _ => None,
        }
    }
}

// ===== Statements =====

/// Brace-enclosed statement sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub closing_comments: Vec<String>,
}

/// Condition of `if`, `while`, `switch` and `for`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Expr(Expr),
    /// `if (auto* p = lookup())`
    Decl(Box<Declaration>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchHandler {
    /// `None` for `catch (...)`
    pub param: Option<Param>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Expr(Expr),
    Compound(Block),
    If {
        is_constexpr: bool,
        init: Option<Box<Statement>>,
        condition: Condition,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Condition>,
        step: Option<Expr>,
        body: Box<Statement>,
    },
    RangeFor {
        init: Option<Box<Statement>>,
        decl: Box<Declaration>,
        range: Expr,
        body: Box<Statement>,
    },
    While {
        condition: Condition,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expr,
    },
    Switch {
        init: Option<Box<Statement>>,
        condition: Condition,
        body: Box<Statement>,
    },
    Case(Expr),
    Default,
    Return(Option<Expr>),
    Declaration(Box<Declaration>),
    Break,
    Continue,
    Goto(String),
    Label(String),
    Try {
        body: Block,
        handlers: Vec<CatchHandler>,
    },
    /// Lone `;`
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StmtKind,
    pub meta: NodeMeta,
}

impl Statement {
    pub fn new(kind: StmtKind, meta: NodeMeta) -> Self {
        Statement { kind, meta }
    }
}

// ===== Expressions =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    Char,
    String,
    Bool,
    Nullptr,
}

/// Literal with its exact source spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
}

/// Binary operators, ordered loosely by precedence group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Comma,
    LogOr,
    LogAnd,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Spaceship,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `.*`
    PtrMem,
    /// `->*`
    PtrMemArrow,
}

/// Binding strength of expression forms, loosest first
pub mod precedence {
    pub const COMMA: u8 = 1;
    /// Assignment, `throw` and pack expansion
    pub const ASSIGN: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const LOG_OR: u8 = 4;
    pub const LOG_AND: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const SPACESHIP: u8 = 10;
    pub const RELATIONAL: u8 = 11;
    pub const SHIFT: u8 = 12;
    pub const ADDITIVE: u8 = 13;
    pub const MULTIPLICATIVE: u8 = 14;
    pub const POINTER_TO_MEMBER: u8 = 15;
    /// Prefix operators and C-style casts
    pub const UNARY: u8 = 16;
    pub const POSTFIX: u8 = 17;
    pub const PRIMARY: u8 = 18;
}

impl BinOp {
    pub fn precedence(self) -> u8 {
        use precedence::*;
        match self {
            BinOp::Comma => COMMA,
            BinOp::LogOr => LOG_OR,
            BinOp::LogAnd => LOG_AND,
            BinOp::BitOr => BIT_OR,
            BinOp::BitXor => BIT_XOR,
            BinOp::BitAnd => BIT_AND,
            BinOp::Eq | BinOp::Ne => EQUALITY,
            BinOp::Spaceship => SPACESHIP,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => RELATIONAL,
            BinOp::Shl | BinOp::Shr => SHIFT,
            BinOp::Add | BinOp::Sub => ADDITIVE,
            BinOp::Mul | BinOp::Div | BinOp::Mod => MULTIPLICATIVE,
            BinOp::PtrMem | BinOp::PtrMemArrow => POINTER_TO_MEMBER,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Comma => ",",
            BinOp::LogOr => "||",
            BinOp::LogAnd => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Spaceship => "<=>",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::PtrMem => ".*",
            BinOp::PtrMemArrow => "->*",
        }
    }
}

/// Assignment operators (`=` and compound forms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    And,
    Or,
    Xor,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,    // +x
    Neg,     // -x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
        }
    }
}

impl UnOp {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnOp::PostInc | UnOp::PostDec)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Plus => "+",
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// `(T)x`
    CStyle,
    /// `T(x)` with a builtin type
    Functional,
    Static,
    Dynamic,
    Const,
    Reinterpret,
}

impl CastKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            CastKind::Static => Some("static_cast"),
            CastKind::Dynamic => Some("dynamic_cast"),
            CastKind::Const => Some("const_cast"),
            CastKind::Reinterpret => Some("reinterpret_cast"),
            CastKind::CStyle | CastKind::Functional => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeofArg {
    Type(TypeId),
    Expr(Box<Expr>),
    /// `sizeof...(Ts)`
    Pack(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// `=`
    DefaultCopy,
    /// `&`
    DefaultRef,
    This,
    /// `*this`
    StarThis,
    ByCopy {
        name: String,
        init: Option<Box<Expr>>,
        pack: bool,
    },
    ByRef {
        name: String,
        init: Option<Box<Expr>>,
        pack: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    pub captures: Vec<Capture>,
    /// `None` when the parameter list is omitted entirely
    pub params: Option<Vec<Param>>,
    pub variadic: bool,
    pub is_mutable: bool,
    pub is_constexpr: bool,
    pub exception: Option<ExceptionSpec>,
    pub trailing_return: Option<TypeId>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Name(QualifiedName),
    This,
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        arrow: bool,
        member: QualifiedName,
    },
    Cast {
        kind: CastKind,
        ty: TypeId,
        expr: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `{a, b}` or `Point{a, b}`
    InitList {
        ty: Option<TypeSpec>,
        elements: Vec<Expr>,
    },
    Sizeof(SizeofArg),
    Alignof(TypeId),
    New {
        global: bool,
        placement: Vec<Expr>,
        ty: TypeId,
        /// `new T[n]` dimension
        array_size: Option<Box<Expr>>,
        init: Option<Box<Initializer>>,
    },
    Delete {
        global: bool,
        array: bool,
        expr: Box<Expr>,
    },
    Throw(Option<Box<Expr>>),
    Lambda(Box<Lambda>),
    PackExpansion(Box<Expr>),
    /// `(e op ...)`, `(... op e)` or `(e op ... op e)`; the pack sits
    /// between `left` and `right`
    Fold {
        op: BinOp,
        left: Option<Box<Expr>>,
        right: Option<Box<Expr>>,
    },
    Noexcept(Box<Expr>),
    Typeid(Box<SizeofArg>),
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(QualifiedName::simple(name))
    }

    pub fn int(text: impl Into<String>) -> Self {
        Expr::Literal(Literal {
            kind: LiteralKind::Integer,
            text: text.into(),
        })
    }
}

/// Root of one parsed translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramUnit {
    pub declarations: Vec<Declaration>, // Source order
    /// Comments after the last declaration
    pub closing_comments: Vec<String>,
}

impl ProgramUnit {
    pub fn new() -> Self {
        ProgramUnit::default()
    }
}
