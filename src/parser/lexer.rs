//! Lexer (tokenizer) for C++ source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Comments are not discarded: they are attached to the following token as
//! leading trivia, or to the previous token when they share its line.
//! Preprocessor lines are passed through verbatim as [`TokenKind::Directive`].
//!
//! `>>` and `>>=` are never produced as single tokens. They are emitted as a
//! `>` marked `joint` followed by `>` or `>=`, so a template argument list can
//! close on the first `>` while expressions still see a shift.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Reserved words recognised by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Alignas,
    Alignof,
    Auto,
    Bool,
    Break,
    Case,
    Catch,
    Char,
    Char8,
    Char16,
    Char32,
    Class,
    Const,
    Consteval,
    Constexpr,
    Constinit,
    ConstCast,
    Continue,
    Decltype,
    Default,
    Delete,
    Do,
    Double,
    DynamicCast,
    Else,
    Enum,
    Explicit,
    Extern,
    False,
    Float,
    For,
    Friend,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Mutable,
    Namespace,
    New,
    Noexcept,
    Nullptr,
    Operator,
    Private,
    Protected,
    Public,
    Register,
    ReinterpretCast,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    StaticAssert,
    StaticCast,
    Struct,
    Switch,
    Template,
    This,
    ThreadLocal,
    Throw,
    True,
    Try,
    Typedef,
    Typeid,
    Typename,
    Union,
    Unsigned,
    Using,
    Virtual,
    Void,
    Volatile,
    WcharT,
    While,
}

impl Keyword {
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        let kw = match ident {
            "alignas" => Keyword::Alignas,
            "alignof" => Keyword::Alignof,
            "auto" => Keyword::Auto,
            "bool" => Keyword::Bool,
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "char" => Keyword::Char,
            "char8_t" => Keyword::Char8,
            "char16_t" => Keyword::Char16,
            "char32_t" => Keyword::Char32,
            "class" => Keyword::Class,
            "const" => Keyword::Const,
            "consteval" => Keyword::Consteval,
            "constexpr" => Keyword::Constexpr,
            "constinit" => Keyword::Constinit,
            "const_cast" => Keyword::ConstCast,
            "continue" => Keyword::Continue,
            "decltype" => Keyword::Decltype,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "do" => Keyword::Do,
            "double" => Keyword::Double,
            "dynamic_cast" => Keyword::DynamicCast,
            "else" => Keyword::Else,
            "enum" => Keyword::Enum,
            "explicit" => Keyword::Explicit,
            "extern" => Keyword::Extern,
            "false" => Keyword::False,
            "float" => Keyword::Float,
            "for" => Keyword::For,
            "friend" => Keyword::Friend,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "inline" => Keyword::Inline,
            "int" => Keyword::Int,
            "long" => Keyword::Long,
            "mutable" => Keyword::Mutable,
            "namespace" => Keyword::Namespace,
            "new" => Keyword::New,
            "noexcept" => Keyword::Noexcept,
            "nullptr" => Keyword::Nullptr,
            "operator" => Keyword::Operator,
            "private" => Keyword::Private,
            "protected" => Keyword::Protected,
            "public" => Keyword::Public,
            "register" => Keyword::Register,
            "reinterpret_cast" => Keyword::ReinterpretCast,
            "return" => Keyword::Return,
            "short" => Keyword::Short,
            "signed" => Keyword::Signed,
            "sizeof" => Keyword::Sizeof,
            "static" => Keyword::Static,
            "static_assert" => Keyword::StaticAssert,
            "static_cast" => Keyword::StaticCast,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "template" => Keyword::Template,
            "this" => Keyword::This,
            "thread_local" => Keyword::ThreadLocal,
            "throw" => Keyword::Throw,
            "true" => Keyword::True,
            "try" => Keyword::Try,
            "typedef" => Keyword::Typedef,
            "typeid" => Keyword::Typeid,
            "typename" => Keyword::Typename,
            "union" => Keyword::Union,
            "unsigned" => Keyword::Unsigned,
            "using" => Keyword::Using,
            "virtual" => Keyword::Virtual,
            "void" => Keyword::Void,
            "volatile" => Keyword::Volatile,
            "wchar_t" => Keyword::WcharT,
            "while" => Keyword::While,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Alignas => "alignas",
            Keyword::Alignof => "alignof",
            Keyword::Auto => "auto",
            Keyword::Bool => "bool",
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Catch => "catch",
            Keyword::Char => "char",
            Keyword::Char8 => "char8_t",
            Keyword::Char16 => "char16_t",
            Keyword::Char32 => "char32_t",
            Keyword::Class => "class",
            Keyword::Const => "const",
            Keyword::Consteval => "consteval",
            Keyword::Constexpr => "constexpr",
            Keyword::Constinit => "constinit",
            Keyword::ConstCast => "const_cast",
            Keyword::Continue => "continue",
            Keyword::Decltype => "decltype",
            Keyword::Default => "default",
            Keyword::Delete => "delete",
            Keyword::Do => "do",
            Keyword::Double => "double",
            Keyword::DynamicCast => "dynamic_cast",
            Keyword::Else => "else",
            Keyword::Enum => "enum",
            Keyword::Explicit => "explicit",
            Keyword::Extern => "extern",
            Keyword::False => "false",
            Keyword::Float => "float",
            Keyword::For => "for",
            Keyword::Friend => "friend",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::Inline => "inline",
            Keyword::Int => "int",
            Keyword::Long => "long",
            Keyword::Mutable => "mutable",
            Keyword::Namespace => "namespace",
            Keyword::New => "new",
            Keyword::Noexcept => "noexcept",
            Keyword::Nullptr => "nullptr",
            Keyword::Operator => "operator",
            Keyword::Private => "private",
            Keyword::Protected => "protected",
            Keyword::Public => "public",
            Keyword::Register => "register",
            Keyword::ReinterpretCast => "reinterpret_cast",
            Keyword::Return => "return",
            Keyword::Short => "short",
            Keyword::Signed => "signed",
            Keyword::Sizeof => "sizeof",
            Keyword::Static => "static",
            Keyword::StaticAssert => "static_assert",
            Keyword::StaticCast => "static_cast",
            Keyword::Struct => "struct",
            Keyword::Switch => "switch",
            Keyword::Template => "template",
            Keyword::This => "this",
            Keyword::ThreadLocal => "thread_local",
            Keyword::Throw => "throw",
            Keyword::True => "true",
            Keyword::Try => "try",
            Keyword::Typedef => "typedef",
            Keyword::Typeid => "typeid",
            Keyword::Typename => "typename",
            Keyword::Union => "union",
            Keyword::Unsigned => "unsigned",
            Keyword::Using => "using",
            Keyword::Virtual => "virtual",
            Keyword::Void => "void",
            Keyword::Volatile => "volatile",
            Keyword::WcharT => "wchar_t",
            Keyword::While => "while",
        }
    }

    /// Keywords that can appear in a builtin type's keyword sequence
    pub fn is_builtin_type(self) -> bool {
        matches!(
            self,
            Keyword::Bool
                | Keyword::Char
                | Keyword::Char8
                | Keyword::Char16
                | Keyword::Char32
                | Keyword::Double
                | Keyword::Float
                | Keyword::Int
                | Keyword::Long
                | Keyword::Short
                | Keyword::Signed
                | Keyword::Unsigned
                | Keyword::Void
                | Keyword::WcharT
        )
    }
}

/// Operators and punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Colon,     // :
    ColonColon,
    Dot,
    DotStar,  // .*
    Ellipsis, // ...
    Arrow,    // ->
    ArrowStar,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Bang,
    Eq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    Spaceship, // <=>
    AndAnd,
    OrOr,
    PlusPlus,
    MinusMinus,
    Shl,
    ShlEq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    CaretEq,
    AmpEq,
    PipeEq,
}

impl Punct {
    pub fn as_str(self) -> &'static str {
        match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Semicolon => ";",
            Punct::Comma => ",",
            Punct::Colon => ":",
            Punct::ColonColon => "::",
            Punct::Dot => ".",
            Punct::DotStar => ".*",
            Punct::Ellipsis => "...",
            Punct::Arrow => "->",
            Punct::ArrowStar => "->*",
            Punct::Question => "?",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Caret => "^",
            Punct::Amp => "&",
            Punct::Pipe => "|",
            Punct::Tilde => "~",
            Punct::Bang => "!",
            Punct::Eq => "=",
            Punct::Lt => "<",
            Punct::Gt => ">",
            Punct::LtEq => "<=",
            Punct::GtEq => ">=",
            Punct::EqEq => "==",
            Punct::NotEq => "!=",
            Punct::Spaceship => "<=>",
            Punct::AndAnd => "&&",
            Punct::OrOr => "||",
            Punct::PlusPlus => "++",
            Punct::MinusMinus => "--",
            Punct::Shl => "<<",
            Punct::ShlEq => "<<=",
            Punct::PlusEq => "+=",
            Punct::MinusEq => "-=",
            Punct::StarEq => "*=",
            Punct::SlashEq => "/=",
            Punct::PercentEq => "%=",
            Punct::CaretEq => "^=",
            Punct::AmpEq => "&=",
            Punct::PipeEq => "|=",
        }
    }
}

/// All token variants produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    Punct(Punct),

    // Literals keep their exact spelling, prefixes and suffixes included
    IntLiteral(String),
    FloatLiteral(String),
    CharLiteral(String),
    StringLiteral(String),

    /// Whole preprocessor line, `#` included
    Directive(String),

    Eof,
}

impl TokenKind {
    /// Source spelling of the token
    pub fn spelling(&self) -> &str {
        match self {
            TokenKind::Ident(s)
            | TokenKind::IntLiteral(s)
            | TokenKind::FloatLiteral(s)
            | TokenKind::CharLiteral(s)
            | TokenKind::StringLiteral(s)
            | TokenKind::Directive(s) => s,
            TokenKind::Keyword(kw) => kw.as_str(),
            TokenKind::Punct(p) => p.as_str(),
            TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            TokenKind::Punct(p) => write!(f, "'{}'", p.as_str()),
            TokenKind::IntLiteral(s) => write!(f, "integer literal {}", s),
            TokenKind::FloatLiteral(s) => write!(f, "floating literal {}", s),
            TokenKind::CharLiteral(s) => write!(f, "character literal {}", s),
            TokenKind::StringLiteral(s) => write!(f, "string literal {}", s),
            TokenKind::Directive(_) => write!(f, "preprocessor directive"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token together with its location and surrounding trivia
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    /// The next token starts immediately after this one
    pub joint: bool,
    pub leading_comments: Vec<String>,
    pub trailing_comment: Option<String>,
    pub blank_line_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Token {
            kind,
            location,
            joint: false,
            leading_comments: Vec::new(),
            trailing_comment: None,
            blank_line_before: false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("Lexer error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C++ source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    /// Only whitespace seen since the last newline
    at_line_start: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            let trivia = self.skip_whitespace_and_comments(&mut tokens)?;

            let mut token = if self.is_at_end() {
                Token::new(TokenKind::Eof, self.current_location())
            } else if self.peek() == Some('#') && self.at_line_start {
                self.preprocessor_directive()
            } else {
                self.next_token()?
            };
            token.leading_comments = trivia.comments;
            token.blank_line_before = trivia.blank_line;
            token.joint = matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '/');

            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        self.at_line_start = false;
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let kind = match ch {
            '"' => self.quoted_literal('"', String::new(), loc)?,
            '\'' => self.quoted_literal('\'', String::new(), loc)?,
            '0'..='9' => self.number_literal(ch),
            '.' if matches!(self.peek(), Some(c) if c.is_ascii_digit()) => self.number_literal(ch),
            c if c.is_alphabetic() || c == '_' || c == '$' => self.identifier_or_keyword(ch, loc)?,
            _ => TokenKind::Punct(self.punctuation(ch, loc)?),
        };

        Ok(Token::new(kind, loc))
    }

    fn punctuation(&mut self, ch: char, loc: SourceLocation) -> Result<Punct, LexError> {
        let punct = match ch {
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            ';' => Punct::Semicolon,
            ',' => Punct::Comma,
            '?' => Punct::Question,
            '~' => Punct::Tilde,
            ':' => {
                if self.eat(':') {
                    Punct::ColonColon
                } else {
                    Punct::Colon
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Punct::Ellipsis
                } else if self.eat('*') {
                    Punct::DotStar
                } else {
                    Punct::Dot
                }
            }
            '+' => {
                if self.eat('+') {
                    Punct::PlusPlus
                } else if self.eat('=') {
                    Punct::PlusEq
                } else {
                    Punct::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    Punct::MinusMinus
                } else if self.eat('=') {
                    Punct::MinusEq
                } else if self.eat('>') {
                    if self.eat('*') {
                        Punct::ArrowStar
                    } else {
                        Punct::Arrow
                    }
                } else {
                    Punct::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    Punct::StarEq
                } else {
                    Punct::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    Punct::SlashEq
                } else {
                    Punct::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    Punct::PercentEq
                } else {
                    Punct::Percent
                }
            }
            '^' => {
                if self.eat('=') {
                    Punct::CaretEq
                } else {
                    Punct::Caret
                }
            }
            '=' => {
                if self.eat('=') {
                    Punct::EqEq
                } else {
                    Punct::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    Punct::NotEq
                } else {
                    Punct::Bang
                }
            }
            '<' => {
                if self.peek() == Some('=') && self.peek_ahead(1) == Some('>') {
                    self.advance();
                    self.advance();
                    Punct::Spaceship
                } else if self.eat('=') {
                    Punct::LtEq
                } else if self.eat('<') {
                    if self.eat('=') {
                        Punct::ShlEq
                    } else {
                        Punct::Shl
                    }
                } else {
                    Punct::Lt
                }
            }
            // `>>` stays two tokens; see module docs
            '>' => {
                if self.peek() != Some('>') && self.eat('=') {
                    Punct::GtEq
                } else {
                    Punct::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    Punct::AndAnd
                } else if self.eat('=') {
                    Punct::AmpEq
                } else {
                    Punct::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    Punct::OrOr
                } else if self.eat('=') {
                    Punct::PipeEq
                } else {
                    Punct::Pipe
                }
            }
            _ => {
                return Err(LexError {
                    message: format!("Unexpected character: '{}'", ch),
                    location: loc,
                });
            }
        };
        Ok(punct)
    }

    /// Character or string literal; the opening quote is already consumed
    fn quoted_literal(
        &mut self,
        quote: char,
        prefix: String,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut text = prefix;
        text.push(quote);

        loop {
            match self.peek() {
                None | Some('\n') => {
                    let what = if quote == '"' { "string" } else { "character" };
                    return Err(LexError {
                        message: format!("Unterminated {} literal", what),
                        location: loc,
                    });
                }
                Some('\\') => {
                    self.advance();
                    text.push('\\');
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                    if c == quote {
                        break;
                    }
                }
            }
        }

        self.literal_suffix(&mut text);
        Ok(if quote == '"' {
            TokenKind::StringLiteral(text)
        } else {
            TokenKind::CharLiteral(text)
        })
    }

    /// Raw string `R"delim( ... )delim"`; the opening quote is already consumed
    fn raw_string_literal(&mut self, prefix: String, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut text = prefix;
        text.push('"');

        let mut delimiter = String::new();
        loop {
            match self.advance() {
                Some('(') => break,
                Some(c) if delimiter.len() < 16 && !c.is_whitespace() && c != ')' && c != '\\' => {
                    delimiter.push(c)
                }
                _ => {
                    return Err(LexError {
                        message: "Invalid raw string delimiter".to_string(),
                        location: loc,
                    });
                }
            }
        }
        text.push_str(&delimiter);
        text.push('(');

        let terminator: Vec<char> = format!("){}\"", delimiter).chars().collect();
        loop {
            if self.is_at_end() {
                return Err(LexError {
                    message: "Unterminated raw string literal".to_string(),
                    location: loc,
                });
            }
            if self.input[self.position..].starts_with(&terminator) {
                for _ in 0..terminator.len() {
                    self.advance();
                }
                text.extend(terminator.iter());
                break;
            }
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }

        self.literal_suffix(&mut text);
        Ok(TokenKind::StringLiteral(text))
    }

    /// User-defined literal suffix directly after a literal
    fn literal_suffix(&mut self, text: &mut String) {
        if matches!(self.peek(), Some(c) if c.is_alphabetic() || c == '_') {
            while let Some(c) = self.peek() {
                if c.is_alphanumeric() || c == '_' {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
    }

    /// Parse numeric literal (integer or floating, any base, with suffixes)
    fn number_literal(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);
        let hex = first == '0' && matches!(self.peek(), Some('x') | Some('X'));
        let binary = first == '0' && matches!(self.peek(), Some('b') | Some('B'));

        while let Some(ch) = self.peek() {
            let last = text.chars().last();
            let exponent_sign = (ch == '+' || ch == '-')
                && if hex {
                    matches!(last, Some('p') | Some('P'))
                } else {
                    matches!(last, Some('e') | Some('E'))
                };

            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                text.push(ch);
                self.advance();
            } else if ch == '\'' && matches!(self.peek_ahead(1), Some(c) if c.is_ascii_alphanumeric()) {
                // digit separator
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let is_float = if hex {
            text.contains(['.', 'p', 'P'])
        } else if binary {
            false
        } else {
            text.contains('.') || has_decimal_exponent(&text)
        };

        if is_float {
            TokenKind::FloatLiteral(text)
        } else {
            TokenKind::IntLiteral(text)
        }
    }

    /// Parse identifier, keyword, or a prefixed character/string literal
    fn identifier_or_keyword(
        &mut self,
        first_char: char,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match (ident.as_str(), self.peek()) {
            ("u8" | "u" | "U" | "L", Some(q @ ('"' | '\''))) => {
                self.advance();
                return self.quoted_literal(q, ident, loc);
            }
            ("R" | "u8R" | "uR" | "UR" | "LR", Some('"')) => {
                self.advance();
                return self.raw_string_literal(ident, loc);
            }
            _ => {}
        }

        Ok(match Keyword::from_ident(&ident) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(ident),
        })
    }

    /// Whole preprocessor line including backslash continuations
    fn preprocessor_directive(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            if ch == '\\' && self.peek_ahead(1) == Some('\n') {
                text.push_str("\\\n");
                self.advance();
                self.advance();
                continue;
            }
            if ch == '\\' && self.peek_ahead(1) == Some('\r') && self.peek_ahead(2) == Some('\n') {
                text.push_str("\\\n");
                self.advance();
                self.advance();
                self.advance();
                continue;
            }
            text.push(ch);
            self.advance();
        }

        Token::new(TokenKind::Directive(text.trim_end().to_string()), loc)
    }

    /// Skip whitespace and comments, collecting comments as trivia.
    ///
    /// A comment that starts on the line of the previous token becomes that
    /// token's trailing comment.
    fn skip_whitespace_and_comments(&mut self, tokens: &mut [Token]) -> Result<Trivia, LexError> {
        let mut trivia = Trivia::default();
        let mut newlines = 0usize;

        loop {
            match self.peek() {
                Some('\n') => {
                    self.advance();
                    newlines += 1;
                    if newlines >= 2 {
                        trivia.blank_line = true;
                    }
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                // line splice outside a directive
                Some('\\') if self.peek_ahead(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                Some('/') if matches!(self.peek_ahead(1), Some('/') | Some('*')) => {
                    let comment = if self.peek_ahead(1) == Some('/') {
                        self.line_comment()
                    } else {
                        self.block_comment()?
                    };

                    let same_line = newlines == 0 && trivia.comments.is_empty();
                    match tokens.last_mut() {
                        Some(prev) if same_line && prev.trailing_comment.is_none() => {
                            prev.trailing_comment = Some(comment);
                        }
                        _ => {
                            if newlines >= 2 {
                                trivia.blank_line = true;
                            }
                            trivia.comments.push(comment);
                        }
                    }
                    newlines = 0;
                }
                _ => break,
            }
        }

        if newlines >= 2 {
            trivia.blank_line = true;
        }
        Ok(trivia)
    }

    /// Single-line comment (// ...), newline excluded
    fn line_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text.trim_end().to_string()
    }

    /// Multi-line comment (/* ... */)
    fn block_comment(&mut self) -> Result<String, LexError> {
        let start_loc = self.current_location();
        let mut text = String::from("/*");
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                text.push_str("*/");
                return Ok(text);
            }
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// `1e5`, `2.5E-3`: an `e` between a digit and a digit or sign
fn has_decimal_exponent(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(3).any(|w| {
        w[0].is_ascii_digit()
            && (w[1] == 'e' || w[1] == 'E')
            && (w[2].is_ascii_digit() || w[2] == '+' || w[2] == '-')
    })
}

#[derive(Default)]
struct Trivia {
    comments: Vec<String>,
    blank_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("int main() { return 0; }");

        assert_eq!(tokens[0], TokenKind::Keyword(Keyword::Int));
        assert_eq!(tokens[1], TokenKind::Ident("main".into()));
        assert_eq!(tokens[2], TokenKind::Punct(Punct::LParen));
        assert_eq!(tokens[3], TokenKind::Punct(Punct::RParen));
        assert_eq!(tokens[4], TokenKind::Punct(Punct::LBrace));
        assert_eq!(tokens[5], TokenKind::Keyword(Keyword::Return));
        assert_eq!(tokens[6], TokenKind::IntLiteral("0".into()));
        assert_eq!(tokens[7], TokenKind::Punct(Punct::Semicolon));
        assert_eq!(tokens[8], TokenKind::Punct(Punct::RBrace));
        assert_eq!(tokens[9], TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("++ -- += -= == != && || :: -> ->* .* ... <=> <<=");
        let expected = [
            Punct::PlusPlus,
            Punct::MinusMinus,
            Punct::PlusEq,
            Punct::MinusEq,
            Punct::EqEq,
            Punct::NotEq,
            Punct::AndAnd,
            Punct::OrOr,
            Punct::ColonColon,
            Punct::Arrow,
            Punct::ArrowStar,
            Punct::DotStar,
            Punct::Ellipsis,
            Punct::Spaceship,
            Punct::ShlEq,
        ];
        for (token, punct) in tokens.iter().zip(expected) {
            assert_eq!(*token, TokenKind::Punct(punct));
        }
    }

    #[test]
    fn test_shift_right_is_split() {
        let tokens = Lexer::new("a >> b >>= c").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Punct(Punct::Gt));
        assert!(tokens[1].joint);
        assert_eq!(tokens[2].kind, TokenKind::Punct(Punct::Gt));
        assert_eq!(tokens[4].kind, TokenKind::Punct(Punct::Gt));
        assert!(tokens[4].joint);
        assert_eq!(tokens[5].kind, TokenKind::Punct(Punct::GtEq));
    }

    #[test]
    fn test_comments_become_trivia() {
        let tokens =
            Lexer::new("int x; // note\n\n/* block\ncomment */ int z;").tokenize().unwrap();

        assert_eq!(tokens[2].trailing_comment.as_deref(), Some("// note"));
        assert_eq!(tokens[3].kind, TokenKind::Keyword(Keyword::Int));
        assert_eq!(tokens[3].leading_comments, vec!["/* block\ncomment */".to_string()]);
        assert!(tokens[3].blank_line_before);
    }

    #[test]
    fn test_literals_keep_spelling() {
        let tokens = kinds(r#"0x1Fu 1'000'000 3.14f 1e-5 .5 'a' L"wide" u8"x" "s"sv 10ms"#);
        assert_eq!(tokens[0], TokenKind::IntLiteral("0x1Fu".into()));
        assert_eq!(tokens[1], TokenKind::IntLiteral("1'000'000".into()));
        assert_eq!(tokens[2], TokenKind::FloatLiteral("3.14f".into()));
        assert_eq!(tokens[3], TokenKind::FloatLiteral("1e-5".into()));
        assert_eq!(tokens[4], TokenKind::FloatLiteral(".5".into()));
        assert_eq!(tokens[5], TokenKind::CharLiteral("'a'".into()));
        assert_eq!(tokens[6], TokenKind::StringLiteral("L\"wide\"".into()));
        assert_eq!(tokens[7], TokenKind::StringLiteral("u8\"x\"".into()));
        assert_eq!(tokens[8], TokenKind::StringLiteral("\"s\"sv".into()));
        assert_eq!(tokens[9], TokenKind::IntLiteral("10ms".into()));
    }

    #[test]
    fn test_raw_string() {
        let tokens = kinds(r#"R"xy(a ")" b)xy";"#);
        assert_eq!(tokens[0], TokenKind::StringLiteral(r#"R"xy(a ")" b)xy""#.into()));
        assert_eq!(tokens[1], TokenKind::Punct(Punct::Semicolon));
    }

    #[test]
    fn test_preprocessor_passthrough() {
        let tokens = kinds("#include <stdio.h>\n#define MAX(a, b) \\\n  ((a) > (b))\nint x;");

        assert_eq!(tokens[0], TokenKind::Directive("#include <stdio.h>".into()));
        assert_eq!(
            tokens[1],
            TokenKind::Directive("#define MAX(a, b) \\\n  ((a) > (b))".into())
        );
        assert_eq!(tokens[2], TokenKind::Keyword(Keyword::Int));
    }

    #[test]
    fn test_unterminated_string_reports_start() {
        let err = Lexer::new("int x;\nconst char* s = \"abc").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 17));
    }

    #[test]
    fn test_hash_mid_line_is_error() {
        assert!(Lexer::new("int x = # 3;").tokenize().is_err());
    }
}
