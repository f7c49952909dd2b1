//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the parse entry points.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, cursor helpers, speculation and coordination
//! - `declarations`: namespaces, classes, enums, templates, functions, variables
//! - `types`: declaration specifiers, declarators, qualified names, template arguments
//! - `statements`: statements and the declaration/expression statement split
//! - `expressions`: expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! # Speculation
//!
//! C++ needs unbounded lookahead to tell declarations from expressions. Every
//! ambiguous production is tried through [`Parser::speculate`], which saves
//! the token cursor (a plain index) and rolls it back on failure together
//! with any type names registered during the attempt.

use crate::error::Error;
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, LexError, Lexer, Punct, Token, TokenKind};
use crate::parser::names::BUILTIN_TYPEDEFS;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at {location}: expected {expected}, found {found}")]
pub struct ParseError {
    pub location: SourceLocation,
    /// The construct the parser was trying to complete
    pub expected: String,
    /// Description of the offending token
    pub found: String,
}

impl ParseError {
    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            location: err.location,
            expected: "a valid token".to_string(),
            found: err.message,
        }
    }
}

/// Deepest nesting of expressions, statements and declarations accepted
pub const MAX_NESTING_DEPTH: usize = 256;

/// Where a declaration appears; changes which forms are allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclContext {
    Namespace,
    Class,
    Block,
}

/// Recursive descent parser for C++ translation units
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Names declared so far as classes, enums, typedefs, aliases or
    /// template type parameters
    pub(crate) known_types: FxHashSet<String>,
    /// Insertion log for `known_types`, truncated when speculation fails
    pub(crate) type_journal: Vec<String>,
    /// Names of the enclosing class definitions, innermost last
    pub(crate) class_stack: Vec<String>,
    /// A bare `>` ends the current template argument list
    pub(crate) in_template_args: bool,
    /// Expressions, statements and declarations currently open
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        trace!(count = tokens.len(), "tokenized source");

        let known_types = BUILTIN_TYPEDEFS.iter().map(|s| s.to_string()).collect();
        Ok(Self {
            tokens,
            position: 0,
            known_types,
            type_journal: Vec::new(),
            class_stack: Vec::new(),
            in_template_args: false,
            depth: 0,
        })
    }

    /// Parser that already knows the given type names
    pub fn with_known_types(source: &str, known: &FxHashSet<String>) -> Result<Self, ParseError> {
        let mut parser = Parser::new(source)?;
        parser.known_types.extend(known.iter().cloned());
        Ok(parser)
    }

    /// Parse the entire translation unit (top-level declarations)
    pub fn parse_program(&mut self) -> Result<ProgramUnit, ParseError> {
        let mut unit = ProgramUnit::new();

        while !self.is_at_end() {
            if let Some(decl) = self.parse_declaration(DeclContext::Namespace)? {
                unit.declarations.push(decl);
            }
        }
        unit.closing_comments = self.peek().leading_comments.clone();

        debug!(
            declarations = unit.declarations.len(),
            known_types = self.known_types.len(),
            "parsed translation unit"
        );
        Ok(unit)
    }

    // ===== Speculation =====

    /// Run `f`; on failure restore the cursor and parser state and return the error
    pub(crate) fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let position = self.position;
        let journal = self.type_journal.len();
        let classes = self.class_stack.len();
        let in_template_args = self.in_template_args;

        let result = f(self);
        if result.is_err() {
            self.position = position;
            for name in self.type_journal.drain(journal..) {
                self.known_types.remove(&name);
            }
            self.class_stack.truncate(classes);
        }
        self.in_template_args = in_template_args;
        result
    }

    /// Like [`Parser::speculate`], discarding the error
    pub(crate) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Option<T> {
        self.speculate(f).ok()
    }

    /// Run `f` without consuming anything, reporting whether it succeeded
    pub(crate) fn lookahead(&mut self, f: impl FnOnce(&mut Self) -> Result<(), ParseError>) -> bool {
        let mut matched = false;
        let _ = self.speculate(|p| -> Result<(), ParseError> {
            f(p)?;
            matched = true;
            Err(p.error_here("end of lookahead"))
        });
        matched
    }

    /// Run `f` with `>` treated as a closing template bracket (or not)
    pub(crate) fn with_template_args<T>(
        &mut self,
        in_template_args: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = std::mem::replace(&mut self.in_template_args, in_template_args);
        let result = f(self);
        self.in_template_args = saved;
        result
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here("nesting depth limit"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn declare_type(&mut self, name: &str) {
        if self.known_types.insert(name.to_string()) {
            trace!(name, "registered type name");
            self.type_journal.push(name.to_string());
        }
    }

    pub(crate) fn is_known_type(&self, name: &str) -> bool {
        self.known_types.contains(name)
    }

    // ===== Metadata =====

    /// Formatting metadata taken from the current token
    pub(crate) fn start_meta(&self) -> NodeMeta {
        let token = self.peek();
        NodeMeta {
            location: token.location,
            leading_comments: token.leading_comments.clone(),
            trailing_comment: None,
            blank_line_before: token.blank_line_before,
        }
    }

    /// Trailing comment of the token just consumed
    pub(crate) fn trailing_comment(&self) -> Option<String> {
        if self.position == 0 {
            return None;
        }
        self.previous().trailing_comment.clone()
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)].kind
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn check_punct(&self, punct: Punct) -> bool {
        matches!(self.peek_kind(), TokenKind::Punct(p) if *p == punct)
    }

    pub(crate) fn check_punct_ahead(&self, n: usize, punct: Punct) -> bool {
        matches!(self.peek_ahead(n), TokenKind::Punct(p) if *p == punct)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    pub(crate) fn check_keyword_ahead(&self, n: usize, keyword: Keyword) -> bool {
        matches!(self.peek_ahead(n), TokenKind::Keyword(k) if *k == keyword)
    }

    /// Current token is the contextual keyword `word` (`override`, `final`)
    pub(crate) fn check_contextual(&self, word: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(s) if s == word)
    }

    pub(crate) fn check_ident(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(_))
    }

    pub(crate) fn match_punct(&mut self, punct: Punct) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_contextual(&mut self, word: &str) -> bool {
        if self.check_contextual(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Error pointing at the current token
    pub(crate) fn error_here(&self, expected: impl Into<String>) -> ParseError {
        ParseError {
            location: self.current_location(),
            expected: expected.into(),
            found: self.peek().to_string(),
        }
    }

    pub(crate) fn expect_punct(&mut self, punct: Punct, ctx: &str) -> Result<(), ParseError> {
        if self.match_punct(punct) {
            Ok(())
        } else {
            Err(self.error_here(format!("'{}' {}", punct.as_str(), ctx)))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword, ctx: &str) -> Result<(), ParseError> {
        if self.match_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error_here(format!("'{}' {}", keyword.as_str(), ctx)))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct(Punct::Semicolon, ctx)
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(format!("identifier {}", ctx)))
        }
    }

    /// Consume the `>` closing a template argument or parameter list
    pub(crate) fn expect_template_close(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct(Punct::Gt, ctx)
    }
}

/// Parse C++ source text into a program unit
pub fn parse_str(source: &str) -> Result<ProgramUnit, ParseError> {
    Parser::new(source)?.parse_program()
}

/// Read and parse a translation unit from disk.
///
/// The whole file is read before parsing starts. On failure no unit is
/// returned; I/O and syntax failures are reported as distinct [`Error`]
/// variants.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ProgramUnit, Error> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = source.len(), "read translation unit");
    parse_str(&source).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let source = "int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_program().unwrap();

        assert_eq!(unit.declarations.len(), 1);
        match &unit.declarations[0].kind {
            DeclKind::Function(func) => {
                assert_eq!(func.name, QualifiedName::simple("main"));
                assert!(func.params.is_empty());
                assert_eq!(func.specifiers.ty, Some(TypeSpec::builtin(&["int"])));
                match &func.body {
                    FunctionBody::Defined(block) => assert_eq!(block.statements.len(), 1),
                    other => panic!("Expected function body, got {:?}", other),
                }
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_struct() {
        let source = "struct Point { int x; int y; };";
        let unit = parse_str(source).unwrap();

        assert_eq!(unit.declarations.len(), 1);
        match &unit.declarations[0].kind {
            DeclKind::Class(class) => {
                assert_eq!(class.key, ClassKey::Struct);
                assert_eq!(class.name, Some(QualifiedName::simple("Point")));
                assert_eq!(class.members.as_ref().map(Vec::len), Some(2));
            }
            other => panic!("Expected struct definition, got {:?}", other),
        }
    }

    #[test]
    fn test_speculation_rolls_back_type_names() {
        let mut parser = Parser::new("struct Hidden {}; x").unwrap();
        let result: Result<(), ParseError> = parser.speculate(|p| {
            p.parse_declaration(DeclContext::Namespace)?;
            Err(p.error_here("nothing"))
        });

        assert!(result.is_err());
        assert_eq!(parser.position, 0);
        assert!(!parser.is_known_type("Hidden"));
    }

    #[test]
    fn test_error_reports_expected_and_found() {
        let err = parse_str("int x = ;").unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 9);
        assert_eq!(err.found, "';'");
    }

    #[test]
    fn test_lex_error_becomes_parse_error() {
        let err = parse_str("int x = 'a;").unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 9));
    }

    #[test]
    fn test_comments_attach_to_declarations() {
        let source = "// counter\nint count = 0; // starts at zero\n\nint other;\n// end\n";
        let unit = parse_str(source).unwrap();

        let first = &unit.declarations[0].meta;
        assert_eq!(first.leading_comments, vec!["// counter".to_string()]);
        assert_eq!(first.trailing_comment.as_deref(), Some("// starts at zero"));
        assert!(unit.declarations[1].meta.blank_line_before);
        assert_eq!(unit.closing_comments, vec!["// end".to_string()]);
    }

    /// Parse on a thread with stack room for the deepest accepted nesting
    fn parse_deep(source: String) -> Result<ProgramUnit, ParseError> {
        std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(move || parse_str(&source))
            .unwrap()
            .join()
            .unwrap()
    }

    fn parens(depth: usize) -> String {
        format!("int x = {}1{};", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_depth_limit() {
        let err = parse_deep(parens(1000)).unwrap_err();
        assert_eq!(err.expected, "nesting depth limit");
        assert_eq!(err.line(), 1);

        let blocks = format!("void f() {}{}", "{".repeat(1000), "}".repeat(1000));
        let err = parse_deep(blocks).unwrap_err();
        assert_eq!(err.expected, "nesting depth limit");

        let namespaces = format!("{}{}", "namespace n {".repeat(300), "}".repeat(300));
        let err = parse_deep(namespaces).unwrap_err();
        assert_eq!(err.expected, "nesting depth limit");
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let unit = parse_deep(parens(100)).unwrap();
        let DeclKind::Variable(var) = &unit.declarations[0].kind else {
            panic!("Expected variable");
        };
        assert_eq!(var.declarators[0].init, Some(Initializer::Assign(Expr::int("1"))));

        let blocks = format!("void f() {}{}", "{".repeat(100), "}".repeat(100));
        assert!(parse_deep(blocks).is_ok());
    }
}
