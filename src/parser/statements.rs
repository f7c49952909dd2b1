//! Statement parsing implementation
//!
//! This module handles parsing of all C++ statement types:
//!
//! - Declarations at block scope: `int x = 42;`, `auto [a, b] = pair;`
//! - Control flow: `if` (with `constexpr` and init-statements), `while`,
//!   `for`, range-based `for`, `do-while`, `switch`
//! - Labels: `case`, `default`, `name:`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - `try` / `catch`
//! - Compound statements and expression statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= decl_stmt | if_stmt | while_stmt | for_stmt | range_for
//!             | do_while_stmt | switch_stmt | case | default | label
//!             | return_stmt | break_stmt | continue_stmt | goto_stmt
//!             | try_block | block | expr_stmt
//! ```
//!
//! A statement that starts with a name may be a declaration or an
//! expression. The declaration reading wins whenever it is plausible; see
//! [`plausible_declarator`].
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use rustc_hash::FxHashSet;

use super::parse::{DeclContext, ParseError, Parser};
use super::types::{starts_declaration, DeclaratorMode};
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Punct, TokenKind};

/// How the first token of a statement classifies it
enum StatementStart {
    Declaration,
    Expression,
    /// Either reading is possible; try the declaration first
    Ambiguous,
}

/// Could `declarator` follow a type name that might also be a variable?
///
/// `a b`, `a* b` and `a (*b)(int)` only make sense as declarations; a
/// reference declarator needs an initializer before it is preferred over
/// `a & b`.
pub(crate) fn plausible_declarator(declarator: &Declarator) -> bool {
    match &declarator.direct {
        DirectDeclarator::Name(_) => true,
        DirectDeclarator::Nested(inner) => !inner.ptr_ops.is_empty() && !declarator.suffixes.is_empty(),
        DirectDeclarator::Abstract | DirectDeclarator::Bindings(_) => false,
    }
}

fn has_reference(declarator: &Declarator) -> bool {
    declarator
        .ptr_ops
        .iter()
        .any(|op| matches!(op, PtrOp::LRef | PtrOp::RRef))
}

/// Would `text` parse as a declaration statement, given the known type names?
pub(crate) fn reads_as_declaration(text: &str, known_types: &FxHashSet<String>) -> bool {
    let Ok(mut parser) = Parser::with_known_types(text, known_types) else {
        return false;
    };
    matches!(
        parser.parse_statement(),
        Ok(Statement {
            kind: StmtKind::Declaration(_),
            ..
        })
    )
}

/// The error that got further into the input
fn further(a: ParseError, b: ParseError) -> ParseError {
    let key = |e: &ParseError| (e.location.line, e.location.column);
    if key(&b) > key(&a) {
        b
    } else {
        a
    }
}

impl Parser {
    /// Parse a brace-enclosed block
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect_punct(Punct::LBrace, "to open block")?;
        let opening_comment = self.trailing_comment();

        let mut statements = self.with_template_args(false, |p| {
            let mut statements = Vec::new();
            while !p.check_punct(Punct::RBrace) && !p.is_at_end() {
                statements.push(p.parse_statement()?);
            }
            Ok(statements)
        })?;

        let mut closing_comments = self.peek().leading_comments.clone();
        self.expect_punct(Punct::RBrace, "to close block")?;

        if let Some(comment) = opening_comment {
            match statements.first_mut() {
                Some(first) => first.meta.leading_comments.insert(0, comment),
                None => closing_comments.insert(0, comment),
            }
        }
        Ok(Block {
            statements,
            closing_comments,
        })
    }

    /// Parse a statement
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.nested(Self::parse_statement_here)
    }

    fn parse_statement_here(&mut self) -> Result<Statement, ParseError> {
        let mut meta = self.start_meta();

        let kind = match self.peek_kind().clone() {
            TokenKind::Directive(text) => {
                self.advance();
                let decl = Declaration::new(DeclKind::Preprocessor(text), NodeMeta::at(meta.location));
                StmtKind::Declaration(Box::new(decl))
            }
            TokenKind::Punct(Punct::LBrace) => StmtKind::Compound(self.parse_block()?),
            TokenKind::Punct(Punct::Semicolon) => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement()?,
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement()?,
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while_statement()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement()?,
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch_statement()?,
            TokenKind::Keyword(Keyword::Try) => self.parse_try_statement()?,
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let value = if self.check_punct(Punct::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression_or_braced()?)
                };
                self.expect_semicolon("after return statement")?;
                StmtKind::Return(value)
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                self.expect_semicolon("after 'break'")?;
                StmtKind::Break
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                self.expect_semicolon("after 'continue'")?;
                StmtKind::Continue
            }
            TokenKind::Keyword(Keyword::Goto) => {
                self.advance();
                let label = self.expect_identifier("after 'goto'")?;
                self.expect_semicolon("after goto statement")?;
                StmtKind::Goto(label)
            }
            TokenKind::Keyword(Keyword::Case) => {
                self.advance();
                let value = self.parse_conditional()?;
                self.expect_punct(Punct::Colon, "after case value")?;
                StmtKind::Case(value)
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                self.expect_punct(Punct::Colon, "after 'default'")?;
                StmtKind::Default
            }
            TokenKind::Ident(label) if self.check_punct_ahead(1, Punct::Colon) => {
                self.advance();
                self.advance();
                StmtKind::Label(label)
            }
            _ => return self.parse_declaration_or_expression(),
        };

        // Statements ending in a sub-statement leave the comment to it
        let wraps_body = matches!(
            kind,
            StmtKind::If { .. }
                | StmtKind::For { .. }
                | StmtKind::RangeFor { .. }
                | StmtKind::While { .. }
                | StmtKind::Switch { .. }
        );
        if !wraps_body {
            meta.trailing_comment = self.trailing_comment();
        }
        Ok(Statement::new(kind, meta))
    }

    fn statement_start(&self) -> StatementStart {
        match self.peek_kind() {
            TokenKind::Keyword(k) if starts_declaration(*k) => StatementStart::Declaration,
            TokenKind::Keyword(k) if k.is_builtin_type() || *k == Keyword::Decltype => StatementStart::Ambiguous,
            TokenKind::Punct(Punct::LBracket) if self.check_punct_ahead(1, Punct::LBracket) => StatementStart::Declaration,
            TokenKind::Punct(Punct::ColonColon) => match self.peek_ahead(1) {
                TokenKind::Keyword(Keyword::New | Keyword::Delete) => StatementStart::Expression,
                _ => StatementStart::Ambiguous,
            },
            TokenKind::Ident(_) => StatementStart::Ambiguous,
            _ => StatementStart::Expression,
        }
    }

    /// Declaration statement or expression statement, whichever applies
    pub(crate) fn parse_declaration_or_expression(&mut self) -> Result<Statement, ParseError> {
        match self.statement_start() {
            StatementStart::Declaration => self.parse_declaration_statement(),
            StatementStart::Expression => self.parse_expression_statement(),
            StatementStart::Ambiguous => {
                let decl_err = if self.declaration_statement_ahead() {
                    match self.speculate(|p| p.parse_declaration_statement()) {
                        Ok(stmt) => return Ok(stmt),
                        Err(err) => Some(err),
                    }
                } else {
                    None
                };
                match (self.speculate(|p| p.parse_expression_statement()), decl_err) {
                    (Ok(stmt), _) => Ok(stmt),
                    (Err(expr_err), Some(decl_err)) => Err(further(decl_err, expr_err)),
                    (Err(expr_err), None) => Err(expr_err),
                }
            }
        }
    }

    /// Does the statement at the cursor read as a declaration?
    fn declaration_statement_ahead(&mut self) -> bool {
        self.lookahead(|p| {
            let parsed = p.parse_decl_specifiers(DeclContext::Block)?;
            if parsed.specs.ty.is_none() {
                return Err(p.error_here("type name"));
            }
            if parsed.certain {
                return Ok(());
            }
            let declarator = p.parse_declarator(DeclaratorMode::Named)?;
            if !plausible_declarator(&declarator) {
                return Err(p.error_here("declarator"));
            }
            let follows = match p.peek_kind() {
                TokenKind::Punct(Punct::Eq | Punct::LBrace | Punct::LParen) => true,
                TokenKind::Punct(Punct::Semicolon | Punct::Comma) => !has_reference(&declarator),
                _ => false,
            };
            if follows {
                Ok(())
            } else {
                Err(p.error_here("initializer or ';'"))
            }
        })
    }

    fn parse_declaration_statement(&mut self) -> Result<Statement, ParseError> {
        let location = self.current_location();
        match self.parse_declaration(DeclContext::Block)? {
            Some(mut decl) => {
                let decl_location = decl.meta.location;
                let meta = std::mem::replace(&mut decl.meta, NodeMeta::at(decl_location));
                Ok(Statement::new(StmtKind::Declaration(Box::new(decl)), meta))
            }
            None => Ok(Statement::new(StmtKind::Empty, NodeMeta::at(location))),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let mut meta = self.start_meta();
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        meta.trailing_comment = self.trailing_comment();
        Ok(Statement::new(StmtKind::Expr(expr), meta))
    }

    /// Optional init-statement followed by a condition, inside `( )`
    fn parse_init_and_condition(&mut self) -> Result<(Option<Box<Statement>>, Condition), ParseError> {
        self.with_template_args(false, |p| {
            let init = p.attempt(|p| p.parse_declaration_or_expression()).map(Box::new);
            let condition = p.parse_condition()?;
            Ok((init, condition))
        })
    }

    /// Expression or `Type name = value` condition
    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let decl = self.attempt(|p| {
            let (decl, plausible) = p.parse_single_declarator(true)?;
            if plausible {
                Ok(decl)
            } else {
                Err(p.error_here("condition declaration"))
            }
        });
        match decl {
            Some(decl) => Ok(Condition::Decl(Box::new(decl))),
            None => Ok(Condition::Expr(self.parse_expression()?)),
        }
    }

    fn parse_if_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::If, "")?;
        let is_constexpr = self.match_keyword(Keyword::Constexpr);
        self.expect_punct(Punct::LParen, "after 'if'")?;
        let (init, condition) = self.parse_init_and_condition()?;
        self.expect_punct(Punct::RParen, "after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(StmtKind::If {
            is_constexpr,
            init,
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::While, "")?;
        self.expect_punct(Punct::LParen, "after 'while'")?;
        let condition = self.with_template_args(false, |p| p.parse_condition())?;
        self.expect_punct(Punct::RParen, "after while condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::While { condition, body })
    }

    fn parse_do_while_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::Do, "")?;
        let body = Box::new(self.parse_statement()?);
        self.expect_keyword(Keyword::While, "after do body")?;
        self.expect_punct(Punct::LParen, "after 'while'")?;
        let condition = self.with_template_args(false, |p| p.parse_expression())?;
        self.expect_punct(Punct::RParen, "after do-while condition")?;
        self.expect_semicolon("after do-while")?;
        Ok(StmtKind::DoWhile { body, condition })
    }

    fn parse_switch_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::Switch, "")?;
        self.expect_punct(Punct::LParen, "after 'switch'")?;
        let (init, condition) = self.parse_init_and_condition()?;
        self.expect_punct(Punct::RParen, "after switch condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::Switch { init, condition, body })
    }

    /// Classic `for (init; cond; step)` or range-based `for (decl : range)`
    fn parse_for_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::For, "")?;
        self.expect_punct(Punct::LParen, "after 'for'")?;

        let header = self.with_template_args(false, |p| {
            if p.match_punct(Punct::Semicolon) {
                return p.parse_for_rest(None);
            }
            if let Some((decl, range)) = p.attempt(|p| p.parse_range_header()) {
                return Ok(ForHeader::Range { init: None, decl, range });
            }
            let init = Box::new(p.parse_declaration_or_expression()?);
            if let Some((decl, range)) = p.attempt(|p| p.parse_range_header()) {
                return Ok(ForHeader::Range {
                    init: Some(init),
                    decl,
                    range,
                });
            }
            p.parse_for_rest(Some(init))
        })?;

        self.expect_punct(Punct::RParen, "after for clauses")?;
        let body = Box::new(self.parse_statement()?);

        Ok(match header {
            ForHeader::Classic { init, condition, step } => StmtKind::For {
                init,
                condition,
                step,
                body,
            },
            ForHeader::Range { init, decl, range } => StmtKind::RangeFor {
                init,
                decl: Box::new(decl),
                range,
                body,
            },
        })
    }

    fn parse_for_rest(&mut self, init: Option<Box<Statement>>) -> Result<ForHeader, ParseError> {
        let condition = if self.check_punct(Punct::Semicolon) {
            None
        } else {
            Some(self.parse_condition()?)
        };
        self.expect_semicolon("after for condition")?;
        let step = if self.check_punct(Punct::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(ForHeader::Classic { init, condition, step })
    }

    /// `decl : range` of a range-based for
    fn parse_range_header(&mut self) -> Result<(Declaration, Expr), ParseError> {
        let (decl, _) = self.parse_single_declarator(false)?;
        self.expect_punct(Punct::Colon, "in range-based for")?;
        let range = self.parse_expression_or_braced()?;
        Ok((decl, range))
    }

    fn parse_try_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect_keyword(Keyword::Try, "")?;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        while self.match_keyword(Keyword::Catch) {
            self.expect_punct(Punct::LParen, "after 'catch'")?;
            let param = if self.match_punct(Punct::Ellipsis) {
                None
            } else {
                Some(self.with_template_args(false, |p| p.parse_param())?)
            };
            self.expect_punct(Punct::RParen, "after catch parameter")?;
            let body = self.parse_block()?;
            handlers.push(CatchHandler { param, body });
        }
        if handlers.is_empty() {
            return Err(self.error_here("'catch' after try block"));
        }
        Ok(StmtKind::Try { body, handlers })
    }
}

enum ForHeader {
    Classic {
        init: Option<Box<Statement>>,
        condition: Option<Condition>,
        step: Option<Expr>,
    },
    Range {
        init: Option<Box<Statement>>,
        decl: Declaration,
        range: Expr,
    },
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn statements(body: &str) -> Vec<Statement> {
        let source = format!("void f() {{\n{}\n}}", body);
        let mut parser = Parser::new(&source).unwrap();
        let unit = parser.parse_program().unwrap();
        unit.declarations[0].body().unwrap().statements.clone()
    }

    fn kinds(body: &str) -> Vec<StmtKind> {
        statements(body).into_iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_declaration_versus_expression() {
        let parsed = kinds("Foo bar; a * b; x = y; f(x); a < b; std::string s(name); c & d;");
        assert!(matches!(parsed[0], StmtKind::Declaration(_)));
        assert!(matches!(parsed[1], StmtKind::Declaration(_)));
        assert!(matches!(parsed[2], StmtKind::Expr(Expr::Assign { .. })));
        assert!(matches!(parsed[3], StmtKind::Expr(Expr::Call { .. })));
        assert!(matches!(parsed[4], StmtKind::Expr(Expr::Binary { op: BinOp::Lt, .. })));
        assert!(matches!(parsed[5], StmtKind::Declaration(_)));
        assert!(matches!(parsed[6], StmtKind::Expr(Expr::Binary { op: BinOp::BitAnd, .. })));
    }

    #[test]
    fn test_known_type_makes_cast_a_declaration() {
        let parsed = kinds("typedef int T; T(x); g(x);");
        assert!(matches!(parsed[1], StmtKind::Expr(_)));
        assert!(matches!(parsed[2], StmtKind::Expr(Expr::Call { .. })));
    }

    #[test]
    fn test_if_else_chain() {
        let parsed = kinds("if (a) return 1; else if (b) { return 2; } else return 3;");
        match &parsed[0] {
            StmtKind::If { else_branch: Some(else_branch), .. } => {
                assert!(matches!(else_branch.kind, StmtKind::If { .. }));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_with_initializer_and_declaration_condition() {
        let parsed = kinds("if (auto it = find(k); it != end) {}\nif (Node* n = head) {}");
        match &parsed[0] {
            StmtKind::If { init, condition, .. } => {
                assert!(init.is_some());
                assert!(matches!(condition, Condition::Expr(_)));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
        match &parsed[1] {
            StmtKind::If { init, condition, .. } => {
                assert!(init.is_none());
                assert!(matches!(condition, Condition::Decl(_)));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_loops() {
        let parsed = kinds("for (int i = 0; i < n; ++i) sum += i;\nfor (const auto& [k, v] : table) {}\nfor (;;) break;");
        match &parsed[0] {
            StmtKind::For { init, condition, step, .. } => {
                assert!(matches!(init.as_deref().map(|s| &s.kind), Some(StmtKind::Declaration(_))));
                assert!(condition.is_some());
                assert!(step.is_some());
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
        match &parsed[1] {
            StmtKind::RangeFor { decl, range, .. } => {
                assert_eq!(*range, Expr::name("table"));
                let DeclKind::Variable(var) = &decl.kind else {
                    panic!("Expected variable");
                };
                assert!(matches!(var.declarators[0].declarator.direct, DirectDeclarator::Bindings(_)));
            }
            other => panic!("Expected range-for, got {:?}", other),
        }
        assert!(matches!(
            &parsed[2],
            StmtKind::For {
                init: None,
                condition: None,
                step: None,
                ..
            }
        ));
    }

    #[test]
    fn test_switch_with_labels() {
        let parsed = kinds("switch (x) { case 1: f(); break; case A::B: default: return; }");
        let StmtKind::Switch { body, .. } = &parsed[0] else {
            panic!("Expected switch");
        };
        let StmtKind::Compound(block) = &body.kind else {
            panic!("Expected switch body block");
        };
        let labels: Vec<_> = block.statements.iter().map(|s| &s.kind).collect();
        assert!(matches!(labels[0], StmtKind::Case(_)));
        assert!(matches!(labels[3], StmtKind::Case(Expr::Name(_))));
        assert!(matches!(labels[4], StmtKind::Default));
    }

    #[test]
    fn test_try_catch_and_goto() {
        let parsed = kinds("try { risky(); } catch (const std::exception& e) { log(e); } catch (...) {}\nretry: goto retry;");
        match &parsed[0] {
            StmtKind::Try { handlers, .. } => {
                assert_eq!(handlers.len(), 2);
                assert!(handlers[1].param.is_none());
            }
            other => panic!("Expected try, got {:?}", other),
        }
        assert_eq!(parsed[1], StmtKind::Label("retry".into()));
        assert_eq!(parsed[2], StmtKind::Goto("retry".into()));
    }

    #[test]
    fn test_missing_brace_reports_end_of_file() {
        let err = Parser::new("int main() {\n  return 0;\n").unwrap().parse_program().unwrap_err();
        assert_eq!(err.line(), 3);
        assert_eq!(err.found, "end of file");
    }

    #[test]
    fn test_statement_comments() {
        let stmts = statements("  // first\n  x = 1; // set\n\n  y = 2;");
        assert_eq!(stmts[0].meta.leading_comments, vec!["// first".to_string()]);
        assert_eq!(stmts[0].meta.trailing_comment.as_deref(), Some("// set"));
        assert!(stmts[1].meta.blank_line_before);
    }
}
