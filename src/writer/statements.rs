//! Statement emission
//!
//! Control statements put their header on one line and the body either in
//! braces (per [`BraceStyle`](super::BraceStyle)) or indented on the next
//! line. Statements following a `case` or `default` label are indented one
//! level below the label.

use super::Emitter;
use crate::parser::ast::*;
use crate::parser::reads_as_declaration;

/// `stmt` ends in an `if` without `else` that a following `else` would bind to
fn ends_with_open_if(stmt: &Statement) -> bool {
    match &stmt.kind {
        StmtKind::If {
            else_branch: None, ..
        } => true,
        StmtKind::If {
            else_branch: Some(else_branch),
            ..
        } => ends_with_open_if(else_branch),
        StmtKind::For { body, .. }
        | StmtKind::RangeFor { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::Switch { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

impl Emitter<'_> {
    /// Statements of a block, one indent level in from the braces
    pub(super) fn block_statements(&mut self, block: &Block) {
        let base = self.indent;
        let mut in_case = false;
        for (i, stmt) in block.statements.iter().enumerate() {
            if i > 0 && stmt.meta.blank_line_before {
                self.newline();
            }
            let is_label = matches!(stmt.kind, StmtKind::Case(_) | StmtKind::Default);
            self.indent = if in_case && !is_label { base + 1 } else { base };
            in_case |= is_label;
            self.statement(stmt);
        }
        self.indent = base;
        self.comment_lines(&block.closing_comments);
    }

    pub(super) fn statement(&mut self, stmt: &Statement) {
        self.comment_lines(&stmt.meta.leading_comments);
        if let StmtKind::Declaration(decl) = &stmt.kind {
            if let DeclKind::Preprocessor(text) = &decl.kind {
                self.write(text);
                self.newline();
                return;
            }
        }
        self.write_indent();
        self.stmt_kind(&stmt.kind);
        self.trailing(stmt.meta.trailing_comment.as_deref());
        self.newline();
    }

    /// Statement text at the cursor, leaving the cursor on its last line
    fn stmt_kind(&mut self, kind: &StmtKind) {
        match kind {
            StmtKind::Expr(expr) => self.expression_statement(expr),
            StmtKind::Compound(block) => {
                self.write("{");
                self.newline();
                self.indent += 1;
                self.block_statements(block);
                self.indent -= 1;
                self.close_brace();
            }
            StmtKind::If {
                is_constexpr,
                init,
                condition,
                then_branch,
                else_branch,
            } => {
                self.write(if *is_constexpr { "if constexpr (" } else { "if (" });
                self.init_statement(init.as_deref());
                self.condition(condition);
                self.write(")");

                let closed = if else_branch.is_some() && ends_with_open_if(then_branch) {
                    let block = Block {
                        statements: vec![(**then_branch).clone()],
                        closing_comments: Vec::new(),
                    };
                    self.braced_block(&block);
                    true
                } else {
                    self.sub_statement(then_branch)
                };

                if let Some(else_branch) = else_branch {
                    self.continue_line(closed, "else");
                    if matches!(else_branch.kind, StmtKind::If { .. }) && else_branch.meta.leading_comments.is_empty() {
                        self.write(" ");
                        self.stmt_kind(&else_branch.kind);
                        self.trailing(else_branch.meta.trailing_comment.as_deref());
                    } else {
                        self.sub_statement(else_branch);
                    }
                }
            }
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => {
                self.write("for (");
                match init {
                    Some(init) => self.stmt_kind(&init.kind),
                    None => self.write(";"),
                }
                if let Some(condition) = condition {
                    self.write(" ");
                    self.condition(condition);
                }
                self.write(";");
                if let Some(step) = step {
                    self.write(" ");
                    self.expr(step, precedence::COMMA);
                }
                self.write(")");
                self.sub_statement(body);
            }
            StmtKind::RangeFor {
                init,
                decl,
                range,
                body,
            } => {
                self.write("for (");
                self.init_statement(init.as_deref());
                self.condition_decl(decl);
                self.write(" : ");
                self.expr(range, precedence::ASSIGN);
                self.write(")");
                self.sub_statement(body);
            }
            StmtKind::While { condition, body } => {
                self.write("while (");
                self.condition(condition);
                self.write(")");
                self.sub_statement(body);
            }
            StmtKind::DoWhile { body, condition } => {
                self.write("do");
                let closed = self.sub_statement(body);
                self.continue_line(closed, "while (");
                self.expr(condition, precedence::COMMA);
                self.write(");");
            }
            StmtKind::Switch {
                init,
                condition,
                body,
            } => {
                self.write("switch (");
                self.init_statement(init.as_deref());
                self.condition(condition);
                self.write(")");
                self.sub_statement(body);
            }
            StmtKind::Case(value) => {
                self.write("case ");
                self.expr(value, precedence::CONDITIONAL);
                self.write(":");
            }
            StmtKind::Default => self.write("default:"),
            StmtKind::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.expr(value, precedence::COMMA);
                }
                self.write(";");
            }
            StmtKind::Declaration(decl) => self.decl_kind(&decl.kind),
            StmtKind::Break => self.write("break;"),
            StmtKind::Continue => self.write("continue;"),
            StmtKind::Goto(label) => {
                self.write("goto ");
                self.write(label);
                self.write(";");
            }
            StmtKind::Label(label) => {
                self.write(label);
                self.write(":");
            }
            StmtKind::Try { body, handlers } => {
                self.write("try");
                self.braced_block(body);
                for handler in handlers {
                    self.continue_line(true, "catch (");
                    match &handler.param {
                        Some(param) => self.param(param, false),
                        None => self.write("..."),
                    }
                    self.write(")");
                    self.braced_block(&handler.body);
                }
            }
            StmtKind::Empty => self.write(";"),
        }
    }

    /// Expression followed by `;`, parenthesized if the text would read
    /// back as a declaration
    fn expression_statement(&mut self, expr: &Expr) {
        let text = self.capture(|w| w.expr(expr, precedence::COMMA));
        let starts_like_type = text.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == ':');
        if starts_like_type && reads_as_declaration(&format!("{};", text), self.known_types) {
            self.write("(");
            self.write(&text);
            self.write(")");
        } else {
            self.write(&text);
        }
        self.write(";");
    }

    /// `init;` inside a control header, followed by a space
    fn init_statement(&mut self, init: Option<&Statement>) {
        if let Some(init) = init {
            self.stmt_kind(&init.kind);
            self.write(" ");
        }
    }

    fn condition(&mut self, condition: &Condition) {
        match condition {
            Condition::Expr(expr @ Expr::Assign { .. }) => {
                self.write("(");
                self.expr(expr, precedence::COMMA);
                self.write(")");
            }
            Condition::Expr(expr) => self.expr(expr, precedence::COMMA),
            Condition::Decl(decl) => self.condition_decl(decl),
        }
    }

    fn condition_decl(&mut self, decl: &Declaration) {
        match &decl.kind {
            DeclKind::Variable(var) => self.variable(var),
            other => self.decl_kind(other),
        }
    }

    /// Body of a control statement. Returns true when the cursor is right
    /// after a closing brace that a following keyword may share a line with.
    fn sub_statement(&mut self, body: &Statement) -> bool {
        if let StmtKind::Compound(block) = &body.kind {
            if body.meta.leading_comments.is_empty() {
                self.braced_block(block);
                return match body.meta.trailing_comment.as_deref() {
                    Some(comment) => {
                        self.trailing(Some(comment));
                        false
                    }
                    None => true,
                };
            }
        }

        self.newline();
        self.indent += 1;
        self.comment_lines(&body.meta.leading_comments);
        self.write_indent();
        self.stmt_kind(&body.kind);
        self.trailing(body.meta.trailing_comment.as_deref());
        self.indent -= 1;
        false
    }

    /// Start `word` after a body: on the brace line for same-line style,
    /// otherwise on a fresh line
    fn continue_line(&mut self, closed: bool, word: &str) {
        if closed && self.same_line_braces() {
            self.write(" ");
        } else {
            self.newline();
            self.write_indent();
        }
        self.write(word);
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse_str;
    use crate::writer::{BraceStyle, Writer, WriterOptions};

    fn render_with(source: &str, options: WriterOptions) -> String {
        let unit = parse_str(source).unwrap();
        let text = Writer::new(options).render(&unit);
        let reparsed = parse_str(&text).unwrap_or_else(|e| panic!("{}\n---\n{}", e, text));
        assert_eq!(unit, reparsed, "round trip changed structure:\n{}", text);
        text
    }

    fn render(source: &str) -> String {
        render_with(source, WriterOptions::default())
    }

    fn same_line() -> WriterOptions {
        WriterOptions {
            indent_width: 2,
            brace_style: BraceStyle::SameLine,
        }
    }

    #[test]
    fn test_unbraced_bodies_are_indented() {
        let text = render("void f(int n) { while (n) --n; if (n) g(); else h(); }");
        let expected = "\
void f(int n)
{
  while (n)
    --n;
  if (n)
    g();
  else
    h();
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_else_if_chain_same_line() {
        let text = render_with("void f(int a) { if (a == 1) { x(); } else if (a == 2) { y(); } else { z(); } }", same_line());
        let expected = "\
void f(int a) {
  if (a == 1) {
    x();
  } else if (a == 2) {
    y();
  } else {
    z();
  }
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_switch_case_indentation() {
        let text = render_with("int f(int k) { switch (k) { case 1: return 10; default: break; } return 0; }", same_line());
        let expected = "\
int f(int k) {
  switch (k) {
    case 1:
      return 10;
    default:
      break;
  }
  return 0;
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_for_headers() {
        let text = render("void f() { for (;;) break; for (int i = 0; i < 10; ++i) {} for (auto& x : items) use(x); }");
        assert!(text.contains("for (;;)\n    break;"), "{}", text);
        assert!(text.contains("for (int i = 0; i < 10; ++i)\n  {\n  }"), "{}", text);
        assert!(text.contains("for (auto& x : items)\n    use(x);"), "{}", text);
    }

    #[test]
    fn test_do_while_and_try() {
        let text = render_with("void f() { do { step(); } while (more()); try { run(); } catch (const std::exception& e) { log(e); } catch (...) {} }", same_line());
        assert!(text.contains("do {\n    step();\n  } while (more());"), "{}", text);
        assert!(text.contains("} catch (const std::exception& e) {"), "{}", text);
        assert!(text.contains("} catch (...) {\n  }"), "{}", text);
    }

    #[test]
    fn test_expression_that_reads_as_declaration_is_parenthesized() {
        let text = render("struct T {}; void f() { T * p; }");
        assert!(text.contains("  T* p;"), "{}", text);

        // Built directly: the parser would read `a * b;` as a declaration
        let source = "struct a {}; void f() {}";
        let mut unit = parse_str(source).unwrap();
        let DeclKind::Function(func) = &mut unit.declarations[1].kind else {
            panic!("expected function");
        };
        let FunctionBody::Defined(block) = &mut func.body else {
            panic!("expected body");
        };
        block.statements.push(Statement::new(
            StmtKind::Expr(Expr::Binary {
                op: BinOp::Mul,
                left: Box::new(Expr::name("a")),
                right: Box::new(Expr::name("b")),
            }),
            NodeMeta::default(),
        ));
        let text = Writer::default().render(&unit);
        assert!(text.contains("(a * b);"), "{}", text);
        assert_eq!(parse_str(&text).unwrap(), unit);
    }

    #[test]
    fn test_dangling_else_gets_braces() {
        let inner = Statement::new(
            StmtKind::If {
                is_constexpr: false,
                init: None,
                condition: Condition::Expr(Expr::name("b")),
                then_branch: Box::new(Statement::new(StmtKind::Expr(Expr::name("x")), NodeMeta::default())),
                else_branch: None,
            },
            NodeMeta::default(),
        );
        let outer = Statement::new(
            StmtKind::If {
                is_constexpr: false,
                init: None,
                condition: Condition::Expr(Expr::name("a")),
                then_branch: Box::new(inner),
                else_branch: Some(Box::new(Statement::new(StmtKind::Expr(Expr::name("y")), NodeMeta::default()))),
            },
            NodeMeta::default(),
        );
        let mut unit = parse_str("void f() {}").unwrap();
        let DeclKind::Function(func) = &mut unit.declarations[0].kind else {
            panic!("expected function");
        };
        func.body = FunctionBody::Defined(Block {
            statements: vec![outer],
            closing_comments: Vec::new(),
        });

        let text = Writer::default().render(&unit);
        let reparsed = parse_str(&text).unwrap();
        let DeclKind::Function(func) = &reparsed.declarations[0].kind else {
            panic!("expected function");
        };
        let FunctionBody::Defined(block) = &func.body else {
            panic!("expected body");
        };
        let StmtKind::If { then_branch, else_branch, .. } = &block.statements[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(then_branch.kind, StmtKind::Compound(_)), "{}", text);
        assert!(else_branch.is_some());
    }

    #[test]
    fn test_statement_comments_kept() {
        let source = "void f()\n{\n  // setup\n  int a = 1; // one\n\n  a++;\n  // done\n}\n";
        assert_eq!(render(source), source);
    }
}
