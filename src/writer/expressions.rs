//! Expression emission
//!
//! Parentheses are derived from operator precedence rather than kept from
//! the source: a child is wrapped only when it binds looser than its
//! position allows. Binary operators are left-associative, so the right
//! operand of `a - (b - c)` is wrapped and the left one of `(a - b) - c`
//! is not.
//!
//! # Angle brackets
//!
//! `a < b > c` would read back as a template-id. While writing, the
//! emitter tracks whether a bare `>` follows the current text in the same
//! bracket, and parenthesizes the left operand of a `<` in that case.

use super::Emitter;
use crate::parser::ast::*;

/// A `>` that is not part of `->` or `>=`
pub(super) fn has_bare_gt(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'>' && (i == 0 || bytes[i - 1] != b'-') && bytes.get(i + 1) != Some(&b'=')
    })
}

pub(super) fn has_angle(text: &str) -> bool {
    text.contains('<')
}

fn expr_precedence(expr: &Expr) -> u8 {
    use precedence::*;
    match expr {
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Assign { .. } | Expr::Throw(_) | Expr::PackExpansion(_) => ASSIGN,
        Expr::Conditional { .. } => CONDITIONAL,
        Expr::Unary { op, .. } if op.is_postfix() => POSTFIX,
        Expr::Unary { .. } => UNARY,
        Expr::Call { .. } | Expr::Index { .. } | Expr::Member { .. } => POSTFIX,
        Expr::Cast {
            kind: CastKind::CStyle,
            ..
        } => UNARY,
        Expr::Sizeof(_) | Expr::Alignof(_) | Expr::Noexcept(_) | Expr::New { .. } | Expr::Delete { .. } => UNARY,
        Expr::Literal(_)
        | Expr::Name(_)
        | Expr::This
        | Expr::Cast { .. }
        | Expr::InitList { .. }
        | Expr::Lambda(_)
        | Expr::Fold { .. }
        | Expr::Typeid(_) => PRIMARY,
    }
}

impl Emitter<'_> {
    /// Write `expr` where an operand of at least `min_prec` is expected
    pub(super) fn expr(&mut self, expr: &Expr, min_prec: u8) {
        if expr_precedence(expr) < min_prec {
            let saved = std::mem::replace(&mut self.gt_follows, false);
            self.write("(");
            self.expr_inner(expr);
            self.write(")");
            self.gt_follows = saved;
        } else {
            self.expr_inner(expr);
        }
    }

    /// Texts of a comma-separated list inside a fresh bracket
    pub(super) fn list_texts(&self, items: &[Expr], min_prec: u8) -> Vec<String> {
        let mut texts = Vec::with_capacity(items.len());
        let mut gt_after = false;
        for item in items.iter().rev() {
            let text = self.capture_with_gt(gt_after, |w| w.expr(item, min_prec));
            gt_after |= has_bare_gt(&text);
            texts.push(text);
        }
        texts.reverse();
        texts
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(literal) => self.write(&literal.text),
            Expr::Name(name) => self.name(name),
            Expr::This => self.write("this"),
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Assign { op, target, value } => {
                self.expr(target, precedence::LOG_OR);
                self.write(" ");
                self.write(op.symbol());
                self.write(" ");
                self.expr(value, precedence::ASSIGN);
            }
            Expr::Unary { op, operand } if op.is_postfix() => {
                self.expr(operand, precedence::POSTFIX);
                self.write(op.symbol());
            }
            Expr::Unary { op, operand } => {
                let symbol = op.symbol();
                let text = self.capture(|w| w.expr(operand, precedence::UNARY));
                self.write(symbol);
                // `- -x`, `+ +x`, `& &x`
                let last = symbol.chars().last();
                if matches!(last, Some('+' | '-' | '&')) && text.chars().next() == last {
                    self.write(" ");
                }
                self.write(&text);
            }
            Expr::Call { callee, args } => {
                self.expr(callee, precedence::POSTFIX);
                self.paren_list(args);
            }
            Expr::Index { object, index } => {
                self.expr(object, precedence::POSTFIX);
                let saved = std::mem::replace(&mut self.gt_follows, false);
                self.write("[");
                self.expr(index, precedence::COMMA);
                self.write("]");
                self.gt_follows = saved;
            }
            Expr::Member { object, arrow, member } => {
                self.expr(object, precedence::POSTFIX);
                self.write(if *arrow { "->" } else { "." });
                self.name(member);
            }
            Expr::Cast { kind, ty, expr } => self.cast(*kind, ty, expr),
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(condition, precedence::LOG_OR);
                self.write(" ? ");
                let saved = std::mem::replace(&mut self.gt_follows, false);
                self.expr(then_expr, precedence::COMMA);
                self.gt_follows = saved;
                self.write(" : ");
                self.expr(else_expr, precedence::ASSIGN);
            }
            Expr::InitList { ty, elements } => {
                if let Some(ty) = ty {
                    self.type_spec(ty);
                }
                let texts = self.list_texts(elements, precedence::ASSIGN);
                self.write("{");
                self.write(&texts.join(", "));
                self.write("}");
            }
            Expr::Sizeof(arg) => self.sizeof_arg("sizeof", arg),
            Expr::Alignof(ty) => {
                self.write("alignof(");
                self.type_id(ty);
                self.write(")");
            }
            Expr::New {
                global,
                placement,
                ty,
                array_size,
                init,
            } => self.new_expr(*global, placement, ty, array_size.as_deref(), init.as_deref()),
            Expr::Delete { global, array, expr } => {
                if *global {
                    self.write("::");
                }
                self.write(if *array { "delete[] " } else { "delete " });
                self.expr(expr, precedence::UNARY);
            }
            Expr::Throw(operand) => {
                self.write("throw");
                if let Some(operand) = operand {
                    self.write(" ");
                    self.expr(operand, precedence::ASSIGN);
                }
            }
            Expr::Lambda(lambda) => self.lambda(lambda),
            Expr::PackExpansion(inner) => {
                self.expr(inner, precedence::ASSIGN);
                self.write("...");
            }
            Expr::Fold { op, left, right } => self.fold(*op, left.as_deref(), right.as_deref()),
            Expr::Noexcept(inner) => {
                let saved = std::mem::replace(&mut self.gt_follows, false);
                self.write("noexcept(");
                self.expr(inner, precedence::COMMA);
                self.write(")");
                self.gt_follows = saved;
            }
            Expr::Typeid(arg) => self.sizeof_arg("typeid", arg),
        }
    }

    fn binary(&mut self, op: BinOp, left: &Expr, right: &Expr) {
        let prec = op.precedence();
        let right_text = self.capture(|w| w.expr(right, prec + 1));
        let gt_in_right = has_bare_gt(&right_text);
        let left_gt = self.gt_follows || gt_in_right || matches!(op, BinOp::Gt | BinOp::Ge | BinOp::Shr);
        let mut left_text = self.capture_with_gt(left_gt, |w| w.expr(left, prec));

        let ends_like_name = left_text.ends_with(|c: char| c.is_alphanumeric() || c == '_');
        if op == BinOp::Lt && ends_like_name && (self.gt_follows || gt_in_right) {
            left_text = format!("({})", left_text);
        }

        self.write(&left_text);
        match op {
            BinOp::Comma => self.write(", "),
            BinOp::PtrMem | BinOp::PtrMemArrow => self.write(op.symbol()),
            _ => {
                self.write(" ");
                self.write(op.symbol());
                self.write(" ");
            }
        }
        self.write(&right_text);
    }

    fn fold(&mut self, op: BinOp, left: Option<&Expr>, right: Option<&Expr>) {
        let symbol = if op == BinOp::Comma {
            ",".to_string()
        } else {
            format!(" {}", op.symbol())
        };
        let saved = std::mem::replace(&mut self.gt_follows, false);
        self.write("(");
        if let Some(left) = left {
            self.expr(left, precedence::UNARY);
            self.write(&symbol);
            self.write(" ");
        }
        self.write("...");
        if let Some(right) = right {
            self.write(&symbol);
            self.write(" ");
            self.expr(right, precedence::UNARY);
        }
        self.write(")");
        self.gt_follows = saved;
    }

    fn paren_list(&mut self, items: &[Expr]) {
        let texts = self.list_texts(items, precedence::ASSIGN);
        self.write("(");
        self.write(&texts.join(", "));
        self.write(")");
    }

    fn cast(&mut self, kind: CastKind, ty: &TypeId, expr: &Expr) {
        match kind.keyword() {
            Some(keyword) => {
                self.write(keyword);
                self.write("<");
                self.type_id(ty);
                self.write(">(");
                let saved = std::mem::replace(&mut self.gt_follows, false);
                self.expr(expr, precedence::COMMA);
                self.gt_follows = saved;
                self.write(")");
            }
            None if kind == CastKind::Functional => {
                self.type_id(ty);
                self.paren_list(std::slice::from_ref(expr));
            }
            None => {
                self.write("(");
                self.type_id(ty);
                self.write(")");
                self.expr(expr, precedence::UNARY);
            }
        }
    }

    fn sizeof_arg(&mut self, keyword: &str, arg: &SizeofArg) {
        let saved = std::mem::replace(&mut self.gt_follows, false);
        self.write(keyword);
        match arg {
            SizeofArg::Type(ty) => {
                self.write("(");
                self.type_id(ty);
                self.write(")");
            }
            SizeofArg::Expr(expr) => {
                self.write("(");
                self.expr(expr, precedence::COMMA);
                self.write(")");
            }
            SizeofArg::Pack(name) => {
                self.write("...(");
                self.write(name);
                self.write(")");
            }
        }
        self.gt_follows = saved;
    }

    fn new_expr(
        &mut self,
        global: bool,
        placement: &[Expr],
        ty: &TypeId,
        array_size: Option<&Expr>,
        init: Option<&Initializer>,
    ) {
        if global {
            self.write("::");
        }
        self.write("new ");
        if !placement.is_empty() {
            self.paren_list(placement);
            self.write(" ");
        }

        let declarator = &ty.declarator;
        match array_size {
            Some(size) => {
                self.type_spec(&ty.spec);
                let ptrs = self.capture(|w| w.ptr_ops(&declarator.ptr_ops));
                self.attach_ptr_ops(&ptrs);
                let saved = std::mem::replace(&mut self.gt_follows, false);
                self.write("[");
                self.expr(size, precedence::COMMA);
                self.write("]");
                self.gt_follows = saved;
                self.declarator_core(declarator);
            }
            None if declarator.suffixes.is_empty() && matches!(declarator.direct, DirectDeclarator::Abstract) => {
                self.type_id(ty);
            }
            None => {
                self.write("(");
                self.type_id(ty);
                self.write(")");
            }
        }

        if let Some(init) = init {
            self.initializer(init, false);
        }
    }

    fn lambda(&mut self, lambda: &Lambda) {
        self.write("[");
        for (i, capture) in lambda.captures.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match capture {
                Capture::DefaultCopy => self.write("="),
                Capture::DefaultRef => self.write("&"),
                Capture::This => self.write("this"),
                Capture::StarThis => self.write("*this"),
                Capture::ByCopy { name, init, pack } => self.capture_item(name, init.as_deref(), *pack),
                Capture::ByRef { name, init, pack } => {
                    self.write("&");
                    self.capture_item(name, init.as_deref(), *pack);
                }
            }
        }
        self.write("]");

        if let Some(params) = &lambda.params {
            self.params(params, lambda.variadic, false);
        }
        if lambda.is_mutable {
            self.write(" mutable");
        }
        if lambda.is_constexpr {
            self.write(" constexpr");
        }
        if let Some(spec) = &lambda.exception {
            self.write(" ");
            self.exception_spec(spec);
        }
        if let Some(ret) = &lambda.trailing_return {
            self.write(" -> ");
            self.type_id(ret);
        }

        let body = &lambda.body;
        if body.statements.is_empty() && body.closing_comments.is_empty() {
            self.write(" {}");
            return;
        }
        let saved = std::mem::replace(&mut self.gt_follows, false);
        self.write(" {");
        self.newline();
        self.indent += 1;
        self.block_statements(body);
        self.indent -= 1;
        self.close_brace();
        self.gt_follows = saved;
    }

    fn capture_item(&mut self, name: &str, init: Option<&Expr>, pack: bool) {
        self.write(name);
        if pack {
            self.write("...");
        }
        if let Some(init) = init {
            self.write(" = ");
            self.expr(init, precedence::ASSIGN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::writer::Writer;

    /// Render `int v = <expr>;` inside a function and return the expression text
    fn render_expr(expr: &str) -> String {
        let source = format!("void f() {{ auto v = {}; }}", expr);
        let unit = parse_str(&source).unwrap();
        let text = Writer::default().render(&unit);
        let reparsed = parse_str(&text).unwrap_or_else(|e| panic!("{}\n---\n{}", e, text));
        assert_eq!(unit, reparsed, "round trip changed structure:\n{}", text);
        let start = text.find("auto v = ").unwrap() + "auto v = ".len();
        let end = text[start..].find(";\n").unwrap() + start;
        text[start..end].to_string()
    }

    #[test]
    fn test_parentheses_follow_precedence() {
        assert_eq!(render_expr("(a + b) * c"), "(a + b) * c");
        assert_eq!(render_expr("a + (b * c)"), "a + b * c");
        assert_eq!(render_expr("a - (b - c)"), "a - (b - c)");
        assert_eq!(render_expr("(a - b) - c"), "a - b - c");
        assert_eq!(render_expr("a = b = c"), "a = b = c");
        assert_eq!(render_expr("(a ? b : c) ? d : e"), "(a ? b : c) ? d : e");
    }

    #[test]
    fn test_unary_spacing() {
        assert_eq!(render_expr("a - -b"), "a - -b");
        assert_eq!(render_expr("- -b"), "- -b");
        assert_eq!(render_expr("-(-b)"), "- -b");
        assert_eq!(render_expr("*p++"), "*p++");
        assert_eq!(render_expr("(*p)++"), "(*p)++");
    }

    #[test]
    fn test_comparison_chain_not_read_as_template() {
        let text = render_expr("(a < b) > c");
        assert_eq!(text, "(a) < b > c");
    }

    #[test]
    fn test_casts_and_calls() {
        assert_eq!(render_expr("static_cast<int>(x + 1)"), "static_cast<int>(x + 1)");
        assert_eq!(render_expr("(double)n / 2"), "(double)n / 2");
        assert_eq!(render_expr("int(x)"), "int(x)");
        assert_eq!(render_expr("std::max<int>(a, b)"), "std::max<int>(a, b)");
        assert_eq!(render_expr("obj->items[i].size()"), "obj->items[i].size()");
    }

    #[test]
    fn test_new_delete_sizeof() {
        assert_eq!(render_expr("new int[n]"), "new int[n]");
        assert_eq!(render_expr("::new (buf) Widget(1, 2)"), "::new (buf) Widget(1, 2)");
        assert_eq!(render_expr("sizeof(int) + sizeof x"), "sizeof(int) + sizeof(x)");
    }

    #[test]
    fn test_lambda_body_indented() {
        let unit = parse_str("void f() { auto g = [&, n](int x) mutable -> int { return x + n; }; }").unwrap();
        let text = Writer::default().render(&unit);
        assert!(
            text.contains("  auto g = [&, n](int x) mutable -> int {\n    return x + n;\n  };\n"),
            "{}",
            text
        );
        assert_eq!(parse_str(&text).unwrap(), unit);
        assert_eq!(render_expr("[] {}"), "[] {}");
    }

    #[test]
    fn test_bare_gt_detection() {
        assert!(has_bare_gt("a > b"));
        assert!(has_bare_gt("x >> 1"));
        assert!(!has_bare_gt("p->x"));
        assert!(!has_bare_gt("a >= b"));
    }

    #[test]
    fn test_fold_expressions_round_trip() {
        assert_eq!(render_expr("(args + ...)"), "(args + ...)");
        assert_eq!(render_expr("( ... &&args)"), "(... && args)");
        assert_eq!(render_expr("(0+...+args)"), "(0 + ... + args)");
        assert_eq!(render_expr("(f(args) , ...)"), "(f(args), ...)");
        assert_eq!(render_expr("((a * b) + ...)"), "((a * b) + ...)");
    }
}
