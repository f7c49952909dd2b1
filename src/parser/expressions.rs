//! Expression parsing implementation
//!
//! This module handles parsing of C++ expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, characters, strings (adjacent strings are
//!   joined), `true`, `false`, `nullptr`
//! - Qualified names and template-ids: `std::max<int>`
//! - Binary operators: arithmetic, shifts, comparison (including `<=>`),
//!   logical, bitwise, pointer-to-member
//! - Assignment and compound assignment, `throw`, the comma operator
//! - Unary operators: `+`, `-`, `!`, `~`, `*`, `&`, `++`, `--`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`
//! - Conditional: `? :`
//! - Casts: `(T)x`, `int(x)`, `static_cast<T>(x)` and friends
//! - `sizeof`, `sizeof...`, `alignof`, `noexcept`, `typeid`
//! - `new` / `delete` with placement, arrays and `::` prefixes
//! - Lambdas and braced initializer lists
//!
//! # Precedence
//!
//! Binary operators follow C++ precedence using a precedence climbing
//! algorithm; the levels live in [`precedence`].
//!
//! Inside template arguments a bare `>` closes the list instead of
//! comparing, and `>` `>` is only read as a shift outside them.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use super::parse::{ParseError, Parser};
use super::types::DeclaratorMode;
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Punct, TokenKind};

fn assign_op(punct: Punct) -> Option<AssignOp> {
    let op = match punct {
        Punct::Eq => AssignOp::Assign,
        Punct::PlusEq => AssignOp::Add,
        Punct::MinusEq => AssignOp::Sub,
        Punct::StarEq => AssignOp::Mul,
        Punct::SlashEq => AssignOp::Div,
        Punct::PercentEq => AssignOp::Mod,
        Punct::ShlEq => AssignOp::Shl,
        Punct::AmpEq => AssignOp::And,
        Punct::PipeEq => AssignOp::Or,
        Punct::CaretEq => AssignOp::Xor,
        _ => return None,
    };
    Some(op)
}

fn cast_kind(keyword: Keyword) -> Option<CastKind> {
    match keyword {
        Keyword::StaticCast => Some(CastKind::Static),
        Keyword::DynamicCast => Some(CastKind::Dynamic),
        Keyword::ConstCast => Some(CastKind::Const),
        Keyword::ReinterpretCast => Some(CastKind::Reinterpret),
        _ => None,
    }
}

fn literal(kind: LiteralKind, text: impl Into<String>) -> Expr {
    Expr::Literal(Literal {
        kind,
        text: text.into(),
    })
}

impl Parser {
    /// Parse expression (top-level entry point, comma operator included)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_assignment()?;
        while self.match_punct(Punct::Comma) {
            let right = self.parse_assignment()?;
            left = Expr::Binary {
                op: BinOp::Comma,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Expression, or a braced list where one is allowed (`return {a, b};`)
    pub(crate) fn parse_expression_or_braced(&mut self) -> Result<Expr, ParseError> {
        if self.check_punct(Punct::LBrace) {
            return Ok(Expr::InitList {
                ty: None,
                elements: self.parse_braced_list()?,
            });
        }
        self.parse_expression()
    }

    /// Assignment-expression: the operand of function arguments and initializers
    pub(crate) fn parse_initializer_clause(&mut self) -> Result<Expr, ParseError> {
        if self.check_punct(Punct::LBrace) {
            return Ok(Expr::InitList {
                ty: None,
                elements: self.parse_braced_list()?,
            });
        }
        self.parse_assignment()
    }

    /// Parse assignment, `throw` or a conditional (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        if self.match_keyword(Keyword::Throw) {
            let operand_absent = matches!(
                self.peek_kind(),
                TokenKind::Punct(Punct::Semicolon | Punct::RParen | Punct::Comma | Punct::Colon | Punct::RBracket | Punct::RBrace)
            );
            if operand_absent {
                return Ok(Expr::Throw(None));
            }
            return Ok(Expr::Throw(Some(Box::new(self.parse_assignment()?))));
        }

        let target = self.parse_conditional()?;

        let op = match self.peek_kind() {
            TokenKind::Punct(Punct::Gt)
                if !self.in_template_args && self.peek().joint && self.check_punct_ahead(1, Punct::GtEq) =>
            {
                self.advance();
                Some(AssignOp::Shr)
            }
            TokenKind::Punct(p) => assign_op(*p),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(target);
        };
        self.advance();

        let value = self.parse_initializer_clause()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// Parse conditional: condition ? then_expr : else_expr
    pub(crate) fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(precedence::LOG_OR)?;
        if !self.match_punct(Punct::Question) {
            return Ok(condition);
        }

        let then_expr = self.with_template_args(false, |p| p.parse_expression())?;
        self.expect_punct(Punct::Colon, "in conditional expression")?;
        let else_expr = self.parse_assignment()?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Binary operator at the cursor and how many tokens spell it
    fn peek_binary_op(&self) -> Option<(BinOp, usize)> {
        let TokenKind::Punct(punct) = self.peek_kind() else {
            return None;
        };
        let op = match punct {
            Punct::OrOr => BinOp::LogOr,
            Punct::AndAnd => BinOp::LogAnd,
            Punct::Pipe => BinOp::BitOr,
            Punct::Caret => BinOp::BitXor,
            Punct::Amp => BinOp::BitAnd,
            Punct::EqEq => BinOp::Eq,
            Punct::NotEq => BinOp::Ne,
            Punct::Spaceship => BinOp::Spaceship,
            Punct::Lt => BinOp::Lt,
            Punct::LtEq => BinOp::Le,
            Punct::GtEq if !self.in_template_args => BinOp::Ge,
            Punct::Gt if self.in_template_args => return None,
            Punct::Gt if self.peek().joint && self.check_punct_ahead(1, Punct::Gt) => return Some((BinOp::Shr, 2)),
            // `>>=` is an assignment
            Punct::Gt if self.peek().joint && self.check_punct_ahead(1, Punct::GtEq) => return None,
            Punct::Gt => BinOp::Gt,
            Punct::Shl => BinOp::Shl,
            Punct::Plus => BinOp::Add,
            Punct::Minus => BinOp::Sub,
            Punct::Star => BinOp::Mul,
            Punct::Slash => BinOp::Div,
            Punct::Percent => BinOp::Mod,
            Punct::DotStar => BinOp::PtrMem,
            Punct::ArrowStar => BinOp::PtrMemArrow,
            _ => return None,
        };
        Some((op, 1))
    }

    /// Precedence climbing over binary operators binding at least `min_prec`
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast()?;

        while let Some((op, width)) = self.peek_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            let right = self.parse_binary(prec + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// C-style cast `(T)x`, falling back to a unary expression
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_cast_here)
    }

    fn parse_cast_here(&mut self) -> Result<Expr, ParseError> {
        if !self.check_punct(Punct::LParen) {
            return self.parse_unary();
        }
        match self.attempt(|p| p.parse_cast_head()) {
            Some(ty) => {
                let expr = self.parse_cast()?;
                Ok(Expr::Cast {
                    kind: CastKind::CStyle,
                    ty,
                    expr: Box::new(expr),
                })
            }
            None => self.parse_unary(),
        }
    }

    /// `( type-id )` that is followed by something a cast can apply to
    fn parse_cast_head(&mut self) -> Result<TypeId, ParseError> {
        self.expect_punct(Punct::LParen, "to open cast")?;
        let (ty, certain) = self.with_template_args(false, |p| p.parse_type_id_certain())?;
        self.expect_punct(Punct::RParen, "to close cast")?;
        if self.cast_operand_follows(certain) {
            Ok(ty)
        } else {
            Err(self.error_here("cast operand"))
        }
    }

    /// After `(name)`, does the next token begin the operand of a cast?
    ///
    /// Tokens that could also continue a parenthesized expression as a
    /// binary operator or call only count when the type is certain.
    fn cast_operand_follows(&self, certain: bool) -> bool {
        match self.peek_kind() {
            TokenKind::Ident(_)
            | TokenKind::IntLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::CharLiteral(_)
            | TokenKind::StringLiteral(_)
            | TokenKind::Punct(Punct::Bang | Punct::Tilde) => true,
            TokenKind::Keyword(k) => {
                k.is_builtin_type()
                    || cast_kind(*k).is_some()
                    || matches!(
                        k,
                        Keyword::This
                            | Keyword::Sizeof
                            | Keyword::Alignof
                            | Keyword::New
                            | Keyword::Delete
                            | Keyword::True
                            | Keyword::False
                            | Keyword::Nullptr
                            | Keyword::Typeid
                            | Keyword::Noexcept
                    )
            }
            TokenKind::Punct(
                Punct::LParen
                | Punct::Minus
                | Punct::Plus
                | Punct::Star
                | Punct::Amp
                | Punct::PlusPlus
                | Punct::MinusMinus
                | Punct::ColonColon
                | Punct::LBracket,
            ) => certain,
            _ => false,
        }
    }

    /// Parse unary: prefix operators, `sizeof`, `alignof`, `noexcept`, `new`, `delete`
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Punct(Punct::PlusPlus) => Some(UnOp::PreInc),
            TokenKind::Punct(Punct::MinusMinus) => Some(UnOp::PreDec),
            TokenKind::Punct(Punct::Plus) => Some(UnOp::Plus),
            TokenKind::Punct(Punct::Minus) => Some(UnOp::Neg),
            TokenKind::Punct(Punct::Bang) => Some(UnOp::Not),
            TokenKind::Punct(Punct::Tilde) => Some(UnOp::BitNot),
            TokenKind::Punct(Punct::Star) => Some(UnOp::Deref),
            TokenKind::Punct(Punct::Amp) => Some(UnOp::AddrOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_cast()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        match self.peek_kind() {
            TokenKind::Keyword(Keyword::Sizeof) => self.parse_sizeof(),
            TokenKind::Keyword(Keyword::Alignof) => {
                self.advance();
                self.expect_punct(Punct::LParen, "after 'alignof'")?;
                let ty = self.with_template_args(false, |p| p.parse_type_id())?;
                self.expect_punct(Punct::RParen, "to close 'alignof'")?;
                Ok(Expr::Alignof(ty))
            }
            TokenKind::Keyword(Keyword::Noexcept) => {
                self.advance();
                self.expect_punct(Punct::LParen, "after 'noexcept'")?;
                let expr = self.with_template_args(false, |p| p.parse_expression())?;
                self.expect_punct(Punct::RParen, "to close 'noexcept'")?;
                Ok(Expr::Noexcept(Box::new(expr)))
            }
            TokenKind::Keyword(Keyword::New) => self.parse_new(false),
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete(false),
            TokenKind::Punct(Punct::ColonColon) if self.check_keyword_ahead(1, Keyword::New) => {
                self.advance();
                self.parse_new(true)
            }
            TokenKind::Punct(Punct::ColonColon) if self.check_keyword_ahead(1, Keyword::Delete) => {
                self.advance();
                self.parse_delete(true)
            }
            _ => self.parse_postfix(),
        }
    }

    /// `sizeof x`, `sizeof(T)` or `sizeof...(Ts)`.
    ///
    /// A parenthesized operand is only a type when it cannot be an expression.
    fn parse_sizeof(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Sizeof, "")?;

        if self.match_punct(Punct::Ellipsis) {
            self.expect_punct(Punct::LParen, "after 'sizeof...'")?;
            let name = self.expect_identifier("in 'sizeof...'")?;
            self.expect_punct(Punct::RParen, "to close 'sizeof...'")?;
            return Ok(Expr::Sizeof(SizeofArg::Pack(name)));
        }

        if self.check_punct(Punct::LParen) {
            if let Some(ty) = self.attempt(|p| p.parse_parenthesized_type()) {
                return Ok(Expr::Sizeof(SizeofArg::Type(ty)));
            }
        }

        let operand = self.parse_unary()?;
        Ok(Expr::Sizeof(SizeofArg::Expr(Box::new(operand))))
    }

    /// `( type-id )` where the type-id could not be an expression
    fn parse_parenthesized_type(&mut self) -> Result<TypeId, ParseError> {
        self.expect_punct(Punct::LParen, "")?;
        let (ty, certain) = self.with_template_args(false, |p| p.parse_type_id_certain())?;
        self.expect_punct(Punct::RParen, "after type")?;
        if certain {
            Ok(ty)
        } else {
            Err(self.error_here("type operand"))
        }
    }

    /// `new (placement) T[n](init)`; the leading `::` is already consumed
    fn parse_new(&mut self, global: bool) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::New, "")?;

        let placement = if self.check_punct(Punct::LParen) {
            self.attempt(|p| {
                p.advance();
                let args = p.parse_expression_list(Punct::RParen)?;
                // `new (T)` rather than placement when no type follows
                if p.check_ident() || p.check_punct(Punct::ColonColon) || matches!(p.peek_kind(), TokenKind::Keyword(_)) || p.check_punct(Punct::LParen) {
                    Ok(args)
                } else {
                    Err(p.error_here("type after placement arguments"))
                }
            })
            .unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut ty = if self.match_punct(Punct::LParen) {
            let ty = self.with_template_args(false, |p| p.parse_type_id())?;
            self.expect_punct(Punct::RParen, "to close type in 'new'")?;
            ty
        } else {
            let (spec, _) = self.parse_type_spec()?;
            let declarator = self.parse_declarator(DeclaratorMode::New)?;
            TypeId { spec, declarator }
        };

        let array_size = if self.match_punct(Punct::LBracket) {
            let size = self.with_template_args(false, |p| p.parse_expression())?;
            self.expect_punct(Punct::RBracket, "to close array size")?;
            while self.match_punct(Punct::LBracket) {
                let bound = self.with_template_args(false, |p| p.parse_expression())?;
                self.expect_punct(Punct::RBracket, "to close array bound")?;
                ty.declarator.suffixes.push(DeclSuffix::Array(Some(Box::new(bound))));
            }
            Some(Box::new(size))
        } else {
            None
        };

        let init = if self.match_punct(Punct::LParen) {
            Some(Box::new(Initializer::Paren(self.parse_expression_list(Punct::RParen)?)))
        } else if self.check_punct(Punct::LBrace) {
            Some(Box::new(Initializer::Brace(self.parse_braced_list()?)))
        } else {
            None
        };

        Ok(Expr::New {
            global,
            placement,
            ty,
            array_size,
            init,
        })
    }

    fn parse_delete(&mut self, global: bool) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Delete, "")?;
        let array = self.check_punct(Punct::LBracket) && self.check_punct_ahead(1, Punct::RBracket);
        if array {
            self.advance();
            self.advance();
        }
        let expr = self.parse_cast()?;
        Ok(Expr::Delete {
            global,
            array,
            expr: Box::new(expr),
        })
    }

    /// Parse postfix: calls, subscripts, member access, `++` / `--`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::Punct(Punct::LParen) => {
                    self.advance();
                    let args = self.parse_expression_list(Punct::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Punct(Punct::LBracket) => {
                    self.advance();
                    let index = self.with_template_args(false, |p| p.parse_expression_or_braced())?;
                    self.expect_punct(Punct::RBracket, "to close subscript")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Punct(p @ (Punct::Dot | Punct::Arrow)) => {
                    let arrow = *p == Punct::Arrow;
                    self.advance();
                    let member = self.parse_qualified_name(true)?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        arrow,
                        member,
                    };
                }
                TokenKind::Punct(p @ (Punct::PlusPlus | Punct::MinusMinus)) => {
                    let op = if *p == Punct::PlusPlus {
                        UnOp::PostInc
                    } else {
                        UnOp::PostDec
                    };
                    self.advance();
                    expr = Expr::Unary {
                        op,
                        operand: Box::new(expr),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse primary: literals, names, parenthesized expressions, lambdas
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::IntLiteral(text) => {
                self.advance();
                Ok(literal(LiteralKind::Integer, text))
            }
            TokenKind::FloatLiteral(text) => {
                self.advance();
                Ok(literal(LiteralKind::Float, text))
            }
            TokenKind::CharLiteral(text) => {
                self.advance();
                Ok(literal(LiteralKind::Char, text))
            }
            TokenKind::StringLiteral(text) => {
                self.advance();
                let mut text = text;
                while let TokenKind::StringLiteral(next) = self.peek_kind() {
                    text.push(' ');
                    text.push_str(next);
                    self.advance();
                }
                Ok(literal(LiteralKind::String, text))
            }
            TokenKind::Keyword(kw @ (Keyword::True | Keyword::False)) => {
                self.advance();
                Ok(literal(LiteralKind::Bool, kw.as_str()))
            }
            TokenKind::Keyword(Keyword::Nullptr) => {
                self.advance();
                Ok(literal(LiteralKind::Nullptr, "nullptr"))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Ok(Expr::This)
            }
            TokenKind::Keyword(kw) if cast_kind(kw).is_some() => self.parse_named_cast(),
            TokenKind::Keyword(Keyword::Typeid) => self.parse_typeid(),
            TokenKind::Keyword(kw) if kw.is_builtin_type() => self.parse_functional_cast(),
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let fold = if self.fold_ahead() {
                    self.attempt(|p| p.with_template_args(false, |p| p.parse_fold()))
                } else {
                    None
                };
                let expr = match fold {
                    Some(fold) => fold,
                    None => self.with_template_args(false, |p| p.parse_expression())?,
                };
                self.expect_punct(Punct::RParen, "to close parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::Punct(Punct::LBracket) => self.parse_lambda(),
            TokenKind::Punct(Punct::LBrace) => Ok(Expr::InitList {
                ty: None,
                elements: self.parse_braced_list()?,
            }),
            TokenKind::Ident(_)
            | TokenKind::Punct(Punct::ColonColon)
            | TokenKind::Keyword(Keyword::Operator) => {
                let name = self.parse_qualified_name(true)?;
                if self.check_punct(Punct::LBrace) {
                    return Ok(Expr::InitList {
                        ty: Some(TypeSpec::new(TypeKind::Named(name))),
                        elements: self.parse_braced_list()?,
                    });
                }
                Ok(Expr::Name(name))
            }
            _ => Err(self.error_here("expression")),
        }
    }

    /// Does a `...` right after an operator appear before the `)` that
    /// closes the current parenthesis?
    fn fold_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut previous: Option<&TokenKind> = None;
        for token in &self.tokens[self.position..] {
            match &token.kind {
                TokenKind::Eof => return false,
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen) if depth == 0 => return false,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => depth = depth.saturating_sub(1),
                TokenKind::Punct(Punct::Ellipsis) if depth == 0 => {
                    let after_operator = match previous {
                        None => true,
                        Some(TokenKind::Punct(p)) => {
                            !matches!(p, Punct::RParen | Punct::RBracket | Punct::RBrace | Punct::Ellipsis)
                        }
                        Some(_) => false,
                    };
                    if after_operator {
                        return true;
                    }
                }
                _ => {}
            }
            previous = Some(&token.kind);
        }
        false
    }

    /// Body of a fold expression, between the parentheses
    fn parse_fold(&mut self) -> Result<Expr, ParseError> {
        if self.match_punct(Punct::Ellipsis) {
            let op = self.parse_fold_operator()?;
            let right = self.parse_cast()?;
            return Ok(Expr::Fold {
                op,
                left: None,
                right: Some(Box::new(right)),
            });
        }

        let left = self.parse_cast()?;
        let op = self.parse_fold_operator()?;
        self.expect_punct(Punct::Ellipsis, "in fold expression")?;
        let right = match self.peek_fold_operator() {
            _ if self.check_punct(Punct::RParen) => None,
            Some((second, width)) if second == op => {
                for _ in 0..width {
                    self.advance();
                }
                Some(Box::new(self.parse_cast()?))
            }
            _ => return Err(self.error_here(format!("')' or '{}' after '...'", op.symbol()))),
        };
        Ok(Expr::Fold {
            op,
            left: Some(Box::new(left)),
            right,
        })
    }

    fn peek_fold_operator(&self) -> Option<(BinOp, usize)> {
        if self.check_punct(Punct::Comma) {
            return Some((BinOp::Comma, 1));
        }
        self.peek_binary_op()
    }

    fn parse_fold_operator(&mut self) -> Result<BinOp, ParseError> {
        let Some((op, width)) = self.peek_fold_operator() else {
            return Err(self.error_here("fold operator"));
        };
        for _ in 0..width {
            self.advance();
        }
        Ok(op)
    }

    /// `static_cast<T>(e)` and the other keyword casts
    fn parse_named_cast(&mut self) -> Result<Expr, ParseError> {
        let TokenKind::Keyword(keyword) = self.peek_kind().clone() else {
            return Err(self.error_here("cast keyword"));
        };
        let Some(kind) = cast_kind(keyword) else {
            return Err(self.error_here("cast keyword"));
        };
        self.advance();

        self.expect_punct(Punct::Lt, &format!("after '{}'", keyword.as_str()))?;
        let ty = self.with_template_args(true, |p| p.parse_type_id())?;
        self.expect_template_close("to close cast type")?;
        self.expect_punct(Punct::LParen, "before cast operand")?;
        let expr = self.with_template_args(false, |p| p.parse_expression())?;
        self.expect_punct(Punct::RParen, "to close cast operand")?;

        Ok(Expr::Cast {
            kind,
            ty,
            expr: Box::new(expr),
        })
    }

    fn parse_typeid(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Typeid, "")?;
        if let Some(ty) = self.attempt(|p| p.parse_parenthesized_type()) {
            return Ok(Expr::Typeid(Box::new(SizeofArg::Type(ty))));
        }
        self.expect_punct(Punct::LParen, "after 'typeid'")?;
        let expr = self.with_template_args(false, |p| p.parse_expression())?;
        self.expect_punct(Punct::RParen, "to close 'typeid'")?;
        Ok(Expr::Typeid(Box::new(SizeofArg::Expr(Box::new(expr)))))
    }

    /// `int(x)`, `unsigned long{}`, `char()`
    fn parse_functional_cast(&mut self) -> Result<Expr, ParseError> {
        let (spec, _) = self.parse_type_spec()?;

        if self.check_punct(Punct::LBrace) {
            return Ok(Expr::InitList {
                ty: Some(spec),
                elements: self.parse_braced_list()?,
            });
        }

        self.expect_punct(Punct::LParen, "after type in functional cast")?;
        let location = self.current_location();
        let mut args = self.parse_expression_list(Punct::RParen)?;
        match args.len() {
            0 => Ok(Expr::InitList {
                ty: Some(spec),
                elements: Vec::new(),
            }),
            1 => Ok(Expr::Cast {
                kind: CastKind::Functional,
                ty: TypeId {
                    spec,
                    declarator: Declarator::abstract_(),
                },
                expr: Box::new(args.remove(0)),
            }),
            _ => Err(ParseError {
                location,
                expected: "a single operand in functional cast".to_string(),
                found: format!("{} operands", args.len()),
            }),
        }
    }

    /// `[captures](params) specifiers -> ret { body }`
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        self.expect_punct(Punct::LBracket, "to open lambda captures")?;
        let captures = self.with_template_args(false, |p| p.parse_captures())?;
        self.expect_punct(Punct::RBracket, "to close lambda captures")?;

        let (params, variadic) = if self.check_punct(Punct::LParen) {
            let (params, variadic) = self.parse_parameter_list()?;
            (Some(params), variadic)
        } else {
            (None, false)
        };

        let mut is_mutable = false;
        let mut is_constexpr = false;
        loop {
            if self.match_keyword(Keyword::Mutable) {
                is_mutable = true;
            } else if self.match_keyword(Keyword::Constexpr) {
                is_constexpr = true;
            } else {
                break;
            }
        }
        let exception = if self.check_keyword(Keyword::Noexcept) || self.check_keyword(Keyword::Throw) {
            Some(self.parse_exception_spec()?)
        } else {
            None
        };
        let trailing_return = if self.match_punct(Punct::Arrow) {
            Some(self.parse_type_id()?)
        } else {
            None
        };

        let body = self.parse_block()?;

        Ok(Expr::Lambda(Box::new(Lambda {
            captures,
            params,
            variadic,
            is_mutable,
            is_constexpr,
            exception,
            trailing_return,
            body,
        })))
    }

    fn parse_captures(&mut self) -> Result<Vec<Capture>, ParseError> {
        let mut captures = Vec::new();
        if self.check_punct(Punct::RBracket) {
            return Ok(captures);
        }

        loop {
            let capture = match self.peek_kind() {
                TokenKind::Punct(Punct::Eq) => {
                    self.advance();
                    Capture::DefaultCopy
                }
                TokenKind::Punct(Punct::Amp) if !matches!(self.peek_ahead(1), TokenKind::Ident(_)) => {
                    self.advance();
                    Capture::DefaultRef
                }
                TokenKind::Punct(Punct::Amp) => {
                    self.advance();
                    let (name, init, pack) = self.parse_capture_name()?;
                    Capture::ByRef { name, init, pack }
                }
                TokenKind::Keyword(Keyword::This) => {
                    self.advance();
                    Capture::This
                }
                TokenKind::Punct(Punct::Star) if self.check_keyword_ahead(1, Keyword::This) => {
                    self.advance();
                    self.advance();
                    Capture::StarThis
                }
                _ => {
                    let (name, init, pack) = self.parse_capture_name()?;
                    Capture::ByCopy { name, init, pack }
                }
            };
            captures.push(capture);
            if !self.match_punct(Punct::Comma) {
                return Ok(captures);
            }
        }
    }

    /// `name`, `name...` or `name = init` inside a capture list
    fn parse_capture_name(&mut self) -> Result<(String, Option<Box<Expr>>, bool), ParseError> {
        let name = self.expect_identifier("in lambda capture")?;
        let pack = self.match_punct(Punct::Ellipsis);
        let init = if self.match_punct(Punct::Eq) {
            Some(Box::new(self.parse_initializer_clause()?))
        } else {
            None
        };
        Ok((name, init, pack))
    }

    /// Comma-separated initializer clauses up to and including `close`;
    /// the opening bracket is already consumed
    pub(crate) fn parse_expression_list(&mut self, close: Punct) -> Result<Vec<Expr>, ParseError> {
        let items = self.with_template_args(false, |p| {
            let mut items = Vec::new();
            while !p.check_punct(close) {
                let mut item = p.parse_initializer_clause()?;
                if p.match_punct(Punct::Ellipsis) {
                    item = Expr::PackExpansion(Box::new(item));
                }
                items.push(item);
                if !p.match_punct(Punct::Comma) {
                    break;
                }
            }
            Ok(items)
        })?;
        self.expect_punct(close, "to close list")?;
        Ok(items)
    }

    /// `{ a, b, c }`, trailing comma allowed
    pub(crate) fn parse_braced_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect_punct(Punct::LBrace, "to open initializer list")?;
        self.nested(|p| p.parse_expression_list(Punct::RBrace))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(source).unwrap();
        let expr = parser.parse_expression().unwrap();
        assert!(parser.is_at_end(), "unconsumed input in {:?}", source);
        expr
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_precedence_climbing() {
        let parsed = expr("a + b * c - d");
        let expected = binary(
            BinOp::Sub,
            binary(BinOp::Add, Expr::name("a"), binary(BinOp::Mul, Expr::name("b"), Expr::name("c"))),
            Expr::name("d"),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let parsed = expr("a = b += 1");
        let Expr::Assign { op: AssignOp::Assign, value, .. } = parsed else {
            panic!("Expected assignment, got {:?}", parsed);
        };
        assert!(matches!(*value, Expr::Assign { op: AssignOp::Add, .. }));
    }

    #[test]
    fn test_shift_versus_template_close() {
        assert_eq!(expr("x >> 2"), binary(BinOp::Shr, Expr::name("x"), Expr::int("2")));
        assert!(matches!(expr("x >>= 2"), Expr::Assign { op: AssignOp::Shr, .. }));

        let parsed = expr("std::vector<std::vector<int>>{}");
        let Expr::InitList { ty: Some(spec), elements } = parsed else {
            panic!("Expected typed init list");
        };
        assert!(elements.is_empty());
        let TypeKind::Named(name) = spec.kind else {
            panic!("Expected named type");
        };
        assert_eq!(name.segments.len(), 2);
        assert!(name.segments[1].template_args.is_some());
    }

    #[test]
    fn test_less_than_is_not_template() {
        let parsed = expr("a < b && c > d");
        assert!(matches!(parsed, Expr::Binary { op: BinOp::LogAnd, .. }));
    }

    #[test]
    fn test_template_call() {
        let parsed = expr("std::max<int>(a, b)");
        let Expr::Call { callee, args } = parsed else {
            panic!("Expected call");
        };
        assert_eq!(args.len(), 2);
        let Expr::Name(name) = *callee else {
            panic!("Expected name callee");
        };
        assert!(name.segments[1].template_args.is_some());
    }

    #[test]
    fn test_casts() {
        assert!(matches!(expr("(int)x"), Expr::Cast { kind: CastKind::CStyle, .. }));
        assert!(matches!(expr("static_cast<double>(n) / 2"), Expr::Binary { op: BinOp::Div, .. }));
        assert!(matches!(expr("int(3.5)"), Expr::Cast { kind: CastKind::Functional, .. }));
        // Unknown name in parentheses before an operator stays an expression
        assert!(matches!(expr("(a) - b"), Expr::Binary { op: BinOp::Sub, .. }));
        assert!(matches!(expr("(f)(x)"), Expr::Call { .. }));
    }

    #[test]
    fn test_unary_and_postfix() {
        let parsed = expr("-*p++");
        let Expr::Unary { op: UnOp::Neg, operand } = parsed else {
            panic!("Expected negation");
        };
        let Expr::Unary { op: UnOp::Deref, operand } = *operand else {
            panic!("Expected dereference");
        };
        assert!(matches!(*operand, Expr::Unary { op: UnOp::PostInc, .. }));

        assert!(matches!(expr("obj.items[i]->next"), Expr::Member { arrow: true, .. }));
    }

    #[test]
    fn test_conditional_and_throw() {
        let parsed = expr("ok ? value : throw std::runtime_error(\"bad\")");
        let Expr::Conditional { else_expr, .. } = parsed else {
            panic!("Expected conditional");
        };
        assert!(matches!(*else_expr, Expr::Throw(Some(_))));
    }

    #[test]
    fn test_sizeof_forms() {
        assert!(matches!(expr("sizeof(int)"), Expr::Sizeof(SizeofArg::Type(_))));
        assert!(matches!(expr("sizeof x"), Expr::Sizeof(SizeofArg::Expr(_))));
        assert_eq!(expr("sizeof...(Ts)"), Expr::Sizeof(SizeofArg::Pack("Ts".into())));
    }

    #[test]
    fn test_new_and_delete() {
        let parsed = expr("new (buffer) Node(1, 2)");
        let Expr::New { placement, init, .. } = parsed else {
            panic!("Expected new");
        };
        assert_eq!(placement.len(), 1);
        assert!(matches!(init.as_deref(), Some(Initializer::Paren(args)) if args.len() == 2));

        let parsed = expr("new int[n]");
        assert!(matches!(parsed, Expr::New { array_size: Some(_), .. }));
        assert!(matches!(expr("::delete[] p"), Expr::Delete { global: true, array: true, .. }));
    }

    #[test]
    fn test_lambda() {
        let parsed = expr("[&, x = 1](int a) mutable -> int { return a + x; }");
        let Expr::Lambda(lambda) = parsed else {
            panic!("Expected lambda");
        };
        assert_eq!(lambda.captures.len(), 2);
        assert_eq!(lambda.captures[0], Capture::DefaultRef);
        assert!(matches!(&lambda.captures[1], Capture::ByCopy { init: Some(_), .. }));
        assert!(lambda.is_mutable);
        assert!(lambda.trailing_return.is_some());
        assert_eq!(lambda.body.statements.len(), 1);
    }

    #[test]
    fn test_adjacent_strings_join() {
        let parsed = expr("\"a\" \"b\"");
        assert_eq!(
            parsed,
            Expr::Literal(Literal {
                kind: LiteralKind::String,
                text: "\"a\" \"b\"".to_string(),
            })
        );
    }

    #[test]
    fn test_comma_and_pack_expansion() {
        assert!(matches!(expr("a, b"), Expr::Binary { op: BinOp::Comma, .. }));
        let Expr::Call { args, .. } = expr("f(args...)") else {
            panic!("Expected call");
        };
        assert!(matches!(args[0], Expr::PackExpansion(_)));
    }

    #[test]
    fn test_fold_expressions() {
        let name = |n: &str| Some(Box::new(Expr::name(n)));
        assert_eq!(
            expr("(args + ...)"),
            Expr::Fold {
                op: BinOp::Add,
                left: name("args"),
                right: None,
            }
        );
        assert_eq!(
            expr("(... && args)"),
            Expr::Fold {
                op: BinOp::LogAnd,
                left: None,
                right: name("args"),
            }
        );
        assert_eq!(
            expr("(0 + ... + args)"),
            Expr::Fold {
                op: BinOp::Add,
                left: Some(Box::new(Expr::int("0"))),
                right: name("args"),
            }
        );
        let Expr::Fold { op: BinOp::Comma, left: Some(call), .. } = expr("(f(args), ...)") else {
            panic!("Expected comma fold");
        };
        assert!(matches!(*call, Expr::Call { .. }));
        assert!(matches!(expr("(a >> ...)"), Expr::Fold { op: BinOp::Shr, .. }));
    }

    #[test]
    fn test_fold_needs_matching_operators() {
        let mut parser = Parser::new("(a + ... - b)").unwrap();
        assert!(parser.parse_expression().is_err());
        // `sizeof...` inside parentheses is not a fold
        assert!(matches!(expr("(sizeof...(Ts) + 1)"), Expr::Binary { op: BinOp::Add, .. }));
    }
}
