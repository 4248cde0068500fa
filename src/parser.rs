use crate::{
    ast::{
        BinaryOperator, Block, Expr, ExprKind, Function, Ident, Item, Literal, Param, Program,
        Stmt, StmtKind, TypeName, UnaryOperator, Untyped, Variable,
    },
    token::{Span, Spanned, Token, TokenKind},
    types::Type,
    util::intern::Interner,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a whole program from the provided (already lexed) tokens.
///
/// Parsing stops at the first syntax error.
pub fn parse_program(
    tokens: &[Token],
    ident_interner: &mut Interner,
) -> Result<Program<Untyped>> {
    let mut p = Parser::new(tokens, ident_interner);
    let program = p.parse_program()?;
    p.consume(&TokenKind::Eof)?;
    Ok(program)
}

/// Parses a single expression line, such as `a + f(b)`.
pub fn parse_expr(tokens: &[Token], ident_interner: &mut Interner) -> Result<Expr<Untyped>> {
    let mut p = Parser::new(tokens, ident_interner);
    let expr = p.parse_expr()?;
    p.take(&TokenKind::Newline);
    p.consume(&TokenKind::Eof)?;
    Ok(expr)
}

struct Parser<'tok, 'ident> {
    tokens: &'tok [Token],
    ident_interner: &'ident mut Interner,
    cursor: usize,
    /// Returned once the cursor runs past the token buffer.
    eof: Token,
}

impl Parser<'_, '_> {
    fn parse_program(&mut self) -> Result<Program<Untyped>> {
        let mut items = Vec::with_capacity(8);
        while !self.is(&TokenKind::Eof) {
            items.push(self.parse_item()?);
        }
        Ok(Program { items })
    }

    fn parse_item(&mut self) -> Result<Item<Untyped>> {
        if !self.peek().kind.is_type() {
            let c = self.peek();
            let error = Error::ExpectedItem {
                actual: c.kind.clone(),
            };
            return Err(c.span().wrap(error));
        }
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        if self.is(&TokenKind::LParen) {
            let function = self.parse_function(ty, name)?;
            Ok(Item::Function(function))
        } else {
            let variable = self.parse_variable(ty, name)?;
            self.end_statement()?;
            Ok(Item::Variable(variable))
        }
    }

    fn parse_function(&mut self, return_ty: TypeName, name: Ident) -> Result<Function<Untyped>> {
        self.consume(&TokenKind::LParen)?;
        let params = self.parse_list(&TokenKind::RParen, &TokenKind::Comma, Parser::parse_param)?;
        self.consume(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Function {
            return_ty,
            name,
            params,
            body,
        })
    }

    fn parse_param(&mut self) -> Result<Param> {
        let ty = self.parse_value_type()?;
        let name = self.parse_ident()?;
        Ok(Param { ty, name })
    }

    /// Parses the rest of a variable declaration, after its type and name.
    /// Doesn't consume the statement terminator.
    fn parse_variable(&mut self, ty: TypeName, name: Ident) -> Result<Variable<Untyped>> {
        if ty.ty == Type::Void {
            return Err(ty.span.wrap(Error::IllegalVoid));
        }
        self.consume(&TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Variable { ty, name, value })
    }

    /// Parses either an indented block or a single-line one, such as in
    /// `if done: return 1;`.
    fn parse_block(&mut self) -> Result<Block<Untyped>> {
        let colon = self.consume(&TokenKind::Colon)?;

        if !self.take(&TokenKind::Newline) {
            let stmt = self.parse_simple_stmt()?;
            let span = colon.span().to(stmt.span);
            return Ok(Block {
                stmts: vec![stmt],
                span,
            });
        }

        if !self.take(&TokenKind::Indent) {
            return Err(self.peek().span().wrap(Error::EmptyBlock));
        }
        let mut stmts = Vec::with_capacity(4);
        while !self.is(&TokenKind::Dedent) && !self.is(&TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        self.consume(&TokenKind::Dedent)?;

        let last = stmts.last().map_or(colon.span(), |stmt| stmt.span);
        Ok(Block {
            stmts,
            span: colon.span().to(last),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt<Untyped>> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                let start = self.advance();
                let predicate = self.parse_expr()?;
                let body = self.parse_block()?;
                let span = start.span().to(body.span);
                let kind = StmtKind::While { predicate, body };
                Ok(Stmt { kind, span })
            }
            TokenKind::For => {
                let start = self.advance();
                let var = self.parse_ident()?;
                self.consume(&TokenKind::In)?;
                self.consume(&TokenKind::Range)?;
                self.consume(&TokenKind::LParen)?;
                let bound = self.parse_expr()?;
                self.consume(&TokenKind::RParen)?;
                let body = self.parse_block()?;
                let span = start.span().to(body.span);
                let kind = StmtKind::For { var, bound, body };
                Ok(Stmt { kind, span })
            }
            _ => self.parse_simple_stmt(),
        }
    }

    /// Parses `if` and `elif` arms. An `elif` becomes the single statement of
    /// its parent's else block.
    fn parse_if(&mut self) -> Result<Stmt<Untyped>> {
        let start = self.consume_any(&[TokenKind::If, TokenKind::Elif])?;
        let predicate = self.parse_expr()?;
        let then_block = self.parse_block()?;

        let else_block = if self.is(&TokenKind::Elif) {
            let nested = self.parse_if()?;
            Some(Block {
                span: nested.span,
                stmts: vec![nested],
            })
        } else if self.take(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = else_block.as_ref().map_or(then_block.span, |b| b.span);
        let kind = StmtKind::If {
            predicate,
            then_block,
            else_block,
        };
        Ok(Stmt {
            kind,
            span: start.span().to(end),
        })
    }

    /// Parses a statement that must be terminated by a semicolon.
    fn parse_simple_stmt(&mut self) -> Result<Stmt<Untyped>> {
        let start = self.peek().span();
        let kind = match self.peek().kind {
            _ if self.peek().kind.is_type() => {
                let ty = self.parse_type()?;
                let name = self.parse_ident()?;
                if self.is(&TokenKind::LParen) {
                    return Err(name.span.wrap(Error::NestedFunction));
                }
                StmtKind::Variable(self.parse_variable(ty, name)?)
            }
            TokenKind::Return => {
                self.advance();
                if self.is(&TokenKind::Semicolon) {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_expr()?))
                }
            }
            TokenKind::Pass => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Identifier(_) if self.nth(1).kind == TokenKind::Assign => {
                let target = self.parse_ident()?;
                self.consume(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                StmtKind::Assignment {
                    target,
                    value,
                    info: (),
                }
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.is(&TokenKind::Assign) {
                    return Err(expr.span.wrap(Error::InvalidAssignmentTarget));
                }
                StmtKind::Expr(expr)
            }
        };
        let end = self.end_statement()?;
        Ok(Stmt {
            kind,
            span: start.to(end),
        })
    }

    /// Consumes the `;` which terminates a statement, and the line break which
    /// must follow it. Returns the semicolon's span.
    fn end_statement(&mut self) -> Result<Span> {
        let semicolon = self.consume(&TokenKind::Semicolon)?;
        self.consume(&TokenKind::Newline)?;
        Ok(semicolon.span())
    }

    /// Parses any type, `void` included.
    fn parse_type(&mut self) -> Result<TypeName> {
        let c = self.peek();
        match Type::from_keyword(&c.kind) {
            Some(ty) => {
                let span = self.advance().span();
                Ok(TypeName { ty, span })
            }
            None => {
                let error = Error::ExpectedType {
                    actual: c.kind.clone(),
                };
                Err(c.span().wrap(error))
            }
        }
    }

    /// Parses a type which values may have, that is, anything but `void`.
    fn parse_value_type(&mut self) -> Result<TypeName> {
        let ty = self.parse_type()?;
        if ty.ty == Type::Void {
            return Err(ty.span.wrap(Error::IllegalVoid));
        }
        Ok(ty)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.peek().clone();
        let span = token.span();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                let name = self.ident_interner.intern(&name);
                Ok(Ident { name, span })
            }
            actual => Err(span.wrap(Error::ExpectedIdentifier { actual })),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr<Untyped>> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr<Untyped>> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let Some((lbp, rbp)) = Self::infix_binding_power(&self.peek().kind) else {
                // Not an infix operator
                break;
            };
            if lbp < min_bp {
                // Operator binds less tightly than the minimum required
                break;
            }
            let op_token = self.advance();
            lhs = self.parse_led(op_token, lhs, rbp)?;
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping)
    fn parse_nud(&mut self, token: Token) -> Result<Expr<Untyped>> {
        let span = token.span();
        let kind = match token.kind {
            TokenKind::Identifier(ref name) => ExprKind::Id(Ident {
                name: self.ident_interner.intern(name),
                span,
            }),
            TokenKind::IntLiteral(value) => ExprKind::Literal(Literal::Int(value)),
            TokenKind::FloatLiteral(value) => ExprKind::Literal(Literal::Float(value)),
            TokenKind::StrLiteral(value) => ExprKind::Literal(Literal::Str(value)),
            TokenKind::True => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::False => ExprKind::Literal(Literal::Bool(false)),

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let end = self.consume(&TokenKind::RParen)?;
                return Ok(Expr {
                    span: span.to(end.span()),
                    ..expr
                });
            }

            // Prefix operators: -, not
            kind @ (TokenKind::Minus | TokenKind::Not) => {
                let op = match kind {
                    TokenKind::Minus => UnaryOperator::Neg,
                    _ => UnaryOperator::Not,
                };
                let expr = self.parse_expr_bp(Self::PREFIX_BINDING_POWER)?;
                let span = span.to(expr.span);
                return Ok(Expr {
                    kind: ExprKind::Unary {
                        op,
                        expr: Box::new(expr),
                    },
                    span,
                    info: (),
                });
            }

            actual => {
                let error = Error::ExpectedExpression { actual };
                return Err(span.wrap(error));
            }
        };

        Ok(Expr {
            kind,
            span,
            info: (),
        })
    }

    /// led: Parses tokens that follow a left-hand-side expression
    /// (infix/postfix operators)
    fn parse_led(&mut self, op_token: Token, lhs: Expr<Untyped>, rbp: u8) -> Result<Expr<Untyped>> {
        let (kind, span) = match op_token.kind {
            // Call: ID ( [expr [, expr]*] )
            TokenKind::LParen => {
                let ExprKind::Id(callee) = lhs.kind else {
                    return Err(lhs.span.wrap(Error::InvalidCallee));
                };
                let args = self.parse_list(&TokenKind::RParen, &TokenKind::Comma, |p| {
                    p.parse_expr()
                })?;
                let end = self.consume(&TokenKind::RParen)?;
                let call = ExprKind::Call { callee, args };
                (call, lhs.span.to(end.span()))
            }

            ref kind => {
                let op = match kind {
                    TokenKind::Plus => BinaryOperator::Add,
                    TokenKind::Minus => BinaryOperator::Sub,
                    TokenKind::Star => BinaryOperator::Mul,
                    TokenKind::Slash => BinaryOperator::Div,
                    TokenKind::EqEq => BinaryOperator::Eq,
                    TokenKind::NotEq => BinaryOperator::NotEq,
                    TokenKind::Less => BinaryOperator::Less,
                    TokenKind::LessEq => BinaryOperator::LessEq,
                    TokenKind::Greater => BinaryOperator::Greater,
                    TokenKind::GreaterEq => BinaryOperator::GreaterEq,
                    other => unreachable!("{other:?} has no infix binding power"),
                };
                // Parse right operand with correct precedence
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let binary = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (binary, span)
            }
        };

        Ok(Expr {
            kind,
            span,
            info: (),
        })
    }

    /// Parses `item (delim item)*` until `end_delim` is found. Does **NOT**
    /// consume the end delimiter. A trailing separator is accepted.
    fn parse_list<T>(
        &mut self,
        end_delim: &TokenKind,
        separator: &TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while !self.is(end_delim) && !self.is(&TokenKind::Eof) {
            items.push(parse_item(self)?);

            // After consuming an item, we must consume the separator.
            if !self.take(separator) {
                if self.is(end_delim) {
                    // If, however, it is not present, then we check if the end
                    // delimiter is current. If so, we can stop.
                    break;
                }
                let c = self.peek();
                let error = Error::UnexpectedAny {
                    actual: c.kind.clone(),
                    expected: Box::from([separator.clone(), end_delim.clone()]),
                };
                return Err(c.span().wrap(error));
            }
        }
        Ok(items)
    }

    const PREFIX_BINDING_POWER: u8 = 11;

    fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            // Comparisons (left-associative)
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Less
            | TokenKind::LessEq
            | TokenKind::Greater
            | TokenKind::GreaterEq => (5, 6),

            // Addition/Subtraction (left-associative)
            TokenKind::Plus | TokenKind::Minus => (7, 8),

            // Multiplication/Division (left-associative)
            TokenKind::Star | TokenKind::Slash => (9, 10),

            // Function call
            TokenKind::LParen => (13, 14),

            _ => return None,
        };
        Some(bp)
    }
}

impl<'tok, 'ident> Parser<'tok, 'ident> {
    fn new(tokens: &'tok [Token], ident_interner: &'ident mut Interner) -> Parser<'tok, 'ident> {
        let end = tokens.last().map_or(0, |t| t.span().hi());
        Parser {
            tokens,
            ident_interner,
            cursor: 0,
            eof: Token::new(TokenKind::Eof, Span::new_of_length(end, 0)),
        }
    }
}

impl Parser<'_, '_> {
    /// Returns the current token.
    #[inline]
    fn peek(&self) -> &Token {
        self.nth(0)
    }

    /// Returns the token `n` positions ahead of the current one.
    fn nth(&self, n: usize) -> &Token {
        self.tokens.get(self.cursor + n).unwrap_or(&self.eof)
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let c = self.peek().clone();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: &TokenKind) -> bool {
        self.peek().kind == *expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: &TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, fails with an error.
    fn consume(&mut self, expect: &TokenKind) -> Result<Token> {
        if self.is(expect) {
            return Ok(self.advance());
        }
        let c = self.peek();
        let error = Error::Unexpected {
            actual: c.kind.clone(),
            expected: expect.clone(),
        };
        Err(c.span().wrap(error))
    }

    /// Advances if the current token matches any of the provided tokens.
    /// If not, fails with an error.
    fn consume_any(&mut self, expect: &[TokenKind]) -> Result<Token> {
        if expect.iter().any(|t| self.is(t)) {
            return Ok(self.advance());
        }
        let c = self.peek();
        let error = Error::UnexpectedAny {
            actual: c.kind.clone(),
            expected: Box::from(expect),
        };
        Err(c.span().wrap(error))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    /// Only declarations may appear at the top level.
    ExpectedItem {
        actual: TokenKind,
    },
    ExpectedType {
        actual: TokenKind,
    },
    ExpectedIdentifier {
        actual: TokenKind,
    },
    ExpectedExpression {
        actual: TokenKind,
    },
    /// `void` used for a variable or parameter.
    IllegalVoid,
    /// A function declaration inside a block.
    NestedFunction,
    InvalidAssignmentTarget,
    InvalidCallee,
    EmptyBlock,
}

impl Error {
    pub fn code(&self) -> &'static str {
        use Error::*;
        match self {
            Unexpected { .. } | UnexpectedAny { .. } => "UnexpectedToken",
            ExpectedItem { .. } => "ExpectedDeclaration",
            ExpectedType { .. } => "ExpectedType",
            ExpectedIdentifier { .. } => "ExpectedIdentifier",
            ExpectedExpression { .. } => "ExpectedExpression",
            IllegalVoid => "IllegalVoid",
            NestedFunction => "NestedFunction",
            InvalidAssignmentTarget => "InvalidAssignmentTarget",
            InvalidCallee => "InvalidCallee",
            EmptyBlock => "EmptyBlock",
        }
    }
}
