// program   ::= (var_decl | func_decl)*
// var_decl  ::= TYPE ID '=' expr ';'
// func_decl ::= TYPE ID '(' [TYPE ID (',' TYPE ID)*] ')' block
// block     ::= ':' NEWLINE INDENT stmt+ DEDENT
//             | ':' simple_stmt
// stmt      ::= var_decl
//             | ID '=' expr ';'
//             | return [expr] ';'
//             | pass ';'
//             | expr ';'
//             | if expr block (elif expr block)* [else block]
//             | while expr block
//             | for ID in range '(' expr ')' block
// expr      ::= expr ('==' | '!=' | '<' | '<=' | '>' | '>=') expr
//             | expr ('+' | '-') expr
//             | expr ('*' | '/') expr
//             | ('-' | not) expr
//             | ID '(' [expr (',' expr)*] ')'
//             | '(' expr ')'
//             | ID
//             | integer
//             | float
//             | string
//             | true
//             | false

// Precedence
//
// - not (prefix)
// * /
// + -
// == != < <= > >=

use std::fmt;

use crate::{token::Span, types::Type, util::intern::Interned};

/// Describes the extra information attached to the tree by a pass.
///
/// The parser produces [`Untyped`] trees. The type checker maps them into
/// [`Typed`] ones, which is the only kind the code generator accepts.
pub trait Info {
    type Expr: fmt::Debug + PartialEq;
    type Assign: fmt::Debug + PartialEq;
}

#[derive(Debug, PartialEq)]
pub struct Untyped;

impl Info for Untyped {
    type Expr = ();
    type Assign = ();
}

#[derive(Debug, PartialEq)]
pub struct Typed;

impl Info for Typed {
    type Expr = Type;
    type Assign = Resolution;
}

/// Where an assignment target lives in the generated program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Local,
    Global,
}

#[derive(Debug, PartialEq)]
pub struct Program<I: Info> {
    pub items: Vec<Item<I>>,
}

impl<I: Info> Default for Program<I> {
    fn default() -> Self {
        Program { items: Vec::new() }
    }
}

#[derive(Debug, PartialEq)]
pub enum Item<I: Info> {
    Variable(Variable<I>),
    Function(Function<I>),
}

#[derive(Debug, PartialEq)]
pub struct Variable<I: Info> {
    pub ty: TypeName,
    pub name: Ident,
    pub value: Expr<I>,
}

#[derive(Debug, PartialEq)]
pub struct Function<I: Info> {
    pub return_ty: TypeName,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Block<I>,
}

#[derive(Debug, PartialEq)]
pub struct Param {
    pub ty: TypeName,
    pub name: Ident,
}

/// A non-empty sequence of statements.
#[derive(Debug, PartialEq)]
pub struct Block<I: Info> {
    pub stmts: Vec<Stmt<I>>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Stmt<I: Info> {
    pub kind: StmtKind<I>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind<I: Info> {
    Variable(Variable<I>),
    Assignment {
        target: Ident,
        value: Expr<I>,
        info: I::Assign,
    },
    /// `elif` arms are nested conditionals, each being the only statement of
    /// the previous arm's else block.
    If {
        predicate: Expr<I>,
        then_block: Block<I>,
        else_block: Option<Block<I>>,
    },
    While {
        predicate: Expr<I>,
        body: Block<I>,
    },
    /// `for var in range(bound)`, counting from zero.
    For {
        var: Ident,
        bound: Expr<I>,
        body: Block<I>,
    },
    Return(Option<Expr<I>>),
    Expr(Expr<I>),
    Pass,
}

#[derive(Debug, PartialEq)]
pub struct Expr<I: Info> {
    pub kind: ExprKind<I>,
    pub span: Span,
    pub info: I::Expr,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind<I: Info> {
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr<I>>,
        rhs: Box<Expr<I>>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr<I>>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr<I>>,
    },
    Id(Ident),
    Literal(Literal),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(Box<str>),
    Bool(bool),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::Int,
            Literal::Float(_) => Type::Float,
            Literal::Str(_) => Type::Str,
            Literal::Bool(_) => Type::Bool,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Not => "not",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        use BinaryOperator::*;
        matches!(self, Eq | NotEq | Less | LessEq | Greater | GreaterEq)
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Eq => "==",
            NotEq => "!=",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
        }
    }
}

/// A written type annotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub ty: Type,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: Interned,
    pub span: Span,
}

impl From<Ident> for Interned {
    fn from(value: Ident) -> Self {
        value.name
    }
}

impl From<&Ident> for Interned {
    fn from(value: &Ident) -> Self {
        value.name
    }
}
