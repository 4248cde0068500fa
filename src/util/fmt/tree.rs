use std::io::Write;

use crate::{ast::*, types::Type, util::intern::Interner};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string<I: InfoWriter>(idents: &Interner, program: &Program<I>) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).expect("writes to a Vec don't fail");
    String::from_utf8(buf).expect("tree output is valid utf-8")
}

pub fn print_expr_string<I: InfoWriter>(idents: &Interner, expr: &Expr<I>) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).expect("writes to a Vec don't fail");
    String::from_utf8(buf).expect("tree output is valid utf-8")
}

pub fn print_program<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    program: &Program<I>,
) -> std::io::Result<()> {
    for item in &program.items {
        match item {
            Item::Variable(variable) => print_variable(w, idents, 0, variable)?,
            Item::Function(function) => print_function(w, idents, 0, function)?,
        }
    }
    Ok(())
}

fn print_variable<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    variable: &Variable<I>,
) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(
        w,
        "variable {}: {}",
        idents.get(variable.name),
        variable.ty.ty
    )?;
    print_expr(w, idents, i + 1, &variable.value)
}

fn print_function<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    function: &Function<I>,
) -> std::io::Result<()> {
    sp(w, i)?;
    write!(w, "function {}(", idents.get(function.name))?;
    for (idx, param) in function.params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{}: {}", idents.get(param.name), param.ty.ty)?;
    }
    writeln!(w, ") -> {}", function.return_ty.ty)?;
    print_block(w, idents, i + 1, &function.body)
}

fn print_block<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    block: &Block<I>,
) -> std::io::Result<()> {
    for stmt in &block.stmts {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

fn print_stmt<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    stmt: &Stmt<I>,
) -> std::io::Result<()> {
    match &stmt.kind {
        StmtKind::Variable(variable) => print_variable(w, idents, i, variable)?,
        StmtKind::Assignment {
            target,
            value,
            info,
        } => {
            sp(w, i)?;
            let info = info.write_resolved();
            writeln!(w, "assignment {}{info}", idents.get(target))?;
            print_expr(w, idents, i + 1, value)?;
        }
        StmtKind::If {
            predicate,
            then_block,
            else_block,
        } => {
            sp(w, i)?;
            writeln!(w, "if")?;
            print_expr(w, idents, i + 1, predicate)?;
            sp(w, i)?;
            writeln!(w, "then")?;
            print_block(w, idents, i + 1, then_block)?;
            if let Some(else_block) = else_block {
                sp(w, i)?;
                writeln!(w, "else")?;
                print_block(w, idents, i + 1, else_block)?;
            }
        }
        StmtKind::While { predicate, body } => {
            sp(w, i)?;
            writeln!(w, "while")?;
            print_expr(w, idents, i + 1, predicate)?;
            sp(w, i)?;
            writeln!(w, "do")?;
            print_block(w, idents, i + 1, body)?;
        }
        StmtKind::For { var, bound, body } => {
            sp(w, i)?;
            writeln!(w, "for {} in range", idents.get(var))?;
            print_expr(w, idents, i + 1, bound)?;
            sp(w, i)?;
            writeln!(w, "do")?;
            print_block(w, idents, i + 1, body)?;
        }
        StmtKind::Return(value) => {
            sp(w, i)?;
            writeln!(w, "return")?;
            if let Some(value) = value {
                print_expr(w, idents, i + 1, value)?;
            }
        }
        StmtKind::Expr(expr) => {
            sp(w, i)?;
            writeln!(w, "expression")?;
            print_expr(w, idents, i + 1, expr)?;
        }
        StmtKind::Pass => {
            sp(w, i)?;
            writeln!(w, "pass")?;
        }
    }
    Ok(())
}

pub fn print_expr<I: InfoWriter>(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    expr: &Expr<I>,
) -> std::io::Result<()> {
    sp(w, i)?;
    let info = expr.info.write_resolved(); // inferred type, for typed trees
    let span = expr.span;
    match &expr.kind {
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span}){info}")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Unary {
            op,
            expr: inner_expr,
        } => {
            writeln!(w, "unary {op:?} ({span}){info}")?;
            print_expr(w, idents, i + 1, inner_expr)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {} ({span}){info}", idents.get(callee))?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
        ExprKind::Id(ident) => {
            writeln!(w, "ident {} ({span}){info}", idents.get(ident))?;
        }
        ExprKind::Literal(Literal::Int(val)) => {
            writeln!(w, "int {val} ({span}){info}")?;
        }
        ExprKind::Literal(Literal::Float(val)) => {
            writeln!(w, "float {val:?} ({span}){info}")?;
        }
        ExprKind::Literal(Literal::Str(val)) => {
            writeln!(w, "string {val:?} ({span}){info}")?;
        }
        ExprKind::Literal(Literal::Bool(val)) => {
            writeln!(w, "bool {val} ({span}){info}")?;
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub trait InfoWriter: Info<Expr: NameWriter, Assign: NameWriter> {}

impl<I> InfoWriter for I
where
    I: Info,
    I::Expr: NameWriter,
    I::Assign: NameWriter,
{
}

/// Writes the information a pass attached to a node, if any.
pub trait NameWriter {
    fn write_resolved(&self) -> impl std::fmt::Display;
}

impl NameWriter for () {
    fn write_resolved(&self) -> impl std::fmt::Display {
        ""
    }
}

struct Resolved(&'static str);

impl std::fmt::Display for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, " %: {}", self.0)
    }
}

impl NameWriter for Type {
    fn write_resolved(&self) -> impl std::fmt::Display {
        Resolved(self.name())
    }
}

impl NameWriter for Resolution {
    fn write_resolved(&self) -> impl std::fmt::Display {
        Resolved(match self {
            Resolution::Local => "local",
            Resolution::Global => "global",
        })
    }
}
