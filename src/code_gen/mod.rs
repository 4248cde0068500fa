use std::{
    fmt::{self, Write},
    format_args as f,
};

use tracing::debug;

use crate::{
    ast::{
        BinaryOperator, Block, Expr, ExprKind, Function, Item, Literal, Program, Resolution, Stmt,
        StmtKind, Typed, UnaryOperator, Variable,
    },
    types::Type,
    util::intern::{Interned, Interner},
    Options,
};


const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

/// Generates Python source from a checked program.
pub struct CodeGen<'a> {
    code: String,
    ident_interner: &'a Interner,
    options: &'a Options,
    depth: usize,
}

impl<'a> CodeGen<'a> {
    pub fn new(ident_interner: &'a Interner, options: &'a Options) -> CodeGen<'a> {
        CodeGen {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            ident_interner,
            options,
            depth: 0,
        }
    }

    pub fn gen(mut self, program: &Program<Typed>) -> String {
        self.gen_program(program);
        debug!(bytes = self.code.len(), "generated python");
        self.code
    }

    fn gen_program(&mut self, program: &Program<Typed>) {
        let mut previous_is_function = None;
        for item in &program.items {
            let is_function = matches!(item, Item::Function(_));
            if previous_is_function.is_some_and(|previous| previous || is_function) {
                self.blank_line();
            }
            match item {
                Item::Variable(variable) => self.gen_variable(variable),
                Item::Function(function) => self.gen_function(function),
            }
            previous_is_function = Some(is_function);
        }

        if self.options.entry_point && self.has_entry_point(program) {
            if !program.items.is_empty() {
                self.blank_line();
            }
            self.line(f!("if __name__ == \"__main__\":"));
            self.indented(|this| this.line(f!("main()")));
        }
    }

    /// Whether the program defines a `main` function without parameters.
    fn has_entry_point(&self, program: &Program<Typed>) -> bool {
        let Some(main) = self.ident_interner.lookup("main") else {
            return false;
        };
        program.items.iter().any(|item| {
            matches!(item, Item::Function(function)
                if function.name.name == main && function.params.is_empty())
        })
    }

    fn gen_variable(&mut self, variable: &Variable<Typed>) {
        let name = self.ident(variable.name);
        let value = self.expr(&variable.value);
        self.line(f!("{name} = {value}"));
    }

    fn gen_function(&mut self, function: &Function<Typed>) {
        let params: Vec<_> = function
            .params
            .iter()
            .map(|param| self.ident(param.name).to_string())
            .collect();
        let name = self.ident(function.name);
        self.line(f!("def {name}({}):", params.join(", ")));

        self.indented(|this| {
            let globals = assigned_globals(&function.body);
            if !globals.is_empty() {
                let globals: Vec<_> = globals
                    .into_iter()
                    .map(|name| this.ident(name).to_string())
                    .collect();
                this.line(f!("global {}", globals.join(", ")));
            }
            this.gen_block(&function.body);
        });
    }

    fn gen_block(&mut self, block: &Block<Typed>) {
        for stmt in &block.stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt<Typed>) {
        match &stmt.kind {
            StmtKind::Variable(variable) => self.gen_variable(variable),
            StmtKind::Assignment { target, value, .. } => {
                let target = self.ident(target);
                let value = self.expr(value);
                self.line(f!("{target} = {value}"));
            }
            StmtKind::If {
                predicate,
                then_block,
                else_block,
            } => self.gen_if("if", predicate, then_block, else_block.as_ref()),
            StmtKind::While { predicate, body } => {
                let predicate = self.expr(predicate);
                self.line(f!("while {predicate}:"));
                self.indented(|this| this.gen_block(body));
            }
            StmtKind::For { var, bound, body } => {
                let var = self.ident(var);
                let bound = self.expr(bound);
                self.line(f!("for {var} in range({bound}):"));
                self.indented(|this| this.gen_block(body));
            }
            StmtKind::Return(Some(value)) => {
                let value = self.expr(value);
                self.line(f!("return {value}"));
            }
            StmtKind::Return(None) => self.line(f!("return")),
            StmtKind::Expr(expr) => {
                let expr = self.expr(expr);
                self.line(f!("{expr}"));
            }
            StmtKind::Pass => self.line(f!("pass")),
        }
    }

    /// Emits a conditional. An else block made of a single conditional is
    /// folded into an `elif` arm.
    fn gen_if(
        &mut self,
        keyword: &str,
        predicate: &Expr<Typed>,
        then_block: &Block<Typed>,
        else_block: Option<&Block<Typed>>,
    ) {
        let predicate = self.expr(predicate);
        self.line(f!("{keyword} {predicate}:"));
        self.indented(|this| this.gen_block(then_block));

        let Some(else_block) = else_block else {
            return;
        };
        if let [Stmt {
            kind:
                StmtKind::If {
                    predicate,
                    then_block,
                    else_block,
                },
            ..
        }] = else_block.stmts.as_slice()
        {
            self.gen_if("elif", predicate, then_block, else_block.as_ref());
        } else {
            self.line(f!("else:"));
            self.indented(|this| this.gen_block(else_block));
        }
    }
}

/// Returns the global variables assigned anywhere in the block, in the order
/// of their first assignment.
fn assigned_globals(block: &Block<Typed>) -> Vec<Interned> {
    fn visit(block: &Block<Typed>, globals: &mut Vec<Interned>) {
        for stmt in &block.stmts {
            match &stmt.kind {
                StmtKind::Assignment {
                    target,
                    info: Resolution::Global,
                    ..
                } => {
                    if !globals.contains(&target.name) {
                        globals.push(target.name);
                    }
                }
                StmtKind::If {
                    then_block,
                    else_block,
                    ..
                } => {
                    visit(then_block, globals);
                    if let Some(else_block) = else_block {
                        visit(else_block, globals);
                    }
                }
                StmtKind::While { body, .. } | StmtKind::For { body, .. } => visit(body, globals),
                _ => (),
            }
        }
    }

    let mut globals = Vec::new();
    visit(block, &mut globals);
    globals
}

// Utility functions.
impl<'a> CodeGen<'a> {
    fn emit(&mut self, f: fmt::Arguments<'_>) {
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
    }

    /// Emits an indented line.
    fn line(&mut self, f: fmt::Arguments<'_>) {
        let width = self.depth * self.options.indent_width.get();
        self.emit(f!("{:width$}{f}\n", ""));
    }

    fn blank_line(&mut self) {
        self.code.push('\n');
    }

    /// Emits lines one level deeper.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    fn ident(&self, handle: impl Into<Interned>) -> PyIdent<'a> {
        PyIdent::new(self.ident_interner, handle)
    }

    fn expr<'e>(&self, expr: &'e Expr<Typed>) -> PyExpr<'a, 'e> {
        PyExpr {
            idents: self.ident_interner,
            expr,
            min_precedence: 0,
        }
    }
}

/// Python's reserved words, which can't be used as identifiers.
static PYTHON_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
};

/// An identifier, renamed if it collides with a Python reserved word.
///
/// A reserved word gets the shortest run of trailing underscores which
/// doesn't spell another identifier of the program.
#[derive(Copy, Clone)]
struct PyIdent<'i> {
    idents: &'i Interner,
    name: &'i str,
}

impl<'i> PyIdent<'i> {
    fn new(idents: &'i Interner, handle: impl Into<Interned>) -> PyIdent<'i> {
        PyIdent {
            idents,
            name: idents.get(handle),
        }
    }
}

impl fmt::Display for PyIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !PYTHON_KEYWORDS.contains(self.name) {
            return f.write_str(self.name);
        }
        let mut renamed = format!("{}_", self.name);
        while self.idents.lookup(&renamed).is_some() {
            renamed.push('_');
        }
        f.write_str(&renamed)
    }
}

/// An expression in Python syntax. Parenthesized if its own precedence is
/// lower than `min_precedence`.
struct PyExpr<'i, 'e> {
    idents: &'i Interner,
    expr: &'e Expr<Typed>,
    min_precedence: u8,
}

// Python precedence levels, loosest first.
const NOT: u8 = 1;
const COMPARISON: u8 = 2;
const ADDITIVE: u8 = 3;
const MULTIPLICATIVE: u8 = 4;
const NEGATION: u8 = 5;
const PRIMARY: u8 = 6;

fn precedence(kind: &ExprKind<Typed>) -> u8 {
    match kind {
        ExprKind::Binary { op, .. } => match op {
            BinaryOperator::Add | BinaryOperator::Sub => ADDITIVE,
            BinaryOperator::Mul | BinaryOperator::Div => MULTIPLICATIVE,
            _ => COMPARISON,
        },
        ExprKind::Unary {
            op: UnaryOperator::Neg,
            ..
        } => NEGATION,
        ExprKind::Unary {
            op: UnaryOperator::Not,
            ..
        } => NOT,
        ExprKind::Call { .. } | ExprKind::Id(_) | ExprKind::Literal(_) => PRIMARY,
    }
}

impl<'i> PyExpr<'i, '_> {
    fn sub<'s>(&self, expr: &'s Expr<Typed>, min_precedence: u8) -> PyExpr<'i, 's> {
        PyExpr {
            idents: self.idents,
            expr,
            min_precedence,
        }
    }
}

impl fmt::Display for PyExpr<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precedence = precedence(&self.expr.kind);
        let parenthesize = precedence < self.min_precedence;
        if parenthesize {
            f.write_str("(")?;
        }

        match &self.expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                let symbol = match op {
                    BinaryOperator::Div if lhs.info == Type::Int && rhs.info == Type::Int => "//",
                    op => op.symbol(),
                };
                // Python chains comparisons, so these never nest unparenthesized.
                let (lhs_min, rhs_min) = if op.is_comparison() {
                    (ADDITIVE, ADDITIVE)
                } else {
                    (precedence, precedence + 1)
                };
                let lhs = self.sub(lhs, lhs_min);
                let rhs = self.sub(rhs, rhs_min);
                write!(f, "{lhs} {symbol} {rhs}")?;
            }
            ExprKind::Unary { op, expr } => match op {
                UnaryOperator::Neg => write!(f, "-{}", self.sub(expr, NEGATION))?,
                UnaryOperator::Not => write!(f, "not {}", self.sub(expr, NOT))?,
            },
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", PyIdent::new(self.idents, callee))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.sub(arg, 0))?;
                }
                f.write_str(")")?;
            }
            ExprKind::Id(ident) => write!(f, "{}", PyIdent::new(self.idents, ident))?,
            ExprKind::Literal(literal) => write_literal(f, literal)?,
        }

        if parenthesize {
            f.write_str(")")?;
        }
        Ok(())
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::Int(value) => write!(f, "{value}"),
        // Debug keeps the decimal point of integral values, such as `1.0`.
        Literal::Float(value) => write!(f, "{value:?}"),
        Literal::Bool(true) => f.write_str("True"),
        Literal::Bool(false) => f.write_str("False"),
        Literal::Str(value) => {
            f.write_char('"')?;
            for c in value.chars() {
                match c {
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    // Every control character is below U+00A0.
                    c if c.is_control() => write!(f, "\\x{:02x}", u32::from(c))?,
                    c => f.write_char(c)?,
                }
            }
            f.write_char('"')
        }
    }
}
