use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{
    ast::{
        BinaryOperator, Block, Expr, ExprKind, Function, Ident, Item, Program, Resolution, Stmt,
        StmtKind, Typed, UnaryOperator, Untyped, Variable,
    },
    token::{Span, Spanned},
    types::Type,
    util::intern::{Interned, Interner},
};

/// An expression's typed tree along with its type, if it could be determined.
///
/// An unknown type means an error was already reported for the expression;
/// enclosing expressions don't report further errors because of it.
type Checked = (Expr<Typed>, Option<Type>);

const GLOBAL_SCOPE: ScopeId = 0;

pub struct Checker<'ident> {
    ident_interner: &'ident Interner,
    scopes: Vec<Scope>,
    current: ScopeId,
    /// The function whose body is being checked, if any.
    function: Option<FunctionContext>,
    errors: Vec<Spanned<Error>>,
}

impl<'ident> Checker<'ident> {
    pub fn new(ident_interner: &'ident Interner) -> Checker<'ident> {
        Checker::with_capacity(ident_interner, 16)
    }

    pub fn with_capacity(ident_interner: &'ident Interner, capacity: usize) -> Checker<'ident> {
        let mut scopes = Vec::with_capacity(capacity);
        scopes.push(Scope::new(None));
        Checker {
            ident_interner,
            scopes,
            current: GLOBAL_SCOPE,
            function: None,
            errors: Vec::with_capacity(8),
        }
    }

    /// Checks the whole program. Errors don't stop the check; all of them are
    /// returned, in source order per item.
    pub fn check(
        mut self,
        program: Program<Untyped>,
    ) -> Result<Program<Typed>, Vec<Spanned<Error>>> {
        self.declare_functions(&program);

        let items = program
            .items
            .into_iter()
            .map(|item| match item {
                Item::Variable(variable) => Item::Variable(self.check_global(variable)),
                Item::Function(function) => Item::Function(self.check_function(function)),
            })
            .collect();

        debug!(
            scopes = self.scopes.len(),
            errors = self.errors.len(),
            "checked program"
        );
        if self.errors.is_empty() {
            Ok(Program { items })
        } else {
            Err(self.errors)
        }
    }

    /// Declares every top-level function before any body is checked, so that
    /// functions may call the ones defined after them.
    fn declare_functions(&mut self, program: &Program<Untyped>) {
        for item in &program.items {
            let Item::Function(function) = item else {
                continue;
            };
            let symbol = Symbol::Function {
                params: function.params.iter().map(|param| param.ty.ty).collect(),
                return_ty: function.return_ty.ty,
                span: function.name.span,
            };
            self.declare(function.name, symbol);
        }
    }

    fn check_global(&mut self, variable: Variable<Untyped>) -> Variable<Typed> {
        let value = self.check_expr(variable.value);
        self.expect(&value, variable.ty.ty);
        let symbol = Symbol::Variable {
            ty: variable.ty.ty,
            span: variable.name.span,
        };
        self.declare(variable.name, symbol);
        Variable {
            ty: variable.ty,
            name: variable.name,
            value: value.0,
        }
    }

    fn check_function(&mut self, function: Function<Untyped>) -> Function<Typed> {
        trace!(name = self.ident_interner.get(function.name), "checking function");
        let return_ty = function.return_ty.ty;

        self.enter_scope();
        self.function = Some(FunctionContext {
            return_ty,
            locals: HashSet::new(),
            globals: HashSet::new(),
            conflicts: HashSet::new(),
        });
        for param in &function.params {
            self.declare_local(param.name, param.ty.ty);
        }
        let body = self.check_block(function.body);
        self.function = None;
        self.exit_scope();

        if return_ty != Type::Void && !block_returns(&body) {
            let name = function.name.name;
            let error = Error::MissingReturn { name, return_ty };
            self.errors.push(function.name.span.wrap(error));
        }

        Function {
            return_ty: function.return_ty,
            name: function.name,
            params: function.params,
            body,
        }
    }

    fn check_block(&mut self, block: Block<Untyped>) -> Block<Typed> {
        self.enter_scope();
        let stmts = block
            .stmts
            .into_iter()
            .map(|stmt| self.check_stmt(stmt))
            .collect();
        self.exit_scope();
        Block {
            stmts,
            span: block.span,
        }
    }

    fn check_stmt(&mut self, stmt: Stmt<Untyped>) -> Stmt<Typed> {
        let span = stmt.span;
        let kind = match stmt.kind {
            StmtKind::Variable(variable) => {
                let value = self.check_expr(variable.value);
                self.expect(&value, variable.ty.ty);
                self.declare_local(variable.name, variable.ty.ty);
                StmtKind::Variable(Variable {
                    ty: variable.ty,
                    name: variable.name,
                    value: value.0,
                })
            }
            StmtKind::Assignment { target, value, .. } => {
                let value = self.check_expr(value);
                let info = match self.resolve(target) {
                    Some((Symbol::Variable { ty, .. }, resolution)) => {
                        self.expect(&value, ty);
                        resolution
                    }
                    Some((Symbol::Function { .. }, resolution)) => {
                        let error = Error::NotAVariable(target.name);
                        self.errors.push(target.span.wrap(error));
                        resolution
                    }
                    None => {
                        let error = Error::UndefinedVariable(target.name);
                        self.errors.push(target.span.wrap(error));
                        Resolution::Local
                    }
                };
                StmtKind::Assignment {
                    target,
                    value: value.0,
                    info,
                }
            }
            StmtKind::If {
                predicate,
                then_block,
                else_block,
            } => {
                let predicate = self.check_expr(predicate);
                self.expect(&predicate, Type::Bool);
                StmtKind::If {
                    predicate: predicate.0,
                    then_block: self.check_block(then_block),
                    else_block: else_block.map(|block| self.check_block(block)),
                }
            }
            StmtKind::While { predicate, body } => {
                let predicate = self.check_expr(predicate);
                self.expect(&predicate, Type::Bool);
                StmtKind::While {
                    predicate: predicate.0,
                    body: self.check_block(body),
                }
            }
            StmtKind::For { var, bound, body } => {
                let bound = self.check_expr(bound);
                self.expect(&bound, Type::Int);
                // The loop variable lives in a scope of its own, enclosing the
                // body's one.
                self.enter_scope();
                self.declare_local(var, Type::Int);
                let body = self.check_block(body);
                self.exit_scope();
                StmtKind::For {
                    var,
                    bound: bound.0,
                    body,
                }
            }
            StmtKind::Return(value) => {
                let return_ty = self.return_ty();
                match value {
                    Some(value) => {
                        let value = self.check_expr(value);
                        if return_ty == Type::Void {
                            self.errors.push(span.wrap(Error::UnexpectedReturnValue));
                        } else {
                            self.expect(&value, return_ty);
                        }
                        StmtKind::Return(Some(value.0))
                    }
                    None => {
                        if return_ty != Type::Void {
                            let error = Error::MissingReturnValue { return_ty };
                            self.errors.push(span.wrap(error));
                        }
                        StmtKind::Return(None)
                    }
                }
            }
            StmtKind::Expr(expr) => StmtKind::Expr(self.check_expr(expr).0),
            StmtKind::Pass => StmtKind::Pass,
        };
        Stmt { kind, span }
    }

    fn check_expr(&mut self, expr: Expr<Untyped>) -> Checked {
        let span = expr.span;
        let (kind, ty) = match expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                let (lhs, lhs_ty) = self.check_expr(*lhs);
                let (rhs, rhs_ty) = self.check_expr(*rhs);
                let ty = self.check_binary(span, op, lhs_ty, rhs_ty);
                let kind = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (kind, ty)
            }
            ExprKind::Unary { op, expr } => {
                let (expr, expr_ty) = self.check_expr(*expr);
                let ty = match (op, expr_ty) {
                    (UnaryOperator::Neg, Some(ty)) if ty.is_numeric() => Some(ty),
                    (UnaryOperator::Not, Some(Type::Bool)) => Some(Type::Bool),
                    (UnaryOperator::Neg, None) => None,
                    (UnaryOperator::Not, None) => Some(Type::Bool),
                    (op, Some(ty)) => {
                        self.errors
                            .push(span.wrap(Error::InvalidOperand { op, operand: ty }));
                        (op == UnaryOperator::Not).then_some(Type::Bool)
                    }
                };
                let kind = ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                };
                (kind, ty)
            }
            ExprKind::Call { callee, args } => {
                let args: Vec<Checked> = args.into_iter().map(|arg| self.check_expr(arg)).collect();
                if self.function.is_none() {
                    self.errors.push(span.wrap(Error::CallInGlobalInitializer));
                }
                let ty = self.check_call(span, callee, &args);
                let kind = ExprKind::Call {
                    callee,
                    args: args.into_iter().map(|(arg, _)| arg).collect(),
                };
                (kind, ty)
            }
            ExprKind::Id(ident) => {
                let ty = match self.resolve(ident) {
                    Some((Symbol::Variable { ty, .. }, _)) => Some(ty),
                    Some((Symbol::Function { .. }, _)) => {
                        let error = Error::NotAVariable(ident.name);
                        self.errors.push(span.wrap(error));
                        None
                    }
                    None => {
                        let error = Error::UndefinedVariable(ident.name);
                        self.errors.push(span.wrap(error));
                        None
                    }
                };
                (ExprKind::Id(ident), ty)
            }
            ExprKind::Literal(literal) => {
                let ty = literal.ty();
                (ExprKind::Literal(literal), Some(ty))
            }
        };
        let expr = Expr {
            kind,
            span,
            // Only reachable by trees which will be discarded.
            info: ty.unwrap_or(Type::Void),
        };
        (expr, ty)
    }

    fn check_binary(
        &mut self,
        span: Span,
        op: BinaryOperator,
        lhs: Option<Type>,
        rhs: Option<Type>,
    ) -> Option<Type> {
        if op.is_comparison() {
            if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                if lhs != rhs || lhs == Type::Void {
                    let error = Error::InvalidOperands { op, lhs, rhs };
                    self.errors.push(span.wrap(error));
                }
            }
            return Some(Type::Bool);
        }

        let (lhs, rhs) = (lhs?, rhs?);
        match (lhs, rhs) {
            (Type::Int, Type::Int) => Some(Type::Int),
            (Type::Int | Type::Float, Type::Int | Type::Float) => Some(Type::Float),
            _ => {
                let error = Error::InvalidOperands { op, lhs, rhs };
                self.errors.push(span.wrap(error));
                None
            }
        }
    }

    fn check_call(&mut self, span: Span, callee: Ident, args: &[Checked]) -> Option<Type> {
        match self.resolve(callee) {
            Some((
                Symbol::Function {
                    params, return_ty, ..
                },
                _,
            )) => {
                if params.len() == args.len() {
                    for (arg, &param) in args.iter().zip(params.iter()) {
                        self.expect(arg, param);
                    }
                } else {
                    let error = Error::ArityMismatch {
                        name: callee.name,
                        expected: params.len(),
                        actual: args.len(),
                    };
                    self.errors.push(span.wrap(error));
                }
                Some(return_ty)
            }
            Some((Symbol::Variable { .. }, _)) => {
                let error = Error::NotCallable(callee.name);
                self.errors.push(callee.span.wrap(error));
                None
            }
            None => {
                let error = Error::UndefinedFunction(callee.name);
                self.errors.push(callee.span.wrap(error));
                None
            }
        }
    }

    /// Reports a mismatch if the checked expression has a known type other than
    /// the expected one.
    fn expect(&mut self, (expr, actual): &Checked, expected: Type) {
        if let Some(actual) = *actual {
            if actual != expected {
                let error = Error::TypeMismatch { expected, actual };
                self.errors.push(expr.span.wrap(error));
            }
        }
    }
}

impl Checker<'_> {
    /// Looks the name up, innermost scope first. Inside a function, a name
    /// found in the global scope is recorded as a global reference.
    fn resolve(&mut self, ident: Ident) -> Option<(Symbol, Resolution)> {
        let (symbol, scope) = self.lookup(ident.name, |_| true)?;
        if scope != GLOBAL_SCOPE {
            return Some((symbol, Resolution::Local));
        }
        if let Some(function) = &mut self.function {
            function.globals.insert(ident.name);
            if function.locals.contains(&ident.name) && function.conflicts.insert(ident.name) {
                let error = Error::ScopeConflict(ident.name);
                self.errors.push(ident.span.wrap(error));
            }
        }
        Some((symbol, Resolution::Global))
    }

    /// Walks the scope chain, starting at the current scope, up to the first
    /// scope for which `within` returns false.
    fn lookup(
        &self,
        name: Interned,
        within: impl Fn(ScopeId) -> bool,
    ) -> Option<(Symbol, ScopeId)> {
        let mut id = Some(self.current);
        while let Some(current) = id.filter(|&id| within(id)) {
            let scope = &self.scopes[current];
            if let Some(symbol) = scope.symbols.get(&name) {
                return Some((symbol.clone(), current));
            }
            id = scope.parent;
        }
        None
    }

    /// Declares a name in the current scope. Redeclarations are reported, and
    /// the first declaration is kept.
    fn declare(&mut self, ident: Ident, symbol: Symbol) {
        let scope = &mut self.scopes[self.current];
        if let Some(previous) = scope.symbols.get(&ident.name) {
            let error = Error::DuplicateDeclaration {
                name: ident.name,
                previous: previous.span(),
            };
            self.errors.push(ident.span.wrap(error));
            return;
        }
        scope.symbols.insert(ident.name, symbol);
    }

    /// Declares a function local. Since the generated code scopes locals per
    /// function, the name may not be visible from any enclosing scope of the
    /// current function, nor be used as a global elsewhere in it.
    fn declare_local(&mut self, ident: Ident, ty: Type) {
        let visible = self.lookup(ident.name, |id| id != GLOBAL_SCOPE);
        if let Some((previous, _)) = visible {
            let error = Error::DuplicateDeclaration {
                name: ident.name,
                previous: previous.span(),
            };
            self.errors.push(ident.span.wrap(error));
            return;
        }

        if let Some(function) = &mut self.function {
            function.locals.insert(ident.name);
            if function.globals.contains(&ident.name) && function.conflicts.insert(ident.name) {
                let error = Error::ScopeConflict(ident.name);
                self.errors.push(ident.span.wrap(error));
            }
        }
        let symbol = Symbol::Variable {
            ty,
            span: ident.span,
        };
        self.scopes[self.current].symbols.insert(ident.name, symbol);
    }

    fn return_ty(&self) -> Type {
        self.function
            .as_ref()
            .map_or(Type::Void, |function| function.return_ty)
    }

    fn enter_scope(&mut self) {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(Some(self.current)));
        trace!(id, parent = self.current, "enter scope");
        self.current = id;
    }

    /// Leaves the current scope, dropping its table. Scopes are exited in
    /// reverse order of entry, so the current scope is always the last one.
    fn exit_scope(&mut self) {
        debug_assert_eq!(self.current + 1, self.scopes.len());
        let scope = &self.scopes[self.current];
        trace!(id = self.current, symbols = scope.symbols.len(), "exit scope");
        debug_assert!(scope.parent.is_some(), "can't exit the global scope");
        let parent = scope.parent.unwrap_or(GLOBAL_SCOPE);
        self.scopes.truncate(self.current.max(1));
        self.current = parent;
    }
}

/// Whether every path through the block ends in a return statement.
fn block_returns(block: &Block<Typed>) -> bool {
    block.stmts.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::If {
            then_block,
            else_block: Some(else_block),
            ..
        } => block_returns(then_block) && block_returns(else_block),
        _ => false,
    })
}

type ScopeId = usize;

struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<Interned, Symbol>,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Scope {
        Scope {
            parent,
            symbols: HashMap::new(),
        }
    }
}

#[derive(Clone)]
enum Symbol {
    Variable {
        ty: Type,
        span: Span,
    },
    Function {
        params: Rc<[Type]>,
        return_ty: Type,
        span: Span,
    },
}

impl Symbol {
    fn span(&self) -> Span {
        match self {
            Symbol::Variable { span, .. } | Symbol::Function { span, .. } => *span,
        }
    }
}

struct FunctionContext {
    return_ty: Type,
    /// Every name declared as a local so far, in any of the function's scopes.
    locals: HashSet<Interned>,
    /// Every name referenced from the global scope so far.
    globals: HashSet<Interned>,
    /// Names already reported as scope conflicts.
    conflicts: HashSet<Interned>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    TypeMismatch {
        expected: Type,
        actual: Type,
    },
    InvalidOperands {
        op: BinaryOperator,
        lhs: Type,
        rhs: Type,
    },
    InvalidOperand {
        op: UnaryOperator,
        operand: Type,
    },
    DuplicateDeclaration {
        name: Interned,
        previous: Span,
    },
    UndefinedVariable(Interned),
    UndefinedFunction(Interned),
    NotCallable(Interned),
    NotAVariable(Interned),
    ArityMismatch {
        name: Interned,
        expected: usize,
        actual: usize,
    },
    UnexpectedReturnValue,
    /// A bare `return` in a function which returns a value.
    MissingReturnValue {
        return_ty: Type,
    },
    /// A function body which may end without returning.
    MissingReturn {
        name: Interned,
        return_ty: Type,
    },
    /// A name used both as a local and as a global in the same function.
    ScopeConflict(Interned),
    CallInGlobalInitializer,
}

impl Error {
    /// The stable diagnostic code of this error.
    pub fn code(&self) -> &'static str {
        use Error::*;
        match self {
            TypeMismatch { .. } | InvalidOperands { .. } | InvalidOperand { .. } => "TypeMismatch",
            DuplicateDeclaration { .. } => "DuplicateDeclaration",
            UndefinedVariable(_) => "UndefinedVariable",
            UndefinedFunction(_) => "UndefinedFunction",
            NotCallable(_) => "NotCallable",
            NotAVariable(_) => "NotAVariable",
            ArityMismatch { .. } => "ArityMismatch",
            UnexpectedReturnValue => "UnexpectedReturnValue",
            MissingReturnValue { .. } | MissingReturn { .. } => "MissingReturn",
            ScopeConflict(_) => "ScopeConflict",
            CallInGlobalInitializer => "CallInGlobalInitializer",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::util::{intern::Interner, test_utils::tree_tests};

    use super::*;

    #[test]
    fn test_block_scopes_are_dropped_on_exit() {
        let interner = Interner::default();
        let mut checker = Checker::new(&interner);
        checker.enter_scope();
        checker.enter_scope();
        assert_eq!(checker.scopes.len(), 3);
        checker.exit_scope();
        assert_eq!((checker.current, checker.scopes.len()), (1, 2));
        checker.enter_scope();
        assert_eq!((checker.current, checker.scopes.len()), (2, 3));
        checker.exit_scope();
        checker.exit_scope();
        assert_eq!((checker.current, checker.scopes.len()), (GLOBAL_SCOPE, 1));
    }

    tree_tests!(
        use checker;

        fn test_typed_expression() {
            let expr = "1 + 2.5 * 2.0 < 3.0";
            let tree_ok = "
                binary Less (0..19) %: bool
                  binary Add (0..13) %: float
                    int 1 (0..1) %: int
                    binary Mul (4..13) %: float
                      float 2.5 (4..7) %: float
                      float 2.0 (10..13) %: float
                  float 3.0 (16..19) %: float
            ";
        }

        fn test_unary_expressions() {
            let expr = "not (-1 == 2)";
            let tree_ok = "
                unary Not (0..13) %: bool
                  binary Eq (4..13) %: bool
                    unary Neg (5..7) %: int
                      int 1 (6..7) %: int
                    int 2 (11..12) %: int
            ";
        }

        fn test_invalid_operands() {
            let expr = r#""a" + "b""#;
            let expected_errors = &["0..9: operator `+` can't be applied to str and str"];
        }

        fn test_comparison_of_different_types() {
            let expr = "1 == 1.0";
            let expected_errors = &["0..8: operator `==` can't be applied to int and float"];
        }

        fn test_invalid_unary_operands() {
            let expr = "not 1 == -true";
            let expected_errors = &[
                "0..5: operator `not` can't be applied to int",
                "9..14: operator `-` can't be applied to bool",
            ];
        }

        fn test_unknown_types_do_not_cascade() {
            let expr = "-(missing + 1) * 2 < 3";
            let expected_errors = &["2..9: variable missing is not defined"];
        }

        fn test_typed_program() {
            let program = "
int total = 0;
void add(int n):
    total = total + n;
";
            let tree_ok = "
                variable total: int
                  int 0 (13..14) %: int
                function add(n: int) -> void
                  assignment total %: global
                    binary Add (45..54) %: int
                      ident total (45..50) %: int
                      ident n (53..54) %: int
            ";
        }

        fn test_declaration_mismatch() {
            let program = "float x = 1;\nint y = 2.5;\n";
            let expected_errors = &[
                "10..11: expected type float, but got int",
                "21..24: expected type int, but got float",
            ];
        }

        fn test_no_widening_on_return() {
            let program = "
float add(int a, int b):
    return a + b;
";
            let expected_errors = &["37..42: expected type float, but got int"];
        }

        fn test_unexpected_return_value() {
            let program = "void f():\n    return 5;\n";
            let expected_errors = &["14..23: unexpected return value in void function"];
        }

        fn test_missing_return() {
            let program = "int f(): pass;\n";
            let expected_errors = &["4..5: function f may end without returning a value of type int"];
        }

        fn test_missing_return_value() {
            let program = "int f():\n    return;\n";
            let expected_errors = &["13..20: expected a return value of type int"];
        }

        fn test_return_coverage() {
            let program = "
int sign(int n):
    if n > 0:
        return 1;
    elif n < 0:
        return -1;
    else:
        return 0;

int loop(int n):
    while true:
        return n;

int partial(bool b):
    if b:
        return 1;
";
            let expected_errors = &[
                "118..122: function loop may end without returning a value of type int",
                "170..177: function partial may end without returning a value of type int",
            ];
        }

        fn test_conditions_must_be_bool() {
            let program = "
void f(int n):
    if n:
        pass;
    while 1.5:
        pass;
    for i in range(true):
        pass;
";
            let expected_errors = &[
                "23..24: expected type bool, but got int",
                "50..53: expected type bool, but got float",
                "88..92: expected type int, but got bool",
            ];
        }

        fn test_calls() {
            let program = "
int twice(int n):
    return n * 2;

void main():
    int a = twice(1, 2);
    int b = twice(true);
    str c = twice(3);
    int d = 4;
    d(5);
    nothing();
";
            let expected_errors = &[
                "63..74: function twice takes 1 argument(s), but 2 were given",
                "94..98: expected type int, but got bool",
                "113..121: expected type str, but got int",
                "142..143: d is not a function",
                "152..159: function nothing is not defined",
            ];
        }

        fn test_forward_calls_and_recursion() {
            let program = "
int main():
    return fact(5);

int fact(int n):
    if n < 2:
        return 1;
    return n * fact(n - 1);
";
            let expected_errors = &[];
        }

        fn test_undefined_and_not_variable() {
            let program = "
void f():
    x = 1;
    int y = f;
    f = 2;
";
            let expected_errors = &[
                "15..16: variable x is not defined",
                "34..35: f is a function, not a variable",
                "41..42: f is a function, not a variable",
            ];
        }

        fn test_globals_are_visible_after_declaration() {
            let program = "
int a = b;
int b = 1;
int c = b + 1;
";
            let expected_errors = &["9..10: variable b is not defined"];
        }

        fn test_duplicate_declarations() {
            let program = "
int x = 1;
int x = 2;
void x():
    pass;
void f(int a, int a):
    int b = 1;
    if true:
        int b = 2;
    for a in range(3):
        pass;
";
            let expected_errors = &[
                "5..6: x is already declared at 28..29",
                "16..17: x is already declared at 28..29",
                "61..62: a is already declared at 54..55",
                "105..106: b is already declared at 73..74",
                "120..121: a is already declared at 54..55",
            ];
        }

        fn test_sibling_blocks_may_reuse_names() {
            let program = "
void f(bool c):
    if c:
        int x = 1;
    else:
        str x = \"one\";
    for i in range(2):
        pass;
    for i in range(3):
        pass;
";
            let expected_errors = &[];
        }

        fn test_scope_conflicts() {
            let program = "
int count = 0;
void f():
    int before = count;
    int count = 1;

void g():
    if true:
        int count = 2;
    count = 3;
";
            let expected_errors = &[
                "58..63: count is used both as a local and as a global in this function",
                "120..125: count is used both as a local and as a global in this function",
            ];
        }

        fn test_call_in_global_initializer() {
            let program = "
int f():
    return 1;

int x = f();
";
            let expected_errors = &["33..36: functions can't be called in global initializers"];
        }

        fn test_errors_accumulate() {
            let program = "
int x = true;
void f():
    return 1;
int g():
    y = 1;
";
            let expected_errors = &[
                "9..13: expected type int, but got bool",
                "29..38: unexpected return value in void function",
                "52..53: variable y is not defined",
                "43..44: function g may end without returning a value of type int",
            ];
        }
    );
}
