use crate::{
    ast::{Block, Expr, Function, Ident, Item, Program, Stmt, StmtKind, TypeName, Typed, Untyped},
    lexer, parser,
    token::{Span, Spanned, Token},
    type_checker::Checker,
    types::Type,
    util::{
        fmt::{self, tree, Show},
        intern::Interner,
    },
};

pub fn format_errors<E>(i: &Interner, e: &[Spanned<E>]) -> Vec<String>
where
    Spanned<E>: Show,
{
    let ctx = fmt::Context { ident_interner: i };
    fmt::show_all(&ctx, e)
}

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExpr(&'static str),
    CheckerProgram(&'static str),
    CheckerExpr(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

/// Runs the lexer and the parser, stopping at the first error of either.
fn parse<T>(
    input: &str,
    interner: &mut Interner,
    parse_tokens: impl FnOnce(&[Token], &mut Interner) -> Result<T, Spanned<parser::Error>>,
) -> Result<T, Vec<String>> {
    let tokens = lexer::lex(input).map_err(|e| format_errors(interner, &[e]))?;
    parse_tokens(&tokens, interner).map_err(|e| format_errors(interner, &[e]))
}

#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let interner = &mut Interner::with_capacity(128);

    let result = match test {
        Test::ParserProgram(input) => parse(input, interner, parser::parse_program)
            .map(|prog| tree::print_program_string(interner, &prog)),
        Test::ParserExpr(input) => parse(input, interner, parser::parse_expr)
            .map(|expr| tree::print_expr_string(interner, &expr)),
        Test::CheckerProgram(input) => {
            parse(input, interner, parser::parse_program).and_then(|prog| {
                Checker::with_capacity(interner, 128)
                    .check(prog)
                    .map(|prog| tree::print_program_string(interner, &prog))
                    .map_err(|errors| format_errors(interner, &errors))
            })
        }
        Test::CheckerExpr(input) => parse(input, interner, parser::parse_expr).and_then(|expr| {
            let prog = from_expr_to_main_program(interner, expr);
            Checker::with_capacity(interner, 128)
                .check(prog)
                .map(|prog| tree::print_expr_string(interner, &from_main_program_to_expr(prog)))
                .map_err(|errors| format_errors(interner, &errors))
        }),
    };

    match result {
        Ok(tree) => (tree, vec![]),
        Err(errors) => (String::new(), errors),
    }
}

/// Wraps the expression as the only statement of a `void` function.
fn from_expr_to_main_program(interner: &mut Interner, expr: Expr<Untyped>) -> Program<Untyped> {
    const SPAN: Span = Span { len: 0, lo: 0 };
    let main = Function {
        return_ty: TypeName {
            ty: Type::Void,
            span: SPAN,
        },
        name: Ident {
            name: interner.intern("main"),
            span: SPAN,
        },
        params: vec![],
        body: Block {
            span: expr.span,
            stmts: vec![Stmt {
                span: expr.span,
                kind: StmtKind::Expr(expr),
            }],
        },
    };
    Program {
        items: vec![Item::Function(main)],
    }
}

fn from_main_program_to_expr(prog: Program<Typed>) -> Expr<Typed> {
    let Some(Item::Function(main)) = prog.items.into_iter().next() else {
        panic!("program is not a main function");
    };
    let Some(Stmt {
        kind: StmtKind::Expr(expr),
        ..
    }) = main.body.stmts.into_iter().next()
    else {
        panic!("main function doesn't have an expression");
    };
    expr
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_tree: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors)
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
    (@@get_test(checker, program), $source:expr) => {
        crate::util::test_utils::Test::CheckerProgram($source)
    };
    (@@get_test(checker, expr), $source:expr) => {
        crate::util::test_utils::Test::CheckerExpr($source)
    };
}
pub(crate) use tree_tests;
