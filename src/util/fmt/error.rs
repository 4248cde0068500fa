#![allow(clippy::items_after_statements)]

use std::fmt::Formatter;

use crate::{
    lexer, parser,
    token::Spanned,
    type_checker,
    util::fmt::{Context, Show},
};

impl Show for Spanned<lexer::Error> {
    fn show(&self, f: &mut Formatter<'_>, _: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use lexer::Error::*;
        match error {
            UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            UnterminatedString => write!(f, "unterminated string literal"),
            InconsistentDedent => write!(
                f,
                "unindent does not match any outer indentation level"
            ),
            InvalidNumber => write!(f, "numeric literal is out of range"),
        }
    }
}

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut Formatter<'_>, _: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use parser::Error::*;
        match error {
            Unexpected { actual, expected } => write!(f, "expected {expected}, but got {actual}"),
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of ")?;
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                write!(f, ", but got {actual}")
            }
            ExpectedItem { actual } => write!(
                f,
                "expected a variable or function declaration, but got {actual}"
            ),
            ExpectedType { actual } => write!(f, "expected a type, but got {actual}"),
            ExpectedIdentifier { actual } => write!(f, "expected an identifier, but got {actual}"),
            ExpectedExpression { actual } => write!(f, "expected an expression, but got {actual}"),
            IllegalVoid => write!(f, "`void` is only valid as a return type"),
            NestedFunction => write!(f, "functions may only be declared at the top level"),
            InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            InvalidCallee => write!(f, "only named functions can be called"),
            EmptyBlock => write!(f, "expected an indented block"),
        }
    }
}

impl Show for Spanned<type_checker::Error> {
    fn show(&self, f: &mut Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result {
        let i = ctx.ident_interner;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use type_checker::Error::*;
        match error {
            TypeMismatch { expected, actual } => {
                write!(f, "expected type {expected}, but got {actual}")
            }
            InvalidOperands { op, lhs, rhs } => {
                let op = op.symbol();
                write!(f, "operator `{op}` can't be applied to {lhs} and {rhs}")
            }
            InvalidOperand { op, operand } => {
                let op = op.symbol();
                write!(f, "operator `{op}` can't be applied to {operand}")
            }
            DuplicateDeclaration { name, previous } => {
                let name = i.get(name);
                write!(f, "{name} is already declared at {previous}")
            }
            UndefinedVariable(name) => {
                let name = i.get(name);
                write!(f, "variable {name} is not defined")
            }
            UndefinedFunction(name) => {
                let name = i.get(name);
                write!(f, "function {name} is not defined")
            }
            NotCallable(name) => {
                let name = i.get(name);
                write!(f, "{name} is not a function")
            }
            NotAVariable(name) => {
                let name = i.get(name);
                write!(f, "{name} is a function, not a variable")
            }
            ArityMismatch {
                name,
                expected,
                actual,
            } => {
                let name = i.get(name);
                write!(
                    f,
                    "function {name} takes {expected} argument(s), but {actual} were given"
                )
            }
            UnexpectedReturnValue => write!(f, "unexpected return value in void function"),
            MissingReturnValue { return_ty } => {
                write!(f, "expected a return value of type {return_ty}")
            }
            MissingReturn { name, return_ty } => {
                let name = i.get(name);
                write!(
                    f,
                    "function {name} may end without returning a value of type {return_ty}"
                )
            }
            ScopeConflict(name) => {
                let name = i.get(name);
                write!(
                    f,
                    "{name} is used both as a local and as a global in this function"
                )
            }
            CallInGlobalInitializer => {
                write!(f, "functions can't be called in global initializers")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{token::Span, util::intern::Interner};

    #[test]
    fn test_alternate_prefixes_span() {
        let i = Interner::default();
        let ctx = Context { ident_interner: &i };
        let error = Span::new_of_length(4, 2).wrap(lexer::Error::UnterminatedString);
        assert_eq!(
            format!("{}", error.display(&ctx)),
            "unterminated string literal"
        );
        assert_eq!(
            format!("{:#}", error.display(&ctx)),
            "4..6: unterminated string literal"
        );
    }

    #[test]
    fn test_names_are_resolved() {
        let mut i = Interner::default();
        let name = i.intern("total");
        let ctx = Context { ident_interner: &i };
        let error = Span::new_of_length(0, 5).wrap(type_checker::Error::ScopeConflict(name));
        assert_eq!(
            format!("{}", error.display(&ctx)),
            "total is used both as a local and as a global in this function"
        );
    }
}
