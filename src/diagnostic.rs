use std::fmt;

use thiserror::Error;

use crate::{
    token::{Span, Spanned},
    util::{
        fmt::{Context, Show},
        lines::{LineIndex, Position},
    },
};

/// The pipeline stage which reported a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lex,
    Syntax,
    Type,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Lex => "lexical error",
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::Type => "type error",
        })
    }
}

/// A compilation error, resolved to a source position.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{position}: {kind}[{code}]: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Stable identifier of the error, such as `TypeMismatch`.
    pub code: &'static str,
    pub message: String,
    pub position: Position,
    pub span: Span,
}

impl Diagnostic {
    pub fn new<E>(
        kind: DiagnosticKind,
        code: &'static str,
        error: &Spanned<E>,
        ctx: &Context<'_>,
        lines: &LineIndex<'_>,
    ) -> Diagnostic
    where
        Spanned<E>: Show,
    {
        Diagnostic {
            kind,
            code,
            message: error.display(ctx).to_string(),
            position: lines.span_start(error.span),
            span: error.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, util::intern::Interner};

    #[test]
    fn test_display() {
        let src = "int x = 1;\nint y = $;\n";
        let error = lexer::lex(src).unwrap_err();
        let interner = Interner::default();
        let ctx = Context {
            ident_interner: &interner,
        };
        let diagnostic = Diagnostic::new(
            DiagnosticKind::Lex,
            error.inner.code(),
            &error,
            &ctx,
            &LineIndex::new(src),
        );
        assert_eq!(diagnostic.position, Position { line: 2, column: 9 });
        assert_eq!(
            diagnostic.to_string(),
            "2:9: lexical error[UnexpectedChar]: unexpected character '$'"
        );
    }
}
