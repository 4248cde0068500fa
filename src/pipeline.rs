use std::num::NonZeroUsize;

use tracing::debug;

use crate::{
    ast::{Program, Typed, Untyped},
    code_gen::CodeGen,
    diagnostic::{Diagnostic, DiagnosticKind},
    lexer, parser,
    token::{Spanned, Token},
    type_checker::Checker,
    util::{
        fmt::{tree, Context, Show},
        intern::Interner,
        lines::LineIndex,
    },
};

const DEFAULT_INDENT_WIDTH: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Code generation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Spaces per indentation level of the generated code.
    pub indent_width: NonZeroUsize,
    /// Whether to append an `if __name__ == "__main__":` guard which calls
    /// `main`, when the program defines one without parameters.
    pub entry_point: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent_width: DEFAULT_INDENT_WIDTH,
            entry_point: false,
        }
    }
}

/// Compiles Plasma source into Python source.
///
/// Lexical and syntax errors stop the compilation at the first one. Type
/// errors are all reported.
pub fn compile(src: &str, options: &Options) -> Result<String, Vec<Diagnostic>> {
    let mut session = Session::new(src);
    let program = session.front_end()?;
    Ok(CodeGen::new(&session.ident_interner, options).gen(&program))
}

/// Lexes the source, without any further processing.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Vec<Diagnostic>> {
    Session::new(src).lex()
}

/// Checks the source, returning its printed typed tree.
pub fn print_tree(src: &str) -> Result<String, Vec<Diagnostic>> {
    let mut session = Session::new(src);
    let program = session.front_end()?;
    Ok(tree::print_program_string(&session.ident_interner, &program))
}

/// The state of one compilation.
struct Session<'src> {
    src: &'src str,
    lines: LineIndex<'src>,
    ident_interner: Interner,
}

impl<'src> Session<'src> {
    fn new(src: &'src str) -> Session<'src> {
        Session {
            src,
            lines: LineIndex::new(src),
            ident_interner: Interner::with_capacity(64),
        }
    }

    /// Runs every stage up to, and including, the type checker.
    fn front_end(&mut self) -> Result<Program<Typed>, Vec<Diagnostic>> {
        let tokens = self.lex()?;
        let program = self.parse(&tokens)?;
        self.check(program)
    }

    fn lex(&self) -> Result<Vec<Token>, Vec<Diagnostic>> {
        let tokens = lexer::lex(self.src).map_err(|error| {
            let code = error.inner.code();
            vec![self.diagnostic(DiagnosticKind::Lex, code, &error)]
        })?;
        debug!(tokens = tokens.len(), "lexed source");
        Ok(tokens)
    }

    fn parse(&mut self, tokens: &[Token]) -> Result<Program<Untyped>, Vec<Diagnostic>> {
        let program = parser::parse_program(tokens, &mut self.ident_interner).map_err(|error| {
            let code = error.inner.code();
            vec![self.diagnostic(DiagnosticKind::Syntax, code, &error)]
        })?;
        debug!(
            items = program.items.len(),
            idents = self.ident_interner.len(),
            "parsed program"
        );
        Ok(program)
    }

    fn check(&self, program: Program<Untyped>) -> Result<Program<Typed>, Vec<Diagnostic>> {
        Checker::new(&self.ident_interner)
            .check(program)
            .map_err(|errors| {
                debug!(errors = errors.len(), "type check failed");
                errors
                    .iter()
                    .map(|error| self.diagnostic(DiagnosticKind::Type, error.inner.code(), error))
                    .collect()
            })
    }

    fn diagnostic<E>(
        &self,
        kind: DiagnosticKind,
        code: &'static str,
        error: &Spanned<E>,
    ) -> Diagnostic
    where
        Spanned<E>: Show,
    {
        let ctx = Context {
            ident_interner: &self.ident_interner,
        };
        Diagnostic::new(kind, code, error, &ctx, &self.lines)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn codes(src: &str) -> Vec<(DiagnosticKind, &'static str)> {
        compile(src, &Options::default())
            .expect_err("compilation should fail")
            .into_iter()
            .map(|d| (d.kind, d.code))
            .collect()
    }

    #[test]
    fn test_stages_fail_fast() {
        assert_eq!(
            codes("int x = 1 $ 2;\nint y = ;\n"),
            [(DiagnosticKind::Lex, "UnexpectedChar")]
        );
        assert_eq!(
            codes("int x = ;\nint y = ;\n"),
            [(DiagnosticKind::Syntax, "ExpectedExpression")]
        );
    }

    #[test]
    fn test_type_errors_accumulate() {
        let src = indoc! {"
            int x = true;
            float y = 1;
            void f():
                undefined();
        "};
        assert_eq!(
            codes(src),
            [
                (DiagnosticKind::Type, "TypeMismatch"),
                (DiagnosticKind::Type, "TypeMismatch"),
                (DiagnosticKind::Type, "UndefinedFunction"),
            ]
        );
    }

    #[test]
    fn test_print_tree() {
        let tree = print_tree("int x = 1 + 2;").expect("valid program");
        let expected = indoc! {"
            variable x: int
              binary Add (8..13) %: int
                int 1 (8..9) %: int
                int 2 (12..13) %: int
        "};
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("pass;").expect("valid tokens");
        assert_eq!(tokens.len(), 4);
        assert!(tokens.last().is_some_and(Token::is_eof));
    }
}
