use crate::util::intern::Interner;

pub mod error;
pub mod tree;

pub struct Context<'ident> {
    pub ident_interner: &'ident Interner,
}

/// Analogous to [`std::fmt::Display`], but also contains the program context,
/// such as the current [`Interner`].
pub trait Show {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result;

    /// Returns a type which can be displayed.
    fn display<'a>(&'a self, ctx: &'a Context<'_>) -> impl std::fmt::Display + 'a
    where
        Self: Sized,
    {
        Display(self, ctx)
    }
}

struct Display<'this, 'ctx, 'ident, T: Show>(&'this T, &'ctx Context<'ident>);

impl<T> std::fmt::Display for Display<'_, '_, '_, T>
where
    T: Show,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Display(this, ctx) = self;
        this.show(f, ctx)
    }
}

/// Formats each error, prefixed by its span.
pub fn show_all<E>(ctx: &Context<'_>, errors: &[E]) -> Vec<String>
where
    E: Show,
{
    errors
        .iter()
        .map(|error| format!("{:#}", error.display(ctx)))
        .collect()
}
