pub mod fmt;
pub mod intern;
pub mod lines;
#[cfg(test)]
pub(crate) mod test_utils;

/// Adapters for token streams, which keep yielding `Eof` instead of ending.
pub trait BreakableIteratorExt: Iterator + Sized {
    /// Yields items up to, and including, the first one matching the
    /// predicate. The inner iterator is dropped once it matches.
    fn up_to<P>(self, stop_predicate: P) -> UpTo<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        UpTo {
            iter: Some(self),
            stop_predicate,
        }
    }
}

impl<I: Iterator> BreakableIteratorExt for I {}

pub struct UpTo<I, P> {
    iter: Option<I>,
    stop_predicate: P,
}

impl<I, P> Iterator for UpTo<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(next) = self.iter.as_mut()?.next() else {
            self.iter = None;
            return None;
        };
        if (self.stop_predicate)(&next) {
            self.iter = None;
        }
        Some(next)
    }
}
