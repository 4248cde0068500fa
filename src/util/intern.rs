use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// A handle to an interned identifier. To retrieve the `&str`, use
/// [`Interner::get`].
///
/// Handles are only meaningful for the interner which produced them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interned(NonZeroU32);

impl fmt::Debug for Interned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({})", self.0)
    }
}

impl From<&Interned> for Interned {
    fn from(value: &Interned) -> Self {
        *value
    }
}

/// Deduplicates identifier names of one compilation.
#[derive(Default)]
pub struct Interner {
    map: HashMap<Rc<str>, Interned>,
    names: Vec<Rc<str>>,
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, name) in self.names.iter().enumerate() {
            map.entry(&(i + 1), name);
        }
        map.finish()
    }
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Interner {
        Interner {
            map: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interns the provided name, returning a handle which can be used to
    /// retrieve it later.
    pub fn intern(&mut self, name: &str) -> Interned {
        if let Some(handle) = self.map.get(name) {
            return *handle;
        }
        let len = u32::try_from(self.names.len()).expect("interner out of capacity");
        let handle = Interned(NonZeroU32::MIN.saturating_add(len));
        let key: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&key));
        self.map.insert(key, handle);
        handle
    }

    /// Returns the handle of an already interned name, if any.
    pub fn lookup(&self, name: &str) -> Option<Interned> {
        self.map.get(name).copied()
    }

    /// Returns the name for the provided handle. Panics if not found.
    pub fn get(&self, handle: impl Into<Interned>) -> &str {
        let Interned(handle) = handle.into();
        &self.names[handle.get() as usize - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner() {
        let mut i = Interner::with_capacity(3);

        let total1 = i.intern("total");
        let count1 = i.intern("count");
        let main1 = i.intern("main");

        let total2 = i.intern("total");
        let count2 = i.intern("count");
        let main2 = i.intern("main");

        assert_eq!(total1, total2);
        assert_eq!(count1, count2);
        assert_eq!(main1, main2);
        assert_ne!(total1, count1);

        assert_eq!(i.get(total1), "total");
        assert_eq!(i.get(&count2), "count");
        assert_eq!(i.len(), 3);
        assert_eq!(i.lookup("main"), Some(main1));
        assert_eq!(i.lookup("missing"), None);
    }
}
