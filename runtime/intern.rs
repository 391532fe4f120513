use std::collections::HashMap;
use std::fmt;

///! Interned symbols
///!
///! Every distinct symbol name maps to exactly one `InternedSym` for the lifetime of its
///! `Interner`. Interned symbols from the same `Interner` can be compared directly without a
///! reference to the `Interner` instance; equal names always produce equal symbols.
///!
///! Names are never removed. Symbols synthesised at runtime (e.g. by `gensym`) go through the
///! same table so they're subject to the same uniqueness guarantee.

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternedSym(u32);

impl fmt::Debug for InternedSym {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // We don't have access to the `Interner` so we can't print our name
        write!(formatter, "`{:x}", self.0)
    }
}

// TODO: This keeps two copies of each name. An arena of `str`s would let the map borrow from
// `names` directly.
pub struct Interner {
    names: Vec<Box<str>>,
    name_to_sym: HashMap<Box<str>, InternedSym>,
}

impl Interner {
    pub fn new() -> Interner {
        Interner {
            names: vec![],
            name_to_sym: HashMap::new(),
        }
    }

    pub fn intern(&mut self, name: &str) -> InternedSym {
        if let Some(existing) = self.name_to_sym.get(name) {
            return *existing;
        }

        let interned = InternedSym(self.names.len() as u32);
        self.names.push(name.into());
        self.name_to_sym.insert(name.into(), interned);

        interned
    }

    /// Returns the symbol for `name` if it has previously been interned
    pub fn get(&self, name: &str) -> Option<InternedSym> {
        self.name_to_sym.get(name).copied()
    }

    pub fn unintern(&self, interned: InternedSym) -> &str {
        &self.names[interned.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Interner {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equality() {
        let mut interner = Interner::new();

        let foo1 = interner.intern("foo");
        let foo2 = interner.intern("foo");
        assert_eq!(foo1, foo2);

        let bar = interner.intern("bar");
        assert_ne!(foo1, bar);

        // Re-interning doesn't grow the table
        assert_eq!(2, interner.len());
    }

    #[test]
    fn fmt_debug() {
        let mut interner = Interner::new();

        interner.intern("first");
        let second = interner.intern("second");
        assert_eq!("`1", format!("{:?}", second));
    }

    #[test]
    fn lookup_without_interning() {
        let mut interner = Interner::new();

        assert_eq!(None, interner.get("missing"));

        let present = interner.intern("present");
        assert_eq!(Some(present), interner.get("present"));
    }

    #[test]
    fn roundtrip() {
        let mut interner = Interner::new();

        let test_names = [
            "",
            "short1",
            "short2",
            "exactly8",
            "Hello, world!",
            "This is another long test string",
        ];

        let mut previous_interneds = vec![];
        for &name in &test_names {
            let interned = interner.intern(name);
            assert_eq!(name, interner.unintern(interned));

            // Make sure we don't equal any of our previous interneds
            assert!(!previous_interneds.contains(&interned));
            previous_interneds.push(interned);
        }
    }
}
