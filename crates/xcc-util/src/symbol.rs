//! Identifier interning.
//!
//! Every lexed identifier and string literal ultimately needs a stable,
//! cheap-to-compare handle rather than a freshly allocated `String`. The
//! teacher's global `DashMap`-backed interner is deliberately *not* mirrored
//! here: spec §5/§9 calls for folding every piece of process-wide state into
//! the owning instance, so a [`SymbolInterner`] belongs to one compilation
//! (one [`Lexer`](../xcc_lex/struct.Lexer.html) / `Session`) and needs no
//! synchronization.

use rustc_hash::FxHashMap;

/// An interned string handle. Two symbols compare equal iff their source
/// spellings are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

static_assertions::assert_eq_size!(Symbol, u32);

/// Arena-backed string interner. Bytes are copied into a [`bumpalo::Bump`]
/// so the returned `&'static str` slices remain valid for the interner's
/// own lifetime without per-string heap allocations.
pub struct SymbolInterner {
    arena: bumpalo::Bump,
    map: FxHashMap<&'static str, Symbol>,
    strings: Vec<&'static str>,
}

impl SymbolInterner {
    pub fn new() -> Self {
        Self {
            arena: bumpalo::Bump::new(),
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        // SAFETY: the arena outlives the interner, and we never hand out a
        // `&'static str` to anyone but ourselves (it is re-borrowed with the
        // interner's own lifetime by `resolve`).
        let alloc: &str = self.arena.alloc_str(s);
        let alloc: &'static str = unsafe { std::mem::transmute(alloc) };
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(alloc);
        self.map.insert(alloc, sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings[sym.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_spelling_twice_yields_same_symbol() {
        let mut interner = SymbolInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_spellings_yield_distinct_symbols() {
        let mut interner = SymbolInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = SymbolInterner::new();
        let sym = interner.intern("xinu_process");
        assert_eq!(interner.resolve(sym), "xinu_process");
    }

    #[quickcheck_macros::quickcheck]
    fn resolve_always_round_trips(words: Vec<String>) -> bool {
        let mut interner = SymbolInterner::new();
        let syms: Vec<Symbol> = words.iter().map(|w| interner.intern(w)).collect();
        words.iter().zip(syms.iter()).all(|(w, &s)| interner.resolve(s) == w)
    }
}
