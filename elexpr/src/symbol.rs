//! Symbols and the obarrays they are interned in.
//!
//! A symbol is a name-uniqued handle: interning the same name twice in the
//! same [`Obarray`] yields two handles to the same symbol, which compare
//! equal in constant time. Symbols read with the `#:` prefix are
//! *uninterned*; they are only ever equal to themselves.
//!
//! ```
//! use elexpr::symbol::{Obarray, Symbol};
//!
//! let obarray = Obarray::new();
//! let a = obarray.intern("foo");
//! let b = obarray.intern("foo");
//! assert_eq!(a, b);
//!
//! let gensym = Symbol::uninterned("foo");
//! assert_ne!(a, gensym);
//! assert_eq!(a.name(), gensym.name());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

/// A Lisp symbol.
///
/// Equality and hashing are by identity, not by name.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

struct SymbolData {
    name: Box<str>,
    interned: bool,
}

impl Symbol {
    fn interned(name: &str) -> Self {
        Symbol(Arc::new(SymbolData {
            name: name.into(),
            interned: true,
        }))
    }

    /// Create a fresh symbol that is not registered in any obarray.
    pub fn uninterned(name: impl Into<Box<str>>) -> Self {
        Symbol(Arc::new(SymbolData {
            name: name.into(),
            interned: false,
        }))
    }

    /// The symbol's print name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns true if the symbol was obtained by interning.
    pub fn is_interned(&self) -> bool {
        self.0.interned
    }

    /// Returns true for interned symbols whose name starts with a colon.
    ///
    /// ```
    /// # use elexpr::symbol::Obarray;
    /// let obarray = Obarray::new();
    /// assert!(obarray.intern(":test").is_keyword());
    /// assert!(!obarray.intern("test").is_keyword());
    /// ```
    pub fn is_keyword(&self) -> bool {
        self.is_interned() && self.name().starts_with(':')
    }

    /// Returns true if `self` and `other` are the same symbol.
    #[inline]
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_interned() {
            write!(f, "Symbol({:?})", self.name())
        } else {
            write!(f, "Symbol(#:{:?})", self.name())
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table mapping names to interned symbols.
///
/// The table only ever grows; interning is an atomic insert-if-absent, so an
/// obarray may be shared between threads. The reader and the value
/// constructors of [`Heap`](crate::heap::Heap) intern into the obarray the
/// heap was created with, which allows tests to work with a fresh table
/// instead of the process-wide one.
pub struct Obarray {
    table: Mutex<HashMap<Box<str>, Symbol>>,
}

static GLOBAL: Lazy<Arc<Obarray>> = Lazy::new(|| Arc::new(Obarray::new()));

impl Obarray {
    /// Create an empty obarray.
    pub fn new() -> Self {
        Obarray {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide obarray.
    pub fn global() -> Arc<Obarray> {
        Arc::clone(&GLOBAL)
    }

    // Interning never leaves the table in an inconsistent state, so a
    // poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, HashMap<Box<str>, Symbol>> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the symbol named `name`, creating it if it does not exist yet.
    pub fn intern(&self, name: &str) -> Symbol {
        let mut table = self.lock();
        if let Some(symbol) = table.get(name) {
            return symbol.clone();
        }
        let symbol = Symbol::interned(name);
        table.insert(name.into(), symbol.clone());
        symbol
    }

    /// Return the symbol named `name` if it has been interned before.
    pub fn intern_soft(&self, name: &str) -> Option<Symbol> {
        self.lock().get(name).cloned()
    }

    /// Returns true if `symbol` is the symbol interned in this obarray under
    /// its name.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.lock()
            .get(symbol.name())
            .map_or(false, |interned| interned == symbol)
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Obarray {
    fn default() -> Self {
        Obarray::new()
    }
}

impl fmt::Debug for Obarray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obarray").field("len", &self.len()).finish()
    }
}
