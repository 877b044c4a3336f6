//! Hash tables as produced by the `#s(hash-table ...)` read syntax.
//!
//! Lookup is by the table's [`HashTest`]; entries keep insertion order,
//! which is also the order they are printed in.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::equal::equal;
use crate::heap::Heap;
use crate::value::Value;

// Bounds on how much of a key `equal` hashing looks at.
const SXHASH_MAX_DEPTH: usize = 3;
const SXHASH_MAX_LEN: usize = 7;

/// The equality test a hash table compares keys with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashTest {
    /// Identity. Numbers and characters compare by value, objects by
    /// handle.
    Eq,
    /// Like `Eq`, but floats and bignums also compare by value.
    Eql,
    /// Structural equality, see [`equal`](crate::equal::equal).
    Equal,
}

impl HashTest {
    /// The name used in read syntax.
    pub fn name(self) -> &'static str {
        match self {
            HashTest::Eq => "eq",
            HashTest::Eql => "eql",
            HashTest::Equal => "equal",
        }
    }

    /// Parse a test name as accepted by the `test` key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(HashTest::Eq),
            "eql" => Some(HashTest::Eql),
            "equal" => Some(HashTest::Equal),
            _ => None,
        }
    }

    /// Compare two keys.
    pub fn matches(self, heap: &Heap, a: &Value, b: &Value) -> bool {
        match self {
            // Numbers are immutable values here, so `eq` and `eql` agree.
            HashTest::Eq | HashTest::Eql => a == b,
            HashTest::Equal => equal(heap, a, b),
        }
    }

    /// Hash a key. Keys that [`matches`](Self::matches) considers the same
    /// hash the same.
    pub fn hash(self, heap: &Heap, key: &Value) -> u64 {
        match self {
            HashTest::Eq | HashTest::Eql => hash_of(key),
            HashTest::Equal => sxhash(heap, key, 0),
        }
    }
}

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn sxhash_combine(x: u64, y: u64) -> u64 {
    x.rotate_left(4).wrapping_add(y)
}

// Structural hash for `equal`. Only the first few elements of each list or
// vector and the first few levels of nesting count, so circular keys hash
// fine.
fn sxhash(heap: &Heap, value: &Value, depth: usize) -> u64 {
    if depth > SXHASH_MAX_DEPTH {
        return 0;
    }
    match value {
        // A unibyte string can be `equal` to a multibyte one.
        Value::String(s) => hash_of(s.as_bytes()),
        Value::Bytes(bytes) => hash_of(&bytes[..]),
        Value::Cons(_) => {
            let mut hash = 0;
            let mut cursor = value;
            for _ in 0..SXHASH_MAX_LEN {
                match heap.as_cons(cursor) {
                    Some(cell) => {
                        hash = sxhash_combine(hash, sxhash(heap, cell.car(), depth + 1));
                        cursor = cell.cdr();
                    }
                    None => break,
                }
            }
            if !cursor.is_nil() {
                hash = sxhash_combine(hash, sxhash(heap, cursor, depth + 1));
            }
            hash
        }
        Value::Vector(_) | Value::Record(_) | Value::ByteCode(_) => {
            let items = heap.slots(value).unwrap_or(&[]);
            items
                .iter()
                .take(SXHASH_MAX_LEN)
                .fold(items.len() as u64, |hash, item| {
                    sxhash_combine(hash, sxhash(heap, item, depth + 1))
                })
        }
        _ => hash_of(value),
    }
}

impl Default for HashTest {
    fn default() -> Self {
        HashTest::Eql
    }
}

impl fmt::Display for HashTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weakness of a hash table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weakness {
    /// Entries are kept as long as the key is alive.
    Key,
    /// Entries are kept as long as the value is alive.
    Value,
    /// Entries are kept as long as either is alive.
    KeyOrValue,
    /// Entries are kept as long as both are alive.
    KeyAndValue,
}

impl Weakness {
    /// The name used in read syntax.
    pub fn name(self) -> &'static str {
        match self {
            Weakness::Key => "key",
            Weakness::Value => "value",
            Weakness::KeyOrValue => "key-or-value",
            Weakness::KeyAndValue => "key-and-value",
        }
    }

    /// Parse a weakness name. `t` is accepted as an alias of
    /// `key-and-value`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "key" => Some(Weakness::Key),
            "value" => Some(Weakness::Value),
            "key-or-value" => Some(Weakness::KeyOrValue),
            "key-and-value" | "t" => Some(Weakness::KeyAndValue),
            _ => None,
        }
    }
}

/// A Lisp hash table.
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    test: HashTest,
    weakness: Option<Weakness>,
    entries: Vec<(Value, Value)>,
    // Positions in `entries` by key hash.
    index: HashMap<u64, Vec<usize>>,
}

impl HashTable {
    /// Create an empty table with the given test.
    pub fn new(test: HashTest) -> Self {
        HashTable {
            test,
            weakness: None,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Set the weakness.
    pub fn with_weakness(mut self, weakness: Option<Weakness>) -> Self {
        self.weakness = weakness;
        self
    }

    /// The key comparison used by this table.
    pub fn test(&self) -> HashTest {
        self.test
    }

    /// The table's weakness, if any.
    pub fn weakness(&self) -> Option<Weakness> {
        self.weakness
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Look up `key`. The heap is needed to compare structured keys.
    pub fn get(&self, heap: &Heap, key: &Value) -> Option<&Value> {
        let (_, position) = self.position(heap, key);
        position.map(|i| &self.entries[i].1)
    }

    /// Associate `key` with `value`; an existing entry for the same key
    /// keeps its position and gets the new value.
    ///
    /// The table must not live in `heap`; use
    /// [`Heap::puthash`](crate::heap::Heap::puthash) for tables that do.
    pub fn insert(&mut self, heap: &Heap, key: Value, value: Value) {
        let (hash, position) = self.position(heap, &key);
        self.put_at(hash, position, key, value);
    }

    // The hash of `key` and the position of its entry, if there is one.
    pub(crate) fn position(&self, heap: &Heap, key: &Value) -> (u64, Option<usize>) {
        let hash = self.test.hash(heap, key);
        let position = self.index.get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .copied()
                .find(|&i| self.test.matches(heap, &self.entries[i].0, key))
        });
        (hash, position)
    }

    pub(crate) fn put_at(&mut self, hash: u64, position: Option<usize>, key: Value, value: Value) {
        match position {
            Some(i) => self.entries[i].1 = value,
            None => {
                self.index.entry(hash).or_default().push(self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub(crate) fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.iter_mut().map(|(_, v)| v)
    }
}
