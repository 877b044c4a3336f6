//! The arena that Lisp objects with identity live in.
//!
//! Conses, vectors, records, byte-code objects and hash tables are mutable
//! and may be shared or even contain themselves. They are therefore not
//! stored inside [`Value`] directly; a value only holds an [`Obj`] handle
//! into a [`Heap`]. Two values referring to the same handle are `eq`.
//!
//! ```
//! use elexpr::{Heap, Value};
//!
//! let mut heap = Heap::new();
//! let list = heap.list(vec![Value::from(1), Value::from(2)]);
//! let tail = heap.cdr(&list).cloned();
//! assert_eq!(heap.car(&list), Some(&Value::from(1)));
//! assert_eq!(tail.and_then(|t| heap.car(&t).cloned()), Some(Value::from(2)));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::cons::{Cons, ListIter};
use crate::hash_table::HashTable;
use crate::symbol::{Obarray, Symbol};
use crate::value::Value;

/// Handle to an object stored in a [`Heap`].
///
/// Handles are only meaningful for the heap that produced them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Obj(usize);

impl Obj {
    /// Position of the object in its heap, in allocation order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({})", self.0)
    }
}

/// An object with identity.
#[derive(Debug, Clone)]
pub enum Object {
    /// A cons cell.
    Cons(Cons),
    /// A general vector.
    Vector(Vec<Value>),
    /// A record; the first slot is the type.
    Record(Vec<Value>),
    /// A byte-code function object.
    ByteCode(Vec<Value>),
    /// A hash table.
    HashTable(HashTable),
}

impl Object {
    /// The slots of a vector-like object.
    pub fn slots(&self) -> Option<&[Value]> {
        match self {
            Object::Vector(items) | Object::Record(items) | Object::ByteCode(items) => {
                Some(items)
            }
            Object::Cons(_) | Object::HashTable(_) => None,
        }
    }

    fn slots_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Object::Vector(items) | Object::Record(items) | Object::ByteCode(items) => {
                Some(items)
            }
            Object::Cons(_) | Object::HashTable(_) => None,
        }
    }

    /// Call `f` with every value directly referenced by this object.
    pub(crate) fn for_each_child(&self, mut f: impl FnMut(&Value)) {
        match self {
            Object::Cons(cell) => {
                f(cell.car());
                f(cell.cdr());
            }
            Object::Vector(items) | Object::Record(items) | Object::ByteCode(items) => {
                items.iter().for_each(f)
            }
            Object::HashTable(table) => {
                for (key, value) in table.iter() {
                    f(key);
                    f(value);
                }
            }
        }
    }

    /// Like `for_each_child`, but hash table keys are skipped since changing
    /// them would invalidate the table.
    pub(crate) fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Value)) {
        match self {
            Object::Cons(cell) => {
                let (car, cdr) = cell.as_pair_mut();
                f(car);
                f(cdr);
            }
            Object::Vector(items) | Object::Record(items) | Object::ByteCode(items) => {
                items.iter_mut().for_each(f)
            }
            Object::HashTable(table) => table.values_mut().for_each(f),
        }
    }
}

/// Arena owning all objects created by the reader or by the constructors
/// below.
///
/// Objects are never freed while the heap is alive; dropping the heap frees
/// all of them at once. A clone copies every object and shares the obarray,
/// so handles into the original stay valid in the clone.
#[derive(Clone)]
pub struct Heap {
    objects: Vec<Object>,
    obarray: Arc<Obarray>,
}

impl Heap {
    /// Create a heap that interns symbols into the global obarray.
    pub fn new() -> Self {
        Heap::with_obarray(Obarray::global())
    }

    /// Create a heap that interns symbols into `obarray`.
    pub fn with_obarray(obarray: Arc<Obarray>) -> Self {
        Heap {
            objects: Vec::new(),
            obarray,
        }
    }

    /// The obarray symbols are interned into.
    pub fn obarray(&self) -> &Arc<Obarray> {
        &self.obarray
    }

    /// Intern `name` in this heap's obarray.
    pub fn intern(&self, name: &str) -> Symbol {
        self.obarray.intern(name)
    }

    /// Return the value of the symbol named `name`.
    ///
    /// The name `nil` yields [`Value::Nil`], like the reader does.
    pub fn symbol(&self, name: &str) -> Value {
        if name == "nil" {
            Value::Nil
        } else {
            Value::Symbol(self.intern(name))
        }
    }

    /// Number of objects allocated so far.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Store `object` and return its handle.
    pub fn alloc(&mut self, object: Object) -> Obj {
        self.objects.push(object);
        Obj(self.objects.len() - 1)
    }

    /// Look up an object.
    ///
    /// # Panics
    ///
    /// Panics if `obj` was not allocated by this heap.
    pub fn get(&self, obj: Obj) -> &Object {
        &self.objects[obj.0]
    }

    /// Look up an object for modification.
    ///
    /// # Panics
    ///
    /// Panics if `obj` was not allocated by this heap.
    pub fn get_mut(&mut self, obj: Obj) -> &mut Object {
        &mut self.objects[obj.0]
    }

    /// Look up the object a value refers to, if any.
    pub fn object(&self, value: &Value) -> Option<&Object> {
        value.as_obj().map(|obj| self.get(obj))
    }

    /// Allocate a cons cell.
    pub fn cons(&mut self, car: impl Into<Value>, cdr: impl Into<Value>) -> Value {
        Value::Cons(self.alloc(Object::Cons(Cons::new(car.into(), cdr.into()))))
    }

    /// Allocate a proper list of `items`.
    pub fn list<I>(&mut self, items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.list_with_tail(items, Value::Nil)
    }

    /// Allocate a list of `items` whose last cdr is `tail`.
    pub fn list_with_tail<I>(&mut self, items: I, tail: Value) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(tail, |rest, item| self.cons(item, rest))
    }

    /// Allocate a vector.
    pub fn vector(&mut self, items: Vec<Value>) -> Value {
        Value::Vector(self.alloc(Object::Vector(items)))
    }

    /// Allocate a record. The first slot is the record type.
    pub fn record(&mut self, slots: Vec<Value>) -> Value {
        Value::Record(self.alloc(Object::Record(slots)))
    }

    /// Allocate a byte-code object from its slots.
    ///
    /// No validation is done; the reader checks the slots before calling
    /// this.
    pub fn byte_code(&mut self, slots: Vec<Value>) -> Value {
        Value::ByteCode(self.alloc(Object::ByteCode(slots)))
    }

    /// Move a hash table into the heap.
    pub fn hash_table(&mut self, table: HashTable) -> Value {
        Value::HashTable(self.alloc(Object::HashTable(table)))
    }

    /// The cons cell a value refers to.
    pub fn as_cons(&self, value: &Value) -> Option<&Cons> {
        match value {
            Value::Cons(obj) => match self.get(*obj) {
                Object::Cons(cell) => Some(cell),
                _ => None,
            },
            _ => None,
        }
    }

    /// The `car` of a cons.
    pub fn car(&self, value: &Value) -> Option<&Value> {
        self.as_cons(value).map(Cons::car)
    }

    /// The `cdr` of a cons.
    pub fn cdr(&self, value: &Value) -> Option<&Value> {
        self.as_cons(value).map(Cons::cdr)
    }

    /// Replace the `car` of the cons `obj`. Returns false if `obj` is not a
    /// cons.
    pub fn set_car(&mut self, obj: Obj, value: Value) -> bool {
        match self.get_mut(obj) {
            Object::Cons(cell) => {
                cell.set_car(value);
                true
            }
            _ => false,
        }
    }

    /// Replace the `cdr` of the cons `obj`. Returns false if `obj` is not a
    /// cons.
    pub fn set_cdr(&mut self, obj: Obj, value: Value) -> bool {
        match self.get_mut(obj) {
            Object::Cons(cell) => {
                cell.set_cdr(value);
                true
            }
            _ => false,
        }
    }

    /// The slots of a vector, record or byte-code object.
    pub fn slots(&self, value: &Value) -> Option<&[Value]> {
        self.object(value).and_then(Object::slots)
    }

    /// Replace slot `index` of a vector-like object. Returns false if the
    /// object has no such slot.
    pub fn set_slot(&mut self, obj: Obj, index: usize, value: Value) -> bool {
        match self.get_mut(obj).slots_mut().and_then(|s| s.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The hash table a value refers to.
    pub fn as_hash_table(&self, value: &Value) -> Option<&HashTable> {
        match self.object(value) {
            Some(Object::HashTable(table)) => Some(table),
            _ => None,
        }
    }

    /// Associate `key` with `value` in the hash table `obj`, using the
    /// table's test. Returns false if `obj` is not a hash table.
    pub fn puthash(&mut self, obj: Obj, key: Value, value: Value) -> bool {
        let (hash, position) = match self.get(obj) {
            Object::HashTable(table) => table.position(self, &key),
            _ => return false,
        };
        match self.get_mut(obj) {
            Object::HashTable(table) => {
                table.put_at(hash, position, key, value);
                true
            }
            _ => false,
        }
    }

    /// Iterate over the elements of a list. See [`ListIter`] for how
    /// improper and circular lists are handled.
    pub fn list_iter<'a>(&'a self, value: &'a Value) -> ListIter<'a> {
        ListIter::new(self, value)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("objects", &self.objects.len())
            .field("obarray", &self.obarray)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_share_nothing_unless_asked() {
        let mut heap = Heap::with_obarray(Arc::new(Obarray::new()));
        let a = heap.list(vec![Value::from(1), Value::from(2)]);
        let b = heap.list(vec![Value::from(1), Value::from(2)]);
        assert_ne!(a, b);
        assert_eq!(heap.len(), 4);
        assert_eq!(heap.list_iter(&a).count(), 2);
    }

    #[test]
    fn mutation_creates_cycles() {
        let mut heap = Heap::with_obarray(Arc::new(Obarray::new()));
        let cell = heap.cons(1, Value::Nil);
        let obj = cell.as_obj().unwrap();
        assert!(heap.set_cdr(obj, cell.clone()));
        assert_eq!(heap.cdr(&cell), Some(&cell));
    }

    #[test]
    fn nil_symbol_is_the_empty_list() {
        let heap = Heap::with_obarray(Arc::new(Obarray::new()));
        assert_eq!(heap.symbol("nil"), Value::Nil);
        assert!(heap.symbol("t").is_symbol());
    }
}
