//! Structural comparison of values.
//!
//! Both functions walk the object graph with an explicit work list, so
//! neither deep nor circular structure can overflow the stack.

use std::collections::{HashMap, HashSet};

use crate::heap::{Heap, Object, Obj};
use crate::symbol::Symbol;
use crate::value::Value;

/// Compare two values like Lisp `equal`.
///
/// Conses, vectors, records and byte-code objects are compared element by
/// element; hash tables only by identity. A unibyte string equals a
/// multibyte string with the same ASCII contents. Circular structure is
/// handled: a pair of objects already under comparison is assumed equal.
///
/// ```
/// use elexpr::{equal::equal, Heap, Value};
///
/// let mut heap = Heap::new();
/// let a = heap.list(vec![Value::from(1), Value::from("x")]);
/// let b = heap.list(vec![Value::from(1), Value::from("x")]);
/// assert_ne!(a, b);
/// assert!(equal(&heap, &a, &b));
/// ```
pub fn equal(heap: &Heap, a: &Value, b: &Value) -> bool {
    let mut assumed = HashSet::new();
    let mut work = vec![(a.clone(), b.clone())];
    while let Some((a, b)) = work.pop() {
        if a == b {
            continue;
        }
        match (&a, &b) {
            (Value::Cons(x), Value::Cons(y))
            | (Value::Vector(x), Value::Vector(y))
            | (Value::Record(x), Value::Record(y))
            | (Value::ByteCode(x), Value::ByteCode(y)) => {
                if !assumed.insert((*x, *y)) {
                    continue;
                }
                if !push_children(heap, *x, heap, *y, &mut work) {
                    return false;
                }
            }
            _ => {
                if !equal_atoms(&a, &b) {
                    return false;
                }
            }
        }
    }
    true
}

/// Returns true if the graph reachable from `a` in `heap_a` and the one
/// reachable from `b` in `heap_b` have the same shape, contents and
/// sharing.
///
/// Objects are matched one-to-one: if `a` refers to one object twice, `b`
/// must refer to its counterpart twice, too. Uninterned symbols are matched
/// the same way, while interned symbols compare by name.
pub fn isomorphic(heap_a: &Heap, a: &Value, heap_b: &Heap, b: &Value) -> bool {
    let mut objects = Bijection::<Obj>::default();
    let mut symbols = Bijection::<Symbol>::default();
    let mut work = vec![(a.clone(), b.clone())];
    while let Some((a, b)) = work.pop() {
        match (&a, &b) {
            (Value::Cons(x), Value::Cons(y))
            | (Value::Vector(x), Value::Vector(y))
            | (Value::Record(x), Value::Record(y))
            | (Value::ByteCode(x), Value::ByteCode(y))
            | (Value::HashTable(x), Value::HashTable(y)) => match objects.pair(*x, *y) {
                Some(true) => continue,
                Some(false) => return false,
                None => {
                    if !push_children(heap_a, *x, heap_b, *y, &mut work) {
                        return false;
                    }
                }
            },
            (Value::Symbol(x), Value::Symbol(y)) => {
                let same = match (x.is_interned(), y.is_interned()) {
                    (true, true) => x.name() == y.name(),
                    (false, false) => {
                        x.name() == y.name() && symbols.pair(x.clone(), y.clone()) != Some(false)
                    }
                    _ => false,
                };
                if !same {
                    return false;
                }
            }
            (Value::String(_), Value::String(_)) | (Value::Bytes(_), Value::Bytes(_)) => {
                if a != b {
                    return false;
                }
            }
            _ => {
                if a.as_obj().is_some() || b.as_obj().is_some() || !equal_atoms(&a, &b) {
                    return false;
                }
            }
        }
    }
    true
}

fn equal_atoms(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::Bytes(bytes)) | (Value::Bytes(bytes), Value::String(s)) => {
            bytes.is_ascii() && s.as_bytes() == &bytes[..]
        }
        _ => a == b,
    }
}

// Queue the children of `x` and `y` for comparison; false if the objects
// differ in kind or size.
fn push_children(
    heap_a: &Heap,
    x: Obj,
    heap_b: &Heap,
    y: Obj,
    work: &mut Vec<(Value, Value)>,
) -> bool {
    match (heap_a.get(x), heap_b.get(y)) {
        (Object::Cons(p), Object::Cons(q)) => {
            work.push((p.cdr().clone(), q.cdr().clone()));
            work.push((p.car().clone(), q.car().clone()));
            true
        }
        (Object::Vector(p), Object::Vector(q))
        | (Object::Record(p), Object::Record(q))
        | (Object::ByteCode(p), Object::ByteCode(q)) => {
            if p.len() != q.len() {
                return false;
            }
            work.extend(p.iter().cloned().zip(q.iter().cloned()).rev());
            true
        }
        (Object::HashTable(p), Object::HashTable(q)) => {
            if p.test() != q.test() || p.weakness() != q.weakness() || p.len() != q.len() {
                return false;
            }
            for ((pk, pv), (qk, qv)) in p.iter().zip(q.iter()) {
                work.push((pk.clone(), qk.clone()));
                work.push((pv.clone(), qv.clone()));
            }
            true
        }
        _ => false,
    }
}

struct Bijection<T> {
    forward: HashMap<T, T>,
    backward: HashMap<T, T>,
}

impl<T> Default for Bijection<T> {
    fn default() -> Self {
        Bijection {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + std::hash::Hash> Bijection<T> {
    // `Some(true)` if the pair is already known, `Some(false)` if either
    // side is already paired with something else, `None` if it was added.
    fn pair(&mut self, x: T, y: T) -> Option<bool> {
        match (self.forward.get(&x), self.backward.get(&y)) {
            (None, None) => {
                self.forward.insert(x.clone(), y.clone());
                self.backward.insert(y, x);
                None
            }
            (Some(fy), Some(_)) => Some(*fy == y),
            _ => Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::symbol::Obarray;

    fn heap() -> Heap {
        Heap::with_obarray(Arc::new(Obarray::new()))
    }

    // Build `#1=(1 . #1#)`.
    fn ring(heap: &mut Heap) -> Value {
        let cell = heap.cons(1, Value::Nil);
        heap.set_cdr(cell.as_obj().unwrap(), cell.clone());
        cell
    }

    #[test]
    fn circular_lists_are_equal() {
        let mut heap = heap();
        let a = ring(&mut heap);
        let b = ring(&mut heap);
        assert!(equal(&heap, &a, &b));
        let c = heap.cons(2, a.clone());
        assert!(!equal(&heap, &c, &b));
    }

    #[test]
    fn unibyte_ascii_equals_multibyte() {
        let heap = heap();
        assert!(equal(&heap, &Value::from("abc"), &Value::bytes(&b"abc"[..])));
        assert!(!equal(&heap, &Value::from("\u{ff}"), &Value::bytes(&b"\xff"[..])));
    }

    #[test]
    fn isomorphism_respects_sharing() {
        let mut heap = heap();
        let shared = heap.list(vec![Value::from(1)]);
        let a = heap.list(vec![shared.clone(), shared]);
        let x = heap.list(vec![Value::from(1)]);
        let y = heap.list(vec![Value::from(1)]);
        let b = heap.list(vec![x, y]);
        assert!(equal(&heap, &a, &b));
        assert!(!isomorphic(&heap, &a, &heap, &b));
        assert!(isomorphic(&heap, &a, &heap, &a));
    }

    #[test]
    fn isomorphism_matches_gensyms() {
        let mut heap = heap();
        let g = Value::Symbol(Symbol::uninterned("g"));
        let h = Value::Symbol(Symbol::uninterned("g"));
        let a = heap.list(vec![g.clone(), g.clone()]);
        let b = heap.list(vec![h.clone(), h.clone()]);
        let c = heap.list(vec![h, Value::Symbol(Symbol::uninterned("g"))]);
        assert!(isomorphic(&heap, &a, &heap, &b));
        assert!(!isomorphic(&heap, &a, &heap, &c));
    }
}
