//! Finding the objects that need `#N=` labels.
//!
//! Before printing with `circle` enabled, the value graph is walked once.
//! Every object reached a second time, whether through sharing or a cycle,
//! is marked; it gets a label when first printed and a reference after.

use std::collections::{HashMap, HashSet};

use crate::heap::{Heap, Obj};
use crate::symbol::Symbol;
use crate::value::Value;

/// Something that can be printed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum Shared {
    Object(Obj),
    Symbol(Symbol),
}

/// What to print in front of (or instead of) a shared object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mark {
    Define(usize),
    Reference(usize),
}

#[derive(Debug, Default)]
pub(super) struct Labels {
    shared: HashSet<Shared>,
    assigned: HashMap<Shared, usize>,
    next: usize,
}

impl Labels {
    pub fn is_shared(&self, key: &Shared) -> bool {
        self.shared.contains(key)
    }

    /// Returns `None` for objects printed only once. Otherwise the first
    /// call for `key` assigns the next label.
    pub fn mark(&mut self, key: Shared) -> Option<Mark> {
        if !self.shared.contains(&key) {
            return None;
        }
        if let Some(label) = self.assigned.get(&key) {
            return Some(Mark::Reference(*label));
        }
        self.next += 1;
        self.assigned.insert(key, self.next);
        Some(Mark::Define(self.next))
    }
}

/// Walk everything reachable from `root`. Uninterned symbols take part
/// when `gensym` is set.
pub(super) fn scan(heap: &Heap, root: &Value, gensym: bool) -> Labels {
    let mut seen: HashSet<Shared> = HashSet::new();
    let mut shared: HashSet<Shared> = HashSet::new();
    let mut work = vec![root.clone()];
    while let Some(value) = work.pop() {
        let key = match &value {
            Value::Symbol(symbol) if gensym && !symbol.is_interned() => {
                Shared::Symbol(symbol.clone())
            }
            other => match other.as_obj() {
                Some(obj) => Shared::Object(obj),
                None => continue,
            },
        };
        if !seen.insert(key.clone()) {
            shared.insert(key);
            continue;
        }
        if let Shared::Object(obj) = key {
            heap.get(obj).for_each_child(|child| work.push(child.clone()));
        }
    }
    log::trace!(
        "{} of {} objects need labels",
        shared.len(),
        seen.len()
    );
    Labels {
        shared,
        assigned: HashMap::new(),
        next: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::symbol::Obarray;

    #[test]
    fn only_repeated_objects_are_labeled() {
        let mut heap = Heap::with_obarray(Arc::new(Obarray::new()));
        let shared = heap.list(vec![Value::from(1)]);
        let single = heap.list(vec![Value::from(2)]);
        let root = heap.vector(vec![shared.clone(), single.clone(), shared.clone()]);

        let mut labels = scan(&heap, &root, false);
        let shared = Shared::Object(shared.as_obj().unwrap());
        assert!(labels.is_shared(&shared));
        assert!(!labels.is_shared(&Shared::Object(single.as_obj().unwrap())));
        assert_eq!(labels.mark(Shared::Object(root.as_obj().unwrap())), None);
        assert_eq!(labels.mark(shared.clone()), Some(Mark::Define(1)));
        assert_eq!(labels.mark(shared), Some(Mark::Reference(1)));
    }

    #[test]
    fn gensyms_are_tracked_on_request() {
        let mut heap = Heap::with_obarray(Arc::new(Obarray::new()));
        let gensym = Value::Symbol(Symbol::uninterned("g"));
        let root = heap.list(vec![gensym.clone(), gensym]);
        assert_eq!(scan(&heap, &root, false).shared.len(), 0);
        assert_eq!(scan(&heap, &root, true).shared.len(), 1);
    }
}
