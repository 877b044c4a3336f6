//! Bookkeeping for `#N=` labels and `#N#` references.
//!
//! When `#N=` is read, a fresh placeholder is registered for `N` before the
//! labeled form itself is read, so that references inside the form resolve
//! to the placeholder. Once the form is complete, every occurrence of the
//! placeholder reachable from it is replaced by the form, which is how
//! circular structure comes into being.

use std::collections::{HashMap, HashSet};

use super::error::ErrorCode;
use crate::heap::{Heap, Obj};
use crate::value::{Placeholder, Value};

enum Entry {
    Pending {
        placeholder: Placeholder,
        referenced: bool,
    },
    Complete(Value),
}

/// The labels seen while reading one top-level form.
#[derive(Default)]
pub(crate) struct Labels {
    entries: HashMap<u64, Entry>,
    next_placeholder: u32,
}

impl Labels {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Start the definition of `label`.
    pub fn define(&mut self, label: u64) -> Result<Placeholder, ErrorCode> {
        if self.entries.contains_key(&label) {
            return Err(ErrorCode::DuplicateLabel(label));
        }
        let placeholder = Placeholder::new(self.next_placeholder);
        self.next_placeholder = self.next_placeholder.wrapping_add(1);
        self.entries.insert(
            label,
            Entry::Pending {
                placeholder,
                referenced: false,
            },
        );
        Ok(placeholder)
    }

    /// The value of `label`, or its placeholder if the labeled form is still
    /// being read.
    pub fn resolve(&mut self, label: u64) -> Option<Value> {
        match self.entries.get_mut(&label)? {
            Entry::Pending {
                placeholder,
                referenced,
            } => {
                *referenced = true;
                Some(Value::Placeholder(*placeholder))
            }
            Entry::Complete(value) => Some(value.clone()),
        }
    }

    /// Finish the definition of `label`. Returns true if the label was
    /// referenced while its form was being read.
    ///
    /// Labels defined as a bare reference to `label`, as in `#2=#1#` inside
    /// the form of `#1=`, hold its placeholder; they now get the value too.
    pub fn complete(&mut self, label: u64, value: Value) -> bool {
        let (placeholder, referenced) = match self.entries.get(&label) {
            Some(Entry::Pending {
                placeholder,
                referenced,
            }) => (Some(*placeholder), *referenced),
            _ => (None, false),
        };
        if let Some(placeholder) = placeholder.filter(|_| referenced) {
            let alias = Value::Placeholder(placeholder);
            for entry in self.entries.values_mut() {
                if let Entry::Complete(aliased) = entry {
                    if *aliased == alias {
                        *aliased = value.clone();
                    }
                }
            }
        }
        self.entries.insert(label, Entry::Complete(value));
        referenced
    }
}

/// Replace every occurrence of `placeholder` reachable from `root` by
/// `root` itself.
///
/// Each object is visited once, so shared and already circular structure
/// is handled. Hash table keys are left alone; the reader rejects tables
/// whose keys contain placeholders.
pub(crate) fn substitute(heap: &mut Heap, root: &Value, placeholder: Placeholder) {
    let target = Value::Placeholder(placeholder);
    let mut visited: HashSet<Obj> = HashSet::new();
    let mut work: Vec<Obj> = root.as_obj().into_iter().collect();
    let mut replaced = 0usize;
    while let Some(obj) = work.pop() {
        if !visited.insert(obj) {
            continue;
        }
        heap.get_mut(obj).for_each_child_mut(|child| {
            if *child == target {
                *child = root.clone();
                replaced += 1;
            } else if let Some(next) = child.as_obj() {
                work.push(next);
            }
        });
    }
    log::trace!(
        "substituted {} reference(s) after visiting {} object(s)",
        replaced,
        visited.len()
    );
}

/// Returns true if a placeholder is reachable from `value`.
pub(crate) fn contains_placeholder(heap: &Heap, value: &Value) -> bool {
    if value.is_placeholder() {
        return true;
    }
    let mut visited: HashSet<Obj> = HashSet::new();
    let mut work: Vec<Obj> = value.as_obj().into_iter().collect();
    while let Some(obj) = work.pop() {
        if !visited.insert(obj) {
            continue;
        }
        let mut found = false;
        heap.get(obj).for_each_child(|child| {
            if child.is_placeholder() {
                found = true;
            } else if let Some(next) = child.as_obj() {
                work.push(next);
            }
        });
        if found {
            return true;
        }
    }
    false
}
