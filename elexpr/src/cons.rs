//! List "cons cell" data type and accompanying iterator types.
use crate::heap::Heap;
use crate::value::Value;

/// A Lisp "cons cell".
///
/// A cons cell is similar to a two-element tuple in Rust. Its fields are
/// traditionally called `car` and `cdr`, for obscure historical reasons. Both
/// the `car` and the `cdr` field can hold any `Value`, including other cons
/// cells.
///
/// This data type is used to represent singly-linked lists, by forming a
/// chain of cons cells where the next field of each cons cell contains the
/// next element; the last cons cell's `cdr` is `nil` for a proper list.
/// Cells live in a [`Heap`] and are referred to by [`Value::Cons`] handles.
#[derive(PartialEq, Eq, Clone)]
pub struct Cons {
    inner: (Value, Value),
}

impl Cons {
    /// Constructs a new cons cell from two values.
    pub fn new<T, U>(car: T, cdr: U) -> Self
    where
        T: Into<Value>,
        U: Into<Value>,
    {
        Cons {
            inner: (car.into(), cdr.into()),
        }
    }

    /// Returns a reference to the value in the `car` field.
    pub fn car(&self) -> &Value {
        &self.inner.0
    }

    /// Sets the `car` field.
    pub fn set_car(&mut self, car: impl Into<Value>) {
        self.inner.0 = car.into()
    }

    /// Returns a reference to the value in the `cdr` field.
    pub fn cdr(&self) -> &Value {
        &self.inner.1
    }

    /// Sets the `cdr` field.
    pub fn set_cdr(&mut self, cdr: impl Into<Value>) {
        self.inner.1 = cdr.into()
    }

    /// Returns references to the values in the fields of the cons cell.
    pub fn as_pair(&self) -> (&Value, &Value) {
        (&self.inner.0, &self.inner.1)
    }

    pub(crate) fn as_pair_mut(&mut self) -> (&mut Value, &mut Value) {
        (&mut self.inner.0, &mut self.inner.1)
    }

    /// Converts `self` into a pair of values without cloning.
    pub fn into_pair(self) -> (Value, Value) {
        self.inner
    }
}

impl std::fmt::Debug for Cons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cons")
            .field(&self.inner.0)
            .field(&self.inner.1)
            .finish()
    }
}

/// An iterator yielding the `car` field of a chain of cons cells.
///
/// # Improper lists
///
/// Since in Lisp, lists can be "improper", i.e., terminated by a value other
/// than `nil`, this iterator type takes advantage of the fact that Rust's
/// iterators can produce multiple sequences of values, each terminated by
/// `None`. For an improper list, the terminating value is produced after the
/// sequence of elements, as a singleton element, again followed by `None`.
///
/// For example, while the list `(1 2 3)` will produce the three expected
/// `Some` values, followed by `None`, the list `(1 2 . 3)` will produce `Some`
/// values for `1` and `2`, then a `None`, followed by a some value for `3`,
/// and then the final `None`.
///
/// # Circular lists
///
/// The iterator does not detect cycles; on a circular list it never
/// finishes. Bound it with [`Iterator::take`] where that matters.
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    heap: &'a Heap,
    cursor: ListCursor<'a>,
}

#[derive(Debug, Clone)]
enum ListCursor<'a> {
    Cons(&'a Cons),
    Dot(&'a Value),
    Rest(&'a Value),
    Exhausted,
}

impl<'a> ListIter<'a> {
    pub(crate) fn new(heap: &'a Heap, value: &'a Value) -> Self {
        let cursor = match value {
            Value::Nil => ListCursor::Exhausted,
            other => match heap.as_cons(other) {
                Some(cell) => ListCursor::Cons(cell),
                None => ListCursor::Dot(other),
            },
        };
        ListIter { heap, cursor }
    }

    /// Returns true when the iterator is completely exhausted.
    ///
    /// For an improper list, true will only be returned after the terminating
    /// value has been consumed.
    pub fn is_empty(&self) -> bool {
        matches!(self.cursor, ListCursor::Exhausted)
    }

    /// Returns a peek at the value that would be returned by a call to `next`.
    ///
    /// For improper lists, this implies that after the last regular element,
    /// `None` will be returned, while `is_empty` still returns false at that
    /// point.
    pub fn peek(&self) -> Option<&Value> {
        match &self.cursor {
            ListCursor::Cons(cell) => Some(cell.car()),
            ListCursor::Dot(_) => None,
            ListCursor::Rest(value) => Some(value),
            ListCursor::Exhausted => None,
        }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            ListCursor::Cons(cell) => {
                let car = cell.car();
                self.cursor = match cell.cdr() {
                    Value::Nil => ListCursor::Exhausted,
                    cdr => match self.heap.as_cons(cdr) {
                        Some(next) => ListCursor::Cons(next),
                        None => ListCursor::Dot(cdr),
                    },
                };
                Some(car)
            }
            ListCursor::Dot(value) => {
                self.cursor = ListCursor::Rest(value);
                None
            }
            ListCursor::Rest(value) => {
                self.cursor = ListCursor::Exhausted;
                Some(value)
            }
            ListCursor::Exhausted => None,
        }
    }
}

/// Collect the elements of a finite proper list, or `None` if `value` is
/// not one. Cycles are detected with Brent's algorithm.
pub(crate) fn proper_list(heap: &Heap, value: &Value) -> Option<Vec<Value>> {
    let mut items = Vec::new();
    let mut current = value;
    let mut power = 1usize;
    let mut steps = 0usize;
    let mut mark = value.clone();
    loop {
        match current {
            Value::Nil => return Some(items),
            _ => {
                let cell = heap.as_cons(current)?;
                items.push(cell.car().clone());
                current = cell.cdr();
                if *current == mark {
                    return None;
                }
                steps += 1;
                if steps == power {
                    mark = current.clone();
                    power *= 2;
                    steps = 0;
                }
            }
        }
    }
}
