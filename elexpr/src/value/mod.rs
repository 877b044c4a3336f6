//! The Lisp value type.
//!
//! A [`Value`] is either an immediate datum (a number, a character, a
//! symbol, a string) or a handle to an object in a [`Heap`]. Values are
//! cheap to clone; cloning a handle does not copy the object it refers to.
//!
//! ```
//! use elexpr::{Heap, Value};
//!
//! let mut heap = Heap::new();
//! let v = heap.vector(vec![Value::from(1), Value::from("two")]);
//! assert!(v.is_vector());
//! assert_eq!(heap.slots(&v).map(|s| s.len()), Some(2));
//! assert_eq!(v.clone(), v);
//! ```
//!
//! [`Heap`]: crate::heap::Heap

use std::fmt;
use std::rc::Rc;

use crate::heap::Obj;
use crate::number::Number;
use crate::symbol::Symbol;

mod from;

/// The largest character code. Codes above `0x10FFFF` denote raw bytes
/// and other non-Unicode characters.
pub const MAX_CHAR: u32 = 0x3F_FFFF;

/// Represents a Lisp value.
///
/// Equality is `eql`: immediate data compare by value (floats bitwise),
/// symbols and heap objects by identity. Use [`equal`] for structural
/// comparison.
///
/// [`equal`]: crate::equal::equal
#[derive(PartialEq, Eq, Hash, Clone)]
pub enum Value {
    /// The symbol `nil`, which doubles as the empty list.
    Nil,
    /// Any other symbol, including `t` and keywords.
    Symbol(Symbol),
    /// An integer or float.
    Number(Number),
    /// A character code, at most [`MAX_CHAR`].
    Char(u32),
    /// A multibyte string.
    String(Rc<str>),
    /// A unibyte string.
    Bytes(Rc<[u8]>),
    /// A bool-vector.
    BoolVector(Rc<[bool]>),
    /// A cons cell.
    Cons(Obj),
    /// A general vector.
    Vector(Obj),
    /// A record.
    Record(Obj),
    /// A hash table.
    HashTable(Obj),
    /// A byte-code function object.
    ByteCode(Obj),
    #[doc(hidden)]
    Placeholder(Placeholder),
}

/// Stands in for a labeled object while the reader is still constructing
/// it. Never part of a successfully read value.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder(u32);

impl Placeholder {
    pub(crate) fn new(id: u32) -> Self {
        Placeholder(id)
    }
}

impl Value {
    /// Create a symbol value. `nil` is not special-cased here; see
    /// [`Heap::symbol`](crate::heap::Heap::symbol).
    pub fn symbol(symbol: Symbol) -> Self {
        Value::Symbol(symbol)
    }

    /// Create a character value, or `None` if `code` exceeds [`MAX_CHAR`].
    pub fn char(code: u32) -> Option<Self> {
        if code <= MAX_CHAR {
            Some(Value::Char(code))
        } else {
            None
        }
    }

    /// Create a unibyte string.
    pub fn bytes(bytes: impl Into<Rc<[u8]>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Returns true for `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns true for `nil` and conses.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::Nil | Value::Cons(_))
    }

    /// Returns true for conses.
    pub fn is_cons(&self) -> bool {
        matches!(self, Value::Cons(_))
    }

    /// Returns true for symbols other than `nil`.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    /// Returns true for keywords.
    pub fn is_keyword(&self) -> bool {
        matches!(self, Value::Symbol(s) if s.is_keyword())
    }

    /// Returns true for numbers.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns true for integers, including bignums.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_integer())
    }

    /// Returns true for integers that fit in an `i64`.
    pub fn is_fixnum(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_fixnum())
    }

    /// Returns true for floats.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_float())
    }

    /// Returns true for characters.
    pub fn is_char(&self) -> bool {
        matches!(self, Value::Char(_))
    }

    /// Returns true for strings, multibyte or unibyte.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_) | Value::Bytes(_))
    }

    /// Returns true for general vectors.
    pub fn is_vector(&self) -> bool {
        matches!(self, Value::Vector(_))
    }

    /// Returns true for records.
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Returns true for hash tables.
    pub fn is_hash_table(&self) -> bool {
        matches!(self, Value::HashTable(_))
    }

    /// Returns true for byte-code objects.
    pub fn is_byte_code(&self) -> bool {
        matches!(self, Value::ByteCode(_))
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder(_))
    }

    /// The symbol, if the value is a symbol other than `nil`.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The symbol name, `"nil"` included.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Nil => Some("nil"),
            Value::Symbol(s) => Some(s.name()),
            _ => None,
        }
    }

    /// The number, if the value is one.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The value of a fixnum.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// The value of a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_float() => Some(n.as_f64()),
            _ => None,
        }
    }

    /// The code of a character.
    pub fn as_char(&self) -> Option<u32> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// The contents of a multibyte string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The contents of a unibyte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The heap handle of an object value.
    pub fn as_obj(&self) -> Option<Obj> {
        match self {
            Value::Cons(obj)
            | Value::Vector(obj)
            | Value::Record(obj)
            | Value::HashTable(obj)
            | Value::ByteCode(obj) => Some(*obj),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Symbol(s) => fmt::Debug::fmt(s, f),
            Value::Number(n) => fmt::Debug::fmt(n, f),
            Value::Char(c) => match char::from_u32(*c) {
                Some(c) => write!(f, "Char({:?})", c),
                None => write!(f, "Char({:#x})", c),
            },
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Bytes(b) => write!(f, "Bytes({:?})", String::from_utf8_lossy(b)),
            Value::BoolVector(b) => f.debug_tuple("BoolVector").field(b).finish(),
            Value::Cons(obj) => write!(f, "Cons({})", obj.index()),
            Value::Vector(obj) => write!(f, "Vector({})", obj.index()),
            Value::Record(obj) => write!(f, "Record({})", obj.index()),
            Value::HashTable(obj) => write!(f, "HashTable({})", obj.index()),
            Value::ByteCode(obj) => write!(f, "ByteCode({})", obj.index()),
            Value::Placeholder(p) => write!(f, "Placeholder({})", p.0),
        }
    }
}
