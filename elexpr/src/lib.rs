#![deny(missing_docs)]

//! This crate reads and prints data in Emacs Lisp syntax, including shared
//! and circular structure.
//!
//! ```lisp
//! (defvar my-table #s(hash-table test equal data ("one" 1 "two" 2)))
//! (setq ring '#1=(a b c . #1#))
//! (global-set-key [?\C-c ?\M-x] #'my-command)
//! ```
//!
//! # Values and the heap
//!
//! A [`Value`] is either an immediate datum, such as a number, a character,
//! a symbol or a string, or a handle to a mutable object living in a
//! [`Heap`]. Conses, vectors, records, byte-code objects and hash tables
//! are heap objects: they have identity, may be shared between several
//! places, and may even contain themselves. Equality on `Value` is `eql`;
//! [`equal::equal`] compares structure.
//!
//! Symbols are interned into the [`Obarray`] of the heap they are read
//! into. [`Heap::new`] uses a process-wide obarray; give each heap its own
//! with [`Heap::with_obarray`] to keep symbol tables apart.
//!
//! # Reading
//!
//! ```
//! use elexpr::{Heap, Value};
//!
//! let mut heap = Heap::new();
//! let list = elexpr::from_str(&mut heap, "(1 ?a \"b\" . c)").unwrap();
//! let items: Vec<&Value> = heap.list_iter(&list).collect();
//! assert_eq!(items, vec![&Value::from(1), &Value::Char(97), &Value::from("b")]);
//!
//! // The tail of a dotted list comes after the first `None`.
//! let mut iter = heap.list_iter(&list);
//! assert_eq!(iter.by_ref().count(), 3);
//! assert_eq!(iter.next(), Some(&heap.symbol("c")));
//! ```
//!
//! [`Parser`] reads a sequence of forms and exposes the reader's
//! options; [`load`] drives it over a whole file.
//!
//! # Printing
//!
//! ```
//! use elexpr::{print, Heap};
//!
//! let mut heap = Heap::new();
//! let value = elexpr::from_str(&mut heap, "(#1=[x] #1#)").unwrap();
//! assert_eq!(elexpr::to_string(&heap, &value).unwrap(), "([x] [x])");
//!
//! let options = print::Options::new().with_circle(true);
//! let text = elexpr::to_string_custom(&heap, &value, options).unwrap();
//! assert_eq!(text, "(#1=[x] #1#)");
//! ```

pub mod cons;
pub mod equal;
pub mod hash_table;
pub mod heap;
pub mod load;
pub mod number;
pub mod parse;
pub mod print;
pub mod symbol;
pub mod value;

#[doc(inline)]
pub use self::parse::{
    from_reader, from_reader_custom, from_slice, from_slice_custom, from_str, from_str_custom,
    read_from_str, Parser,
};

#[doc(inline)]
pub use self::print::{
    to_string, to_string_custom, to_vec, to_vec_custom, to_writer, to_writer_custom, Printer,
};

#[doc(inline)]
pub use value::Value;

#[doc(inline)]
pub use heap::{Heap, Obj};

#[doc(inline)]
pub use cons::Cons;

#[doc(inline)]
pub use hash_table::HashTable;

#[doc(inline)]
pub use number::Number;

#[doc(inline)]
pub use symbol::{Obarray, Symbol};
