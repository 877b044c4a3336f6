//! Converting values into text.
//!
//! # Terminology
//!
//! The process of serializing S-expressions to their textual
//! representation is referred to "writing" in Lisp. To avoid
//! confusion with Rust's `Write` trait, `elexpr` uses "printing"
//! instead.
//!
//! By default values print like `prin1` does, so that the text reads back
//! as an `equal` value. Shared and circular structure needs the `circle`
//! option to survive the round trip:
//!
//! ```
//! use elexpr::{parse, print, Heap};
//!
//! let mut heap = Heap::new();
//! let value = parse::from_str(&mut heap, "#1=(a . #1#)").unwrap();
//! assert_eq!(print::to_string(&heap, &value).unwrap(), "(a . #0)");
//!
//! let options = print::Options::new().with_circle(true);
//! let text = print::to_string_custom(&heap, &value, options).unwrap();
//! assert_eq!(text, "#1=(a . #1#)");
//! ```

use std::collections::HashMap;
use std::io;

use num_bigint::BigInt;

use crate::cons::Cons;
use crate::hash_table::{HashTable, HashTest};
use crate::heap::{Heap, Obj, Object};
use crate::number::{self, Number};
use crate::parse::{self, needs_escape_in_char_literal};
use crate::symbol::Symbol;
use crate::value::Value;

use self::circle::{Mark, Shared};

mod circle;

// Objects nested deeper than this are reported as an error instead of
// being printed.
const MAX_DEPTH: usize = 4096;

/// Options for printing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    radix: u32,
    circle: bool,
    escape: bool,
    quoted: bool,
    gensym: bool,
    escape_newlines: bool,
    escape_control_characters: bool,
    char_syntax: CharSyntax,
}

impl Options {
    /// Options for `prin1`-style output that reads back.
    pub fn new() -> Self {
        Options {
            radix: 10,
            circle: false,
            escape: true,
            quoted: true,
            gensym: false,
            escape_newlines: false,
            escape_control_characters: false,
            char_syntax: CharSyntax::Literal,
        }
    }

    /// Options for `princ`-style output: no quotes around strings and no
    /// backslashes in symbols.
    pub fn princ() -> Self {
        Options::new().with_escape(false)
    }

    /// Print integers in `radix`, with a `#x`, `#o`, `#b` or `#Nr` prefix
    /// unless it is 10. Radixes outside `2..=36` are ignored.
    pub fn with_radix(mut self, radix: u32) -> Self {
        if (2..=36).contains(&radix) {
            self.radix = radix;
        }
        self
    }

    /// Label shared and circular structure with `#N=` and `#N#`.
    pub fn with_circle(mut self, circle: bool) -> Self {
        self.circle = circle;
        self
    }

    /// Quote strings and escape special characters in strings and symbols.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    /// Print `(quote x)` as `'x`, and likewise for `function` and the
    /// backquote forms.
    pub fn with_quoted(mut self, quoted: bool) -> Self {
        self.quoted = quoted;
        self
    }

    /// Print uninterned symbols with a `#:` prefix.
    pub fn with_gensym(mut self, gensym: bool) -> Self {
        self.gensym = gensym;
        self
    }

    /// Print newlines and form feeds in strings as `\n` and `\f`.
    pub fn with_escape_newlines(mut self, escape: bool) -> Self {
        self.escape_newlines = escape;
        self
    }

    /// Print other control characters in strings as octal escapes.
    pub fn with_escape_control_characters(mut self, escape: bool) -> Self {
        self.escape_control_characters = escape;
        self
    }

    /// Set how characters are printed.
    pub fn with_char_syntax(mut self, syntax: CharSyntax) -> Self {
        self.char_syntax = syntax;
        self
    }

    /// The radix integers are printed in.
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Whether shared structure is labeled.
    pub fn circle(&self) -> bool {
        self.circle
    }

    /// Whether output is escaped for reading back.
    pub fn escape(&self) -> bool {
        self.escape
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::new()
    }
}

/// How to print characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSyntax {
    /// Character literal syntax, e.g. `?a` or `?\n`.
    Literal,
    /// The character code, e.g. `97`. This is what Emacs itself prints.
    Integer,
}

/// A backslash escape inside a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharEscape {
    /// An escaped quote `"`
    Quote,
    /// An escaped reverse solidus `\`
    ReverseSolidus,
    /// A line feed written as `\n`
    LineFeed,
    /// A form feed written as `\f`
    FormFeed,
    /// An ASCII control character written as three octal digits
    Control(u8),
}

/// The bracketed kinds of vector-like objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorType {
    /// A general vector, `[...]`.
    Vector,
    /// A record or hash table, `#s(...)`.
    Record,
    /// A byte-code object, `#[...]`.
    ByteCode,
}

/// This trait abstracts away writing the lexical pieces of the output,
/// which allows the implementer to adjust how atoms and brackets look.
///
/// The default implementation produces `prin1` output.
pub trait Formatter {
    /// Writes `nil`.
    #[inline]
    fn write_nil<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"nil")
    }

    /// Writes a number in decimal.
    #[inline]
    fn write_number<W>(&mut self, writer: &mut W, value: &Number) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_number_in_radix(writer, value, 10)
    }

    /// Writes a character, using character literal syntax.
    fn write_char<W>(&mut self, writer: &mut W, code: u32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_char_literal(writer, code)
    }

    /// Writes a symbol name, escaping characters that would otherwise end
    /// the symbol or turn it into a number.
    fn write_symbol<W>(&mut self, writer: &mut W, name: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_escaped_symbol(writer, name)
    }

    /// Writes the `#:` in front of an uninterned symbol.
    #[inline]
    fn write_uninterned_prefix<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"#:")
    }

    /// Called before each series of `write_string_fragment` and
    /// `write_char_escape`.  Writes a `"` to the specified writer.
    #[inline]
    fn begin_string<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"\"")
    }

    /// Called after each series of `write_string_fragment` and
    /// `write_char_escape`.  Writes a `"` to the specified writer.
    #[inline]
    fn end_string<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"\"")
    }

    /// Writes a string fragment that doesn't need any escaping.
    #[inline]
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(fragment.as_bytes())
    }

    /// Decides whether `c` is escaped inside a string.
    #[inline]
    fn char_escape(&self, c: char) -> Option<CharEscape> {
        match c {
            '"' => Some(CharEscape::Quote),
            '\\' => Some(CharEscape::ReverseSolidus),
            _ => None,
        }
    }

    /// Writes a character escape code to the specified writer.
    #[inline]
    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_elisp_char_escape(writer, char_escape)
    }

    /// Writes a unibyte string. Bytes other than printable ASCII are
    /// written as octal escapes.
    fn write_bytes<W>(&mut self, writer: &mut W, bytes: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_unibyte_string(writer, bytes)
    }

    /// Writes a bool-vector as `#&N"..."`.
    fn write_bool_vector<W>(&mut self, writer: &mut W, bits: &[bool]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut packed = vec![0u8; (bits.len() + 7) / 8];
        for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
            packed[i / 8] |= 1 << (i % 8);
        }
        writer.write_all(b"#&")?;
        writer.write_all(itoa::Buffer::new().format(bits.len()).as_bytes())?;
        self.write_bytes(writer, &packed)
    }

    /// Called before any list elements.  Writes a `(` to the specified
    /// writer.
    #[inline]
    fn begin_list<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"(")
    }

    /// Called after all list elements have been written.  Writes a `)` to the
    /// specified writer.
    #[inline]
    fn end_list<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b")")
    }

    /// Called before starting to write a list or vector element. Writes a space
    /// to the specified writer, if needed.
    #[inline]
    fn begin_seq_element<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b" ")
        }
    }

    /// Called before writing the tail of an improper list.  Writes a `.` to
    /// the specified writer.
    #[inline]
    fn write_dot<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b".")
    }

    /// Writes the shorthand for a quoting form, like `'` or `#'`.
    #[inline]
    fn write_abbreviation<W>(&mut self, writer: &mut W, prefix: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(prefix.as_bytes())
    }

    /// Called before any vector elements.
    #[inline]
    fn begin_vector<W>(&mut self, kind: VectorType, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match kind {
            VectorType::Vector => writer.write_all(b"["),
            VectorType::Record => writer.write_all(b"#s("),
            VectorType::ByteCode => writer.write_all(b"#["),
        }
    }

    /// Called after all vector elements have been written.
    #[inline]
    fn end_vector<W>(&mut self, kind: VectorType, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match kind {
            VectorType::Vector | VectorType::ByteCode => writer.write_all(b"]"),
            VectorType::Record => writer.write_all(b")"),
        }
    }

    /// Writes `#N=` before the first occurrence of a shared object, or
    /// `#N#` in place of a later one.
    fn write_label<W>(&mut self, writer: &mut W, label: usize, definition: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"#")?;
        writer.write_all(itoa::Buffer::new().format(label).as_bytes())?;
        writer.write_all(if definition { b"=" } else { b"#" })
    }

    /// Writes `#N` in place of an object that is already being printed
    /// `N` levels up, or whose list tail repeats from element `N`.
    fn write_depth_reference<W>(&mut self, writer: &mut W, depth: usize) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"#")?;
        writer.write_all(itoa::Buffer::new().format(depth).as_bytes())
    }
}

/// Writes `prin1` output with default options.
#[derive(Clone, Debug)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {}

/// A formatter which follows the lexical settings of an [`Options`].
#[derive(Clone, Debug)]
pub struct CustomizedFormatter {
    options: Options,
}

impl Formatter for CustomizedFormatter {
    fn write_number<W>(&mut self, writer: &mut W, value: &Number) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_number_in_radix(writer, value, self.options.radix)
    }

    fn write_char<W>(&mut self, writer: &mut W, code: u32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match self.options.char_syntax {
            CharSyntax::Integer => writer.write_all(itoa::Buffer::new().format(code).as_bytes()),
            CharSyntax::Literal if self.options.escape => write_char_literal(writer, code),
            CharSyntax::Literal => match char::from_u32(code) {
                Some(c) => write!(writer, "{}", c),
                None => writer.write_all(itoa::Buffer::new().format(code).as_bytes()),
            },
        }
    }

    fn write_symbol<W>(&mut self, writer: &mut W, name: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.options.escape {
            write_escaped_symbol(writer, name)
        } else {
            writer.write_all(name.as_bytes())
        }
    }

    fn begin_string<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.options.escape {
            writer.write_all(b"\"")
        } else {
            Ok(())
        }
    }

    fn end_string<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.begin_string(writer)
    }

    fn char_escape(&self, c: char) -> Option<CharEscape> {
        if !self.options.escape {
            return None;
        }
        match c {
            '"' => Some(CharEscape::Quote),
            '\\' => Some(CharEscape::ReverseSolidus),
            '\n' if self.options.escape_newlines => Some(CharEscape::LineFeed),
            '\x0c' if self.options.escape_newlines => Some(CharEscape::FormFeed),
            '\n' | '\x0c' => None,
            c if self.options.escape_control_characters && (c < ' ' || c == '\x7f') => {
                Some(CharEscape::Control(c as u8))
            }
            _ => None,
        }
    }

    fn write_bytes<W>(&mut self, writer: &mut W, bytes: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.options.escape {
            write_unibyte_string(writer, bytes)
        } else {
            writer.write_all(bytes)
        }
    }
}

/// A printer for Lisp values.
#[derive(Debug)]
pub struct Printer<W, F = DefaultFormatter> {
    writer: W,
    formatter: F,
    options: Options,
}

// Per-call bookkeeping.
struct State {
    labels: circle::Labels,
    being_printed: Vec<Obj>,
}

// Pending work. Nested objects are printed from this stack instead of by
// recursion, so nesting is bounded by `MAX_DEPTH` alone.
enum Task<'h> {
    Value(&'h Value),
    ListTail {
        cell: &'h Cons,
        tails: HashMap<Obj, usize>,
    },
    Slots {
        kind: VectorType,
        items: &'h [Value],
        index: usize,
    },
    Entries {
        entries: &'h [(Value, Value)],
        index: usize,
    },
    EndList,
    // The innermost object being printed is done.
    Leave,
}

impl<W> Printer<W>
where
    W: io::Write,
{
    /// Creates a new printer with default options.
    #[inline]
    pub fn new(writer: W) -> Self {
        Printer::with_formatter(writer, DefaultFormatter)
    }
}

impl<W> Printer<W, CustomizedFormatter>
where
    W: io::Write,
{
    /// Construct a printer tuned by the specified options.
    pub fn with_options(writer: W, options: Options) -> Self {
        Printer {
            writer,
            formatter: CustomizedFormatter { options },
            options,
        }
    }
}

impl<W, F> Printer<W, F>
where
    W: io::Write,
    F: Formatter,
{
    /// Creates a new printer whose output will be written to the writer
    /// specified. Structure is printed with default options.
    #[inline]
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Printer {
            writer,
            formatter,
            options: Options::new(),
        }
    }

    /// Unwrap the `Writer` from the `Printer`.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Output the representation of `value`, whose objects live in `heap`.
    pub fn print(&mut self, heap: &Heap, value: &Value) -> io::Result<()> {
        let labels = if self.options.circle {
            circle::scan(heap, value, self.options.gensym)
        } else {
            circle::Labels::default()
        };
        let mut state = State {
            labels,
            being_printed: Vec::new(),
        };
        let mut tasks = vec![Task::Value(value)];
        while let Some(task) = tasks.pop() {
            self.run(heap, task, &mut state, &mut tasks)?;
        }
        Ok(())
    }

    fn run<'h>(
        &mut self,
        heap: &'h Heap,
        task: Task<'h>,
        state: &mut State,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        match task {
            Task::Value(value) => self.print_value(heap, value, state, tasks),
            Task::ListTail { cell, tails } => self.print_list_tail(heap, cell, tails, state, tasks),
            Task::Slots { kind, items, index } => match items.get(index) {
                Some(item) => {
                    self.formatter.begin_seq_element(&mut self.writer, index == 0)?;
                    tasks.push(Task::Slots {
                        kind,
                        items,
                        index: index + 1,
                    });
                    tasks.push(Task::Value(item));
                    Ok(())
                }
                None => self.formatter.end_vector(kind, &mut self.writer),
            },
            // Keys and values alternate; `index` counts both.
            Task::Entries { entries, index } => match entries.get(index / 2) {
                Some((key, value)) => {
                    self.formatter.begin_seq_element(&mut self.writer, index == 0)?;
                    tasks.push(Task::Entries {
                        entries,
                        index: index + 1,
                    });
                    tasks.push(Task::Value(if index % 2 == 0 { key } else { value }));
                    Ok(())
                }
                None => {
                    self.formatter.end_list(&mut self.writer)?;
                    self.formatter.end_vector(VectorType::Record, &mut self.writer)
                }
            },
            Task::EndList => self.formatter.end_list(&mut self.writer),
            Task::Leave => {
                state.being_printed.pop();
                Ok(())
            }
        }
    }

    fn print_value<'h>(
        &mut self,
        heap: &'h Heap,
        value: &'h Value,
        state: &mut State,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        match value {
            Value::Nil => self.formatter.write_nil(&mut self.writer),
            Value::Symbol(symbol) => self.print_symbol(symbol, state),
            Value::Number(n) => self.formatter.write_number(&mut self.writer, n),
            Value::Char(c) => self.formatter.write_char(&mut self.writer, *c),
            Value::String(s) => format_escaped_str(&mut self.writer, &mut self.formatter, s),
            Value::Bytes(bytes) => self.formatter.write_bytes(&mut self.writer, bytes),
            Value::BoolVector(bits) => self.formatter.write_bool_vector(&mut self.writer, bits),
            Value::Cons(obj)
            | Value::Vector(obj)
            | Value::Record(obj)
            | Value::HashTable(obj)
            | Value::ByteCode(obj) => self.print_object(heap, *obj, state, tasks),
            Value::Placeholder(_) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "cannot print an unresolved label placeholder",
            )),
        }
    }

    fn print_symbol(&mut self, symbol: &Symbol, state: &mut State) -> io::Result<()> {
        if self.options.gensym && self.options.escape && !symbol.is_interned() {
            match state.labels.mark(Shared::Symbol(symbol.clone())) {
                Some(Mark::Reference(label)) => {
                    return self.formatter.write_label(&mut self.writer, label, false)
                }
                Some(Mark::Define(label)) => {
                    self.formatter.write_label(&mut self.writer, label, true)?
                }
                None => {}
            }
            self.formatter.write_uninterned_prefix(&mut self.writer)?;
            if symbol.name().is_empty() {
                return Ok(());
            }
        }
        self.formatter.write_symbol(&mut self.writer, symbol.name())
    }

    // Writes the opening of `obj` and schedules the rest.
    fn print_object<'h>(
        &mut self,
        heap: &'h Heap,
        obj: Obj,
        state: &mut State,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        match state.labels.mark(Shared::Object(obj)) {
            Some(Mark::Reference(label)) => {
                return self.formatter.write_label(&mut self.writer, label, false)
            }
            Some(Mark::Define(label)) => {
                self.formatter.write_label(&mut self.writer, label, true)?
            }
            None => {
                if let Some(depth) = state.being_printed.iter().position(|o| *o == obj) {
                    return self.formatter.write_depth_reference(&mut self.writer, depth);
                }
            }
        }
        if state.being_printed.len() >= MAX_DEPTH {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "structure nested too deeply to print",
            ));
        }

        state.being_printed.push(obj);
        tasks.push(Task::Leave);
        match heap.get(obj) {
            Object::Cons(cell) => self.print_list(heap, obj, cell, state, tasks),
            Object::Vector(items) => self.print_slots(VectorType::Vector, items, tasks),
            Object::Record(items) => self.print_slots(VectorType::Record, items, tasks),
            Object::ByteCode(items) => self.print_slots(VectorType::ByteCode, items, tasks),
            Object::HashTable(table) => self.print_hash_table(table, tasks),
        }
    }

    fn print_list<'h>(
        &mut self,
        heap: &'h Heap,
        head: Obj,
        cell: &'h Cons,
        state: &State,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        if let Some((prefix, argument)) = self.abbreviation(heap, cell, state) {
            self.formatter.write_abbreviation(&mut self.writer, prefix)?;
            tasks.push(Task::Value(argument));
            return Ok(());
        }

        self.formatter.begin_list(&mut self.writer)?;
        self.formatter.begin_seq_element(&mut self.writer, true)?;
        let mut tails = HashMap::new();
        tails.insert(head, 0);
        tasks.push(Task::ListTail { cell, tails });
        tasks.push(Task::Value(cell.car()));
        Ok(())
    }

    // The car of `cell` has been printed; go on with its cdr. `tails` maps
    // the cells of this list seen so far to their index, for cutting off
    // circular tails when they are not labeled.
    fn print_list_tail<'h>(
        &mut self,
        heap: &'h Heap,
        cell: &'h Cons,
        mut tails: HashMap<Obj, usize>,
        state: &State,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        let next = match cell.cdr() {
            Value::Nil => return self.formatter.end_list(&mut self.writer),
            Value::Cons(next) if !state.labels.is_shared(&Shared::Object(*next)) => *next,
            tail => {
                self.formatter.begin_seq_element(&mut self.writer, false)?;
                self.formatter.write_dot(&mut self.writer)?;
                self.formatter.begin_seq_element(&mut self.writer, false)?;
                tasks.push(Task::EndList);
                tasks.push(Task::Value(tail));
                return Ok(());
            }
        };
        if let Some(index) = tails.get(&next) {
            self.formatter.begin_seq_element(&mut self.writer, false)?;
            self.formatter.write_dot(&mut self.writer)?;
            self.formatter.begin_seq_element(&mut self.writer, false)?;
            self.formatter.write_depth_reference(&mut self.writer, *index)?;
            return self.formatter.end_list(&mut self.writer);
        }
        let next_cell = match heap.get(next) {
            Object::Cons(next_cell) => next_cell,
            _ => return self.formatter.end_list(&mut self.writer),
        };
        tails.insert(next, tails.len());
        self.formatter.begin_seq_element(&mut self.writer, false)?;
        tasks.push(Task::ListTail {
            cell: next_cell,
            tails,
        });
        tasks.push(Task::Value(next_cell.car()));
        Ok(())
    }

    // `(quote x)` and friends, when they can be abbreviated without losing
    // a label.
    fn abbreviation<'h>(
        &self,
        heap: &'h Heap,
        cell: &Cons,
        state: &State,
    ) -> Option<(&'static str, &'h Value)> {
        if !self.options.quoted {
            return None;
        }
        let prefix = match cell.car() {
            Value::Symbol(symbol) if symbol.is_interned() => match symbol.name() {
                "quote" => "'",
                "function" => "#'",
                "`" => "`",
                "," => ",",
                ",@" => ",@",
                _ => return None,
            },
            _ => return None,
        };
        let rest = match cell.cdr() {
            Value::Cons(obj) if !state.labels.is_shared(&Shared::Object(*obj)) => *obj,
            _ => return None,
        };
        let argument = match heap.get(rest) {
            Object::Cons(rest) if rest.cdr().is_nil() => rest.car(),
            _ => return None,
        };
        // `,@x` would read back as a splice.
        if prefix == "," && argument.as_name().map_or(false, |name| name.starts_with('@')) {
            return None;
        }
        Some((prefix, argument))
    }

    fn print_slots<'h>(
        &mut self,
        kind: VectorType,
        items: &'h [Value],
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        self.formatter.begin_vector(kind, &mut self.writer)?;
        tasks.push(Task::Slots {
            kind,
            items,
            index: 0,
        });
        Ok(())
    }

    // Defaults are left out: `#s(hash-table test equal data (k v ...))`.
    fn print_hash_table<'h>(
        &mut self,
        table: &'h HashTable,
        tasks: &mut Vec<Task<'h>>,
    ) -> io::Result<()> {
        self.formatter.begin_vector(VectorType::Record, &mut self.writer)?;
        self.formatter.write_symbol(&mut self.writer, "hash-table")?;
        if table.test() != HashTest::default() {
            self.print_property("test", table.test().name())?;
        }
        if let Some(weakness) = table.weakness() {
            self.print_property("weakness", weakness.name())?;
        }
        if table.is_empty() {
            return self.formatter.end_vector(VectorType::Record, &mut self.writer);
        }
        self.formatter.begin_seq_element(&mut self.writer, false)?;
        self.formatter.write_symbol(&mut self.writer, "data")?;
        self.formatter.begin_seq_element(&mut self.writer, false)?;
        self.formatter.begin_list(&mut self.writer)?;
        tasks.push(Task::Entries {
            entries: table.entries(),
            index: 0,
        });
        Ok(())
    }

    fn print_property(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.formatter.begin_seq_element(&mut self.writer, false)?;
        self.formatter.write_symbol(&mut self.writer, name)?;
        self.formatter.begin_seq_element(&mut self.writer, false)?;
        self.formatter.write_symbol(&mut self.writer, value)
    }
}

impl<W, F> io::Write for Printer<W, F>
where
    W: io::Write,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn format_escaped_str<W, F>(writer: &mut W, formatter: &mut F, value: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
    F: ?Sized + Formatter,
{
    formatter.begin_string(writer)?;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        let char_escape = match formatter.char_escape(c) {
            Some(char_escape) => char_escape,
            None => continue,
        };
        if start < i {
            formatter.write_string_fragment(writer, &value[start..i])?;
        }
        formatter.write_char_escape(writer, char_escape)?;
        start = i + c.len_utf8();
    }
    if start != value.len() {
        formatter.write_string_fragment(writer, &value[start..])?;
    }
    formatter.end_string(writer)
}

fn write_elisp_char_escape<W>(writer: &mut W, char_escape: CharEscape) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    use self::CharEscape::*;

    let s = match char_escape {
        Quote => b"\\\"",
        ReverseSolidus => b"\\\\",
        LineFeed => b"\\n",
        FormFeed => b"\\f",
        Control(byte) => return write_octal_escape(writer, byte),
    };
    writer.write_all(s)
}

// Always three digits, so that a following digit is not taken as part of
// the escape.
fn write_octal_escape<W>(writer: &mut W, byte: u8) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    writer.write_all(&[
        b'\\',
        b'0' + (byte >> 6),
        b'0' + ((byte >> 3) & 0o7),
        b'0' + (byte & 0o7),
    ])
}

fn write_unibyte_string<W>(writer: &mut W, bytes: &[u8]) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    writer.write_all(b"\"")?;
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if (0x20..0x7f).contains(&byte) && byte != b'"' && byte != b'\\' {
            continue;
        }
        writer.write_all(&bytes[start..i])?;
        match byte {
            b'"' => writer.write_all(b"\\\"")?,
            b'\\' => writer.write_all(b"\\\\")?,
            _ => write_octal_escape(writer, byte)?,
        }
        start = i + 1;
    }
    writer.write_all(&bytes[start..])?;
    writer.write_all(b"\"")
}

fn write_char_literal<W>(writer: &mut W, code: u32) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    let mnemonic: Option<&[u8]> = match code {
        0x07 => Some(b"\\a"),
        0x08 => Some(b"\\b"),
        0x09 => Some(b"\\t"),
        0x0a => Some(b"\\n"),
        0x0b => Some(b"\\v"),
        0x0c => Some(b"\\f"),
        0x0d => Some(b"\\r"),
        0x1b => Some(b"\\e"),
        // `\^\` would start another escape.
        0x1c => Some(b"\\^\\\\"),
        0x20 => Some(b"\\s"),
        0x7f => Some(b"\\d"),
        _ => None,
    };
    writer.write_all(b"?")?;
    if let Some(mnemonic) = mnemonic {
        return writer.write_all(mnemonic);
    }
    match char::from_u32(code) {
        Some(_) if code < 0x20 => writer.write_all(&[b'\\', b'^', code as u8 | 0x40]),
        Some(c) if c.is_control() => write!(writer, "\\x{:x}", code),
        Some(c) => {
            if c == '\\' || needs_escape_in_char_literal(c) {
                writer.write_all(b"\\")?;
            }
            write!(writer, "{}", c)
        }
        None => write!(writer, "\\x{:x}", code),
    }
}

fn write_escaped_symbol<W>(writer: &mut W, name: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    if name.is_empty() {
        return writer.write_all(b"##");
    }
    let looks_like_number = parse::parse_decimal(name).is_some();
    let mut start = 0;
    for (i, c) in name.char_indices() {
        let escape = c == '\\'
            || parse::is_delimiter(c)
            || (i == 0 && (looks_like_number || c == '?' || c == '.'));
        if !escape {
            continue;
        }
        writer.write_all(name[start..i].as_bytes())?;
        writer.write_all(b"\\")?;
        start = i;
    }
    writer.write_all(name[start..].as_bytes())
}

fn write_number_in_radix<W>(writer: &mut W, value: &Number, radix: u32) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    struct Write<'a, W: io::Write + ?Sized> {
        writer: &'a mut W,
        radix: u32,
    }

    impl<'a, W: io::Write + ?Sized> Write<'a, W> {
        fn write_prefixed(self, digits: &str) -> io::Result<()> {
            match self.radix {
                2 => self.writer.write_all(b"#b")?,
                8 => self.writer.write_all(b"#o")?,
                16 => self.writer.write_all(b"#x")?,
                radix => write!(self.writer, "#{}r", radix)?,
            }
            self.writer.write_all(digits.as_bytes())
        }
    }

    impl<'a, W: io::Write + ?Sized> number::Visitor for Write<'a, W> {
        type Value = ();
        type Error = io::Error;

        fn visit_fixnum(self, n: i64) -> io::Result<()> {
            if self.radix == 10 {
                self.writer
                    .write_all(itoa::Buffer::new().format(n).as_bytes())
            } else {
                let digits = BigInt::from(n).to_str_radix(self.radix);
                self.write_prefixed(&digits)
            }
        }
        fn visit_bignum(self, n: &BigInt) -> io::Result<()> {
            if self.radix == 10 {
                write!(self.writer, "{}", n)
            } else {
                let digits = n.to_str_radix(self.radix);
                self.write_prefixed(&digits)
            }
        }
        fn visit_f64(self, n: f64) -> io::Result<()> {
            self.writer.write_all(number::format_float(n).as_bytes())
        }
    }

    value.visit(Write { writer, radix })
}

/// Print `value` as text into the IO stream, using the default printer
/// options.
#[inline]
pub fn to_writer<W: io::Write>(writer: W, heap: &Heap, value: &Value) -> io::Result<()> {
    let mut printer = Printer::new(writer);
    printer.print(heap, value)?;
    Ok(())
}

/// Print `value` as text into the IO stream.
#[inline]
pub fn to_writer_custom<W: io::Write>(
    writer: W,
    heap: &Heap,
    value: &Value,
    options: Options,
) -> io::Result<()> {
    let mut printer = Printer::with_options(writer, options);
    printer.print(heap, value)?;
    Ok(())
}

/// Print `value` into a byte vector, using the default printer options.
#[inline]
pub fn to_vec(heap: &Heap, value: &Value) -> io::Result<Vec<u8>> {
    let mut writer = Vec::with_capacity(128);
    to_writer(&mut writer, heap, value)?;
    Ok(writer)
}

/// Print `value` into a byte vector.
#[inline]
pub fn to_vec_custom(heap: &Heap, value: &Value, options: Options) -> io::Result<Vec<u8>> {
    let mut writer = Vec::with_capacity(128);
    to_writer_custom(&mut writer, heap, value, options)?;
    Ok(writer)
}

/// Print `value` into a string, using the default printer options.
#[inline]
pub fn to_string(heap: &Heap, value: &Value) -> io::Result<String> {
    into_string(to_vec(heap, value)?)
}

/// Print `value` into a string.
///
/// Unibyte strings printed without escaping may produce bytes that are not
/// UTF-8, which is reported as an error.
#[inline]
pub fn to_string_custom(heap: &Heap, value: &Value, options: Options) -> io::Result<String> {
    into_string(to_vec_custom(heap, value, options)?)
}

fn into_string(bytes: Vec<u8>) -> io::Result<String> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests;
