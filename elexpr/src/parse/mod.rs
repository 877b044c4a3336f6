//! Emacs Lisp reader and options.
//!
//! # Terminology
//!
//! The process of converting S-expressions from their textual representation to
//! values is referred to "reading" in Lisp. To avoid confusion with Rust's
//! `Read` trait, `elexpr` uses "parsing" instead.
//!
//! Values are allocated into a caller-provided [`Heap`], which also decides
//! which obarray symbols are interned into:
//!
//! ```
//! use elexpr::{parse, Heap};
//!
//! let mut heap = Heap::new();
//! let value = parse::from_str(&mut heap, "(a . #1=(b #1#))").unwrap();
//! let tail = heap.cdr(&value).cloned().unwrap();
//! let inner = heap.list_iter(&tail).nth(1).cloned().unwrap();
//! assert_eq!(inner, tail);
//! ```

use std::collections::BTreeSet;
use std::io;
use std::str;

use error::ErrorCode;
use labels::Labels;

use crate::heap::Heap;
use crate::load::Loader;
use crate::value::Value;

pub use read::{IoRead, Read, SliceRead, StrRead};

#[doc(inline)]
pub use error::{Category, Error, Location, Result};

/// Parser for Emacs Lisp read syntax.
///
/// This type, given a input source, provides the [`parse`] method,
/// which can be used to read a single form from the input source.
///
/// [`parse`]: Parser::parse
pub struct Parser<R> {
    read: R,
    /// Characters decoded from `read` but not yet consumed, most recent last.
    pushback: Vec<char>,
    scratch: String,
    remaining_depth: usize,
    options: Options,
    labels: Labels,
    unescaped: BTreeSet<char>,
    loader: Option<Box<dyn Loader>>,
    names_loaded: bool,
}

/// Various options to influence parser behavior.
#[derive(Debug, Clone)]
pub struct Options {
    max_depth: usize,
    load_file_name: Option<String>,
    read_circle: bool,
}

impl Options {
    /// Construct the default set of options.
    pub fn new() -> Self {
        Options {
            max_depth: 512,
            load_file_name: None,
            read_circle: true,
        }
    }

    /// Limit the nesting of lists, vectors and other compound forms.
    ///
    /// Input nested more deeply is rejected with an error. Each level of
    /// nesting takes a native stack frame, so the limit must fit the stack
    /// of the thread that reads; the default of 512 fits a default thread.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the file name `#$` reads as.
    pub fn with_load_file_name(mut self, name: impl Into<String>) -> Self {
        self.load_file_name = Some(name.into());
        self
    }

    /// Choose whether `#N=` and `#N#` are accepted.
    pub fn with_read_circle(mut self, enabled: bool) -> Self {
        self.read_circle = enabled;
        self
    }

    /// Query the nesting limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Query the file name `#$` reads as, if any.
    pub fn load_file_name(&self) -> Option<&str> {
        self.load_file_name.as_deref()
    }

    /// Query whether `#N=` and `#N#` are accepted.
    pub fn read_circle(&self) -> bool {
        self.read_circle
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::new()
    }
}

impl<'de, R> Parser<R>
where
    R: read::Read<'de>,
{
    /// Create a parser from one of the possible input sources.
    ///
    /// Typically it is more convenient to use one of these methods
    /// instead:
    ///
    ///   - `Parser::from_str`
    ///   - `Parser::from_slice`
    ///   - `Parser::from_reader`
    pub fn new(read: R) -> Self {
        Parser::with_options(read, Options::default())
    }

    /// Create a customized parser from one of the possible input sources.
    ///
    /// Typically it is more convenient to use one of these methods
    /// instead:
    ///
    ///   - `Parser::from_str_custom`
    ///   - `Parser::from_slice_custom`
    ///   - `Parser::from_reader_custom`
    pub fn with_options(read: R, options: Options) -> Self {
        Parser {
            read,
            pushback: Vec::with_capacity(2),
            scratch: String::with_capacity(128),
            remaining_depth: options.max_depth,
            options,
            labels: Labels::default(),
            unescaped: BTreeSet::new(),
            loader: None,
            names_loaded: false,
        }
    }

    /// Use `loader` to provide the character name table on demand.
    ///
    /// The loader is asked for [`CHARACTER_NAMES_UNIT`] before the first
    /// `\N{NAME}` escape is resolved by name.
    ///
    /// [`CHARACTER_NAMES_UNIT`]: crate::load::CHARACTER_NAMES_UNIT
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }
}

impl<R> Parser<read::IoRead<R>>
where
    R: io::Read,
{
    /// Creates a parser from an `io::Read`.
    pub fn from_reader(reader: R) -> Self {
        Parser::new(read::IoRead::new(reader))
    }

    /// Creates a parser from an `io::Read`.
    pub fn from_reader_custom(reader: R, options: Options) -> Self {
        Parser::with_options(read::IoRead::new(reader), options)
    }
}

impl<'a> Parser<read::SliceRead<'a>> {
    /// Creates a parser from a `&[u8]`.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Parser::new(read::SliceRead::new(bytes))
    }

    /// Creates a parser from a `&[u8]`.
    pub fn from_slice_custom(bytes: &'a [u8], options: Options) -> Self {
        Parser::with_options(read::SliceRead::new(bytes), options)
    }
}

impl<'a> Parser<read::StrRead<'a>> {
    /// Creates a parser from a `&str`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &'a str) -> Self {
        Parser::new(read::StrRead::new(s))
    }

    /// Creates a parser from a `&str`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str_custom(s: &'a str, options: Options) -> Self {
        Parser::with_options(read::StrRead::new(s), options)
    }
}

/// Whitespace between forms.
pub(crate) fn is_whitespace(c: char) -> bool {
    c <= ' ' || c == '\u{a0}'
}

/// Characters that end a symbol or number.
pub(crate) fn is_delimiter(c: char) -> bool {
    is_whitespace(c)
        || matches!(
            c,
            '"' | '\'' | ';' | '#' | '(' | ')' | '[' | ']' | '`' | ','
        )
}

fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

impl<'de, R: Read<'de>> Parser<R> {
    /// The `Parser::end` method should be called after a value has been fully
    /// parsed.  This allows the `Parser` to validate that the input stream is
    /// at the end or that it only has trailing whitespace and comments.
    pub fn end(&mut self) -> Result<()> {
        match self.parse_whitespace()? {
            Some(_) => Err(self.peek_error(ErrorCode::TrailingCharacters)),
            None => Ok(()),
        }
    }

    /// Offset in bytes from the start of the input to the first byte not
    /// consumed by the forms read so far.
    pub fn byte_offset(&self) -> usize {
        let pending: usize = self.pushback.iter().map(|c| c.len_utf8()).sum();
        self.read.byte_offset() - pending
    }

    /// Characters that were written as `?C` without the backslash they
    /// should have, in ascending order.
    ///
    /// These read fine, but are reported when loading a file.
    pub fn unescaped_character_literals(&self) -> impl Iterator<Item = char> + '_ {
        self.unescaped.iter().copied()
    }

    /// Parse a single form from the input source.
    ///
    /// This expects a form to be actually present, and returns an `Err` when
    /// called at the end of input. Use `Parser::parse` if you need to handle
    /// end of input gracefully.
    ///
    /// ```
    /// # use elexpr::{Heap, Parser, Value};
    /// let mut heap = Heap::new();
    /// let mut parser = Parser::from_str(r#"foo ("bar" . 3.5) ?a"#);
    /// assert_eq!(parser.parse_value(&mut heap).unwrap(), heap.symbol("foo"));
    /// assert!(parser.parse_value(&mut heap).unwrap().is_cons());
    /// assert_eq!(parser.parse_value(&mut heap).unwrap(), Value::Char(97));
    /// assert!(parser.end().is_ok());
    /// ```
    pub fn parse_value(&mut self, heap: &mut Heap) -> Result<Value> {
        match self.parse(heap)? {
            Some(value) => Ok(value),
            None => Err(self.peek_error(ErrorCode::EofWhileParsingValue)),
        }
    }

    /// Parse a single form from the input source.
    ///
    /// If the end of input is encountered before a form starts, this will
    /// return `Ok(None)`, otherwise, if parsing succeeded, `Ok(Some(Value))`.
    /// Labels defined with `#N=` are local to one call.
    ///
    /// ```
    /// # use elexpr::{Heap, Parser, Value};
    /// let mut heap = Heap::new();
    /// let mut parser = Parser::from_str("1 ; one\n 2");
    /// assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::from(1)));
    /// assert_eq!(parser.parse(&mut heap).unwrap(), Some(Value::from(2)));
    /// assert_eq!(parser.parse(&mut heap).unwrap(), None);
    /// ```
    pub fn parse(&mut self, heap: &mut Heap) -> Result<Option<Value>> {
        self.labels.clear();
        self.parse_form(heap)
    }

    fn decode_char(&mut self) -> Result<Option<char>> {
        let first = match self.read.next()? {
            Some(b) => b,
            None => return Ok(None),
        };
        let width = utf8_width(first);
        if width == 1 {
            return Ok(Some(char::from(first)));
        }
        if width == 0 {
            return Err(self.error(ErrorCode::InvalidUtf8));
        }
        let mut buf = [first, 0, 0, 0];
        for slot in &mut buf[1..width] {
            match self.read.next()? {
                Some(b) => *slot = b,
                None => return Err(self.error(ErrorCode::InvalidUtf8)),
            }
        }
        match str::from_utf8(&buf[..width]).ok().and_then(|s| s.chars().next()) {
            Some(c) => Ok(Some(c)),
            None => Err(self.error(ErrorCode::InvalidUtf8)),
        }
    }

    fn peek_char(&mut self) -> Result<Option<char>> {
        if let Some(&c) = self.pushback.last() {
            return Ok(Some(c));
        }
        let next = self.decode_char()?;
        if let Some(c) = next {
            self.pushback.push(c);
        }
        Ok(next)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        match self.pushback.pop() {
            Some(c) => Ok(Some(c)),
            None => self.decode_char(),
        }
    }

    /// Only valid after peek_char() returned a character.
    fn eat_char(&mut self) {
        self.pushback.pop();
    }

    fn unread(&mut self, c: char) {
        self.pushback.push(c);
    }

    /// Error caused by a character from next_char().
    fn error(&self, reason: ErrorCode) -> Error {
        let pos = self.read.position();
        Error::syntax(reason, pos.line, pos.column)
    }

    /// Error caused by a character from peek_char().
    fn peek_error(&self, reason: ErrorCode) -> Error {
        let pos = if self.pushback.is_empty() {
            self.read.peek_position()
        } else {
            self.read.position()
        };
        Error::syntax(reason, pos.line, pos.column)
    }

    /// Returns the first character that is not whitespace or part of a
    /// comment without consuming it, or `None` if EOF is encountered.
    fn parse_whitespace(&mut self) -> Result<Option<char>> {
        loop {
            match self.peek_char()? {
                Some(c) if is_whitespace(c) => self.eat_char(),
                Some(';') => {
                    self.eat_char();
                    self.skip_line()?;
                }
                Some('#') => {
                    self.eat_char();
                    match self.peek_char()? {
                        Some('@') => {
                            self.eat_char();
                            self.skip_lazy()?;
                        }
                        Some('!') => {
                            self.eat_char();
                            self.skip_line()?;
                        }
                        _ => {
                            self.unread('#');
                            return Ok(Some('#'));
                        }
                    }
                }
                other => return Ok(other),
            }
        }
    }

    // Comments need not be UTF-8, so skip them bytewise.
    fn skip_line(&mut self) -> Result<()> {
        while let Some(c) = self.pushback.pop() {
            if c == '\n' {
                return Ok(());
            }
        }
        while let Some(b) = self.read.next()? {
            if b == b'\n' {
                break;
            }
        }
        Ok(())
    }

    /// `#@N` skips the N bytes following the digits, the first of which is
    /// the character ending the digits. `#@00` skips to the end of input.
    fn skip_lazy(&mut self) -> Result<()> {
        let mut count: usize = 0;
        let mut digits = 0;
        loop {
            match self.next_char()? {
                Some(c @ '0'..='9') => {
                    let digit = c as usize - '0' as usize;
                    count = count.saturating_mul(10).saturating_add(digit);
                    digits += 1;
                    if digits == 2 && count == 0 {
                        self.pushback.clear();
                        while self.read.next()?.is_some() {}
                        return Ok(());
                    }
                }
                Some(c) => {
                    if count > 0 {
                        count -= 1;
                    } else {
                        self.unread(c);
                    }
                    break;
                }
                None => return Ok(()),
            }
        }
        for _ in 0..count {
            if self.read.next()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn parse_form(&mut self, heap: &mut Heap) -> Result<Option<Value>> {
        let c = match self.parse_whitespace()? {
            Some(c) => c,
            None => return Ok(None),
        };
        if self.remaining_depth == 0 {
            return Err(self.peek_error(ErrorCode::RecursionLimitExceeded));
        }
        self.remaining_depth -= 1;
        let value = self.parse_form_at(c, heap);
        self.remaining_depth += 1;
        value.map(Some)
    }

    /// Parse a form that must be present.
    fn parse_required(&mut self, heap: &mut Heap) -> Result<Value> {
        match self.parse_form(heap)? {
            Some(value) => Ok(value),
            None => Err(self.peek_error(ErrorCode::EofWhileParsingValue)),
        }
    }

    // `c` has been peeked.
    fn parse_form_at(&mut self, c: char, heap: &mut Heap) -> Result<Value> {
        self.eat_char();
        match c {
            '(' => self.parse_list(heap),
            '[' => {
                let items = self.parse_sequence(heap, ']')?;
                Ok(heap.vector(items))
            }
            ')' | ']' => Err(self.error(ErrorCode::UnexpectedCloser(c))),
            '"' => self.parse_string(),
            '?' => self.parse_char_literal(),
            '\'' => self.parse_quoted(heap, "quote"),
            '`' => self.parse_quoted(heap, "`"),
            ',' => {
                if self.peek_char()? == Some('@') {
                    self.eat_char();
                    self.parse_quoted(heap, ",@")
                } else {
                    self.parse_quoted(heap, ",")
                }
            }
            '#' => self.parse_hash(heap),
            '.' => match self.peek_char()? {
                Some(next) if !is_delimiter(next) => {
                    self.unread('.');
                    self.parse_symbol_or_number(heap)
                }
                _ => Err(self.error(ErrorCode::InvalidDot)),
            },
            _ => {
                self.unread(c);
                self.parse_symbol_or_number(heap)
            }
        }
    }

    fn parse_quoted(&mut self, heap: &mut Heap, name: &str) -> Result<Value> {
        let form = self.parse_required(heap)?;
        let head = heap.symbol(name);
        Ok(heap.list(vec![head, form]))
    }

    // The opening parenthesis has been consumed.
    fn parse_list(&mut self, heap: &mut Heap) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.parse_whitespace()? {
                None => return Err(self.peek_error(ErrorCode::EofWhileParsingList)),
                Some(')') => {
                    self.eat_char();
                    return Ok(heap.list(items));
                }
                Some(']') => return Err(self.peek_error(ErrorCode::MismatchedParenthesis)),
                Some('.') => {
                    self.eat_char();
                    match self.peek_char()? {
                        Some(next) if !is_delimiter(next) => {
                            self.unread('.');
                            items.push(self.parse_required(heap)?);
                        }
                        _ => return self.parse_dotted_tail(heap, items),
                    }
                }
                Some(_) => items.push(self.parse_required(heap)?),
            }
        }
    }

    // A `.` followed by a delimiter has been consumed.
    fn parse_dotted_tail(&mut self, heap: &mut Heap, items: Vec<Value>) -> Result<Value> {
        if items.is_empty() {
            return Err(self.error(ErrorCode::InvalidDot));
        }
        let tail = match self.parse_whitespace()? {
            None => return Err(self.peek_error(ErrorCode::EofWhileParsingList)),
            Some(')') | Some(']') => return Err(self.peek_error(ErrorCode::InvalidDot)),
            Some(_) => self.parse_required(heap)?,
        };
        match self.parse_whitespace()? {
            None => Err(self.peek_error(ErrorCode::EofWhileParsingList)),
            Some(')') => {
                self.eat_char();
                Ok(heap.list_with_tail(items, tail))
            }
            Some(_) => Err(self.peek_error(ErrorCode::InvalidDot)),
        }
    }

    /// Read forms up to `closer`, which is `)` or `]`.
    fn parse_sequence(&mut self, heap: &mut Heap, closer: char) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            match self.parse_whitespace()? {
                None if closer == ']' => {
                    return Err(self.peek_error(ErrorCode::EofWhileParsingVector))
                }
                None => return Err(self.peek_error(ErrorCode::EofWhileParsingList)),
                Some(c) if c == closer => {
                    self.eat_char();
                    return Ok(items);
                }
                Some(')') | Some(']') => {
                    return Err(self.peek_error(ErrorCode::MismatchedParenthesis))
                }
                Some(_) => items.push(self.parse_required(heap)?),
            }
        }
    }

    /// Collect a symbol or number token into the scratch buffer. Returns
    /// true if any character was escaped with a backslash.
    fn scan_token(&mut self) -> Result<bool> {
        self.scratch.clear();
        let mut escaped = false;
        while let Some(c) = self.peek_char()? {
            if is_delimiter(c) {
                break;
            }
            self.eat_char();
            if c == '\\' {
                match self.next_char()? {
                    Some(c) => {
                        escaped = true;
                        self.scratch.push(c);
                    }
                    None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
                }
            } else {
                self.scratch.push(c);
            }
        }
        Ok(escaped)
    }

    fn parse_symbol_or_number(&mut self, heap: &mut Heap) -> Result<Value> {
        let escaped = self.scan_token()?;
        if !escaped {
            if let Some(n) = number::parse_decimal(&self.scratch) {
                return Ok(Value::Number(n));
            }
        }
        Ok(heap.symbol(&self.scratch))
    }
}

fn from_trait<'de, R>(heap: &mut Heap, read: R, options: Options) -> Result<Value>
where
    R: Read<'de>,
{
    let mut parser = Parser::with_options(read, options);
    let value = parser.parse_value(heap)?;
    parser.end()?;

    Ok(value)
}

/// Parse a value from an IO stream containing a single form.
///
/// The content of the IO stream is parsed directly from the stream
/// without being buffered in memory.
///
/// When reading from a source against which short reads are not efficient, such
/// as a [`File`], you will want to apply your own buffering, e.g. using
/// [`std::io::BufReader`].
///
/// ```
/// use std::error::Error;
/// use std::fs::File;
/// use std::io::BufReader;
/// use std::path::Path;
///
/// use elexpr::{parse, Heap, Value};
///
/// fn read_value_from_file<P: AsRef<Path>>(
///     heap: &mut Heap,
///     path: P,
/// ) -> Result<Value, Box<dyn Error>> {
///     let file = File::open(path.as_ref())?;
///     let reader = BufReader::new(file);
///     let options = parse::Options::new()
///         .with_load_file_name(path.as_ref().display().to_string());
///     Ok(parse::from_reader_custom(heap, reader, options)?)
/// }
///
/// fn main() {
/// # }
/// # fn fake_main() {
///     let mut heap = Heap::new();
///     let value = read_value_from_file(&mut heap, "test.el").unwrap();
///     println!("{:?}", value);
/// }
/// ```
///
/// [`File`]: std::fs::File
pub fn from_reader_custom(heap: &mut Heap, rdr: impl io::Read, options: Options) -> Result<Value> {
    from_trait(heap, read::IoRead::new(rdr), options)
}

/// Parse a value from an IO stream containing a single form, using the
/// default parser options.
///
/// See [`from_reader_custom`] for more information.
pub fn from_reader(heap: &mut Heap, rdr: impl io::Read) -> Result<Value> {
    from_reader_custom(heap, rdr, Options::default())
}

/// Parse a value from bytes representing a single form.
///
/// ```
/// # use elexpr::{parse, Heap};
/// let mut heap = Heap::new();
/// let value = parse::from_slice_custom(&mut heap, b"#1=(a . #1#)", parse::Options::new());
/// assert!(value.unwrap().is_cons());
/// ```
pub fn from_slice_custom(heap: &mut Heap, bytes: &[u8], options: Options) -> Result<Value> {
    from_trait(heap, read::SliceRead::new(bytes), options)
}

/// Parse a value from bytes representing a single form, using the default
/// parser options.
///
/// See [`from_slice_custom`] for more information.
pub fn from_slice(heap: &mut Heap, bytes: &[u8]) -> Result<Value> {
    from_slice_custom(heap, bytes, Options::default())
}

/// Parse a value from a string slice representing a single form.
///
/// ```
/// # use elexpr::{parse, Heap};
/// let mut heap = Heap::new();
/// let options = parse::Options::new().with_read_circle(false);
/// assert!(parse::from_str_custom(&mut heap, "#1=(a)", options).is_err());
/// ```
pub fn from_str_custom(heap: &mut Heap, s: &str, options: Options) -> Result<Value> {
    from_trait(heap, read::StrRead::new(s), options)
}

/// Parse a value from a string slice representing a single form, using the
/// default parser options.
///
/// See [`from_str_custom`] for more information.
pub fn from_str(heap: &mut Heap, s: &str) -> Result<Value> {
    from_str_custom(heap, s, Options::default())
}

/// Parse the first form in `s`, returning it together with the byte offset
/// just past its end. Anything after the form is left unread.
///
/// ```
/// # use elexpr::{parse, Heap, Value};
/// let mut heap = Heap::new();
/// let (value, end) = parse::read_from_str(&mut heap, "42 (rest)").unwrap();
/// assert_eq!((value, end), (Value::from(42), 2));
/// ```
pub fn read_from_str(heap: &mut Heap, s: &str) -> Result<(Value, usize)> {
    let mut parser = Parser::from_str(s);
    let value = parser.parse_value(heap)?;
    Ok((value, parser.byte_offset()))
}

mod dispatch;
mod error;
mod escape;
mod iter;
mod labels;
mod number;
mod read;

pub(crate) use escape::needs_escape_in_char_literal;
pub(crate) use number::parse_decimal;

#[cfg(test)]
mod tests;
