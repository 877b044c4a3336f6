use std::io;

use super::error::{Error, Result};
use super::iter::LineColIterator;

/// The byte sources a [`Parser`](super::Parser) reads from.
///
/// Decoding and pushback happen in the parser; a source only hands out
/// bytes and knows where it is. Strings and slices compute line and column
/// on demand, when an error is reported; streams count as they go.
///
/// This trait is sealed and cannot be implemented for types outside of
/// `elexpr`.
pub trait Read<'de>: private::Sealed {
    #[doc(hidden)]
    fn next(&mut self) -> Result<Option<u8>>;

    /// Line and column of the byte last returned by `next`.
    #[doc(hidden)]
    fn position(&self) -> Position;

    /// Line and column of the byte `next` would return.
    #[doc(hidden)]
    fn peek_position(&self) -> Position;

    /// Bytes consumed so far.
    #[doc(hidden)]
    fn byte_offset(&self) -> usize;
}

pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Input source that reads from a std::io input stream.
pub struct IoRead<R>
where
    R: io::Read,
{
    iter: LineColIterator<io::Bytes<R>>,
}

/// Input source that reads from a slice of bytes.
pub struct SliceRead<'a> {
    slice: &'a [u8],
    // Index of the next byte `next` returns.
    index: usize,
}

/// Input source that reads from a UTF-8 string.
pub struct StrRead<'a> {
    delegate: SliceRead<'a>,
}

mod private {
    pub trait Sealed {}
}

impl<R> IoRead<R>
where
    R: io::Read,
{
    /// Create an input source to read from a std::io input stream.
    pub fn new(reader: R) -> Self {
        IoRead {
            iter: LineColIterator::new(reader.bytes()),
        }
    }
}

impl<R> private::Sealed for IoRead<R> where R: io::Read {}

impl<'de, R> Read<'de> for IoRead<R>
where
    R: io::Read,
{
    #[inline]
    fn next(&mut self) -> Result<Option<u8>> {
        self.iter.next().transpose().map_err(Error::io)
    }

    fn position(&self) -> Position {
        Position {
            line: self.iter.line(),
            column: self.iter.col(),
        }
    }

    // Nothing is read ahead, so the stream is already there.
    fn peek_position(&self) -> Position {
        self.position()
    }

    fn byte_offset(&self) -> usize {
        self.iter.byte_offset()
    }
}

impl<'a> SliceRead<'a> {
    /// Create an input source to read from a slice of bytes.
    pub fn new(slice: &'a [u8]) -> Self {
        SliceRead { slice, index: 0 }
    }

    fn position_of_index(&self, end: usize) -> Position {
        self.slice[..end]
            .iter()
            .fold(Position { line: 1, column: 0 }, |position, byte| match byte {
                b'\n' => Position {
                    line: position.line + 1,
                    column: 0,
                },
                _ => Position {
                    column: position.column + 1,
                    ..position
                },
            })
    }
}

impl<'a> private::Sealed for SliceRead<'a> {}

impl<'a> Read<'a> for SliceRead<'a> {
    #[inline]
    fn next(&mut self) -> Result<Option<u8>> {
        let byte = self.slice.get(self.index).copied();
        if byte.is_some() {
            self.index += 1;
        }
        Ok(byte)
    }

    fn position(&self) -> Position {
        self.position_of_index(self.index)
    }

    fn peek_position(&self) -> Position {
        self.position_of_index((self.index + 1).min(self.slice.len()))
    }

    fn byte_offset(&self) -> usize {
        self.index
    }
}

impl<'a> StrRead<'a> {
    /// Create an input source to read from a UTF-8 string.
    pub fn new(s: &'a str) -> Self {
        StrRead {
            delegate: SliceRead::new(s.as_bytes()),
        }
    }
}

impl<'a> private::Sealed for StrRead<'a> {}

impl<'a> Read<'a> for StrRead<'a> {
    #[inline]
    fn next(&mut self) -> Result<Option<u8>> {
        self.delegate.next()
    }

    fn position(&self) -> Position {
        self.delegate.position()
    }

    fn peek_position(&self) -> Position {
        self.delegate.peek_position()
    }

    fn byte_offset(&self) -> usize {
        self.delegate.byte_offset()
    }
}
