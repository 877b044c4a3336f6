//! When reading S-expressions goes wrong.

use std::error;
use std::fmt::{self, Debug, Display};
use std::io;
use std::result;

/// This type represents the possible errors when reading Emacs Lisp text.
pub struct Error {
    /// This `Box` allows us to keep the size of `Error` as small as possible. A
    /// larger `Error` type was substantially slower due to all the functions
    /// that pass around `Result<T, Error>`.
    err: Box<ErrorImpl>,
}

/// Alias for a `Result` with the error type `elexpr::parse::Error`.
pub type Result<T> = result::Result<T, Error>;

/// Location of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    line: usize,
    column: usize,
}

impl Location {
    /// One-based line number at which the error was detected.
    ///
    /// Characters in the first line of the input (before the first newline
    /// character) are in line 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// One-based column number at which the error was detected.
    ///
    /// The first character in the input and any characters immediately
    /// following a newline character are in column 1.
    ///
    /// Note that errors may occur in column 0, for example if a read from an IO
    /// stream fails immediately following a previously read newline character.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Error {
    /// Location of the error in the input stream.
    pub fn location(&self) -> Option<Location> {
        self.err.location
    }

    /// Categorizes the cause of this error.
    ///
    /// - `Category::Io` - failure to read bytes from an IO stream
    /// - `Category::Syntax` - invalid read syntax
    /// - `Category::Eof` - end of file during parsing
    pub fn classify(&self) -> Category {
        self.err.code.category()
    }

    /// Returns true if this error was caused by a failure to read bytes on an
    /// IO stream.
    pub fn is_io(&self) -> bool {
        self.classify() == Category::Io
    }

    /// Returns true if this error was caused by invalid read syntax.
    pub fn is_syntax(&self) -> bool {
        self.classify() == Category::Syntax
    }

    /// Returns true if this error was caused by the input ending in the middle
    /// of a form.
    ///
    /// This is distinct from a clean end of input between forms, which
    /// [`Parser::parse`](super::Parser::parse) reports as `Ok(None)`.
    pub fn is_eof(&self) -> bool {
        self.classify() == Category::Eof
    }

    /// The description of the problem, without location information.
    ///
    /// For syntax errors this names the offending text, e.g. `integer, radix
    /// 16` or the character name that failed to resolve.
    pub fn message(&self) -> String {
        self.err.code.to_string()
    }
}

/// Categorizes the cause of an `elexpr::parse::Error`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Category {
    /// The error was caused by a failure to read bytes from an input source.
    Io,

    /// The input is not valid Emacs Lisp read syntax.
    Syntax,

    /// The input ended inside a string, character literal, list or vector.
    Eof,
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Io => f.write_str("I/O error"),
            Category::Syntax => f.write_str("invalid read syntax"),
            Category::Eof => f.write_str("end of file during parsing"),
        }
    }
}

impl From<Error> for io::Error {
    /// Convert an `elexpr::parse::Error` into an `io::Error`.
    ///
    /// Syntax errors are turned into `InvalidData` IO errors. EOF errors are
    /// turned into `UnexpectedEof` IO errors.
    fn from(l: Error) -> Self {
        match l.classify() {
            Category::Io => match l.err.code {
                ErrorCode::Io(err) => err,
                _ => io::Error::new(io::ErrorKind::Other, l),
            },
            Category::Syntax => io::Error::new(io::ErrorKind::InvalidData, l),
            Category::Eof => io::Error::new(io::ErrorKind::UnexpectedEof, l),
        }
    }
}

impl Error {
    pub(crate) fn syntax(code: ErrorCode, line: usize, column: usize) -> Self {
        Error {
            err: Box::new(ErrorImpl {
                code,
                location: Some(Location { line, column }),
            }),
        }
    }

    pub(crate) fn io(error: io::Error) -> Self {
        Error {
            err: Box::new(ErrorImpl {
                code: ErrorCode::Io(error),
                location: None,
            }),
        }
    }
}

struct ErrorImpl {
    code: ErrorCode,
    location: Option<Location>,
}

#[derive(Debug)]
pub(crate) enum ErrorCode {
    /// Some IO error occurred while reading.
    Io(io::Error),

    /// EOF while parsing a list.
    EofWhileParsingList,

    /// EOF while parsing a vector.
    EofWhileParsingVector,

    /// EOF while parsing a string.
    EofWhileParsingString,

    /// EOF where a value was required.
    EofWhileParsingValue,

    /// EOF while parsing a character literal.
    EofWhileParsingCharacterConstant,

    /// `)` or `]` where no list or vector is open.
    UnexpectedCloser(char),

    /// Used a mismatching bracket to close a list or vector.
    MismatchedParenthesis,

    /// A `.` that is not inside a list, or that is misplaced in one.
    InvalidDot,

    /// A character literal not followed by a delimiter.
    InvalidCharacterConstant,

    /// Malformed backslash escape.
    InvalidEscape(String),

    /// A modifier escape other than meta or control in a string.
    InvalidModifierInString,

    /// A character code above the character range.
    CharacterOutOfRange(u32),

    /// A code that is not a Unicode scalar value where one is required.
    NonUnicodeCharacter(u32),

    /// `\N{}`.
    EmptyCharacterName,

    /// A `\N{...}` body that does not name a character.
    InvalidCharacterName(String),

    /// A string mixing raw bytes with non-ASCII characters.
    MixedUnibyteMultibyte,

    /// Input bytes that are not UTF-8.
    InvalidUtf8,

    /// A radix integer with a bad radix or no valid digits.
    InvalidRadixInteger(u32),

    /// An unknown or malformed `#` form; carries the text after `#`.
    InvalidHashSyntax(String),

    /// `#N=` for a label that already has a definition.
    DuplicateLabel(u64),

    /// `#N#` for a label that has no definition.
    UndefinedLabel(u64),

    /// `#N=#N#`.
    NonsensicalSelfReference,

    /// Malformed `#s(hash-table ...)`.
    InvalidHashTable(String),

    /// `#s()`.
    InvalidRecord,

    /// Malformed `#[...]`.
    InvalidByteCode(&'static str),

    /// Malformed `#&N"..."`.
    InvalidBoolVector,

    /// Malformed `#("..." ...)`.
    InvalidPropertizedString,

    /// The loader failed to provide a unit the reader needed.
    Load(String),

    /// Non-whitespace after the value.
    TrailingCharacters,

    /// Nesting deeper than the configured limit.
    RecursionLimitExceeded,
}

impl ErrorCode {
    fn category(&self) -> Category {
        match self {
            ErrorCode::Io(_) => Category::Io,
            ErrorCode::EofWhileParsingList
            | ErrorCode::EofWhileParsingString
            | ErrorCode::EofWhileParsingVector
            | ErrorCode::EofWhileParsingValue
            | ErrorCode::EofWhileParsingCharacterConstant => Category::Eof,
            _ => Category::Syntax,
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Io(err) => Display::fmt(err, f),
            ErrorCode::EofWhileParsingList => f.write_str("EOF while parsing a list"),
            ErrorCode::EofWhileParsingVector => f.write_str("EOF while parsing a vector"),
            ErrorCode::EofWhileParsingString => f.write_str("EOF while parsing a string"),
            ErrorCode::EofWhileParsingValue => f.write_str("EOF while parsing a value"),
            ErrorCode::EofWhileParsingCharacterConstant => {
                f.write_str("EOF while parsing a character constant")
            }
            ErrorCode::UnexpectedCloser(c) => write!(f, "{}", c),
            ErrorCode::MismatchedParenthesis => f.write_str("mismatched parenthesis"),
            ErrorCode::InvalidDot => f.write_str("."),
            ErrorCode::InvalidCharacterConstant => f.write_str("?"),
            ErrorCode::InvalidEscape(text) => write!(f, "invalid escape character syntax `{}'", text),
            ErrorCode::InvalidModifierInString => f.write_str("invalid modifier in string"),
            ErrorCode::CharacterOutOfRange(c) => write!(f, "character code {:#x} out of range", c),
            ErrorCode::NonUnicodeCharacter(c) => write!(f, "non-Unicode character: {:#x}", c),
            ErrorCode::EmptyCharacterName => f.write_str("empty character name"),
            ErrorCode::InvalidCharacterName(name) => {
                write!(f, "\\N{{{}}}", name)
            }
            ErrorCode::MixedUnibyteMultibyte => {
                f.write_str("string mixes raw bytes and non-ASCII characters")
            }
            ErrorCode::InvalidUtf8 => f.write_str("invalid UTF-8"),
            ErrorCode::InvalidRadixInteger(radix) => write!(f, "integer, radix {}", radix),
            ErrorCode::InvalidHashSyntax(text) => write!(f, "#{}", text),
            ErrorCode::DuplicateLabel(n) => write!(f, "#{}= label defined twice", n),
            ErrorCode::UndefinedLabel(n) => write!(f, "#{}#", n),
            ErrorCode::NonsensicalSelfReference => f.write_str("nonsensical self-reference"),
            ErrorCode::InvalidHashTable(reason) => write!(f, "#s(hash-table ...): {}", reason),
            ErrorCode::InvalidRecord => f.write_str("#s"),
            ErrorCode::InvalidByteCode(reason) => write!(f, "invalid byte-code object: {}", reason),
            ErrorCode::InvalidBoolVector => f.write_str("#&..."),
            ErrorCode::InvalidPropertizedString => f.write_str("#"),
            ErrorCode::Load(message) => Display::fmt(message, f),
            ErrorCode::TrailingCharacters => f.write_str("trailing characters"),
            ErrorCode::RecursionLimitExceeded => f.write_str("nesting too deep"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.err.code {
            ErrorCode::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.err, f)
    }
}

impl Display for ErrorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.category() {
            Category::Io => {}
            category => write!(f, "{}: ", category)?,
        }
        if let Some(loc) = self.location {
            write!(f, "{} at line {} column {}", self.code, loc.line, loc.column)
        } else {
            Display::fmt(&self.code, f)
        }
    }
}

// Remove two layers of verbosity from the debug representation. Humans often
// end up seeing this representation because it is what unwrap() shows.
impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = self.err.location {
            write!(
                f,
                "Error({:?}, line: {}, column: {})",
                self.err.code.to_string(),
                loc.line,
                loc.column,
            )
        } else {
            write!(f, "Error({:?})", self.err.code.to_string())
        }
    }
}
