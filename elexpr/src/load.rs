//! Reading a whole source unit, form by form.
//!
//! Loading reads every top-level form of a file in order and hands each to
//! an evaluator callback; evaluation itself is up to the caller. After the
//! last form, character literals that lacked a needed backslash are
//! reported as a warning.
//!
//! ```
//! use elexpr::{load, Heap};
//!
//! let mut heap = Heap::new();
//! let mut forms = Vec::new();
//! let report = load::load_str(&mut heap, "init.el", "(setq a ?() (setq b 2)", |_, form| {
//!     forms.push(form);
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(report.forms(), 2);
//! assert_eq!(report.warnings().len(), 1);
//! ```

use std::error;
use std::fmt::{self, Display};
use std::io;

use crate::heap::Heap;
use crate::parse::{self, Parser, Read};
use crate::value::Value;

/// The unit a [`Loader`] is asked for before character names are first
/// looked up.
pub const CHARACTER_NAMES_UNIT: &str = "ucs-names";

/// Provides source units the reader depends on.
///
/// Any `FnMut(&str) -> Result<(), LoadError>` closure is a loader.
pub trait Loader {
    /// Make the unit called `unit` available, loading it if that has not
    /// happened yet.
    fn load(&mut self, unit: &str) -> Result<(), LoadError>;
}

impl<F> Loader for F
where
    F: FnMut(&str) -> Result<(), LoadError>,
{
    fn load(&mut self, unit: &str) -> Result<(), LoadError> {
        self(unit)
    }
}

/// Failure to load a source unit.
#[derive(Debug)]
pub enum LoadError {
    /// A form could not be read.
    Read(parse::Error),
    /// The unit could not be found, or evaluating one of its forms failed.
    Failed(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Read(err) => Display::fmt(err, f),
            LoadError::Failed(message) => f.write_str(message),
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Read(err) => Some(err),
            LoadError::Failed(_) => None,
        }
    }
}

impl From<parse::Error> for LoadError {
    fn from(err: parse::Error) -> Self {
        LoadError::Read(err)
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    forms: usize,
    warnings: Vec<String>,
}

impl LoadReport {
    /// Number of top-level forms read and evaluated.
    pub fn forms(&self) -> usize {
        self.forms
    }

    /// Warnings issued while loading.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Read every form from `parser` and pass it to `eval`.
///
/// `file_name` is used in warnings. Loading stops at the first read or
/// evaluation error.
pub fn load<'de, R, F>(
    heap: &mut Heap,
    file_name: &str,
    parser: &mut Parser<R>,
    mut eval: F,
) -> Result<LoadReport, LoadError>
where
    R: Read<'de>,
    F: FnMut(&mut Heap, Value) -> Result<(), LoadError>,
{
    let mut report = LoadReport::default();
    while let Some(form) = parser.parse(heap)? {
        log::trace!("{}: evaluating form {}", file_name, report.forms + 1);
        eval(heap, form)?;
        report.forms += 1;
    }

    let unescaped: Vec<char> = parser.unescaped_character_literals().collect();
    if !unescaped.is_empty() {
        let message = unescaped_warning(file_name, &unescaped);
        log::warn!("{}", message);
        report.warnings.push(message);
    }
    Ok(report)
}

/// Load the forms in `source`. `#$` reads as `file_name`.
pub fn load_str<F>(
    heap: &mut Heap,
    file_name: &str,
    source: &str,
    eval: F,
) -> Result<LoadReport, LoadError>
where
    F: FnMut(&mut Heap, Value) -> Result<(), LoadError>,
{
    let options = parse::Options::new().with_load_file_name(file_name);
    let mut parser = Parser::from_str_custom(source, options);
    load(heap, file_name, &mut parser, eval)
}

/// Load the forms read from `reader`. `#$` reads as `file_name`.
pub fn load_reader<R, F>(
    heap: &mut Heap,
    file_name: &str,
    reader: R,
    eval: F,
) -> Result<LoadReport, LoadError>
where
    R: io::Read,
    F: FnMut(&mut Heap, Value) -> Result<(), LoadError>,
{
    let options = parse::Options::new().with_load_file_name(file_name);
    let mut parser = Parser::from_reader_custom(reader, options);
    load(heap, file_name, &mut parser, eval)
}

fn unescaped_warning(file_name: &str, chars: &[char]) -> String {
    let found: Vec<String> = chars.iter().map(|c| format!("`?{}'", c)).collect();
    let expected: Vec<String> = chars.iter().map(|c| format!("`?\\{}'", c)).collect();
    format!(
        "Loading `{}': unescaped character literals {} detected, {} expected!",
        file_name,
        found.join(", "),
        expected.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_text() {
        assert_eq!(
            unescaped_warning("foo.el", &['(', ';']),
            "Loading `foo.el': unescaped character literals `?(', `?;' detected, \
             `?\\(', `?\\;' expected!"
        );
    }

    #[test]
    fn closures_are_loaders() {
        let mut seen = Vec::new();
        {
            let mut loader = |unit: &str| -> Result<(), LoadError> {
                seen.push(unit.to_owned());
                Ok(())
            };
            loader.load("subr").unwrap();
        }
        assert_eq!(seen, vec!["subr".to_owned()]);
    }
}
