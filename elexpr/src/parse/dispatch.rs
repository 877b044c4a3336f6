//! Everything introduced by `#`.

use super::error::{ErrorCode, Result};
use super::labels;
use super::number;
use super::read::Read;
use super::Parser;
use crate::cons;
use crate::hash_table::{HashTable, HashTest, Weakness};
use crate::heap::Heap;
use crate::symbol::Symbol;
use crate::value::Value;

impl<'de, R: Read<'de>> Parser<R> {
    // The `#` has been consumed. `#@` and `#!` never get here; they are
    // skipped along with whitespace.
    pub(super) fn parse_hash(&mut self, heap: &mut Heap) -> Result<Value> {
        let c = match self.next_char()? {
            Some(c) => c,
            None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
        };
        match c {
            '\'' => self.parse_quoted(heap, "function"),
            '(' => self.parse_propertized_string(heap),
            '[' => self.parse_byte_code(heap),
            '&' => self.parse_bool_vector(),
            's' => self.parse_record(heap),
            ':' => {
                self.scan_token()?;
                Ok(Value::Symbol(Symbol::uninterned(self.scratch.as_str())))
            }
            '#' => Ok(heap.symbol("")),
            '_' => {
                self.scan_token()?;
                Ok(heap.symbol(&self.scratch))
            }
            '$' => Ok(match self.options.load_file_name() {
                Some(name) => Value::from(name),
                None => Value::Nil,
            }),
            'b' | 'B' => self.parse_radix_integer(2),
            'o' | 'O' => self.parse_radix_integer(8),
            'x' | 'X' => self.parse_radix_integer(16),
            '0'..='9' => self.parse_label_or_radix(c, heap),
            other => Err(self.error(ErrorCode::InvalidHashSyntax(other.to_string()))),
        }
    }

    /// The digits after `#b`, `#o`, `#x` or `#Nr`. All alphanumeric
    /// characters are taken, so that a bad digit is reported instead of
    /// ending the number.
    fn parse_radix_integer(&mut self, radix: u32) -> Result<Value> {
        self.scratch.clear();
        if let Some(sign @ ('+' | '-')) = self.peek_char()? {
            self.eat_char();
            self.scratch.push(sign);
        }
        while let Some(c) = self.peek_char()? {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            self.eat_char();
            self.scratch.push(c);
        }
        match number::parse_radix(&self.scratch, radix) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(self.error(ErrorCode::InvalidRadixInteger(radix))),
        }
    }

    // `#N=`, `#N#` or `#Nr`; `first` is the first digit of N.
    fn parse_label_or_radix(&mut self, first: char, heap: &mut Heap) -> Result<Value> {
        let mut text = String::new();
        let mut n: u64 = 0;
        let mut c = first;
        loop {
            if let Some(digit) = c.to_digit(10) {
                text.push(c);
                n = match n.checked_mul(10).and_then(|n| n.checked_add(u64::from(digit))) {
                    Some(n) => n,
                    None => return Err(self.error(ErrorCode::InvalidHashSyntax(text))),
                };
            } else {
                match c {
                    'r' | 'R' => {
                        return match u32::try_from(n) {
                            Ok(radix @ 2..=36) => self.parse_radix_integer(radix),
                            _ => Err(self.error(ErrorCode::InvalidRadixInteger(
                                u32::try_from(n).unwrap_or(u32::MAX),
                            ))),
                        }
                    }
                    '=' if self.options.read_circle() => return self.parse_labeled(n, heap),
                    '#' if self.options.read_circle() => {
                        return match self.labels.resolve(n) {
                            Some(value) => Ok(value),
                            None => Err(self.error(ErrorCode::UndefinedLabel(n))),
                        }
                    }
                    other => {
                        text.push(other);
                        return Err(self.error(ErrorCode::InvalidHashSyntax(text)));
                    }
                }
            }
            c = match self.next_char()? {
                Some(c) => c,
                None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
            };
        }
    }

    fn parse_labeled(&mut self, label: u64, heap: &mut Heap) -> Result<Value> {
        let placeholder = match self.labels.define(label) {
            Ok(placeholder) => placeholder,
            Err(code) => return Err(self.error(code)),
        };
        let value = self.parse_required(heap)?;
        if value == Value::Placeholder(placeholder) {
            return Err(self.error(ErrorCode::NonsensicalSelfReference));
        }
        if self.labels.complete(label, value.clone()) {
            log::debug!("resolving references to #{}=", label);
            labels::substitute(heap, &value, placeholder);
        }
        Ok(value)
    }

    // `#s(`: a record or a hash table.
    fn parse_record(&mut self, heap: &mut Heap) -> Result<Value> {
        if self.next_char()? != Some('(') {
            return Err(self.error(ErrorCode::InvalidHashSyntax("s".into())));
        }
        let items = self.parse_sequence(heap, ')')?;
        match items.split_first() {
            None => Err(self.error(ErrorCode::InvalidRecord)),
            Some((head, plist)) if *head == heap.symbol("hash-table") => {
                self.build_hash_table(heap, plist)
            }
            Some(_) => Ok(heap.record(items)),
        }
    }

    fn hash_table_error(&self, reason: &str) -> super::Error {
        self.error(ErrorCode::InvalidHashTable(reason.into()))
    }

    fn build_hash_table(&mut self, heap: &mut Heap, plist: &[Value]) -> Result<Value> {
        if plist.len() % 2 != 0 {
            return Err(self.hash_table_error("odd number of properties"));
        }
        let mut test = None;
        let mut weakness = None;
        let mut size = None;
        let mut data = None;
        // Like `plist-get`, the first occurrence of a property wins and
        // unknown properties (`rehash-size` and friends) are ignored.
        for pair in plist.chunks(2) {
            let slot = match pair[0].as_name() {
                Some("test") => &mut test,
                Some("weakness") => &mut weakness,
                Some("size") => &mut size,
                Some("data") => &mut data,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(&pair[1]);
            }
        }

        let test = match test {
            None | Some(Value::Nil) => HashTest::default(),
            Some(value) => match value.as_name().and_then(HashTest::from_name) {
                Some(test) => test,
                None => return Err(self.hash_table_error("invalid test")),
            },
        };
        let weakness = match weakness {
            None | Some(Value::Nil) => None,
            Some(value) => match value.as_name().and_then(Weakness::from_name) {
                Some(weakness) => Some(weakness),
                None => return Err(self.hash_table_error("invalid weakness")),
            },
        };
        match size {
            None | Some(Value::Nil) => {}
            Some(value) => {
                if !value.as_i64().map_or(false, |n| n >= 0) {
                    return Err(self.hash_table_error("size is not a non-negative integer"));
                }
            }
        }
        let data = match data {
            None => Vec::new(),
            Some(value) => match cons::proper_list(heap, value) {
                Some(items) => items,
                None => return Err(self.hash_table_error("data is not a list")),
            },
        };
        if data.len() % 2 != 0 {
            return Err(self.hash_table_error("data length is odd"));
        }

        let mut table = HashTable::new(test).with_weakness(weakness);
        for entry in data.chunks(2) {
            if labels::contains_placeholder(heap, &entry[0]) {
                return Err(self.hash_table_error("key refers to an unfinished labeled object"));
            }
            table.insert(heap, entry[0].clone(), entry[1].clone());
        }
        Ok(heap.hash_table(table))
    }

    // `#[ARGS CODE CONSTANTS DEPTH [DOC [INTERACTIVE]]]`
    fn parse_byte_code(&mut self, heap: &mut Heap) -> Result<Value> {
        let mut slots = self.parse_sequence(heap, ']')?;
        if slots.len() < 4 || slots.len() > 6 {
            return Err(self.error(ErrorCode::InvalidByteCode("wrong number of elements")));
        }
        if !(slots[0].is_list() || slots[0].is_fixnum()) {
            return Err(self.error(ErrorCode::InvalidByteCode("invalid argument list")));
        }
        match (&slots[1], &slots[2]) {
            (Value::String(_) | Value::Bytes(_), Value::Vector(_)) => {
                if !slots[3].as_i64().map_or(false, |n| n >= 0) {
                    return Err(self.error(ErrorCode::InvalidByteCode("invalid stack depth")));
                }
            }
            (Value::Cons(_), Value::Cons(_) | Value::Nil) => {}
            _ => return Err(self.error(ErrorCode::InvalidByteCode("invalid code or constants"))),
        }
        // Byte code is always unibyte.
        if let Value::String(code) = &slots[1] {
            let bytes = Value::bytes(code.as_bytes());
            slots[1] = bytes;
        }
        Ok(heap.byte_code(slots))
    }

    // `#&N"BITS"`: the string holds N bits, least significant bit first.
    fn parse_bool_vector(&mut self) -> Result<Value> {
        let mut len: usize = 0;
        loop {
            match self.next_char()? {
                Some('"') => break,
                Some(c) => {
                    let digit = match c.to_digit(10) {
                        Some(digit) => digit as usize,
                        None => return Err(self.error(ErrorCode::InvalidBoolVector)),
                    };
                    len = match len.checked_mul(10).and_then(|n| n.checked_add(digit)) {
                        Some(len) => len,
                        None => return Err(self.error(ErrorCode::InvalidBoolVector)),
                    };
                }
                None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
            }
        }
        let bytes: Vec<u8> = match self.parse_string()? {
            Value::Bytes(bytes) => bytes.to_vec(),
            Value::String(text) => {
                let latin1: Option<Vec<u8>> =
                    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect();
                match latin1 {
                    Some(bytes) => bytes,
                    None => return Err(self.error(ErrorCode::InvalidBoolVector)),
                }
            }
            _ => return Err(self.error(ErrorCode::InvalidBoolVector)),
        };
        if bytes.len() != (len + 7) / 8 {
            return Err(self.error(ErrorCode::InvalidBoolVector));
        }
        let bits: Vec<bool> = (0..len)
            .map(|i| bytes[i / 8] & (1 << (i % 8)) != 0)
            .collect();
        Ok(Value::BoolVector(bits.into()))
    }

    // `#("STRING" START END PLIST ...)`. Text properties are checked and
    // dropped.
    fn parse_propertized_string(&mut self, heap: &mut Heap) -> Result<Value> {
        let items = self.parse_sequence(heap, ')')?;
        let (string, properties) = match items.split_first() {
            Some((string, properties)) if string.is_string() => (string, properties),
            _ => return Err(self.error(ErrorCode::InvalidPropertizedString)),
        };
        let well_formed = properties.len() % 3 == 0
            && properties
                .chunks(3)
                .all(|p| p[0].is_integer() && p[1].is_integer() && p[2].is_list());
        if !well_formed {
            return Err(self.error(ErrorCode::InvalidPropertizedString));
        }
        if !properties.is_empty() {
            log::trace!("dropping {} text property interval(s)", properties.len() / 3);
        }
        Ok(string.clone())
    }
}
