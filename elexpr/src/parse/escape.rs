//! Character and string literals, and the backslash escapes they share.

use std::rc::Rc;

use super::error::{ErrorCode, Result};
use super::read::Read;
use super::Parser;
use crate::load::CHARACTER_NAMES_UNIT;
use crate::number::Number;
use crate::value::{Value, MAX_CHAR};

/// Alt modifier bit of a character code.
pub const ALT: u32 = 1 << 22;
/// Super modifier bit of a character code.
pub const SUPER: u32 = 1 << 23;
/// Hyper modifier bit of a character code.
pub const HYPER: u32 = 1 << 24;
/// Shift modifier bit of a character code.
pub const SHIFT: u32 = 1 << 25;
/// Control modifier bit of a character code.
pub const CTRL: u32 = 1 << 26;
/// Meta modifier bit of a character code.
pub const META: u32 = 1 << 27;

const MODIFIER_MASK: u32 = ALT | SUPER | HYPER | SHIFT | CTRL | META;

// Raw bytes 0x80..=0xFF occupy the top of the character space.
const BYTE8_OFFSET: u32 = 0x3F_FF00;

const MAX_UNICODE_CHAR: u32 = 0x10_FFFF;
const CHARACTER_NAME_LENGTH_BOUND: usize = 200;

fn byte8_to_char(byte: u32) -> u32 {
    byte + BYTE8_OFFSET
}

fn char_byte8(c: u32) -> Option<u8> {
    if c >= BYTE8_OFFSET + 0x80 && c <= MAX_CHAR {
        Some((c - BYTE8_OFFSET) as u8)
    } else {
        None
    }
}

fn is_surrogate(c: u32) -> bool {
    (0xD800..=0xDFFF).contains(&c)
}

// Characters that end a character literal.
fn ends_char_literal(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => {
            c <= ' '
                || matches!(
                    c,
                    '"' | '\'' | ';' | '(' | ')' | '[' | ']' | '#' | '?' | '`' | ',' | '.'
                )
        }
    }
}

/// Characters that historically could follow `?` without a backslash.
pub(crate) fn needs_escape_in_char_literal(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '"' | ';')
}

impl<'de, R: Read<'de>> Parser<R> {
    /// Read a character literal; the `?` has been consumed.
    pub(super) fn parse_char_literal(&mut self) -> Result<Value> {
        let c = match self.next_char()? {
            Some(c) => c,
            None => return Err(self.error(ErrorCode::EofWhileParsingCharacterConstant)),
        };
        // `? ` and `?\t` predate the escapes for them and stay valid.
        if c == ' ' || c == '\t' {
            return Ok(Value::Char(u32::from(c)));
        }
        if needs_escape_in_char_literal(c) {
            self.unescaped.insert(c);
        }
        let mut code = if c == '\\' {
            let next = self.next_escape_char(ErrorCode::EofWhileParsingCharacterConstant)?;
            self.read_char_escape(next)?
        } else {
            u32::from(c)
        };
        let modifiers = code & MODIFIER_MASK;
        if let Some(byte) = char_byte8(code & !MODIFIER_MASK) {
            code = u32::from(byte) | modifiers;
        }
        if !ends_char_literal(self.peek_char()?) {
            return Err(self.peek_error(ErrorCode::InvalidCharacterConstant));
        }
        if code <= MAX_CHAR {
            Ok(Value::Char(code))
        } else {
            Ok(Value::Number(Number::from(code)))
        }
    }

    /// Read a string literal; the opening quote has been consumed.
    ///
    /// The result is a unibyte string if raw bytes were written with `\x` or
    /// octal escapes, and a multibyte string otherwise.
    pub(super) fn parse_string(&mut self) -> Result<Value> {
        let mut codes: Vec<u32> = Vec::new();
        let mut force_singlebyte = false;
        let mut force_multibyte = false;
        loop {
            let c = match self.next_char()? {
                Some(c) => c,
                None => return Err(self.error(ErrorCode::EofWhileParsingString)),
            };
            let mut code = match c {
                '"' => break,
                '\\' => match self.next_escape_char(ErrorCode::EofWhileParsingString)? {
                    ' ' | '\n' => continue,
                    's' => u32::from(' '),
                    next => self.read_char_escape(next)?,
                },
                c => u32::from(c),
            };

            let mut modifiers = code & MODIFIER_MASK;
            code &= !MODIFIER_MASK;
            if char_byte8(code).is_some() {
                force_singlebyte = true;
            } else if code >= 0x80 {
                force_multibyte = true;
            } else {
                // `\C-SPC` and `\^SPC` are NUL in strings.
                if modifiers == CTRL && code == u32::from(' ') {
                    code = 0;
                    modifiers = 0;
                }
                if modifiers & SHIFT != 0 {
                    if (u32::from('a')..=u32::from('z')).contains(&code) {
                        code -= 0x20;
                        modifiers &= !SHIFT;
                    } else if (u32::from('A')..=u32::from('Z')).contains(&code) {
                        modifiers &= !SHIFT;
                    }
                }
                if modifiers & META != 0 {
                    modifiers &= !META;
                    code = byte8_to_char(code | 0x80);
                    force_singlebyte = true;
                }
            }
            if modifiers != 0 {
                return Err(self.error(ErrorCode::InvalidModifierInString));
            }
            codes.push(code);
        }

        if force_singlebyte && force_multibyte {
            return Err(self.error(ErrorCode::MixedUnibyteMultibyte));
        }
        if force_singlebyte {
            let bytes: Vec<u8> = codes
                .into_iter()
                .map(|c| char_byte8(c).unwrap_or(c as u8))
                .collect();
            return Ok(Value::Bytes(bytes.into()));
        }
        let mut text = String::with_capacity(codes.len());
        for code in codes {
            match char::from_u32(code) {
                Some(c) => text.push(c),
                None => return Err(self.error(ErrorCode::NonUnicodeCharacter(code))),
            }
        }
        Ok(Value::String(Rc::from(text)))
    }

    fn next_escape_char(&mut self, eof: ErrorCode) -> Result<char> {
        match self.next_char()? {
            Some(c) => Ok(c),
            None => Err(self.error(eof)),
        }
    }

    /// Interpret the escape sequence starting with `c`, the character after
    /// the backslash. Returns a character code with modifier bits.
    fn read_char_escape(&mut self, mut c: char) -> Result<u32> {
        let mut modifiers = 0;
        let mut ncontrol = 0;
        let chr = loop {
            let modifier = match c {
                'a' => break 0x07,
                'b' => break 0x08,
                'd' => break 0x7F,
                'e' => break 0x1B,
                'f' => break 0x0C,
                'n' => break 0x0A,
                'r' => break 0x0D,
                't' => break 0x09,
                'v' => break 0x0B,
                '\n' => return Err(self.error(ErrorCode::InvalidEscape("\\\n".into()))),
                'M' => META,
                'S' => SHIFT,
                'H' => HYPER,
                'A' => ALT,
                's' => SUPER,
                'C' | '^' => {
                    if c == 'C' && self.next_char()? != Some('-') {
                        return Err(self.error(ErrorCode::InvalidEscape("\\C".into())));
                    }
                    ncontrol += 1;
                    match self.next_escape_char(ErrorCode::EofWhileParsingValue)? {
                        '\\' => {
                            c = self.next_escape_char(ErrorCode::EofWhileParsingValue)?;
                            continue;
                        }
                        other => break u32::from(other),
                    }
                }
                '0'..='7' => break self.read_octal_escape(c)?,
                'x' => {
                    let code = self.read_hex_escape()?;
                    modifiers |= code & MODIFIER_MASK;
                    break code & !MODIFIER_MASK;
                }
                'u' => break self.read_unicode_escape('u', 4)?,
                'U' => break self.read_unicode_escape('U', 8)?,
                'N' => break self.read_named_char()?,
                other => break u32::from(other),
            };

            // A modifier prefix such as `\M-`.
            if self.peek_char()? != Some('-') {
                if c == 's' {
                    break u32::from(' ');
                }
                return Err(self.error(ErrorCode::InvalidEscape(format!("\\{}", c))));
            }
            self.eat_char();
            modifiers |= modifier;
            match self.next_escape_char(ErrorCode::EofWhileParsingValue)? {
                '\\' => c = self.next_escape_char(ErrorCode::EofWhileParsingValue)?,
                other => break u32::from(other),
            }
        };

        let mut chr = chr;
        for _ in 0..ncontrol {
            chr = apply_control(chr, &mut modifiers);
        }
        Ok(chr | modifiers)
    }

    // One to three octal digits; values 0x80..=0xFF are raw bytes.
    fn read_octal_escape(&mut self, first: char) -> Result<u32> {
        let mut code = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek_char()?.and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    self.eat_char();
                    code = code * 8 + digit;
                }
                None => break,
            }
        }
        if (0x80..0x100).contains(&code) {
            code = byte8_to_char(code);
        }
        Ok(code)
    }

    // Any number of hex digits. One or two digits denoting 0x80..=0xFF are a
    // raw byte; larger values may carry modifier bits.
    fn read_hex_escape(&mut self) -> Result<u32> {
        let mut code: u32 = 0;
        let mut count = 0;
        while let Some(digit) = self.peek_char()?.and_then(|c| c.to_digit(16)) {
            self.eat_char();
            code = (code << 4) + digit;
            if code > (META | (META - 1)) {
                return Err(self.error(ErrorCode::CharacterOutOfRange(code)));
            }
            count += 1;
        }
        if count == 0 {
            return Err(self.error(ErrorCode::InvalidEscape("\\x".into())));
        }
        if count <= 2 && code >= 0x80 {
            code = byte8_to_char(code);
        }
        Ok(code)
    }

    fn read_unicode_escape(&mut self, kind: char, digits: usize) -> Result<u32> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            match self.next_char()? {
                Some(c) => match c.to_digit(16) {
                    Some(digit) => code = (code << 4) + digit,
                    None => {
                        return Err(self.error(ErrorCode::InvalidEscape(format!("\\{}{}", kind, c))))
                    }
                },
                None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
            }
        }
        if code > MAX_UNICODE_CHAR || is_surrogate(code) {
            return Err(self.error(ErrorCode::NonUnicodeCharacter(code)));
        }
        Ok(code)
    }

    // `\N{NAME}` or `\N{U+HEX}`; the `N` has been consumed.
    fn read_named_char(&mut self) -> Result<u32> {
        if self.next_char()? != Some('{') {
            return Err(self.error(ErrorCode::InvalidEscape("\\N".into())));
        }
        let mut name = String::new();
        let mut whitespace = false;
        loop {
            let c = match self.next_char()? {
                Some('}') => break,
                Some(c) => c,
                None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
            };
            if !c.is_ascii() || c == '\0' {
                return Err(self.error(ErrorCode::InvalidCharacterName(format!(
                    "U+{:04X}",
                    u32::from(c)
                ))));
            }
            // Runs of whitespace count as a single space, so that names can
            // be broken across lines.
            if matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r') {
                if whitespace {
                    continue;
                }
                whitespace = true;
                name.push(' ');
            } else {
                whitespace = false;
                name.push(c);
            }
            if name.len() > CHARACTER_NAME_LENGTH_BOUND {
                return Err(self.error(ErrorCode::InvalidCharacterName(name)));
            }
        }
        if name.is_empty() {
            return Err(self.error(ErrorCode::EmptyCharacterName));
        }

        let code = match name.strip_prefix("U+") {
            Some(hex) => code_point_from_hex(hex),
            None => {
                self.load_character_names()?;
                code_from_character_name(&name.to_ascii_uppercase())
            }
        };
        match code {
            Some(code) if code <= MAX_UNICODE_CHAR && !is_surrogate(code) => Ok(code),
            _ => Err(self.error(ErrorCode::InvalidCharacterName(name))),
        }
    }

    fn load_character_names(&mut self) -> Result<()> {
        if self.names_loaded {
            return Ok(());
        }
        if let Some(loader) = self.loader.as_mut() {
            log::debug!("loading `{}' to resolve a character name", CHARACTER_NAMES_UNIT);
            let result = loader.load(CHARACTER_NAMES_UNIT);
            if let Err(err) = result {
                return Err(self.error(ErrorCode::Load(err.to_string())));
            }
        }
        self.names_loaded = true;
        Ok(())
    }
}

// Applies one `\C-` or `\^` prefix.
fn apply_control(chr: u32, modifiers: &mut u32) -> u32 {
    if (u32::from('@')..=u32::from('_')).contains(&chr)
        || (u32::from('a')..=u32::from('z')).contains(&chr)
    {
        chr & 0x1F
    } else if chr == u32::from('?') {
        0x7F
    } else {
        *modifiers |= CTRL;
        chr
    }
}

fn code_point_from_hex(hex: &str) -> Option<u32> {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    // Leading zeros aside, anything longer than eight digits is out of range.
    let digits = hex.trim_start_matches('0');
    if digits.len() > 8 {
        return None;
    }
    u32::from_str_radix(hex.get(hex.len().saturating_sub(8)..)?, 16).ok()
}

/// Resolve an upper-cased character name.
fn code_from_character_name(name: &str) -> Option<u32> {
    if let Some(n) = name.strip_prefix("VARIATION SELECTOR-") {
        if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return match n.parse::<u32>().ok()? {
            n @ 1..=16 => Some(0xFE00 + n - 1),
            n @ 17..=256 => Some(0xE0100 + n - 17),
            _ => None,
        };
    }
    unicode_names2::character(name).map(u32::from)
}
