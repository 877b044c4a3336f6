//! Number syntax: decimal integers and floats as found in symbol tokens, and
//! the digits of `#x`-style radix integers.

use num_bigint::BigInt;
use num_traits::Num;

use crate::number::{Number, NAN_PAYLOAD_MASK};

const LEAD_INT: u8 = 1;
const DOT_CHAR: u8 = 2;
const TRAIL_INT: u8 = 4;
const E_EXP: u8 = 8;

#[derive(Clone, Copy, PartialEq)]
enum Special {
    Finite,
    Infinity,
    NaN,
}

/// Interpret a whole token as a decimal number.
///
/// Returns `None` if the token is a symbol name instead. A token is an
/// integer if it is `[+-]?D+` with an optional trailing dot, and a float if
/// it has digits after the decimal point, or digits before it and an
/// exponent.
pub(crate) fn parse_decimal(token: &str) -> Option<Number> {
    let bytes = token.as_bytes();
    let mut i = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };

    let mut state = 0;
    let lead_start = i;
    i = skip_digits(bytes, i);
    let lead_end = i;
    if lead_end > lead_start {
        state |= LEAD_INT;
    }
    if bytes.get(i) == Some(&b'.') {
        state |= DOT_CHAR;
        i += 1;
    }
    let trail_start = i;
    i = skip_digits(bytes, i);
    if i > trail_start {
        state |= TRAIL_INT;
    }

    let mut special = Special::Finite;
    if let Some(b'e') | Some(b'E') = bytes.get(i) {
        let rest = &bytes[i + 1..];
        let sign_len = match rest.first() {
            Some(b'+') | Some(b'-') => 1,
            _ => 0,
        };
        if rest.get(sign_len).map_or(false, u8::is_ascii_digit) {
            state |= E_EXP;
            i = skip_digits(bytes, i + 1 + sign_len);
        } else if rest.starts_with(b"+INF") {
            state |= E_EXP;
            special = Special::Infinity;
            i += 5;
        } else if rest.starts_with(b"+NaN") {
            state |= E_EXP;
            special = Special::NaN;
            i += 5;
        }
    }

    if i != bytes.len() {
        return None;
    }

    let float_syntax =
        state & TRAIL_INT != 0 || (state & LEAD_INT != 0 && state & E_EXP != 0);
    if float_syntax {
        let value = match special {
            Special::Finite => return token.parse::<f64>().ok().map(Number::from),
            Special::Infinity => f64::INFINITY,
            Special::NaN => nan_with_payload(&bytes[lead_start..lead_end]),
        };
        return Some(Number::from(if negative { -value } else { value }));
    }
    if state & LEAD_INT != 0 && state & E_EXP == 0 {
        return Some(integer(&token[lead_start..lead_end], negative, 10));
    }
    None
}

/// Interpret the text following a radix prefix such as `#x`.
///
/// The text is an optional sign followed by at least one digit valid in
/// `radix`.
pub(crate) fn parse_radix(text: &str, radix: u32) -> Option<Number> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(integer(digits, negative, radix))
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).map_or(false, u8::is_ascii_digit) {
        i += 1;
    }
    i
}

// `digits` is non-empty and valid in `radix`.
fn integer(digits: &str, negative: bool, radix: u32) -> Number {
    if let Ok(n) = i64::from_str_radix(digits, radix) {
        return Number::from(if negative { -n } else { n });
    }
    let n = BigInt::from_str_radix(digits, radix).unwrap_or_default();
    Number::from(if negative { -n } else { n })
}

// The integer part of the mantissa, reduced modulo 2^51, becomes the payload
// of a quiet NaN.
fn nan_with_payload(digits: &[u8]) -> f64 {
    let payload = digits.iter().fold(0u64, |acc, d| {
        (acc * 10 + u64::from(d - b'0')) & NAN_PAYLOAD_MASK
    });
    f64::from_bits((0x7ff << 52) | (1 << 51) | payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(token: &str) -> Option<f64> {
        parse_decimal(token).filter(Number::is_float).map(|n| n.as_f64())
    }

    #[test]
    fn integers() {
        assert_eq!(parse_decimal("13"), Some(Number::from(13)));
        assert_eq!(parse_decimal("13."), Some(Number::from(13)));
        assert_eq!(parse_decimal("+13"), Some(Number::from(13)));
        assert_eq!(parse_decimal("-0"), Some(Number::from(0)));
        assert!(parse_decimal("-92233720368547758089").unwrap().is_bignum());
        assert_eq!(
            parse_decimal("-9223372036854775808"),
            Some(Number::from(i64::MIN))
        );
    }

    #[test]
    fn floats() {
        assert_eq!(float("13.25"), Some(13.25));
        assert_eq!(float(".25"), Some(0.25));
        assert_eq!(float("13e4"), Some(130000.0));
        assert_eq!(float("1.e3"), Some(1000.0));
        assert_eq!(float("0e-5"), Some(0.0));
        assert!(float("-0.0").unwrap().is_sign_negative());
        assert_eq!(float("-1.5"), Some(-1.5));
        assert_eq!(float("+1.5"), Some(1.5));
        assert_eq!(float("1.0e+INF"), Some(f64::INFINITY));
        assert_eq!(float("-.5e+INF"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn nan_payloads() {
        let nan = float("5.0e+NaN").unwrap();
        assert!(nan.is_nan());
        assert_eq!(nan.to_bits() & NAN_PAYLOAD_MASK, 5);
        let big = float("2251799813685249.0e+NaN").unwrap();
        assert_eq!(big.to_bits() & NAN_PAYLOAD_MASK, 1);
        assert!(float("-0.0e+NaN").unwrap().is_sign_negative());
    }

    #[test]
    fn symbols() {
        for token in [
            "", "+", "-", ".", "foo", "1+", "-.", ".e5", "e5", "1.5.", "0.0e+inf", "1.0eNaN",
            "1e", "1e+", "0x10",
        ] {
            assert_eq!(parse_decimal(token), None, "{:?}", token);
        }
    }

    #[test]
    fn radix() {
        assert_eq!(parse_radix("ff", 16), Some(Number::from(255)));
        assert_eq!(parse_radix("-101", 2), Some(Number::from(-5)));
        assert_eq!(parse_radix("z", 36), Some(Number::from(35)));
        assert!(parse_radix("ffffffffffffffffffff", 16).unwrap().is_bignum());
        assert_eq!(parse_radix("", 16), None);
        assert_eq!(parse_radix("-", 16), None);
        assert_eq!(parse_radix("12", 2), None);
    }
}
