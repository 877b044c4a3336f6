//! Dynamically typed number type.
//!
//! Emacs Lisp integers have unbounded magnitude. Values that fit into an
//! `i64` are stored inline as *fixnums*; everything else is a *bignum*. The
//! split is an implementation detail of the representation, but it is
//! observable through [`Number::is_bignum`], which is what Lisp code calls
//! `bignump`.

use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Represents a Lisp number: an exact integer or a floating point number.
///
/// Equality follows `eql`: integers compare by value, floats compare by their
/// bit pattern. Hence `-0.0` and `0.0` are distinct numbers, while a NaN is
/// equal to a NaN with the same sign and payload.
#[derive(Clone)]
pub struct Number {
    n: N,
}

#[derive(Debug, Clone)]
enum N {
    Fixnum(i64),
    // Invariant: never representable as an `i64`.
    Bignum(BigInt),
    Float(f64),
}

impl Number {
    /// Returns true if the number is an integer that fits into an `i64`.
    #[inline]
    pub fn is_fixnum(&self) -> bool {
        matches!(self.n, N::Fixnum(_))
    }

    /// Returns true if the number is an integer outside the `i64` range.
    ///
    /// ```
    /// # use elexpr::Number;
    /// # use num_bigint::BigInt;
    /// let big = BigInt::from(i64::MAX) + 1;
    /// assert!(Number::from(big).is_bignum());
    /// assert!(!Number::from(BigInt::from(42)).is_bignum());
    /// ```
    #[inline]
    pub fn is_bignum(&self) -> bool {
        matches!(self.n, N::Bignum(_))
    }

    /// Returns true if the number is an integer of any magnitude.
    #[inline]
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Returns true if the number is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self.n, N::Float(_))
    }

    /// If the number is a fixnum, return its value.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            N::Fixnum(n) => Some(n),
            N::Bignum(_) | N::Float(_) => None,
        }
    }

    /// Represents the number as f64. Bignums too large for a float become
    /// infinite.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match &self.n {
            N::Fixnum(n) => *n as f64,
            N::Bignum(n) => n.to_f64().unwrap_or(f64::NAN),
            N::Float(n) => *n,
        }
    }

    /// If the number is an integer, return it as a `BigInt`.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match &self.n {
            N::Fixnum(n) => Some(BigInt::from(*n)),
            N::Bignum(n) => Some(n.clone()),
            N::Float(_) => None,
        }
    }

    /// Returns true if the number is zero, of either sign for floats.
    pub fn is_zero(&self) -> bool {
        match &self.n {
            N::Fixnum(n) => *n == 0,
            N::Bignum(n) => n.is_zero(),
            N::Float(f) => *f == 0.0,
        }
    }

    /// Dispatch based on the type of the contained value.
    ///
    /// Depending on the stored value, one of the functions of the
    /// supplied visitor will be called.
    pub fn visit<V>(&self, visitor: V) -> Result<V::Value, V::Error>
    where
        V: Visitor,
    {
        match &self.n {
            N::Fixnum(n) => visitor.visit_fixnum(*n),
            N::Bignum(n) => visitor.visit_bignum(n),
            N::Float(n) => visitor.visit_f64(*n),
        }
    }
}

/// Trait to access the value stored in `Number`.
///
/// The `Number` type does not directly expose its internal
/// structure to allow future changes without breaking the API.
///
/// Instead, you can implement this trait and pass your implementation
/// to [`Number::visit`].
pub trait Visitor {
    /// The return type of the visitor methods.
    type Value;
    /// The error type of the visitor methods.
    type Error;

    /// The stored value is an integer within the `i64` range.
    fn visit_fixnum(self, n: i64) -> Result<Self::Value, Self::Error>;
    /// The stored value is an integer outside the `i64` range.
    fn visit_bignum(self, n: &BigInt) -> Result<Self::Value, Self::Error>;
    /// The stored value is a float.
    fn visit_f64(self, n: f64) -> Result<Self::Value, Self::Error>;
}

macro_rules! impl_from_fixnum {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(n: $ty) -> Self {
                    Number { n: N::Fixnum(i64::from(n)) }
                }
            }
        )*
    };
}

macro_rules! impl_from_wide {
    (
        $($ty:ty),*
    ) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(n: $ty) -> Self {
                    match i64::try_from(n) {
                        Ok(n) => Number { n: N::Fixnum(n) },
                        Err(_) => Number { n: N::Bignum(BigInt::from(n)) },
                    }
                }
            }
        )*
    };
}

impl_from_fixnum!(u8, u16, u32, i8, i16, i32, i64);
impl_from_wide!(u64, i128, u128, usize, isize);

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Self {
        match n.to_i64() {
            Some(n) => Number { n: N::Fixnum(n) },
            None => Number { n: N::Bignum(n) },
        }
    }
}

impl From<f32> for Number {
    #[inline]
    fn from(n: f32) -> Self {
        Number {
            n: N::Float(f64::from(n)),
        }
    }
}

impl From<f64> for Number {
    #[inline]
    fn from(n: f64) -> Self {
        Number { n: N::Float(n) }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (&self.n, &other.n) {
            (N::Fixnum(a), N::Fixnum(b)) => a == b,
            (N::Bignum(a), N::Bignum(b)) => a == b,
            (N::Float(a), N::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.n {
            N::Fixnum(n) => n.hash(state),
            N::Bignum(n) => n.hash(state),
            N::Float(f) => f.to_bits().hash(state),
        }
    }
}

/// Quiet NaNs carry up to 51 bits of payload.
pub(crate) const NAN_PAYLOAD_MASK: u64 = (1 << 51) - 1;

/// Render a float in read syntax: the shortest representation that reads
/// back to the same bits, with `e+INF` and `e+NaN` forms for non-finite
/// values.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        let sign = if f.is_sign_negative() { "-" } else { "" };
        let payload = f.to_bits() & NAN_PAYLOAD_MASK;
        format!("{}{}.0e+NaN", sign, payload)
    } else if f.is_infinite() {
        let text = if f > 0.0 { "1.0e+INF" } else { "-1.0e+INF" };
        text.to_owned()
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format_finite(f).to_owned()
    }
}

impl Display for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.n {
            N::Fixnum(i) => Display::fmt(i, formatter),
            N::Bignum(i) => Display::fmt(i, formatter),
            N::Float(f) => formatter.write_str(&format_float(*f)),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.n, formatter)
    }
}
