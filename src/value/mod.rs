
//! Real numbers which compare approximately.

pub mod cmp;
pub mod compare;
pub mod ops;

use crate::tolerance::active;

use num::traits::ToPrimitive;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// An `f64` whose equality and ordering tolerate small rounding
/// errors.
///
/// Arithmetic works on the underlying magnitude and always produces a
/// new `ApproxValue`, so the approximate marking survives a chain of
/// computations. Comparisons (`==`, `<`, and friends) consult the
/// tolerance active on the current thread; see
/// [`tolerance::active`](crate::tolerance::active).
///
/// ```
/// # use approxval::value::ApproxValue;
/// assert!(ApproxValue::new(0.1) * 3.0 == 0.3);
/// assert!(ApproxValue::new(2.0) + 3 == ApproxValue::new(5.0));
/// ```
///
/// Tolerance is applied only when comparing. Nothing is accumulated
/// during arithmetic.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApproxValue {
  magnitude: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Expected a real number, got {found}")]
pub struct TypeMismatchError {
  pub found: String,
  _priv: (),
}

impl ApproxValue {
  pub const ZERO: ApproxValue = ApproxValue::new(0.0);
  pub const ONE: ApproxValue = ApproxValue::new(1.0);
  pub const NAN: ApproxValue = ApproxValue::new(f64::NAN);

  pub const fn new(magnitude: f64) -> ApproxValue {
    ApproxValue { magnitude }
  }

  /// Wraps any value with a floating-point representation, such as a
  /// `BigInt`, a `BigRational`, or a `Complex` with no imaginary
  /// part. Values which cannot be expressed as an `f64` are rejected.
  pub fn try_from_number<T>(value: T) -> Result<ApproxValue, TypeMismatchError>
  where T: ToPrimitive + Debug {
    value.to_f64()
      .map(ApproxValue::new)
      .ok_or_else(|| TypeMismatchError::new(format!("{:?}", value)))
  }

  /// The wrapped value.
  pub fn magnitude(&self) -> f64 {
    self.magnitude
  }

  pub fn is_finite(&self) -> bool {
    self.magnitude.is_finite()
  }

  pub fn is_nan(&self) -> bool {
    self.magnitude.is_nan()
  }

  pub fn abs(self) -> ApproxValue {
    ApproxValue::new(self.magnitude.abs())
  }

  /// Raises `self` to an integer power.
  pub fn powi(self, exp: i32) -> ApproxValue {
    ApproxValue::new(self.magnitude.powi(exp))
  }

  /// Raises `self` to a floating-point power. The result is NaN if it
  /// does not exist as a real number.
  pub fn powf(self, exp: impl Into<ApproxValue>) -> ApproxValue {
    ApproxValue::new(self.magnitude.powf(exp.into().magnitude))
  }

  /// Divide, rounding the quotient toward negative infinity.
  pub fn div_floor(self, other: impl Into<ApproxValue>) -> ApproxValue {
    self.div_rem_floor(other).0
  }

  /// Floored division together with the matching remainder, so that
  /// `quotient * other + remainder` reproduces `self`. The remainder
  /// has the sign of `other`.
  ///
  /// A zero divisor produces NaN in both positions.
  pub fn div_rem_floor(self, other: impl Into<ApproxValue>) -> (ApproxValue, ApproxValue) {
    let (quotient, remainder) = div_rem_floor(self.magnitude, other.into().magnitude);
    (ApproxValue::new(quotient), ApproxValue::new(remainder))
  }
}

/// Floored division on `f64`, with the quotient snapped to the
/// nearest integer so that rounding in `x - rem` cannot push it off by
/// one.
fn div_rem_floor(x: f64, y: f64) -> (f64, f64) {
  let mut rem = x % y;
  let mut div = (x - rem) / y;
  if rem != 0.0 {
    if (y < 0.0) != (rem < 0.0) {
      rem += y;
      div -= 1.0;
    }
  } else {
    rem = 0.0_f64.copysign(y);
  }
  let quotient = if div != 0.0 {
    let floor = div.floor();
    if div - floor > 0.5 { floor + 1.0 } else { floor }
  } else {
    0.0_f64.copysign(x / y)
  };
  (quotient, rem)
}

/// Remainder with the sign of the divisor, matching
/// [`ApproxValue::div_rem_floor`].
pub(crate) fn rem_floor(x: f64, y: f64) -> f64 {
  div_rem_floor(x, y).1
}

impl TypeMismatchError {
  pub(crate) fn new(found: impl Into<String>) -> Self {
    TypeMismatchError { found: found.into(), _priv: () }
  }
}

impl From<f64> for ApproxValue {
  fn from(magnitude: f64) -> ApproxValue {
    ApproxValue::new(magnitude)
  }
}

impl From<&f64> for ApproxValue {
  fn from(magnitude: &f64) -> ApproxValue {
    ApproxValue::new(*magnitude)
  }
}

impl From<&ApproxValue> for ApproxValue {
  fn from(value: &ApproxValue) -> ApproxValue {
    *value
  }
}

impl From<ApproxValue> for f64 {
  fn from(value: ApproxValue) -> f64 {
    value.magnitude
  }
}

macro_rules! impl_from_lossless {
  ($($type_: ty),*) => {
    $(
      impl From<$type_> for ApproxValue {
        fn from(value: $type_) -> ApproxValue {
          ApproxValue::new(f64::from(value))
        }
      }
    )*
  };
}

impl_from_lossless!(f32, i8, i16, i32, u8, u16, u32);

/// Parses a real number. A single trailing `~`, as produced by the
/// `Display` impl, is accepted.
impl FromStr for ApproxValue {
  type Err = TypeMismatchError;

  fn from_str(s: &str) -> Result<ApproxValue, TypeMismatchError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('~').unwrap_or(trimmed);
    f64::from_str(digits)
      .map(ApproxValue::new)
      .map_err(|_| TypeMismatchError::new(s))
  }
}

impl Debug for ApproxValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "ApproxValue({:?})", self.magnitude)
  }
}

/// Prints the magnitude followed by `~`. Integral values keep one
/// decimal place, so `5` prints as `5.0~`. The alternate form (`{:#}`)
/// appends the tolerance active on this thread.
impl Display for ApproxValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let d = self.magnitude;
    if d.fract() == 0.0 && d.abs() < u64::MAX as f64 {
      write!(f, "{:.1}~", d)?;
    } else {
      write!(f, "{}~", d)?;
    }
    if f.alternate() {
      write!(f, " ({})", active::current())?;
    }
    Ok(())
  }
}
