use std::fmt::{self, Debug, Formatter};

use crate::value::ApproxValue;

/// Exact equality, for the types whose `PartialEq` goes through the
/// active tolerance.
///
/// Unlike the tolerance-based equality of [`ApproxValue`], this
/// relation is transitive, and `a.strict_eq(b)` implies `a == b`.
pub trait StrictEq: PartialEq {
  fn strict_eq(&self, other: &Self) -> bool;
}

/// Wrapper whose `PartialEq` is [`StrictEq`], so that exact checks can
/// reuse `assert_eq!` and its failure output. Debug-prints as the
/// wrapped value.
pub struct Strictly<'a, T>(pub &'a T);

impl<'a, T: StrictEq> PartialEq for Strictly<'a, T> {
  fn eq(&self, other: &Self) -> bool {
    self.0.strict_eq(other.0)
  }
}

impl<'a, T: Debug> Debug for Strictly<'a, T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.0)
  }
}

/// Exact comparison of magnitudes, ignoring the active tolerance.
/// `0.0` and `-0.0` are strictly equal; NaN is not strictly equal to
/// anything.
impl StrictEq for ApproxValue {
  fn strict_eq(&self, other: &Self) -> bool {
    self.magnitude() == other.magnitude()
  }
}

impl StrictEq for f64 {
  fn strict_eq(&self, other: &Self) -> bool {
    self == other
  }
}

impl<A: StrictEq, B: StrictEq> StrictEq for (A, B) {
  fn strict_eq(&self, other: &Self) -> bool {
    self.0.strict_eq(&other.0) && self.1.strict_eq(&other.1)
  }
}

#[macro_export]
macro_rules! assert_strict_eq {
  ($left:expr, $right:expr $(,)?) => {
    match (&$left, &$right) {
      (left_val, right_val) => {
        assert_eq!(
          $crate::util::stricteq::Strictly(left_val),
          $crate::util::stricteq::Strictly(right_val),
        )
      }
    }
  }
}

#[macro_export]
macro_rules! assert_strict_ne {
  ($left:expr, $right:expr $(,)?) => {
    match (&$left, &$right) {
      (left_val, right_val) => {
        assert_ne!(
          $crate::util::stricteq::Strictly(left_val),
          $crate::util::stricteq::Strictly(right_val),
        )
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_strict_eq_ignores_tolerance() {
    let x = ApproxValue::new(0.1) * 3;
    assert!(x == 0.3);
    assert!(!x.strict_eq(&ApproxValue::new(0.3)));
    assert!(x.strict_eq(&ApproxValue::new(0.1 * 3.0)));
  }

  #[test]
  fn test_strict_eq_on_signed_zero_and_nan() {
    assert!(ApproxValue::new(0.0).strict_eq(&ApproxValue::new(-0.0)));
    assert!(!ApproxValue::NAN.strict_eq(&ApproxValue::NAN));
  }

  #[test]
  fn test_strict_eq_on_pairs() {
    assert!((1.0f64, ApproxValue::new(2.0)).strict_eq(&(1.0, ApproxValue::new(2.0))));
    assert!(!(1.0f64, ApproxValue::new(2.0)).strict_eq(&(1.0, ApproxValue::new(2.0 + 1e-12))));
  }
}
