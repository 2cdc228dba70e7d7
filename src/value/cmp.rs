
//! Tolerance-aware comparisons for [`ApproxValue`].

use super::ApproxValue;
use crate::tolerance::{Tolerance, active};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};

use std::cmp::Ordering;

impl ApproxValue {
  /// Closeness under an explicit tolerance, ignoring the tolerance
  /// active on this thread.
  pub fn eq_within(&self, other: impl Into<ApproxValue>, tolerance: &Tolerance) -> bool {
    tolerance.is_close(self.magnitude, other.into().magnitude)
  }

  /// Ordering under an explicit tolerance. Values that are close
  /// compare as `Equal`; otherwise the magnitudes are compared as
  /// plain `f64`. Returns `None` if either side is NaN.
  pub fn cmp_within(&self, other: impl Into<ApproxValue>, tolerance: &Tolerance) -> Option<Ordering> {
    let other = other.into();
    if self.eq_within(other, tolerance) {
      Some(Ordering::Equal)
    } else {
      self.magnitude.partial_cmp(&other.magnitude)
    }
  }

  /// The largest difference from `other` that still counts as equal
  /// under the active tolerance.
  pub fn tolerance(&self, other: impl Into<ApproxValue>) -> f64 {
    active::current().window(self.magnitude, other.into().magnitude)
  }
}

/// Equality holds when `|a - b| <= atol + rtol * max(|a|, |b|)` under
/// the tolerance active on this thread. This relation is reflexive and
/// symmetric, but not transitive.
impl<T> PartialEq<T> for ApproxValue
where T: Copy + Into<ApproxValue> {
  fn eq(&self, other: &T) -> bool {
    self.eq_within(*other, &active::current())
  }
}

/// Values within tolerance of each other compare as `Equal`, so
/// `a <= b` and `b <= a` both hold for close values, while `a < b`
/// additionally requires that `a` and `b` are not close.
impl<T> PartialOrd<T> for ApproxValue
where T: Copy + Into<ApproxValue> {
  fn partial_cmp(&self, other: &T) -> Option<Ordering> {
    self.cmp_within(*other, &active::current())
  }
}

macro_rules! impl_reflected_cmp {
  ($($type_: ty),*) => {
    $(
      impl PartialEq<ApproxValue> for $type_ {
        fn eq(&self, other: &ApproxValue) -> bool {
          other == self
        }
      }

      impl PartialOrd<ApproxValue> for $type_ {
        fn partial_cmp(&self, other: &ApproxValue) -> Option<Ordering> {
          other.partial_cmp(self).map(Ordering::reverse)
        }
      }
    )*
  };
}

impl_reflected_cmp!(f64, f32, i8, i16, i32, u8, u16, u32);

/// The default epsilon is the active absolute tolerance.
impl AbsDiffEq for ApproxValue {
  type Epsilon = f64;

  fn default_epsilon() -> f64 {
    active::current().atol()
  }

  fn abs_diff_eq(&self, other: &ApproxValue, epsilon: f64) -> bool {
    self.magnitude.abs_diff_eq(&other.magnitude, epsilon)
  }
}

/// The default maximum relative difference is the active relative
/// tolerance.
impl RelativeEq for ApproxValue {
  fn default_max_relative() -> f64 {
    active::current().rtol()
  }

  fn relative_eq(&self, other: &ApproxValue, epsilon: f64, max_relative: f64) -> bool {
    self.magnitude.relative_eq(&other.magnitude, epsilon, max_relative)
  }
}

impl UlpsEq for ApproxValue {
  fn default_max_ulps() -> u32 {
    <f64 as UlpsEq>::default_max_ulps()
  }

  fn ulps_eq(&self, other: &ApproxValue, epsilon: f64, max_ulps: u32) -> bool {
    self.magnitude.ulps_eq(&other.magnitude, epsilon, max_ulps)
  }
}
