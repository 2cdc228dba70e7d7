
//! Tolerance parameters and the closeness predicate built on them.
//!
//! Two numbers `a` and `b` are close under a [`Tolerance`] if
//!
//! ```text
//! |a - b| <= atol + rtol * max(|a|, |b|)
//! ```
//!
//! The relative term scales with the larger operand, so the result
//! does not depend on argument order. The absolute term keeps a
//! usable window when one of the operands is zero, and its influence
//! fades as the operands grow.

pub mod active;
pub mod error;
pub mod state;

pub use error::ToleranceError;
pub use state::{ToleranceState, ScopeHandle, ScopeGuard};

use serde::{Serialize, Deserialize, Deserializer};
use serde::de::Error as _;

use std::fmt::{self, Display, Formatter};

/// Relative tolerance used when nothing else has been configured.
pub const DEFAULT_RTOL: f64 = 1e-6;

/// Absolute tolerance used when nothing else has been configured.
pub const DEFAULT_ATOL: f64 = 1e-9;

/// A validated pair of relative and absolute tolerances.
///
/// Both components are always non-negative and never NaN. The only
/// ways to build a `Tolerance` are [`Tolerance::new`], the associated
/// constants, and deserialization, all of which enforce this.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Tolerance {
  rtol: f64,
  atol: f64,
}

/// Deserialization shape for [`Tolerance`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTolerance {
  #[serde(default)]
  rtol: Option<f64>,
  #[serde(default)]
  atol: Option<f64>,
}

impl Tolerance {
  /// The documented defaults, [`DEFAULT_RTOL`] and [`DEFAULT_ATOL`].
  pub const DEFAULT: Tolerance = Tolerance { rtol: DEFAULT_RTOL, atol: DEFAULT_ATOL };

  /// Zero tolerance. Under this setting, closeness is exact equality.
  pub const EXACT: Tolerance = Tolerance { rtol: 0.0, atol: 0.0 };

  /// Constructs a tolerance pair, failing if either component is
  /// negative or NaN.
  pub fn new(rtol: f64, atol: f64) -> Result<Tolerance, ToleranceError> {
    Ok(Tolerance {
      rtol: check("rtol", rtol)?,
      atol: check("atol", atol)?,
    })
  }

  pub fn rtol(&self) -> f64 {
    self.rtol
  }

  pub fn atol(&self) -> f64 {
    self.atol
  }

  /// The pair `(rtol, atol)`.
  pub fn pair(&self) -> (f64, f64) {
    (self.rtol, self.atol)
  }

  /// Returns a copy of `self` with the given components replaced.
  /// `None` keeps the current component. Fails, without producing
  /// anything, if a replacement is invalid.
  pub fn with_overrides(
    &self,
    rtol: Option<f64>,
    atol: Option<f64>,
  ) -> Result<Tolerance, ToleranceError> {
    Tolerance::new(rtol.unwrap_or(self.rtol), atol.unwrap_or(self.atol))
  }

  /// The largest difference between `a` and `b` which still counts as
  /// close, namely `atol + rtol * max(|a|, |b|)`.
  pub fn window(&self, a: f64, b: f64) -> f64 {
    self.atol + self.rtol * a.abs().max(b.abs())
  }

  /// The closeness predicate.
  ///
  /// NaN is never close to anything, including itself. An infinity is
  /// close only to the same infinity, even though the window formula
  /// alone would call it close to any large finite number.
  pub fn is_close(&self, a: f64, b: f64) -> bool {
    if a == b {
      return true;
    }
    if !a.is_finite() || !b.is_finite() {
      return false;
    }
    (a - b).abs() <= self.window(a, b)
  }
}

fn check(name: &'static str, value: f64) -> Result<f64, ToleranceError> {
  if value.is_nan() || value < 0.0 {
    Err(ToleranceError::InvalidTolerance { name, value })
  } else {
    Ok(value)
  }
}

impl Default for Tolerance {
  fn default() -> Tolerance {
    Tolerance::DEFAULT
  }
}

/// Missing fields take their default values. Negative or NaN values
/// are rejected.
impl<'de> Deserialize<'de> for Tolerance {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Tolerance, D::Error> {
    let raw = RawTolerance::deserialize(deserializer)?;
    Tolerance::DEFAULT.with_overrides(raw.rtol, raw.atol).map_err(D::Error::custom)
  }
}

impl Display for Tolerance {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "rtol={:e}, atol={:e}", self.rtol, self.atol)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let tol = Tolerance::default();
    assert_eq!(tol.rtol(), 1e-6);
    assert_eq!(tol.atol(), 1e-9);
    assert_eq!(tol, Tolerance::DEFAULT);
    assert_eq!(tol.pair(), (DEFAULT_RTOL, DEFAULT_ATOL));
  }

  #[test]
  fn test_new_rejects_negative() {
    assert_eq!(
      Tolerance::new(-1e-3, 0.0),
      Err(ToleranceError::InvalidTolerance { name: "rtol", value: -1e-3 }),
    );
    assert_eq!(
      Tolerance::new(0.0, -1.0),
      Err(ToleranceError::InvalidTolerance { name: "atol", value: -1.0 }),
    );
  }

  #[test]
  fn test_new_rejects_nan() {
    assert!(matches!(
      Tolerance::new(f64::NAN, 0.0),
      Err(ToleranceError::InvalidTolerance { name: "rtol", .. }),
    ));
  }

  #[test]
  fn test_new_accepts_zero() {
    assert_eq!(Tolerance::new(0.0, 0.0), Ok(Tolerance::EXACT));
  }

  #[test]
  fn test_with_overrides() {
    let tol = Tolerance::DEFAULT.with_overrides(Some(0.5), None).unwrap();
    assert_eq!(tol.rtol(), 0.5);
    assert_eq!(tol.atol(), DEFAULT_ATOL);
    let tol = tol.with_overrides(None, Some(0.25)).unwrap();
    assert_eq!(tol.rtol(), 0.5);
    assert_eq!(tol.atol(), 0.25);
    assert!(tol.with_overrides(None, Some(-0.25)).is_err());
  }

  #[test]
  fn test_window() {
    let tol = Tolerance::new(0.1, 1.0).unwrap();
    assert_eq!(tol.window(0.0, 0.0), 1.0);
    assert_eq!(tol.window(10.0, -20.0), 3.0);
    assert_eq!(tol.window(-20.0, 10.0), 3.0);
  }

  #[test]
  fn test_is_close() {
    let tol = Tolerance::DEFAULT;
    assert!(tol.is_close(1.0, 1.0));
    assert!(tol.is_close(0.1 * 3.0, 0.3));
    assert!(tol.is_close(1e6, 1e6 + 0.5));
    assert!(!tol.is_close(1e6, 1e6 + 2.0));
    assert!(tol.is_close(0.0, 5e-10));
    assert!(!tol.is_close(0.0, 5e-9));
  }

  #[test]
  fn test_is_close_exact() {
    assert!(Tolerance::EXACT.is_close(0.3, 0.3));
    assert!(!Tolerance::EXACT.is_close(0.1 * 3.0, 0.3));
  }

  #[test]
  fn test_is_close_non_finite() {
    let tol = Tolerance::new(1.0, 1.0).unwrap();
    assert!(!tol.is_close(f64::NAN, f64::NAN));
    assert!(!tol.is_close(f64::NAN, 0.0));
    assert!(tol.is_close(f64::INFINITY, f64::INFINITY));
    assert!(!tol.is_close(f64::INFINITY, f64::NEG_INFINITY));
    assert!(!tol.is_close(f64::INFINITY, f64::MAX));
    assert!((f64::INFINITY - f64::MAX).abs() <= tol.window(f64::INFINITY, f64::MAX));
  }

  #[test]
  fn test_serialize() {
    let tol = Tolerance::new(1e-3, 0.5).unwrap();
    let json = serde_json::to_string(&tol).unwrap();
    assert_eq!(json, r#"{"rtol":0.001,"atol":0.5}"#);
  }

  #[test]
  fn test_deserialize_with_missing_fields() {
    let tol: Tolerance = serde_json::from_str(r#"{"rtol":0.001}"#).unwrap();
    assert_eq!(tol.rtol(), 1e-3);
    assert_eq!(tol.atol(), DEFAULT_ATOL);
    let tol: Tolerance = serde_json::from_str("{}").unwrap();
    assert_eq!(tol, Tolerance::DEFAULT);
  }

  #[test]
  fn test_deserialize_rejects_invalid() {
    assert!(serde_json::from_str::<Tolerance>(r#"{"atol":-1.0}"#).is_err());
    assert!(serde_json::from_str::<Tolerance>(r#"{"tol":1.0}"#).is_err());
  }

  #[test]
  fn test_display() {
    assert_eq!(Tolerance::DEFAULT.to_string(), "rtol=1e-6, atol=1e-9");
  }
}
