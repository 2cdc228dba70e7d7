// The #[non_exhaustive] attribute applies at the crate-level, and I
// want module-level restrictions, which are far stricter.
#![allow(clippy::manual_non_exhaustive)]

//! Floating-point values that compare within a tolerance.
//!
//! [`ApproxValue`] wraps an `f64` and redefines `==`, `<`, `<=` and
//! the rest so that values within `atol + rtol * max(|a|, |b|)` of
//! each other count as equal. The tolerance in effect is managed per
//! thread by [`tolerance::active`], either permanently or for the
//! duration of a scope:
//!
//! ```
//! use approxval::ApproxValue;
//! use approxval::tolerance::active;
//!
//! let x = ApproxValue::new(0.1) * 3;
//! assert!(x == 0.3);
//!
//! active::with_tolerance(Some(0.0), Some(0.0), || {
//!   assert!(x != 0.3);
//! })?;
//! # Ok::<(), approxval::ToleranceError>(())
//! ```

pub mod tolerance;
pub mod util;
pub mod value;

pub use tolerance::{Tolerance, ToleranceError, ToleranceState};
pub use value::ApproxValue;
