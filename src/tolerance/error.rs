
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ToleranceError {
  #[error("Invalid tolerance: {name} must be a non-negative number, got {value}")]
  InvalidTolerance {
    name: &'static str,
    value: f64,
  },
  #[error("Scope mismatch: expected a scope at depth {expected}, but the stack has depth {depth}")]
  ScopeMismatch {
    expected: usize,
    depth: usize,
  },
}
