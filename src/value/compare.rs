
//! Approximate comparisons as free functions, both on single numbers
//! and element-wise on sequences.
//!
//! All of these read the tolerance active on the current thread at the
//! moment each comparison is made. The sequence comparisons are lazy,
//! so an iterator consumed outside of a scope sees the tolerance in
//! effect where it is consumed, not where it was created.

use super::ApproxValue;

use itertools::{EitherOrBoth, Itertools};

use std::fmt::{self, Display, Formatter};

/// One of the six comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
  Eq,
  Ne,
  Le,
  Lt,
  Ge,
  Gt,
}

impl Comparison {
  pub const ALL: [Comparison; 6] = [
    Comparison::Eq, Comparison::Ne, Comparison::Le,
    Comparison::Lt, Comparison::Ge, Comparison::Gt,
  ];

  /// Compares `left` to `right` with this operator, under the active
  /// tolerance.
  pub fn apply(self, left: impl Into<ApproxValue>, right: impl Into<ApproxValue>) -> bool {
    let left = left.into();
    let right = right.into();
    match self {
      Comparison::Eq => left == right,
      Comparison::Ne => left != right,
      Comparison::Le => left <= right,
      Comparison::Lt => left < right,
      Comparison::Ge => left >= right,
      Comparison::Gt => left > right,
    }
  }

  pub fn symbol(self) -> &'static str {
    match self {
      Comparison::Eq => "==",
      Comparison::Ne => "!=",
      Comparison::Le => "<=",
      Comparison::Lt => "<",
      Comparison::Ge => ">=",
      Comparison::Gt => ">",
    }
  }
}

impl Display for Comparison {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

/// The largest difference between `x` and `y` that still counts as
/// equal under the active tolerance.
pub fn tolerance(x: f64, y: f64) -> f64 {
  ApproxValue::new(x).tolerance(y)
}

pub fn eq(x: f64, y: f64) -> bool {
  Comparison::Eq.apply(x, y)
}

pub fn ne(x: f64, y: f64) -> bool {
  Comparison::Ne.apply(x, y)
}

pub fn le(x: f64, y: f64) -> bool {
  Comparison::Le.apply(x, y)
}

pub fn lt(x: f64, y: f64) -> bool {
  Comparison::Lt.apply(x, y)
}

pub fn ge(x: f64, y: f64) -> bool {
  Comparison::Ge.apply(x, y)
}

pub fn gt(x: f64, y: f64) -> bool {
  Comparison::Gt.apply(x, y)
}

/// Compares two sequences element by element.
///
/// If one sequence is shorter, it is padded with NaN. Since NaN is
/// never close to or ordered against anything, the extra positions
/// yield `true` for [`Comparison::Ne`] and `false` for every other
/// operator.
pub fn deep_compare<I, J>(op: Comparison, left: I, right: J) -> impl Iterator<Item = bool>
where I: IntoIterator,
      I::Item: Into<ApproxValue>,
      J: IntoIterator,
      J::Item: Into<ApproxValue> {
  left.into_iter().zip_longest(right).map(move |pair| {
    match pair {
      EitherOrBoth::Both(x, y) => op.apply(x, y),
      EitherOrBoth::Left(x) => op.apply(x, ApproxValue::NAN),
      EitherOrBoth::Right(y) => op.apply(ApproxValue::NAN, y),
    }
  })
}

/// Compares each element of `left` against the single value `right`.
pub fn deep_compare_scalar<I>(op: Comparison, left: I, right: impl Into<ApproxValue>) -> impl Iterator<Item = bool>
where I: IntoIterator,
      I::Item: Into<ApproxValue> {
  let right = right.into();
  left.into_iter().map(move |x| op.apply(x, right))
}

/// Compares the single value `left` against each element of `right`.
pub fn deep_compare_scalar_left<J>(op: Comparison, left: impl Into<ApproxValue>, right: J) -> impl Iterator<Item = bool>
where J: IntoIterator,
      J::Item: Into<ApproxValue> {
  let left = left.into();
  right.into_iter().map(move |y| op.apply(left, y))
}

macro_rules! deep_shorthand {
  ($($name: ident => $op: ident),* $(,)?) => {
    $(
      #[doc = concat!("[`deep_compare`] with [`Comparison::", stringify!($op), "`].")]
      pub fn $name<I, J>(left: I, right: J) -> impl Iterator<Item = bool>
      where I: IntoIterator,
            I::Item: Into<ApproxValue>,
            J: IntoIterator,
            J::Item: Into<ApproxValue> {
        deep_compare(Comparison::$op, left, right)
      }
    )*
  };
}

deep_shorthand! {
  deep_eq => Eq,
  deep_ne => Ne,
  deep_le => Le,
  deep_lt => Lt,
  deep_ge => Ge,
  deep_gt => Gt,
}
