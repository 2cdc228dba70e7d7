
//! Arithmetic on [`ApproxValue`].
//!
//! Every operator accepts anything convertible into an `ApproxValue`
//! on the right-hand side, and the common primitive types on the
//! left-hand side. The result is always a fresh `ApproxValue` computed
//! from the two magnitudes with ordinary `f64` arithmetic, so IEEE
//! behavior (infinities and NaN on division by zero) carries through
//! untouched.

use super::{ApproxValue, rem_floor};

use num::traits::Pow;

use std::iter::{Sum, Product};
use std::ops::{Add, AddAssign, Sub, SubAssign, Mul, MulAssign, Div, DivAssign, Rem, RemAssign, Neg};

macro_rules! impl_binary_op {
  (impl $trait_: ident { fn $method: ident } => $op: expr;) => {
    impl<T: Into<ApproxValue>> $trait_<T> for ApproxValue {
      type Output = ApproxValue;

      fn $method(self, rhs: T) -> ApproxValue {
        let op: fn(f64, f64) -> f64 = $op;
        ApproxValue::new(op(self.magnitude, rhs.into().magnitude))
      }
    }

    impl<T: Into<ApproxValue>> $trait_<T> for &ApproxValue {
      type Output = ApproxValue;

      fn $method(self, rhs: T) -> ApproxValue {
        (*self).$method(rhs)
      }
    }
  };
}

/// Operations with a primitive on the left. The primitive is widened
/// to `f64` before the operator is applied, preserving operand order.
macro_rules! impl_reflected_op {
  (impl $trait_: ident { fn $method: ident } for $($type_: ty),*) => {
    $(
      impl $trait_<ApproxValue> for $type_ {
        type Output = ApproxValue;

        fn $method(self, rhs: ApproxValue) -> ApproxValue {
          ApproxValue::from(self).$method(rhs)
        }
      }

      impl $trait_<&ApproxValue> for $type_ {
        type Output = ApproxValue;

        fn $method(self, rhs: &ApproxValue) -> ApproxValue {
          ApproxValue::from(self).$method(*rhs)
        }
      }
    )*
  };
}

/// Compound assignment rebinds the variable to a new value computed by
/// the matching binary operator.
macro_rules! impl_assign_op {
  (impl $trait_: ident { fn $method: ident } => $op: ident) => {
    impl<T: Into<ApproxValue>> $trait_<T> for ApproxValue {
      fn $method(&mut self, rhs: T) {
        *self = (*self).$op(rhs);
      }
    }
  };
}

impl_binary_op! { impl Add { fn add } => |a, b| a + b; }
impl_binary_op! { impl Sub { fn sub } => |a, b| a - b; }
impl_binary_op! { impl Mul { fn mul } => |a, b| a * b; }
impl_binary_op! { impl Div { fn div } => |a, b| a / b; }
impl_binary_op! { impl Pow { fn pow } => f64::powf; }

// Remainder takes the sign of the divisor, consistent with
// `ApproxValue::div_floor`, rather than the sign of the dividend as
// `f64::rem` does.
impl_binary_op! { impl Rem { fn rem } => rem_floor; }

impl_reflected_op! { impl Add { fn add } for f64, f32, i8, i16, i32, u8, u16, u32 }
impl_reflected_op! { impl Sub { fn sub } for f64, f32, i8, i16, i32, u8, u16, u32 }
impl_reflected_op! { impl Mul { fn mul } for f64, f32, i8, i16, i32, u8, u16, u32 }
impl_reflected_op! { impl Div { fn div } for f64, f32, i8, i16, i32, u8, u16, u32 }
impl_reflected_op! { impl Rem { fn rem } for f64, f32, i8, i16, i32, u8, u16, u32 }
impl_reflected_op! { impl Pow { fn pow } for f64, f32, i8, i16, i32, u8, u16, u32 }

impl_assign_op! { impl AddAssign { fn add_assign } => add }
impl_assign_op! { impl SubAssign { fn sub_assign } => sub }
impl_assign_op! { impl MulAssign { fn mul_assign } => mul }
impl_assign_op! { impl DivAssign { fn div_assign } => div }
impl_assign_op! { impl RemAssign { fn rem_assign } => rem }

impl Neg for ApproxValue {
  type Output = ApproxValue;

  fn neg(self) -> ApproxValue {
    ApproxValue::new(- self.magnitude)
  }
}

impl Neg for &ApproxValue {
  type Output = ApproxValue;

  fn neg(self) -> ApproxValue {
    (*self).neg()
  }
}

impl Sum for ApproxValue {
  fn sum<I: Iterator<Item = ApproxValue>>(iter: I) -> ApproxValue {
    iter.fold(ApproxValue::ZERO, Add::add)
  }
}

impl<'a> Sum<&'a ApproxValue> for ApproxValue {
  fn sum<I: Iterator<Item = &'a ApproxValue>>(iter: I) -> ApproxValue {
    iter.fold(ApproxValue::ZERO, Add::add)
  }
}

impl Product for ApproxValue {
  fn product<I: Iterator<Item = ApproxValue>>(iter: I) -> ApproxValue {
    iter.fold(ApproxValue::ONE, Mul::mul)
  }
}

impl<'a> Product<&'a ApproxValue> for ApproxValue {
  fn product<I: Iterator<Item = &'a ApproxValue>>(iter: I) -> ApproxValue {
    iter.fold(ApproxValue::ONE, Mul::mul)
  }
}
