
//! The tolerance consulted by the comparison operators of
//! [`ApproxValue`](crate::value::ApproxValue).
//!
//! Each thread owns one [`ToleranceState`], created with the default
//! tolerance the first time it is touched. Changes made on one thread
//! are never visible on another, and the scope guards handed out here
//! cannot leave the thread that created them.

use super::{Tolerance, ToleranceState, ScopeHandle};
use super::error::ToleranceError;

use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
  static ACTIVE: RefCell<ToleranceState> = RefCell::new(ToleranceState::new());
}

/// Scoped override of the active tolerance, returned by [`scoped`].
/// Dropping the guard restores the tolerance that was active when it
/// was created.
#[derive(Debug)]
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ActiveScope {
  depth: usize,
  id: u64,
  _not_send: PhantomData<*const ()>,
}

fn with_active<R>(f: impl FnOnce(&mut ToleranceState) -> R) -> R {
  ACTIVE.with(|state| f(&mut state.borrow_mut()))
}

/// The tolerance currently active on this thread.
pub fn current() -> Tolerance {
  with_active(|state| state.get_current())
}

/// The number of scopes currently open on this thread.
pub fn depth() -> usize {
  with_active(|state| state.depth())
}

/// See [`ToleranceState::set_permanent`].
pub fn set_permanent(rtol: Option<f64>, atol: Option<f64>) -> Result<(), ToleranceError> {
  with_active(|state| state.set_permanent(rtol, atol))
}

/// See [`ToleranceState::push_scope`]. Most callers want [`scoped`]
/// or [`with_tolerance`] instead.
pub fn push_scope(rtol: Option<f64>, atol: Option<f64>) -> Result<ScopeHandle, ToleranceError> {
  with_active(|state| state.push_scope(rtol, atol))
}

/// See [`ToleranceState::pop_scope`].
pub fn pop_scope(handle: ScopeHandle) -> Result<Tolerance, ToleranceError> {
  with_active(|state| state.pop_scope(handle))
}

/// Discards every open scope on this thread and restores the default
/// tolerance.
pub fn reset() {
  with_active(|state| state.reset())
}

/// Opens a scope with the given overrides. The scope lasts until the
/// returned guard is dropped.
///
/// ```
/// # use approxval::tolerance::active;
/// # use approxval::value::ApproxValue;
/// let _scope = active::scoped(Some(0.0), Some(0.0))?;
/// assert!(ApproxValue::new(0.1) * 3.0 != 0.3);
/// # Ok::<(), approxval::tolerance::ToleranceError>(())
/// ```
pub fn scoped(rtol: Option<f64>, atol: Option<f64>) -> Result<ActiveScope, ToleranceError> {
  with_active(|state| {
    let handle = state.push_scope(rtol, atol)?;
    Ok(ActiveScope { depth: handle.depth(), id: handle.id(), _not_send: PhantomData })
  })
}

/// Runs `f` with the given overrides in effect. The previous
/// tolerance is restored afterward, even if `f` panics.
pub fn with_tolerance<R>(
  rtol: Option<f64>,
  atol: Option<f64>,
  f: impl FnOnce() -> R,
) -> Result<R, ToleranceError> {
  let _scope = scoped(rtol, atol)?;
  Ok(f())
}

impl ActiveScope {
  /// The stack depth of this scope, counting from 1.
  pub fn depth(&self) -> usize {
    self.depth
  }
}

impl Drop for ActiveScope {
  fn drop(&mut self) {
    // Guards can be moved around and dropped in any order, so this
    // cannot rely on `pop_scope`. Unwind this scope and everything
    // opened inside it, if it is still on the stack at all.
    let result = ACTIVE.try_with(|state| {
      match state.borrow_mut().unwind_scope(self.id) {
        None => {
          tracing::warn!(scope = self.depth, "tolerance scope was already unwound");
        }
        Some(count) if count > 1 => {
          tracing::warn!(scope = self.depth, inner = count - 1, "unwound tolerance scopes left open inside this one");
        }
        Some(_) => {}
      }
    });
    if result.is_err() {
      // Thread-local storage is being torn down; nothing to restore.
      tracing::trace!(scope = self.depth, "tolerance scope dropped during thread exit");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::panic;
  use std::thread;

  fn tol(rtol: f64, atol: f64) -> Tolerance {
    Tolerance::new(rtol, atol).unwrap()
  }

  #[test]
  fn test_defaults_on_fresh_thread() {
    thread::spawn(|| {
      assert_eq!(current(), Tolerance::DEFAULT);
      assert_eq!(depth(), 0);
    }).join().unwrap();
  }

  #[test]
  fn test_set_permanent() {
    set_permanent(Some(0.25), Some(0.5)).unwrap();
    assert_eq!(current(), tol(0.25, 0.5));
    assert!(set_permanent(Some(-0.25), None).is_err());
    assert_eq!(current(), tol(0.25, 0.5));
    reset();
    assert_eq!(current(), Tolerance::DEFAULT);
  }

  #[test]
  fn test_state_is_per_thread() {
    set_permanent(Some(0.25), None).unwrap();
    thread::spawn(|| {
      assert_eq!(current(), Tolerance::DEFAULT);
    }).join().unwrap();
    assert_eq!(current(), tol(0.25, 1e-9));
    reset();
  }

  #[test]
  fn test_scoped() {
    {
      let outer = scoped(Some(0.1), None).unwrap();
      assert_eq!(outer.depth(), 1);
      assert_eq!(current(), tol(0.1, 1e-9));
      {
        let inner = scoped(None, Some(0.2)).unwrap();
        assert_eq!(inner.depth(), 2);
        assert_eq!(current(), tol(0.1, 0.2));
      }
      assert_eq!(current(), tol(0.1, 1e-9));
    }
    assert_eq!(current(), Tolerance::DEFAULT);
    assert_eq!(depth(), 0);
  }

  #[test]
  fn test_scoped_with_invalid_override() {
    let err = scoped(None, Some(f64::NAN)).unwrap_err();
    assert!(matches!(err, ToleranceError::InvalidTolerance { name: "atol", .. }));
    assert_eq!(depth(), 0);
    assert_eq!(current(), Tolerance::DEFAULT);
  }

  #[test]
  fn test_with_tolerance() {
    let seen = with_tolerance(Some(0.0), Some(0.0), current).unwrap();
    assert_eq!(seen, Tolerance::EXACT);
    assert_eq!(current(), Tolerance::DEFAULT);
  }

  #[test]
  fn test_with_tolerance_restores_after_panic() {
    let result = panic::catch_unwind(|| {
      with_tolerance(Some(0.5), None, || -> i32 { panic!("boom") })
    });
    assert!(result.is_err());
    assert_eq!(current(), Tolerance::DEFAULT);
    assert_eq!(depth(), 0);
  }

  #[test]
  fn test_guards_dropped_out_of_order() {
    let outer = scoped(Some(0.1), None).unwrap();
    let inner = scoped(Some(0.2), None).unwrap();
    drop(outer);
    assert_eq!(current(), Tolerance::DEFAULT);
    assert_eq!(depth(), 0);
    drop(inner);
    assert_eq!(current(), Tolerance::DEFAULT);
    assert_eq!(depth(), 0);
  }

  #[test]
  fn test_guard_dropped_after_reset() {
    let stale = scoped(Some(0.1), None).unwrap();
    reset();
    let fresh = scoped(Some(0.2), None).unwrap();
    assert_eq!(stale.depth(), fresh.depth());
    drop(stale);
    assert_eq!(current(), tol(0.2, 1e-9));
    assert_eq!(depth(), 1);
    drop(fresh);
    assert_eq!(current(), Tolerance::DEFAULT);
    assert_eq!(depth(), 0);
  }

  #[test]
  fn test_inner_guard_outlives_unwound_outer() {
    let outer = scoped(Some(0.1), None).unwrap();
    let inner = scoped(Some(0.2), None).unwrap();
    drop(outer);
    let later = scoped(Some(0.3), None).unwrap();
    assert_eq!(later.depth(), 1);
    drop(inner);
    assert_eq!(current(), tol(0.3, 1e-9));
    assert_eq!(depth(), 1);
    drop(later);
    assert_eq!(current(), Tolerance::DEFAULT);
  }

  #[test]
  fn test_manual_push_and_pop() {
    let h1 = push_scope(Some(0.1), None).unwrap();
    let h2 = push_scope(Some(0.2), None).unwrap();
    let h3 = push_scope(Some(0.3), None).unwrap();
    assert_eq!(current(), tol(0.3, 1e-9));
    assert_eq!(pop_scope(h3), Ok(tol(0.3, 1e-9)));
    assert_eq!(current(), tol(0.2, 1e-9));
    assert_eq!(pop_scope(h2), Ok(tol(0.2, 1e-9)));
    assert_eq!(current(), tol(0.1, 1e-9));
    assert_eq!(pop_scope(h1), Ok(tol(0.1, 1e-9)));
    assert_eq!(current(), Tolerance::DEFAULT);
  }

  #[test]
  fn test_pop_out_of_order() {
    let h1 = push_scope(Some(0.1), None).unwrap();
    let h2 = push_scope(Some(0.2), None).unwrap();
    assert_eq!(pop_scope(h1), Err(ToleranceError::ScopeMismatch { expected: 1, depth: 2 }));
    assert_eq!(current(), tol(0.2, 1e-9));
    pop_scope(h2).unwrap();
    reset();
  }
}
