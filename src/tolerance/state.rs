use super::Tolerance;
use super::error::ToleranceError;

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of scope identities. Shared by every [`ToleranceState`], so
/// a handle issued by one state never matches a scope of another.
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// The active tolerance, together with a stack of suspended
/// tolerances belonging to enclosing scopes.
///
/// Every [`ToleranceState::push_scope`] must be matched by exactly one
/// [`ToleranceState::pop_scope`], in last-in-first-out order. Outside
/// of any scope, the stack is empty. Prefer [`ToleranceState::scope`],
/// which pairs the two automatically.
#[derive(Clone, Debug, Default)]
pub struct ToleranceState {
  current: Tolerance,
  saved: Vec<SavedScope>,
}

#[derive(Clone, Copy, Debug)]
struct SavedScope {
  id: u64,
  outer: Tolerance,
}

/// Proof of a single [`ToleranceState::push_scope`] call, redeemed by
/// the matching [`ToleranceState::pop_scope`].
///
/// A handle identifies exactly one scope. It does not match a later
/// scope that happens to sit at the same depth, and it does not match
/// anything on another state. Handles cannot be cloned, so each scope
/// is popped at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a scope that is never popped leaves its tolerance active"]
pub struct ScopeHandle {
  depth: usize,
  id: u64,
}

/// Scoped override of a [`ToleranceState`]. The tolerance active
/// before the guard was created is restored when the guard is
/// dropped, including during unwinding.
///
/// The guard dereferences to the underlying state, so comparisons and
/// further (nested) scopes go through it while it is alive.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
  state: &'a mut ToleranceState,
  handle: Option<ScopeHandle>,
}

impl ToleranceState {
  /// A state holding the default tolerance and no scopes.
  pub fn new() -> Self {
    Self::default()
  }

  /// A state holding the given tolerance and no scopes.
  pub fn with_tolerance(tolerance: Tolerance) -> Self {
    ToleranceState {
      current: tolerance,
      saved: Vec::new(),
    }
  }

  /// The tolerance all comparisons should currently use.
  pub fn get_current(&self) -> Tolerance {
    self.current
  }

  /// The number of scopes currently suspended on the stack.
  pub fn depth(&self) -> usize {
    self.saved.len()
  }

  /// Replaces the active tolerance in place. `None` keeps the
  /// corresponding component. On error, the state is left untouched.
  ///
  /// Inside a scope, the update only lasts until that scope is
  /// popped, since popping restores the saved outer tolerance.
  pub fn set_permanent(&mut self, rtol: Option<f64>, atol: Option<f64>) -> Result<(), ToleranceError> {
    self.current = self.current.with_overrides(rtol, atol)?;
    tracing::debug!(tolerance = %self.current, "tolerance updated");
    Ok(())
  }

  /// Suspends the active tolerance and activates a new one, built
  /// from the suspended tolerance and the given overrides.
  ///
  /// Invalid overrides fail before anything is pushed.
  pub fn push_scope(&mut self, rtol: Option<f64>, atol: Option<f64>) -> Result<ScopeHandle, ToleranceError> {
    let inner = self.current.with_overrides(rtol, atol)?;
    let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
    self.saved.push(SavedScope { id, outer: self.current });
    self.current = inner;
    tracing::debug!(depth = self.depth(), tolerance = %inner, "tolerance scope entered");
    Ok(ScopeHandle { depth: self.depth(), id })
  }

  /// Ends the scope identified by `handle`, restoring the tolerance
  /// that was active when it was pushed. Returns the tolerance that
  /// was active inside the scope.
  ///
  /// Fails with [`ToleranceError::ScopeMismatch`] unless `handle`
  /// names the innermost scope of this state. That covers an empty
  /// stack, an outer scope, a scope already discarded by
  /// [`ToleranceState::reset`], and a handle from another state. The
  /// state is left untouched in every case.
  pub fn pop_scope(&mut self, handle: ScopeHandle) -> Result<Tolerance, ToleranceError> {
    match self.saved.last() {
      Some(top) if top.id == handle.id && handle.depth == self.depth() => {}
      _ => {
        return Err(ToleranceError::ScopeMismatch {
          expected: handle.depth,
          depth: self.depth(),
        });
      }
    }
    Ok(self.unwind_to(self.depth() - 1))
  }

  /// Pushes a scope and returns a guard which pops it on drop.
  pub fn scope(&mut self, rtol: Option<f64>, atol: Option<f64>) -> Result<ScopeGuard<'_>, ToleranceError> {
    let handle = self.push_scope(rtol, atol)?;
    Ok(ScopeGuard { state: self, handle: Some(handle) })
  }

  /// Discards every scope and restores the default tolerance.
  pub fn reset(&mut self) {
    self.saved.clear();
    self.current = Tolerance::DEFAULT;
  }

  /// Ends the scope with the given id together with every scope still
  /// open inside it. Returns the number of scopes ended, or `None` if
  /// the scope is no longer on the stack.
  pub(super) fn unwind_scope(&mut self, id: u64) -> Option<usize> {
    let index = self.saved.iter().rposition(|scope| scope.id == id)?;
    let count = self.depth() - index;
    self.unwind_to(index);
    Some(count)
  }

  /// Pops scopes until `depth` remain. Returns the tolerance that was
  /// active before the pops.
  fn unwind_to(&mut self, depth: usize) -> Tolerance {
    let inner = self.current;
    if let Some(scope) = self.saved.get(depth) {
      self.current = scope.outer;
      self.saved.truncate(depth);
      tracing::debug!(depth, tolerance = %self.current, "tolerance scope exited");
    }
    inner
  }
}

impl ScopeHandle {
  /// The stack depth this scope was pushed at, counting from 1.
  pub fn depth(&self) -> usize {
    self.depth
  }

  pub(super) fn id(&self) -> u64 {
    self.id
  }
}

impl<'a> Deref for ScopeGuard<'a> {
  type Target = ToleranceState;

  fn deref(&self) -> &ToleranceState {
    self.state
  }
}

impl<'a> DerefMut for ScopeGuard<'a> {
  fn deref_mut(&mut self) -> &mut ToleranceState {
    self.state
  }
}

impl<'a> Drop for ScopeGuard<'a> {
  fn drop(&mut self) {
    // The borrow held by the guard rules out pushes that outlive it,
    // but `reset` through `DerefMut` can still empty the stack.
    if let Some(handle) = self.handle.take() {
      if let Err(err) = self.state.pop_scope(handle) {
        tracing::warn!(%err, "tolerance scope was already unwound");
      }
    }
  }
}
