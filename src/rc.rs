//! Single-threaded shared cells.
//!
//! Every subject, flattening job and clock in this crate lives on one logical
//! timeline, so shared state is an `Rc<RefCell<_>>`. A conflicting borrow is a
//! re-entrancy bug in the caller and panics, the same way `RefCell` does.

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::{Rc, Weak},
};

/// Shared, mutable ownership of `T`.
#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

/// A non-owning handle to a [`MutRc`].
pub struct MutWeak<T>(Weak<RefCell<T>>);

impl<T> MutRc<T> {
  #[inline]
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Borrow mutably unless the value is already borrowed somewhere up the
  /// call stack.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Option<RefMut<'_, T>> { self.0.try_borrow_mut().ok() }

  #[inline]
  pub fn downgrade(&self) -> MutWeak<T> { MutWeak(Rc::downgrade(&self.0)) }
}

impl<T> MutWeak<T> {
  #[inline]
  pub fn upgrade(&self) -> Option<MutRc<T>> { self.0.upgrade().map(MutRc) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for MutWeak<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn weak_handle_does_not_keep_value_alive() {
    let strong = MutRc::own(1);
    let weak = strong.downgrade();
    assert_eq!(weak.upgrade().map(|rc| *rc.rc_deref()), Some(1));

    drop(strong);
    assert!(weak.upgrade().is_none());
  }

  #[test]
  fn try_borrow_fails_while_borrowed() {
    let cell = MutRc::own(vec![1]);
    let guard = cell.rc_deref_mut();
    assert!(cell.try_rc_deref_mut().is_none());
    drop(guard);
    cell.try_rc_deref_mut().unwrap().push(2);
    assert_eq!(*cell.rc_deref(), vec![1, 2]);
  }
}
