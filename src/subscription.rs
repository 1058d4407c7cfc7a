//! Subscription handles.
//!
//! A subscription is the opaque handle returned by attaching an observer. It
//! is the only link a consumer keeps to its producer.

mod boxed;
mod dynamic;
mod tuple;

pub use boxed::*;
pub use dynamic::*;
pub use tuple::*;

/// Handle used to detach an observer before its stream terminates.
pub trait Subscription {
  /// Detach the observer. Values produced afterwards are not delivered.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;

  /// Activates RAII behaviour: the returned guard unsubscribes when dropped.
  ///
  /// **Attention:** if the guard is not bound to a variable it is dropped,
  /// and the subscription cancelled, immediately.
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(Some(self))
  }
}

/// Subscription of a stream that finished synchronously while subscribing.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, S::is_closed) }
}

/// An RAII implementation of a scoped subscription. When this structure is
/// dropped, the subscription is unsubscribed.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard.
  pub fn new(subscription: T) -> Self { SubscriptionGuard(Some(subscription)) }

  /// Give up the RAII behaviour and return the plain subscription.
  pub fn into_inner(mut self) -> T {
    self
      .0
      .take()
      .expect("guard always holds its subscription until dropped")
  }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  struct Flag(Rc<Cell<bool>>);

  impl Subscription for Flag {
    fn unsubscribe(self) { self.0.set(true) }

    fn is_closed(&self) -> bool { self.0.get() }
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let closed = Rc::new(Cell::new(false));
    {
      let _guard = Flag(closed.clone()).unsubscribe_when_dropped();
      assert!(!closed.get());
    }
    assert!(closed.get());
  }

  #[test]
  fn into_inner_disarms_guard() {
    let closed = Rc::new(Cell::new(false));
    let guard = SubscriptionGuard::new(Flag(closed.clone()));
    let plain = guard.into_inner();
    assert!(!closed.get());
    plain.unsubscribe();
    assert!(closed.get());
  }
}
