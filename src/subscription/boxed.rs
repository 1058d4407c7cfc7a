use super::Subscription;

/// Object-safe mirror of [`Subscription`]: `unsubscribe(self)` cannot be
/// called through a `dyn`, `boxed_unsubscribe(self: Box<Self>)` can.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription.
///
/// Flattening jobs keep one of these per active inner stream, and one for
/// their source, so heterogeneous subscription types fit in one collection.
/// Subscriptions are owned control handles, hence `'static`.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

/// Conversion into a [`BoxedSubscription`].
pub trait IntoBoxedSubscription {
  fn into_boxed(self) -> BoxedSubscription;
}

impl<T: Subscription + 'static> IntoBoxedSubscription for T {
  #[inline]
  fn into_boxed(self) -> BoxedSubscription { BoxedSubscription::new(self) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;
  use crate::scheduler::{Duration, TaskState, VirtualClock};

  #[test]
  fn erased_task_handle_cancels_the_task() {
    let clock = VirtualClock::new();
    let ran = Rc::new(Cell::new(false));
    let r = ran.clone();
    let boxed = clock
      .schedule(Duration::from_millis(1), move || {
        r.set(true);
        TaskState::Finished
      })
      .into_boxed();

    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    clock.flush();
    assert!(!ran.get());
  }

  #[test]
  fn finished_source_boxes_as_closed() {
    let boxed = ().into_boxed();
    assert!(boxed.is_closed());
    boxed.unsubscribe();
  }
}
