use smallvec::SmallVec;

use crate::{
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  subscription::DynamicSubscriptions,
};

/// One attached observer as the subject stores it.
///
/// The cell is shared between the subscriber set and in-flight delivery
/// snapshots, so detaching never races a pass that already started.
pub(crate) type SharedObserver<'a, Item, Err> = MutRc<Option<BoxedObserver<'a, Item, Err>>>;

/// Observers attached to a subject, in attachment order.
///
/// Delivery never iterates this container directly: it takes a
/// [`snapshot`](Self::snapshot) first and releases the subject's borrow, so
/// observers are free to attach, detach or emit while being notified.
pub(crate) struct Subscribers<Ob> {
  inner: DynamicSubscriptions<Ob>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { inner: DynamicSubscriptions::default() } }
}

impl<Ob> Subscribers<Ob> {
  #[inline]
  pub fn add(&mut self, observer: Ob) -> usize { self.inner.add(observer) }

  #[inline]
  pub fn remove(&mut self, id: usize) -> Option<Ob> { self.inner.remove(id) }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.inner.contains(id) }

  #[inline]
  pub fn len(&self) -> usize { self.inner.len() }

  #[inline]
  pub fn retain(&mut self, keep: impl FnMut(&Ob) -> bool) { self.inner.retain(keep) }

  /// Detach everyone, returning the observers in attachment order.
  #[inline]
  pub fn drain(&mut self) -> SmallVec<[Ob; 2]> { self.inner.take_all() }
}

impl<Ob: Clone> Subscribers<Ob> {
  /// The current observers, in attachment order.
  pub fn snapshot(&self) -> SmallVec<[Ob; 2]> { self.inner.iter().cloned().collect() }
}

/// Broadcast `value` to `observers` in order.
///
/// The value is cloned for every observer but the last, which receives the
/// moved value.
pub(crate) fn broadcast_value<Item, Err>(
  observers: &mut [SharedObserver<'_, Item, Err>], value: Item,
) where
  Item: Clone,
{
  let mut iter = observers.iter_mut().peekable();
  while let Some(observer) = iter.next() {
    if iter.peek().is_some() {
      Observer::<Item, Err>::next(observer, value.clone());
    } else {
      Observer::<Item, Err>::next(observer, value);
      break;
    }
  }
}

/// Deliver `err` to every observer, consuming them.
pub(crate) fn broadcast_error<Item, Err>(
  observers: SmallVec<[SharedObserver<'_, Item, Err>; 2]>, err: Err,
) where
  Err: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(observer) = iter.next() {
    if iter.peek().is_some() {
      Observer::<Item, Err>::error(observer, err.clone());
    } else {
      Observer::<Item, Err>::error(observer, err);
      break;
    }
  }
}

/// Complete every observer, consuming them.
pub(crate) fn broadcast_complete<Item, Err>(
  observers: SmallVec<[SharedObserver<'_, Item, Err>; 2]>,
) {
  for observer in observers {
    Observer::<Item, Err>::complete(observer);
  }
}
