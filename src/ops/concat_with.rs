use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutRc,
  subscription::{Subscription, TupleSubscription},
};

/// Forwards `first`, and once it completes, subscribes `second` with the
/// same observer.
///
/// An error from `first` ends the output; `second` never starts.
#[derive(Clone)]
pub struct ConcatWith<A, B> {
  pub(crate) first: A,
  pub(crate) second: B,
}

enum SecondSlot<U> {
  Waiting,
  Running(U),
  Cancelled,
}

/// Cancels the trailing stream, whether or not it started yet.
pub struct SecondSubscription<U>(MutRc<SecondSlot<U>>);

impl<U: Subscription> Subscription for SecondSubscription<U> {
  fn unsubscribe(self) {
    let slot = std::mem::replace(&mut *self.0.rc_deref_mut(), SecondSlot::Cancelled);
    if let SecondSlot::Running(unsub) = slot {
      unsub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    match &*self.0.rc_deref() {
      SecondSlot::Waiting => false,
      SecondSlot::Running(unsub) => unsub.is_closed(),
      SecondSlot::Cancelled => true,
    }
  }
}

pub struct ConcatFirstObserver<O, B, U> {
  observer: O,
  second: B,
  slot: MutRc<SecondSlot<U>>,
}

impl<Item, Err, O, B, U> Observer<Item, Err> for ConcatFirstObserver<O, B, U>
where
  O: Observer<Item, Err>,
  B: Observable<Item, Err, O, Unsub = U>,
  U: Subscription,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let Self { observer, second, slot } = self;
    if matches!(*slot.rc_deref(), SecondSlot::Cancelled) {
      return;
    }
    let unsub = second.actual_subscribe(observer);
    let cancelled = {
      let mut slot = slot.rc_deref_mut();
      if matches!(*slot, SecondSlot::Cancelled) {
        Some(unsub)
      } else {
        *slot = SecondSlot::Running(unsub);
        None
      }
    };
    if let Some(unsub) = cancelled {
      unsub.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.observer.is_closed() || matches!(*self.slot.rc_deref(), SecondSlot::Cancelled)
  }
}

impl<Item, Err, O, A, B> Observable<Item, Err, O> for ConcatWith<A, B>
where
  O: Observer<Item, Err>,
  B: Observable<Item, Err, O>,
  A: Observable<Item, Err, ConcatFirstObserver<O, B, <B as Observable<Item, Err, O>>::Unsub>>,
{
  type Unsub = TupleSubscription<A::Unsub, SecondSubscription<B::Unsub>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let slot = MutRc::own(SecondSlot::Waiting);
    let first = self.first.actual_subscribe(ConcatFirstObserver {
      observer,
      second: self.second,
      slot: slot.clone(),
    });
    TupleSubscription::new(first, SecondSubscription(slot))
  }
}

impl<Item, Err, A, B> ObservableExt<Item, Err> for ConcatWith<A, B>
where
  A: ObservableExt<Item, Err>,
{
}
