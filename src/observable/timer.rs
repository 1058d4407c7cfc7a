use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, TaskHandle, TaskState, VirtualClock},
  type_hint::TypeHint,
};

/// Emits `value` once `delay` has passed on `clock`, then completes.
///
/// This is the shape of a simulated request: subscribe to start it,
/// unsubscribe to abort it before it answers.
pub fn delayed<T, Err>(clock: &VirtualClock, value: T, delay: Duration) -> Delayed<T, Err> {
  Delayed { clock: clock.clone(), value, delay, _hint: TypeHint::new() }
}

/// Emits `0` once `delay` has passed on `clock`, then completes.
pub fn timer<Err>(clock: &VirtualClock, delay: Duration) -> Delayed<usize, Err> {
  delayed(clock, 0, delay)
}

#[derive(Clone)]
pub struct Delayed<T, Err> {
  clock: VirtualClock,
  value: T,
  delay: Duration,
  _hint: TypeHint<Err>,
}

impl<T, Err, O> Observable<T, Err, O> for Delayed<T, Err>
where
  T: 'static,
  O: Observer<T, Err> + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { clock, value, delay, .. } = self;
    let mut pending = Some((value, observer));
    clock.schedule(delay, move || {
      if let Some((value, mut observer)) = pending.take() {
        if !observer.is_closed() {
          observer.next(value);
          observer.complete();
        }
      }
      TaskState::Finished
    })
  }
}

impl<T, Err> ObservableExt<T, Err> for Delayed<T, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use super::*;
  use crate::subscription::Subscription;

  #[test]
  fn emits_after_delay_then_completes() {
    let clock = VirtualClock::new();
    let log = Rc::new(RefCell::new(vec![]));

    let (l1, l2) = (log.clone(), log.clone());
    delayed::<_, Infallible>(&clock, "pong", Duration::from_millis(300)).subscribe_all(
      move |v| l1.borrow_mut().push(v),
      |_| {},
      move || l2.borrow_mut().push("done"),
    );

    clock.advance_by(Duration::from_millis(299));
    assert!(log.borrow().is_empty());
    clock.advance_by(Duration::from_millis(1));
    assert_eq!(*log.borrow(), vec!["pong", "done"]);
  }

  #[test]
  fn unsubscribe_before_due_aborts() {
    let clock = VirtualClock::new();
    let fired = Rc::new(RefCell::new(false));
    let f = fired.clone();
    let subscription = timer::<Infallible>(&clock, Duration::from_millis(5))
      .subscribe(move |_| *f.borrow_mut() = true);

    subscription.unsubscribe();
    clock.flush();
    assert!(!*fired.borrow());
  }
}
