use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, TaskHandle, TaskState, VirtualClock},
  type_hint::TypeHint,
};

/// Emits `0, 1, 2, ...` on `clock`, one value every `period`, starting one
/// period after subscription. Never completes on its own; bound it with
/// `take` or unsubscribe.
///
/// ```rust
/// use std::{cell::RefCell, convert::Infallible, rc::Rc};
///
/// use rxcast::prelude::*;
///
/// let clock = VirtualClock::new();
/// let ticks = Rc::new(RefCell::new(vec![]));
/// let t = ticks.clone();
/// interval::<Infallible>(&clock, Duration::from_millis(100))
///   .take(3)
///   .subscribe(move |v| t.borrow_mut().push(v));
///
/// clock.advance_by(Duration::from_millis(250));
/// assert_eq!(*ticks.borrow(), vec![0, 1]);
/// clock.flush();
/// assert_eq!(*ticks.borrow(), vec![0, 1, 2]);
/// ```
pub fn interval<Err>(clock: &VirtualClock, period: Duration) -> Interval<Err> {
  Interval { clock: clock.clone(), period, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct Interval<Err> {
  clock: VirtualClock,
  period: Duration,
  _hint: TypeHint<Err>,
}

impl<Err, O> Observable<usize, Err, O> for Interval<Err>
where
  O: Observer<usize, Err> + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let Self { clock, period, .. } = self;
    let mut seq = 0;
    clock.schedule(period, move || {
      if observer.is_closed() {
        return TaskState::Finished;
      }
      observer.next(seq);
      seq += 1;
      if observer.is_closed() { TaskState::Finished } else { TaskState::Sleeping(period) }
    })
  }
}

impl<Err> ObservableExt<usize, Err> for Interval<Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use super::*;
  use crate::subscription::Subscription;

  #[test]
  fn ticks_follow_virtual_time() {
    let clock = VirtualClock::new();
    let ticks = Rc::new(RefCell::new(vec![]));

    let (t, c) = (ticks.clone(), clock.clone());
    let subscription = interval::<Infallible>(&clock, Duration::from_millis(10))
      .subscribe(move |v| t.borrow_mut().push((v, c.now().as_millis())));

    clock.advance_by(Duration::from_millis(35));
    assert_eq!(*ticks.borrow(), vec![(0, 10), (1, 20), (2, 30)]);

    subscription.unsubscribe();
    clock.advance_by(Duration::from_millis(100));
    assert_eq!(ticks.borrow().len(), 3);
  }

  #[test]
  fn take_lets_the_clock_drain() {
    let clock = VirtualClock::new();
    let count = Rc::new(RefCell::new(0));
    let c = count.clone();
    interval::<Infallible>(&clock, Duration::from_millis(1))
      .take(4)
      .subscribe(move |_| *c.borrow_mut() += 1);

    clock.flush();
    assert_eq!(*count.borrow(), 4);
    assert!(clock.is_empty());
  }
}
