use tracing::debug;

use crate::{
  error::TimeoutError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutRc,
  scheduler::{Duration, TaskHandle, TaskState, VirtualClock},
  subscription::{BoxedSubscription, IntoBoxedSubscription, Subscription},
};

/// Fails the stream with a [`TimeoutError`] when the source stays silent
/// for longer than `duration`.
///
/// The deadline starts at subscription and restarts after every value.
/// When it passes, the source is unsubscribed before the error is
/// delivered, so a late value never follows the error.
#[derive(Clone)]
pub struct TimeoutOp<S> {
  pub(crate) source: S,
  pub(crate) clock: VirtualClock,
  pub(crate) duration: Duration,
}

struct TimeoutState<O> {
  observer: Option<O>,
  deadline: Option<TaskHandle>,
  source: Option<BoxedSubscription>,
  done: bool,
}

impl<O> TimeoutState<O> {
  /// Stop everything; the caller releases the borrow, then unsubscribes and
  /// drops what is returned.
  fn shut_down(&mut self) -> (Option<O>, Option<TaskHandle>, Option<BoxedSubscription>) {
    self.done = true;
    (self.observer.take(), self.deadline.take(), self.source.take())
  }
}

pub struct TimeoutObserver<O> {
  state: MutRc<TimeoutState<O>>,
  clock: VirtualClock,
  duration: Duration,
}

fn arm_deadline<Item, Err, O>(
  state: &MutRc<TimeoutState<O>>, clock: &VirtualClock, duration: Duration,
) -> TaskHandle
where
  O: Observer<Item, Err> + 'static,
  Err: From<TimeoutError>,
{
  let state = state.clone();
  clock.schedule(duration, move || {
    let (observer, _, source) = state.rc_deref_mut().shut_down();
    source.unsubscribe();
    if let Some(observer) = observer {
      debug!(after = ?duration, "stream timed out");
      observer.error(Err::from(TimeoutError { after: duration }));
    }
    TaskState::Finished
  })
}

impl<Item, Err, O> Observer<Item, Err> for TimeoutObserver<O>
where
  O: Observer<Item, Err> + 'static,
  Err: From<TimeoutError>,
{
  fn next(&mut self, value: Item) {
    let (observer, deadline) = {
      let mut state = self.state.rc_deref_mut();
      (state.observer.take(), state.deadline.take())
    };
    deadline.unsubscribe();
    let Some(mut observer) = observer else {
      return;
    };
    observer.next(value);

    let mut state = self.state.rc_deref_mut();
    if !state.done {
      state.observer = Some(observer);
      state.deadline = Some(arm_deadline::<Item, Err, O>(&self.state, &self.clock, self.duration));
    }
  }

  fn error(self, err: Err) {
    let (observer, deadline, _) = self.state.rc_deref_mut().shut_down();
    deadline.unsubscribe();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let (observer, deadline, _) = self.state.rc_deref_mut().shut_down();
    deadline.unsubscribe();
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    let state = self.state.rc_deref();
    state.done || state.observer.as_ref().is_some_and(O::is_closed)
  }
}

/// Cancels both the source and the pending deadline.
pub struct TimeoutSubscription<O>(MutRc<TimeoutState<O>>);

impl<O> Subscription for TimeoutSubscription<O> {
  fn unsubscribe(self) {
    let (observer, deadline, source) = self.0.rc_deref_mut().shut_down();
    deadline.unsubscribe();
    source.unsubscribe();
    drop(observer);
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().done }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TimeoutOp<S>
where
  O: Observer<Item, Err> + 'static,
  Err: From<TimeoutError>,
  S: Observable<Item, Err, TimeoutObserver<O>>,
  S::Unsub: 'static,
{
  type Unsub = TimeoutSubscription<O>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, clock, duration } = self;
    let state = MutRc::own(TimeoutState {
      observer: Some(observer),
      deadline: None,
      source: None,
      done: false,
    });
    let deadline = arm_deadline::<Item, Err, O>(&state, &clock, duration);
    state.rc_deref_mut().deadline = Some(deadline);

    let unsub = source.actual_subscribe(TimeoutObserver { state: state.clone(), clock, duration });
    let finished = {
      let mut guard = state.rc_deref_mut();
      if guard.done {
        Some(unsub)
      } else {
        guard.source = Some(unsub.into_boxed());
        None
      }
    };
    if let Some(unsub) = finished {
      unsub.unsubscribe();
    }
    TimeoutSubscription(state)
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TimeoutOp<S> where S: ObservableExt<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  type Log = Rc<RefCell<Vec<String>>>;

  fn log_all<S>(stream: S, log: &Log)
  where
    S: ObservableExt<&'static str, StreamError>,
    S: Observable<
      &'static str,
      StreamError,
      FnObserver<Box<dyn FnMut(&'static str)>, Box<dyn FnOnce(StreamError)>, Box<dyn FnOnce()>>,
    >,
  {
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let next: Box<dyn FnMut(&'static str)> = Box::new(move |v| l1.borrow_mut().push(v.to_string()));
    let error: Box<dyn FnOnce(StreamError)> =
      Box::new(move |e| l2.borrow_mut().push(format!("error: {e}")));
    let complete: Box<dyn FnOnce()> = Box::new(move || l3.borrow_mut().push("complete".into()));
    stream.subscribe_all(next, error, complete);
  }

  #[test]
  fn value_within_deadline_passes() {
    let clock = VirtualClock::new();
    let log = Log::default();
    let source = delayed(&clock, "fast", Duration::from_millis(100));
    log_all(source.timeout(&clock, Duration::from_millis(500)), &log);

    clock.flush();
    assert_eq!(*log.borrow(), vec!["fast", "complete"]);
  }

  #[test]
  fn silent_source_times_out_and_is_cancelled() {
    let clock = VirtualClock::new();
    let log = Log::default();
    let source = delayed(&clock, "slow", Duration::from_millis(800));
    log_all(source.timeout(&clock, Duration::from_millis(500)), &log);

    clock.flush();
    assert_eq!(*log.borrow(), vec!["error: no value within 500ms"]);
    assert_eq!(clock.now(), Duration::from_millis(500));
  }

  #[test]
  fn deadline_restarts_after_each_value() {
    let clock = VirtualClock::new();
    let log = Log::default();
    log_all(
      interval(&clock, Duration::from_millis(300))
        .take(3)
        .map(|_| "tick")
        .timeout(&clock, Duration::from_millis(500)),
      &log,
    );

    clock.flush();
    assert_eq!(*log.borrow(), vec!["tick", "tick", "tick", "complete"]);
  }

  #[test]
  fn timeout_recovered_with_fallback() {
    let clock = VirtualClock::new();
    let log = Log::default();
    log_all(
      delayed(&clock, "slow", Duration::from_millis(800))
        .timeout(&clock, Duration::from_millis(500))
        .catch_error(|_| "fallback"),
      &log,
    );

    clock.flush();
    assert_eq!(*log.borrow(), vec!["fallback", "complete"]);
  }

  #[test]
  fn unsubscribe_cancels_deadline() {
    let clock = VirtualClock::new();
    let log = Log::default();
    let (l1, l2) = (log.clone(), log.clone());
    let subscription = delayed::<_, StreamError>(&clock, "slow", Duration::from_millis(800))
      .timeout(&clock, Duration::from_millis(500))
      .subscribe_err(
        move |v| l1.borrow_mut().push(v.to_string()),
        move |e| l2.borrow_mut().push(e.to_string()),
      );

    subscription.unsubscribe();
    clock.flush();
    assert!(log.borrow().is_empty());
  }
}
