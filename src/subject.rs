//! Multicast subjects.
//!
//! A [`Subject`] is both ends of a hot stream: producers push through its
//! [`Observer`] implementation, consumers attach through its [`Observable`]
//! implementation, and every attached consumer shares one timeline.
//!
//! The four variants differ only in what a subject remembers and replays:
//!
//! | Variant | Attach while live | Attach after the terminal signal |
//! |---|---|---|
//! | [`basic`](Subject::basic) | nothing | the terminal signal |
//! | [`behavior`](Subject::behavior) | the current value | the terminal signal |
//! | [`replay`](Subject::replay) | the last N values | the last N values, then the terminal signal |
//! | [`async_subject`](Subject::async_subject) | nothing | the last value (if completed), then the terminal signal |
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use rxcast::prelude::*;
//!
//! let subject = Subject::<&str, Infallible>::replay(2);
//! let mut producer = subject.clone();
//! producer.next("Value 1");
//! producer.next("Value 2");
//! producer.next("Value 3");
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let s = seen.clone();
//! subject.clone().subscribe(move |v| s.borrow_mut().push(v));
//! assert_eq!(*seen.borrow(), vec!["Value 2", "Value 3"]);
//!
//! producer.next("Value 4");
//! assert_eq!(*seen.borrow(), vec!["Value 2", "Value 3", "Value 4"]);
//! ```
//!
//! # Re-entrancy
//!
//! An observer may push into, attach to, or detach from the subject that is
//! notifying it. Emissions made during a delivery pass are queued and
//! delivered once the pass ends, in arrival order. A pass always covers the
//! observers attached when it started: one detached mid-pass may still
//! receive the in-flight value, one attached mid-pass does not.

mod policy;
mod subject_subscription;
mod subscribers;

use std::collections::VecDeque;

pub use policy::SubjectKind;
use policy::{ReplayPolicy, Terminal};
pub use subject_subscription::SubjectSubscription;
use subscribers::{
  broadcast_complete, broadcast_error, broadcast_value, SharedObserver, Subscribers,
};
use tracing::{debug, trace};

use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
};

/// A hot, multicast stream with a producer side.
///
/// Clones share the same state. `Item` and `Err` must be `Clone` to be
/// multicast.
pub struct Subject<'a, Item, Err> {
  state: MutRc<SubjectState<'a, Item, Err>>,
}

pub(crate) struct SubjectState<'a, Item, Err> {
  pub(crate) subscribers: Subscribers<SharedObserver<'a, Item, Err>>,
  policy: ReplayPolicy<Item>,
  terminal: Option<Terminal<Err>>,
  /// A terminal signal was accepted; it may still be queued.
  stopping: bool,
  /// A delivery pass is running somewhere up the call stack.
  emitting: bool,
  pending: VecDeque<Notification<Item, Err>>,
}

enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

// ============================================================================
// Construction and introspection
// ============================================================================

impl<'a, Item, Err> Subject<'a, Item, Err> {
  fn with_policy(policy: ReplayPolicy<Item>) -> Self {
    Self {
      state: MutRc::own(SubjectState {
        subscribers: Subscribers::default(),
        policy,
        terminal: None,
        stopping: false,
        emitting: false,
        pending: VecDeque::new(),
      }),
    }
  }

  /// A subject that forwards live values only. Values pushed before a
  /// subscriber attaches are lost to it.
  pub fn basic() -> Self { Self::with_policy(ReplayPolicy::Basic) }

  /// A subject holding a current value. Every subscriber attaching while the
  /// subject is live receives the current value first.
  pub fn behavior(initial: Item) -> Self { Self::with_policy(ReplayPolicy::Behavior(initial)) }

  /// A subject that delivers only its last value, and only on completion.
  pub fn async_subject() -> Self { Self::with_policy(ReplayPolicy::Async(None)) }

  pub fn kind(&self) -> SubjectKind { self.state.rc_deref().policy.kind() }

  /// Number of attached observers.
  pub fn subscriber_count(&self) -> usize { self.state.rc_deref().subscribers.len() }

  /// Whether the subject accepted a terminal signal.
  pub fn is_stopped(&self) -> bool { self.state.rc_deref().stopping }
}

impl<'a, Item: Clone, Err> Subject<'a, Item, Err> {
  /// A subject replaying up to `capacity` of its most recent values to
  /// every new subscriber.
  pub fn replay(capacity: usize) -> Self { Self::with_policy(ReplayPolicy::replay(capacity)) }

  /// The current value of a behavior subject, or the captured value of an
  /// async subject. `None` for the other variants.
  pub fn value(&self) -> Option<Item> { self.state.rc_deref().policy.value() }

  /// The replay buffer, oldest first. Empty for the other variants.
  pub fn buffered(&self) -> Vec<Item> { self.state.rc_deref().policy.buffered() }
}

impl<'a, Item, Err> Clone for Subject<'a, Item, Err> {
  fn clone(&self) -> Self { Self { state: self.state.clone() } }
}

impl<'a, Item, Err> Default for Subject<'a, Item, Err> {
  fn default() -> Self { Self::basic() }
}

// ============================================================================
// Delivery
// ============================================================================

impl<'a, Item: Clone, Err: Clone> Subject<'a, Item, Err> {
  fn emit(&self, notification: Notification<Item, Err>) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.stopping {
        trace!(kind = ?state.policy.kind(), "emission after terminal signal dropped");
        return;
      }
      if !matches!(notification, Notification::Next(_)) {
        state.stopping = true;
      }
      state.pending.push_back(notification);
      if state.emitting {
        return;
      }
      state.emitting = true;
    }
    self.drain();
  }

  fn drain(&self) {
    loop {
      let notification = {
        let mut state = self.state.rc_deref_mut();
        let notification = state.pending.pop_front();
        if notification.is_none() {
          state.emitting = false;
        }
        notification
      };
      match notification {
        Some(notification) => self.deliver(notification),
        None => break,
      }
    }
  }

  fn deliver(&self, notification: Notification<Item, Err>) {
    match notification {
      Notification::Next(value) => {
        let (value, mut observers) = {
          let mut state = self.state.rc_deref_mut();
          match state.policy.on_next(value) {
            Some(value) => (value, state.subscribers.snapshot()),
            None => return,
          }
        };
        broadcast_value(&mut observers, value);
        self
          .state
          .rc_deref_mut()
          .subscribers
          .retain(|observer| !Observer::<Item, Err>::is_closed(observer));
        // Pruned observers are dropped here, with the subject unborrowed.
        drop(observers);
      }
      Notification::Complete => {
        let (last, mut observers) = {
          let mut state = self.state.rc_deref_mut();
          state.terminal = Some(Terminal::Completed);
          debug!(
            kind = ?state.policy.kind(),
            subscribers = state.subscribers.len(),
            "subject completed"
          );
          (state.policy.on_complete(), state.subscribers.drain())
        };
        if let Some(last) = last {
          broadcast_value(&mut observers, last);
        }
        broadcast_complete(observers);
      }
      Notification::Error(err) => {
        let observers = {
          let mut state = self.state.rc_deref_mut();
          state.policy.on_error();
          state.terminal = Some(Terminal::Errored(err.clone()));
          debug!(
            kind = ?state.policy.kind(),
            subscribers = state.subscribers.len(),
            "subject failed"
          );
          state.subscribers.drain()
        };
        broadcast_error(observers, err);
      }
    }
  }

  fn attach(
    &self, mut observer: BoxedObserver<'a, Item, Err>,
  ) -> SubjectSubscription<'a, Item, Err> {
    let mut state = self.state.rc_deref_mut();

    if let Some(terminal) = state.terminal.clone() {
      let replay = state.policy.replay_terminated(&terminal);
      drop(state);
      for value in replay {
        Observer::<Item, Err>::next(&mut observer, value);
      }
      match terminal {
        Terminal::Completed => Observer::<Item, Err>::complete(observer),
        Terminal::Errored(err) => Observer::<Item, Err>::error(observer, err),
      }
      return SubjectSubscription::closed();
    }

    let mut cell: SharedObserver<'a, Item, Err> = MutRc::own(Some(observer));
    let id = state.subscribers.add(cell.clone());
    let replay = state.policy.replay_live();
    let was_emitting = std::mem::replace(&mut state.emitting, true);
    drop(state);

    for value in replay {
      Observer::<Item, Err>::next(&mut cell, value);
    }
    if !was_emitting {
      self.drain();
    }
    SubjectSubscription::new(self.state.downgrade(), id)
  }
}

// ============================================================================
// Producer and consumer sides
// ============================================================================

impl<'a, Item, Err> Observer<Item, Err> for Subject<'a, Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) { self.emit(Notification::Next(value)) }

  fn error(self, err: Err) { self.emit(Notification::Error(err)) }

  fn complete(self) { self.emit(Notification::Complete) }

  fn is_closed(&self) -> bool { self.state.rc_deref().stopping }
}

impl<'a, Item, Err, O> Observable<Item, Err, O> for Subject<'a, Item, Err>
where
  O: Observer<Item, Err> + 'a,
  Item: Clone + 'a,
  Err: Clone + 'a,
{
  type Unsub = SubjectSubscription<'a, Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.attach(Box::new(observer)) }
}

impl<'a, Item, Err> ObservableExt<Item, Err> for Subject<'a, Item, Err>
where
  Item: Clone + 'a,
  Err: Clone + 'a,
{
}
