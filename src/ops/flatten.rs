//! Flattening: one inner stream per source value, merged into one output.
//!
//! Every source value is projected into an inner stream. A
//! [`FlattenStrategy`] decides when each inner stream is subscribed and
//! which of them may reach the output:
//!
//! | Strategy | Source value arriving while inner streams run |
//! |---|---|
//! | [`Merge`](FlattenStrategy::Merge) | starts at once, or waits in a FIFO queue while `concurrency` inner streams are active |
//! | [`Concat`](FlattenStrategy::Concat) | waits in a FIFO queue until the active one completes |
//! | [`Switch`](FlattenStrategy::Switch) | cancels the active one, then starts |
//! | [`Exhaust`](FlattenStrategy::Exhaust) | is dropped |
//!
//! An error from the source, from any inner stream or from the projection
//! terminates the output with that error, after cancelling the source and
//! every active inner stream and discarding the queue. The output completes
//! once the source completed, no inner stream is active and nothing is
//! queued.
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use rxcast::prelude::*;
//!
//! let clock = VirtualClock::new();
//! let out = Rc::new(RefCell::new(vec![]));
//!
//! let (o, c) = (out.clone(), clock.clone());
//! from_iter::<_, Infallible>([3, 1, 2])
//!   .concat_map(move |v| delayed(&c, v, Duration::from_millis(v * 10)))
//!   .subscribe(move |v| o.borrow_mut().push(v));
//!
//! clock.flush();
//! assert_eq!(*out.borrow(), vec![3, 1, 2]);
//! ```

use std::collections::VecDeque;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutRc, MutWeak},
  subscription::{BoxedSubscription, DynamicSubscriptions, IntoBoxedSubscription, Subscription},
  type_hint::TypeHint,
};

/// How source values and their inner streams are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlattenStrategy {
  /// Run inner streams concurrently, up to the configured concurrency.
  Merge,
  /// Run inner streams one at a time, in source order.
  Concat,
  /// Keep only the inner stream of the latest source value.
  Switch,
  /// Ignore source values while an inner stream is running.
  Exhaust,
}

/// Construction-time settings of a flattening operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
  /// Maximum number of concurrently active inner streams for
  /// [`Merge`](FlattenStrategy::Merge). `None` means unbounded. The other
  /// strategies always run one inner stream at a time.
  pub concurrency: Option<usize>,
}

impl FlattenOptions {
  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = Some(concurrency);
    self
  }

  /// Number of inner streams `strategy` may run at once.
  pub fn limit(&self, strategy: FlattenStrategy) -> usize {
    match (strategy, self.concurrency) {
      (FlattenStrategy::Merge, None) => usize::MAX,
      (FlattenStrategy::Merge, Some(0)) => {
        warn!("merge concurrency of 0 would never start an inner stream, using 1");
        1
      }
      (FlattenStrategy::Merge, Some(limit)) => limit,
      _ => 1,
    }
  }
}

// ============================================================================
// Projection
// ============================================================================

/// Maps a source value to the inner stream it starts.
pub trait Project<SrcItem, Err> {
  type Inner;

  fn project(&mut self, value: SrcItem) -> Result<Self::Inner, Err>;
}

/// An infallible projection closure.
#[derive(Clone)]
pub struct MapInto<F>(pub F);

impl<SrcItem, Err, F, Inner> Project<SrcItem, Err> for MapInto<F>
where
  F: FnMut(SrcItem) -> Inner,
{
  type Inner = Inner;

  #[inline]
  fn project(&mut self, value: SrcItem) -> Result<Inner, Err> { Ok((self.0)(value)) }
}

/// A projection closure that may fail with the stream's error type.
#[derive(Clone)]
pub struct TryMapInto<F>(pub F);

impl<SrcItem, Err, F, Inner> Project<SrcItem, Err> for TryMapInto<F>
where
  F: FnMut(SrcItem) -> Result<Inner, Err>,
{
  type Inner = Inner;

  #[inline]
  fn project(&mut self, value: SrcItem) -> Result<Inner, Err> { (self.0)(value) }
}

// ============================================================================
// Operator
// ============================================================================

/// The flattening operator. Built by
/// [`ObservableExt::flatten`] and its shorthands.
#[derive(Clone)]
pub struct Flatten<S, P, SrcItem> {
  source: S,
  strategy: FlattenStrategy,
  options: FlattenOptions,
  project: P,
  _hint: TypeHint<SrcItem>,
}

impl<S, P, SrcItem> Flatten<S, P, SrcItem> {
  pub(crate) fn new(
    source: S, strategy: FlattenStrategy, options: FlattenOptions, project: P,
  ) -> Self {
    Self { source, strategy, options, project, _hint: TypeHint::new() }
  }
}

type Launcher<SrcItem> = Box<dyn FnMut(SrcItem, usize)>;

/// Bookkeeping of one subscribed flattening operator.
struct FlattenState<SrcItem> {
  strategy: FlattenStrategy,
  limit: usize,
  /// Active inner streams by id. The slot stays `None` while the inner
  /// stream is being subscribed.
  active: DynamicSubscriptions<Option<BoxedSubscription>>,
  queue: VecDeque<SrcItem>,
  source: Option<BoxedSubscription>,
  source_done: bool,
  /// Completed, failed or unsubscribed.
  closed: bool,
  /// A drive loop is running somewhere up the call stack.
  draining: bool,
  /// Projects and subscribes one queued value. Taken out while it runs.
  launcher: Option<Launcher<SrcItem>>,
}

/// Everything the cancellation paths hand back, to be released only after
/// the state borrow ends.
struct Teardown<SrcItem> {
  active: SmallVec<[Option<BoxedSubscription>; 2]>,
  source: Option<BoxedSubscription>,
  _queue: VecDeque<SrcItem>,
  _launcher: Option<Launcher<SrcItem>>,
}

impl<SrcItem> Teardown<SrcItem> {
  fn unsubscribe(self) {
    for inner in self.active {
      inner.unsubscribe();
    }
    self.source.unsubscribe();
  }
}

impl<SrcItem> FlattenState<SrcItem> {
  fn close(&mut self) -> Teardown<SrcItem> {
    self.closed = true;
    Teardown {
      active: self.active.take_all(),
      source: self.source.take(),
      _queue: std::mem::take(&mut self.queue),
      _launcher: self.launcher.take(),
    }
  }
}

enum Signal<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

/// Signals waiting for the downstream observer, in arrival order.
struct Outbox<Item, Err> {
  pending: VecDeque<Signal<Item, Err>>,
  /// A delivery loop is running somewhere up the call stack.
  delivering: bool,
  /// A terminal signal was accepted; it may still be pending.
  stopped: bool,
}

impl<Item, Err> Default for Outbox<Item, Err> {
  fn default() -> Self { Self { pending: VecDeque::new(), delivering: false, stopped: false } }
}

/// Shared handles of one subscribed flattening operator: its state, its
/// downstream observer and the signals waiting for it. They sit in separate
/// cells so the downstream observer can call back into the operator while it
/// is being notified.
struct Job<SrcItem, Item, Err, O> {
  state: MutRc<FlattenState<SrcItem>>,
  downstream: MutRc<Option<O>>,
  outbox: MutRc<Outbox<Item, Err>>,
}

impl<SrcItem, Item, Err, O> Clone for Job<SrcItem, Item, Err, O> {
  fn clone(&self) -> Self {
    Self {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
      outbox: self.outbox.clone(),
    }
  }
}

impl<SrcItem, Item, Err, O> Job<SrcItem, Item, Err, O>
where
  O: Observer<Item, Err>,
{
  /// Hand `signal` to the downstream observer. A signal raised while the
  /// downstream observer is being notified waits until that notification
  /// returns.
  fn emit(&self, signal: Signal<Item, Err>) {
    {
      let mut outbox = self.outbox.rc_deref_mut();
      if outbox.stopped {
        return;
      }
      if !matches!(signal, Signal::Next(_)) {
        outbox.stopped = true;
      }
      outbox.pending.push_back(signal);
      if outbox.delivering {
        trace!(pending = outbox.pending.len(), "re-entrant emission queued");
        return;
      }
      outbox.delivering = true;
    }

    let mut downstream = self.downstream.clone();
    loop {
      let signal = {
        let mut outbox = self.outbox.rc_deref_mut();
        let signal = outbox.pending.pop_front();
        if signal.is_none() {
          outbox.delivering = false;
        }
        signal
      };
      match signal {
        Some(Signal::Next(value)) => Observer::<Item, Err>::next(&mut downstream, value),
        Some(Signal::Error(err)) => Observer::<Item, Err>::error(downstream.clone(), err),
        Some(Signal::Complete) => Observer::<Item, Err>::complete(downstream.clone()),
        None => break,
      }
    }
  }

  /// Start queued values while the strategy's limit allows, then complete
  /// the output if nothing is left to do.
  fn drive(&self) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.draining || state.closed {
        return;
      }
      state.draining = true;
    }

    loop {
      let launch = {
        let mut state = self.state.rc_deref_mut();
        if state.closed || state.active.len() >= state.limit {
          None
        } else {
          state.queue.pop_front().map(|value| {
            let id = state.active.reserve_id();
            state.active.insert(id, None);
            (value, id, state.launcher.take())
          })
        }
      };
      let Some((value, id, Some(mut launcher))) = launch else {
        break;
      };

      launcher(value, id);

      let mut state = self.state.rc_deref_mut();
      if !state.closed {
        state.launcher = Some(launcher);
      }
    }

    let finished = {
      let mut state = self.state.rc_deref_mut();
      state.draining = false;
      let finished =
        !state.closed && state.source_done && state.active.is_empty() && state.queue.is_empty();
      finished.then(|| {
        debug!(strategy = ?state.strategy, "flattening completed");
        state.close()
      })
    };
    if let Some(teardown) = finished {
      teardown.unsubscribe();
      self.emit(Signal::Complete);
    }
  }

  /// Terminate the output with `err`, cancelling everything first.
  fn fail(&self, err: Err) {
    let teardown = {
      let mut state = self.state.rc_deref_mut();
      if state.closed {
        return;
      }
      debug!(
        strategy = ?state.strategy,
        active = state.active.len(),
        queued = state.queue.len(),
        "flattening failed, cancelling inner streams"
      );
      state.close()
    };
    teardown.unsubscribe();
    self.emit(Signal::Error(err));
  }
}

// ============================================================================
// Observers
// ============================================================================

/// Subscribed to the source stream.
pub struct OuterObserver<SrcItem, Item, Err, O> {
  job: Job<SrcItem, Item, Err, O>,
}

impl<SrcItem, Item, Err, O> Observer<SrcItem, Err> for OuterObserver<SrcItem, Item, Err, O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: SrcItem) {
    let cancelled = {
      let mut state = self.job.state.rc_deref_mut();
      if state.closed {
        return;
      }
      match state.strategy {
        FlattenStrategy::Merge | FlattenStrategy::Concat => {
          if state.active.len() >= state.limit {
            trace!(queued = state.queue.len() + 1, "inner stream limit reached, value queued");
          }
          state.queue.push_back(value);
          SmallVec::new()
        }
        FlattenStrategy::Switch => {
          let cancelled = state.active.take_all();
          if !cancelled.is_empty() {
            debug!("switching to a new inner stream, cancelling the active one");
          }
          state.queue.clear();
          state.queue.push_back(value);
          cancelled
        }
        FlattenStrategy::Exhaust => {
          if state.active.is_empty() && state.queue.is_empty() {
            state.queue.push_back(value);
          } else {
            trace!("inner stream still active, value dropped");
          }
          SmallVec::new()
        }
      }
    };
    for inner in cancelled {
      inner.unsubscribe();
    }
    self.job.drive();
  }

  fn error(self, err: Err) { self.job.fail(err) }

  fn complete(self) {
    {
      let mut state = self.job.state.rc_deref_mut();
      state.source_done = true;
      state.source = None;
    }
    self.job.drive();
  }

  fn is_closed(&self) -> bool { self.job.state.rc_deref().closed }
}

/// Subscribed to one inner stream.
pub struct InnerObserver<SrcItem, Item, Err, O> {
  job: Job<SrcItem, Item, Err, O>,
  id: usize,
}

impl<SrcItem, Item, Err, O> InnerObserver<SrcItem, Item, Err, O> {
  fn is_active(&self) -> bool { self.job.state.rc_deref().active.contains(self.id) }
}

impl<SrcItem, Item, Err, O> Observer<Item, Err> for InnerObserver<SrcItem, Item, Err, O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.is_active() {
      self.job.emit(Signal::Next(value));
    }
  }

  fn error(self, err: Err) {
    if self.is_active() {
      self.job.fail(err);
    }
  }

  fn complete(self) {
    let finished = self.job.state.rc_deref_mut().active.remove(self.id);
    if finished.is_some() {
      trace!(id = self.id, "inner stream completed");
      drop(finished);
      self.job.drive();
    }
  }

  fn is_closed(&self) -> bool {
    // While the downstream observer is being notified it is still open.
    !self.is_active()
      || self
        .job
        .downstream
        .try_rc_deref_mut()
        .map_or(false, |downstream| Observer::<Item, Err>::is_closed(&*downstream))
  }
}

/// Cancels the source and every active inner stream.
pub struct FlattenSubscription<SrcItem>(MutRc<FlattenState<SrcItem>>);

impl<SrcItem> Subscription for FlattenSubscription<SrcItem> {
  fn unsubscribe(self) {
    let teardown = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        return;
      }
      state.close()
    };
    teardown.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

// ============================================================================
// Subscribing
// ============================================================================

impl<SrcItem, Item, Err, O, S, P> Observable<Item, Err, O> for Flatten<S, P, SrcItem>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<SrcItem, Err, OuterObserver<SrcItem, Item, Err, O>>,
  S::Unsub: 'static,
  P: Project<SrcItem, Err> + 'static,
  P::Inner: Observable<Item, Err, InnerObserver<SrcItem, Item, Err, O>>,
  <P::Inner as Observable<Item, Err, InnerObserver<SrcItem, Item, Err, O>>>::Unsub: 'static,
  SrcItem: 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = FlattenSubscription<SrcItem>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, strategy, options, mut project, .. } = self;
    let job = Job {
      state: MutRc::own(FlattenState {
        strategy,
        limit: options.limit(strategy),
        active: DynamicSubscriptions::new(),
        queue: VecDeque::new(),
        source: None,
        source_done: false,
        closed: false,
        draining: false,
        launcher: None,
      }),
      downstream: MutRc::own(Some(observer)),
      outbox: MutRc::own(Outbox::default()),
    };

    let weak: MutWeak<FlattenState<SrcItem>> = job.state.downgrade();
    let (downstream, outbox) = (job.downstream.clone(), job.outbox.clone());
    let launcher = move |value: SrcItem, id: usize| {
      let Some(state) = weak.upgrade() else {
        return;
      };
      let job = Job { state, downstream: downstream.clone(), outbox: outbox.clone() };
      match project.project(value) {
        Ok(inner) => {
          trace!(strategy = ?strategy, id, "inner stream started");
          let unsub = inner.actual_subscribe(InnerObserver { job: job.clone(), id });
          let stale = {
            let mut state = job.state.rc_deref_mut();
            match state.active.get_mut(id) {
              Some(slot) => {
                *slot = Some(unsub.into_boxed());
                None
              }
              None => Some(unsub),
            }
          };
          if let Some(unsub) = stale {
            unsub.unsubscribe();
          }
        }
        Err(err) => {
          warn!(strategy = ?strategy, id, "projection failed");
          job.fail(err);
        }
      }
    };
    job.state.rc_deref_mut().launcher = Some(Box::new(launcher));

    let unsub = source.actual_subscribe(OuterObserver { job: job.clone() });
    let stale = {
      let mut state = job.state.rc_deref_mut();
      if state.closed {
        Some(unsub)
      } else {
        state.source = Some(unsub.into_boxed());
        None
      }
    };
    if let Some(unsub) = stale {
      unsub.unsubscribe();
    }
    FlattenSubscription(job.state)
  }
}

impl<SrcItem, Item, Err, S, P> ObservableExt<Item, Err> for Flatten<S, P, SrcItem>
where
  S: ObservableExt<SrcItem, Err>,
  P: Project<SrcItem, Err>,
  P::Inner: ObservableExt<Item, Err>,
{
}
