//! The `Observable` trait and its operator extension trait.
//!
//! A stream is anything that can be subscribed with an observer. The trait is
//! generic over the observer type `O`, so operator chains compose without
//! boxing; only subjects and flattening jobs erase observer types, because
//! they hold many of them.

mod from_iter;
mod interval;
mod of;
mod timer;
mod trivial;

pub use from_iter::*;
pub use interval::*;
pub use of::*;
pub use timer::*;
pub use trivial::*;

use crate::{
  observer::{FnMutObserver, FnObserver, Observer},
  ops::{
    catch_error::CatchErrorOp,
    concat_with::ConcatWith,
    flatten::{Flatten, FlattenOptions, FlattenStrategy, MapInto, TryMapInto},
    into_stream::{IntoStream, IntoStreamObserver},
    map::MapOp,
    on_error_map::OnErrorMapOp,
    take::TakeOp,
    timeout::TimeoutOp,
  },
  scheduler::{Duration, VirtualClock},
  subscription::Subscription,
};

/// A stream of `Item` values that may terminate with an `Err`.
///
/// `actual_subscribe` attaches `observer` and returns the handle that
/// detaches it. Cold streams start producing inside this call.
pub trait Observable<Item, Err, O> {
  type Unsub: Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Subscription helpers and operators for every stream type.
pub trait ObservableExt<Item, Err>: Sized {
  /// Attach a `next` handler to a stream that cannot fail.
  fn subscribe<N>(self, next: N) -> <Self as Observable<Item, Err, FnMutObserver<N>>>::Unsub
  where
    N: FnMut(Item),
    Self: Observable<Item, Err, FnMutObserver<N>>,
  {
    self.actual_subscribe(FnMutObserver(next))
  }

  /// Attach `next` and `error` handlers; completion is ignored.
  fn subscribe_err<N, E>(
    self, next: N, error: E,
  ) -> <Self as Observable<Item, Err, FnObserver<N, E, fn()>>>::Unsub
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    Self: Observable<Item, Err, FnObserver<N, E, fn()>>,
  {
    let complete: fn() = || {};
    self.actual_subscribe(FnObserver { next, error, complete })
  }

  /// Attach a handler for each of the three signals.
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> <Self as Observable<Item, Err, FnObserver<N, E, C>>>::Unsub
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, FnObserver<N, E, C>>,
  {
    self.actual_subscribe(FnObserver { next, error, complete })
  }

  /// Attach an arbitrary observer.
  fn subscribe_with<O>(self, observer: O) -> <Self as Observable<Item, Err, O>>::Unsub
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, O>,
  {
    self.actual_subscribe(observer)
  }

  /// Transform every value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Forward the first `count` values, then complete.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Forward this stream, then, once it completes, `next`.
  fn concat_with<B>(self, next: B) -> ConcatWith<Self, B>
  where
    B: ObservableExt<Item, Err>,
  {
    ConcatWith { first: self, second: next }
  }

  /// Convert the error with `f`, leaving values untouched.
  fn on_error_map<E2, F>(self, f: F) -> OnErrorMapOp<Self, F, Err>
  where
    F: FnOnce(Err) -> E2,
  {
    OnErrorMapOp::new(self, f)
  }

  /// Recover from an error by emitting the fallback value `f(err)` and
  /// completing.
  fn catch_error<F>(self, f: F) -> CatchErrorOp<Self, F>
  where
    F: FnOnce(Err) -> Item,
  {
    CatchErrorOp { source: self, func: f }
  }

  /// Fail with a [`TimeoutError`](crate::error::TimeoutError) when no value
  /// arrives within `duration` of the subscription or of the previous value,
  /// measured on `clock`.
  fn timeout(self, clock: &VirtualClock, duration: Duration) -> TimeoutOp<Self> {
    TimeoutOp { source: self, clock: clock.clone(), duration }
  }

  /// Map every source value to an inner stream and flatten the inner streams
  /// into one output according to `strategy`.
  fn flatten<F, Inner>(
    self, strategy: FlattenStrategy, options: FlattenOptions, project: F,
  ) -> Flatten<Self, MapInto<F>, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    Flatten::new(self, strategy, options, MapInto(project))
  }

  /// Like [`flatten`](Self::flatten), but the projection may fail. A failed
  /// projection terminates the output with its error.
  fn try_flatten<F, Inner>(
    self, strategy: FlattenStrategy, options: FlattenOptions, project: F,
  ) -> Flatten<Self, TryMapInto<F>, Item>
  where
    F: FnMut(Item) -> Result<Inner, Err>,
  {
    Flatten::new(self, strategy, options, TryMapInto(project))
  }

  /// Run up to `concurrency` inner streams at once, queueing the rest.
  fn merge_map<F, Inner>(self, concurrency: usize, project: F) -> Flatten<Self, MapInto<F>, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    let options = FlattenOptions::default().with_concurrency(concurrency);
    self.flatten(FlattenStrategy::Merge, options, project)
  }

  /// Run inner streams one after another, in source order.
  fn concat_map<F, Inner>(self, project: F) -> Flatten<Self, MapInto<F>, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    self.flatten(FlattenStrategy::Concat, FlattenOptions::default(), project)
  }

  /// Cancel the running inner stream whenever a new source value arrives.
  fn switch_map<F, Inner>(self, project: F) -> Flatten<Self, MapInto<F>, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    self.flatten(FlattenStrategy::Switch, FlattenOptions::default(), project)
  }

  /// Ignore source values while an inner stream is running.
  fn exhaust_map<F, Inner>(self, project: F) -> Flatten<Self, MapInto<F>, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    self.flatten(FlattenStrategy::Exhaust, FlattenOptions::default(), project)
  }

  /// Consume the stream as a `futures::Stream` of `Result<Item, Err>`.
  ///
  /// The stream ends after completion, or right after yielding the error.
  /// Dropping it unsubscribes.
  fn into_stream(self) -> IntoStream<Item, Err>
  where
    Self: Observable<Item, Err, IntoStreamObserver<Item, Err>>,
    <Self as Observable<Item, Err, IntoStreamObserver<Item, Err>>>::Unsub: 'static,
  {
    IntoStream::new(self)
  }
}
