//! Bridge into `futures::Stream`.
//!
//! Lets async code consume a stream with the usual `StreamExt` combinators.
//! Values are buffered until polled; nothing here drives the virtual clock,
//! so time-based sources only yield what was produced before polling.
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use futures::{executor::block_on, StreamExt};
//! use rxcast::prelude::*;
//!
//! let values: Vec<_> = block_on(from_iter::<_, Infallible>(1..=3).into_stream().collect());
//! assert_eq!(values, vec![Ok(1), Ok(2), Ok(3)]);
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subscription::{BoxedSubscription, IntoBoxedSubscription, Subscription},
};

/// Buffer shared between the subscribed observer and the polling side.
#[doc(hidden)]
pub struct IntoStreamState<Item, Err> {
  pending: VecDeque<Result<Item, Err>>,
  waker: Option<Waker>,
  finished: bool,
}

impl<Item, Err> Default for IntoStreamState<Item, Err> {
  fn default() -> Self { Self { pending: VecDeque::new(), waker: None, finished: false } }
}

impl<Item, Err> IntoStreamState<Item, Err> {
  fn push(&mut self, item: Option<Result<Item, Err>>, last: bool) {
    self.pending.extend(item);
    self.finished |= last;
    if let Some(waker) = self.waker.take() {
      waker.wake();
    }
  }
}

/// A `Stream` of the values of a subscribed stream.
///
/// Yields `Ok` for every value and `Err` for the error, then ends after the
/// error or completion. Dropping it unsubscribes.
pub struct IntoStream<Item, Err> {
  state: MutRc<IntoStreamState<Item, Err>>,
  unsub: Option<BoxedSubscription>,
}

impl<Item, Err> IntoStream<Item, Err> {
  pub(crate) fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err, IntoStreamObserver<Item, Err>>,
    S::Unsub: 'static,
  {
    let state = MutRc::own(IntoStreamState::default());
    let unsub = source.actual_subscribe(IntoStreamObserver { state: state.clone() });
    IntoStream { state, unsub: Some(unsub.into_boxed()) }
  }
}

impl<Item, Err> Stream for IntoStream<Item, Err> {
  type Item = Result<Item, Err>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let mut state = self.state.rc_deref_mut();
    match state.pending.pop_front() {
      Some(item) => Poll::Ready(Some(item)),
      None if state.finished => Poll::Ready(None),
      None => {
        state.waker = Some(cx.waker().clone());
        Poll::Pending
      }
    }
  }
}

impl<Item, Err> Drop for IntoStream<Item, Err> {
  fn drop(&mut self) {
    if let Some(unsub) = self.unsub.take() {
      unsub.unsubscribe();
    }
  }
}

#[doc(hidden)]
pub struct IntoStreamObserver<Item, Err> {
  state: MutRc<IntoStreamState<Item, Err>>,
}

impl<Item, Err> Observer<Item, Err> for IntoStreamObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.state.rc_deref_mut().push(Some(Ok(value)), false); }

  fn error(self, err: Err) { self.state.rc_deref_mut().push(Some(Err(err)), true); }

  fn complete(self) { self.state.rc_deref_mut().push(None, true); }

  fn is_closed(&self) -> bool { self.state.rc_deref().finished }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use futures::{executor::block_on, StreamExt};

  use crate::prelude::*;

  #[test]
  fn error_ends_the_stream() {
    let items: Vec<_> =
      block_on(of::<_, &str>(1).concat_with(throw_err("boom")).into_stream().collect());
    assert_eq!(items, vec![Ok(1), Err("boom")]);
  }

  #[test]
  fn subject_values_are_buffered_until_polled() {
    let subject = Subject::<i32, Infallible>::basic();
    let mut stream = subject.clone().into_stream();

    let mut producer = subject.clone();
    producer.next(1);
    producer.next(2);
    subject.clone().complete();

    assert_eq!(block_on(stream.next()), Some(Ok(1)));
    assert_eq!(block_on(stream.next()), Some(Ok(2)));
    assert_eq!(block_on(stream.next()), None);
  }

  #[test]
  fn dropping_the_stream_detaches() {
    let subject = Subject::<i32, Infallible>::basic();
    let stream = subject.clone().into_stream();
    assert_eq!(subject.subscriber_count(), 1);
    drop(stream);
    assert_eq!(subject.subscriber_count(), 0);
  }
}
