use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Converts the error of the source with a closure.
#[derive(Clone)]
pub struct OnErrorMapOp<S, F, Err> {
  source: S,
  func: F,
  _hint: TypeHint<Err>,
}

impl<S, F, Err> OnErrorMapOp<S, F, Err> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func, _hint: TypeHint::new() } }
}

pub struct OnErrorMapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, E2, O, F> Observer<Item, Err> for OnErrorMapObserver<O, F>
where
  O: Observer<Item, E2>,
  F: FnOnce(Err) -> E2,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error((self.func)(err)) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item, Err, E2, O, S, F> Observable<Item, E2, O> for OnErrorMapOp<S, F, Err>
where
  S: Observable<Item, Err, OnErrorMapObserver<O, F>>,
  F: FnOnce(Err) -> E2,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(OnErrorMapObserver { observer, func: self.func })
  }
}

impl<Item, Err, E2, S, F> ObservableExt<Item, E2> for OnErrorMapOp<S, F, Err>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(Err) -> E2,
{
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn error_is_converted() {
    let mut seen = None;
    throw_err::<i32, _>("disk full")
      .on_error_map(StreamError::producer)
      .subscribe_err(|_| {}, |e| seen = Some(e));
    assert_eq!(seen, Some(StreamError::Producer("disk full".into())));
  }

  #[test]
  fn values_pass_through() {
    let mut values = vec![];
    from_iter::<_, &str>([1, 2])
      .on_error_map(|e| e.len())
      .subscribe_err(|v| values.push(v), |_| {});
    assert_eq!(values, vec![1, 2]);
  }
}
