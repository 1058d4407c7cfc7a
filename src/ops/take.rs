use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Emits only the first `count` values of the source, then completes.
///
/// If the source emits fewer values, all of them are forwarded. Once
/// `count` values went through, the observer reports itself closed, which
/// lets synchronous sources and subjects stop feeding it.
#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    self.remaining -= 1;
    observer.next(value);
    if self.remaining == 0 {
      if let Some(observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.as_ref().map_or(true, O::is_closed) }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = if self.count == 0 {
      observer.complete();
      None
    } else {
      Some(observer)
    };
    self
      .source
      .actual_subscribe(TakeObserver { observer, remaining: self.count })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeOp<S> where S: ObservableExt<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let completed = Rc::new(RefCell::new(false));
    let mut next_count = 0;
    let c = completed.clone();

    from_iter::<_, Infallible>(0..100).take(5).subscribe_all(
      |_| next_count += 1,
      |_| {},
      move || *c.borrow_mut() = true,
    );

    assert_eq!(next_count, 5);
    assert!(*completed.borrow());
  }

  #[test]
  fn take_zero_completes_immediately() {
    let mut completed = false;
    from_iter::<_, Infallible>(0..3).take(0).subscribe_all(
      |v| panic!("unexpected value {v}"),
      |_| {},
      || completed = true,
    );
    assert!(completed);
  }

  #[test]
  fn source_shorter_than_count() {
    let mut values = vec![];
    from_iter::<_, Infallible>(0..2)
      .take(10)
      .subscribe(|v| values.push(v));
    assert_eq!(values, vec![0, 1]);
  }
}
