use tracing::debug;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Replaces an error of the source with one fallback value, then completes.
#[derive(Clone)]
pub struct CatchErrorOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct CatchErrorObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for CatchErrorObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(Err) -> Item,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    debug!("stream error replaced by fallback value");
    let Self { mut observer, func } = self;
    observer.next(func(err));
    observer.complete();
  }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for CatchErrorOp<S, F>
where
  S: Observable<Item, Err, CatchErrorObserver<O, F>>,
  F: FnOnce(Err) -> Item,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(CatchErrorObserver { observer, func: self.func })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for CatchErrorOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(Err) -> Item,
{
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn error_becomes_fallback_then_completion() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    from_iter::<_, String>(["a".to_string()])
      .concat_with(throw_err("broken".to_string()))
      .catch_error(|e| format!("recovered from {e}"))
      .subscribe_all(
        move |v| l1.borrow_mut().push(v),
        move |e| l2.borrow_mut().push(format!("error {e}")),
        move || l3.borrow_mut().push("complete".to_string()),
      );
    assert_eq!(*log.borrow(), vec!["a", "recovered from broken", "complete"]);
  }
}
