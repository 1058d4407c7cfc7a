use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates a stream that produces no values and completes immediately.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(TypeHint::new(), TypeHint::new()) }

/// Creates a stream that produces no values and fails immediately with `err`.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, TypeHint::new()) }

#[derive(Clone)]
pub struct Empty<Item, Err>(TypeHint<Item>, TypeHint<Err>);

#[derive(Clone)]
pub struct ThrowErr<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err, O> Observable<Item, Err, O> for Empty<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete() }
}

impl<Item, Err> ObservableExt<Item, Err> for Empty<Item, Err> {}

impl<Item, Err, O> Observable<Item, Err, O> for ThrowErr<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.0) }
}

impl<Item, Err> ObservableExt<Item, Err> for ThrowErr<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, convert::Infallible};

  use crate::prelude::*;

  #[test]
  fn empty_only_completes() {
    let completed = Cell::new(false);
    observable::empty::<i32, Infallible>().subscribe_all(
      |_| panic!("no value expected"),
      |_| unreachable!(),
      || completed.set(true),
    );
    assert!(completed.get());
  }

  #[test]
  fn throw_err_only_errors() {
    let mut error = None;
    observable::throw_err::<i32, _>("boom")
      .subscribe_err(|_| panic!("no value expected"), |e| error = Some(e));
    assert_eq!(error, Some("boom"));
  }
}
