use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates a stream producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// ```
/// use std::convert::Infallible;
///
/// use rxcast::prelude::*;
///
/// observable::of::<_, Infallible>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item, Err>(v: Item) -> Of<Item, Err> { Of(v, TypeHint::new()) }

#[derive(Clone)]
pub struct Of<Item, Err>(Item, TypeHint<Err>);

impl<Item, Err, O> Observable<Item, Err, O> for Of<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Of<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use crate::prelude::*;

  #[test]
  fn emits_then_completes() {
    let mut value = 0;
    let mut completed = false;
    observable::of::<_, Infallible>(100).subscribe_all(
      |v| value = v,
      |_| unreachable!(),
      || completed = true,
    );
    assert_eq!(value, 100);
    assert!(completed);
  }
}
