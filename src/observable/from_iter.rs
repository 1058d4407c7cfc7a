use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates a stream that emits every value of an iterator, then completes.
///
/// Emission stops early once the observer reports itself closed, so
/// `from_iter(0..).take(3)` terminates.
///
/// ```
/// use std::convert::Infallible;
///
/// use rxcast::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter::<_, Infallible>(1..=4).subscribe(|v| sum += v);
/// assert_eq!(sum, 10);
/// ```
pub fn from_iter<I, Err>(iter: I) -> FromIter<I, Err>
where
  I: IntoIterator,
{
  FromIter(iter, TypeHint::new())
}

#[derive(Clone)]
pub struct FromIter<I, Err>(I, TypeHint<Err>);

impl<I, Err, O> Observable<I::Item, Err, O> for FromIter<I, Err>
where
  I: IntoIterator,
  O: Observer<I::Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}

impl<I: IntoIterator, Err> ObservableExt<I::Item, Err> for FromIter<I, Err> {}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use crate::prelude::*;

  #[test]
  fn stops_once_observer_is_closed() {
    let mut hits = vec![];
    observable::from_iter::<_, Infallible>(0..)
      .take(3)
      .subscribe(|v| hits.push(v));
    assert_eq!(hits, vec![0, 1, 2]);
  }
}
