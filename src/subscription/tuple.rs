use super::Subscription;

/// Two subscriptions cancelled together.
///
/// `concat_with` returns one of these: the first half cancels the leading
/// stream, the second half the trailing stream once it has started.
pub struct TupleSubscription<U1, U2> {
  unsub1: U1,
  unsub2: U2,
}

impl<U1, U2> TupleSubscription<U1, U2> {
  pub fn new(unsub1: U1, unsub2: U2) -> Self { TupleSubscription { unsub1, unsub2 } }
}

impl<U1, U2> Subscription for TupleSubscription<U1, U2>
where
  U1: Subscription,
  U2: Subscription,
{
  fn unsubscribe(self) {
    self.unsub1.unsubscribe();
    self.unsub2.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.unsub1.is_closed() && self.unsub2.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  struct MockSubscription(Rc<Cell<bool>>);

  impl Subscription for MockSubscription {
    fn unsubscribe(self) { self.0.set(true) }

    fn is_closed(&self) -> bool { self.0.get() }
  }

  #[test]
  fn closes_both_halves() {
    let (a, b) = (Rc::new(Cell::new(false)), Rc::new(Cell::new(false)));
    let tuple = TupleSubscription::new(MockSubscription(a.clone()), MockSubscription(b.clone()));

    assert!(!tuple.is_closed());
    tuple.unsubscribe();

    assert!(a.get());
    assert!(b.get());
  }
}
