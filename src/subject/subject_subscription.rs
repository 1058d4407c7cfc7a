use super::SubjectState;
use crate::{rc::MutWeak, subscription::Subscription};

/// Handle detaching one observer from a subject.
///
/// Holds only a weak reference: an outstanding handle never keeps the subject
/// alive. Detaching is synchronous; the observer receives nothing produced
/// after `unsubscribe` returns. Handles returned by attaching to a terminated
/// subject are already closed.
pub struct SubjectSubscription<'a, Item, Err> {
  subject: Option<MutWeak<SubjectState<'a, Item, Err>>>,
  id: usize,
}

impl<'a, Item, Err> SubjectSubscription<'a, Item, Err> {
  pub(crate) fn new(subject: MutWeak<SubjectState<'a, Item, Err>>, id: usize) -> Self {
    Self { subject: Some(subject), id }
  }

  pub(crate) fn closed() -> Self { Self { subject: None, id: 0 } }
}

impl<'a, Item, Err> Subscription for SubjectSubscription<'a, Item, Err> {
  fn unsubscribe(self) {
    let Some(state) = self.subject.and_then(|weak| weak.upgrade()) else {
      return;
    };
    // Dropped only after the subject borrow is released: the observer may own
    // resources whose drop touches this subject again.
    let _removed = state.rc_deref_mut().subscribers.remove(self.id);
  }

  fn is_closed(&self) -> bool {
    self
      .subject
      .as_ref()
      .and_then(MutWeak::upgrade)
      .map_or(true, |state| !state.rc_deref().subscribers.contains(self.id))
  }
}
