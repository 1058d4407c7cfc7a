use smallvec::SmallVec;


/// An insertion-ordered container with ID-based removal.
///
/// Subjects keep their attached observers here and flattening jobs keep their
/// active inner subscriptions here. Iteration order is insertion order, which
/// is what makes attachment order the delivery order.
///
/// - **SmallVec**: the common case of 0-2 entries needs no heap allocation.
/// - **Pre-allocation**: `reserve_id()` + `insert()` hands out an ID before
///   the item exists, for an inner observer that must know its own slot
///   before it is subscribed.
///
/// ```rust
/// use rxcast::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<&str> = DynamicSubscriptions::default();
/// let first = subs.add("first");
///
/// let second = subs.reserve_id();
/// subs.insert(second, "second");
/// assert_eq!(subs.len(), 2);
///
/// assert_eq!(subs.remove(first), Some("first"));
/// assert_eq!(subs.iter().copied().collect::<Vec<_>>(), vec!["second"]);
/// ```
pub struct DynamicSubscriptions<U> {
  issued: usize,
  slots: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { issued: 0, slots: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Store `item` under a fresh id. Ids are never handed out twice.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.reserve_id();
    self.slots.push((id, item));
    id
  }

  /// Hand out an id now and fill its slot later with [`insert`](Self::insert).
  #[inline]
  pub fn reserve_id(&mut self) -> usize {
    let id = self.issued;
    self.issued += 1;
    id
  }

  /// Fill a slot whose id came from [`reserve_id`](Self::reserve_id).
  #[inline]
  pub fn insert(&mut self, id: usize, item: U) { self.slots.push((id, item)); }

  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .slots
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.slots.remove(pos).1)
  }

  #[inline]
  pub fn get_mut(&mut self, id: usize) -> Option<&mut U> {
    self
      .slots
      .iter_mut()
      .find(|(i, _)| *i == id)
      .map(|(_, item)| item)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.slots.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.slots.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.slots.is_empty() }

  /// Keep only the items for which `keep` returns `true`.
  pub fn retain(&mut self, mut keep: impl FnMut(&U) -> bool) {
    self.slots.retain(|(_, item)| keep(item));
  }

  /// Remove every item, returning them in insertion order.
  pub fn take_all(&mut self) -> SmallVec<[U; 2]> {
    self.slots.drain(..).map(|(_, item)| item).collect()
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &U> { self.slots.iter().map(|(_, item)| item) }
}
