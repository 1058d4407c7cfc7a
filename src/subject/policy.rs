use std::collections::VecDeque;

/// The four subject variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
  /// Forwards live values only.
  Basic,
  /// Holds a current value, delivered first to every new subscriber.
  Behavior,
  /// Buffers the last N values for new subscribers.
  Replay,
  /// Delivers only the last value, and only on completion.
  Async,
}

/// The terminal signal a subject received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Terminal<Err> {
  Completed,
  Errored(Err),
}

/// What a subject remembers between pushes, and what it replays.
pub(crate) enum ReplayPolicy<Item> {
  Basic,
  Behavior(Item),
  Replay { capacity: usize, buffer: VecDeque<Item> },
  Async(Option<Item>),
}

impl<Item> ReplayPolicy<Item> {
  pub fn kind(&self) -> SubjectKind {
    match self {
      ReplayPolicy::Basic => SubjectKind::Basic,
      ReplayPolicy::Behavior(_) => SubjectKind::Behavior,
      ReplayPolicy::Replay { .. } => SubjectKind::Replay,
      ReplayPolicy::Async(_) => SubjectKind::Async,
    }
  }

  /// Fail: an async subject never delivers its captured value after an
  /// error.
  pub fn on_error(&mut self) {
    if let ReplayPolicy::Async(slot) = self {
      *slot = None;
    }
  }
}

impl<Item: Clone> ReplayPolicy<Item> {
  pub fn replay(capacity: usize) -> Self {
    ReplayPolicy::Replay { capacity, buffer: VecDeque::with_capacity(capacity) }
  }

  /// Record a pushed value. Returns the value to deliver to the current
  /// subscribers, if any.
  pub fn on_next(&mut self, value: Item) -> Option<Item> {
    match self {
      ReplayPolicy::Basic => Some(value),
      ReplayPolicy::Behavior(current) => {
        *current = value.clone();
        Some(value)
      }
      ReplayPolicy::Replay { capacity, buffer } => {
        if *capacity > 0 {
          if buffer.len() == *capacity {
            buffer.pop_front();
          }
          buffer.push_back(value.clone());
        }
        Some(value)
      }
      ReplayPolicy::Async(slot) => {
        *slot = Some(value);
        None
      }
    }
  }

  /// The value to deliver ahead of the completion signal.
  pub fn on_complete(&self) -> Option<Item> {
    match self {
      ReplayPolicy::Async(slot) => slot.clone(),
      _ => None,
    }
  }

  /// Values a subscriber attaching to a live subject receives first.
  pub fn replay_live(&self) -> Vec<Item> {
    match self {
      ReplayPolicy::Basic | ReplayPolicy::Async(_) => vec![],
      ReplayPolicy::Behavior(current) => vec![current.clone()],
      ReplayPolicy::Replay { buffer, .. } => buffer.iter().cloned().collect(),
    }
  }

  /// Values a subscriber attaching after `terminal` receives before the
  /// terminal signal itself.
  pub fn replay_terminated<Err>(&self, terminal: &Terminal<Err>) -> Vec<Item> {
    match (self, terminal) {
      (ReplayPolicy::Replay { buffer, .. }, _) => buffer.iter().cloned().collect(),
      (ReplayPolicy::Async(Some(last)), Terminal::Completed) => vec![last.clone()],
      _ => vec![],
    }
  }

  pub fn value(&self) -> Option<Item> {
    match self {
      ReplayPolicy::Behavior(current) => Some(current.clone()),
      ReplayPolicy::Async(slot) => slot.clone(),
      _ => None,
    }
  }

  pub fn buffered(&self) -> Vec<Item> {
    match self {
      ReplayPolicy::Replay { buffer, .. } => buffer.iter().cloned().collect(),
      _ => vec![],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn replay_evicts_oldest() {
    let mut policy = ReplayPolicy::replay(2);
    for v in 1..=3 {
      assert_eq!(policy.on_next(v), Some(v));
    }
    assert_eq!(policy.buffered(), vec![2, 3]);
    assert_eq!(policy.replay_live(), vec![2, 3]);
  }

  #[test]
  fn zero_capacity_replay_buffers_nothing() {
    let mut policy = ReplayPolicy::replay(0);
    policy.on_next(1);
    assert!(policy.buffered().is_empty());
  }

  #[test]
  fn async_holds_back_until_complete() {
    let mut policy = ReplayPolicy::Async(None);
    assert_eq!(policy.on_next(1), None);
    assert_eq!(policy.on_next(2), None);
    assert_eq!(policy.on_complete(), Some(2));
    assert_eq!(policy.replay_terminated::<()>(&Terminal::Completed), vec![2]);

    policy.on_error();
    assert_eq!(policy.value(), None);
  }

  #[test]
  fn behavior_replays_nothing_after_terminal() {
    let policy = ReplayPolicy::Behavior("current");
    assert_eq!(policy.replay_live(), vec!["current"]);
    assert!(policy.replay_terminated::<()>(&Terminal::Completed).is_empty());
  }
}
