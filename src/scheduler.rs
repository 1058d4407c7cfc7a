//! Virtual time.
//!
//! The engine never blocks. Everything that "takes time" (simulated clicks,
//! delayed responses, timeouts) is a task on a [`VirtualClock`], and time
//! only moves when the host calls [`VirtualClock::advance_by`] or
//! [`VirtualClock::flush`].
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxcast::prelude::*;
//!
//! let clock = VirtualClock::new();
//! let fired = Rc::new(RefCell::new(vec![]));
//!
//! let f = fired.clone();
//! clock.schedule(Duration::from_millis(100), move || {
//!   f.borrow_mut().push("late");
//!   TaskState::Finished
//! });
//! let f = fired.clone();
//! clock.schedule(Duration::from_millis(10), move || {
//!   f.borrow_mut().push("early");
//!   TaskState::Finished
//! });
//!
//! clock.advance_by(Duration::from_millis(50));
//! assert_eq!(*fired.borrow(), vec!["early"]);
//! clock.flush();
//! assert_eq!(*fired.borrow(), vec!["early", "late"]);
//! ```

use std::{
  cell::Cell,
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
};

pub use std::time::Duration;

use crate::{rc::MutRc, subscription::Subscription};

/// What a task wants after it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
  /// Drop the task.
  Finished,
  /// Run the task again at the current instant, after everything already
  /// due at this instant.
  Yield,
  /// Run the task again after the given delay.
  Sleeping(Duration),
}

/// Cancellation handle of a scheduled task.
///
/// Closed once the task finished or was cancelled. Cancelling is
/// synchronous: a cancelled task never runs again.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Rc<Cell<bool>>);

impl TaskHandle {
  fn new() -> Self { Self::default() }

  fn mark_finished(&self) { self.0.set(true) }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) { self.0.set(true) }

  fn is_closed(&self) -> bool { self.0.get() }
}

// ==================== Internal State ====================

#[derive(Default)]
struct ClockState {
  now: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

// ==================== VirtualClock ====================

/// A deterministic timer queue advanced explicitly by its owner.
///
/// Clones share the same timeline. Tasks run in order of their scheduled
/// time, FIFO among tasks due at the same instant. No borrow of the clock is
/// held while a task runs, so tasks may schedule further tasks.
#[derive(Clone, Default)]
pub struct VirtualClock(MutRc<ClockState>);

impl VirtualClock {
  pub fn new() -> Self { Self::default() }

  /// Current virtual time, measured from the clock's creation.
  pub fn now(&self) -> Duration { self.0.rc_deref().now }

  /// Number of tasks waiting in the queue, cancelled ones included.
  pub fn pending_count(&self) -> usize { self.0.rc_deref().task_queue.len() }

  pub fn is_empty(&self) -> bool { self.0.rc_deref().task_queue.is_empty() }

  /// Run `task` once `delay` of virtual time has passed.
  pub fn schedule(
    &self, delay: Duration, task: impl FnMut() -> TaskState + 'static,
  ) -> TaskHandle {
    let mut state = self.0.rc_deref_mut();
    let handle = TaskHandle::new();
    let scheduled_time = state.now + delay;
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    state.task_queue.push(ScheduledTask {
      scheduled_time,
      task_id,
      task: Box::new(task),
      handle: handle.clone(),
    });
    handle
  }

  /// Advance virtual time by `duration`, running every task that falls due.
  pub fn advance_by(&self, duration: Duration) {
    let target_time = self.now() + duration;
    self.execute_tasks_until(Some(target_time));
    self.0.rc_deref_mut().now = target_time;
  }

  /// Run tasks until the queue is empty, jumping time forward as needed.
  ///
  /// A task that keeps rescheduling itself (an endless `interval`) makes
  /// this loop forever; bound such streams with `take` first.
  pub fn flush(&self) { self.execute_tasks_until(None); }

  fn execute_tasks_until(&self, target_time: Option<Duration>) {
    loop {
      let task = {
        let mut state = self.0.rc_deref_mut();
        let due = state
          .task_queue
          .peek()
          .is_some_and(|peek| target_time.map_or(true, |limit| peek.scheduled_time <= limit));
        if !due {
          break;
        }
        match state.task_queue.pop() {
          // Cancelled tasks are discarded without moving time.
          Some(task) if task.handle.is_closed() => continue,
          Some(task) => {
            state.now = task.scheduled_time;
            Some(task)
          }
          None => None,
        }
      };

      let Some(mut scheduled_task) = task else {
        break;
      };

      let result = (scheduled_task.task)();

      match result {
        TaskState::Finished => scheduled_task.handle.mark_finished(),
        TaskState::Yield => self.reschedule_task(scheduled_task, Duration::ZERO),
        TaskState::Sleeping(sleep) => self.reschedule_task(scheduled_task, sleep),
      }
    }
  }

  fn reschedule_task(&self, scheduled_task: ScheduledTask, delay: Duration) {
    if scheduled_task.handle.is_closed() {
      return;
    }
    let mut state = self.0.rc_deref_mut();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let scheduled_time = state.now + delay;
    state.task_queue.push(ScheduledTask { scheduled_time, task_id, ..scheduled_task });
  }
}
