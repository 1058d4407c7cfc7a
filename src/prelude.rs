//! Prelude module for convenient imports

// Core traits
pub use crate::observable::{self, Observable, ObservableExt};
// Observers
pub use crate::observer::{BoxedObserver, FnMutObserver, FnObserver, Observer};
// Creation
pub use crate::observable::{
  delayed, empty, from_iter, interval, of, throw_err, timer, Delayed, Empty, FromIter, Interval,
  Of, ThrowErr,
};
// Operators
pub use crate::ops::flatten::{FlattenOptions, FlattenStrategy};
pub use crate::ops::into_stream::IntoStream;
// Subject
pub use crate::subject::{Subject, SubjectKind, SubjectSubscription};
// Subscription
pub use crate::subscription::{BoxedSubscription, Subscription, SubscriptionGuard};
// Virtual time
pub use crate::scheduler::{Duration, TaskHandle, TaskState, VirtualClock};
// Errors
pub use crate::error::{StreamError, TimeoutError};
// Reporting
pub use crate::report::{RecordingSink, ReportObserver, ReportSink, TracingSink};
