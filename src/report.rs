//! Reporting of `(label, value)` pairs.
//!
//! A [`ReportSink`] is the observational end of a pipeline: the demos print
//! through [`TracingSink`], tests record through [`RecordingSink`]. Any sink
//! becomes an [`Observer`] with [`ReportSink::observer`].
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use rxcast::prelude::*;
//!
//! let sink = RecordingSink::default();
//! from_iter::<_, Infallible>(["Hello", "World"]).subscribe_with(sink.clone().observer("Basic"));
//!
//! assert_eq!(
//!   sink.records(),
//!   vec![
//!     ("Basic".to_string(), r#""Hello""#.to_string()),
//!     ("Basic".to_string(), r#""World""#.to_string()),
//!     ("Basic".to_string(), "complete".to_string()),
//!   ]
//! );
//! ```

use std::fmt::Debug;

use tracing::info;

use crate::{observer::Observer, rc::MutRc};

pub trait ReportSink {
  fn report(&mut self, label: &str, value: &dyn Debug);

  /// Report every value of a stream under `label`, followed by its terminal
  /// signal.
  fn observer(self, label: impl Into<String>) -> ReportObserver<Self>
  where
    Self: Sized,
  {
    ReportObserver { label: label.into(), sink: self, closed: false }
  }
}

/// Emits one `info` event per reported pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
  fn report(&mut self, label: &str, value: &dyn Debug) { info!(label, value = ?value, "report"); }
}

/// Keeps every reported pair, with the value in its `Debug` form.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSink(MutRc<Vec<(String, String)>>);

impl RecordingSink {
  pub fn records(&self) -> Vec<(String, String)> { self.0.rc_deref().clone() }

  /// The recorded values reported under `label`.
  pub fn values_of(&self, label: &str) -> Vec<String> {
    self
      .0
      .rc_deref()
      .iter()
      .filter(|(l, _)| l == label)
      .map(|(_, v)| v.clone())
      .collect()
  }
}

impl ReportSink for RecordingSink {
  fn report(&mut self, label: &str, value: &dyn Debug) {
    self
      .0
      .rc_deref_mut()
      .push((label.to_string(), format!("{value:?}")));
  }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
  fn report(&mut self, label: &str, value: &dyn Debug) { (**self).report(label, value) }
}

pub struct ReportObserver<S> {
  label: String,
  sink: S,
  closed: bool,
}

impl<Item, Err, S> Observer<Item, Err> for ReportObserver<S>
where
  Item: Debug,
  Err: Debug,
  S: ReportSink,
{
  fn next(&mut self, value: Item) {
    if !self.closed {
      self.sink.report(&self.label, &value);
    }
  }

  fn error(mut self, err: Err) {
    self.closed = true;
    self
      .sink
      .report(&self.label, &format_args!("error: {err:?}"));
  }

  fn complete(mut self) {
    self.closed = true;
    self.sink.report(&self.label, &format_args!("complete"));
  }

  fn is_closed(&self) -> bool { self.closed }
}
