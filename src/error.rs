//! Error types shipped with the crate.
//!
//! Every stream is generic over its error type. [`StreamError`] is a
//! ready-made one covering the failures the engine itself can report.

use thiserror::Error;

use crate::scheduler::Duration;

/// A stream produced no value within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no value within {after:?}")]
pub struct TimeoutError {
  pub after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
  /// A producer failed the stream explicitly.
  #[error("producer failed: {0}")]
  Producer(String),
  /// A projection could not build an inner stream for a source value.
  #[error("projection failed: {0}")]
  Projection(String),
  #[error(transparent)]
  Timeout(#[from] TimeoutError),
}

impl StreamError {
  pub fn producer(msg: impl Into<String>) -> Self { Self::Producer(msg.into()) }

  pub fn projection(msg: impl Into<String>) -> Self { Self::Projection(msg.into()) }

  pub fn is_timeout(&self) -> bool { matches!(self, Self::Timeout(_)) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timeout_converts_and_displays() {
    let err: StreamError = TimeoutError { after: Duration::from_millis(500) }.into();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "no value within 500ms");
  }

  #[test]
  fn messages_name_the_failing_side() {
    assert_eq!(StreamError::producer("disk").to_string(), "producer failed: disk");
    assert_eq!(StreamError::projection("bad id").to_string(), "projection failed: bad id");
  }
}
