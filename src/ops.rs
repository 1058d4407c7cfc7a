//! Operators.
//!
//! Each operator is a pair: an `*Op` type holding the upstream stream and
//! the operator's parameters, and an observer wrapper that the upstream is
//! subscribed with. They are built through [`ObservableExt`] methods.
//!
//! [`ObservableExt`]: crate::observable::ObservableExt

pub mod catch_error;
pub mod concat_with;
pub mod flatten;
pub mod into_stream;
pub mod map;
pub mod on_error_map;
pub mod take;
pub mod timeout;
