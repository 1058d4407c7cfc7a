//! # rxcast: multicast event streams on a virtual clock
//!
//! A small reactive engine built around two pieces:
//!
//! - [`Subject`]s: multicast streams with a producer side (`next`, `error`,
//!   `complete`) and a consumer side (`subscribe*`). Four replay policies
//!   decide what a late subscriber sees.
//! - [`flatten`](ObservableExt::flatten): maps every source value to an inner
//!   stream and combines the inner streams by a [`FlattenStrategy`]
//!   (merge with a concurrency limit, concat, switch, exhaust).
//!
//! Everything runs on the caller's thread. Time-based sources are driven by
//! a [`VirtualClock`] the host advances explicitly.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use rxcast::prelude::*;
//!
//! let mut subject = Subject::<i32, Infallible>::replay(2);
//! subject.next(1);
//! subject.next(2);
//! subject.next(3);
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let s = seen.clone();
//! subject.clone().subscribe(move |v| s.borrow_mut().push(v));
//! subject.next(4);
//!
//! assert_eq!(*seen.borrow(), vec![2, 3, 4]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Subject`] | Multicast stream with a [`SubjectKind`] replay policy |
//! | [`Observable`] | A stream that can be subscribed to |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`VirtualClock`] | Deterministic timer queue behind `interval`, `timer`, `delayed` and `timeout` |
//!
//! [`Subject`]: subject::Subject
//! [`SubjectKind`]: subject::SubjectKind
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`VirtualClock`]: scheduler::VirtualClock
//! [`FlattenStrategy`]: ops::flatten::FlattenStrategy

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod report;
pub mod scheduler;
pub mod subject;
pub mod subscription;
mod type_hint;

pub use prelude::*;
