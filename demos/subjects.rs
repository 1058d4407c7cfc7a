//! The four subject flavours side by side.
//!
//! Run with `cargo run --example subjects`; set `RUST_LOG=debug` to also see
//! the engine's own events.

use std::convert::Infallible;

use rxcast::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Text = Subject<'static, &'static str, Infallible>;

fn basic_subject() {
  info!("Basic Subject");
  let mut subject = Text::basic();

  // Nobody is listening yet, so these are lost.
  subject.next("Hello1");
  subject.next("World1");

  subject.clone().subscribe_with(TracingSink.observer("Subscriber 1"));
  subject.clone().subscribe_with(TracingSink.observer("Subscriber 2"));

  subject.next("Hello");
  subject.next("World");
}

fn behavior_subject() {
  info!("Behavior Subject");
  let mut subject = Text::behavior("Initial");

  subject.clone().subscribe_with(TracingSink.observer("Subscriber 1"));
  subject.next("Updated");

  // Late subscribers start from the latest value.
  subject.clone().subscribe_with(TracingSink.observer("Subscriber 2"));
}

fn replay_subject() {
  info!("Replay Subject");
  let mut subject = Text::replay(2);

  subject.next("Value 1");
  subject.next("Value 2");
  subject.next("Value 3");

  subject.clone().subscribe_with(TracingSink.observer("Subscriber"));

  subject.next("Value 4");
  subject.next("Value 5");
}

fn async_subject() {
  info!("Async Subject");
  let mut subject = Text::async_subject();

  subject.clone().subscribe_with(TracingSink.observer("Subscriber1"));
  subject.next("Value 1");
  subject.next("Value 2");

  subject.clone().subscribe_with(TracingSink.observer("Subscriber2"));
  subject.next("Value 3");
  subject.clone().complete();

  // Both are ignored once the subject completed.
  subject.next("Value 4");
  subject.complete();
}

fn main() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

  basic_subject();
  behavior_subject();
  replay_subject();
  async_subject();
}
