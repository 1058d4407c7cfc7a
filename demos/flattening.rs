//! One stream of simulated clicks, flattened four ways.
//!
//! Every click starts a "request" answered after a fixed latency. The
//! strategy decides what happens to clicks that arrive while a request is
//! still running. Time is virtual: the whole run takes no wall-clock time.

use rxcast::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CLICK_PERIOD: Duration = Duration::from_millis(100);
const CLICKS: usize = 5;
const RESPONSE_LATENCY: Duration = Duration::from_millis(250);

fn run(strategy: FlattenStrategy, options: FlattenOptions) {
  info!(?strategy, ?options, "running");
  let clock = VirtualClock::new();

  let c = clock.clone();
  interval::<StreamError>(&clock, CLICK_PERIOD)
    .take(CLICKS)
    .flatten(strategy, options, move |click| {
      delayed(&c, format!("response to click {click}"), RESPONSE_LATENCY)
    })
    .subscribe_with(TracingSink.observer(format!("{strategy:?}")));

  clock.flush();
  info!(elapsed = ?clock.now(), "done");
}

fn exhaust_with_marker() {
  info!("exhaust, marking where a request ended");
  let clock = VirtualClock::new();

  let c = clock.clone();
  interval::<StreamError>(&clock, CLICK_PERIOD)
    .take(CLICKS)
    .exhaust_map(move |click| {
      delayed(&c, format!("response to click {click}"), RESPONSE_LATENCY)
        .concat_with(of("clicks in between were missed".to_string()))
    })
    .subscribe_with(TracingSink.observer("Exhaust"));

  clock.flush();
}

fn concat_with_timeout() {
  info!("concat, each request bounded by a deadline");
  let clock = VirtualClock::new();
  let latencies = [100, 800, 200];

  let c = clock.clone();
  from_iter::<_, StreamError>(latencies)
    .concat_map(move |latency| {
      delayed(&c, format!("answered after {latency}ms"), Duration::from_millis(latency))
        .timeout(&c, Duration::from_millis(500))
        .catch_error(move |err| format!("gave up on the {latency}ms request: {err}"))
    })
    .subscribe_with(TracingSink.observer("ConcatTimeout"));

  clock.flush();
}

fn main() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

  run(FlattenStrategy::Merge, FlattenOptions::default().with_concurrency(2));
  run(FlattenStrategy::Concat, FlattenOptions::default());
  run(FlattenStrategy::Switch, FlattenOptions::default());
  run(FlattenStrategy::Exhaust, FlattenOptions::default());
  exhaust_with_marker();
  concat_with_timeout();
}
