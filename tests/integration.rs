//! End-to-end scenarios through the public prelude.

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use futures::{executor::block_on, StreamExt};
use rxcast::prelude::*;

type Text = Subject<'static, &'static str, Infallible>;

fn strings(values: &[&str]) -> Vec<String> { values.iter().map(|v| v.to_string()).collect() }

#[test]
fn basic_subject_only_reaches_attached_subscribers() {
  let sink = RecordingSink::default();
  let mut subject = Text::basic();

  subject.next("Hello1");
  subject.next("World1");
  subject.clone().subscribe_with(sink.clone().observer("Subscriber 1"));
  subject.clone().subscribe_with(sink.clone().observer("Subscriber 2"));
  subject.next("Hello");
  subject.next("World");

  let expected = strings(&[r#""Hello""#, r#""World""#]);
  assert_eq!(sink.values_of("Subscriber 1"), expected);
  assert_eq!(sink.values_of("Subscriber 2"), expected);
}

#[test]
fn behavior_subject_starts_late_subscribers_at_latest_value() {
  let sink = RecordingSink::default();
  let mut subject = Text::behavior("Initial");

  subject.clone().subscribe_with(sink.clone().observer("Subscriber 1"));
  subject.next("Updated");
  subject.clone().subscribe_with(sink.clone().observer("Subscriber 2"));

  assert_eq!(sink.values_of("Subscriber 1"), strings(&[r#""Initial""#, r#""Updated""#]));
  assert_eq!(sink.values_of("Subscriber 2"), strings(&[r#""Updated""#]));
  assert_eq!(subject.value(), Some("Updated"));
}

#[test]
fn replay_subject_of_two() {
  let sink = RecordingSink::default();
  let mut subject = Text::replay(2);

  subject.next("Value 1");
  subject.next("Value 2");
  subject.next("Value 3");
  subject.clone().subscribe_with(sink.clone().observer("Subscriber"));
  subject.next("Value 4");
  subject.next("Value 5");

  assert_eq!(
    sink.values_of("Subscriber"),
    strings(&[r#""Value 2""#, r#""Value 3""#, r#""Value 4""#, r#""Value 5""#])
  );
}

#[test]
fn async_subject_delivers_last_value_once_on_completion() {
  let sink = RecordingSink::default();
  let mut subject = Text::async_subject();

  subject.clone().subscribe_with(sink.clone().observer("Subscriber1"));
  subject.next("Value 1");
  subject.next("Value 2");
  subject.clone().subscribe_with(sink.clone().observer("Subscriber2"));
  subject.next("Value 3");
  assert!(sink.records().is_empty());

  subject.clone().complete();
  subject.next("Value 4");
  subject.clone().complete();

  let expected = strings(&[r#""Value 3""#, "complete"]);
  assert_eq!(sink.values_of("Subscriber1"), expected);
  assert_eq!(sink.values_of("Subscriber2"), expected);
  assert_eq!(sink.records().len(), 4);
  assert!(subject.is_stopped());
}

#[test]
fn subject_consumed_as_futures_stream() {
  let mut subject = Subject::<i32, Infallible>::replay(3);
  subject.next(1);
  subject.next(2);

  let stream = subject.clone().into_stream();
  subject.next(3);
  subject.complete();

  let values: Vec<_> = block_on(stream.map(|v| v.unwrap_or_default()).collect());
  assert_eq!(values, vec![1, 2, 3]);
}

// ==================== Flattening ====================

type Timeline = Rc<RefCell<Vec<(u64, String)>>>;

/// Five clicks 100ms apart, each answered 250ms later, flattened by
/// `strategy`. Returns `(millis, value)` pairs plus the completion time.
fn clicks_and_responses(strategy: FlattenStrategy, options: FlattenOptions) -> Vec<(u64, String)> {
  let clock = VirtualClock::new();
  let timeline = Timeline::default();

  let c = clock.clone();
  let (t1, t2, t3) = (timeline.clone(), timeline.clone(), timeline.clone());
  let (c1, c2, c3) = (clock.clone(), clock.clone(), clock.clone());
  interval::<StreamError>(&clock, Duration::from_millis(100))
    .take(5)
    .flatten(strategy, options, move |click| {
      delayed(&c, click, Duration::from_millis(250))
    })
    .subscribe_all(
      move |click: usize| t1.borrow_mut().push((c1.now().as_millis() as u64, click.to_string())),
      move |err: StreamError| t2.borrow_mut().push((c2.now().as_millis() as u64, err.to_string())),
      move || t3.borrow_mut().push((c3.now().as_millis() as u64, "complete".to_string())),
    );

  clock.flush();
  let result = timeline.borrow().clone();
  result
}

fn at(pairs: &[(u64, &str)]) -> Vec<(u64, String)> {
  pairs.iter().map(|(t, v)| (*t, v.to_string())).collect()
}

#[test]
fn merge_with_two_slots() {
  let timeline = clicks_and_responses(
    FlattenStrategy::Merge,
    FlattenOptions::default().with_concurrency(2),
  );
  assert_eq!(
    timeline,
    at(&[(350, "0"), (450, "1"), (600, "2"), (700, "3"), (850, "4"), (850, "complete")])
  );
}

#[test]
fn unbounded_merge_answers_every_click_in_parallel() {
  let timeline = clicks_and_responses(FlattenStrategy::Merge, FlattenOptions::default());
  assert_eq!(
    timeline,
    at(&[(350, "0"), (450, "1"), (550, "2"), (650, "3"), (750, "4"), (750, "complete")])
  );
}

#[test]
fn concat_answers_one_click_at_a_time() {
  let timeline = clicks_and_responses(FlattenStrategy::Concat, FlattenOptions::default());
  assert_eq!(
    timeline,
    at(&[(350, "0"), (600, "1"), (850, "2"), (1100, "3"), (1350, "4"), (1350, "complete")])
  );
}

#[test]
fn switch_answers_only_the_last_click() {
  let timeline = clicks_and_responses(FlattenStrategy::Switch, FlattenOptions::default());
  assert_eq!(timeline, at(&[(750, "4"), (750, "complete")]));
}

#[test]
fn exhaust_ignores_clicks_while_busy() {
  let timeline = clicks_and_responses(FlattenStrategy::Exhaust, FlattenOptions::default());
  assert_eq!(timeline, at(&[(350, "0"), (650, "3"), (650, "complete")]));
}

#[test]
fn exhaust_with_missed_marker() {
  let clock = VirtualClock::new();
  let sink = RecordingSink::default();

  let c = clock.clone();
  interval::<StreamError>(&clock, Duration::from_millis(100))
    .take(5)
    .exhaust_map(move |click| {
      delayed(&c, format!("response {click}"), Duration::from_millis(250))
        .concat_with(of("missed".to_string()))
    })
    .subscribe_with(sink.clone().observer("exhaust"));

  clock.flush();
  assert_eq!(
    sink.values_of("exhaust"),
    strings(&[
      r#""response 0""#,
      r#""missed""#,
      r#""response 3""#,
      r#""missed""#,
      "complete"
    ])
  );
}

#[test]
fn concat_with_timeout_fallback() {
  let clock = VirtualClock::new();
  let sink = RecordingSink::default();

  let c = clock.clone();
  from_iter::<_, StreamError>([100, 800, 200])
    .concat_map(move |latency| {
      delayed(&c, format!("answered {latency}"), Duration::from_millis(latency))
        .timeout(&c, Duration::from_millis(500))
        .catch_error(|err| format!("fallback: {err}"))
    })
    .subscribe_with(sink.clone().observer("requests"));

  clock.flush();
  assert_eq!(
    sink.values_of("requests"),
    strings(&[
      r#""answered 100""#,
      r#""fallback: no value within 500ms""#,
      r#""answered 200""#,
      "complete"
    ])
  );
  assert_eq!(clock.now(), Duration::from_millis(800));
}

#[test]
fn unrecovered_timeout_fails_the_whole_output() {
  let clock = VirtualClock::new();
  let sink = RecordingSink::default();

  let c = clock.clone();
  from_iter::<_, StreamError>([100, 800, 200])
    .concat_map(move |latency| {
      delayed(&c, latency, Duration::from_millis(latency)).timeout(&c, Duration::from_millis(500))
    })
    .subscribe_with(sink.clone().observer("requests"));

  clock.flush();
  assert_eq!(
    sink.values_of("requests"),
    strings(&["100", "error: Timeout(TimeoutError { after: 500ms })"])
  );
}

#[test]
fn subject_fed_switch_over_subjects() {
  let sink = RecordingSink::default();
  let searches = Subject::<&'static str, StreamError>::basic();
  let results = Rc::new(RefCell::new(vec![]));

  let r = results.clone();
  let subscription = searches
    .clone()
    .switch_map(move |query| {
      let result = Subject::<String, StreamError>::replay(1);
      r.borrow_mut().push((query, result.clone()));
      result
    })
    .subscribe_with(sink.clone().observer("results"));

  let mut typing = searches.clone();
  typing.next("ru");
  typing.next("rus");
  let answer = |index: usize, value: &str| {
    let mut subject = results.borrow()[index].1.clone();
    subject.next(value.to_string());
  };
  answer(0, "ruby");
  answer(1, "rust");

  subscription.unsubscribe();
  typing.next("rust lang");

  assert_eq!(sink.values_of("results"), strings(&[r#""rust""#]));
  assert_eq!(searches.subscriber_count(), 0);
  assert_eq!(results.borrow().len(), 2);
}
