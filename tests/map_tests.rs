//! Integration tests for `map` - concurrency-bounded, order-preserving mapping.
//!
//! These tests cover the observable contract of a run:
//! - Values, pending elements, and mixed inputs map in input order
//! - Synchronous and asynchronous transforms
//! - Laziness until the run is awaited
//! - Rejection of sources that are not iterable
//! - Failure propagation from elements, pulls, and transforms
//! - Asynchronous sources

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future;
use rstest::rstest;

use pmap::control::defer;
use pmap::mapping::{
    AsyncIterable, Cursor, Element, Iterable, MapError, MapOptions, Source, map, map_iter,
    map_stream,
};
use pmap::time::sleep_ms;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure(&'static str);

impl std::fmt::Display for Failure {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "failure {}", self.0)
    }
}

async fn times_ten(value: i32, _index: usize) -> Result<i32, Failure> {
    Ok(value * 10)
}

async fn deferred_times_ten(value: i32, _index: usize) -> Result<i32, Failure> {
    sleep_ms(4).await;
    Ok(value * 10)
}

fn ready(value: i32) -> Element<'static, i32, Failure> {
    Element::pending(future::ready(Ok(value)))
}

fn options(concurrency: usize) -> MapOptions {
    MapOptions::new().with_concurrency(concurrency)
}

// =============================================================================
// Iterable Sources
// =============================================================================

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn maps_values(#[case] concurrency: usize) {
    let output = map(vec![1, 2, 3, 4], times_ten, options(concurrency)).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn maps_pending_elements(#[case] concurrency: usize) {
    let input = vec![ready(1), ready(2), ready(3), ready(4)];
    let output = map(input, times_ten, options(concurrency)).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[tokio::test]
async fn maps_mixed_elements() {
    let input = vec![Element::Ready(1), ready(2), Element::Ready(3), ready(4)];
    let output = map(input, times_ten, MapOptions::default()).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn maps_with_async_transform(#[case] concurrency: usize) {
    let output = map(vec![1, 2, 3, 4], deferred_times_ten, options(concurrency)).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[tokio::test]
async fn passes_input_position_to_transform() {
    let output = map(
        vec!["a", "b", "c"],
        |value: &'static str, index: usize| async move { Ok::<_, Failure>(format!("{index}{value}")) },
        MapOptions::default(),
    )
    .await;
    assert_eq!(output, Ok(vec!["0a".to_string(), "1b".to_string(), "2c".to_string()]));
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
#[tokio::test]
async fn empty_source_fulfills_with_empty_output(#[case] concurrency: usize) {
    let output = map(Vec::<i32>::new(), times_ten, options(concurrency)).await;
    assert_eq!(output, Ok(Vec::new()));
}

#[rstest]
#[tokio::test]
async fn concurrency_above_length_behaves_as_unbounded() {
    let output = map([1, 2, 3], deferred_times_ten, options(100)).await;
    assert_eq!(output, Ok(vec![10, 20, 30]));
}

#[rstest]
#[tokio::test]
async fn map_iter_accepts_any_iterator() {
    let output = map_iter((1..=4).map(|value| value * 2), times_ten, 3).await;
    assert_eq!(output, Ok(vec![20, 40, 60, 80]));
}

#[rstest]
#[tokio::test]
async fn iterable_wraps_deferred_elements() {
    let first = defer::<i32, Failure>();
    let second = defer::<i32, Failure>();
    second.resolve(2).unwrap();
    first.resolve(1).unwrap();

    let source = Iterable::new(vec![Element::pending(first), Element::pending(second)]);
    let output = map(source, times_ten, MapOptions::default()).await;
    assert_eq!(output, Ok(vec![10, 20]));
}

// =============================================================================
// Laziness
// =============================================================================

#[rstest]
#[tokio::test]
async fn transform_is_not_called_before_await() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let run = map(
        vec![1, 2, 3, 4],
        move |value: i32, _index: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
            future::ready(Ok::<_, Failure>(value * 10))
        },
        MapOptions::default(),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let output = run.await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

// =============================================================================
// Non-Iterable Sources
// =============================================================================

struct Record;

impl<'a> Source<'a, i32, Failure> for Record {
    fn into_cursor(self) -> Option<Cursor<'a, i32, Failure>> {
        None
    }
}

#[rstest]
#[tokio::test]
async fn non_iterable_source_is_a_usage_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let output = map(
        Record,
        move |value: i32, _index: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
            future::ready(Ok::<_, Failure>(value))
        },
        options(2),
    )
    .await;

    let error = output.unwrap_err();
    assert!(error.is_not_iterable());
    assert!(error.to_string().contains("Record"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn rejected_element_rejects_run(#[case] concurrency: usize) {
    let input = vec![
        Element::Ready(1),
        ready(2),
        Element::rejected(Failure("3")),
        Element::Ready(4),
    ];
    let output = map(input, times_ten, options(concurrency)).await;
    assert_eq!(output, Err(MapError::Rejected(Failure("3"))));
}

#[rstest]
#[tokio::test]
async fn pending_rejection_rejects_run_with_reason_verbatim() {
    let pending = defer::<i32, Failure>();
    let input = vec![
        Element::Ready(1),
        Element::pending(pending.clone()),
        Element::Ready(3),
        Element::Ready(4),
    ];
    let run = tokio::spawn(map(
        input,
        |value: i32, _index: usize| async move { Ok::<_, Failure>(value * 2) },
        MapOptions::default(),
    ));

    sleep_ms(5).await;
    pending.reject(Failure("pending")).unwrap();

    let output = run.await.unwrap();
    assert_eq!(output.unwrap_err().into_reason(), Some(Failure("pending")));
}

#[rstest]
#[tokio::test]
async fn transform_failure_rejects_run() {
    let output = map(
        vec![1, 2, 3, 4],
        |value: i32, _index: usize| async move {
            if value == 3 {
                Err(Failure("transform"))
            } else {
                Ok(value)
            }
        },
        options(2),
    )
    .await;
    assert_eq!(output, Err(MapError::Rejected(Failure("transform"))));
}

#[rstest]
#[tokio::test]
async fn failure_stops_pulling() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = pulled.clone();
    let source = Iterable::new((0..100).inspect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let output = map(
        source,
        |value: i32, _index: usize| async move {
            if value == 1 {
                Err(Failure("stop"))
            } else {
                Ok(value)
            }
        },
        options(2),
    )
    .await;

    assert_eq!(output, Err(MapError::Rejected(Failure("stop"))));
    assert!(pulled.load(Ordering::SeqCst) <= 3);
}

// =============================================================================
// Asynchronous Sources
// =============================================================================

fn numbers() -> AsyncIterable<'static, i32, Failure> {
    AsyncIterable::new(futures::stream::iter(vec![1, 2, 3, 4]))
}

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn maps_async_iterable(#[case] concurrency: usize) {
    let output = map(numbers(), times_ten, options(concurrency)).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[tokio::test]
async fn maps_async_iterable_with_async_transform() {
    let output = map(numbers(), deferred_times_ten, MapOptions::default()).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[tokio::test]
async fn maps_slow_stream() {
    let stream = futures::stream::unfold(1, |next| async move {
        if next > 4 {
            None
        } else {
            sleep_ms(2).await;
            Some((next, next + 1))
        }
    });
    let output = map_stream(stream, times_ten, 2).await;
    assert_eq!(output, Ok(vec![10, 20, 30, 40]));
}

#[rstest]
#[tokio::test]
async fn failed_pull_rejects_run() {
    let source = AsyncIterable::fallible(futures::stream::iter(vec![
        Ok(1),
        Err(Failure("pull")),
        Ok(3),
    ]));
    let output = map(source, times_ten, MapOptions::default()).await;
    assert_eq!(output, Err(MapError::Rejected(Failure("pull"))));
}

#[rstest]
#[tokio::test]
async fn run_can_be_spawned() {
    let handle = tokio::spawn(map(numbers(), deferred_times_ten, options(3)));
    assert_eq!(handle.await.unwrap(), Ok(vec![10, 20, 30, 40]));
}
