//! Concurrency-bounded, order-preserving mapping.
//!
//! [`map`] applies an asynchronous transform to every element of a source
//! while keeping at most [`MapOptions::concurrency`] transforms in flight.
//! Results come back in input order no matter which transform finishes
//! first, and the first failure to settle ends the run.
//!
//! # Semantics
//!
//! - **Order**: output position `i` holds the transform's result for the
//!   `i`-th element pulled.
//! - **Window**: at most `concurrency` elements are between being pulled and
//!   having their transform settle. A settled transform frees one slot, which
//!   is refilled by exactly one new pull.
//! - **Pulls**: the source is pulled strictly sequentially; at most one pull
//!   is outstanding.
//! - **Failure**: a rejected element, a failed pull, or a failed transform
//!   ends the run with that reason, unchanged. No further elements are
//!   pulled and later failures are discarded.
//! - **Laziness**: nothing happens until the returned future is polled.
//!
//! All work runs inside the returned future on the task that polls it;
//! nothing is spawned.
//!
//! # Examples
//!
//! ```rust
//! use pmap::mapping::{MapOptions, map};
//!
//! # futures::executor::block_on(async {
//! let output = map(
//!     vec![1, 2, 3, 4],
//!     |value: i32, _index: usize| async move { Ok::<_, String>(value * 10) },
//!     MapOptions::new().with_concurrency(2),
//! )
//! .await;
//!
//! assert_eq!(output, Ok(vec![10, 20, 30, 40]));
//! # });
//! ```

mod error;
mod options;
mod run;
mod source;

pub use error::MapError;
pub use options::{Concurrency, MapOptions};
pub use run::MapRun;
pub use source::{AsyncIterable, Cursor, Element, Iterable, Source};

use std::future::Future;

use futures::stream::Stream;

/// Maps `transform` over `source` with bounded concurrency.
///
/// `transform` receives each resolved element together with its zero-based
/// input position. The returned [`MapRun`] resolves to the results in input
/// order.
///
/// # Errors
///
/// The run resolves to:
///
/// - [`MapError::NotIterable`] if `source` exposes no cursor; nothing is
///   pulled and `transform` is never called
/// - [`MapError::Rejected`] with the first reason to settle from a pending
///   element, an asynchronous pull, or a transform
///
/// # Examples
///
/// ```rust
/// use pmap::mapping::{MapError, MapOptions, Element, map};
///
/// # futures::executor::block_on(async {
/// let elements: Vec<Element<'_, i32, String>> = vec![
///     Element::Ready(1),
///     Element::rejected("3".to_string()),
///     Element::Ready(4),
/// ];
/// let output = map(
///     elements,
///     |value: i32, _index: usize| async move { Ok::<_, String>(value * 2) },
///     MapOptions::default(),
/// )
/// .await;
///
/// assert_eq!(output, Err(MapError::Rejected("3".to_string())));
/// # });
/// ```
pub fn map<'a, S, T, R, E, F, Fut>(
    source: S,
    transform: F,
    options: impl Into<MapOptions>,
) -> MapRun<'a, T, R, E, F, Fut>
where
    S: Source<'a, T, E>,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let options = options.into();
    #[cfg(feature = "tracing")]
    tracing::trace!(concurrency = %options.concurrency, "starting mapping run");
    MapRun::new(source, transform, options)
}

/// Maps over anything synchronously iterable.
///
/// Shorthand for [`map`] over an [`Iterable`].
pub fn map_iter<'a, I, T, R, E, F, Fut>(
    items: I,
    transform: F,
    options: impl Into<MapOptions>,
) -> MapRun<'a, T, R, E, F, Fut>
where
    I: IntoIterator,
    I::IntoIter: Send + 'a,
    I::Item: Into<Element<'a, T, E>> + 'a,
    T: 'a,
    E: 'a,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    map(Iterable::new(items), transform, options)
}

/// Maps over a stream of values.
///
/// Shorthand for [`map`] over an [`AsyncIterable`].
///
/// # Examples
///
/// ```rust
/// use pmap::mapping::map_stream;
///
/// # futures::executor::block_on(async {
/// let values = futures::stream::iter(vec![1, 2, 3]);
/// let output = map_stream(values, |value: i32, index: usize| async move {
///     Ok::<_, ()>(value + index as i32)
/// }, 2)
/// .await;
///
/// assert_eq!(output, Ok(vec![1, 3, 5]));
/// # });
/// ```
pub fn map_stream<'a, St, T, R, E, F, Fut>(
    stream: St,
    transform: F,
    options: impl Into<MapOptions>,
) -> MapRun<'a, T, R, E, F, Fut>
where
    St: Stream<Item = T> + Send + 'a,
    T: Send + 'a,
    E: Send + 'a,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    map(AsyncIterable::new(stream), transform, options)
}
