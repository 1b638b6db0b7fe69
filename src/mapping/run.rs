//! The pull/settle loop behind [`map`](super::map).
//!
//! A run owns one cursor and one set of in-flight work. An entry in the set
//! starts either by resolving a pending element or directly as a transform,
//! and a resolved element turns into a transform for the same input
//! position. The set is the window, whose size never exceeds the configured
//! [`Concurrency`].
//!
//! Each poll repeats the same two steps until nothing makes progress:
//!
//! 1. pull from the cursor while the window has room
//! 2. take the next settled entry, in the order entries were woken
//!
//! Because both stages share one set, the failure that settles first is the
//! one observed first, whichever stage it comes from.
//!
//! A settled transform frees exactly one slot, so the next iteration pulls
//! exactly one more element. The window is refilled per completion, never in
//! batches.

use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FusedFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use pin_project_lite::pin_project;

use super::error::MapError;
use super::options::{Concurrency, MapOptions};
use super::source::{Cursor, Element, Source};

// =============================================================================
// Indexed
// =============================================================================

pin_project! {
    /// A future tagged with the input position it works on.
    struct Indexed<Fut> {
        index: usize,
        #[pin]
        future: Fut,
    }
}

impl<Fut: Future> Future for Indexed<Fut> {
    type Output = (usize, Fut::Output);

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let index = *this.index;
        this.future.poll(context).map(|output| (index, output))
    }
}

// =============================================================================
// Stage
// =============================================================================

pin_project! {
    /// One input position's work: resolving its element, then transforming it.
    #[project = StageProjection]
    enum Stage<'a, T, E, Fut> {
        Resolving { element: BoxFuture<'a, Result<T, E>> },
        Transforming { #[pin] future: Fut },
    }
}

/// What a settled [`Stage`] produced.
enum Step<T, R> {
    Resolved(T),
    Transformed(R),
}

impl<T, R, E, Fut> Future for Stage<'_, T, E, Fut>
where
    Fut: Future<Output = Result<R, E>>,
{
    type Output = Result<Step<T, R>, E>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            StageProjection::Resolving { element } => {
                element.poll_unpin(context).map_ok(Step::Resolved)
            }
            StageProjection::Transforming { future } => {
                future.poll(context).map_ok(Step::Transformed)
            }
        }
    }
}

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The source exposed no cursor; fail on first poll.
    NotIterable(&'static str),
    Running,
    Fulfilled,
    Failed,
}

// =============================================================================
// MapRun
// =============================================================================

pin_project! {
    /// Future returned by [`map`](super::map).
    ///
    /// Resolves to the transformed values in input order, or to the first
    /// failure to settle. Nothing is pulled and no transform runs until the
    /// future is first polled.
    ///
    /// Dropping the run drops all in-flight element and transform futures.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct MapRun<'a, T, R, E, F, Fut> {
        cursor: Option<Cursor<'a, T, E>>,
        transform: F,
        concurrency: Concurrency,
        next_index: usize,
        window: FuturesUnordered<Indexed<Stage<'a, T, E, Fut>>>,
        results: Vec<Option<R>>,
        phase: Phase,
    }
}

impl<'a, T, R, E, F, Fut> MapRun<'a, T, R, E, F, Fut>
where
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    pub(crate) fn new<S>(source: S, transform: F, options: MapOptions) -> Self
    where
        S: Source<'a, T, E>,
    {
        let cursor = source.into_cursor();
        let phase = if cursor.is_some() {
            Phase::Running
        } else {
            Phase::NotIterable(std::any::type_name::<S>())
        };

        Self {
            cursor,
            transform,
            concurrency: options.concurrency,
            next_index: 0,
            window: FuturesUnordered::new(),
            results: Vec::new(),
            phase,
        }
    }
}

impl<T, R, E, F, Fut> MapRun<'_, T, R, E, F, Fut> {
    /// Number of elements pulled from the source so far.
    #[must_use]
    pub const fn pulled(&self) -> usize {
        self.next_index
    }

    /// Number of elements whose resolution or transform has not settled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.window.len()
    }

    /// The concurrency limit of this run.
    #[must_use]
    pub const fn concurrency(&self) -> Concurrency {
        self.concurrency
    }
}

impl<T, R, E, F, Fut> Future for MapRun<'_, T, R, E, F, Fut>
where
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    type Output = Result<Vec<R>, MapError<E>>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match *this.phase {
            Phase::Running => {}
            Phase::NotIterable(source_type) => {
                *this.phase = Phase::Failed;
                #[cfg(feature = "tracing")]
                tracing::debug!(source_type, "source is not iterable");
                return Poll::Ready(Err(MapError::NotIterable { source_type }));
            }
            Phase::Fulfilled | Phase::Failed => panic!("`MapRun` polled after completion"),
        }

        loop {
            // Fill the window.
            while let Some(cursor) = this.cursor.as_mut() {
                if !this.concurrency.allows(this.window.len()) {
                    break;
                }

                match cursor.poll_pull(context) {
                    Poll::Ready(Some(Ok(element))) => {
                        let index = *this.next_index;
                        *this.next_index += 1;
                        this.results.push(None);

                        #[cfg(feature = "tracing")]
                        tracing::trace!(index, ready = element.is_ready(), "pulled element");

                        let future = match element {
                            Element::Ready(value) => Stage::Transforming {
                                future: (this.transform)(value, index),
                            },
                            Element::Pending(element) => Stage::Resolving { element },
                        };
                        this.window.push(Indexed { index, future });
                    }
                    Poll::Ready(Some(Err(reason))) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(index = *this.next_index, "pull failed");
                        *this.phase = Phase::Failed;
                        return Poll::Ready(Err(MapError::Rejected(reason)));
                    }
                    Poll::Ready(None) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(pulled = *this.next_index, "source exhausted");
                        *this.cursor = None;
                    }
                    Poll::Pending => break,
                }
            }

            match this.window.poll_next_unpin(context) {
                // The element keeps its slot while it is transformed.
                Poll::Ready(Some((index, Ok(Step::Resolved(value))))) => {
                    let future = Stage::Transforming {
                        future: (this.transform)(value, index),
                    };
                    this.window.push(Indexed { index, future });
                }
                Poll::Ready(Some((index, Ok(Step::Transformed(value))))) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(index, "transform settled");
                    this.results[index] = Some(value);
                }
                Poll::Ready(Some((index, Err(reason)))) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(index, "element or transform failed");
                    *this.phase = Phase::Failed;
                    return Poll::Ready(Err(MapError::Rejected(reason)));
                }
                Poll::Ready(None) | Poll::Pending => {
                    if this.cursor.is_none() && this.window.is_empty() {
                        *this.phase = Phase::Fulfilled;
                        let results = mem::take(this.results);
                        debug_assert!(results.iter().all(Option::is_some));

                        #[cfg(feature = "tracing")]
                        tracing::debug!(count = results.len(), "mapping fulfilled");
                        return Poll::Ready(Ok(results.into_iter().flatten().collect()));
                    }

                    return Poll::Pending;
                }
            }
        }
    }
}

impl<T, R, E, F, Fut> FusedFuture for MapRun<'_, T, R, E, F, Fut>
where
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Fulfilled | Phase::Failed)
    }
}

impl<T, R, E, F, Fut> fmt::Debug for MapRun<'_, T, R, E, F, Fut> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MapRun")
            .field("concurrency", &self.concurrency)
            .field("pulled", &self.next_index)
            .field("in_flight", &self.in_flight())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
