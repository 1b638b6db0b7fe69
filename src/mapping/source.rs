//! Sources a mapping run can pull elements from.
//!
//! A run consumes exactly one [`Cursor`]: either a synchronous iterator of
//! [`Element`]s, or an asynchronous stream of values. Types that can be
//! mapped over implement [`Source`], which reports which of the two
//! capabilities they expose. A source exposing neither makes the run fail
//! with [`MapError::NotIterable`](super::MapError::NotIterable).

use std::fmt;
use std::future::Future;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};

// =============================================================================
// Element
// =============================================================================

/// An input element: a value, or a future that produces one.
///
/// A pending element that fails counts as a failure of the whole run, just
/// like a failing transform.
pub enum Element<'a, T, E> {
    /// The value is already available.
    Ready(T),
    /// The value is still being produced.
    Pending(BoxFuture<'a, Result<T, E>>),
}

impl<'a, T, E> Element<'a, T, E> {
    /// Wraps a future producing the element.
    ///
    /// Any future resolving to `Result<T, E>` qualifies, a `Deferred`
    /// included.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self::Pending(future.boxed())
    }

    /// An element that has already failed with `reason`.
    pub fn rejected(reason: E) -> Self
    where
        T: Send + 'a,
        E: Send + 'a,
    {
        Self::Pending(future::ready(Err(reason)).boxed())
    }

    /// Returns `true` if no waiting is needed to obtain the value.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Waits for the element's value.
    ///
    /// # Errors
    ///
    /// Returns the reason a pending element failed with.
    pub async fn resolve(self) -> Result<T, E> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending(future) => future.await,
        }
    }
}

impl<T, E> From<T> for Element<'_, T, E> {
    fn from(value: T) -> Self {
        Self::Ready(value)
    }
}

#[cfg(feature = "control")]
impl<T, E> From<crate::control::Deferred<T, E>> for Element<'_, T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn from(deferred: crate::control::Deferred<T, E>) -> Self {
        Self::pending(deferred)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Element<'_, T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => formatter.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => formatter.write_str("Pending(..)"),
        }
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Exclusive, sequential access to the elements of a source.
pub enum Cursor<'a, T, E> {
    /// Elements pulled synchronously; each may itself be pending.
    Sync(Box<dyn Iterator<Item = Element<'a, T, E>> + Send + 'a>),
    /// Values pulled asynchronously; a pull may itself fail.
    Async(BoxStream<'a, Result<T, E>>),
}

impl<'a, T, E> Cursor<'a, T, E> {
    /// Pulls the next element.
    ///
    /// `Ready(None)` signals exhaustion. Only one pull is ever outstanding
    /// because the cursor is borrowed mutably for its duration.
    pub(crate) fn poll_pull(
        &mut self,
        context: &mut Context<'_>,
    ) -> Poll<Option<Result<Element<'a, T, E>, E>>> {
        match self {
            Self::Sync(items) => Poll::Ready(items.next().map(Ok)),
            Self::Async(stream) => stream
                .poll_next_unpin(context)
                .map(|pulled| pulled.map(|outcome| outcome.map(Element::Ready))),
        }
    }

    /// Returns `true` for the synchronous capability.
    #[must_use]
    pub const fn is_sync(&self) -> bool {
        matches!(self, Self::Sync(_))
    }
}

impl<T, E> fmt::Debug for Cursor<'_, T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => formatter.write_str("Cursor::Sync(..)"),
            Self::Async(_) => formatter.write_str("Cursor::Async(..)"),
        }
    }
}

// =============================================================================
// Source
// =============================================================================

/// A value that may be mapped over.
///
/// Implementations report the iteration capability they expose. The
/// synchronous capability takes precedence when a type could offer both.
///
/// # Examples
///
/// A record exposes no iteration at all:
///
/// ```rust
/// use pmap::mapping::{Cursor, Source};
///
/// struct Record;
///
/// impl<'a> Source<'a, u32, String> for Record {
///     fn into_cursor(self) -> Option<Cursor<'a, u32, String>> {
///         None
///     }
/// }
/// ```
pub trait Source<'a, T, E> {
    /// Opens a cursor over the elements, or `None` if the value is not
    /// iterable in either form.
    fn into_cursor(self) -> Option<Cursor<'a, T, E>>;
}

impl<'a, T, E> Source<'a, T, E> for Cursor<'a, T, E> {
    fn into_cursor(self) -> Option<Self> {
        Some(self)
    }
}

impl<'a, T, E> Source<'a, T, E> for Option<Cursor<'a, T, E>> {
    fn into_cursor(self) -> Self {
        self
    }
}

/// A synchronously iterable source.
///
/// # Examples
///
/// ```rust
/// use pmap::mapping::{Element, Iterable};
///
/// let elements: Vec<Element<'_, i32, ()>> = vec![
///     Element::Ready(1),
///     Element::pending(async { Ok(2) }),
/// ];
/// let items: Iterable<'_, i32, ()> = Iterable::new(elements);
/// # let _ = items;
/// ```
pub struct Iterable<'a, T, E> {
    items: Box<dyn Iterator<Item = Element<'a, T, E>> + Send + 'a>,
}

impl<'a, T: 'a, E: 'a> Iterable<'a, T, E> {
    /// Wraps anything iterable whose items convert into elements.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: Send + 'a,
        I::Item: Into<Element<'a, T, E>> + 'a,
    {
        Self {
            items: Box::new(items.into_iter().map(Into::<Element<'a, T, E>>::into)),
        }
    }
}

impl<'a, T, E> Source<'a, T, E> for Iterable<'a, T, E> {
    fn into_cursor(self) -> Option<Cursor<'a, T, E>> {
        Some(Cursor::Sync(self.items))
    }
}

impl<T, E> fmt::Debug for Iterable<'_, T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Iterable").finish_non_exhaustive()
    }
}

/// An asynchronously iterable source.
pub struct AsyncIterable<'a, T, E> {
    stream: BoxStream<'a, Result<T, E>>,
}

impl<'a, T: Send + 'a, E: Send + 'a> AsyncIterable<'a, T, E> {
    /// Wraps a stream whose pulls cannot fail.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
    {
        Self {
            stream: stream.map(Ok).boxed(),
        }
    }

    /// Wraps a stream whose pulls may fail.
    ///
    /// A failed pull ends the run with that reason.
    pub fn fallible<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'a,
    {
        Self {
            stream: stream.boxed(),
        }
    }
}

impl<'a, T, E> Source<'a, T, E> for AsyncIterable<'a, T, E> {
    fn into_cursor(self) -> Option<Cursor<'a, T, E>> {
        Some(Cursor::Async(self.stream))
    }
}

impl<T, E> fmt::Debug for AsyncIterable<'_, T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("AsyncIterable").finish_non_exhaustive()
    }
}

impl<'a, T: 'a, E: 'a, X> Source<'a, T, E> for Vec<X>
where
    X: Into<Element<'a, T, E>> + Send + 'a,
{
    fn into_cursor(self) -> Option<Cursor<'a, T, E>> {
        Iterable::<'a, T, E>::new(self).into_cursor()
    }
}

impl<'a, T: 'a, E: 'a, X, const N: usize> Source<'a, T, E> for [X; N]
where
    X: Into<Element<'a, T, E>> + Send + 'a,
{
    fn into_cursor(self) -> Option<Cursor<'a, T, E>> {
        Iterable::<'a, T, E>::new(self).into_cursor()
    }
}
