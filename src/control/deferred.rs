//! Manually settled future.
//!
//! This module provides [`Deferred`], a value whose outcome is decided from
//! the outside by calling [`Deferred::resolve`] or [`Deferred::reject`]. It
//! behaves like any other future once settled: awaiting it (or any of its
//! clones) yields the stored outcome as a `Result<T, E>`.
//!
//! # Settlement
//!
//! A deferred starts out [`Settlement::Pending`] and transitions exactly once
//! to [`Settlement::Fulfilled`] or [`Settlement::Rejected`]. The first call
//! wins. What happens on later calls depends on [`DeferredOptions`]:
//!
//! - by default they are silently ignored and return `Ok(())`
//! - with [`DeferredOptions::strict`] they return a [`DeferredError`]
//!   naming the state the deferred is already in
//!
//! Neither policy changes an outcome that has already been stored.
//!
//! # Chaining
//!
//! `Deferred<T, E>` implements `Future<Output = Result<T, E>>`, so the
//! combinators from [`futures::FutureExt`] and [`futures::TryFutureExt`]
//! apply directly: `map_ok` and `and_then` sequence continuations,
//! `or_else` recovers from a rejection, and `inspect` runs cleanup whatever
//! the outcome.
//!
//! # Examples
//!
//! ```rust
//! use pmap::control::{Deferred, Settlement};
//!
//! let deferred: Deferred<i32, String> = Deferred::default();
//! let waiter = deferred.clone();
//!
//! deferred.resolve(42).unwrap();
//! deferred.reject("too late".to_string()).unwrap(); // ignored
//!
//! assert_eq!(deferred.state(), Settlement::Fulfilled);
//! assert_eq!(futures::executor::block_on(waiter), Ok(42));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

// =============================================================================
// Settlement State
// =============================================================================

/// The observable state of a [`Deferred`].
///
/// Transitions are monotonic: once a deferred leaves `Pending` it never
/// changes state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// Neither resolved nor rejected yet.
    Pending,
    /// Resolved with a value.
    Fulfilled,
    /// Rejected with a reason.
    Rejected,
}

impl fmt::Display for Settlement {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(formatter, "pending"),
            Self::Fulfilled => write!(formatter, "fulfilled"),
            Self::Rejected => write!(formatter, "rejected"),
        }
    }
}

// =============================================================================
// Options and Errors
// =============================================================================

/// Configuration for a [`Deferred`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeferredOptions {
    /// When `true`, settling an already settled deferred returns a
    /// [`DeferredError`] instead of being silently ignored.
    pub error_on_double_settle: bool,
}

impl DeferredOptions {
    /// Options that silently ignore repeated settlement.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            error_on_double_settle: false,
        }
    }

    /// Options that report repeated settlement as an error.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            error_on_double_settle: true,
        }
    }

    /// Sets whether repeated settlement is reported as an error.
    #[must_use]
    pub const fn with_error_on_double_settle(mut self, enabled: bool) -> Self {
        self.error_on_double_settle = enabled;
        self
    }
}

/// Usage error returned by strict deferreds that are settled twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeferredError {
    /// The deferred was already resolved.
    #[error("it is already fulfilled")]
    AlreadyFulfilled,

    /// The deferred was already rejected.
    #[error("it is already rejected")]
    AlreadyRejected,
}

// =============================================================================
// Deferred
// =============================================================================

enum Cell<T, E> {
    Pending(Option<oneshot::Sender<Result<T, E>>>),
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> Cell<T, E> {
    const fn settlement(&self) -> Settlement {
        match self {
            Self::Pending(_) => Settlement::Pending,
            Self::Fulfilled(_) => Settlement::Fulfilled,
            Self::Rejected(_) => Settlement::Rejected,
        }
    }
}

/// A future settled by hand.
///
/// Every clone shares the same settlement: resolving one clone resolves them
/// all, and every clone can be awaited independently.
///
/// The awaitable side is a [`Shared`] future fed by a oneshot channel whose
/// sender lives next to the stored outcome. If every handle is dropped while
/// the deferred is still pending, outstanding awaits never complete.
///
/// # Type Parameters
///
/// - `T`: The success value.
/// - `E`: The rejection reason.
pub struct Deferred<T, E> {
    cell: Arc<Mutex<Cell<T, E>>>,
    options: DeferredOptions,
    awaitable: Shared<BoxFuture<'static, Result<T, E>>>,
}

/// Creates a pending [`Deferred`] that ignores repeated settlement.
///
/// # Examples
///
/// ```rust
/// use pmap::control::defer;
///
/// let deferred = defer::<u8, ()>();
/// assert!(deferred.is_pending());
/// ```
#[must_use]
pub fn defer<T, E>() -> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    Deferred::new(DeferredOptions::new())
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a pending deferred with the given options.
    #[must_use]
    pub fn new(options: DeferredOptions) -> Self {
        let (sender, receiver) = oneshot::channel::<Result<T, E>>();
        let awaitable = async move {
            match receiver.await {
                Ok(outcome) => outcome,
                Err(oneshot::Canceled) => futures::future::pending().await,
            }
        }
        .boxed()
        .shared();

        Self {
            cell: Arc::new(Mutex::new(Cell::Pending(Some(sender)))),
            options,
            awaitable,
        }
    }

    /// Resolves the deferred with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DeferredError`] if the deferred is already settled and was
    /// created with [`DeferredOptions::strict`]. Otherwise a repeated call is
    /// a no-op.
    pub fn resolve(&self, value: T) -> Result<(), DeferredError> {
        self.settle(Ok(value))
    }

    /// Rejects the deferred with `reason`.
    ///
    /// # Errors
    ///
    /// Same policy as [`Deferred::resolve`].
    pub fn reject(&self, reason: E) -> Result<(), DeferredError> {
        self.settle(Err(reason))
    }

    /// Settles the deferred with either outcome.
    ///
    /// # Errors
    ///
    /// Same policy as [`Deferred::resolve`].
    pub fn settle(&self, outcome: Result<T, E>) -> Result<(), DeferredError> {
        let mut cell = self.cell.lock();
        let sender = match &mut *cell {
            Cell::Pending(sender) => sender.take(),
            Cell::Fulfilled(_) => return self.refuse(DeferredError::AlreadyFulfilled),
            Cell::Rejected(_) => return self.refuse(DeferredError::AlreadyRejected),
        };

        *cell = match &outcome {
            Ok(value) => Cell::Fulfilled(value.clone()),
            Err(reason) => Cell::Rejected(reason.clone()),
        };
        drop(cell);

        if let Some(sender) = sender {
            // The receiver is owned by `awaitable`, which outlives this call.
            let _ = sender.send(outcome);
        }
        Ok(())
    }

    /// Returns a clone of the stored value, if fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &*self.cell.lock() {
            Cell::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns a clone of the stored reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<E> {
        match &*self.cell.lock() {
            Cell::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

impl<T, E> Deferred<T, E> {
    /// Returns the current settlement state.
    #[must_use]
    pub fn state(&self) -> Settlement {
        self.cell.lock().settlement()
    }

    /// Returns `true` while neither resolved nor rejected.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == Settlement::Pending
    }

    /// Returns `true` once resolved.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.state() == Settlement::Fulfilled
    }

    /// Returns `true` once rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.state() == Settlement::Rejected
    }

    /// Returns the options this deferred was created with.
    #[must_use]
    pub const fn options(&self) -> DeferredOptions {
        self.options
    }

    fn refuse(&self, error: DeferredError) -> Result<(), DeferredError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            %error,
            strict = self.options.error_on_double_settle,
            "repeated settlement of deferred"
        );
        if self.options.error_on_double_settle {
            Err(error)
        } else {
            Ok(())
        }
    }
}

impl<T, E> Default for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DeferredOptions::default())
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            options: self.options,
            awaitable: self.awaitable.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Deferred")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Clone, E: Clone> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        self.awaitable.poll_unpin(context)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
