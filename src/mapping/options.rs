//! Options controlling a mapping run.

use std::fmt;
use std::num::NonZeroUsize;

/// Upper bound on the number of transforms in flight at once.
///
/// A limit of zero means no limit, so `Concurrency::from(0)` is
/// [`Concurrency::Unbounded`].
///
/// # Examples
///
/// ```rust
/// use pmap::mapping::Concurrency;
///
/// assert_eq!(Concurrency::from(0), Concurrency::Unbounded);
/// assert!(Concurrency::from(2).allows(1));
/// assert!(!Concurrency::from(2).allows(2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Option<i64>", into = "Option<u64>"))]
pub enum Concurrency {
    /// Every pulled element starts its transform immediately.
    #[default]
    Unbounded,
    /// At most this many transforms are in flight.
    Limited(NonZeroUsize),
}

impl Concurrency {
    /// Creates a limit of `limit` transforms, or no limit if `limit` is 0.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(limit) => Self::Limited(limit),
            None => Self::Unbounded,
        }
    }

    /// Returns the numeric limit, or `None` when unbounded.
    #[must_use]
    pub const fn limit(self) -> Option<NonZeroUsize> {
        match self {
            Self::Unbounded => None,
            Self::Limited(limit) => Some(limit),
        }
    }

    /// Returns `true` if another transform may start while `in_flight` are
    /// already running.
    #[must_use]
    #[inline]
    pub const fn allows(self, in_flight: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(limit) => in_flight < limit.get(),
        }
    }
}

impl From<usize> for Concurrency {
    fn from(limit: usize) -> Self {
        Self::new(limit)
    }
}

impl From<NonZeroUsize> for Concurrency {
    fn from(limit: NonZeroUsize) -> Self {
        Self::Limited(limit)
    }
}

impl From<Option<i64>> for Concurrency {
    fn from(limit: Option<i64>) -> Self {
        limit
            .filter(|limit| *limit > 0)
            .and_then(|limit| usize::try_from(limit).ok())
            .map_or(Self::Unbounded, Self::new)
    }
}

impl From<Concurrency> for Option<u64> {
    fn from(concurrency: Concurrency) -> Self {
        concurrency.limit().map(|limit| limit.get() as u64)
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(formatter, "unbounded"),
            Self::Limited(limit) => write!(formatter, "{limit}"),
        }
    }
}

/// Options accepted by [`map`](super::map).
///
/// # Examples
///
/// ```rust
/// use pmap::mapping::{Concurrency, MapOptions};
///
/// let options = MapOptions::new().with_concurrency(4);
/// assert_eq!(options.concurrency, Concurrency::from(4));
/// assert_eq!(MapOptions::default().concurrency, Concurrency::Unbounded);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapOptions {
    /// Maximum number of transforms in flight.
    pub concurrency: Concurrency,
}

impl MapOptions {
    /// Options with no concurrency limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            concurrency: Concurrency::Unbounded,
        }
    }

    /// Sets the concurrency limit; 0 removes the limit.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: impl Into<Concurrency>) -> Self {
        self.concurrency = concurrency.into();
        self
    }
}

impl From<usize> for MapOptions {
    fn from(concurrency: usize) -> Self {
        Self::new().with_concurrency(concurrency)
    }
}

impl From<Concurrency> for MapOptions {
    fn from(concurrency: Concurrency) -> Self {
        Self { concurrency }
    }
}
