//! Failure outcomes of a mapping run.

/// Why a mapping run failed.
///
/// Element rejections and transform failures are not distinguished: both
/// carry the original reason unchanged in [`MapError::Rejected`]. Only the
/// first failure to settle is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError<E> {
    /// The source exposes neither synchronous nor asynchronous iteration.
    ///
    /// Reported before anything is pulled or transformed.
    #[error("{source_type} is not iterable")]
    NotIterable {
        /// Type name of the rejected source.
        source_type: &'static str,
    },

    /// An element, a pull, or a transform failed with this reason.
    #[error("{0}")]
    Rejected(E),
}

impl<E> MapError<E> {
    /// Creates the usage error for a source of type `S`.
    #[must_use]
    pub fn not_iterable<S: ?Sized>() -> Self {
        Self::NotIterable {
            source_type: std::any::type_name::<S>(),
        }
    }

    /// Returns `true` for the usage error.
    #[must_use]
    pub const fn is_not_iterable(&self) -> bool {
        matches!(self, Self::NotIterable { .. })
    }

    /// Returns the failure reason, or `None` for the usage error.
    #[must_use]
    pub fn into_reason(self) -> Option<E> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::NotIterable { .. } => None,
        }
    }

    /// Borrows the failure reason, or `None` for the usage error.
    #[must_use]
    pub const fn reason(&self) -> Option<&E> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::NotIterable { .. } => None,
        }
    }
}
