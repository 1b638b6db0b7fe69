//! # pmap
//!
//! Concurrency-bounded, order-preserving asynchronous mapping.
//!
//! ## Overview
//!
//! - **Mapping**: [`mapping::map`] transforms every element of a synchronous
//!   or asynchronous source with at most N transforms in flight, returning
//!   the results in input order and stopping at the first failure
//! - **Control**: [`control::Deferred`], a future settled by hand, useful for
//!   feeding pending elements to a run or holding transforms open in tests
//! - **Time**: [`time::sleep`] for pacing work inside a Tokio runtime
//!
//! ## Feature Flags
//!
//! - `control`: [`control::Deferred`]
//! - `mapping`: [`mapping::map`] and its source types
//! - `time`: Tokio-backed timers
//! - `serde`: `Serialize`/`Deserialize` for the option types
//! - `tracing`: emit `tracing` events from mapping runs and deferreds
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use pmap::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let slow = defer::<i32, String>();
//! let elements: Vec<Element<'_, i32, String>> = vec![
//!     Element::Ready(1),
//!     Element::pending(slow.clone()),
//!     Element::Ready(3),
//! ];
//! slow.resolve(2).unwrap();
//!
//! let output = map(
//!     elements,
//!     |value: i32, _index: usize| async move { Ok::<_, String>(value * 10) },
//!     MapOptions::new().with_concurrency(2),
//! )
//! .await;
//! assert_eq!(output, Ok(vec![10, 20, 30]));
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use pmap::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "mapping")]
    pub use crate::mapping::*;

    #[cfg(feature = "time")]
    pub use crate::time::*;
}

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "mapping")]
pub mod mapping;

#[cfg(feature = "time")]
pub mod time;
