//! Control primitives for driving asynchronous work by hand.
//!
//! - [`Deferred`]: A future whose outcome is decided by calling
//!   [`Deferred::resolve`] or [`Deferred::reject`]
//!
//! # Examples
//!
//! ```rust
//! use futures::TryFutureExt;
//! use pmap::control::defer;
//!
//! let deferred = defer::<i32, String>();
//! let doubled = deferred.clone().map_ok(|value| value * 2);
//!
//! deferred.resolve(21).unwrap();
//! assert_eq!(futures::executor::block_on(doubled), Ok(42));
//! ```

mod deferred;

pub use deferred::{Deferred, DeferredError, DeferredOptions, Settlement, defer};
