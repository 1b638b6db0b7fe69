//! Timer helpers.
//!
//! Thin wrappers over [`tokio::time`]; they must be awaited inside a Tokio
//! runtime with the time driver enabled.

use std::future::Future;
use std::time::Duration;

/// Completes after `duration` has elapsed.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     pmap::time::sleep(Duration::from_millis(1)).await;
/// }
/// ```
pub fn sleep(duration: Duration) -> impl Future<Output = ()> + Send + 'static {
    tokio::time::sleep(duration)
}

/// Completes after `milliseconds` milliseconds.
pub fn sleep_ms(milliseconds: u64) -> impl Future<Output = ()> + Send + 'static {
    sleep(Duration::from_millis(milliseconds))
}
