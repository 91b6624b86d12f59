use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Run a future, converting a panic into `Err(message)`.
///
/// Spawned tasks use this so that a panic is reported back to the event loop
/// instead of silently killing the task and leaving a loading flag stuck.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}
