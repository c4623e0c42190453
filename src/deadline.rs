use std::{
    future::Future,
    time::Duration,
};

/// The deadline passed before the call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Speed test timed out after {}", humantime::format_duration(.0.to_owned()))]
pub struct Elapsed(pub Duration);

/// Runs `call` for at most `limit`.
///
/// When the limit is hit the call is dropped, which cancels it. If the call completes at the very
/// instant the deadline passes, the deadline wins.
pub async fn within<F>(limit: Duration, call: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    let deadline = tokio::time::sleep(limit);
    tokio::select! {
        biased;
        () = deadline => Err(Elapsed(limit)),
        output = call => Ok(output),
    }
}
