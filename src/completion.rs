//! Single-resolution completions for work handed to blocking workers
//!
//! A [`Completion`] is consumed when resolved, so a result can be delivered at
//! most once. The paired [`Pending`] future yields that value, or a caller-chosen
//! fallback when the worker goes away without resolving.

use tokio::sync::oneshot;

/// Resolving half, consumed on use.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<T>,
}

/// Awaiting half.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

pub fn channel<T>() -> (Completion<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Completion { tx }, Pending { rx })
}

impl<T> Completion<T> {
    /// Deliver the value. Returns false if nobody is waiting any more.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl<T> Pending<T> {
    /// Wait for the value, substituting `fallback` if the completion was dropped.
    pub async fn wait_or(self, fallback: T) -> T {
        match self.rx.await {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Completion dropped before resolving, using fallback");
                fallback
            }
        }
    }
}

/// Run `work` on the blocking thread pool and await its single result.
///
/// A panic inside `work` drops the completion and yields `fallback`.
pub async fn run_blocking<T, F>(fallback: T, work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (completion, pending) = channel();
    tokio::task::spawn_blocking(move || {
        let value = work();
        completion.resolve(value);
    });
    pending.wait_or(fallback).await
}
