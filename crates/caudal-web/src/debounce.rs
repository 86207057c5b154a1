//! Single-slot, latest-wins debouncing for live-view recomputation.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

/// Default quiet window between the last submission and the handler run.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(400);

/// Coalesces rapid submissions into one handler run.
///
/// [`Debouncer::submit`] stores the latest value and restarts the quiet
/// window; only after a full window of silence does the worker invoke the
/// handler, with the value that ended the burst. Values superseded during
/// the window are never executed. A single worker task runs the handler,
/// so runs are strictly sequential and no partial result from a superseded
/// submission can ever be observed.
///
/// Dropping the debouncer stops the worker; a value still inside its quiet
/// window at that point is discarded.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// Spawn the worker task with the given quiet window and handler.
    pub fn new<F, Fut>(window: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = watch::channel(None);

        tokio::spawn(async move {
            loop {
                // Wait for a submission to start a burst
                if rx.changed().await.is_err() {
                    break;
                }
                // Quiet window, restarted by every further submission
                loop {
                    let sleep = tokio::time::sleep(window);
                    tokio::pin!(sleep);
                    tokio::select! {
                        () = &mut sleep => break,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                }
                let latest = rx.borrow_and_update().clone();
                if let Some(value) = latest {
                    handler(value).await;
                }
            }
        });

        Self { tx }
    }

    /// Store `value` as the latest submission and restart the quiet window.
    pub fn submit(&self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn recording_debouncer(
        window: Duration,
    ) -> (Debouncer<u32>, mpsc::UnboundedReceiver<u32>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(window, move |value: u32| {
            let tx = tx.clone();
            async move {
                tx.send(value).unwrap();
            }
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_submissions_coalesce_into_one_run() {
        let (debouncer, mut runs) = recording_debouncer(Duration::from_millis(400));

        for value in 1..=5 {
            debouncer.submit(value);
            // Well inside the quiet window
            tokio::time::advance(Duration::from_millis(50)).await;
        }
        tokio::time::advance(Duration::from_millis(400)).await;

        assert_eq!(runs.recv().await, Some(5));
        assert!(runs.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_run_once() {
        let (debouncer, mut runs) = recording_debouncer(Duration::from_millis(400));

        debouncer.submit(1);
        debouncer.submit(2);
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(runs.recv().await, Some(2));

        debouncer.submit(3);
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(runs.recv().await, Some(3));
        assert!(runs.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_during_window_restarts_it() {
        let (debouncer, mut runs) = recording_debouncer(Duration::from_millis(400));

        debouncer.submit(1);
        tokio::time::advance(Duration::from_millis(350)).await;
        // Still quiet for the restarted window, nothing has run
        assert!(runs.try_recv().is_err());

        debouncer.submit(2);
        tokio::time::advance(Duration::from_millis(350)).await;
        assert!(runs.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(runs.recv().await, Some(2));
        assert!(runs.try_recv().is_err());
    }
}
