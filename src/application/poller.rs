// Interval poller - precondition-gated refresh loop
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a background polling task.
///
/// The task has two states. While the precondition channel reads false it
/// is idle, holding no timer. When the precondition becomes true it fires
/// an immediate fetch and then ticks at `period`. Any precondition change
/// tears the timer down before the state is re-evaluated, so exactly one
/// timer is ever live. Dropping the handle aborts the task; an in-flight
/// fetch is dropped with it and can never write anywhere afterwards.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        mut ready: watch::Receiver<bool>,
        fetch: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            loop {
                // idle: no timer exists until the precondition holds
                while !*ready.borrow() {
                    if ready.changed().await.is_err() {
                        return;
                    }
                }

                // polling: fetch immediately, then start the one timer
                run_fetch(name, &fetch).await;
                let mut ticker = tokio::time::interval(period);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = ticker.tick() => run_fetch(name, &fetch).await,
                        changed = ready.changed() => match changed {
                            Ok(()) => break,
                            Err(_) => return,
                        },
                    }
                }
            }
        });
        Self { handle }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Failures are logged and the loop keeps going; the next tick retries
/// unconditionally, with no backoff and no retry ceiling.
async fn run_fetch<F, Fut>(name: &str, fetch: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if let Err(e) = fetch().await {
        tracing::warn!("{name} poll failed: {e:#}");
    }
}
