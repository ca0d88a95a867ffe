use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::debug;

/// Rate-limits repeated invocations of an async callback.
///
/// Each [`call`](Debouncer::call) supersedes the run still waiting on its
/// timer and schedules a fresh one: the callback executes once the calls
/// stop for the quiet period, with the latest arguments. A run whose timer
/// has already fired is past cancellation and completes normally, so an
/// in-flight request is never torn down mid-await.
///
/// Nothing is returned synchronously; a callback that produces a result
/// must publish it itself (a channel, typically). Dropping the `Debouncer`
/// does not cancel a run that is already scheduled.
pub struct Debouncer<A> {
    delay: Duration,
    callback: Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F, Fut>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            callback: Arc::new(move |args| Box::pin(callback(args))),
            cancel: None,
        }
    }

    /// Schedule the callback with `args` after the quiet period,
    /// cancelling the previously scheduled run if its timer has not fired
    /// yet.
    pub fn call(&mut self, args: A) {
        if let Some(previous) = self.cancel.take() {
            // Ignored if the previous timer already fired.
            let _ = previous.send(());
        }

        let (tx, rx) = oneshot::channel();
        self.cancel = Some(tx);

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // A dropped sender (debouncer went away) disables this
                // branch and lets the run proceed; only an explicit
                // supersede cancels it.
                Ok(()) = rx => {
                    debug!("debounced call superseded");
                    return;
                }
            }
            callback(args).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn recording_debouncer(delay_ms: u64) -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |v: u32| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(v);
            }
        });
        (debouncer, seen)
    }

    #[tokio::test]
    async fn burst_runs_once_with_latest_arguments() {
        let (mut debouncer, seen) = recording_debouncer(150);

        for v in 1..=5 {
            debouncer.call(v);
            sleep(Duration::from_millis(30)).await;
        }
        sleep(Duration::from_millis(300)).await;

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn separate_quiet_periods_each_run() {
        let (mut debouncer, seen) = recording_debouncer(50);

        debouncer.call(1);
        sleep(Duration::from_millis(150)).await;
        debouncer.call(2);
        sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn pending_run_survives_debouncer_drop() {
        let (mut debouncer, seen) = recording_debouncer(50);

        debouncer.call(7);
        drop(debouncer);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }
}
