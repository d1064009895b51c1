use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Result;

/// Supervised group of the relayer's long running processes.
///
/// Every process observes the shared shutdown channel. A failing process is
/// restarted after the retry delay when it was spawned restartable; otherwise
/// its error is fatal and, with `exit_on_error`, cancels the siblings and
/// propagates out of `run`.
pub struct Supervisor {
    shutdown: watch::Sender<bool>,
    tasks: JoinSet<(&'static str, Result<()>)>,
    exit_on_error: bool,
    retry_delay: Duration,
}

impl Supervisor {
    pub fn new(exit_on_error: bool, retry_delay: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            tasks: JoinSet::new(),
            exit_on_error,
            retry_delay,
        }
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Spawns a process from a factory so it can be restarted after errors.
    pub fn spawn<F, Fut>(&mut self, name: &'static str, is_restartable_on_error: bool, factory: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let retry_delay = self.retry_delay;
        let shutdown = self.shutdown.subscribe();
        self.tasks.spawn(async move {
            loop {
                match factory().await {
                    Ok(()) => return (name, Ok(())),
                    Err(err) => {
                        if !is_restartable_on_error || *shutdown.borrow() {
                            return (name, Err(err));
                        }
                        warn!(process = name, %err, "process failed, restarting");
                        tokio::time::sleep(retry_delay).await;
                    }
                }
            }
        });
    }

    /// Waits for the group to finish. The first fatal process error is
    /// returned once every sibling has been cancelled and drained.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut first_error: Option<anyhow::Error> = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => info!(process = name, "process finished"),
                Ok((name, Err(err))) => {
                    error!(process = name, %err, "process failed");
                    if self.exit_on_error {
                        let _ = self.shutdown.send(true);
                        self.tasks.abort_all();
                        first_error
                            .get_or_insert_with(|| anyhow::anyhow!("process {name} failed: {err}"));
                    }
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    first_error.get_or_insert_with(|| anyhow::anyhow!(join_err));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn restartable_process_is_retried() {
        let mut supervisor = Supervisor::new(true, Duration::from_millis(1));
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        supervisor.spawn("flaky", true, move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::RpcResponse("transient".to_string()))
                } else {
                    Ok(())
                }
            }
        });

        supervisor.run().await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_error_cancels_siblings() {
        let mut supervisor = Supervisor::new(true, Duration::from_millis(1));
        let shutdown = supervisor.shutdown_receiver();

        supervisor.spawn("forever", false, {
            let shutdown = shutdown.clone();
            move || {
                let mut shutdown = shutdown.clone();
                async move {
                    // Runs until the supervisor broadcasts shutdown
                    let _ = shutdown.changed().await;
                    Ok(())
                }
            }
        });
        supervisor.spawn("fatal", false, move || async move {
            Err(Error::RpcResponse("boom".to_string()))
        });

        let result = supervisor.run().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn non_restartable_error_without_exit_on_error_is_swallowed() {
        let mut supervisor = Supervisor::new(false, Duration::from_millis(1));
        supervisor.spawn("fatal", false, move || async move {
            Err(Error::RpcResponse("boom".to_string()))
        });
        supervisor.spawn("fine", false, move || async move { Ok(()) });

        supervisor.run().await.unwrap();
    }
}
