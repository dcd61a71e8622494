use log::info;
use tokio::sync::watch;

/// Cancellation context handed to the server.
/// Cancelling is one-way; every [`ShutdownSignal`] observes it.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// Receiving half of [`Shutdown`], cheap to clone into connection tasks.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> (Self, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, ShutdownSignal { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl ShutdownSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the context is cancelled.
    /// Dropping the [`Shutdown`] without cancelling counts as cancellation.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Completes on SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                    _ = term.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                log::warn!("unable to listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received SIGINT");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received interrupt");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel_reaches_every_clone() {
        let (shutdown, signal) = Shutdown::new();
        let mut a = signal.clone();
        let mut b = signal;
        assert!(!a.is_cancelled());

        let waiter = tokio::spawn(async move {
            a.cancelled().await;
        });
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(b.is_cancelled());
        // already cancelled: returns immediately
        tokio::time::timeout(Duration::from_secs(1), b.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_drop_counts_as_cancel() {
        let (shutdown, mut signal) = Shutdown::new();
        drop(shutdown);
        tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
            .await
            .unwrap();
    }
}
