//! Shutdown coordination for the service.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Long-running tasks hold a [`ShutdownSignal`] and stop when it resolves.
/// The signal fires on an explicit [`trigger`](Shutdown::trigger) or when the
/// coordinator itself is dropped, so a test or supervisor that loses the
/// handle cannot strand background tasks.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Hand out a signal for one long-running task.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the shutdown signal for every subscriber.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of the shutdown state.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is requested.
    ///
    /// A closed channel (coordinator dropped) counts as a request.
    pub async fn recv(&mut self) {
        let _ = self.rx.recv().await;
    }

    /// Derive an independent signal for another task.
    pub fn resubscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.rx.resubscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn trigger_releases_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = first.resubscribe();

        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), first.recv())
            .await
            .expect("signal must resolve after trigger");
        tokio::time::timeout(Duration::from_secs(1), second.recv())
            .await
            .expect("resubscribed signal must resolve too");
    }

    #[tokio::test]
    async fn dropping_the_coordinator_releases_subscribers() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();

        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("signal must resolve when the coordinator is dropped");
    }
}
