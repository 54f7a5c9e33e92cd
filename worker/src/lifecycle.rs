//! Process lifecycle: one shutdown signal observed by every worker loop.

use tokio::sync::watch;

/// Owns the shutdown flag. Loops hold a [`ShutdownSignal`] and check it at
/// the top of every iteration instead of sharing ad hoc globals.
pub struct Lifecycle {
    tx: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested (or the owner is gone).
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_reaches_every_subscriber() {
        let lifecycle = Lifecycle::new();
        let mut first = lifecycle.subscribe();
        let second = lifecycle.subscribe();

        assert!(!first.is_shutdown());
        assert!(!second.is_shutdown());

        lifecycle.shutdown();
        first.triggered().await;
        assert!(first.is_shutdown());
        assert!(second.is_shutdown());
    }
}
