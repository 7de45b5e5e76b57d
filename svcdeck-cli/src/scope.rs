//! Lifetime of the dashboard view.
//!
//! Every job the view spawns holds a [`ScopeToken`]. Once the owning
//! [`ViewScope`] is cancelled or dropped, pending requests are abandoned and
//! their results are never posted.

use std::future::Future;

use tokio::sync::watch;

pub struct ViewScope {
    tx: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct ScopeToken {
    rx: watch::Receiver<bool>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the scope is cancelled or its owner is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drive `fut` unless the scope ends first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut token = self.clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
