//! Download progress channel
//!
//! Providers hold a `ProgressMonitor` while they fetch model data; the
//! orchestrator drains the matching `ProgressStream`. The stream ends once
//! every monitor clone has been dropped, which happens when the session
//! completes.

use serde::Serialize;
use tokio::sync::mpsc;

/// One download-progress update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    pub loaded: u64,
    pub total: u64,
    /// `round(loaded / total * 100)`, clamped to 0..=100
    pub percentage: u8,
}

impl DownloadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((loaded as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }
}

/// Create a connected monitor / stream pair
pub fn channel() -> (ProgressMonitor, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressMonitor { tx: Some(tx) }, ProgressStream { rx })
}

/// Producer side, handed to the provider at session creation
#[derive(Clone, Debug)]
pub struct ProgressMonitor {
    tx: Option<mpsc::UnboundedSender<DownloadProgress>>,
}

impl ProgressMonitor {
    /// A monitor whose reports go nowhere
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Report `loaded` of `total` bytes fetched
    pub fn report(&self, loaded: u64, total: u64) {
        if let Some(tx) = &self.tx {
            // The receiver is gone once the request finished; late reports are dropped.
            let _ = tx.send(DownloadProgress::new(loaded, total));
        }
    }
}

/// Consumer side, drained by the orchestrator
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<DownloadProgress>,
}

impl ProgressStream {
    /// Next update, or `None` once every monitor has been dropped
    pub async fn next(&mut self) -> Option<DownloadProgress> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`next`](Self::next)
    pub fn try_next(&mut self) -> Option<DownloadProgress> {
        self.rx.try_recv().ok()
    }
}
