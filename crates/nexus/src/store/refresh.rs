//! Periodic refresh driver
//!
//! Runs `refresh_all` on a background thread at the store's configured
//! interval until stopped. The thread blocks on a stop channel between
//! ticks, so `stop()` takes effect immediately instead of waiting out
//! the interval.

use crate::store::Store;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Handle to the refresh thread
pub struct Refresher {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    /// Start refreshing `store` every `interval`
    ///
    /// The first refresh happens after one full interval; callers wanting
    /// immediate data run `refresh_all` themselves before starting.
    pub fn start(store: Arc<Store>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!("running scheduled refresh");
                    store.refresh_all();
                }
                // stop requested, or the handle was dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the refresh loop and wait for the thread to finish
    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.stop();
    }
}
