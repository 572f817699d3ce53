//! Frame driver
//!
//! Stands in for a display refresh callback: a local tokio task that
//! fires the engine's pending frame at a fixed rate. The engine is not
//! `Send`, so the driver must run inside a [`tokio::task::LocalSet`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::MultitrackEngine;

/// Handle to a running frame loop
pub struct FrameDriver {
    handle: JoinHandle<()>,
}

impl FrameDriver {
    /// Start the loop on the current `LocalSet`
    ///
    /// Each period either runs the engine's pending frame or, while
    /// paused, reads back envelope gestures. The loop ends by itself
    /// once the engine is destroyed.
    pub fn spawn(engine: Rc<RefCell<MultitrackEngine>>, period: Duration) -> Self {
        let handle = tokio::task::spawn_local(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let mut engine = engine.borrow_mut();
                if engine.is_destroyed() {
                    debug!("Engine destroyed, frame driver exiting");
                    break;
                }
                if !engine.on_frame() {
                    engine.sync_envelopes();
                }
            }
        });

        Self { handle }
    }

    /// Stop the loop without touching the engine
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to end (after `destroy()` or `abort()`)
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                debug!("Frame driver ended abnormally: {}", e);
            }
        }
    }
}
