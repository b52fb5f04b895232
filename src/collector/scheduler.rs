//! Periodic cycles.
//!
//! Cycles never overlap: the loop awaits each cycle, and ticks missed while
//! a cycle runs are skipped rather than replayed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::Collector;

/// Handle for controlling periodic collection.
///
/// Drop this handle to stop collection, or call `stop()` explicitly.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop collection and wait for the loop to exit.
    ///
    /// A cycle in flight is abandoned; nothing it collected is published.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

pub(super) fn spawn(collector: Arc<Collector>, period: Duration) -> SchedulerHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Collecting every {:?}", period);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    tokio::select! {
                        _ = collector.collect_once() => {}
                        _ = stop_rx.changed() => {
                            debug!("Stopped during a cycle");
                            break;
                        }
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Periodic collection stopped");
    });

    SchedulerHandle { stop_tx, task }
}
