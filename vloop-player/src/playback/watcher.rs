//! Readiness watchers
//!
//! One watcher observes one clip load and delivers exactly one signal to
//! the scheduler (`ClipReady` or `ClipFailed`, tagged with the slot
//! identity and load token), then becomes inert. Detaching (or dropping) a
//! watcher aborts its task, so a superseded load can never signal into the
//! scheduler after its slot moved on.

use crate::media::ItemStatus;
use crate::playback::messages::SchedulerEvent;
use crate::playback::slot::SlotId;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;
use uuid::Uuid;

pub(crate) struct ReadinessWatcher {
    task: JoinHandle<()>,
}

impl ReadinessWatcher {
    /// Watch one load's status stream until it settles
    ///
    /// Fires immediately if the item is already ready (or failed) at
    /// subscription time.
    pub fn spawn(
        slot: SlotId,
        token: Uuid,
        mut status: watch::Receiver<ItemStatus>,
        signals: mpsc::UnboundedSender<SchedulerEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            loop {
                let current = *status.borrow_and_update();
                match current {
                    ItemStatus::Ready => {
                        let _ = signals.send(SchedulerEvent::ClipReady { slot, token });
                        return;
                    }
                    ItemStatus::Failed => {
                        let _ = signals.send(SchedulerEvent::ClipFailed { slot, token });
                        return;
                    }
                    ItemStatus::Loading => {}
                }
                if status.changed().await.is_err() {
                    // Item dropped before settling; nothing to report
                    trace!(%slot, %token, "status stream closed before readiness");
                    return;
                }
            }
        });
        Self { task }
    }

    /// Stop watching
    pub fn detach(self) {
        // Drop aborts the task
    }
}

impl Drop for ReadinessWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
