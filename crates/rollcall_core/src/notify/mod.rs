//! Advisory change notification between views of one tracker store.
//!
//! # Responsibility
//! - Broadcast "collection changed" events to in-process subscribers.
//! - Detect commits made by other processes sharing the same database file.
//!
//! # Invariants
//! - Delivery is best-effort: publishing never fails and never blocks.
//! - A view that missed a signal stays stale until its next read; there is
//!   no locking and the last committed write wins.

mod watcher;

pub use watcher::StorageWatcher;

use log::debug;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// Which collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    StudentsUpdated,
    AttendanceUpdated,
}

impl ChangeEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StudentsUpdated => "students-updated",
            Self::AttendanceUpdated => "attendance-updated",
        }
    }
}

/// In-process publish/subscribe channel for change events.
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (sender, receiver) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(sender);
        }
        receiver
    }

    /// Sends `event` to every live subscriber and returns how many got it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return 0;
        };
        subscribers.retain(|subscriber| subscriber.send(event).is_ok());
        debug!(
            "event=change_publish module=notify status=ok kind={} delivered={}",
            event.as_str(),
            subscribers.len()
        );
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map_or(0, |subscribers| subscribers.len())
    }
}
