use rocket::tokio::sync::broadcast;
use serde::Serialize;

/// Change signal for one user's notifications. Carries no content; a
/// listener re-reads what it needs from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    pub user_id: i64,
}

/// In-process fan-out of notification changes to live streams.
pub struct NotificationHub {
    tx: broadcast::Sender<NotificationEvent>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        NotificationHub { tx }
    }

    /// Returns how many streams were listening. Nobody listening is fine.
    pub fn publish(&self, user_id: i64) -> usize {
        self.tx.send(NotificationEvent { user_id }).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        NotificationHub::new(256)
    }
}
