use rocket::tokio::sync::watch;

use super::ThemeMode;

/// Observable current mode. The toggle control publishes here; resolvers
/// subscribe and read the initial value synchronously.
pub struct ModeChannel {
    tx: watch::Sender<ThemeMode>,
}

impl ModeChannel {
    pub fn new(initial: ThemeMode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ModeChannel { tx }
    }

    pub fn current(&self) -> ThemeMode {
        *self.tx.borrow()
    }

    /// Set the mode. Subscribers are only woken when the value changes.
    pub fn publish(&self, mode: ThemeMode) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                *current = mode;
                true
            }
        })
    }

    pub fn toggle(&self) -> ThemeMode {
        let next = self.current().toggled();
        self.publish(next);
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.tx.subscribe()
    }
}
