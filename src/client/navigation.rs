use std::fmt;
use tokio::sync::watch;

/// Sends the user somewhere else, typically the login screen after the session is lost.
pub trait Navigator: Send + Sync + fmt::Debug {
    fn navigate(&self, path: &str);
}

/// Only records the redirect in the log. Used by headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path = %path, "Navigation requested");
    }
}

/// Publishes the latest requested location on a watch channel for a UI loop to follow.
#[derive(Debug)]
pub struct WatchNavigator {
    tx: watch::Sender<Option<String>>,
}

impl WatchNavigator {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

impl Default for WatchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, path: &str) {
        // send_replace keeps the value even when nobody is subscribed yet.
        self.tx.send_replace(Some(path.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_navigator_notifies_subscribers() {
        let navigator = WatchNavigator::new();
        let mut rx = navigator.subscribe();
        assert_eq!(navigator.current(), None);

        navigator.navigate("/login");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("/login"));
        assert_eq!(navigator.current().as_deref(), Some("/login"));
    }
}
