//! Navigation side effects and the HRMS route table.
//!
//! The core never touches a concrete router. It asks a `Navigator` to push,
//! replace, or hard-redirect, and front ends decide what that means.

pub mod routes;

use std::sync::Mutex;

pub use routes::{nav_items, NavItem, Route};

pub trait Navigator: Send + Sync {
    /// Add a history entry
    fn push(&self, path: &str);

    /// Replace the current history entry (no back-navigation into it)
    fn replace(&self, path: &str);

    /// Full reload at `path`, discarding in-memory state
    fn hard_redirect(&self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Push(String),
    Replace(String),
    Hard(String),
}

impl NavigationEvent {
    pub fn path(&self) -> &str {
        match self {
            NavigationEvent::Push(p) | NavigationEvent::Replace(p) | NavigationEvent::Hard(p) => p,
        }
    }
}

/// Navigator that records every request in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigationEvent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<NavigationEvent> {
        self.events().pop()
    }

    fn record(&self, event: NavigationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        self.record(NavigationEvent::Push(path.to_string()));
    }

    fn replace(&self, path: &str) {
        self.record(NavigationEvent::Replace(path.to_string()));
    }

    fn hard_redirect(&self, path: &str) {
        self.record(NavigationEvent::Hard(path.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_keeps_order() {
        let nav = RecordingNavigator::new();
        nav.push("/employees");
        nav.replace("/login");
        nav.hard_redirect("/login");

        assert_eq!(
            nav.events(),
            vec![
                NavigationEvent::Push("/employees".to_string()),
                NavigationEvent::Replace("/login".to_string()),
                NavigationEvent::Hard("/login".to_string()),
            ]
        );
        assert_eq!(nav.last().map(|e| e.path().to_string()), Some("/login".to_string()));
    }
}
