//! Navigation requests issued by the session layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` must redirect after login, logout, and credential rejection, but
//! the router's `use_navigate` is only reachable from inside `<Router>`. The
//! session therefore talks to a `Navigator`; in the app that is a
//! `NavigationQueue` drained by the `NavigationBridge` component.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use leptos::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigationRequest {
    pub fn push(path: &str) -> Self {
        Self { path: path.to_owned(), replace: false }
    }

    pub fn replace(path: &str) -> Self {
        Self { path: path.to_owned(), replace: true }
    }
}

pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, request: NavigationRequest);
}

/// Single-slot queue of the latest navigation request.
///
/// Only the most recent request survives until the bridge drains it.
#[derive(Debug, Clone, Copy)]
pub struct NavigationQueue {
    pending: RwSignal<Option<NavigationRequest>>,
}

impl NavigationQueue {
    pub fn new() -> Self {
        Self { pending: RwSignal::new(None) }
    }

    /// Tracked read of the pending request.
    pub fn pending(&self) -> Option<NavigationRequest> {
        self.pending.get()
    }

    /// Remove and return the pending request without notifying subscribers.
    pub fn take(&self) -> Option<NavigationRequest> {
        let mut taken = None;
        self.pending.update_untracked(|slot| taken = slot.take());
        taken
    }
}

impl Default for NavigationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for NavigationQueue {
    fn navigate(&self, request: NavigationRequest) {
        log::debug!("queueing navigation to {}", request.path);
        self.pending.set(Some(request));
    }
}
