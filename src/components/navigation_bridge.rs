//! Executes navigation requested by the session through the router.
//!
//! SYSTEM CONTEXT
//! ==============
//! Must be mounted inside `<Router>`; `use_navigate` is unavailable elsewhere.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::navigation::NavigationQueue;

#[component]
pub fn NavigationBridge(queue: NavigationQueue) -> impl IntoView {
    let navigate = use_navigate();
    Effect::new(move || {
        if queue.pending().is_none() {
            return;
        }
        if let Some(request) = queue.take() {
            let options = NavigateOptions { replace: request.replace, ..NavigateOptions::default() };
            navigate(&request.path, options);
        }
    });
}
