//! # finmanager-client
//!
//! Leptos + WASM frontend for the FinManager personal finance app.
//!
//! This crate owns the client-side session: a `localStorage`-backed store
//! that resynchronizes across tabs, the session container that holds the
//! access token and user, the route guard, and the HTTP pipeline that attaches
//! the bearer token and tears the session down on `401`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// WASM entry point: hydrate the server-rendered `App`.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    if let Err(e) = console_log::init_with_level(level) {
        leptos::logging::warn!("console logger already installed: {e}");
    }
    leptos::mount::hydrate_body(app::App);
}
