//! Fallback for unmatched routes.

use leptos::prelude::*;

use crate::config::HOME_PATH;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="not-found-page">
            <h1>"Page not found"</h1>
            <a href=HOME_PATH>"Back to dashboard"</a>
        </div>
    }
}
