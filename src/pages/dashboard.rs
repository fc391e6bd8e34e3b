//! Landing view for signed-in users.

use leptos::prelude::*;

use crate::state::auth::AuthState;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let greeting = move || match auth.get().user {
        Some(user) => format!("Signed in as {}", user.email),
        None => String::new(),
    };

    view! {
        <div class="dashboard-page">
            <h1>"Dashboard"</h1>
            <p class="dashboard-page__greeting">{greeting}</p>
        </div>
    }
}
