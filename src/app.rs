//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{ParentRoute, Route, Router, Routes},
};

use crate::components::{main_layout::MainLayout, navigation_bridge::NavigationBridge, protected_route::ProtectedRoute};
use crate::pages::{dashboard::DashboardPage, login::LoginPage, not_found::NotFoundPage};
use crate::state::auth::{AuthState, Session, provide_session};
use crate::state::navigation::NavigationQueue;
use crate::util::storage::LocalStore;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Restores the session from storage, mirrors it into an `RwSignal` for the
/// views, and marks it ready once mounted in the browser.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let queue = NavigationQueue::new();
    let session = Session::restore(session_store(), queue);

    let auth = RwSignal::new(session.snapshot());
    session.subscribe(move |state: &AuthState| auth.set(state.clone())).forget();

    #[cfg(feature = "hydrate")]
    {
        forward_storage_events(session.store().clone());
        let api = crate::net::interceptors::authorized_client(
            crate::config::ApiConfig::from_build_env(),
            crate::net::gloo_transport::GlooTransport,
            &session,
        );
        provide_context(api);
    }

    // Effects only run after mount, so SSR output always shows the loading gate.
    let ready_session = session.clone();
    Effect::new(move || {
        ready_session.mark_ready();
    });

    provide_context(auth);
    provide_session(session);

    view! {
        <Stylesheet id="leptos" href="/pkg/finmanager.css"/>
        <Title text="FinManager"/>

        <Router>
            <NavigationBridge queue=queue/>
            <Routes fallback=|| view! { <NotFoundPage/> }>
                <Route path=StaticSegment("login") view=LoginPage/>
                <ParentRoute path=StaticSegment("") view=MainLayout>
                    <Route
                        path=StaticSegment("")
                        view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }
                    />
                </ParentRoute>
            </Routes>
        </Router>
    }
}

#[cfg(feature = "hydrate")]
fn session_store() -> LocalStore {
    LocalStore::browser()
}

#[cfg(not(feature = "hydrate"))]
fn session_store() -> LocalStore {
    LocalStore::new(crate::util::storage::MemoryStorage::new())
}

/// Route the browser's cross-tab `storage` event into `store`.
#[cfg(feature = "hydrate")]
fn forward_storage_events(store: LocalStore) {
    use wasm_bindgen::{JsCast, closure::Closure};

    let Some(window) = web_sys::window() else {
        log::warn!("no window; cross-tab session sync disabled");
        return;
    };
    let cb = Closure::wrap(Box::new(move |ev: web_sys::StorageEvent| {
        store.notify_external(ev.key().as_deref());
    }) as Box<dyn FnMut(web_sys::StorageEvent)>);
    if let Err(e) = window.add_event_listener_with_callback("storage", cb.as_ref().unchecked_ref()) {
        log::warn!("could not listen for storage events: {e:?}");
    }
    // The listener lives as long as the page.
    cb.forget();
}
