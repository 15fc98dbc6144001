//! Smart Life Frontend App
//!
//! Sidebar layout with the routed pages in the main column.

use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

use crate::api::ApiClient;
use crate::components::{ErrorBanner, Sidebar};
use crate::context::AppContext;
use crate::pages::{JournalPage, TasksPage};

#[component]
pub fn App(api: ApiClient) -> impl IntoView {
    // Provide context to all children
    provide_context(AppContext::new(api));

    view! {
        <Router>
            <div class="app-container">
                <Sidebar />
                <main class="main-content">
                    <ErrorBanner />
                    <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                        <Route path=path!("/tasks/:task_type") view=TasksPage />
                        // No type segment: general tasks
                        <Route path=path!("/tasks") view=TasksPage />
                        <Route path=path!("/journal") view=JournalPage />
                        <Route path=path!("/") view=|| view! { <Redirect path="/tasks/daily" /> } />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}
