//! Sidebar Component
//!
//! App navigation: a collapsible Tasks menu (one link per task type) and the
//! journal.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::models::TaskType;

#[component]
pub fn Sidebar() -> impl IntoView {
    let (tasks_open, set_tasks_open) = signal(true);

    view! {
        <nav class="sidebar">
            <h1 class="sidebar-title">"Smart OS"</h1>
            <div class="nav-item">
                <div class="nav-item-header" on:click=move |_| set_tasks_open.update(|open| *open = !*open)>
                    <span>"Tasks"</span>
                    <span class=move || if tasks_open.get() { "arrow down" } else { "arrow right" }></span>
                </div>
                <div class=move || if tasks_open.get() { "submenu open" } else { "submenu" }>
                    {TaskType::ALL
                        .iter()
                        .map(|ty| view! { <A href=ty.route()>{ty.label()}</A> })
                        .collect_view()}
                </div>
            </div>
            <hr class="sidebar-divider" />
            <A href="/journal">"Journal"</A>
        </nav>
    }
}
