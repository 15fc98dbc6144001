//! Tasks Page
//!
//! Lists the tasks of the routed type with the new-task form on top.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::{NewTaskForm, TaskItem};
use crate::context::{use_app_context, AppContext};
use crate::dispatch::{self, EditToken};
use crate::models::{EntityId, JournalEntry, NewTask, Percentage, Task, TaskPatch, TaskType};
use crate::store::Collection;
use crate::view::task_rows;

#[component]
pub fn TasksPage() -> impl IntoView {
    let ctx = use_app_context();
    let params = use_params_map();
    let task_type = Memo::new(move |_| params.with(|p| TaskType::from_segment(p.get("task_type").as_deref())));

    let tasks = RwSignal::new(Collection::<Task>::new());
    let journal = RwSignal::new(Collection::<JournalEntry>::new());

    // Independent loads; either may land first
    Effect::new(move |_| {
        ctx.load(tasks, "TASKS");
        ctx.load(journal, "JOURNAL");
    });

    let rows = Memo::new(move |_| {
        let ty = task_type.get();
        tasks.with(|t| journal.with(|j| task_rows(t, j, ty)))
    });

    let linkable = Signal::derive(move || {
        journal.with(|j| {
            j.items()
                .iter()
                .filter(|e| !e.id.is_placeholder())
                .cloned()
                .collect::<Vec<_>>()
        })
    });

    let on_submit = move |draft: NewTask| create_task(ctx, tasks, draft);
    let on_percentage = move |(id, percentage): (EntityId, Percentage)| set_percentage(ctx, tasks, id, percentage);
    let on_delete = move |id: EntityId| delete_task(ctx, tasks, id);

    view! {
        <div class="tasks-page">
            <h1>{move || task_type.get().page_title()}</h1>
            <NewTaskForm task_type=task_type journal_entries=linkable on_submit=on_submit />
            <Show when=move || tasks.with(|t| !t.is_loaded() && !t.load_failed())>
                <p class="loading">"Loading tasks..."</p>
            </Show>
            <Show when=move || tasks.with(|t| !t.is_loaded() && t.load_failed())>
                <p class="loading">"Tasks could not be loaded."</p>
            </Show>
            <ul class="task-list">
                <For
                    each=move || rows.get()
                    key=|row| (row.task.id, row.task.percentage, row.pending, row.link_title.clone())
                    children=move |row| view! {
                        <TaskItem row=row on_percentage=on_percentage on_delete=on_delete />
                    }
                />
            </ul>
            <Show when=move || tasks.with(|t| t.is_loaded()) && rows.with(|r| r.is_empty())>
                <p class="empty-list">"Nothing here yet."</p>
            </Show>
        </div>
    }
}

// ========================
// Mutations
// ========================

fn create_task(ctx: AppContext, tasks: RwSignal<Collection<Task>>, draft: NewTask) {
    let api = ctx.api();
    ctx.spawn_retryable(
        "TASKS",
        Arc::new(move || {
            let api = api.clone();
            let draft = draft.clone();
            async move { dispatch::create::<Task, _, _>(&tasks, &api, draft).await.1 }
        }),
    );
}

fn set_percentage(ctx: AppContext, tasks: RwSignal<Collection<Task>>, id: EntityId, percentage: Percentage) {
    let api = ctx.api();
    let token = Arc::new(EditToken::default());
    ctx.spawn_retryable(
        "TASKS",
        Arc::new(move || {
            let api = api.clone();
            let token = token.clone();
            async move {
                let patch = TaskPatch { percentage };
                dispatch::update_latest::<Task, _, _>(&tasks, &api, id, patch, &token).await
            }
        }),
    );
}

fn delete_task(ctx: AppContext, tasks: RwSignal<Collection<Task>>, id: EntityId) {
    let api = ctx.api();
    ctx.spawn_retryable(
        "TASKS",
        Arc::new(move || {
            let api = api.clone();
            async move { dispatch::delete::<Task, _, _>(&tasks, &api, id).await }
        }),
    );
}
