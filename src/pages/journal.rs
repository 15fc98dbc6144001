//! Journal Page
//!
//! Entry list (newest first) and the editor for new or existing entries.

use std::sync::Arc;

use leptos::prelude::*;

use crate::components::{DeleteConfirmButton, JournalEditor};
use crate::context::{use_app_context, AppContext};
use crate::dispatch::{self, EditToken};
use crate::models::{EntityId, JournalDraft, JournalEntry};
use crate::store::Collection;

#[derive(Debug, Clone, PartialEq)]
enum JournalView {
    List,
    /// `None` while writing a new entry
    Editor(Option<JournalEntry>),
}

#[component]
pub fn JournalPage() -> impl IntoView {
    let ctx = use_app_context();
    let entries = RwSignal::new(Collection::<JournalEntry>::new());
    let (mode, set_mode) = signal(JournalView::List);

    Effect::new(move |_| ctx.load(entries, "JOURNAL"));

    let on_save = move |(existing, draft): (Option<EntityId>, JournalDraft)| {
        set_mode.set(JournalView::List);
        match existing {
            Some(id) => update_entry(ctx, entries, id, draft),
            None => create_entry(ctx, entries, draft),
        }
    };
    let on_delete = move |id: EntityId| delete_entry(ctx, entries, id);

    // Entries paired with their pending flag, so rows re-render when it flips
    let rows = move || {
        entries.with(|c| {
            c.items()
                .iter()
                .map(|e| (e.clone(), c.is_pending(e.id)))
                .collect::<Vec<_>>()
        })
    };

    move || match mode.get() {
        JournalView::Editor(entry) => view! {
            <JournalEditor
                entry=entry
                on_save=on_save
                on_cancel=move |_: ()| set_mode.set(JournalView::List)
            />
        }
        .into_any(),
        JournalView::List => view! {
            <div class="journal-page">
                <div class="page-header">
                    <h1>"My Journal"</h1>
                    <button class="new-entry-btn" on:click=move |_| set_mode.set(JournalView::Editor(None))>
                        "+ New Entry"
                    </button>
                </div>
                <Show when=move || entries.with(|c| !c.is_loaded() && !c.load_failed())>
                    <p class="loading">"Loading entries..."</p>
                </Show>
                <Show when=move || entries.with(|c| !c.is_loaded() && c.load_failed())>
                    <p class="loading">"Journal entries could not be loaded."</p>
                </Show>
                <div class="journal-entries-list">
                    <For
                        each=rows
                        key=|(entry, pending)| (entry.id, entry.title.clone(), entry.created_at, *pending)
                        children=move |(entry, pending)| {
                            let id = entry.id;
                            let date = entry.created_at.format("%Y-%m-%d").to_string();
                            let title = entry.title.clone();
                            let synced = !id.is_placeholder();
                            view! {
                                <div
                                    class=if pending { "journal-list-item pending" } else { "journal-list-item" }
                                    on:click=move |_| {
                                        if synced {
                                            set_mode.set(JournalView::Editor(Some(entry.clone())));
                                        }
                                    }
                                >
                                    <div class="item-content">
                                        <h2>{title}</h2>
                                        <p class="entry-date">{date}</p>
                                    </div>
                                    {synced.then(|| view! {
                                        <DeleteConfirmButton button_class="delete-icon" on_confirm=move |_: ()| on_delete(id) />
                                    })}
                                </div>
                            }
                        }
                    />
                </div>
            </div>
        }
        .into_any(),
    }
}

// ========================
// Mutations
// ========================

fn create_entry(ctx: AppContext, entries: RwSignal<Collection<JournalEntry>>, draft: JournalDraft) {
    let api = ctx.api();
    ctx.spawn_retryable(
        "JOURNAL",
        Arc::new(move || {
            let api = api.clone();
            let draft = draft.clone();
            async move { dispatch::create::<JournalEntry, _, _>(&entries, &api, draft).await.1 }
        }),
    );
}

fn update_entry(ctx: AppContext, entries: RwSignal<Collection<JournalEntry>>, id: EntityId, draft: JournalDraft) {
    let api = ctx.api();
    let token = Arc::new(EditToken::default());
    ctx.spawn_retryable(
        "JOURNAL",
        Arc::new(move || {
            let api = api.clone();
            let draft = draft.clone();
            let token = token.clone();
            async move { dispatch::update_latest::<JournalEntry, _, _>(&entries, &api, id, draft, &token).await }
        }),
    );
}

fn delete_entry(ctx: AppContext, entries: RwSignal<Collection<JournalEntry>>, id: EntityId) {
    let api = ctx.api();
    ctx.spawn_retryable(
        "JOURNAL",
        Arc::new(move || {
            let api = api.clone();
            async move { dispatch::delete::<JournalEntry, _, _>(&entries, &api, id).await }
        }),
    );
}
