//! Journal Picker Component
//!
//! Modal list of synced journal entries for linking a new task.

use leptos::prelude::*;

use super::Modal;
use crate::models::{EntityId, JournalEntry};

#[component]
pub fn JournalPicker(
    #[prop(into)] open: Signal<bool>,
    /// Entries that can be linked (server-confirmed only)
    #[prop(into)]
    entries: Signal<Vec<JournalEntry>>,
    /// Link currently held by the form
    #[prop(into)]
    current: Signal<Option<EntityId>>,
    #[prop(into)] on_confirm: Callback<Option<EntityId>>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let (choice, set_choice) = signal::<Option<EntityId>>(None);

    // Start from the form's link each time the picker opens
    Effect::new(move |_| {
        if open.get() {
            set_choice.set(current.get_untracked());
        }
    });

    let confirm = move |_| {
        on_confirm.run(choice.get_untracked());
        on_close.run(());
    };

    view! {
        <Modal open=open on_close=on_close>
            <h2>"Link to Journal Entry"</h2>
            <Show
                when=move || entries.with(|e| !e.is_empty())
                fallback=|| view! { <p class="picker-empty">"No journal entries yet."</p> }
            >
                <ul class="journal-picker-list">
                    <For
                        each=move || entries.get()
                        key=|entry| (entry.id, entry.title.clone())
                        children=move |entry| {
                            let id = entry.id;
                            view! {
                                <li
                                    class=move || if choice.get() == Some(id) { "picker-item selected" } else { "picker-item" }
                                    on:click=move |_| set_choice.set(Some(id))
                                >
                                    {entry.title}
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
            <div class="picker-actions">
                <button type="button" class="cancel-btn" on:click=move |_| set_choice.set(None)>
                    "No link"
                </button>
                <button type="button" on:click=confirm>"Confirm"</button>
            </div>
        </Modal>
    }
}
