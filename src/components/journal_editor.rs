//! Journal Editor Component
//!
//! Title and content form for a new or existing journal entry.

use leptos::prelude::*;

use crate::models::{EntityId, JournalDraft, JournalEntry};

#[component]
pub fn JournalEditor(
    /// `None` starts a new entry
    entry: Option<JournalEntry>,
    #[prop(into)] on_save: Callback<(Option<EntityId>, JournalDraft)>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let existing = entry.as_ref().map(|e| e.id);
    let (title, set_title) = signal(entry.as_ref().map(|e| e.title.clone()).unwrap_or_default());
    let (content, set_content) = signal(entry.map(|e| e.content).unwrap_or_default());

    let can_save = move || title.with(|t| !t.trim().is_empty());

    let save = move |_| {
        if !can_save() {
            return;
        }
        let draft = JournalDraft {
            title: title.get_untracked().trim().to_string(),
            content: content.get_untracked(),
        };
        on_save.run((existing, draft));
    };

    view! {
        <div class="journal-editor">
            <h1>{if existing.is_some() { "Edit Entry" } else { "New Entry" }}</h1>
            <input
                type="text"
                class="editor-title"
                placeholder="Entry Title"
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <textarea
                class="editor-content"
                placeholder="Write your thoughts..."
                prop:value=move || content.get()
                on:input=move |ev| set_content.set(event_target_value(&ev))
            ></textarea>
            <div class="editor-actions">
                <button class="save-btn" disabled=move || !can_save() on:click=save>"Save"</button>
                <button class="cancel-btn" on:click=move |_| on_cancel.run(())>"Cancel"</button>
            </div>
        </div>
    }
}
