//! New Task Form Component
//!
//! Text, optional due date and optional journal link for a new task of the
//! current page's type.

use leptos::prelude::*;

use super::JournalPicker;
use crate::models::{EntityId, JournalEntry, NewTask, TaskType};
use crate::view::TaskForm;

#[component]
pub fn NewTaskForm(
    #[prop(into)] task_type: Signal<TaskType>,
    #[prop(into)] journal_entries: Signal<Vec<JournalEntry>>,
    #[prop(into)] on_submit: Callback<NewTask>,
) -> impl IntoView {
    let form = RwSignal::new(TaskForm::default());
    let (picker_open, set_picker_open) = signal(false);
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let ty = task_type.get_untracked();
        // Cleared before the request goes out
        if let Some(draft) = form.try_update(|f| f.take_draft(ty)).flatten() {
            on_submit.run(draft);
        }
    };

    let link_label = move || {
        form.with(|f| f.journal_entry_id)
            .and_then(|id| journal_entries.with(|es| es.iter().find(|e| e.id == id).map(|e| e.title.clone())))
            .map(|title| format!("🔗 {}", title))
            .unwrap_or_else(|| "Link to Journal Entry...".to_string())
    };

    view! {
        <form class="add-task-form" on:submit=submit>
            <input
                type="text"
                class="task-text-input"
                placeholder=move || format!("Add a new {} task...", task_type.get().as_str())
                prop:value=move || form.with(|f| f.text.clone())
                on:input=move |ev| form.update(|f| f.text = event_target_value(&ev))
            />
            <input
                type="date"
                class="task-date-input"
                min=today
                prop:value=move || form.with(|f| f.due_date.clone())
                on:input=move |ev| form.update(|f| f.due_date = event_target_value(&ev))
            />
            <button type="button" class="link-btn" on:click=move |_| set_picker_open.set(true)>
                {link_label}
            </button>
            <button type="submit">"+"</button>
        </form>
        <JournalPicker
            open=picker_open
            entries=journal_entries
            current=Signal::derive(move || form.with(|f| f.journal_entry_id))
            on_confirm={move |choice: Option<EntityId>| form.update(|f| f.journal_entry_id = choice)}
            on_close=move |_: ()| set_picker_open.set(false)
        />
    }
}
