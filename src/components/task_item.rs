//! Task Item Component
//!
//! One task row: text, due date, journal link, progress slider and delete.

use leptos::prelude::*;
use leptos_router::components::A;

use super::DeleteConfirmButton;
use crate::models::{EntityId, Percentage};
use crate::view::TaskRow;

#[component]
pub fn TaskItem(
    row: TaskRow,
    #[prop(into)] on_percentage: Callback<(EntityId, Percentage)>,
    #[prop(into)] on_delete: Callback<EntityId>,
) -> impl IntoView {
    let TaskRow { task, link_title, pending } = row;
    let id = task.id;
    let percentage = task.percentage;
    // Placeholders have no server id to address yet
    let synced = !id.is_placeholder();

    let on_change = move |ev: web_sys::Event| {
        if let Some(value) = Percentage::parse_slider(&event_target_value(&ev)) {
            if value != percentage {
                on_percentage.run((id, value));
            }
        }
    };

    view! {
        <li class=if pending { "task-item pending" } else { "task-item" }>
            <div class="task-info">
                <p class=if percentage.is_complete() { "task-text completed" } else { "task-text" }>
                    {task.text}
                </p>
                <div class="task-meta">
                    {task.due_date.map(|date| view! {
                        <span class="due-date">"Due: " {date.format("%Y-%m-%d").to_string()}</span>
                    })}
                    {link_title.map(|title| view! {
                        <span class="journal-link">
                            <A href="/journal">"🔗 " {title}</A>
                        </span>
                    })}
                </div>
            </div>
            <div class="task-progress">
                <span class="progress-percentage">{percentage.to_string()}</span>
                <input
                    type="range"
                    class="percentage-slider"
                    min="0"
                    max=Percentage::MAX.to_string()
                    step=Percentage::STEP.to_string()
                    prop:value=percentage.value().to_string()
                    disabled=!synced
                    on:change=on_change
                />
            </div>
            {synced.then(|| view! {
                <DeleteConfirmButton button_class="delete-btn" on_confirm=move |_: ()| on_delete.run(id) />
            })}
        </li>
    }
}
