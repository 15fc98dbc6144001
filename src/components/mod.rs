//! UI Components
//!
//! Reusable Leptos components.

mod delete_confirm_button;
mod error_banner;
mod journal_editor;
mod journal_picker;
mod modal;
mod new_task_form;
mod sidebar;
mod task_item;

pub use delete_confirm_button::DeleteConfirmButton;
pub use error_banner::ErrorBanner;
pub use journal_editor::JournalEditor;
pub use journal_picker::JournalPicker;
pub use modal::Modal;
pub use new_task_form::NewTaskForm;
pub use sidebar::Sidebar;
pub use task_item::TaskItem;
