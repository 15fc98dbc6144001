//! Pages
//!
//! Routed views. Each page owns its collection stores, so leaving a page
//! drops responses that land afterwards.

mod journal;
mod tasks;

pub use journal::JournalPage;
pub use tasks::TasksPage;
