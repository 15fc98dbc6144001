//! Frontend Models
//!
//! Data structures matching the remote API payloads.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a task or journal entry.
///
/// Server ids are positive. Placeholder ids minted for optimistic creates are
/// negative, so the two spaces never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn is_placeholder(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            write!(f, "pending#{}", -self.0)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Where an optimistic create lands in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Front,
    Back,
}

/// Contract for entities held in a collection store and served by a REST
/// collection resource
pub trait Entity: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static {
    /// Body of `POST {PATH}`
    type Draft: Serialize + Clone + Send + Sync + 'static;
    /// Body of `PUT {PATH}/:id`
    type Patch: Serialize + Clone + Send + Sync + 'static;
    /// Envelope returned by `GET {PATH}`
    type Listing: DeserializeOwned;

    const PATH: &'static str;
    const INSERT_AT: InsertAt;

    fn id(&self) -> EntityId;
    fn placeholder(id: EntityId, draft: &Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: &Self::Patch);
    fn from_listing(listing: Self::Listing) -> Vec<Self>;
}

// ========================
// Tasks
// ========================

/// Task bucket; each task shows on exactly one of the two task pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskType {
    Daily,
    #[default]
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 2] = [TaskType::Daily, TaskType::General];

    /// Parse a route segment or payload value. Anything unknown is general,
    /// which is also what the server assumes.
    pub fn from_segment(segment: Option<&str>) -> Self {
        match segment {
            Some(s) if s.eq_ignore_ascii_case("daily") => TaskType::Daily,
            _ => TaskType::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Daily => "daily",
            TaskType::General => "general",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskType::Daily => "Daily",
            TaskType::General => "General",
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            TaskType::Daily => "Daily Tasks",
            TaskType::General => "General Tasks",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            TaskType::Daily => "/tasks/daily",
            TaskType::General => "/tasks/general",
        }
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(TaskType::from_segment(raw.as_deref()))
    }
}

/// Completion percentage, always a multiple of 5 in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const STEP: u8 = 5;
    pub const MAX: u8 = 100;

    /// Clamp into range and round to the nearest step
    pub fn snap(raw: i64) -> Self {
        let step = i64::from(Self::STEP);
        let clamped = raw.clamp(0, i64::from(Self::MAX));
        let snapped = (clamped + step / 2) / step * step;
        Percentage(snapped as u8)
    }

    /// Parse the value of a range input
    pub fn parse_slider(value: &str) -> Option<Self> {
        value.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| Self::snap(v.round() as i64))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == Self::MAX
    }
}

impl From<i64> for Percentage {
    fn from(raw: i64) -> Self {
        Percentage::snap(raw)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> u8 {
        p.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Task data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub text: String,
    #[serde(default, with = "flexible_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub percentage: Percentage,
    #[serde(default)]
    pub journal_entry_id: Option<EntityId>,
    /// Title the server joined in at fetch time; display prefers a lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_entry_title: Option<String>,
}

/// `POST /api/tasks` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub text: String,
    #[serde(with = "flexible_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub journal_entry_id: Option<EntityId>,
}

/// `PUT /api/tasks/:id` body; only the changed field is sent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskPatch {
    pub percentage: Percentage,
}

#[derive(Debug, Deserialize)]
pub struct TaskListing {
    pub tasks: Vec<Task>,
}

impl Entity for Task {
    type Draft = NewTask;
    type Patch = TaskPatch;
    type Listing = TaskListing;

    const PATH: &'static str = "/api/tasks";
    const INSERT_AT: InsertAt = InsertAt::Back;

    fn id(&self) -> EntityId {
        self.id
    }

    fn placeholder(id: EntityId, draft: &NewTask) -> Self {
        Task {
            id,
            text: draft.text.clone(),
            due_date: draft.due_date,
            task_type: draft.task_type,
            percentage: Percentage::default(),
            journal_entry_id: draft.journal_entry_id,
            journal_entry_title: None,
        }
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        self.percentage = patch.percentage;
    }

    fn from_listing(listing: TaskListing) -> Vec<Self> {
        listing.tasks
    }
}

// ========================
// Journal
// ========================

/// Journal entry data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(with = "flexible_datetime")]
    pub created_at: NaiveDateTime,
}

/// `POST /api/journal` and `PUT /api/journal/:id` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct JournalListing {
    pub entries: Vec<JournalEntry>,
}

impl Entity for JournalEntry {
    type Draft = JournalDraft;
    type Patch = JournalDraft;
    type Listing = JournalListing;

    const PATH: &'static str = "/api/journal";
    // The server lists newest first
    const INSERT_AT: InsertAt = InsertAt::Front;

    fn id(&self) -> EntityId {
        self.id
    }

    fn placeholder(id: EntityId, draft: &JournalDraft) -> Self {
        JournalEntry {
            id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn apply_patch(&mut self, patch: &JournalDraft) {
        self.title = patch.title.clone();
        self.content = patch.content.clone();
    }

    fn from_listing(listing: JournalListing) -> Vec<Self> {
        listing.entries
    }
}

// ========================
// Date Formats
// ========================

/// Parse the datetime shapes the server emits: naive ISO or with an offset
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Dates are sent as `YYYY-MM-DD`; on read any ISO date or datetime is accepted
/// and reduced to its calendar date
mod flexible_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_datetime(s).map(|dt| dt.date()))
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        }
    }
}

mod flexible_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_snaps_to_step() {
        assert_eq!(Percentage::snap(0).value(), 0);
        assert_eq!(Percentage::snap(2).value(), 0);
        assert_eq!(Percentage::snap(3).value(), 5);
        assert_eq!(Percentage::snap(47).value(), 45);
        assert_eq!(Percentage::snap(48).value(), 50);
        assert_eq!(Percentage::snap(-20).value(), 0);
        assert_eq!(Percentage::snap(180).value(), 100);
    }

    #[test]
    fn test_every_slider_value_is_valid() {
        for raw in -10..=110 {
            let p = Percentage::parse_slider(&raw.to_string()).expect("numeric input");
            assert!(p.value() <= 100);
            assert_eq!(p.value() % Percentage::STEP, 0);
        }
        assert_eq!(Percentage::parse_slider("35"), Some(Percentage::snap(35)));
        assert_eq!(Percentage::parse_slider("abc"), None);
        assert_eq!(Percentage::parse_slider("NaN"), None);
    }

    #[test]
    fn test_task_type_from_segment() {
        assert_eq!(TaskType::from_segment(Some("daily")), TaskType::Daily);
        assert_eq!(TaskType::from_segment(Some("general")), TaskType::General);
        assert_eq!(TaskType::from_segment(Some("weekly")), TaskType::General);
        assert_eq!(TaskType::from_segment(None), TaskType::General);
    }

    #[test]
    fn test_task_from_server_json() {
        let json = r#"{
            "id": 3, "text": "Pack bags", "percentage": 40,
            "due_date": "2025-06-01T00:00:00+00:00", "type": "daily",
            "journal_entry_id": 7, "journal_entry_title": "Trip log"
        }"#;
        let task: Task = serde_json::from_str(json).expect("valid task");

        assert_eq!(task.id, EntityId(3));
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(task.task_type, TaskType::Daily);
        assert_eq!(task.percentage.value(), 40);
        assert_eq!(task.journal_entry_id, Some(EntityId(7)));
        assert_eq!(task.journal_entry_title.as_deref(), Some("Trip log"));
    }

    #[test]
    fn test_task_tolerates_sparse_and_naive_fields() {
        let json = r#"{"id": 4, "text": "x", "percentage": 33, "due_date": "2025-06-01T00:00:00", "type": null, "journal_entry_id": null}"#;
        let task: Task = serde_json::from_str(json).expect("valid task");

        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(task.task_type, TaskType::General);
        assert_eq!(task.percentage.value(), 35);
        assert!(task.journal_entry_title.is_none());
    }

    #[test]
    fn test_new_task_body_shape() {
        let draft = NewTask {
            text: "Pack bags".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            task_type: TaskType::Daily,
            journal_entry_id: Some(EntityId(7)),
        };
        let body = serde_json::to_value(&draft).expect("serializable");
        assert_eq!(
            body,
            serde_json::json!({"text": "Pack bags", "due_date": "2025-06-01", "type": "daily", "journal_entry_id": 7})
        );

        let patch = serde_json::to_value(TaskPatch { percentage: Percentage::snap(55) }).expect("serializable");
        assert_eq!(patch, serde_json::json!({"percentage": 55}));
    }

    #[test]
    fn test_journal_listing_accepts_microseconds() {
        let json = r#"{"entries": [{"id": 7, "title": "Trip log", "content": "Day one", "created_at": "2025-05-30T08:15:00.123456"}]}"#;
        let listing: JournalListing = serde_json::from_str(json).expect("valid listing");
        let entries = JournalEntry::from_listing(listing);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Trip log");
        assert_eq!(entries[0].created_at.date(), NaiveDate::from_ymd_opt(2025, 5, 30).expect("date"));
    }

    #[test]
    fn test_placeholder_ids_are_distinct_from_server_ids() {
        assert!(EntityId(-1).is_placeholder());
        assert!(!EntityId(1).is_placeholder());
        assert_eq!(EntityId(-2).to_string(), "pending#2");
        assert_eq!(EntityId(12).to_string(), "#12");
    }
}
