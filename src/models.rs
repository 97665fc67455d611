// Data models for luxetasks

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dates;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: high sorts first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Low => "Low Priority",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| eyre!("Unknown priority: {} (expected high, medium or low)", s))
    }
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Health,
    Finance,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Finance,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Finance => "finance",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| eyre!("Unknown category: {} (expected work, personal, health, finance or other)", s))
    }
}

/// A single tracked to-do item
///
/// Field names on the wire follow the persisted JSON layout
/// (`dueDate`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "dates::iso_date_opt")]
    pub due_date: Option<NaiveDate>,
    #[serde(with = "dates::iso_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from a validated draft
    pub(crate) fn from_draft(id: String, created_at: DateTime<Utc>, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            created_at,
        }
    }

    /// Due strictly before `today` and still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Case-insensitive substring match against title or description
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Caller-supplied task content (everything except id and createdAt)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            category: Category::Personal,
            due_date: None,
            completed: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Trim the title and description; `None` when the title is blank
    pub fn normalized(self) -> Option<Self> {
        let title = normalize_title(&self.title)?;
        Some(Self {
            title,
            description: normalize_description(self.description),
            ..self
        })
    }
}

/// Partial update: `None` leaves a field untouched
///
/// The optional fields are doubly wrapped so they can be cleared:
/// `Some(None)` removes the description or due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `task`, returning false (and changing nothing) if the new
    /// title is blank
    pub(crate) fn apply_to(self, task: &mut Task) -> bool {
        let title = match self.title {
            Some(title) => match normalize_title(&title) {
                Some(title) => Some(title),
                None => return false,
            },
            None => None,
        };

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = normalize_description(description);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        true
    }
}

impl From<TaskDraft> for TaskUpdate {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            completed: Some(draft.completed),
            priority: Some(draft.priority),
            category: Some(draft.category),
            due_date: Some(draft.due_date),
        }
    }
}

/// Aggregate counts over the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// High priority and not completed
    pub high_priority: usize,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let high_priority = tasks
            .iter()
            .filter(|t| t.priority == Priority::High && !t.completed)
            .count();

        Self {
            total,
            completed,
            pending: total - completed,
            high_priority,
        }
    }

    /// Completed share as a whole percentage, 0 for an empty collection
    pub fn completion_rate(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }
}

fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: "task-1".to_string(),
            title: "Review quarterly reports".to_string(),
            description: Some("Analyze Q4 statements".to_string()),
            completed: false,
            priority: Priority::High,
            category: Category::Work,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            created_at: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Finance).unwrap(), "\"finance\"");
        let parsed: Category = serde_json::from_str("\"health\"").unwrap();
        assert_eq!(parsed, Category::Health);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
        assert!(serde_json::from_str::<Category>("\"hobby\"").is_err());
        assert!("urgent".parse::<Priority>().is_err());
        assert!("hobby".parse::<Category>().is_err());
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Work ".parse::<Category>().unwrap(), Category::Work);
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Priority::Medium.label(), "Medium Priority");
        assert_eq!(Category::Finance.label(), "Finance");
    }

    #[test]
    fn test_task_wire_format() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["createdAt"], "2025-01-15T09:30:00.000Z");
        assert_eq!(json["dueDate"], "2025-02-01");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["category"], "work");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let mut task = sample_task();
        task.description = None;
        task.due_date = None;

        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("dueDate"));
        assert!(!json.contains("description"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_task_roundtrip() {
        let task = sample_task();
        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_task_accepts_null_and_datetime_due_date() {
        let json = r#"{"id":"a","title":"T","description":null,"completed":false,"priority":"low","category":"other","dueDate":"2025-02-01T00:00:00.000Z","createdAt":"2025-01-15T09:30:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn test_is_overdue() {
        let task = sample_task();
        let before = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        assert!(!task.is_overdue(before));
        assert!(task.is_overdue(after));

        let done = Task {
            completed: true,
            ..task
        };
        assert!(!done.is_overdue(after));
    }

    #[test]
    fn test_matches_text() {
        let task = sample_task();
        assert!(task.matches_text("QUARTERLY"));
        assert!(task.matches_text("q4"));
        assert!(task.matches_text(""));
        assert!(!task.matches_text("meditation"));
    }

    #[test]
    fn test_draft_normalized() {
        let draft = TaskDraft::new("  Pay rent  ").description("   ");
        let draft = draft.normalized().unwrap();
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(draft.description, None);

        assert!(TaskDraft::new("   ").normalized().is_none());
        assert!(TaskDraft::new("").normalized().is_none());
    }

    #[test]
    fn test_update_partial_leaves_other_fields() {
        let mut task = sample_task();
        let update = TaskUpdate {
            completed: Some(true),
            ..Default::default()
        };
        assert!(update.apply_to(&mut task));
        assert!(task.completed);
        assert_eq!(task.title, "Review quarterly reports");
        assert_eq!(task.priority, Priority::High);
        assert!(task.due_date.is_some());
    }

    #[test]
    fn test_update_blank_title_rejected_whole() {
        let mut task = sample_task();
        let before = task.clone();
        let update = TaskUpdate {
            title: Some("  ".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        assert!(!update.apply_to(&mut task));
        assert_eq!(task, before);
    }

    #[test]
    fn test_update_clears_optionals() {
        let mut task = sample_task();
        let update = TaskUpdate {
            description: Some(None),
            due_date: Some(None),
            ..Default::default()
        };
        assert!(update.apply_to(&mut task));
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_stats_from_tasks() {
        let open_high = sample_task();
        let done_high = Task {
            id: "task-2".to_string(),
            completed: true,
            ..sample_task()
        };
        let open_low = Task {
            id: "task-3".to_string(),
            priority: Priority::Low,
            ..sample_task()
        };

        let stats = Stats::from_tasks(&[open_high, done_high, open_low]);
        assert_eq!(
            stats,
            Stats {
                total: 3,
                completed: 1,
                pending: 2,
                high_priority: 1,
            }
        );
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(Stats::default().completion_rate(), 0);
        let stats = Stats {
            total: 3,
            completed: 1,
            pending: 2,
            high_priority: 0,
        };
        assert_eq!(stats.completion_rate(), 33);
        let stats = Stats {
            total: 3,
            completed: 2,
            pending: 1,
            high_priority: 0,
        };
        assert_eq!(stats.completion_rate(), 67);
    }
}
