// Query filtering and ordering for task views

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{Category, Task};

/// Completion-status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            _ => Err(eyre!("Unknown status filter: {} (expected all, active or completed)", s)),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Completed => write!(f, "completed"),
        }
    }
}

/// Category filter: everything, or one exact category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => task.category == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// View ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Date,
    /// High, then medium, then low
    Priority,
    /// By title
    Name,
}

impl SortOrder {
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortOrder::Date => b.created_at.cmp(&a.created_at),
            SortOrder::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortOrder::Name => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }
}

impl FromStr for SortOrder {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "created" | "newest" => Ok(SortOrder::Date),
            "priority" => Ok(SortOrder::Priority),
            "name" | "title" => Ok(SortOrder::Name),
            _ => Err(eyre!("Unknown sort order: {} (expected date, priority or name)", s)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Date => write!(f, "date"),
            SortOrder::Priority => write!(f, "priority"),
            SortOrder::Name => write!(f, "name"),
        }
    }
}

/// A derived view over the collection
///
/// All three predicates must hold for a task to be included. An empty search
/// string matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortOrder,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.category.matches(task) && task.matches_text(&self.search)
    }

    /// Filter and sort without touching the input order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut view: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();
        view.sort_by(|a, b| self.sort.compare(a, b));
        view
    }
}
