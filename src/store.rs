// Task store: the authoritative collection mirrored to a key-value slot

use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dates;
use crate::filter::TaskQuery;
use crate::models::{Stats, Task, TaskDraft, TaskUpdate};
use crate::seed;
use crate::slot::Slot;

/// Default slot key for the task list
pub const DEFAULT_KEY: &str = "luxe-tasks";

/// In-memory task collection persisted to a slot after every mutation
///
/// Lookups by unknown id are silent no-ops. A blank title is the only
/// rejected input. A failed write is logged and the in-memory list stays
/// authoritative for the session.
pub struct Store<S: Slot> {
    slot: S,
    key: String,
    tasks: Vec<Task>,
}

impl<S: Slot> Store<S> {
    /// Load the collection from `slot`, seeding example tasks when the slot is empty
    pub fn open(slot: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let raw = slot
            .get(&key)
            .with_context(|| format!("Failed to read slot {}", key))?;

        let mut store = Self {
            slot,
            key,
            tasks: Vec::new(),
        };

        // Only write the seed over the slot once nothing stored there can be lost
        let mut write_seed = true;
        let loaded = match raw {
            Some(json) => match parse_tasks(&json) {
                Ok(tasks) => Some(tasks),
                Err(e) => {
                    warn!(key = %store.key, error = ?e, "Stored tasks unreadable, starting from examples");
                    write_seed = store.back_up_unreadable(&json);
                    None
                }
            },
            None => None,
        };

        match loaded {
            Some(tasks) => {
                store.tasks = retain_valid(tasks);
                info!(key = %store.key, count = store.tasks.len(), "Loaded tasks");
            }
            None => {
                let created_at = dates::now();
                store.tasks = seed::example_drafts()
                    .into_iter()
                    .filter_map(TaskDraft::normalized)
                    .map(|draft| Task::from_draft(new_id(), created_at, draft))
                    .collect();
                info!(key = %store.key, count = store.tasks.len(), "Seeded example tasks");
                if write_seed {
                    store.persist();
                }
            }
        }

        Ok(store)
    }

    /// Slot key an unreadable task list is copied to before it is replaced
    pub fn backup_key(&self) -> String {
        format!("{}-corrupt", self.key)
    }

    fn back_up_unreadable(&mut self, raw: &str) -> bool {
        let backup_key = self.backup_key();
        match self.slot.set(&backup_key, raw) {
            Ok(()) => {
                warn!(key = %self.key, backup = %backup_key, "Copied unreadable tasks to backup slot");
                true
            }
            Err(e) => {
                warn!(key = %self.key, backup = %backup_key, error = ?e, "Failed to back up unreadable tasks, leaving slot untouched");
                false
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Give back the slot, dropping the in-memory collection
    pub fn into_slot(self) -> S {
        self.slot
    }

    /// All tasks in stored order (newest additions first)
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task from `draft` and put it at the front
    ///
    /// Returns `None` without touching the collection when the title is blank.
    pub fn add(&mut self, draft: TaskDraft) -> Option<Task> {
        let Some(draft) = draft.normalized() else {
            debug!("add: blank title, ignoring");
            return None;
        };

        let mut id = new_id();
        while self.get(&id).is_some() {
            id = new_id();
        }

        let task = Task::from_draft(id, dates::now(), draft);
        info!(id = %task.id, title = %task.title, "Added task");
        self.tasks.insert(0, task.clone());
        self.persist();
        Some(task)
    }

    /// Merge the provided fields into the task with `id`
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Option<&Task> {
        let Some(index) = self.position(id) else {
            debug!(id, "update: no such task");
            return None;
        };

        if !update.apply_to(&mut self.tasks[index]) {
            debug!(id, "update: blank title, ignoring");
            return None;
        }

        info!(id, "Updated task");
        self.persist();
        self.tasks.get(index)
    }

    /// Replace all editable content of the task with `id`
    pub fn replace(&mut self, id: &str, draft: TaskDraft) -> Option<&Task> {
        self.update(id, TaskUpdate::from(draft))
    }

    /// Remove the task with `id`, returning whether anything was removed
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            debug!(id, "delete: no such task");
            return false;
        };

        self.tasks.remove(index);
        info!(id, "Deleted task");
        self.persist();
        true
    }

    pub fn toggle_complete(&mut self, id: &str) -> Option<&Task> {
        let Some(index) = self.position(id) else {
            debug!(id, "toggle_complete: no such task");
            return None;
        };

        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        info!(id, completed = task.completed, "Toggled task");
        self.persist();
        self.tasks.get(index)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    /// Filtered and sorted view; stored order is unaffected
    pub fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(&self.tasks)
    }

    /// Write the full collection to the slot
    pub fn save(&mut self) -> Result<()> {
        let json = serialize_tasks(&self.tasks)?;
        self.slot
            .set(&self.key, &json)
            .with_context(|| format!("Failed to write slot {}", self.key))?;
        debug!(key = %self.key, count = self.tasks.len(), "Saved tasks");
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(key = %self.key, error = ?e, "Failed to persist tasks, keeping in-memory state");
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

/// Serialize a task list to its persisted JSON form
pub fn serialize_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize tasks")
}

/// Parse a persisted JSON task list
pub fn parse_tasks(json: &str) -> Result<Vec<Task>> {
    serde_json::from_str(json).context("Failed to parse stored tasks")
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Drop loaded tasks with a blank title, then keep the first occurrence of each id
fn retain_valid(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| {
            if task.title.trim().is_empty() {
                warn!(id = %task.id, "Dropping task with blank title");
                return false;
            }
            let fresh = seen.insert(task.id.clone());
            if !fresh {
                warn!(id = %task.id, "Dropping task with duplicate id");
            }
            fresh
        })
        .collect()
}
