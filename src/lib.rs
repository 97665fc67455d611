// luxetasks - Local task collection with filtered views and slot persistence

pub mod config;
pub mod dates;
pub mod filter;
pub mod models;
pub mod seed;
pub mod slot;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{CategoryFilter, SortOrder, StatusFilter, TaskQuery};
pub use models::{Category, Priority, Stats, Task, TaskDraft, TaskUpdate};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{DEFAULT_KEY, Store};
