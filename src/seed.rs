// Example tasks for a fresh store

use crate::models::{Category, Priority, TaskDraft};

/// The four tasks a store starts with when its slot is empty
pub fn example_drafts() -> Vec<TaskDraft> {
    vec![
        TaskDraft::new("Review quarterly reports")
            .description("Analyze Q4 financial statements and prepare summary")
            .priority(Priority::High)
            .category(Category::Work),
        TaskDraft::new("Morning meditation")
            .description("20 minutes of mindfulness practice")
            .priority(Priority::Medium)
            .category(Category::Health)
            .completed(true),
        TaskDraft::new("Update investment portfolio")
            .description("Rebalance stocks and review dividend yields")
            .priority(Priority::High)
            .category(Category::Finance),
        TaskDraft::new("Plan weekend getaway")
            .description("Research luxury resorts and book accommodation")
            .priority(Priority::Low)
            .category(Category::Personal),
    ]
}
