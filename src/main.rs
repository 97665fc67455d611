use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::Result;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use luxetasks::{
    Category, CategoryFilter, Config, FileSlot, Priority, SortOrder, StatusFilter, Store, Task, TaskDraft, TaskQuery,
    TaskUpdate, dates,
};

#[derive(Parser)]
#[command(name = "luxetasks")]
#[command(about = "Local task manager - create, filter, sort and complete tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the config file (default: <data dir>/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the task data (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Slot key the task list is stored under (overrides config)
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks, optionally filtered and sorted
    List {
        /// all, active or completed
        #[arg(long, default_value = "all", value_parser = parse_arg::<StatusFilter>)]
        status: StatusFilter,

        /// all or a single category
        #[arg(long, default_value = "all", value_parser = parse_arg::<CategoryFilter>)]
        category: CategoryFilter,

        /// Case-insensitive text to look for in title or description
        #[arg(short, long, default_value = "")]
        search: String,

        /// date, priority or name (default from config)
        #[arg(long, value_parser = parse_arg::<SortOrder>)]
        sort: Option<SortOrder>,
    },

    /// Show a single task
    Show { id: String },

    /// Add a task
    Add {
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long, default_value = "medium", value_parser = parse_arg::<Priority>)]
        priority: Priority,

        #[arg(long, default_value = "personal", value_parser = parse_arg::<Category>)]
        category: Category,

        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDate>,

        /// Create the task already completed
        #[arg(long)]
        completed: bool,
    },

    /// Change fields of an existing task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(short, long, value_parser = parse_arg::<Priority>)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_arg::<Category>)]
        category: Option<Category>,

        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,

        #[arg(long)]
        clear_due: bool,

        #[arg(long)]
        completed: Option<bool>,
    },

    /// Flip a task between pending and completed
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Show task counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let key = cli.key.clone().unwrap_or_else(|| config.storage_key.clone());

    let slot = FileSlot::open(&data_dir)?;
    let mut store = Store::open(slot, key)?;

    match cli.command {
        Commands::List {
            status,
            category,
            search,
            sort,
        } => {
            let query = TaskQuery::new()
                .status(status)
                .category(category)
                .search(search)
                .sort(sort.unwrap_or(config.default_sort));

            let view = store.query(&query);
            if view.is_empty() {
                if query.search.is_empty() {
                    println!("No tasks found. Add a new task to get started");
                } else {
                    println!("No tasks found. Try a different search term");
                }
            }
            let today = dates::today();
            for task in view {
                println!("{}", format_task(task, today));
            }
        }
        Commands::Show { id } => match resolve_id(&store, &id) {
            Some(id) => {
                if let Some(task) = store.get(&id) {
                    print_details(task);
                }
            }
            None => println!("No task with id {}", id),
        },
        Commands::Add {
            title,
            description,
            priority,
            category,
            due,
            completed,
        } => {
            let mut draft = TaskDraft::new(title)
                .priority(priority)
                .category(category)
                .completed(completed);
            draft.description = description;
            draft.due_date = due;

            match store.add(draft) {
                Some(task) => println!("Added {} {}", task.id.dimmed(), task.title.bold()),
                None => println!("Title cannot be empty, nothing added"),
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            clear_description,
            priority,
            category,
            due,
            clear_due,
            completed,
        } => {
            let update = TaskUpdate {
                title,
                description: if clear_description { Some(None) } else { description.map(Some) },
                completed,
                priority,
                category,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };

            if update.is_empty() {
                println!("Nothing to change");
                return Ok(());
            }

            match resolve_id(&store, &id) {
                Some(id) => match store.update(&id, update) {
                    Some(task) => println!("Updated {} {}", task.id.dimmed(), task.title.bold()),
                    None => println!("Title cannot be empty, task unchanged"),
                },
                None => println!("No task with id {}", id),
            }
        }
        Commands::Toggle { id } => match resolve_id(&store, &id) {
            Some(id) => {
                if let Some(task) = store.toggle_complete(&id) {
                    let state = if task.completed { "completed" } else { "pending" };
                    println!("{} is now {}", task.title.bold(), state);
                }
            }
            None => println!("No task with id {}", id),
        },
        Commands::Delete { id } => match resolve_id(&store, &id) {
            Some(id) => {
                store.delete(&id);
                println!("Deleted {}", id);
            }
            None => println!("No task with id {}", id),
        },
        Commands::Stats => {
            let stats = store.stats();
            println!("{:<15} {}", "Total Tasks", stats.total.to_string().bold());
            println!("{:<15} {}", "Completed", stats.completed.to_string().green());
            println!("{:<15} {}", "Pending", stats.pending.to_string().yellow());
            println!("{:<15} {}", "High Priority", stats.high_priority.to_string().red());
            println!("{:<15} {}%", "Progress", stats.completion_rate());
        }
    }

    Ok(())
}

fn parse_arg<T: FromStr<Err = eyre::Report>>(s: &str) -> Result<T, String> {
    s.parse::<T>().map_err(|e| e.to_string())
}

fn parse_due(s: &str) -> Result<NaiveDate, String> {
    dates::parse_date(s).map_err(|e| e.to_string())
}

/// Exact id, or a unique id prefix
fn resolve_id(store: &Store<FileSlot>, input: &str) -> Option<String> {
    if let Some(task) = store.get(input) {
        return Some(task.id.clone());
    }
    let mut matches = store.list().iter().filter(|t| t.id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(task), None) if !input.is_empty() => Some(task.id.clone()),
        _ => None,
    }
}

fn priority_colored(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.label().red(),
        Priority::Medium => priority.label().yellow(),
        Priority::Low => priority.label().blue(),
    }
}

fn category_colored(category: Category) -> ColoredString {
    match category {
        Category::Work => category.label().yellow(),
        Category::Personal => category.label().magenta(),
        Category::Health => category.label().green(),
        Category::Finance => category.label().cyan(),
        Category::Other => category.label().white(),
    }
}

fn format_task(task: &Task, today: NaiveDate) -> String {
    let (mark, title) = if task.completed {
        ("[x]".green(), task.title.strikethrough().dimmed())
    } else {
        ("[ ]".normal(), task.title.bold())
    };

    let mut line = format!(
        "{} {} {}  {} · {}",
        mark,
        task.id.dimmed(),
        title,
        priority_colored(task.priority),
        category_colored(task.category)
    );

    if let Some(due) = task.due_date {
        let due_text = format!("due {}", due.format("%b %-d"));
        if task.is_overdue(today) {
            line.push_str(&format!(" · {}", due_text.red().bold()));
        } else {
            line.push_str(&format!(" · {}", due_text));
        }
    }
    line
}

fn print_details(task: &Task) {
    println!("{}", task.title.bold());
    println!("  id:        {}", task.id);
    if let Some(description) = &task.description {
        println!("  notes:     {}", description);
    }
    println!("  status:    {}", if task.completed { "completed" } else { "pending" });
    println!("  priority:  {}", priority_colored(task.priority));
    println!("  category:  {}", category_colored(task.category));
    if let Some(due) = task.due_date {
        println!("  due:       {}", dates::format_date(&due));
    }
    println!("  created:   {}", dates::format_datetime(&task.created_at));
}
