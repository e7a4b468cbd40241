use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskboard::record::unique_prefix_len;
use taskboard::{
    FileKv, Priority, Status, Task, TaskDraft, TaskFilter, TaskManager, TaskUpdate, parse_due_date, parse_tags,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "TaskBoard - a kanban task board in the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the board directory (default: platform data dir)
    #[arg(short, long, env = "TASKBOARD_DIR")]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the three columns
    Board {
        /// Case-insensitive text to look for in titles and descriptions
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only tasks carrying any of these tags (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
    },

    /// Create a task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "")]
        notes: String,

        #[arg(long, value_parser = parse_status, default_value = "todo")]
        status: Status,

        #[arg(short, long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDate>,
    },

    /// Change fields of a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Comma-separated tags, replacing the current ones
        #[arg(short, long)]
        tags: Option<String>,

        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task
    Rm { id: String },

    /// Move a task to another column
    Mv {
        id: String,

        #[arg(value_parser = parse_status)]
        status: Status,
    },

    /// Add a subtask
    Sub { id: String, title: String },

    /// Toggle a subtask, by id prefix or by position written as `#N` (1-based)
    Toggle { id: String, subtask: String },

    /// List every tag in use
    Tags,

    /// Print a task in full
    Show { id: String },
}

fn parse_status(s: &str) -> std::result::Result<Status, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn parse_priority(s: &str) -> std::result::Result<Priority, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn parse_due(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_due_date(s).map_err(|e| e.to_string())
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskboard"))
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Open board
    let store_path = cli.store_path.unwrap_or_else(default_store_path);
    let mut board = TaskManager::new(FileKv::open(&store_path)?);

    match cli.command {
        Commands::Board {
            search,
            tag,
            priority,
            status,
        } => {
            let mut filter = TaskFilter::new().search(search);
            for t in tag {
                filter = filter.tag(t);
            }
            filter.priority = priority;
            filter.status = status;
            board.set_filter(filter);
            render_board(&board);
        }
        Commands::Add {
            title,
            description,
            notes,
            status,
            priority,
            tags,
            due,
        } => {
            let mut draft = TaskDraft::new(title, status)
                .description(description)
                .notes(notes)
                .priority(priority)
                .tags(parse_tags(&tags));
            draft.due_date = due;
            let id = board.create_task(draft)?;
            println!("Created {}", id);
        }
        Commands::Edit {
            id,
            title,
            description,
            notes,
            priority,
            tags,
            due,
            clear_due,
        } => {
            let id = resolve(&board, &id)?;
            let update = TaskUpdate {
                title,
                description,
                notes,
                status: None,
                priority,
                tags: tags.as_deref().map(parse_tags),
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            if update.is_empty() {
                return Err(eyre!("Nothing to change"));
            }
            report(board.update_task(&id, update)?, "Updated", &id);
        }
        Commands::Rm { id } => {
            let id = resolve(&board, &id)?;
            report(board.delete_task(&id)?, "Deleted", &id);
        }
        Commands::Mv { id, status } => {
            let id = resolve(&board, &id)?;
            report(board.move_task(&id, status)?, "Moved", &id);
        }
        Commands::Sub { id, title } => {
            let id = resolve(&board, &id)?;
            match board.add_subtask(&id, &title)? {
                Some(sub) => println!("Added subtask {} to {}", sub, id),
                None => println!("No task {}", id),
            }
        }
        Commands::Toggle { id, subtask } => {
            let id = resolve(&board, &id)?;
            let task = board.get(&id).ok_or_else(|| eyre!("No task {}", id))?;
            let sub = resolve_subtask(task, &subtask)?;
            report(board.toggle_subtask(&id, &sub)?, "Toggled subtask of", &id);
        }
        Commands::Tags => {
            for tag in board.all_tags() {
                println!("{}", tag);
            }
        }
        Commands::Show { id } => {
            let id = resolve(&board, &id)?;
            let task = board.get(&id).ok_or_else(|| eyre!("No task {}", id))?;
            print!("{}", serde_yaml::to_string(task)?);
        }
    }

    Ok(())
}

fn resolve(board: &TaskManager<FileKv>, prefix: &str) -> Result<String> {
    board
        .resolve_id(prefix)
        .map(str::to_string)
        .ok_or_else(|| eyre!("No single task matches id {:?}", prefix))
}

fn resolve_subtask(task: &Task, key: &str) -> Result<String> {
    if let Some(pos) = key.strip_prefix('#') {
        return pos
            .parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|i| task.subtasks.get(i))
            .map(|sub| sub.id.clone())
            .ok_or_else(|| eyre!("No subtask at position {:?}", key));
    }

    let mut matches = task.subtasks.iter().filter(|s| s.id.starts_with(key));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(only.id.clone()),
        _ => Err(eyre!("No single subtask matches {:?}", key)),
    }
}

fn report(found: bool, verb: &str, id: &str) {
    if found {
        println!("{} {}", verb, id);
    } else {
        println!("No task {}", id);
    }
}

fn render_board(board: &TaskManager<FileKv>) {
    let today = Local::now().date_naive();
    let width = unique_prefix_len(board.tasks(), 8);

    for status in Status::ALL {
        let column = board.column(status);
        println!("{} ({})", status_heading(status), column.len());
        for task in column {
            render_task(task, width, today);
        }
        println!();
    }

    if board.filter().has_constraints() {
        println!("{}", "Filters active; drop --tag/--priority/--status to see every task".dimmed());
    }

    let tags = board.all_tags();
    if !tags.is_empty() {
        let tags: Vec<ColoredString> = tags
            .into_iter()
            .map(|tag| {
                if board.filter().tags.iter().any(|t| t == tag) {
                    tag.on_blue()
                } else {
                    tag.dimmed()
                }
            })
            .collect();
        let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
        println!("Tags: {}", tags.join(" "));
    }
}

fn render_task(task: &Task, width: usize, today: NaiveDate) {
    let id = task.id.get(..width).unwrap_or(&task.id);
    let mut line = format!("  {} {} {}", id.dimmed(), priority_badge(task.priority), task.title.bold());

    if !task.tags.is_empty() {
        line.push_str(&format!(" {}", format!("[{}]", task.tags.join(", ")).cyan()));
    }
    if let Some(due) = task.due_date {
        let due = due.format("%Y-%m-%d").to_string();
        if task.is_overdue(today) {
            line.push_str(&format!(" due {}", due.red()));
        } else {
            line.push_str(&format!(" due {}", due));
        }
    }
    let (done, total) = task.subtask_progress();
    if total > 0 {
        line.push_str(&format!(" {}", format!("{}/{}", done, total).green()));
    }
    println!("{}", line);

    for (i, sub) in task.subtasks.iter().enumerate() {
        let mark = if sub.completed { "[x]" } else { "[ ]" };
        let title = if sub.completed {
            sub.title.strikethrough()
        } else {
            sub.title.normal()
        };
        println!("      #{} {} {}", i + 1, mark, title);
    }
}

fn status_heading(status: Status) -> ColoredString {
    match status {
        Status::Todo => status.title().blue().bold(),
        Status::InProgress => status.title().yellow().bold(),
        Status::Done => status.title().green().bold(),
    }
}

fn priority_badge(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_subtasks(ids: &[&str]) -> Task {
        let mut task = Task::from_draft(TaskDraft::new("T", Status::Todo)).unwrap();
        for id in ids {
            let mut sub = taskboard::Subtask::new("step");
            sub.id = id.to_string();
            task.subtasks.push(sub);
        }
        task
    }

    #[test]
    fn test_resolve_subtask_digit_prefix_matches_id() {
        let task = task_with_subtasks(&["0199aaaa", "01aabbbb"]);

        assert_eq!(resolve_subtask(&task, "01a").unwrap(), "01aabbbb");
        assert_eq!(resolve_subtask(&task, "0199").unwrap(), "0199aaaa");
        assert!(resolve_subtask(&task, "01").is_err());
    }

    #[test]
    fn test_resolve_subtask_by_position() {
        let task = task_with_subtasks(&["0199aaaa", "01aabbbb"]);

        assert_eq!(resolve_subtask(&task, "#2").unwrap(), "01aabbbb");
        assert!(resolve_subtask(&task, "#0").is_err());
        assert!(resolve_subtask(&task, "#3").is_err());
        assert!(resolve_subtask(&task, "#x").is_err());
    }
}
