use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, eyre};
use std::io::{self, Write};
use std::path::PathBuf;
use taskmaster::config::CONFIG_FILE;
use taskmaster::render::{self, Palette};
use taskmaster::{Config, SortColumn, SortOrder, SortSpec, SqliteStorage, StatusFilter, TaskError, TaskStore, Theme};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(about = "Taskmaster - task list with filtering, search, sorting and a progress dashboard")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the .taskmaster store (default: platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Config file (default: <store>/.taskmaster/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task description
        text: String,

        /// Due date-time, e.g. 2024-05-01T14:30
        #[arg(short, long)]
        due: String,
    },

    /// Mark a task done, or pending again
    Toggle { id: i64 },

    /// Delete a task
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete all tasks
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show tasks
    List {
        /// all, pending or completed
        #[arg(short, long)]
        filter: Option<StatusFilter>,

        /// Case-insensitive text search
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Sort column: task or date
        #[arg(long)]
        sort: Option<SortColumn>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show task counts and progress
    Stats,

    /// Show or change the theme: light, dark or toggle
    Theme { mode: Option<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(cli.verbose))
        .init();

    let store_path = cli.store_path.clone().unwrap_or_else(default_store_path);
    let storage = SqliteStorage::open(&store_path)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| storage.base_path().join(CONFIG_FILE));
    let config = Config::load(&config_path)?;
    if !config.color {
        colored::control::set_override(false);
    }

    let mut store = TaskStore::open(storage);
    store.set_filter(config.filter);
    store.set_sort(config.sort);

    run(cli.command, &mut store, &config)
}

fn run(command: Commands, store: &mut TaskStore<SqliteStorage>, config: &Config) -> Result<()> {
    let palette = Palette::for_theme(store.view_state().theme);

    match command {
        Commands::Add { text, due } => {
            let task = store.add_task(&text, &due)?;
            println!("Added {}", render::render_task(&task, palette, &config.date_format));
        }
        Commands::Toggle { id } => match store.toggle_completed(id)? {
            Some(true) => println!("Task {} marked done", id),
            Some(false) => println!("Task {} marked pending", id),
            None => println!("No task with id {}", id),
        },
        Commands::Delete { id, yes } => {
            let task = store.get(id).ok_or(TaskError::NotFound(id))?;
            let summary = render::render_task(task, palette, &config.date_format);
            if !yes && !confirm(&format!("Delete {}?", summary))? {
                println!("Cancelled");
                return Ok(());
            }
            store.delete_task(id)?;
            println!("Deleted task {}", id);
        }
        Commands::Clear { yes } => {
            let count = store.tasks().len();
            if count == 0 {
                println!("Nothing to delete.");
                return Ok(());
            }
            if !yes && !confirm(&format!("Delete ALL {} tasks?", count))? {
                println!("Cancelled");
                return Ok(());
            }
            match store.delete_all() {
                Ok(removed) => println!("Deleted {} tasks", removed),
                Err(TaskError::Empty) => println!("Nothing to delete."),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::List {
            filter,
            search,
            sort,
            desc,
        } => {
            if let Some(filter) = filter {
                store.set_filter(filter);
            }
            if let Some(query) = search {
                store.set_search(&query);
            }
            if sort.is_some() || desc {
                let column = sort.unwrap_or(store.view_state().sort.column);
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                store.set_sort(SortSpec::new(column, order));
            }

            let view = store.current_view();
            println!(
                "{}",
                render::render_table(&view, store.view_state().sort, palette, &config.date_format)
            );
            println!();
            println!("{}", render::render_dashboard(&store.compute_dashboard(), palette));
        }
        Commands::Stats => {
            println!("{}", render::render_dashboard(&store.compute_dashboard(), palette));
        }
        Commands::Theme { mode } => {
            let theme = match mode.as_deref() {
                None => store.view_state().theme,
                Some("toggle") => store.toggle_theme()?,
                Some(name) => {
                    let theme: Theme = name.parse()?;
                    store.set_theme(theme)?;
                    theme
                }
            };
            println!("Theme: {}", theme);
        }
    }

    Ok(())
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskmaster"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    let read = io::stdin().read_line(&mut answer)?;
    if read == 0 {
        return Err(eyre!("No confirmation received (use --yes to skip the prompt)"));
    }

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
