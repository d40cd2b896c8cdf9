// Taskmaster - task list with filter/search/sort views and durable key-value persistence

pub mod codec;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod render;
pub mod sqlite;
pub mod storage;
pub mod store;
pub mod task;
pub mod theme;

// Re-export main types for convenience
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::TaskError;
pub use filter::{SortColumn, SortOrder, SortSpec, StatusFilter, ViewState};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, Storage};
pub use store::{TASKS_KEY, THEME_KEY, TaskStore};
pub use task::{Task, now_ms};
pub use theme::Theme;
