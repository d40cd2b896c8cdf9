// Task collection with view state, persisted through a Storage backend

use crate::codec;
use crate::dashboard::Dashboard;
use crate::error::TaskError;
use crate::filter::{self, SortColumn, SortSpec, StatusFilter, ViewState};
use crate::storage::Storage;
use crate::task::{self, Task};
use crate::theme::Theme;
use tracing::{debug, info, warn};

/// Storage key holding the serialized task array
pub const TASKS_KEY: &str = "todos";
/// Storage key holding the theme preference
pub const THEME_KEY: &str = "taskmaster-theme";

/// Owns the task collection and the presentation state around it
///
/// Every mutation rewrites the whole collection to storage before it is
/// committed in memory, so a failed write leaves the store unchanged.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    view: ViewState,
}

impl<S: Storage> TaskStore<S> {
    /// Open a store over `storage`, loading any persisted tasks and theme.
    ///
    /// Never fails: unreadable or corrupt data yields an empty collection.
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            view: ViewState::default(),
        };

        store.load();
        store.view.theme = store.get_theme();

        store
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Validate input and append a new pending task
    pub fn add_task(&mut self, text: &str, due: &str) -> Result<Task, TaskError> {
        let text = task::validate_text(text)?;
        let due_at = task::parse_due(due)?;

        let task = Task::new(task::next_id(&self.tasks, task::now_ms())?, text, due_at);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;

        info!(id = task.id, "Added task");
        Ok(task)
    }

    /// Flip the completed flag, returning the new value.
    ///
    /// An unknown id is a no-op and returns `Ok(None)`.
    pub fn toggle_completed(&mut self, id: i64) -> Result<Option<bool>, TaskError> {
        let Some(index) = self.position(id) else {
            debug!(id, "toggle_completed: no such task");
            return Ok(None);
        };

        let mut next = self.tasks.clone();
        next[index].completed = !next[index].completed;
        let completed = next[index].completed;
        self.commit(next)?;

        debug!(id, completed, "Toggled task");
        Ok(Some(completed))
    }

    /// Remove one task, returning it
    pub fn delete_task(&mut self, id: i64) -> Result<Task, TaskError> {
        let index = self.position(id).ok_or(TaskError::NotFound(id))?;

        let mut next = self.tasks.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(id, "Deleted task");
        Ok(removed)
    }

    /// Remove every task, returning how many were removed
    pub fn delete_all(&mut self) -> Result<usize, TaskError> {
        if self.tasks.is_empty() {
            return Err(TaskError::Empty);
        }

        let count = self.tasks.len();
        self.commit(Vec::new())?;

        info!(count, "Deleted all tasks");
        Ok(count)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Filter, search and sort the collection without changing it
    pub fn compute_view(&self, filter: StatusFilter, search_query: &str, sort: SortSpec) -> Vec<&Task> {
        filter::compute_view(&self.tasks, filter, search_query, sort)
    }

    /// [`compute_view`](Self::compute_view) using the held view state
    pub fn current_view(&self) -> Vec<&Task> {
        self.compute_view(self.view.filter, &self.view.search_query, self.view.sort)
    }

    pub fn compute_dashboard(&self) -> Dashboard {
        Dashboard::compute(&self.tasks)
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.view.filter = filter;
    }

    pub fn set_search(&mut self, query: &str) {
        self.view.search_query = query.to_string();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.view.sort = sort;
    }

    /// Header click on `column`; returns the resulting sort
    pub fn toggle_sort(&mut self, column: SortColumn) -> SortSpec {
        self.view.sort.toggle(column);
        self.view.sort
    }

    // ========================================================================
    // Theme
    // ========================================================================

    /// Persisted theme, `Dark` when unset or unreadable
    pub fn get_theme(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse::<Theme>().unwrap_or_else(|_| {
                warn!(value = %raw, "Unknown theme in storage, using default");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme, using default");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), TaskError> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        self.view.theme = theme;
        debug!(%theme, "Saved theme");
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, TaskError> {
        let theme = self.view.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the full collection to storage
    pub fn save(&mut self) -> Result<(), TaskError> {
        Self::persist(&mut self.storage, &self.tasks)
    }

    /// Replace the in-memory collection with what storage holds.
    ///
    /// Returns the number of tasks loaded. Missing, unreadable or corrupt data
    /// resets the collection to empty; corrupt data is left in storage until
    /// the next mutation overwrites it.
    pub fn load(&mut self) -> usize {
        let raw = match self.storage.get(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored tasks, starting empty");
                self.tasks.clear();
                return 0;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored tasks, starting empty");
                self.tasks.clear();
                return 0;
            }
        };

        match codec::decode_tasks(&raw) {
            Ok(decoded) => {
                if decoded.skipped > 0 {
                    warn!(skipped = decoded.skipped, "Dropped invalid task records");
                }
                self.tasks = decoded.tasks;
            }
            Err(e) => {
                warn!(error = %e, "Stored tasks are corrupt, starting empty");
                self.tasks.clear();
            }
        }

        info!(count = self.tasks.len(), "Loaded tasks");
        self.tasks.len()
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), TaskError> {
        Self::persist(&mut self.storage, &next)?;
        self.tasks = next;
        Ok(())
    }

    fn persist(storage: &mut S, tasks: &[Task]) -> Result<(), TaskError> {
        let raw = codec::encode_tasks(tasks)?;
        storage.set(TASKS_KEY, &raw)?;
        debug!(count = tasks.len(), "Saved tasks");
        Ok(())
    }
}
