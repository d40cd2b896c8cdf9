// View pipeline: status filter, text search and column sort

use crate::error::TaskError;
use crate::task::Task;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Which tasks to show by completion status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Sortable table column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Task,
    #[default]
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort: one column and a direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub column: SortColumn,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(column: SortColumn, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// Header click: same column flips direction, a new column starts ascending
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.order = self.order.flipped();
        } else {
            self.column = column;
            self.order = SortOrder::Asc;
        }
    }

    /// Comparator for this sort. Descending reverses the comparison, so equal
    /// keys compare equal in both directions.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.column {
            SortColumn::Task => a.text.to_lowercase().cmp(&b.text.to_lowercase()),
            SortColumn::Date => a.due_at.cmp(&b.due_at),
        };
        self.directed(ordering)
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Presentation state held alongside the task collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search_query: String,
    pub sort: SortSpec,
    pub filter: StatusFilter,
    pub theme: Theme,
}

/// Run filter, then search, then a stable sort over `tasks`.
///
/// The input slice is left untouched; the result borrows from it.
pub fn compute_view<'a>(tasks: &'a [Task], filter: StatusFilter, search_query: &str, sort: SortSpec) -> Vec<&'a Task> {
    let mut view: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();

    let needle = search_query.trim().to_lowercase();
    if !needle.is_empty() {
        view.retain(|t| t.text.to_lowercase().contains(&needle));
    }

    // slice::sort_by is stable
    match sort.column {
        SortColumn::Task => {
            let mut keyed: Vec<(String, &Task)> = view.into_iter().map(|t| (t.text.to_lowercase(), t)).collect();
            keyed.sort_by(|(a, _), (b, _)| sort.directed(a.cmp(b)));
            keyed.into_iter().map(|(_, t)| t).collect()
        }
        SortColumn::Date => {
            view.sort_by(|a, b| sort.compare(a, b));
            view
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(TaskError::Validation(format!(
                "unknown filter: {:?} (expected all, pending or completed)",
                other
            ))),
        }
    }
}

impl FromStr for SortColumn {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "task" => Ok(SortColumn::Task),
            "date" => Ok(SortColumn::Date),
            other => Err(TaskError::Validation(format!(
                "unknown sort column: {:?} (expected task or date)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: i64, text: &str, day: u32, completed: bool) -> Task {
        let due = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut t = Task::new(id, text, due);
        t.completed = completed;
        t
    }

    fn texts(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.text.clone()).collect()
    }

    fn ids(view: &[&Task]) -> Vec<i64> {
        view.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_filter_by_status() {
        let tasks = vec![task(1, "a", 1, false), task(2, "b", 2, true), task(3, "c", 3, false)];
        let sort = SortSpec::default();

        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", sort)), vec![1, 2, 3]);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::Pending, "", sort)), vec![1, 3]);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::Completed, "", sort)), vec![2]);
    }

    #[test]
    fn test_all_with_empty_search_drops_nothing() {
        let tasks = vec![task(1, "z", 9, true), task(2, "y", 3, false), task(3, "x", 5, false)];
        let view = compute_view(&tasks, StatusFilter::All, "   ", SortSpec::default());
        assert_eq!(ids(&view), vec![2, 3, 1]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_keeps_order() {
        let tasks = vec![
            task(1, "Buy Milk", 1, false),
            task(2, "Walk dog", 1, false),
            task(3, "Drink Milk", 1, false),
        ];
        let view = compute_view(&tasks, StatusFilter::All, " milk ", SortSpec::default());
        assert_eq!(texts(&view), vec!["Buy Milk", "Drink Milk"]);
    }

    #[test]
    fn test_search_runs_after_filter() {
        let tasks = vec![task(1, "Buy Milk", 1, true), task(2, "Drink Milk", 2, false)];
        let view = compute_view(&tasks, StatusFilter::Pending, "MILK", SortSpec::default());
        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn test_sort_by_task_is_case_insensitive() {
        let tasks = vec![task(1, "Banana", 1, false), task(2, "apple", 2, false), task(3, "Cherry", 3, false)];
        let asc = SortSpec::new(SortColumn::Task, SortOrder::Asc);
        assert_eq!(
            texts(&compute_view(&tasks, StatusFilter::All, "", asc)),
            vec!["apple", "Banana", "Cherry"]
        );

        let desc = SortSpec::new(SortColumn::Task, SortOrder::Desc);
        assert_eq!(
            texts(&compute_view(&tasks, StatusFilter::All, "", desc)),
            vec!["Cherry", "Banana", "apple"]
        );
    }

    #[test]
    fn test_sort_by_date() {
        let tasks = vec![task(1, "late", 20, false), task(2, "early", 2, false), task(3, "mid", 10, false)];
        let asc = SortSpec::new(SortColumn::Date, SortOrder::Asc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", asc)), vec![2, 3, 1]);

        let desc = SortSpec::new(SortColumn::Date, SortOrder::Desc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", desc)), vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_keep_insertion_order_in_both_directions() {
        let tasks = vec![
            task(1, "same", 5, false),
            task(2, "other", 1, false),
            task(3, "SAME", 5, false),
            task(4, "Same", 5, false),
        ];

        let asc = SortSpec::new(SortColumn::Date, SortOrder::Asc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", asc)), vec![2, 1, 3, 4]);

        let desc = SortSpec::new(SortColumn::Date, SortOrder::Desc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", desc)), vec![1, 3, 4, 2]);

        let by_text = SortSpec::new(SortColumn::Task, SortOrder::Desc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", by_text)), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_task_sort_matches_comparator() {
        let tasks = vec![
            task(1, "beta", 1, false),
            task(2, "Alpha", 2, false),
            task(3, "ALPHA", 3, false),
            task(4, "Émile", 4, false),
            task(5, "alpha", 5, false),
        ];

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sort = SortSpec::new(SortColumn::Task, order);
            let mut expected: Vec<&Task> = tasks.iter().collect();
            expected.sort_by(|a, b| sort.compare(a, b));
            assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", sort)), ids(&expected));
        }

        let asc = SortSpec::new(SortColumn::Task, SortOrder::Asc);
        assert_eq!(ids(&compute_view(&tasks, StatusFilter::All, "", asc)), vec![2, 3, 5, 1, 4]);
    }

    #[test]
    fn test_compute_view_does_not_reorder_source() {
        let tasks = vec![task(1, "b", 2, false), task(2, "a", 1, false)];
        let _ = compute_view(&tasks, StatusFilter::All, "", SortSpec::new(SortColumn::Task, SortOrder::Asc));
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[1].id, 2);
    }

    #[test]
    fn test_toggle_same_column_cycles_direction() {
        let mut sort = SortSpec::default();
        assert_eq!(sort, SortSpec::new(SortColumn::Date, SortOrder::Asc));

        sort.toggle(SortColumn::Date);
        assert_eq!(sort.order, SortOrder::Desc);
        sort.toggle(SortColumn::Date);
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_toggle_new_column_starts_ascending() {
        let mut sort = SortSpec::new(SortColumn::Date, SortOrder::Desc);
        sort.toggle(SortColumn::Task);
        assert_eq!(sort, SortSpec::new(SortColumn::Task, SortOrder::Asc));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert_eq!("task".parse::<SortColumn>().unwrap(), SortColumn::Task);
        assert!("done".parse::<StatusFilter>().is_err());
        assert!("priority".parse::<SortColumn>().is_err());
        assert_eq!(StatusFilter::Completed.to_string(), "completed");
    }
}
