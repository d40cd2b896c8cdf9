// Summary counts over the task collection

use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub progress_percent: u8,
}

impl Dashboard {
    pub fn compute(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();

        Self {
            total,
            completed,
            pending: total - completed,
            progress_percent: progress_percent(completed, total),
        }
    }
}

/// `completed / total` as a percentage, rounded half-up; 0 for an empty list
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (completed * 100 + total / 2) / total;
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tasks(completed_flags: &[bool]) -> Vec<Task> {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        completed_flags
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let mut t = Task::new(i as i64, "t", due);
                t.completed = *done;
                t
            })
            .collect()
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(Dashboard::compute(&[]), Dashboard::default());
    }

    #[test]
    fn test_counts() {
        let dash = Dashboard::compute(&tasks(&[true, false, false]));
        assert_eq!(dash.total, 3);
        assert_eq!(dash.completed, 1);
        assert_eq!(dash.pending, 2);
        assert_eq!(dash.progress_percent, 33);
    }

    #[test]
    fn test_progress_rounding() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 4), 75);
        assert_eq!(progress_percent(1, 2), 50);
        // 12.5 rounds up
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(4, 4), 100);
        assert_eq!(progress_percent(0, 4), 0);
    }
}
