// Terminal rendering of task views and the dashboard

use crate::dashboard::Dashboard;
use crate::filter::{SortColumn, SortOrder, SortSpec};
use crate::task::{self, Task};
use crate::theme::Theme;
use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

const EMPTY_VIEW: &str = "No tasks found.";

/// Colors for one theme: bright tones for dark terminals, plain ones for light
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn heading(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_white().bold(),
            Theme::Light => s.black().bold(),
        }
    }

    pub fn done(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_green(),
            Theme::Light => s.green(),
        }
    }

    pub fn pending(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_yellow(),
            Theme::Light => s.blue(),
        }
    }

    pub fn muted(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_black(),
            Theme::Light => s.dimmed(),
        }
    }
}

/// Due date in the user's pattern, or the storage layout if the pattern
/// cannot be rendered for a naive date-time
pub fn format_due(due_at: &NaiveDateTime, date_format: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", due_at.format(date_format)) {
        Ok(()) => out,
        Err(_) => task::format_due(due_at),
    }
}

/// Render `view` as a table; the active sort column carries an arrow
pub fn render_table(view: &[&Task], sort: SortSpec, palette: Palette, date_format: &str) -> String {
    if view.is_empty() {
        return palette.muted(EMPTY_VIEW).to_string();
    }

    let task_header = header_label("Task", SortColumn::Task, sort);
    let due_header = header_label("Due", SortColumn::Date, sort);

    let dues: Vec<String> = view.iter().map(|t| format_due(&t.due_at, date_format)).collect();

    let id_width = view
        .iter()
        .map(|t| t.id.to_string().len())
        .chain(std::iter::once(2))
        .max()
        .unwrap_or(2);
    let text_width = view
        .iter()
        .map(|t| t.text.chars().count())
        .chain(std::iter::once(task_header.chars().count()))
        .max()
        .unwrap_or(0);
    let due_width = dues
        .iter()
        .map(|d| d.chars().count())
        .chain(std::iter::once(due_header.chars().count()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(view.len() + 1);
    lines.push(
        palette
            .heading(&format!(
                "{:<id_width$}  {}  {}  Status",
                "ID",
                pad(&task_header, text_width),
                pad(&due_header, due_width),
            ))
            .to_string(),
    );

    for (task, due) in view.iter().zip(&dues) {
        let status = if task.completed {
            palette.done(task.status_label())
        } else {
            palette.pending(task.status_label())
        };
        let text = pad(&task.text, text_width);
        let text = if task.completed {
            palette.muted(&text).to_string()
        } else {
            text
        };

        lines.push(format!(
            "{}  {}  {}  {}",
            palette.muted(&format!("{:>id_width$}", task.id)),
            text,
            pad(due, due_width),
            status
        ));
    }

    lines.join("\n")
}

pub fn render_dashboard(dashboard: &Dashboard, palette: Palette) -> String {
    format!(
        "{} {}  {} {}  {} {}  {} {}%",
        palette.heading("Total:"),
        dashboard.total,
        palette.heading("Completed:"),
        palette.done(&dashboard.completed.to_string()),
        palette.heading("Pending:"),
        palette.pending(&dashboard.pending.to_string()),
        palette.heading("Progress:"),
        dashboard.progress_percent,
    )
}

pub fn render_task(task: &Task, palette: Palette, date_format: &str) -> String {
    let status = if task.completed {
        palette.done(task.status_label())
    } else {
        palette.pending(task.status_label())
    };
    format!(
        "[{}] {} (due {}) {}",
        task.id,
        task.text,
        format_due(&task.due_at, date_format),
        status
    )
}

fn header_label(label: &str, column: SortColumn, sort: SortSpec) -> String {
    if sort.column != column {
        return label.to_string();
    }
    match sort.order {
        SortOrder::Asc => format!("{} ▲", label),
        SortOrder::Desc => format!("{} ▼", label),
    }
}

/// Left-align to `width` characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}
