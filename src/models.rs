use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use std::fmt;

/// Columns read from every row of the `tasks` table
pub const TASK_COLUMNS: [&str; 3] = ["title", "subject", "deadline"];

/// One row of the `tasks` table, all fields read as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub deadline: Option<String>, // kept as text, see `deadline_date`
}

impl TaskRow {
    pub fn new(title: &str, subject: &str, deadline: &str) -> Self {
        TaskRow {
            title: Some(title.to_string()),
            subject: Some(subject.to_string()),
            deadline: Some(deadline.to_string()),
        }
    }

    /// Calendar day of the deadline, if it reads as a date
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        self.deadline.as_deref().and_then(parse_deadline)
    }

    /// Classify the deadline relative to `today`
    pub fn deadline_status(&self, today: NaiveDate) -> DeadlineStatus {
        match self.deadline_date() {
            None => DeadlineStatus::Undated,
            Some(day) if day < today => DeadlineStatus::Overdue,
            Some(day) if day == today => DeadlineStatus::DueToday,
            Some(_) => DeadlineStatus::Upcoming,
        }
    }
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task: {}, Subject: {}, Deadline: {}",
            or_null(&self.title),
            or_null(&self.subject),
            or_null(&self.deadline)
        )
    }
}

fn or_null(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

fn parse_deadline(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(|ndt| ndt.date())
}

/// Where a deadline stands relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Overdue,
    DueToday,
    Upcoming,
    Undated,
}

/// Which deadline statuses to print
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Overdue,
    DueToday,
    Upcoming,
    Undated,
}

impl StatusFilter {
    fn admits(self, status: DeadlineStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Overdue => status == DeadlineStatus::Overdue,
            StatusFilter::DueToday => status == DeadlineStatus::DueToday,
            StatusFilter::Upcoming => status == DeadlineStatus::Upcoming,
            StatusFilter::Undated => status == DeadlineStatus::Undated,
        }
    }
}

/// Client-side row filter; the default admits every row
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub subject: Option<String>,
    pub search: Option<String>,
    pub status: StatusFilter,
}

impl TaskFilter {
    pub fn matches(&self, row: &TaskRow, today: NaiveDate) -> bool {
        if let Some(subject) = &self.subject {
            if row.subject.as_deref() != Some(subject.as_str()) {
                return false;
            }
        }

        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            };
            if !hit(&row.title) && !hit(&row.subject) {
                return false;
            }
        }

        self.status.admits(row.deadline_status(today))
    }
}

/// Counts of printed rows by deadline status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub upcoming: usize,
    pub undated: usize,
}

impl TaskSummary {
    pub fn record(&mut self, status: DeadlineStatus) {
        self.total += 1;
        match status {
            DeadlineStatus::Overdue => self.overdue += 1,
            DeadlineStatus::DueToday => self.due_today += 1,
            DeadlineStatus::Upcoming => self.upcoming += 1,
            DeadlineStatus::Undated => self.undated += 1,
        }
    }
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} tasks, {} due today, {} overdue, {} upcoming, {} undated",
            self.total, self.due_today, self.overdue, self.upcoming, self.undated
        )
    }
}
