//! Task entity and related types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{TasksError, TasksResult};

/// Maximum title length accepted from the task form
pub const MAX_TITLE_LEN: usize = 140;

/// Maximum description length accepted from the task form
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Task status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// The other status.
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "todo" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(TasksError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// Effort estimate levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskEffort {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for TaskEffort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for TaskEffort {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TasksError::InvalidEffort {
                effort: s.to_string(),
            }),
        }
    }
}

/// Extended and basic ISO-8601 date-times carrying an offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%z",
];

/// Date-times without an offset, read as UTC.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse an ISO-8601 due date.
///
/// Accepts RFC 3339, extended or basic calendar dates and date-times,
/// minute precision, and offsets with or without a colon. A date-time
/// without an offset is taken as UTC and a bare date as midnight UTC.
pub fn parse_due_date(value: &str) -> TasksResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    // `%z` has no `Z` form
    let zoned = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+0000"),
        None => value.to_string(),
    };
    let with_offset = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&zoned, format).ok())
        .map(|ts| ts.with_timezone(&Utc));
    if let Some(ts) = with_offset {
        return Ok(ts);
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc())
        .ok_or_else(|| TasksError::validation(format!("'{value}' is not an ISO-8601 date")))
}

/// Format a due date the way it crosses the prioritization boundary.
pub fn format_due_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Core task structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier (UUID v4)
    pub id: String,

    /// Brief, descriptive title
    pub title: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current task status
    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "estimatedEffort"
    )]
    pub estimated_effort: Option<TaskEffort>,

    /// Model-generated reason from the last prioritization run
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "prioritizationReason"
    )]
    pub prioritization_reason: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            due_date: None,
            estimated_effort: None,
            prioritization_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a task from a validated draft.
    pub fn from_draft(draft: TaskDraft) -> TasksResult<Self> {
        let mut task = Self::new(String::new());
        task.apply_draft(draft)?;
        Ok(task)
    }

    /// Overwrite the editable fields. The prioritization reason is kept.
    pub fn apply_draft(&mut self, draft: TaskDraft) -> TasksResult<()> {
        draft.validate()?;
        self.title = draft.title;
        self.description = draft.description.filter(|d| !d.is_empty());
        self.status = draft.status;
        self.due_date = draft.due_date;
        self.estimated_effort = draft.estimated_effort;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flip between pending and completed.
    pub fn toggle_status(&mut self) {
        self.status = self.status.toggled();
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

/// Editable fields of a task, as submitted from a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "estimatedEffort")]
    pub estimated_effort: Option<TaskEffort>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_effort(mut self, effort: TaskEffort) -> Self {
        self.estimated_effort = Some(effort);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Check form constraints on title and description.
    pub fn validate(&self) -> TasksResult<()> {
        if self.title.trim().is_empty() {
            return Err(TasksError::validation("Title is required"));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(TasksError::validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(TasksError::validation(format!(
                    "Description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            estimated_effort: task.estimated_effort,
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_new() {
        let task = Task::new("Write report");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.prioritization_reason.is_none());
        assert!(uuid::Uuid::parse_str(&task.id).is_ok());
    }

    #[test]
    fn test_task_status_parsing() {
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!(
            "Completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
        assert!("in-progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_effort_parsing() {
        assert_eq!("HIGH".parse::<TaskEffort>().unwrap(), TaskEffort::High);
        assert!("huge".parse::<TaskEffort>().is_err());
    }

    #[test]
    fn test_toggle_status() {
        let mut task = Task::new("Test");
        task.toggle_status();
        assert_eq!(task.status, TaskStatus::Completed);
        task.toggle_status();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_draft_validation() {
        assert!(TaskDraft::new("ok").validate().is_ok());
        assert!(TaskDraft::new("   ").validate().is_err());
        assert!(TaskDraft::new("x".repeat(MAX_TITLE_LEN + 1)).validate().is_err());
        assert!(TaskDraft::new("ok")
            .with_description("d".repeat(MAX_DESCRIPTION_LEN + 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_apply_draft_keeps_reason() {
        let mut task = Task::new("Old");
        task.prioritization_reason = Some("Due soon".to_string());
        task.apply_draft(TaskDraft::new("New").with_description(""))
            .unwrap();
        assert_eq!(task.title, "New");
        assert!(task.description.is_none());
        assert_eq!(task.prioritization_reason.as_deref(), Some("Due soon"));
    }

    #[test]
    fn test_matches_search() {
        let mut task = Task::new("Deploy to production");
        task.description = Some("Run the Release pipeline".to_string());
        assert!(task.matches_search("deploy"));
        assert!(task.matches_search("release"));
        assert!(!task.matches_search("rollback"));
    }

    #[test]
    fn test_parse_due_date() {
        let date_only = parse_due_date("2024-01-01").unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let ts = parse_due_date("2024-03-05T10:30:00.000Z").unwrap();
        assert_eq!(format_due_date(&ts), "2024-03-05T10:30:00.000Z");

        assert!(parse_due_date("next tuesday").is_err());
    }

    #[test]
    fn test_parse_due_date_iso_variants() {
        let at = |h, m| Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap();

        // Local date-time is read as UTC
        assert_eq!(parse_due_date("2024-01-01T10:00:00").unwrap(), at(10, 0));
        assert_eq!(parse_due_date("2024-01-01T10:00").unwrap(), at(10, 0));
        assert_eq!(parse_due_date("2024-01-01 10:00:00").unwrap(), at(10, 0));

        assert_eq!(parse_due_date("2024-01-01T10:00Z").unwrap(), at(10, 0));
        assert_eq!(parse_due_date("2024-01-01T10:00+01:00").unwrap(), at(9, 0));

        assert_eq!(parse_due_date("20240101").unwrap(), at(0, 0));
        assert_eq!(parse_due_date("20240101T1000").unwrap(), at(10, 0));
        assert_eq!(parse_due_date("20240101T103000Z").unwrap(), at(10, 30));

        assert_eq!(parse_due_date("2024-01-01T10:00:00+0100").unwrap(), at(9, 0));
        let fractional = parse_due_date("2024-01-01T10:00:00.250-0230").unwrap();
        assert_eq!(format_due_date(&fractional), "2024-01-01T12:30:00.250Z");

        assert!(parse_due_date("2024-13-01").is_err());
        assert!(parse_due_date("2024-01-01T25:00").is_err());
        assert!(parse_due_date("someday").is_err());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let mut task = Task::new("A");
        task.estimated_effort = Some(TaskEffort::Low);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["estimatedEffort"], "low");
        assert!(json.get("prioritizationReason").is_none());
    }
}
