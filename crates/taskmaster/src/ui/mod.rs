//! Terminal UI helpers for task display.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

use std::time::Duration;

use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::MergeReport;
use crate::entities::{Task, TaskEffort, TaskStatus};

/// Get colored status string
pub fn status_colored(status: TaskStatus) -> String {
    match status {
        TaskStatus::Pending => "pending".yellow().to_string(),
        TaskStatus::Completed => "completed".green().to_string(),
    }
}

/// Get colored effort string
pub fn effort_colored(effort: Option<TaskEffort>) -> String {
    match effort {
        Some(TaskEffort::Low) => "low".dimmed().to_string(),
        Some(TaskEffort::Medium) => "medium".normal().to_string(),
        Some(TaskEffort::High) => "high".red().to_string(),
        None => "-".dimmed().to_string(),
    }
}

fn due_label(task: &Task) -> String {
    task.due_date
        .map_or_else(|| "-".to_string(), |d| d.format("%b %-d, %Y").to_string())
}

/// Create a table for displaying tasks
pub fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Title").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Due").fg(Color::Cyan),
        Cell::new("Effort").fg(Color::Cyan),
        Cell::new("AI Prioritization").fg(Color::Cyan),
    ]);

    for (i, task) in tasks.iter().enumerate() {
        let status_color = match task.status {
            TaskStatus::Pending => Color::Yellow,
            TaskStatus::Completed => Color::Green,
        };

        let effort_color = match task.estimated_effort {
            Some(TaskEffort::High) => Color::Red,
            Some(TaskEffort::Medium) => Color::White,
            Some(TaskEffort::Low) | None => Color::DarkGrey,
        };

        let effort = task
            .estimated_effort
            .map_or_else(|| "-".to_string(), |e| e.to_string());

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&task.title),
            Cell::new(task.status.to_string()).fg(status_color),
            Cell::new(due_label(task)),
            Cell::new(effort).fg(effort_color),
            Cell::new(task.prioritization_reason.as_deref().unwrap_or("-")).fg(Color::Magenta),
        ]);
    }

    table
}

/// Display task details in a formatted way
pub fn display_task_details(task: &Task) {
    println!("{}", "═".repeat(60).dimmed());
    println!(
        "{} {}",
        task.title.cyan().bold(),
        format!("[{}]", task.status).yellow()
    );
    println!("{}", "═".repeat(60).dimmed());

    println!("{}: {}", "Status".bold(), status_colored(task.status));
    println!("{}: {}", "Due".bold(), due_label(task));
    println!("{}: {}", "Effort".bold(), effort_colored(task.estimated_effort));

    if let Some(description) = &task.description {
        println!();
        println!("{}", "Description".bold().underline());
        println!("{description}");
    }

    if let Some(reason) = &task.prioritization_reason {
        println!();
        println!("{}", "AI Prioritization".bold().underline());
        println!("{}", reason.magenta());
    }

    println!();
}

/// Describe a merge outcome.
pub fn print_merge_report(report: &MergeReport) {
    print_success(&format!(
        "AI suggestions applied to {} task(s)",
        report.applied.len()
    ));
    if !report.is_complete() {
        print_warning(&format!(
            "Ignored {} suggestion(s) that did not match a task",
            report.dropped.len()
        ));
    }
}

/// Spinner shown while waiting on the model backend.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::parse_due_date;

    #[test]
    fn test_task_table_rows() {
        let mut a = Task::new("Alpha");
        a.due_date = Some(parse_due_date("2024-01-01").unwrap());
        a.prioritization_reason = Some("Due first".to_string());
        let b = Task::new("Beta");

        let table = task_table(&[&a, &b]);
        let rendered = table.to_string();

        assert_eq!(table.row_iter().count(), 2);
        assert!(rendered.contains("Alpha"));
        assert!(rendered.contains("Jan 1, 2024"));
        assert!(rendered.contains("Due first"));
    }
}
