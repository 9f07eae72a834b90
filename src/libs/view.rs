use super::diff::{DayRow, Diff};
use super::formatter::{format_duration, snip};
use crate::api::openproject;
use crate::api::tmetric::TimeEntry;
use chrono::Duration;
use console::Term;
use prettytable::{row, Table};

/// Used when the terminal size is unknown.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Rough width of the date, duration and delta columns with borders.
const FIXED_COLUMNS_WIDTH: usize = 45;

const MIN_CONTENT_WIDTH: usize = 10;

pub struct View {}

impl View {
    /// Prints the diff table sized to the terminal.
    pub fn diff(diff: &Diff) {
        Self::diff_table(diff, terminal_width()).printstd();
    }

    pub fn diff_table(diff: &Diff, terminal_width: usize) -> Table {
        let width = content_width(terminal_width);
        let mut table = Table::new();

        table.set_titles(row!["date", "tmetric entry", "tm\ndur", "OpenProject entry", "OP\ndur", "time\ndiff"]);
        for day in &diff.rows {
            let (tmetric_cell, tmetric_durations) = tmetric_cells(day, width);
            let (openproject_cell, openproject_durations) = openproject_cells(day, width);
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                tmetric_cell,
                tmetric_durations,
                openproject_cell,
                openproject_durations,
                day.delta_minutes()
            ]);
        }
        table.add_row(row![
            "total",
            "",
            format_duration(&Duration::minutes(diff.tmetric_minutes())),
            "",
            format_duration(&Duration::minutes(diff.openproject_minutes())),
            diff.delta_minutes()
        ]);

        table
    }
}

/// Width of each of the two description columns.
pub fn content_width(terminal_width: usize) -> usize {
    (terminal_width.saturating_sub(FIXED_COLUMNS_WIDTH) / 2).max(MIN_CONTENT_WIDTH)
}

fn terminal_width() -> usize {
    Term::stdout()
        .size_checked()
        .map(|(_, columns)| columns as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

fn tmetric_cells(day: &DayRow, width: usize) -> (String, String) {
    let descriptions: Vec<String> = day.tmetric.iter().map(|entry| tmetric_description(entry, width)).collect();
    let durations: Vec<String> = day
        .tmetric
        .iter()
        .map(|entry| entry.human_duration().unwrap_or_default())
        .collect();
    (join_blocks(&descriptions), join_durations(&durations))
}

fn openproject_cells(day: &DayRow, width: usize) -> (String, String) {
    let descriptions: Vec<String> = day
        .openproject
        .iter()
        .map(|entry| openproject_description(entry, width))
        .collect();
    let durations: Vec<String> = day
        .openproject
        .iter()
        .map(|entry| entry.human_duration().unwrap_or_default())
        .collect();
    (join_blocks(&descriptions), join_durations(&durations))
}

fn tmetric_description(entry: &TimeEntry, width: usize) -> String {
    [
        format!("Description: {}", entry.note),
        format!("- Project: {}", entry.project.name),
        format!("- WP ID: {}", entry.task.external_link.issue_id),
        format!("- WP: {}", entry.task.name),
        format!("- Work Type: {}", entry.work_type().unwrap_or_default()),
    ]
    .iter()
    .map(|line| snip(line, width))
    .collect::<Vec<_>>()
    .join("\n")
}

fn openproject_description(entry: &openproject::TimeEntry, width: usize) -> String {
    let work_package_id = entry.work_package_id().map(|id| id.to_string()).unwrap_or_default();
    [
        format!("Comment: {}", entry.comment.raw),
        format!("- Project: {}", entry.links.project.title),
        format!("- WP ID: #{}", work_package_id),
        format!("- WP: {}", entry.links.work_package.title),
        format!("- Activity: {}", entry.links.activity.title),
    ]
    .iter()
    .map(|line| snip(line, width))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Entry blocks are separated by an empty line.
fn join_blocks(blocks: &[String]) -> String {
    blocks.join("\n\n")
}

/// Puts every duration on the first line of its entry block.
fn join_durations(durations: &[String]) -> String {
    durations.join("\n\n\n\n\n\n")
}
