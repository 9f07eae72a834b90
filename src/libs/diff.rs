//! Day-by-day comparison of Tmetric entries with OpenProject bookings.

use crate::api::openproject;
use crate::api::tmetric::TimeEntry;
use crate::libs::date_range::DateRange;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub tmetric: Vec<TimeEntry>,
    pub openproject: Vec<openproject::TimeEntry>,
    pub tmetric_minutes: i64,
    pub openproject_minutes: i64,
}

impl DayRow {
    /// Absolute difference of the booked minutes.
    pub fn delta_minutes(&self) -> i64 {
        (self.tmetric_minutes - self.openproject_minutes).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub rows: Vec<DayRow>,
}

impl Diff {
    /// Buckets both sides by day, one row for every day of the range.
    ///
    /// Entries are ordered by note (Tmetric) and comment (OpenProject) within
    /// a day. Entries whose duration cannot be computed count as zero.
    pub fn build(range: &DateRange, tmetric: &[TimeEntry], openproject: &[openproject::TimeEntry]) -> Self {
        let mut tmetric = tmetric.to_vec();
        tmetric.sort_by(|a, b| a.note.cmp(&b.note));
        let mut openproject = openproject.to_vec();
        openproject.sort_by(|a, b| a.comment.raw.cmp(&b.comment.raw));

        let rows = range
            .days()
            .map(|date| {
                let tmetric: Vec<TimeEntry> = tmetric.iter().filter(|entry| entry.day() == Some(date)).cloned().collect();
                let openproject: Vec<openproject::TimeEntry> = openproject
                    .iter()
                    .filter(|entry| entry.day() == Some(date))
                    .cloned()
                    .collect();

                let tmetric_minutes = tmetric
                    .iter()
                    .map(|entry| entry.duration().map(|d| d.num_minutes()).unwrap_or(0))
                    .sum();
                let openproject_minutes = openproject
                    .iter()
                    .map(|entry| entry.duration().map(|d| d.num_minutes()).unwrap_or(0))
                    .sum();

                DayRow {
                    date,
                    tmetric,
                    openproject,
                    tmetric_minutes,
                    openproject_minutes,
                }
            })
            .collect();

        Self { rows }
    }

    pub fn tmetric_minutes(&self) -> i64 {
        self.rows.iter().map(|row| row.tmetric_minutes).sum()
    }

    pub fn openproject_minutes(&self) -> i64 {
        self.rows.iter().map(|row| row.openproject_minutes).sum()
    }

    /// Absolute difference of the summed minutes over the whole range.
    pub fn delta_minutes(&self) -> i64 {
        (self.tmetric_minutes() - self.openproject_minutes()).abs()
    }
}
