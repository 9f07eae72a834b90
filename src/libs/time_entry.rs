//! Rules for Tmetric and OpenProject time entries.
//!
//! A Tmetric entry can be copied to OpenProject once it carries a work-type
//! tag and a task linked to an OpenProject work package. Copied entries get
//! the transferred tag and are skipped from then on.

use crate::api::openproject::{self, activity_href, user_href, work_package_href, Activity, Comment, Link, Links};
use crate::api::tmetric::{Tag, TimeEntry};
use crate::libs::error::{Error, Result};
use crate::libs::formatter::{format_duration, format_iso8601_duration, parse_iso8601_duration};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

const ENTRY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn parse_entry_time(value: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), ENTRY_TIME_FORMAT)
}

impl TimeEntry {
    /// Name of the first work-type tag.
    pub fn work_type(&self) -> Result<&str> {
        self.tags
            .iter()
            .find(|tag| tag.is_work_type)
            .map(|tag| tag.name.as_str())
            .ok_or_else(|| Error::validation("no work type found"))
    }

    pub fn has_work_type(&self) -> bool {
        self.tags.iter().any(|tag| tag.is_work_type)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Work package id of the linked task, parsed from `#<id>`.
    pub fn issue_id(&self) -> Result<u64> {
        let issue_id = &self.task.external_link.issue_id;
        issue_id
            .strip_prefix('#')
            .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| {
                Error::validation(format!(
                    "time entry '{}' is not linked to an OpenProject work package (issue id '{}')",
                    self.note, issue_id
                ))
            })
    }

    /// Whether the task points at a work package on the external task host.
    pub fn has_valid_link(&self, external_task_link: &str) -> bool {
        self.task.id != 0
            && self.issue_id().is_ok()
            && self.task.external_link.link.starts_with(external_task_link)
    }

    pub fn duration(&self) -> Result<Duration> {
        let start = parse_entry_time(&self.start_time)
            .map_err(|err| Error::validation(format!("failed to parse startTime: {err}")))?;
        let end = parse_entry_time(&self.end_time)
            .map_err(|err| Error::validation(format!("failed to parse endTime: {err}")))?;

        let duration = end - start;
        if duration < Duration::zero() {
            return Err(Error::validation("end time is before start time"));
        }
        Ok(duration)
    }

    /// ISO 8601 duration and the day the work started.
    pub fn iso8601_duration(&self) -> Result<(String, NaiveDate)> {
        let duration = self.duration()?;
        let spent_on = parse_entry_time(&self.start_time)
            .map_err(|err| Error::validation(format!("failed to parse startTime: {err}")))?
            .date();
        Ok((format_iso8601_duration(&duration), spent_on))
    }

    pub fn human_duration(&self) -> Result<String> {
        Ok(format_duration(&self.duration()?))
    }

    /// Day of the entry taken from the start time.
    pub fn day(&self) -> Option<NaiveDate> {
        self.start_time
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }

    /// Adds the transferred tag unless the entry already has it.
    pub fn tag_as_transferred(&mut self, tag_name: &str) {
        if !self.has_tag(tag_name) {
            self.tags.push(Tag {
                id: 0,
                name: tag_name.to_string(),
                is_work_type: false,
            });
        }
    }

    /// Builds the OpenProject booking for this entry.
    ///
    /// With `user` set the booking is made on behalf of that user.
    pub fn to_openproject(&self, activity: &Activity, user: Option<&openproject::User>) -> Result<openproject::TimeEntry> {
        let issue_id = self.issue_id()?;
        let (hours, spent_on) = self.iso8601_duration()?;

        Ok(openproject::TimeEntry {
            id: None,
            ongoing: false,
            comment: Comment { raw: self.note.clone() },
            spent_on: spent_on.format("%Y-%m-%d").to_string(),
            hours,
            links: Links {
                work_package: Link::new(work_package_href(issue_id)),
                activity: Link::new(activity_href(activity.id)),
                project: Link::default(),
                user: user.map(|user| Link::new(user_href(user.id))).unwrap_or_default(),
            },
        })
    }
}

impl openproject::TimeEntry {
    pub fn duration(&self) -> Result<Duration> {
        parse_iso8601_duration(&self.hours)
    }

    pub fn human_duration(&self) -> Result<String> {
        Ok(format_duration(&self.duration()?))
    }

    /// Work package id taken from the last segment of the link.
    pub fn work_package_id(&self) -> Option<u64> {
        self.links
            .work_package
            .href
            .rsplit('/')
            .next()
            .and_then(|id| id.parse().ok())
    }

    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.spent_on, "%Y-%m-%d").ok()
    }
}

/// Entries without the transferred tag.
pub fn not_transferred(entries: &[TimeEntry], transferred_tag: &str) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| !entry.has_tag(transferred_tag))
        .cloned()
        .collect()
}

pub fn without_work_type(entries: &[TimeEntry]) -> Vec<TimeEntry> {
    entries.iter().filter(|entry| !entry.has_work_type()).cloned().collect()
}

/// Entries that are not linked to a work package on the external task host.
pub fn without_link(entries: &[TimeEntry], external_task_link: &str) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| !entry.has_valid_link(external_task_link))
        .cloned()
        .collect()
}

/// Distinct work-type names used by the entries, sorted.
pub fn assigned_work_types(entries: &[TimeEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.tags.iter())
        .filter(|tag| tag.is_work_type)
        .map(|tag| tag.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
