//! The check and copy workflows between Tmetric and OpenProject.
//!
//! Both workflows start from the live Tmetric entries of one user in a date
//! range and ignore entries that already carry the transferred tag. Nothing
//! is cached between runs; a second run derives its state from the services
//! again, so an interrupted copy can simply be repeated.
//!
//! ## Check
//!
//! 1. Entries without a work-type tag: the operator picks one of the work
//!    types allowed for the entry's project and the entry is updated.
//! 2. Entries without a valid work package link: the operator enters a work
//!    package id, which is looked up in OpenProject and confirmed. The link is
//!    created through a dummy Tmetric entry whose task is copied onto the real
//!    entry before the dummy is deleted.
//!
//! ## Copy
//!
//! Refuses to run while any entry lacks a work type or a link. Every entry is
//! then booked in OpenProject and tagged as transferred in Tmetric. The first
//! failure stops the run.

use crate::api::openproject::{self, WorkPackage};
use crate::api::tmetric::{TimeEntry, User};
use crate::api::{OpenProjectApi, TmetricApi};
use crate::libs::config::TmetricConfig;
use crate::libs::date_range::DateRange;
use crate::libs::error::{Error, Result};
use crate::libs::messages::Message;
use crate::libs::prompt::{describe, Prompter};
use crate::libs::time_entry::{not_transferred, without_link, without_work_type};
use crate::{msg_error, msg_info, msg_success, msg_warning};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    /// Entries in range that are not transferred yet.
    pub checked: usize,
    pub work_types_assigned: usize,
    pub links_created: usize,
    pub skipped: usize,
}

/// Interactively repairs entries missing a work type or a work package link.
pub async fn check_tmetric<T, O, P>(
    tmetric: &T,
    openproject: &O,
    prompter: &P,
    config: &TmetricConfig,
    user: &User,
    range: &DateRange,
) -> Result<CheckSummary>
where
    T: TmetricApi,
    O: OpenProjectApi,
    P: Prompter,
{
    let entries = tmetric.time_entries(user, range).await?;
    let mut entries = not_transferred(&entries, &config.transferred_tag);
    let mut summary = CheckSummary {
        checked: entries.len(),
        ..Default::default()
    };

    let missing_work_type = without_work_type(&entries).len();
    if missing_work_type > 0 {
        msg_warning!(Message::EntriesWithoutWorkType(missing_work_type));
    }
    for entry in entries.iter_mut().filter(|entry| !entry.has_work_type()) {
        if assign_work_type(tmetric, prompter, user, entry).await? {
            summary.work_types_assigned += 1;
        } else {
            summary.skipped += 1;
        }
    }

    let missing_link = without_link(&entries, &config.external_task_link).len();
    if missing_link > 0 {
        msg_warning!(Message::EntriesWithoutLink(missing_link));
    }
    for entry in entries
        .iter_mut()
        .filter(|entry| !entry.has_valid_link(&config.external_task_link))
    {
        if link_work_package(tmetric, openproject, prompter, user, entry).await? {
            summary.links_created += 1;
        } else {
            summary.skipped += 1;
        }
    }

    if missing_work_type == 0 && missing_link == 0 {
        msg_success!(Message::TmetricDataValid);
    }

    Ok(summary)
}

async fn assign_work_type<T: TmetricApi, P: Prompter>(
    tmetric: &T,
    prompter: &P,
    user: &User,
    entry: &mut TimeEntry,
) -> Result<bool> {
    let work_types = tmetric.possible_work_types(user, entry).await?;
    if work_types.is_empty() {
        msg_warning!(Message::NoWorkTypesAvailable(entry.project.name.clone()));
        return Ok(false);
    }

    let Some(selected) = prompter.select_work_type(entry, &work_types)? else {
        msg_info!(Message::EntrySkipped(entry.note.clone()));
        return Ok(false);
    };
    let work_type = work_types
        .get(selected)
        .cloned()
        .ok_or_else(|| Error::validation(format!("no work type at position {selected}")))?;

    entry.tags.push(work_type.clone());
    tmetric.update_time_entry(user, entry).await?;
    msg_success!(Message::WorkTypeAssigned(entry.note.clone(), work_type.name));
    Ok(true)
}

async fn link_work_package<T, O, P>(
    tmetric: &T,
    openproject: &O,
    prompter: &P,
    user: &User,
    entry: &mut TimeEntry,
) -> Result<bool>
where
    T: TmetricApi,
    O: OpenProjectApi,
    P: Prompter,
{
    let work_package = loop {
        let Some(id) = prompter.work_package_id(entry)? else {
            msg_info!(Message::EntrySkipped(entry.note.clone()));
            return Ok(false);
        };
        match openproject.work_package(id).await {
            Ok(work_package) => break work_package,
            Err(err) => msg_error!(Message::WorkPackageNotFound(id, err.to_string())),
        }
    };

    if !prompter.confirm_work_package(entry, &work_package)? {
        msg_info!(Message::EntrySkipped(entry.note.clone()));
        return Ok(false);
    }

    msg_info!(Message::UpdatingEntry(entry.note.clone()));
    attach_work_package(tmetric, user, entry, &work_package).await?;
    msg_success!(Message::WorkPackageLinked(entry.note.clone(), work_package.id));
    Ok(true)
}

/// Links the entry to the work package through a dummy entry.
pub async fn attach_work_package<T: TmetricApi>(
    tmetric: &T,
    user: &User,
    entry: &mut TimeEntry,
    work_package: &WorkPackage,
) -> Result<()> {
    let dummy = tmetric.create_dummy_time_entry(user, work_package).await?;
    entry.task = dummy.task.clone();
    tmetric.delete_time_entry(user, &dummy).await?;
    tmetric.update_time_entry(user, entry).await
}

/// Entries of a copy run, validated and ready to be booked.
#[derive(Debug, Default, Clone)]
pub struct PendingCopies {
    pub entries: Vec<TimeEntry>,
    pub already_transferred: usize,
}

impl PendingCopies {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Collects the entries of `range` that still have to be copied.
///
/// Fails when any of them lacks a work type or a work package link.
pub async fn pending_copies<T: TmetricApi>(
    tmetric: &T,
    config: &TmetricConfig,
    user: &User,
    range: &DateRange,
) -> Result<PendingCopies> {
    let all_entries = tmetric.time_entries(user, range).await?;
    let entries = not_transferred(&all_entries, &config.transferred_tag);

    if !without_work_type(&entries).is_empty() {
        return Err(Error::validation(Message::CopyMissingWorkType.to_string()));
    }
    if !without_link(&entries, &config.external_task_link).is_empty() {
        return Err(Error::validation(Message::CopyMissingLink.to_string()));
    }

    Ok(PendingCopies {
        already_transferred: all_entries.len() - entries.len(),
        entries,
    })
}

/// Books every pending entry in OpenProject and tags it as transferred.
///
/// `op_user` books on behalf of another OpenProject user. `on_transferred`
/// is called after each entry has been booked and tagged. Returns the number
/// of copied entries.
pub async fn copy_entries<T, O, F>(
    tmetric: &T,
    openproject: &O,
    config: &TmetricConfig,
    user: &User,
    op_user: Option<&openproject::User>,
    pending: PendingCopies,
    mut on_transferred: F,
) -> Result<usize>
where
    T: TmetricApi,
    O: OpenProjectApi,
    F: FnMut(&TimeEntry),
{
    let mut copied = 0;

    for mut entry in pending.entries {
        let entry_context = || {
            format!(
                "Error with time entry '{}' in project '{}'",
                entry.note, entry.project.name
            )
        };
        let work_package_id = entry.issue_id().map_err(|err| Error::entry(entry_context(), err))?;
        let work_type = entry.work_type().map_err(|err| Error::entry(entry_context(), err))?;
        let activity = openproject
            .activity_for_work_type(work_package_id, work_type)
            .await
            .map_err(|err| Error::entry(entry_context(), err))?;

        let booking = entry.to_openproject(&activity, op_user).map_err(|err| {
            Error::entry(
                format!(
                    "could not convert time entry '{}' in project '{}' started at '{}' from tmetric to OpenProject",
                    entry.note, entry.project.name, entry.start_time
                ),
                err,
            )
        })?;

        openproject.save_time_entry(&booking).await.map_err(|err| {
            Error::entry(
                format!(
                    "could not save time entry '{}' for work package '{}' spend on '{}' in OpenProject",
                    booking.comment.raw, work_package_id, booking.spent_on
                ),
                err,
            )
        })?;

        entry.tag_as_transferred(&config.transferred_tag);
        tmetric
            .update_time_entry(user, &entry)
            .await
            .map_err(|err| Error::entry("could not tag tmetric entry as being transferred to openproject", err))?;

        tracing::debug!(entry = %describe(&entry), work_package_id, "time entry transferred");
        copied += 1;
        on_transferred(&entry);
    }

    Ok(copied)
}
