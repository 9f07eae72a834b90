//! Display implementation for tmop messages.
//!
//! All user-facing text lives in this one match so wording stays consistent
//! across commands.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigModuleOpenProject => "OpenProject settings".to_string(),
            Message::ConfigModuleTmetric => "Tmetric settings".to_string(),
            Message::ConfigSaved(path) => format!("Configuration saved to {}", path),
            Message::ConfigFileLoaded(path) => format!("Using configuration file {}", path),

            // === USER MESSAGES ===
            Message::UsingTmetricUser(name) => format!("Tmetric user: {}", name),
            Message::UsingOpenProjectUser(name) => format!("OpenProject user: {}", name),

            // === CHECK MESSAGES ===
            Message::EntriesWithoutWorkType(count) => {
                format!("{} time entries do not have any work-type assigned", count)
            }
            Message::EntriesWithoutLink(count) => {
                format!("{} time entries are not linked to an OpenProject work-package", count)
            }
            Message::NoWorkTypesAvailable(project) => {
                format!("No work types can be assigned to entries of project '{}'", project)
            }
            Message::WorkTypeAssigned(note, work_type) => format!("Work type '{}' assigned to '{}'", work_type, note),
            Message::WorkPackageNotFound(id, error) => format!("Could not find WP {}: {}", id, error),
            Message::UpdatingEntry(note) => format!("updating t-metric entry '{}'", note),
            Message::WorkPackageLinked(note, id) => format!("'{}' linked to work package #{}", note, id),
            Message::EntrySkipped(note) => format!("Skipped '{}'", note),
            Message::TmetricDataValid => "All time entries have a work type and are linked to OpenProject".to_string(),
            Message::CheckFinished(work_types, links, skipped) => format!(
                "Check finished: {} work types assigned, {} links created, {} entries skipped",
                work_types, links, skipped
            ),

            // === COPY MESSAGES ===
            Message::CopyMissingWorkType => {
                "Some time-entries do not have any work-type assigned, run the 'check tmetric' command to fix it".to_string()
            }
            Message::CopyMissingLink => {
                "Some time-entries are not linked to an OpenProject work-package, run the 'check tmetric' command to fix it"
                    .to_string()
            }
            Message::NothingToCopy => "No time entries to copy".to_string(),
            Message::CopyingEntries(count) => format!("Copying {} time entries to OpenProject", count),
            Message::EntryTransferred(note) => format!("transferred '{}'", note),
            Message::EntriesCopied(count) => format!("{} time entries copied to OpenProject", count),
            Message::AlreadyTransferred(count) => format!("{} time entries were already transferred", count),

            // === DIFF MESSAGES ===
            Message::DiffHeader(range) => format!("Tmetric vs. OpenProject, {}", range),

            // === TEMPLATE MESSAGES ===
            Message::TemplateReadFailed(path) => format!("could not read template file '{}'", path),

            // === PROMPTS ===
            Message::PromptOpenProjectUrl => "Enter the OpenProject URL".to_string(),
            Message::PromptOpenProjectToken => "Enter your OpenProject API token".to_string(),
            Message::PromptTmetricToken => "Enter your Tmetric API token".to_string(),
            Message::PromptTmetricClientId => "Enter the id of the Tmetric client to bill".to_string(),
            Message::PromptTmetricDummyProjectId => "Enter the id of the Tmetric project for dummy entries".to_string(),
            Message::PromptSelectWorkType(entry) => format!("Work type for {}", entry),
            Message::PromptWorkPackageId(entry) => format!("OpenProject work package for {} (empty to skip)", entry),
            Message::ConfirmWorkPackage(id, subject) => format!("WP: '{}'. Subject: '{}'. Update?", id, subject),
        };

        write!(f, "{}", text)
    }
}
