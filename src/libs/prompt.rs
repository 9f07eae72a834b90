//! Interactive questions asked while repairing Tmetric entries.
//!
//! The check workflow talks to the operator only through [`Prompter`], so
//! tests can replay scripted answers instead of reading the terminal.

use crate::api::openproject::WorkPackage;
use crate::api::tmetric::{Tag, TimeEntry};
use crate::libs::error::Result;
use crate::libs::messages::Message;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

pub trait Prompter {
    /// Index of the chosen work type, `None` to leave the entry alone.
    fn select_work_type(&self, entry: &TimeEntry, work_types: &[Tag]) -> Result<Option<usize>>;

    /// Work package id to link the entry to, `None` to leave it alone.
    fn work_package_id(&self, entry: &TimeEntry) -> Result<Option<u64>>;

    fn confirm_work_package(&self, entry: &TimeEntry, work_package: &WorkPackage) -> Result<bool>;
}

/// Asks on the terminal with `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select_work_type(&self, entry: &TimeEntry, work_types: &[Tag]) -> Result<Option<usize>> {
        let names: Vec<&str> = work_types.iter().map(|tag| tag.name.as_str()).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectWorkType(describe(entry)).to_string())
            .items(&names)
            .default(0)
            .interact_opt()?;
        Ok(selection)
    }

    fn work_package_id(&self, entry: &TimeEntry) -> Result<Option<u64>> {
        let input = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptWorkPackageId(describe(entry)).to_string())
            .allow_empty(true)
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                let input = input.trim().trim_start_matches('#');
                if input.is_empty() || input.parse::<u64>().is_ok() {
                    Ok(())
                } else {
                    Err("Invalid WP")
                }
            })
            .interact_text()?;

        let input = input.trim().trim_start_matches('#');
        Ok(input.parse().ok())
    }

    fn confirm_work_package(&self, _entry: &TimeEntry, work_package: &WorkPackage) -> Result<bool> {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmWorkPackage(work_package.id, work_package.subject.clone()).to_string())
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

/// One-line summary of an entry used in prompts.
pub fn describe(entry: &TimeEntry) -> String {
    format!(
        "'{}' ({}) {} - {}",
        entry.note, entry.project.name, entry.start_time, entry.end_time
    )
}
