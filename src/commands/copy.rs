//! Copies time entries from Tmetric to OpenProject.
//!
//! Refuses to run while entries lack a work type or a work package link;
//! `check tmetric` fixes those. Copied entries get the transferred tag, so
//! running the command again only picks up what is left.

use super::{openproject_user, tmetric_user, DateRangeArgs};
use crate::api::openproject::OpenProject;
use crate::api::tmetric::Tmetric;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::sync::{copy_entries, pending_copies};
use crate::{msg_info, msg_success};
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Args)]
pub struct CopyArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    /// Copy the entries of another user, matched by name
    #[arg(short, long)]
    user: Option<String>,
}

pub async fn cmd(copy_args: CopyArgs, config: &Config) -> Result<()> {
    let range = copy_args.range.range()?;
    let tmetric_config = config.tmetric()?;
    let tmetric = Tmetric::new(tmetric_config);
    let openproject = OpenProject::new(config.openproject()?);

    let user = tmetric_user(&tmetric, copy_args.user.as_deref()).await?;
    let op_user = openproject_user(&openproject, copy_args.user.as_deref()).await?;

    let pending = pending_copies(&tmetric, tmetric_config, &user, &range).await?;
    if pending.already_transferred > 0 {
        msg_info!(Message::AlreadyTransferred(pending.already_transferred));
    }
    if pending.is_empty() {
        msg_info!(Message::NothingToCopy);
        return Ok(());
    }

    msg_info!(Message::CopyingEntries(pending.len()));
    let indicator = ProgressBar::new(pending.len() as u64);
    indicator.set_style(
        ProgressStyle::with_template("{msg}\n[{elapsed_precise}] [{wide_bar:.cyan/blue}] [{pos}/{len}]")
            .context("invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let result = copy_entries(&tmetric, &openproject, tmetric_config, &user, op_user.as_ref(), pending, |entry| {
        indicator.set_message(Message::EntryTransferred(entry.note.clone()).to_string());
        indicator.inc(1);
    })
    .await;
    indicator.finish();

    let copied = result.context("copying to OpenProject stopped")?;
    msg_success!(Message::EntriesCopied(copied));
    Ok(())
}
