//! `check tmetric`: finds Tmetric entries that cannot be copied yet and
//! fixes them interactively.

use super::{tmetric_user, DateRangeArgs};
use crate::api::openproject::OpenProject;
use crate::api::tmetric::Tmetric;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::prompt::TerminalPrompter;
use crate::libs::sync::check_tmetric;
use crate::msg_info;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum CheckCommands {
    #[command(about = "Check that entries have a work type and are linked to a work package")]
    Tmetric(CheckTmetricArgs),
}

#[derive(Debug, Args)]
pub struct CheckTmetricArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    /// Check the entries of another user, matched by name
    #[arg(short, long)]
    user: Option<String>,
}

pub async fn cmd(command: CheckCommands, config: &Config) -> Result<()> {
    match command {
        CheckCommands::Tmetric(args) => tmetric(args, config).await,
    }
}

async fn tmetric(args: CheckTmetricArgs, config: &Config) -> Result<()> {
    let range = args.range.range()?;
    let tmetric_config = config.tmetric()?;
    let tmetric = Tmetric::new(tmetric_config);
    let openproject = OpenProject::new(config.openproject()?);
    let user = tmetric_user(&tmetric, args.user.as_deref()).await?;

    let summary = check_tmetric(&tmetric, &openproject, &TerminalPrompter, tmetric_config, &user, &range).await?;

    if summary.work_types_assigned + summary.links_created + summary.skipped > 0 {
        msg_info!(Message::CheckFinished(
            summary.work_types_assigned,
            summary.links_created,
            summary.skipped
        ));
    }
    Ok(())
}
