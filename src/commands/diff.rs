use super::{openproject_user, tmetric_user, DateRangeArgs};
use crate::api::openproject::OpenProject;
use crate::api::tmetric::Tmetric;
use crate::api::TmetricApi;
use crate::libs::config::Config;
use crate::libs::diff::Diff;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    /// Compare the entries of another user, matched by name
    #[arg(short, long)]
    user: Option<String>,
}

pub async fn cmd(diff_args: DiffArgs, config: &Config) -> Result<()> {
    let range = diff_args.range.range()?;
    let tmetric = Tmetric::new(config.tmetric()?);
    let openproject = OpenProject::new(config.openproject()?);

    let user = tmetric_user(&tmetric, diff_args.user.as_deref()).await?;
    let op_user = openproject_user(&openproject, diff_args.user.as_deref()).await?;

    let tmetric_entries = tmetric.time_entries(&user, &range).await?;
    let openproject_entries = openproject.time_entries(op_user.as_ref(), &range, &[]).await?;

    msg_print!(Message::DiffHeader(range.to_string()));
    View::diff(&Diff::build(&range, &tmetric_entries, &openproject_entries));
    Ok(())
}
