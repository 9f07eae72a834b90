//! Command-line interface of tmop.
//!
//! Every subcommand lives in its own module with an `Args` struct and an
//! async `cmd` function. Arguments shared by several commands (date range,
//! user) are flattened in from this module.

pub mod bill;
pub mod check;
pub mod copy;
pub mod diff;
pub mod export;
pub mod init;

use crate::api::openproject::{self, OpenProject};
use crate::api::tmetric::{self, Tmetric};
use crate::libs::config::Config;
use crate::libs::date_range::{parse_date, DateRange};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Copy time entries from Tmetric to OpenProject")]
    Copy(copy::CopyArgs),
    #[command(about = "Show the differences between Tmetric and OpenProject day by day")]
    Diff(diff::DiffArgs),
    #[command(about = "Check the data for completeness and fix it interactively", subcommand)]
    Check(check::CheckCommands),
    #[command(about = "Render a bill from a template")]
    Bill(bill::BillArgs),
    #[command(about = "Export data through a template")]
    Export(export::ExportArgs),
}

#[derive(Debug, Parser)]
#[command(name = "tmop", author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// Configuration file to use instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let config_path = self.config.as_deref();
        match self.command {
            Commands::Init(args) => init::cmd(args, config_path),
            Commands::Copy(args) => copy::cmd(args, &load_config(config_path)?).await,
            Commands::Diff(args) => diff::cmd(args, &load_config(config_path)?).await,
            Commands::Check(command) => check::cmd(command, &load_config(config_path)?).await,
            Commands::Bill(args) => bill::cmd(args, &load_config(config_path)?).await,
            Commands::Export(args) => export::cmd(args, &load_config(config_path)?).await,
        }
    }
}

/// `--start` and `--end`, shared by every data command.
#[derive(Debug, Clone, Args)]
pub struct DateRangeArgs {
    /// First day to include, YYYY-MM-DD [default: first day of the current month]
    #[arg(short, long, value_parser = parse_start)]
    pub start: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD [default: today]
    #[arg(short, long, value_parser = parse_end)]
    pub end: Option<NaiveDate>,
}

impl DateRangeArgs {
    pub fn range(&self) -> Result<DateRange> {
        let current_month = DateRange::current_month();
        let start = self.start.unwrap_or(current_month.start);
        let end = self.end.unwrap_or(current_month.end);
        Ok(DateRange::new(start, end)?)
    }
}

fn parse_start(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value, "start").map_err(|err| err.to_string())
}

fn parse_end(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value, "end").map_err(|err| err.to_string())
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        msg_debug!(Message::ConfigFileLoaded(path.display().to_string()));
    }
    Ok(Config::load(path)?)
}

/// The Tmetric user to act for: the token owner, or the member matching `name`.
pub(crate) async fn tmetric_user(tmetric: &Tmetric, name: Option<&str>) -> Result<tmetric::User> {
    let me = tmetric.current_user().await?;
    let user = match name {
        Some(name) => tmetric.find_user_by_name(&me, name).await?,
        None => me,
    };
    msg_debug!(Message::UsingTmetricUser(user.name.clone()));
    Ok(user)
}

/// The OpenProject principal matching `name`, if one was asked for.
pub(crate) async fn openproject_user(openproject: &OpenProject, name: Option<&str>) -> Result<Option<openproject::User>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let user = openproject.find_user_by_name(name).await?;
    msg_info!(Message::UsingOpenProjectUser(user.name.clone()));
    Ok(Some(user))
}
