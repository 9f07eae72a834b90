//! Interactive configuration wizard.
//!
//! Pre-fills the prompts with the values of the existing configuration file
//! and writes the answers back to it.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Print the resulting configuration path without asking anything
    #[arg(short, long)]
    path: bool,
}

/// Runs the wizard against `config_path`, or the default file.
pub fn cmd(init_args: InitArgs, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };

    if init_args.path {
        println!("{}", path.display());
        return Ok(());
    }

    Config::read_from(&path)?.init()?.save_to(&path)?;

    msg_success!(Message::ConfigSaved(path.display().to_string()));
    Ok(())
}
