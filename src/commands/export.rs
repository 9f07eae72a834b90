//! Renders a template with data pulled from Tmetric and OpenProject.
//!
//! The template decides what to fetch through its functions, see
//! [`crate::libs::template`]. The result is printed to stdout.

use super::DateRangeArgs;
use crate::api::openproject::OpenProject;
use crate::api::tmetric::Tmetric;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::template::{render, ServiceSource, TemplateContext};
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    /// Value made available to the template as `arbitrary_string(i)`, can be repeated
    #[arg(short = 'a', long = "arbitraryString", required = true)]
    arbitrary_strings: Vec<String>,

    /// Template file to render
    #[arg(short, long)]
    template: PathBuf,
}

pub async fn cmd(export_args: ExportArgs, config: &Config) -> Result<()> {
    let context = TemplateContext {
        range: export_args.range.range()?,
        bill_number: None,
        arbitrary_strings: export_args.arbitrary_strings,
    };
    let output = render_file(&export_args.template, config, context).await?;
    print!("{output}");
    Ok(())
}

/// Reads `path` and renders it on behalf of the Tmetric token owner.
pub(crate) async fn render_file(path: &Path, config: &Config, context: TemplateContext) -> Result<String> {
    let source_text =
        fs::read_to_string(path).with_context(|| Message::TemplateReadFailed(path.display().to_string()))?;

    let tmetric = Tmetric::new(config.tmetric()?);
    let openproject = OpenProject::new(config.openproject()?);
    let user = tmetric.current_user().await?;
    let source = Arc::new(ServiceSource {
        tmetric,
        openproject,
        user,
    });

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(render(&name, &source_text, source, context)?)
}
