use super::export::render_file;
use super::DateRangeArgs;
use crate::libs::config::Config;
use crate::libs::template::TemplateContext;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BillArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    /// Number of the bill, available to the template as `bill_number()`
    #[arg(short = 'b', long = "billNumber")]
    bill_number: String,

    /// Template file to render
    #[arg(short, long)]
    template: PathBuf,
}

pub async fn cmd(bill_args: BillArgs, config: &Config) -> Result<()> {
    let context = TemplateContext {
        range: bill_args.range.range()?,
        bill_number: Some(bill_args.bill_number),
        arbitrary_strings: Vec::new(),
    };
    let output = render_file(&bill_args.template, config, context).await?;
    print!("{output}");
    Ok(())
}
