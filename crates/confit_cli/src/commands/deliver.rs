//! `confit deliver` - deliver an already-rendered file.

use std::path::PathBuf;

use clap::Args;

use confit_deliver::DeliveryManager;

use super::{apply::delivery_options, DeliveryArgs, Report};

#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Already-rendered source file
    #[arg(long)]
    pub src: PathBuf,

    /// Destination path
    #[arg(long)]
    pub dest: PathBuf,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

pub async fn execute(args: DeliverArgs) -> anyhow::Result<()> {
    let options = delivery_options(&args.delivery, Some(&args.src))?;
    let content = std::fs::read(&args.src)?;

    let result = DeliveryManager::new().deliver(&content, &args.dest, &options)?;

    Report {
        changed: result.changed,
        skipped: false,
        dest: Some(args.dest.display().to_string()),
        backup_path: result.backup_path,
        diff: result.diff,
        checksum: Some(result.checksum),
        msg: None,
    }
    .print()
}
