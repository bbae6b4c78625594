//! `confit render` - render a template without delivering it.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use confit_kv::HttpResolver;
use confit_render::{RenderError, Renderer};

use super::{build_context, parse_env_pairs, KvArgs, SourceArgs};

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub kv: KvArgs,

    /// Task environment variables overlaid on the process environment
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Write the rendered artifact here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: RenderArgs) -> anyhow::Result<()> {
    let resolver = Arc::new(HttpResolver::new(&args.kv.to_config()).map_err(RenderError::from)?);
    let renderer = Renderer::new(resolver);
    let ctx = build_context(&parse_env_pairs(&args.env)?);

    let artifact = renderer.render(&args.source.to_source(), &ctx).await?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, artifact.as_bytes())?;
            info!("Wrote {} bytes to {:?}", artifact.len(), path);
        }
        None => {
            std::io::stdout().write_all(artifact.as_bytes())?;
        }
    }

    Ok(())
}
