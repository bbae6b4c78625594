//! `confit apply` - render a template and deliver it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::info;

use confit_deliver::{DeliveryManager, DeliveryOptions};
use confit_kv::{HttpResolver, KvConfig};
use confit_render::{RenderError, Renderer, TemplateSource};

use super::{
    build_context, parse_env_pairs, resolve_mode, ArgsError, DeliveryArgs, KvArgs, Report,
    SourceArgs,
};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Destination path for the rendered file
    #[arg(long)]
    pub dest: PathBuf,

    #[command(flatten)]
    pub kv: KvArgs,

    /// Task environment variables overlaid on the process environment
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

pub async fn execute(args: ApplyArgs) -> anyhow::Result<()> {
    let request = ApplyRequest {
        source: args.source.to_source(),
        dest: args.dest,
        kv: args.kv.to_config(),
        env_overrides: parse_env_pairs(&args.env)?,
        delivery: args.delivery,
    };

    let report = run(request).await?;
    report.print()
}

/// One render-and-deliver pass; also the backend of `confit task`.
pub struct ApplyRequest {
    pub source: TemplateSource,
    pub dest: PathBuf,
    pub kv: KvConfig,
    pub env_overrides: Vec<(String, String)>,
    pub delivery: DeliveryArgs,
}

pub async fn run(request: ApplyRequest) -> anyhow::Result<Report> {
    let src_path = match &request.source {
        TemplateSource::File(path) => Some(path.clone()),
        TemplateSource::Inline(_) => None,
    };
    let options = delivery_options(&request.delivery, src_path.as_deref())?;

    let resolver = Arc::new(HttpResolver::new(&request.kv).map_err(RenderError::from)?);
    let renderer = Renderer::new(resolver);
    let ctx = build_context(&request.env_overrides);

    let artifact = renderer.render(&request.source, &ctx).await?;

    if artifact.is_empty() {
        info!("Template rendered to an empty artifact, skipping delivery");
        return Ok(Report {
            changed: false,
            skipped: true,
            dest: Some(request.dest.display().to_string()),
            backup_path: None,
            diff: None,
            checksum: None,
            msg: Some("Template rendered to empty artifact, skipping delivery".to_string()),
        });
    }

    let result = DeliveryManager::new().deliver(artifact.as_bytes(), &request.dest, &options)?;

    Ok(Report {
        changed: result.changed,
        skipped: false,
        dest: Some(request.dest.display().to_string()),
        backup_path: result.backup_path,
        diff: result.diff,
        checksum: Some(result.checksum),
        msg: None,
    })
}

/// Map CLI delivery flags onto delivery options.
pub fn delivery_options(
    delivery: &DeliveryArgs,
    src: Option<&Path>,
) -> Result<DeliveryOptions, ArgsError> {
    let mut options = DeliveryOptions::new()
        .backup(delivery.backup)
        .check_mode(delivery.check)
        .diff_mode(delivery.diff)
        .checksum_compare(!delivery.force);

    if let Some(command) = &delivery.validate {
        options = options.validate(command);
    }
    if let Some(spec) = &delivery.mode {
        options = options.mode(resolve_mode(spec, src)?);
    }
    if let Some(uid) = delivery.owner {
        options = options.owner(uid);
    }
    if let Some(gid) = delivery.group {
        options = options.group(gid);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> DeliveryArgs {
        DeliveryArgs {
            backup: false,
            validate: None,
            check: false,
            diff: false,
            mode: None,
            owner: None,
            group: None,
            force: false,
        }
    }

    #[test]
    fn test_force_disables_checksum_compare() {
        let mut delivery = flags();
        delivery.force = true;
        let options = delivery_options(&delivery, None).unwrap();
        assert!(!options.checksum_compare);
    }

    #[test]
    fn test_mode_preserve_requires_src() {
        let mut delivery = flags();
        delivery.mode = Some("preserve".to_string());
        assert!(delivery_options(&delivery, None).is_err());
    }

    #[test]
    fn test_octal_mode() {
        let mut delivery = flags();
        delivery.mode = Some("0640".to_string());
        let options = delivery_options(&delivery, None).unwrap();
        assert_eq!(options.mode, Some(0o640));
    }
}
