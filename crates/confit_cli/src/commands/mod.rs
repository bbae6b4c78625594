//! CLI command definitions.
//!
//! Each subcommand drives the render and/or delivery pipeline; shared
//! argument bundles and the JSON result record live here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use confit_kv::KvConfig;
use confit_render::{RenderContext, TemplateSource};

pub mod apply;
pub mod deliver;
pub mod render;
pub mod task;

/// confit - render config files from Consul/Vault and deliver them safely
#[derive(Parser)]
#[command(name = "confit")]
#[command(version, about = "Render config files from Consul/Vault data and deliver them safely")]
#[command(long_about = r#"
confit renders a template against live Consul/Vault key-value data plus an
explicit environment mapping, then installs the result at a destination path
with atomic replace, optional backup, validation, check mode and diff output.

COMMANDS:
  render   → Render a template to stdout or a file (no delivery)
  apply    → Render a template and deliver it to a destination
  deliver  → Deliver an already-rendered file to a destination
  task     → Run an apply described by a YAML task file

EXIT CODES:
  0 - Success (including unchanged and skipped)
  1 - General error
  2 - Invalid arguments
  3 - Render error
  4 - Delivery error
  5 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template without delivering it
    Render(render::RenderArgs),

    /// Render a template and deliver the result
    Apply(apply::ApplyArgs),

    /// Deliver an already-rendered file
    Deliver(deliver::DeliverArgs),

    /// Run an apply described by a YAML task file
    Task(task::TaskArgs),
}

/// Template source: a file path or inline text, exactly one of the two.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Path to the template file
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Inline template text
    #[arg(long)]
    pub content: Option<String>,
}

impl SourceArgs {
    pub fn to_source(&self) -> TemplateSource {
        match (&self.src, &self.content) {
            (Some(path), _) => TemplateSource::File(path.clone()),
            (None, Some(text)) => TemplateSource::Inline(text.clone()),
            // clap's group constraint guarantees one of the two is set.
            (None, None) => unreachable!("clap enforces src/content"),
        }
    }
}

/// Consul/Vault connection parameters with environment fallbacks.
#[derive(Args, Debug, Clone)]
pub struct KvArgs {
    /// Consul server URL
    #[arg(long, env = "CONSUL_ADDR")]
    pub consul_addr: Option<String>,

    /// Consul authorization token
    #[arg(long, env = "CONSUL_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,

    /// Vault server URL
    #[arg(long, env = "VAULT_ADDR")]
    pub vault_addr: Option<String>,

    /// Vault authorization token
    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true)]
    pub vault_token: Option<String>,

    /// KV request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl KvArgs {
    pub fn to_config(&self) -> KvConfig {
        let mut config = KvConfig::new().timeout(Duration::from_secs(self.timeout_secs));
        if let Some(addr) = &self.consul_addr {
            config = config.consul_addr(addr);
        }
        if let Some(token) = &self.consul_token {
            config = config.consul_token(token);
        }
        if let Some(addr) = &self.vault_addr {
            config = config.vault_addr(addr);
        }
        if let Some(token) = &self.vault_token {
            config = config.vault_token(token);
        }
        config
    }
}

/// Delivery flags shared by `apply` and `deliver`.
#[derive(Args, Debug, Clone)]
pub struct DeliveryArgs {
    /// Back up an existing destination before overwriting it
    #[arg(long)]
    pub backup: bool,

    /// Validation command run against the staged file; must contain %s
    #[arg(long, value_name = "COMMAND")]
    pub validate: Option<String>,

    /// Report the would-be change without writing anything
    #[arg(long)]
    pub check: bool,

    /// Include a line-based diff in the result
    #[arg(long)]
    pub diff: bool,

    /// Permission bits for the destination (octal, or "preserve" with --src)
    #[arg(long)]
    pub mode: Option<String>,

    /// Numeric uid for the destination
    #[arg(long)]
    pub owner: Option<u32>,

    /// Numeric gid for the destination
    #[arg(long)]
    pub group: Option<u32>,

    /// Write even when the destination content already matches
    #[arg(long)]
    pub force: bool,
}

/// Semantic argument errors that clap cannot catch.
#[derive(Debug)]
pub struct ArgsError(pub String);

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ArgsError {}

/// Result record printed as JSON for the invoking orchestrator.
#[derive(Debug, Serialize)]
pub struct Report {
    pub changed: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Report {
    pub fn print(&self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Parse repeated `KEY=VALUE` pairs.
pub fn parse_env_pairs(pairs: &[String]) -> Result<Vec<(String, String)>, ArgsError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| ArgsError(format!("--env expects KEY=VALUE, got `{}`", pair)))
        })
        .collect()
}

/// Build the render context: process environment overlaid with task
/// variables, task variables winning.
pub fn build_context(overrides: &[(String, String)]) -> RenderContext {
    let mut ctx = RenderContext::from_pairs(std::env::vars());
    for (name, value) in overrides {
        ctx.set(name.clone(), value.clone());
    }
    ctx
}

/// Resolve a mode spec: octal digits, or `preserve` to copy the template
/// file's permission bits.
pub fn resolve_mode(spec: &str, src: Option<&Path>) -> Result<u32, ArgsError> {
    if spec == "preserve" {
        let src = src.ok_or_else(|| {
            ArgsError("--mode preserve requires a --src template file".to_string())
        })?;
        return preserve_mode(src);
    }

    u32::from_str_radix(spec, 8)
        .map_err(|_| ArgsError(format!("invalid mode `{}`: expected octal digits or `preserve`", spec)))
}

#[cfg(unix)]
fn preserve_mode(src: &Path) -> Result<u32, ArgsError> {
    use std::os::unix::fs::PermissionsExt;
    let meta = std::fs::metadata(src)
        .map_err(|e| ArgsError(format!("cannot stat {} for --mode preserve: {}", src.display(), e)))?;
    Ok(meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn preserve_mode(_src: &Path) -> Result<u32, ArgsError> {
    Err(ArgsError("--mode preserve is only supported on unix".to_string()))
}

/// Task-env overlay map used by the YAML task file.
pub type EnvMap = HashMap<String, String>;
