//! `confit task` - run an apply described by a YAML task file.
//!
//! The task file carries the same fields as the `apply` flags, in the shape
//! an orchestrator would hand over:
//!
//! ```yaml
//! content: |
//!   port={{ key "app/port" }}
//! dest: /etc/app/app.conf
//! vault_addr: http://127.0.0.1:8200
//! env:
//!   ENV_NAME: dev
//! backup: true
//! diff: true
//! mode: "0640"
//! ```
//!
//! Addresses and tokens omitted from the file fall back to the
//! `CONSUL_ADDR`/`CONSUL_TOKEN`/`VAULT_ADDR`/`VAULT_TOKEN` environment
//! variables, like the flags do.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use tracing::info;

use confit_kv::KvConfig;
use confit_render::TemplateSource;

use super::apply::{self, ApplyRequest};
use super::{ArgsError, DeliveryArgs, EnvMap};

#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Path to the YAML task file
    pub file: PathBuf,

    /// Force check mode regardless of the task file
    #[arg(long)]
    pub check: bool,

    /// Force diff output regardless of the task file
    #[arg(long)]
    pub diff: bool,
}

/// On-disk task description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub src: Option<PathBuf>,
    pub content: Option<String>,
    pub dest: PathBuf,

    pub consul_addr: Option<String>,
    pub consul_token: Option<String>,
    pub vault_addr: Option<String>,
    pub vault_token: Option<String>,
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub env: EnvMap,

    #[serde(default)]
    pub backup: bool,
    pub validate: Option<String>,
    #[serde(default)]
    pub check: bool,
    #[serde(default)]
    pub diff: bool,
    pub mode: Option<String>,
    pub owner: Option<u32>,
    pub group: Option<u32>,
    #[serde(default)]
    pub force: bool,
}

impl TaskSpec {
    /// Validate the src/content pairing the same way `apply` flags do.
    fn source(&self) -> Result<TemplateSource, ArgsError> {
        match (&self.src, &self.content) {
            (Some(_), Some(_)) => Err(ArgsError(
                "ambiguous task: src and content are mutually exclusive".to_string(),
            )),
            (Some(path), None) => Ok(TemplateSource::File(path.clone())),
            (None, Some(text)) => Ok(TemplateSource::Inline(text.clone())),
            (None, None) => Err(ArgsError("task needs either src or content".to_string())),
        }
    }

    fn kv_config(&self) -> KvConfig {
        let mut config = KvConfig::new();
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        if let Some(addr) = fallback(&self.consul_addr, "CONSUL_ADDR") {
            config = config.consul_addr(addr);
        }
        if let Some(token) = fallback(&self.consul_token, "CONSUL_TOKEN") {
            config = config.consul_token(token);
        }
        if let Some(addr) = fallback(&self.vault_addr, "VAULT_ADDR") {
            config = config.vault_addr(addr);
        }
        if let Some(token) = fallback(&self.vault_token, "VAULT_TOKEN") {
            config = config.vault_token(token);
        }
        config
    }
}

fn fallback(explicit: &Option<String>, env_name: &str) -> Option<String> {
    explicit
        .clone()
        .or_else(|| std::env::var(env_name).ok().filter(|v| !v.is_empty()))
}

pub async fn execute(args: TaskArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)?;
    let spec: TaskSpec = serde_yaml::from_str(&text)?;

    info!("Running task from {:?}", args.file);

    let source = spec.source()?;
    let kv = spec.kv_config();
    let env_overrides: Vec<(String, String)> = spec.env.clone().into_iter().collect();

    let delivery = DeliveryArgs {
        backup: spec.backup,
        validate: spec.validate.clone(),
        check: spec.check || args.check,
        diff: spec.diff || args.diff,
        mode: spec.mode.clone(),
        owner: spec.owner,
        group: spec.group,
        force: spec.force,
    };

    let report = apply::run(ApplyRequest {
        source,
        dest: spec.dest.clone(),
        kv,
        env_overrides,
        delivery,
    })
    .await?;

    report.print()
}
