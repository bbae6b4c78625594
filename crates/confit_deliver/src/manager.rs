//! Delivery state machine.
//!
//! Stage, compare, validate, back up, commit, diff. Any failure before the
//! commit leaves the destination byte-for-byte unchanged; the commit itself
//! is an atomic rename of a staged file in the destination's directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::diff::line_diff;
use crate::error::{DeliverError, DeliverResult};
use crate::options::DeliveryOptions;
use crate::result::DeliveryResult;

/// Installs rendered content at a destination path.
#[derive(Debug, Default)]
pub struct DeliveryManager;

impl DeliveryManager {
    pub fn new() -> Self {
        Self
    }

    /// Deliver `content` to `dest` under the given options.
    ///
    /// With checksum comparison disabled the content is always rewritten and
    /// reported as changed, even when it happens to match.
    pub fn deliver(
        &self,
        content: &[u8],
        dest: &Path,
        options: &DeliveryOptions,
    ) -> DeliverResult<DeliveryResult> {
        let checksum = blake3::hash(content).to_hex().to_string();

        if let Some(command) = &options.validate {
            check_validate_command(command)?;
        }

        let prior = read_prior(dest)?;
        let prior_meta = fs::metadata(dest).ok();

        // Stage into the destination directory so the final rename cannot
        // cross filesystems.
        let dest_dir = parent_dir(dest);
        let mut staged =
            NamedTempFile::new_in(&dest_dir).map_err(|e| DeliverError::from_io(&dest_dir, e))?;
        staged
            .write_all(content)
            .map_err(|e| DeliverError::from_io(staged.path(), e))?;
        staged
            .flush()
            .map_err(|e| DeliverError::from_io(staged.path(), e))?;
        debug!("Staged {} bytes at {:?}", content.len(), staged.path());

        // Compare
        if options.checksum_compare {
            if let Some(prior) = &prior {
                if blake3::hash(prior) == blake3::hash(content) {
                    debug!("Destination {:?} already matches, nothing to do", dest);
                    return Ok(DeliveryResult::unchanged(checksum));
                }
            }
        }

        // Validate
        if let Some(command) = &options.validate {
            run_validation(command, staged.path())?;
        }

        let diff = options
            .diff_mode
            .then(|| build_diff(prior.as_deref(), content, dest));

        // Check-mode short-circuit: report, discard the staged file, touch
        // nothing.
        if options.check_mode {
            info!("Check mode: would replace {:?}", dest);
            let mut result = DeliveryResult::changed(checksum);
            if let Some(diff) = diff {
                result = result.with_diff(diff);
            }
            return Ok(result);
        }

        // Backup, only when there is an existing file with different content.
        let backup_path = if options.backup && prior.as_deref().is_some_and(|p| p != content) {
            Some(backup(dest)?)
        } else {
            None
        };

        // Commit
        apply_metadata(staged.path(), prior_meta.as_ref(), options)?;
        staged
            .persist(dest)
            .map_err(|e| DeliverError::CommitFailure {
                dest: dest.to_path_buf(),
                message: e.error.to_string(),
            })?;
        info!("Delivered {} bytes to {:?}", content.len(), dest);

        let mut result = DeliveryResult::changed(checksum);
        if let Some(path) = backup_path {
            result = result.with_backup(path);
        }
        if let Some(diff) = diff {
            result = result.with_diff(diff);
        }
        Ok(result)
    }
}

/// Read the destination's current content, if it exists.
fn read_prior(dest: &Path) -> DeliverResult<Option<Vec<u8>>> {
    match fs::read(dest) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DeliverError::from_io(dest, e)),
    }
}

fn parent_dir(dest: &Path) -> PathBuf {
    match dest.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}

/// Reject validate commands without a staged-path placeholder before any
/// filesystem work happens.
fn check_validate_command(command: &str) -> DeliverResult<()> {
    if command.split_whitespace().next().is_none() {
        return Err(DeliverError::ValidationFailed {
            command: command.to_string(),
            detail: "empty command".to_string(),
        });
    }
    if !command.contains("%s") {
        return Err(DeliverError::ValidationFailed {
            command: command.to_string(),
            detail: "command must contain a %s placeholder for the staged path".to_string(),
        });
    }
    Ok(())
}

/// Run the validation command against the staged file.
fn run_validation(command: &str, staged: &Path) -> DeliverResult<()> {
    let staged_path = staged.to_string_lossy();
    let argv: Vec<String> = command
        .split_whitespace()
        .map(|token| token.replace("%s", staged_path.as_ref()))
        .collect();

    debug!("Validating staged content: {:?}", argv);
    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .output()
        .map_err(|e| DeliverError::ValidationFailed {
            command: command.to_string(),
            detail: format!("failed to execute: {}", e),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(DeliverError::ValidationFailed {
            command: command.to_string(),
            detail: format!("exit status {}: {}", output.status, stderr.trim()),
        })
    }
}

/// Copy the existing destination aside before overwriting it.
fn backup(dest: &Path) -> DeliverResult<PathBuf> {
    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DeliverError::BackupFailed(format!("{:?} has no file name", dest)))?;
    let backup_path = dest.with_file_name(format!("{}.{}~", name, stamp));

    fs::copy(dest, &backup_path)
        .map_err(|e| DeliverError::BackupFailed(format!("copy to {:?}: {}", backup_path, e)))?;
    info!("Backed up {:?} to {:?}", dest, backup_path);
    Ok(backup_path)
}

/// Apply permission and ownership metadata to the staged file before the
/// rename makes it visible.
#[cfg(unix)]
fn apply_metadata(
    staged: &Path,
    prior_meta: Option<&fs::Metadata>,
    options: &DeliveryOptions,
) -> DeliverResult<()> {
    use std::os::unix::fs::PermissionsExt;

    // Explicit mode wins; an existing destination keeps its bits; a new
    // file gets a conventional default instead of the 0600 staging mode.
    let mode = options
        .mode
        .or_else(|| prior_meta.map(|m| m.permissions().mode() & 0o7777))
        .unwrap_or(0o644);
    fs::set_permissions(staged, fs::Permissions::from_mode(mode))
        .map_err(|e| DeliverError::from_io(staged, e))?;

    if options.owner.is_some() || options.group.is_some() {
        std::os::unix::fs::chown(staged, options.owner, options.group)
            .map_err(|e| DeliverError::from_io(staged, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_metadata(
    _staged: &Path,
    _prior_meta: Option<&fs::Metadata>,
    _options: &DeliveryOptions,
) -> DeliverResult<()> {
    Ok(())
}

/// Build the diff text, degrading gracefully for non-UTF-8 content.
fn build_diff(prior: Option<&[u8]>, content: &[u8], dest: &Path) -> String {
    let before = std::str::from_utf8(prior.unwrap_or_default());
    let after = std::str::from_utf8(content);
    match (before, after) {
        (Ok(before), Ok(after)) => line_diff(before, after, &dest.display().to_string()),
        _ => format!("--- {} (binary content differs)\n", dest.display()),
    }
}
