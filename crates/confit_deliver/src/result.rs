//! Delivery outcome record.

use std::path::PathBuf;

use serde::Serialize;

/// What a delivery did, surfaced to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    /// Whether the destination content changed.
    pub changed: bool,
    /// Path of the backup copy, when one was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    /// Line-based diff of prior vs. new content, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Checksum of the delivered content (blake3, hex).
    pub checksum: String,
}

impl DeliveryResult {
    /// Destination already matched; nothing was written.
    pub fn unchanged(checksum: impl Into<String>) -> Self {
        Self {
            changed: false,
            backup_path: None,
            diff: None,
            checksum: checksum.into(),
        }
    }

    /// Destination was (or, in check mode, would be) rewritten.
    pub fn changed(checksum: impl Into<String>) -> Self {
        Self {
            changed: true,
            backup_path: None,
            diff: None,
            checksum: checksum.into(),
        }
    }

    pub fn with_backup(mut self, path: PathBuf) -> Self {
        self.backup_path = Some(path);
        self
    }

    pub fn with_diff(mut self, diff: String) -> Self {
        self.diff = Some(diff);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_without_empty_fields() {
        let json = serde_json::to_value(DeliveryResult::unchanged("abc")).unwrap();
        assert_eq!(json["changed"], false);
        assert!(json.get("backup_path").is_none());
        assert!(json.get("diff").is_none());
    }
}
