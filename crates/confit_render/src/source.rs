//! Template source handling.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::RenderResult;

/// Where the template text comes from.
///
/// Immutable once read: the renderer reads the source a single time per
/// render and never watches it for changes.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Template stored in a file.
    File(PathBuf),
    /// Template supplied inline.
    Inline(String),
}

impl TemplateSource {
    /// Read the template text.
    pub fn read(&self) -> RenderResult<String> {
        match self {
            Self::File(path) => {
                debug!("Reading template from {:?}", path);
                Ok(fs::read_to_string(path)?)
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    /// A short description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }
}
