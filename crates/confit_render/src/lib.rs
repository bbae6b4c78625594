//! Template rendering for confit.
//!
//! Turns a [`TemplateSource`] plus a [`RenderContext`] into a
//! [`RenderedArtifact`] by resolving `key`/`secret`/`env` directives through
//! a [`confit_kv::KvResolver`]. Rendering is one-shot and deterministic:
//! same KV state, same template, same context, same bytes.

pub mod artifact;
pub mod context;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod source;

pub use artifact::RenderedArtifact;
pub use context::RenderContext;
pub use error::{RenderError, RenderResult};
pub use parser::{KvQuery, Segment, TemplateParser};
pub use renderer::Renderer;
pub use source::TemplateSource;
