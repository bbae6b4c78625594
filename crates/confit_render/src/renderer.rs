//! One-shot template rendering against the KV stores.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use confit_kv::KvResolver;

use crate::artifact::RenderedArtifact;
use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::parser::{KvQuery, Segment, TemplateParser};
use crate::source::TemplateSource;

/// Renderer that resolves template directives through a [`KvResolver`].
///
/// A render is one shot: every distinct query is resolved at most once and
/// there is no watch loop or retry policy. Callers that want retries wrap
/// the whole render, which is idempotent given stable KV state.
pub struct Renderer {
    resolver: Arc<dyn KvResolver>,
    parser: TemplateParser,
}

impl Renderer {
    pub fn new(resolver: Arc<dyn KvResolver>) -> Self {
        Self {
            resolver,
            parser: TemplateParser::new(),
        }
    }

    /// Render a template source into an artifact.
    pub async fn render(
        &self,
        source: &TemplateSource,
        ctx: &RenderContext,
    ) -> RenderResult<RenderedArtifact> {
        let text = source.read()?;
        let segments = self.parser.parse(&text)?;

        info!(
            "Rendering {} ({} segments)",
            source.describe(),
            segments.len()
        );

        // Duplicate queries are served from this cache so one render
        // observes a single consistent value per query.
        let mut cache: HashMap<KvQuery, String> = HashMap::new();
        let mut out = String::with_capacity(text.len());

        for segment in segments {
            match segment {
                Segment::Literal(literal) => out.push_str(&literal),
                Segment::Query(query) => {
                    if let Some(cached) = cache.get(&query) {
                        out.push_str(cached);
                        continue;
                    }
                    let value = self.resolve(&query, ctx).await?;
                    debug!("Resolved {}", query);
                    out.push_str(&value);
                    cache.insert(query, value);
                }
            }
        }

        Ok(RenderedArtifact::from(out))
    }

    /// Resolve a single query.
    async fn resolve(&self, query: &KvQuery, ctx: &RenderContext) -> RenderResult<String> {
        match query {
            KvQuery::ConsulKey(path) => Ok(self.resolver.consul_get(path).await?),
            KvQuery::VaultSecret { path, field } => {
                let document = self.resolver.vault_read(path).await?;
                secret_field(path, field, &document)
            }
            KvQuery::EnvVar(name) => ctx
                .get(name)
                .map(str::to_string)
                .ok_or_else(|| RenderError::MissingKey(format!("environment variable {}", name))),
        }
    }
}

/// Pull one field out of a secret document and format it as text.
fn secret_field(path: &str, field: &str, document: &Value) -> RenderResult<String> {
    let value = document
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RenderError::MissingKey(format!("field {} of vault secret {}", field, path)))?;

    Ok(match value {
        Value::String(s) => s.clone(),
        // Numbers and bools render bare; nested structures render as JSON.
        other => other.to_string(),
    })
}
