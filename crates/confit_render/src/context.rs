//! Render context: the environment mapping visible to templates.

use std::collections::HashMap;

/// Environment variables available to `env` directives.
///
/// Built once per render by the caller and read-only afterwards. The
/// renderer never consults the ambient process environment, which keeps
/// rendering deterministic and testable; whatever precedence rules apply
/// (process env overlaid with task vars, say) are the caller's business.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    vars: HashMap<String, String>,
}

impl RenderContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a variable, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_and_get() {
        let ctx = RenderContext::from_pairs([("ENV_NAME", "dev"), ("REGION", "eu-west-1")]);
        assert_eq!(ctx.get("ENV_NAME"), Some("dev"));
        assert_eq!(ctx.get("MISSING"), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_set_overrides() {
        let mut ctx = RenderContext::from_pairs([("ENV_NAME", "dev")]);
        ctx.set("ENV_NAME", "prod");
        assert_eq!(ctx.get("ENV_NAME"), Some("prod"));
    }
}
