//! Template grammar and parser.
//!
//! Directives are `{{ ... }}` blocks:
//!
//! - `{{ key "path/to/key" }}` resolves a Consul KV path
//! - `{{ secret "secret/data/app" "field" }}` resolves one field of a Vault secret
//! - `{{ env "NAME" }}` substitutes a variable from the render context
//!
//! Everything outside directives passes through byte-for-byte. Syntax errors
//! carry the byte offset of the offending directive.

use regex::Regex;

use crate::error::{RenderError, RenderResult};

/// A directive referencing a Consul key, a Vault secret field, or an
/// environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KvQuery {
    ConsulKey(String),
    VaultSecret { path: String, field: String },
    EnvVar(String),
}

impl std::fmt::Display for KvQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConsulKey(path) => write!(f, "key \"{}\"", path),
            Self::VaultSecret { path, field } => write!(f, "secret \"{}\" \"{}\"", path, field),
            Self::EnvVar(name) => write!(f, "env \"{}\"", name),
        }
    }
}

/// A parsed template piece: literal text or a query to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Query(KvQuery),
}

/// Parser for the confit template grammar.
pub struct TemplateParser {
    directive: Regex,
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateParser {
    pub fn new() -> Self {
        Self {
            // word plus one or two quoted arguments
            directive: Regex::new(r#"^\s*([a-z]+)\s+"([^"]*)"(?:\s+"([^"]*)")?\s*$"#).unwrap(),
        }
    }

    /// Parse template text into segments.
    pub fn parse(&self, text: &str) -> RenderResult<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut rest = text;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }

            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or(RenderError::TemplateSyntaxError {
                offset: offset + open,
                message: "unterminated directive: missing closing }}".to_string(),
            })?;

            let inner = &after_open[..close];
            let query = self.parse_directive(inner, offset + open)?;
            segments.push(Segment::Query(query));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(segments)
    }

    /// Parse the inside of one `{{ ... }}` block.
    fn parse_directive(&self, inner: &str, offset: usize) -> RenderResult<KvQuery> {
        let caps = self
            .directive
            .captures(inner)
            .ok_or_else(|| RenderError::TemplateSyntaxError {
                offset,
                message: format!("malformed directive `{}`", inner.trim()),
            })?;

        let word = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let first = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let second = caps.get(3).map(|m| m.as_str());

        if first.is_empty() {
            return Err(RenderError::TemplateSyntaxError {
                offset,
                message: format!("{} directive has an empty argument", word),
            });
        }

        match (word, second) {
            ("key", None) => Ok(KvQuery::ConsulKey(first.to_string())),
            ("key", Some(_)) => Err(RenderError::TemplateSyntaxError {
                offset,
                message: "key takes exactly one argument".to_string(),
            }),
            ("env", None) => Ok(KvQuery::EnvVar(first.to_string())),
            ("env", Some(_)) => Err(RenderError::TemplateSyntaxError {
                offset,
                message: "env takes exactly one argument".to_string(),
            }),
            ("secret", Some(field)) if !field.is_empty() => Ok(KvQuery::VaultSecret {
                path: first.to_string(),
                field: field.to_string(),
            }),
            ("secret", _) => Err(RenderError::TemplateSyntaxError {
                offset,
                message: "secret takes a path and a field".to_string(),
            }),
            _ => Err(RenderError::TemplateSyntaxError {
                offset,
                message: format!("unknown directive `{}`", word),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> RenderResult<Vec<Segment>> {
        TemplateParser::new().parse(text)
    }

    #[test]
    fn test_literal_only() {
        let segments = parse("plain text, no directives").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Literal("plain text, no directives".to_string())]
        );
    }

    #[test]
    fn test_consul_key() {
        let segments = parse(r#"port={{ key "app/port" }}"#).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("port=".to_string()),
                Segment::Query(KvQuery::ConsulKey("app/port".to_string())),
            ]
        );
    }

    #[test]
    fn test_vault_secret_and_env() {
        let segments = parse(r#"{{ secret "secret/data/app" "password" }}@{{ env "ENV_NAME" }}"#).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Query(KvQuery::VaultSecret {
                    path: "secret/data/app".to_string(),
                    field: "password".to_string(),
                }),
                Segment::Literal("@".to_string()),
                Segment::Query(KvQuery::EnvVar("ENV_NAME".to_string())),
            ]
        );
    }

    #[test]
    fn test_whitespace_insensitive() {
        let segments = parse(r#"{{key "a"}}{{   key   "b"   }}"#).unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_unterminated_directive() {
        let err = parse(r#"ok {{ key "app/port" "#).unwrap_err();
        match err {
            RenderError::TemplateSyntaxError { offset, message } => {
                assert_eq!(offset, 3);
                assert!(message.contains("unterminated"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse(r#"{{ file "x" }}"#).unwrap_err();
        match err {
            RenderError::TemplateSyntaxError { message, .. } => {
                assert!(message.contains("unknown directive"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_arity() {
        assert!(parse(r#"{{ key "a" "b" }}"#).is_err());
        assert!(parse(r#"{{ secret "only-path" }}"#).is_err());
        assert!(parse(r#"{{ env }}"#).is_err());
    }

    #[test]
    fn test_syntax_error_offset_points_at_directive() {
        let text = r#"line one
{{ bogus }}"#;
        let err = parse(text).unwrap_err();
        match err {
            RenderError::TemplateSyntaxError { offset, .. } => {
                assert_eq!(&text[offset..offset + 2], "{{");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
