//! Search templates for directory and relational connectors
//!
//! Placeholders: `{principal}`, `{requester}`, `{issuer}` and `{attr:<id>}`
//! (first string value of a dependency attribute). Substituted values are
//! escaped for the target query language.

use std::collections::BTreeMap;
use xavyo_attribute::AttributeValue;

use crate::context::ResolutionContext;
use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
use crate::settings::PluginDependencies;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Principal,
    Requester,
    Issuer,
    Attribute(String),
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl SearchTemplate {
    /// Parse a template, rejecting unknown or unterminated placeholders.
    pub fn parse(plugin_id: &str, template: &str) -> Result<Self, ResolverConfigError> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                ResolverConfigError::invalid_plugin(plugin_id, "unterminated placeholder in template")
            })?;

            let name = &after[..end];
            let segment = match name {
                "principal" => Segment::Principal,
                "requester" => Segment::Requester,
                "issuer" => Segment::Issuer,
                _ => match name.strip_prefix("attr:") {
                    Some(id) if !id.is_empty() => Segment::Attribute(id.to_string()),
                    _ => {
                        return Err(ResolverConfigError::invalid_plugin(
                            plugin_id,
                            format!("unknown template placeholder '{{{name}}}'"),
                        ))
                    }
                },
            };
            segments.push(segment);
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attribute ids referenced by `{attr:<id>}` placeholders.
    pub fn attribute_ids(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Attribute(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Render the template for a request.
    pub fn render(
        &self,
        plugin_id: &str,
        context: &ResolutionContext,
        dependencies: &PluginDependencies,
        escape: fn(&str) -> String,
    ) -> ResolutionResult<String> {
        let request = context.request();
        let mut dependency_values: Option<BTreeMap<String, Vec<AttributeValue>>> = None;
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            let (value, name) = match segment {
                Segment::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Principal => (request.principal_name(), "principal"),
                Segment::Requester => (request.requester_id(), "requester"),
                Segment::Issuer => (request.issuer_id(), "issuer"),
                Segment::Attribute(id) => {
                    let values = dependency_values
                        .get_or_insert_with(|| context.dependency_values(dependencies));
                    let value = values
                        .get(id)
                        .and_then(|v| v.iter().find_map(AttributeValue::as_str))
                        .ok_or_else(|| {
                            ResolutionError::invalid_input(
                                plugin_id,
                                format!("template attribute '{id}' has no value"),
                            )
                        })?;
                    out.push_str(&escape(value));
                    continue;
                }
            };

            let value = value.ok_or_else(|| {
                ResolutionError::invalid_input(plugin_id, format!("request has no {name}"))
            })?;
            out.push_str(&escape(value));
        }

        Ok(out)
    }
}

/// Escape a value for an LDAP search filter (RFC 4515).
pub fn escape_ldap_filter(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\5c"),
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for a single-quoted SQL string literal.
pub fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::test_support::context_with_source;
    use xavyo_attribute::RequestContext;

    #[test]
    fn test_escaping() {
        assert_eq!(escape_ldap_filter("a*(b)\\c"), "a\\2a\\28b\\29\\5cc");
        assert_eq!(escape_sql("O'Brien"), "O''Brien");
    }

    #[test]
    fn test_parse_rejects_bad_placeholders() {
        assert!(SearchTemplate::parse("ldap", "(uid={principal)").is_err());
        assert!(SearchTemplate::parse("ldap", "(uid={user})").is_err());
        assert!(SearchTemplate::parse("ldap", "(uid={attr:})").is_err());
    }

    #[test]
    fn test_render() {
        let template =
            SearchTemplate::parse("ldap", "(&(uid={principal})(ou={attr:dept})(sp={requester}))")
                .unwrap();
        assert_eq!(template.attribute_ids().collect::<Vec<_>>(), vec!["dept"]);

        let context = context_with_source(
            RequestContext::new()
                .with_principal("j*smith")
                .with_requester("https://sp.example.org"),
            &[("dept", &["R&D (lab)"])],
        );
        let deps = PluginDependencies::new().connector("source");

        let filter = template
            .render("ldap", &context, &deps, escape_ldap_filter)
            .unwrap();
        assert_eq!(
            filter,
            "(&(uid=j\\2asmith)(ou=R&D \\28lab\\29)(sp=https://sp.example.org))"
        );
    }

    #[test]
    fn test_render_missing_value() {
        let template = SearchTemplate::parse("db", "SELECT * FROM people WHERE uid = '{principal}'")
            .unwrap();
        let context = context_with_source(RequestContext::new(), &[]);

        let err = template
            .render("db", &context, &PluginDependencies::new(), escape_sql)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
