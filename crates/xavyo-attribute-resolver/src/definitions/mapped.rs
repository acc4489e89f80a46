//! Maps source values to new values through regex rules.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::{ResolutionResult, ResolverConfigError};
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

/// One mapping rule: values matching `source` become `return_value`.
///
/// `return_value` may reference capture groups as `$1`, `${name}`.
#[derive(Debug, Clone)]
pub struct ValueMapping {
    source: Regex,
    return_value: String,
}

impl ValueMapping {
    /// Create a rule. Unless `partial_match`, the pattern must match the whole value.
    pub fn new(
        pattern: &str,
        return_value: impl Into<String>,
        case_sensitive: bool,
        partial_match: bool,
    ) -> Result<Self, regex::Error> {
        let pattern = if partial_match {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})$")
        };
        let source = RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self {
            source,
            return_value: return_value.into(),
        })
    }

    fn apply(&self, value: &str) -> Option<String> {
        let captures = self.source.captures(value)?;
        let mut mapped = String::new();
        captures.expand(&self.return_value, &mut mapped);
        Some(mapped)
    }
}

/// Produces values by running every source value through ordered mapping rules.
#[derive(Debug, Clone)]
pub struct MappedDefinition {
    settings: DefinitionSettings,
    mappings: Vec<ValueMapping>,
    default_value: Option<String>,
    pass_through: bool,
}

impl MappedDefinition {
    pub fn new(settings: DefinitionSettings, mappings: Vec<ValueMapping>) -> Self {
        Self {
            settings,
            mappings,
            default_value: None,
            pass_through: false,
        }
    }

    /// Value emitted for unmapped values, and when there are no source values.
    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Keep unmapped values as they are. Takes precedence over the default value.
    pub fn with_pass_through(mut self, pass_through: bool) -> Self {
        self.pass_through = pass_through;
        self
    }

    /// Build a mapping from raw patterns, reporting the plugin id on failure.
    pub fn mapping(
        settings: &DefinitionSettings,
        pattern: &str,
        return_value: &str,
        case_sensitive: bool,
        partial_match: bool,
    ) -> Result<ValueMapping, ResolverConfigError> {
        ValueMapping::new(pattern, return_value, case_sensitive, partial_match)
            .map_err(|e| ResolverConfigError::invalid_plugin(settings.id.as_str(), e.to_string()))
    }

    fn map_value(&self, value: &str, out: &mut Vec<AttributeValue>) {
        let before = out.len();
        out.extend(
            self.mappings
                .iter()
                .filter_map(|m| m.apply(value))
                .map(AttributeValue::string),
        );
        if out.len() > before {
            return;
        }

        if self.pass_through {
            out.push(AttributeValue::string(value));
        } else if let Some(default_value) = &self.default_value {
            out.push(AttributeValue::string(default_value.as_str()));
        }
    }
}

#[async_trait]
impl AttributeDefinition for MappedDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let sources = context.merged_values(
            &self.settings.dependencies,
            self.settings.source_attribute_id(),
        );

        let mut values = Vec::new();
        if sources.is_empty() {
            if let Some(default_value) = &self.default_value {
                values.push(AttributeValue::string(default_value.as_str()));
            }
        }
        for source in sources.iter().filter_map(AttributeValue::as_str) {
            self.map_value(source, &mut values);
        }

        Ok(Some(build_attribute(&self.settings, values)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::test_support::context_with_source;
    use crate::settings::PluginDependencies;
    use xavyo_attribute::RequestContext;

    fn settings() -> DefinitionSettings {
        DefinitionSettings::new("eduPersonAffiliation")
            .with_dependencies(PluginDependencies::new().connector("source"))
            .with_source_attribute("role")
    }

    fn strings(attribute: &IdPAttribute) -> Vec<&str> {
        attribute.values().iter().filter_map(|v| v.as_str()).collect()
    }

    #[tokio::test]
    async fn test_mapping_with_group_reference() {
        let context = context_with_source(
            RequestContext::new(),
            &[("role", &["faculty-physics", "student", "visitor"])],
        );
        let mappings = vec![
            ValueMapping::new("faculty-(.+)", "staff-$1", true, false).unwrap(),
            ValueMapping::new("STUDENT", "member", false, false).unwrap(),
        ];

        let definition = MappedDefinition::new(settings(), mappings.clone());
        let attribute = definition.resolve(&context).await.unwrap().unwrap();
        assert_eq!(strings(&attribute), vec!["staff-physics", "member"]);

        let definition = MappedDefinition::new(settings(), mappings.clone()).with_pass_through(true);
        let attribute = definition.resolve(&context).await.unwrap().unwrap();
        assert_eq!(strings(&attribute), vec!["staff-physics", "member", "visitor"]);

        let definition = MappedDefinition::new(settings(), mappings).with_default_value("affiliate");
        let attribute = definition.resolve(&context).await.unwrap().unwrap();
        assert_eq!(strings(&attribute), vec!["staff-physics", "member", "affiliate"]);
    }

    #[tokio::test]
    async fn test_default_without_sources() {
        let context = context_with_source(RequestContext::new(), &[]);
        let definition = MappedDefinition::new(settings(), Vec::new()).with_default_value("affiliate");

        let attribute = definition.resolve(&context).await.unwrap().unwrap();
        assert_eq!(strings(&attribute), vec!["affiliate"]);
    }

    #[test]
    fn test_whole_value_match_unless_partial() {
        let whole = ValueMapping::new("staff", "x", true, false).unwrap();
        assert!(whole.apply("staff-member").is_none());

        let partial = ValueMapping::new("staff", "x", true, true).unwrap();
        assert_eq!(partial.apply("staff-member").as_deref(), Some("x"));
    }
}
