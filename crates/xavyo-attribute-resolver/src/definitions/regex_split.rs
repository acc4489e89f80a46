//! Extracts part of each value with a regular expression.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::{ResolutionResult, ResolverConfigError};
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

/// Emits the first capture group of every string value the regex matches.
///
/// Values that do not match, or match without a first group, are dropped.
#[derive(Debug, Clone)]
pub struct RegexSplitDefinition {
    settings: DefinitionSettings,
    regex: Regex,
}

impl RegexSplitDefinition {
    pub fn new(
        settings: DefinitionSettings,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Self, ResolverConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| ResolverConfigError::invalid_plugin(settings.id.as_str(), e.to_string()))?;
        Ok(Self { settings, regex })
    }
}

#[async_trait]
impl AttributeDefinition for RegexSplitDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let values = context
            .merged_values(
                &self.settings.dependencies,
                self.settings.source_attribute_id(),
            )
            .iter()
            .filter_map(AttributeValue::as_str)
            .filter_map(|s| self.regex.captures(s))
            .filter_map(|caps| caps.get(1).map(|m| AttributeValue::string(m.as_str())))
            .collect();

        Ok(Some(build_attribute(&self.settings, values)?))
    }
}
