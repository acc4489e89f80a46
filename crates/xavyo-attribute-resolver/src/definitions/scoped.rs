//! Adds a scope to string values.

use async_trait::async_trait;
use tracing::debug;
use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::ResolutionResult;
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

/// Turns each string value of its source into `value@scope`.
#[derive(Debug, Clone)]
pub struct ScopedDefinition {
    settings: DefinitionSettings,
    scope: String,
}

impl ScopedDefinition {
    pub fn new(settings: DefinitionSettings, scope: impl Into<String>) -> Self {
        Self {
            settings,
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

#[async_trait]
impl AttributeDefinition for ScopedDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let values = context
            .merged_values(
                &self.settings.dependencies,
                self.settings.source_attribute_id(),
            )
            .into_iter()
            .filter_map(|value| match value.as_str() {
                Some(s) => Some(AttributeValue::scoped(s, self.scope.as_str())),
                None => {
                    debug!(
                        definition_id = %self.settings.id,
                        kind = value.kind(),
                        "Ignoring non-string value"
                    );
                    None
                }
            })
            .collect();

        Ok(Some(build_attribute(&self.settings, values)?))
    }
}
