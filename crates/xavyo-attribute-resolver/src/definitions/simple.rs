//! Copies values from dependencies.

use async_trait::async_trait;
use xavyo_attribute::IdPAttribute;

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::ResolutionResult;
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

/// Releases the merged values of its source attribute unchanged.
#[derive(Debug, Clone)]
pub struct SimpleDefinition {
    settings: DefinitionSettings,
}

impl SimpleDefinition {
    pub fn new(settings: DefinitionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AttributeDefinition for SimpleDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let values = context.merged_values(
            &self.settings.dependencies,
            self.settings.source_attribute_id(),
        );
        Ok(Some(build_attribute(&self.settings, values)?))
    }
}
