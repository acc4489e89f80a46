//! Feeds inbound (decoded) attributes into the graph.

use async_trait::async_trait;
use xavyo_attribute::IdPAttribute;

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::ResolutionResult;
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

/// Copies the values of an inbound attribute, by default the one with the same id.
#[derive(Debug, Clone)]
pub struct ContextDerivedDefinition {
    settings: DefinitionSettings,
    inbound_attribute_id: Option<String>,
}

impl ContextDerivedDefinition {
    pub fn new(settings: DefinitionSettings) -> Self {
        Self {
            settings,
            inbound_attribute_id: None,
        }
    }

    pub fn with_inbound_attribute(mut self, id: impl Into<String>) -> Self {
        self.inbound_attribute_id = Some(id.into());
        self
    }
}

#[async_trait]
impl AttributeDefinition for ContextDerivedDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let inbound_id = self
            .inbound_attribute_id
            .as_deref()
            .unwrap_or(&self.settings.id);

        match context.inbound_attributes().get(inbound_id) {
            Some(inbound) => Ok(Some(build_attribute(
                &self.settings,
                inbound.values().to_vec(),
            )?)),
            None => Ok(None),
        }
    }
}
