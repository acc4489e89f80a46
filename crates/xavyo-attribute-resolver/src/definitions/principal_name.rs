//! Releases the authenticated principal name.

use async_trait::async_trait;
use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::build_attribute;
use crate::context::ResolutionContext;
use crate::error::{ResolutionError, ResolutionResult};
use crate::plugin::AttributeDefinition;
use crate::settings::DefinitionSettings;

#[derive(Debug, Clone)]
pub struct PrincipalNameDefinition {
    settings: DefinitionSettings,
}

impl PrincipalNameDefinition {
    pub fn new(settings: DefinitionSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AttributeDefinition for PrincipalNameDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        let principal = context.request().principal_name().ok_or_else(|| {
            ResolutionError::invalid_input(self.settings.id.as_str(), "no authenticated principal")
        })?;
        Ok(Some(build_attribute(
            &self.settings,
            vec![AttributeValue::string(principal)],
        )?))
    }
}
