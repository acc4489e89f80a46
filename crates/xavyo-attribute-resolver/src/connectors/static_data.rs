//! Returns a fixed set of attributes.

use async_trait::async_trait;
use xavyo_attribute::AttributeMap;

use crate::context::ResolutionContext;
use crate::error::ResolutionResult;
use crate::plugin::DataConnector;
use crate::settings::ConnectorSettings;

#[derive(Debug, Clone)]
pub struct StaticConnector {
    settings: ConnectorSettings,
    attributes: AttributeMap,
}

impl StaticConnector {
    pub fn new(settings: ConnectorSettings, attributes: AttributeMap) -> Self {
        Self {
            settings,
            attributes,
        }
    }
}

#[async_trait]
impl DataConnector for StaticConnector {
    fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    async fn resolve(&self, _context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>> {
        Ok(Some(self.attributes.clone()))
    }
}
