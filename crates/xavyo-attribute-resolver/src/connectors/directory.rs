//! Directory (LDAP) search connector

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};
use xavyo_attribute::{AttributeMap, IdPAttribute};

use super::cache::ResultCache;
use super::template::{escape_ldap_filter, SearchTemplate};
use super::ClientError;
use crate::context::ResolutionContext;
use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
use crate::plugin::DataConnector;
use crate::settings::ConnectorSettings;

/// An entry returned by a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }
}

/// Executes directory searches on behalf of the connector.
///
/// Implemented by the host application over its directory client. The
/// client owns connection pooling and search time limits.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn search(&self, filter: &str) -> Result<Vec<DirectoryEntry>, ClientError>;
}

/// Searches a directory with a filter built from the request.
pub struct DirectoryConnector {
    settings: ConnectorSettings,
    client: Arc<dyn DirectoryClient>,
    filter: SearchTemplate,
    renames: BTreeMap<String, String>,
    allow_multiple_results: bool,
    cache: Option<ResultCache>,
}

impl DirectoryConnector {
    pub fn new(
        settings: ConnectorSettings,
        client: Arc<dyn DirectoryClient>,
        filter: &str,
    ) -> Result<Self, ResolverConfigError> {
        let filter = SearchTemplate::parse(&settings.id, filter)?;
        Ok(Self {
            settings,
            client,
            filter,
            renames: BTreeMap::new(),
            allow_multiple_results: false,
            cache: None,
        })
    }

    /// Release directory attribute `from` under id `to`.
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Merge several entries instead of failing.
    pub fn with_multiple_results(mut self, allow: bool) -> Self {
        self.allow_multiple_results = allow;
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn map_entries(&self, entries: Vec<DirectoryEntry>) -> ResolutionResult<AttributeMap> {
        let mut attributes = AttributeMap::new();
        for entry in entries {
            for (name, values) in entry.attributes {
                let id = self.renames.get(&name).cloned().unwrap_or(name);
                match attributes.get_mut(&id) {
                    Some(attribute) => {
                        for value in values {
                            attribute.add_value(value);
                        }
                    }
                    None => {
                        let attribute = IdPAttribute::new(id.as_str())?.with_values(values);
                        attributes.insert(id, attribute);
                    }
                }
            }
        }
        Ok(attributes)
    }
}

#[async_trait]
impl DataConnector for DirectoryConnector {
    fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>> {
        let filter = self.filter.render(
            &self.settings.id,
            context,
            &self.settings.dependencies,
            escape_ldap_filter,
        )?;

        if let Some(cache) = &self.cache {
            if let Some(attributes) = cache.get(&filter).await {
                trace!(connector_id = %self.settings.id, filter = %filter, "Directory result served from cache");
                return Ok(Some(attributes));
            }
        }

        debug!(connector_id = %self.settings.id, filter = %filter, "Searching directory");
        let entries = self.client.search(&filter).await.map_err(|e| {
            ResolutionError::failed_with_source(self.settings.id.as_str(), "directory search failed", e)
        })?;

        if entries.is_empty() {
            return Ok(None);
        }
        if entries.len() > 1 && !self.allow_multiple_results {
            return Err(ResolutionError::invalid_input(
                self.settings.id.as_str(),
                format!("search returned {} entries, expected one", entries.len()),
            ));
        }

        let attributes = self.map_entries(entries)?;
        if let Some(cache) = &self.cache {
            cache.insert(filter, attributes.clone()).await;
        }
        Ok(Some(attributes))
    }
}
