//! Relational database connector

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};
use xavyo_attribute::{AttributeMap, AttributeValue, IdPAttribute};

use super::cache::ResultCache;
use super::template::{escape_sql, SearchTemplate};
use super::ClientError;
use crate::context::ResolutionContext;
use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
use crate::plugin::DataConnector;
use crate::settings::ConnectorSettings;

/// A result row: column name to value, `None` for SQL NULL.
pub type SqlRow = BTreeMap<String, Option<String>>;

/// Executes queries on behalf of the connector.
#[async_trait]
pub trait SqlClient: Send + Sync {
    async fn query(&self, sql: &str) -> Result<Vec<SqlRow>, ClientError>;
}

/// Runs a templated query and turns columns into attributes.
///
/// Column names are lower-cased before renaming. Values of a column across
/// all rows become the values of one attribute.
pub struct RelationalConnector {
    settings: ConnectorSettings,
    client: Arc<dyn SqlClient>,
    query: SearchTemplate,
    renames: BTreeMap<String, String>,
    cache: Option<ResultCache>,
}

impl RelationalConnector {
    pub fn new(
        settings: ConnectorSettings,
        client: Arc<dyn SqlClient>,
        query: &str,
    ) -> Result<Self, ResolverConfigError> {
        let query = SearchTemplate::parse(&settings.id, query)?;
        Ok(Self {
            settings,
            client,
            query,
            renames: BTreeMap::new(),
            cache: None,
        })
    }

    /// Release column `column` under id `to`.
    pub fn with_rename(mut self, column: &str, to: impl Into<String>) -> Self {
        self.renames.insert(column.to_lowercase(), to.into());
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn map_rows(&self, rows: Vec<SqlRow>) -> ResolutionResult<AttributeMap> {
        let mut attributes = AttributeMap::new();
        for row in rows {
            for (column, value) in row {
                let column = column.to_lowercase();
                let id = self.renames.get(&column).cloned().unwrap_or(column);
                let value = match value {
                    Some(v) => AttributeValue::string(v),
                    None => AttributeValue::null(),
                };
                match attributes.get_mut(&id) {
                    Some(attribute) => attribute.add_value(value),
                    None => {
                        let attribute = IdPAttribute::new(id.as_str())?.with_values([value]);
                        attributes.insert(id, attribute);
                    }
                }
            }
        }
        Ok(attributes)
    }
}

#[async_trait]
impl DataConnector for RelationalConnector {
    fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>> {
        let sql = self
            .query
            .render(&self.settings.id, context, &self.settings.dependencies, escape_sql)?;

        if let Some(cache) = &self.cache {
            if let Some(attributes) = cache.get(&sql).await {
                trace!(connector_id = %self.settings.id, "Query result served from cache");
                return Ok(Some(attributes));
            }
        }

        debug!(connector_id = %self.settings.id, sql = %sql, "Executing query");
        let rows = self.client.query(&sql).await.map_err(|e| {
            ResolutionError::failed_with_source(self.settings.id.as_str(), "query failed", e)
        })?;
        if rows.is_empty() {
            return Ok(None);
        }

        let attributes = self.map_rows(rows)?;
        if let Some(cache) = &self.cache {
            cache.insert(sql, attributes.clone()).await;
        }
        Ok(Some(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use xavyo_attribute::RequestContext;

    struct FakeDatabase {
        rows: Vec<SqlRow>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SqlClient for FakeDatabase {
        async fn query(&self, sql: &str) -> Result<Vec<SqlRow>, ClientError> {
            self.queries.lock().unwrap().push(sql.to_string());
            Ok(self.rows.clone())
        }
    }

    fn row(pairs: &[(&str, Option<&str>)]) -> SqlRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[tokio::test]
    async fn test_rows_become_attributes() {
        let client = Arc::new(FakeDatabase {
            rows: vec![
                row(&[("UID", Some("o'brien")), ("GROUP_NAME", Some("staff"))]),
                row(&[("UID", Some("o'brien")), ("GROUP_NAME", None)]),
            ],
            queries: Mutex::new(Vec::new()),
        });
        let connector = RelationalConnector::new(
            ConnectorSettings::new("db"),
            client.clone(),
            "SELECT uid, group_name FROM groups WHERE uid = '{principal}'",
        )
        .unwrap()
        .with_rename("GROUP_NAME", "groups");

        let context = ResolutionContext::new(RequestContext::new().with_principal("o'brien"));
        let attributes = connector.resolve(&context).await.unwrap().unwrap();

        assert_eq!(
            client.queries.lock().unwrap().as_slice(),
            ["SELECT uid, group_name FROM groups WHERE uid = 'o''brien'"]
        );
        assert_eq!(attributes["uid"].values().len(), 2);
        assert_eq!(
            attributes["groups"].values(),
            &[AttributeValue::string("staff"), AttributeValue::null()]
        );
    }

    #[tokio::test]
    async fn test_no_rows_is_no_result() {
        let client = Arc::new(FakeDatabase {
            rows: Vec::new(),
            queries: Mutex::new(Vec::new()),
        });
        let connector = RelationalConnector::new(
            ConnectorSettings::new("db"),
            client,
            "SELECT * FROM people WHERE uid = '{principal}'",
        )
        .unwrap();

        let context = ResolutionContext::new(RequestContext::new().with_principal("nobody"));
        assert!(connector.resolve(&context).await.unwrap().is_none());
    }
}
