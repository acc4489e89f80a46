//! Plugin settings
//!
//! Static, per-plugin metadata the engine reads to walk the dependency graph
//! and drive failover. Plugins own their settings and expose them through
//! the plugin traits.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Dependency on a data connector, optionally narrowed to some of its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDependency {
    pub connector_id: String,
    /// Attribute ids to take from the connector. Empty means the consumer's source attribute.
    #[serde(default)]
    pub attribute_ids: Vec<String>,
}

/// Plugins a plugin needs resolved before it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependencies {
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub connectors: Vec<ConnectorDependency>,
}

impl PluginDependencies {
    /// Create an empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute definition dependency.
    pub fn attribute(mut self, definition_id: impl Into<String>) -> Self {
        self.attributes.push(definition_id.into());
        self
    }

    /// Add a data connector dependency.
    pub fn connector(mut self, connector_id: impl Into<String>) -> Self {
        self.connectors.push(ConnectorDependency {
            connector_id: connector_id.into(),
            attribute_ids: Vec::new(),
        });
        self
    }

    /// Add a data connector dependency restricted to named attributes.
    pub fn connector_attributes<I, S>(mut self, connector_id: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connectors.push(ConnectorDependency {
            connector_id: connector_id.into(),
            attribute_ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Iterate the data connector ids.
    pub fn connector_ids(&self) -> impl Iterator<Item = &str> {
        self.connectors.iter().map(|c| c.connector_id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.connectors.is_empty()
    }
}

/// Settings of an attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSettings {
    pub id: String,
    pub dependencies: PluginDependencies,
    /// Result feeds other plugins but is never released.
    pub dependency_only: bool,
    /// Resolved before everything else, whatever the request asks for.
    pub pre_requested: bool,
    /// Attribute read from connector dependencies. Defaults to `id`.
    pub source_attribute_id: Option<String>,
    pub display_names: BTreeMap<String, String>,
    pub display_descriptions: BTreeMap<String, String>,
}

impl DefinitionSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dependencies: PluginDependencies::default(),
            dependency_only: false,
            pre_requested: false,
            source_attribute_id: None,
            display_names: BTreeMap::new(),
            display_descriptions: BTreeMap::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: PluginDependencies) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn dependency_only(mut self) -> Self {
        self.dependency_only = true;
        self
    }

    pub fn pre_requested(mut self) -> Self {
        self.pre_requested = true;
        self
    }

    pub fn with_source_attribute(mut self, source_attribute_id: impl Into<String>) -> Self {
        self.source_attribute_id = Some(source_attribute_id.into());
        self
    }

    pub fn with_display_name(mut self, lang: impl Into<String>, name: impl Into<String>) -> Self {
        self.display_names.insert(lang.into(), name.into());
        self
    }

    pub fn with_display_description(
        mut self,
        lang: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.display_descriptions
            .insert(lang.into(), description.into());
        self
    }

    /// The attribute id read from connector dependencies.
    pub fn source_attribute_id(&self) -> &str {
        self.source_attribute_id.as_deref().unwrap_or(&self.id)
    }
}

/// Which of a connector's attributes are released without a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPolicy {
    #[default]
    None,
    All,
    Named(BTreeSet<String>),
}

impl ExportPolicy {
    /// Export the named attributes.
    pub fn named<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExportPolicy::Named(ids.into_iter().map(Into::into).collect())
    }

    /// Check whether the connector exports anything.
    pub fn is_exporting(&self) -> bool {
        match self {
            ExportPolicy::None => false,
            ExportPolicy::All => true,
            ExportPolicy::Named(ids) => !ids.is_empty(),
        }
    }

    /// Check whether an attribute id is exported.
    pub fn exports(&self, attribute_id: &str) -> bool {
        match self {
            ExportPolicy::None => false,
            ExportPolicy::All => true,
            ExportPolicy::Named(ids) => ids.contains(attribute_id),
        }
    }
}

/// Settings of a data connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorSettings {
    pub id: String,
    pub dependencies: PluginDependencies,
    /// Connector used when this one fails or is inside its no-retry window.
    pub failover_connector_id: Option<String>,
    /// How long after a failure the connector is not called again.
    pub no_retry_delay: Duration,
    /// Abort resolution when a failure cannot be absorbed by failover.
    pub propagate_errors: bool,
    /// Treat an empty result as a `NoResult` error.
    pub no_result_is_error: bool,
    pub export: ExportPolicy,
    /// Display names of exported attributes, by attribute id then language.
    pub display_names: BTreeMap<String, BTreeMap<String, String>>,
    /// Display descriptions of exported attributes, by attribute id then language.
    pub display_descriptions: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConnectorSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dependencies: PluginDependencies::default(),
            failover_connector_id: None,
            no_retry_delay: Duration::ZERO,
            propagate_errors: true,
            no_result_is_error: false,
            export: ExportPolicy::None,
            display_names: BTreeMap::new(),
            display_descriptions: BTreeMap::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: PluginDependencies) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_failover(mut self, connector_id: impl Into<String>) -> Self {
        self.failover_connector_id = Some(connector_id.into());
        self
    }

    pub fn with_no_retry_delay(mut self, delay: Duration) -> Self {
        self.no_retry_delay = delay;
        self
    }

    pub fn with_propagate_errors(mut self, propagate: bool) -> Self {
        self.propagate_errors = propagate;
        self
    }

    pub fn with_no_result_is_error(mut self, no_result_is_error: bool) -> Self {
        self.no_result_is_error = no_result_is_error;
        self
    }

    pub fn with_export(mut self, export: ExportPolicy) -> Self {
        self.export = export;
        self
    }

    pub fn with_display_name(
        mut self,
        attribute_id: impl Into<String>,
        lang: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.display_names
            .entry(attribute_id.into())
            .or_default()
            .insert(lang.into(), name.into());
        self
    }

    pub fn with_display_description(
        mut self,
        attribute_id: impl Into<String>,
        lang: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.display_descriptions
            .entry(attribute_id.into())
            .or_default()
            .insert(lang.into(), description.into());
        self
    }
}
