//! Resolver configuration
//!
//! Declarative form of a plugin graph. Entries are validated eagerly and
//! converted into plugins; connectors that need a host client (directory,
//! relational) are added to the returned builder in code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use xavyo_attribute::{AttributeMap, IdPAttribute};

use crate::connectors::{ComputedIdConnector, StaticConnector};
use crate::definitions::{
    ContextDerivedDefinition, MappedDefinition, PrincipalNameDefinition, RegexSplitDefinition,
    ScopedDefinition, SimpleDefinition,
};
use crate::error::ResolverConfigError;
use crate::resolver::{AttributeResolver, AttributeResolverBuilder};
use crate::settings::{ConnectorSettings, DefinitionSettings, ExportPolicy, PluginDependencies};

/// A complete resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_resolver_id")]
    pub id: String,
    #[serde(default)]
    pub strip_nulls: bool,
    #[serde(default)]
    pub suppress_display_information: bool,
    #[serde(default)]
    pub definitions: Vec<DefinitionConfig>,
    #[serde(default)]
    pub connectors: Vec<ConnectorConfig>,
}

fn default_resolver_id() -> String {
    "attribute-resolver".to_string()
}

fn default_true() -> bool {
    true
}

/// One attribute definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionConfig {
    pub id: String,
    #[serde(flatten)]
    pub kind: DefinitionKind,
    #[serde(default)]
    pub dependencies: PluginDependencies,
    #[serde(default)]
    pub dependency_only: bool,
    #[serde(default)]
    pub pre_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attribute_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_names: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_descriptions: BTreeMap<String, String>,
}

/// Attribute definition type and its type-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DefinitionKind {
    Simple,
    Scoped {
        scope: String,
    },
    RegexSplit {
        regex: String,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },
    Mapped {
        mappings: Vec<ValueMappingConfig>,
        #[serde(default)]
        default_value: Option<String>,
        #[serde(default)]
        pass_through: bool,
    },
    PrincipalName,
    ContextDerived {
        #[serde(default)]
        inbound_attribute_id: Option<String>,
    },
}

/// One mapping rule of a mapped definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueMappingConfig {
    pub source: String,
    pub return_value: String,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub partial_match: bool,
}

/// One data connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub id: String,
    #[serde(flatten)]
    pub kind: ConnectorKind,
    #[serde(default)]
    pub dependencies: PluginDependencies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover_connector_id: Option<String>,
    #[serde(default)]
    pub no_retry_delay_ms: u64,
    #[serde(default = "default_true")]
    pub propagate_errors: bool,
    #[serde(default)]
    pub no_result_is_error: bool,
    #[serde(default)]
    pub export_all: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exported_attributes: Vec<String>,
    /// Display names of exported attributes, keyed by attribute id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_names: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_descriptions: BTreeMap<String, BTreeMap<String, String>>,
}

/// Data connector type and its type-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorKind {
    Static {
        attributes: Vec<StaticAttributeConfig>,
    },
    ComputedId {
        source_attribute_id: String,
        salt: String,
        #[serde(default)]
        generated_attribute_id: Option<String>,
    },
}

/// A fixed attribute of a static connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticAttributeConfig {
    pub id: String,
    pub values: Vec<String>,
}

impl ResolverConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ResolverConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into a builder, so host-backed connectors can be added.
    pub fn into_builder(self) -> Result<AttributeResolverBuilder, ResolverConfigError> {
        let mut builder = AttributeResolver::builder(self.id)
            .strip_nulls(self.strip_nulls)
            .suppress_display_information(self.suppress_display_information);

        for definition in self.definitions {
            builder = definition.add_to(builder)?;
        }
        for connector in self.connectors {
            builder = connector.add_to(builder)?;
        }
        Ok(builder)
    }

    /// Build and validate the resolver.
    pub fn build(self) -> Result<AttributeResolver, ResolverConfigError> {
        self.into_builder()?.build()
    }
}

impl DefinitionConfig {
    fn settings(&self) -> DefinitionSettings {
        DefinitionSettings {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            dependency_only: self.dependency_only,
            pre_requested: self.pre_requested,
            source_attribute_id: self.source_attribute_id.clone(),
            display_names: self.display_names.clone(),
            display_descriptions: self.display_descriptions.clone(),
        }
    }

    fn add_to(
        self,
        builder: AttributeResolverBuilder,
    ) -> Result<AttributeResolverBuilder, ResolverConfigError> {
        let settings = self.settings();
        let builder = match self.kind {
            DefinitionKind::Simple => builder.definition(SimpleDefinition::new(settings)),
            DefinitionKind::Scoped { scope } => {
                builder.definition(ScopedDefinition::new(settings, scope))
            }
            DefinitionKind::RegexSplit {
                regex,
                case_sensitive,
            } => builder.definition(RegexSplitDefinition::new(settings, &regex, case_sensitive)?),
            DefinitionKind::Mapped {
                mappings,
                default_value,
                pass_through,
            } => {
                let mappings = mappings
                    .iter()
                    .map(|m| {
                        MappedDefinition::mapping(
                            &settings,
                            &m.source,
                            &m.return_value,
                            m.case_sensitive,
                            m.partial_match,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut definition =
                    MappedDefinition::new(settings, mappings).with_pass_through(pass_through);
                if let Some(default_value) = default_value {
                    definition = definition.with_default_value(default_value);
                }
                builder.definition(definition)
            }
            DefinitionKind::PrincipalName => {
                builder.definition(PrincipalNameDefinition::new(settings))
            }
            DefinitionKind::ContextDerived {
                inbound_attribute_id,
            } => {
                let mut definition = ContextDerivedDefinition::new(settings);
                if let Some(id) = inbound_attribute_id {
                    definition = definition.with_inbound_attribute(id);
                }
                builder.definition(definition)
            }
        };
        Ok(builder)
    }
}

impl ConnectorConfig {
    fn settings(&self) -> ConnectorSettings {
        let export = if self.export_all {
            ExportPolicy::All
        } else if self.exported_attributes.is_empty() {
            ExportPolicy::None
        } else {
            ExportPolicy::named(self.exported_attributes.iter().cloned())
        };

        ConnectorSettings {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            failover_connector_id: self.failover_connector_id.clone(),
            no_retry_delay: Duration::from_millis(self.no_retry_delay_ms),
            propagate_errors: self.propagate_errors,
            no_result_is_error: self.no_result_is_error,
            export,
            display_names: self.display_names.clone(),
            display_descriptions: self.display_descriptions.clone(),
        }
    }

    fn add_to(
        self,
        builder: AttributeResolverBuilder,
    ) -> Result<AttributeResolverBuilder, ResolverConfigError> {
        let settings = self.settings();
        let builder = match self.kind {
            ConnectorKind::Static { attributes } => {
                let mut map = AttributeMap::new();
                for attribute in attributes {
                    let built = IdPAttribute::new(attribute.id.as_str())
                        .map_err(|e| ResolverConfigError::invalid_plugin(&self.id, e.to_string()))?
                        .with_values(attribute.values);
                    map.insert(attribute.id, built);
                }
                builder.connector(StaticConnector::new(settings, map))
            }
            ConnectorKind::ComputedId {
                source_attribute_id,
                salt,
                generated_attribute_id,
            } => {
                let mut connector =
                    ComputedIdConnector::new(settings, source_attribute_id, salt.into_bytes())?;
                if let Some(id) = generated_attribute_id {
                    connector = connector.with_generated_attribute_id(id);
                }
                builder.connector(connector)
            }
        };
        Ok(builder)
    }
}
