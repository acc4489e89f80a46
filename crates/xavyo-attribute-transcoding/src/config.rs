//! Declarative transcoding configuration
//!
//! Maps internal attribute ids to rule lists. Transcoder tags are checked
//! against the factory map when the configuration is turned into a
//! registry builder, so an unknown tag fails the load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TranscodingConfigError;
use crate::factory::TranscoderFactories;
use crate::registry::{TranscoderRegistry, TranscoderRegistryBuilder};
use crate::rule::{ScopeEncoding, TranscodingRule};

fn default_true() -> bool {
    true
}

/// One transcoding rule as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodingRuleConfig {
    /// Factory tag, e.g. `saml2_string`.
    pub transcoder: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_format: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_true")]
    pub encode_type: bool,
    #[serde(default)]
    pub scope_encoding: ScopeEncoding,
    #[serde(default)]
    pub as_array: bool,
    #[serde(default)]
    pub relying_parties: Vec<String>,
    #[serde(default)]
    pub display_names: BTreeMap<String, String>,
    #[serde(default)]
    pub display_descriptions: BTreeMap<String, String>,
}

impl TranscodingRuleConfig {
    fn to_rule(&self) -> TranscodingRule {
        let mut rule = TranscodingRule::with_tag(self.transcoder.clone())
            .with_encode_type(self.encode_type)
            .with_scope_encoding(self.scope_encoding)
            .with_as_array(self.as_array)
            .with_relying_parties(self.relying_parties.iter().cloned());
        if let Some(name) = &self.name {
            rule = rule.with_name(name.clone());
        }
        if let Some(format) = &self.name_format {
            rule = rule.with_name_format(format.clone());
        }
        if let Some(friendly_name) = &self.friendly_name {
            rule = rule.with_friendly_name(friendly_name.clone());
        }
        if let Some(namespace) = &self.namespace {
            rule = rule.with_namespace(namespace.clone());
        }
        for (lang, name) in &self.display_names {
            rule = rule.with_display_name(lang.clone(), name.clone());
        }
        for (lang, description) in &self.display_descriptions {
            rule = rule.with_display_description(lang.clone(), description.clone());
        }
        rule
    }
}

/// Transcoding rules keyed by internal attribute id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscodingConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<TranscodingRuleConfig>>,
}

impl TranscodingConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, TranscodingConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every rule against the factory map.
    pub fn validate(&self, factories: &TranscoderFactories) -> Result<(), TranscodingConfigError> {
        for (attribute_id, rules) in &self.rules {
            if attribute_id.trim().is_empty() {
                return Err(TranscodingConfigError::InvalidRule {
                    attribute_id: attribute_id.clone(),
                    message: "attribute id must not be blank".to_string(),
                });
            }
            for rule in rules {
                if !factories.contains(&rule.transcoder) {
                    return Err(TranscodingConfigError::UnknownTranscoder {
                        attribute_id: attribute_id.clone(),
                        tag: rule.transcoder.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Convert into a registry builder, so code-defined rules can be added.
    pub fn into_builder(
        self,
        factories: TranscoderFactories,
    ) -> Result<TranscoderRegistryBuilder, TranscodingConfigError> {
        self.validate(&factories)?;
        let mut builder = TranscoderRegistry::builder().factories(factories);
        for (attribute_id, rules) in &self.rules {
            builder = builder.install(attribute_id.clone(), rules.iter().map(|r| r.to_rule()));
        }
        Ok(builder)
    }

    /// Build a registry using the built-in transcoders.
    pub fn build(self) -> Result<TranscoderRegistry, TranscodingConfigError> {
        Ok(self.into_builder(TranscoderFactories::default())?.build())
    }
}
