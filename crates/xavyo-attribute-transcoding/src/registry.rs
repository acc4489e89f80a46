//! Transcoder registry
//!
//! Built once from installed rules, then shared read-only. Every rule is
//! indexed twice, under its internal attribute id and under the canonical
//! name its transcoder computes, so both directions are a map lookup. Within
//! a key, rules are grouped by the transcoder's type tag and keep their
//! installation order.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use xavyo_attribute::{IdPAttribute, RequestContext};

use crate::factory::TranscoderFactories;
use crate::naming::NamingRegistry;
use crate::rule::{TranscoderRef, TranscodingRule};
use crate::types::{EncodedAttribute, TypeTag};

type RulesByType = HashMap<TypeTag, Vec<Arc<TranscodingRule>>>;

/// Builder for [`TranscoderRegistry`].
#[derive(Debug)]
pub struct TranscoderRegistryBuilder {
    factories: TranscoderFactories,
    naming: NamingRegistry,
    rules: Vec<(String, TranscodingRule)>,
}

impl Default for TranscoderRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscoderRegistryBuilder {
    /// Create a builder with the built-in factories and naming functions.
    pub fn new() -> Self {
        Self {
            factories: TranscoderFactories::default(),
            naming: NamingRegistry::with_builtins(),
            rules: Vec::new(),
        }
    }

    /// Replace the transcoder factories.
    pub fn factories(mut self, factories: TranscoderFactories) -> Self {
        self.factories = factories;
        self
    }

    /// Replace the naming functions.
    pub fn naming(mut self, naming: NamingRegistry) -> Self {
        self.naming = naming;
        self
    }

    /// Install rules for an internal attribute id.
    pub fn install<I>(mut self, attribute_id: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = TranscodingRule>,
    {
        let attribute_id = attribute_id.into();
        self.rules.extend(rules.into_iter().map(|r| (attribute_id.clone(), r)));
        self
    }

    /// Build the registry.
    ///
    /// Rules whose transcoder tag is unknown, or whose external name cannot
    /// be computed, are dropped with a warning.
    pub fn build(self) -> TranscoderRegistry {
        let mut index: HashMap<String, RulesByType> = HashMap::new();
        let mut installed = 0usize;

        for (attribute_id, rule) in self.rules {
            let attribute_id = attribute_id.trim();
            if attribute_id.is_empty() {
                warn!("Ignoring transcoding rule with blank attribute id");
                continue;
            }

            let transcoder = match rule.transcoder_ref() {
                TranscoderRef::Instance(t) => Arc::clone(t),
                TranscoderRef::Tag(tag) => match self.factories.create(tag) {
                    Some(t) => t,
                    None => {
                        warn!(
                            attribute_id = %attribute_id,
                            tag = %tag,
                            "Unable to create transcoder for unknown tag, dropping rule"
                        );
                        continue;
                    }
                },
            };

            let encoded_type = transcoder.encoded_type();
            let Some(encoded_name) = transcoder.encoded_name(&rule) else {
                warn!(
                    attribute_id = %attribute_id,
                    encoded_type = %encoded_type,
                    "Transcoding rule did not produce an encoded name, dropping rule"
                );
                continue;
            };

            let rule = Arc::new(rule.install(attribute_id, transcoder));
            for key in [attribute_id.to_string(), encoded_name.clone()] {
                index
                    .entry(key)
                    .or_default()
                    .entry(encoded_type)
                    .or_default()
                    .push(Arc::clone(&rule));
            }
            trace!(
                attribute_id = %attribute_id,
                encoded_name = %encoded_name,
                encoded_type = %encoded_type,
                "Installed transcoding rule"
            );
            installed += 1;
        }

        info!(rules = installed, keys = index.len(), "Transcoder registry built");
        TranscoderRegistry {
            naming: self.naming,
            index,
        }
    }
}

/// Immutable index of transcoding rules.
#[derive(Debug)]
pub struct TranscoderRegistry {
    naming: NamingRegistry,
    index: HashMap<String, RulesByType>,
}

impl TranscoderRegistry {
    pub fn builder() -> TranscoderRegistryBuilder {
        TranscoderRegistryBuilder::new()
    }

    fn rules_for(&self, key: &str, effective: TypeTag) -> &[Arc<TranscodingRule>] {
        self.index
            .get(key)
            .and_then(|by_type| by_type.get(&effective))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rules encoding an attribute into a representation.
    pub fn lookup(&self, attribute: &IdPAttribute, target: TypeTag) -> &[Arc<TranscodingRule>] {
        self.lookup_id(attribute.id(), target)
    }

    /// Rules encoding an attribute id into a representation.
    pub fn lookup_id(&self, attribute_id: &str, target: TypeTag) -> &[Arc<TranscodingRule>] {
        let Some(effective) = self.naming.effective_type(target) else {
            warn!(target = %target, "Unsupported object type");
            return &[];
        };
        trace!(effective = %effective, "Using rules for effective type");
        self.rules_for(attribute_id, effective)
    }

    /// Rules decoding an external object.
    pub fn lookup_encoded(&self, encoded: &dyn EncodedAttribute) -> &[Arc<TranscodingRule>] {
        match self.naming.canonical_name(encoded) {
            Some((effective, name)) => self.rules_for(&name, effective),
            None => {
                warn!(
                    encoded_type = %encoded.type_tag(),
                    "Object did not have a canonical name"
                );
                &[]
            }
        }
    }

    /// Encode an attribute with every active rule for a representation.
    ///
    /// Failing rules are logged and skipped.
    pub fn encode(
        &self,
        request: &RequestContext,
        attribute: &IdPAttribute,
        target: TypeTag,
    ) -> Vec<Box<dyn EncodedAttribute>> {
        let mut encoded = Vec::new();
        for rule in self.lookup(attribute, target) {
            if !rule.is_active(request) {
                debug!(attribute_id = %attribute.id(), "Transcoding rule inactive");
                continue;
            }
            let Some(transcoder) = rule.transcoder() else {
                continue;
            };
            match transcoder.encode(request, attribute, rule) {
                Ok(Some(object)) => encoded.push(object),
                Ok(None) => {}
                Err(e) => warn!(
                    attribute_id = %attribute.id(),
                    error = %e,
                    error_code = e.error_code(),
                    "Unable to encode attribute"
                ),
            }
        }
        encoded
    }

    /// Decode an external object with every active rule for it.
    pub fn decode(
        &self,
        request: &RequestContext,
        encoded: &dyn EncodedAttribute,
    ) -> Vec<IdPAttribute> {
        let mut decoded = Vec::new();
        for rule in self.lookup_encoded(encoded) {
            if !rule.is_active(request) {
                debug!(attribute_id = %rule.attribute_id(), "Transcoding rule inactive");
                continue;
            }
            let Some(transcoder) = rule.transcoder() else {
                continue;
            };
            match transcoder.decode(request, encoded, rule) {
                Ok(Some(attribute)) => decoded.push(attribute),
                Ok(None) => {}
                Err(e) => warn!(
                    attribute_id = %rule.attribute_id(),
                    error = %e,
                    error_code = e.error_code(),
                    "Unable to decode attribute"
                ),
            }
        }
        decoded
    }
}
