//! Per-request resolution state
//!
//! A `ResolutionContext` is created for each request and never shared. The
//! engine records every plugin it resolves in the work area, which doubles
//! as the memoization table for the request.

use std::collections::BTreeMap;
use xavyo_attribute::{AttributeMap, AttributeValue, IdPAttribute, RequestContext};

use crate::settings::PluginDependencies;

/// Memoized outcome of an attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttributeDefinition {
    pub definition_id: String,
    /// `None` when the definition produced nothing or failed.
    pub attribute: Option<IdPAttribute>,
    pub dependency_only: bool,
}

/// Memoized outcome of a data connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataConnector {
    pub connector_id: String,
    /// Connector that actually produced the data; differs from `connector_id` after failover.
    pub resolved_by: String,
    /// `None` when the connector produced nothing or its failure was swallowed.
    pub attributes: Option<AttributeMap>,
}

impl ResolvedDataConnector {
    pub(crate) fn empty(connector_id: &str) -> Self {
        Self {
            connector_id: connector_id.to_string(),
            resolved_by: connector_id.to_string(),
            attributes: None,
        }
    }

    /// Check whether the connector was substituted by its failover.
    pub fn used_failover(&self) -> bool {
        self.connector_id != self.resolved_by
    }
}

/// State of one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    request: RequestContext,
    requested_ids: Vec<String>,
    inbound_attributes: AttributeMap,
    resolved_definitions: BTreeMap<String, ResolvedAttributeDefinition>,
    resolved_connectors: BTreeMap<String, ResolvedDataConnector>,
    pre_resolved_attributes: AttributeMap,
    resolved_attributes: AttributeMap,
}

impl ResolutionContext {
    /// Create a context for a request.
    pub fn new(request: RequestContext) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// Restrict resolution to the given attribute ids.
    ///
    /// Dependencies of the requested definitions are still resolved.
    pub fn with_requested_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Supply attributes decoded from inbound protocol data.
    pub fn with_inbound_attributes(mut self, attributes: AttributeMap) -> Self {
        self.inbound_attributes = attributes;
        self
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn requested_ids(&self) -> &[String] {
        &self.requested_ids
    }

    pub fn inbound_attributes(&self) -> &AttributeMap {
        &self.inbound_attributes
    }

    /// Attributes of pre-requested definitions, available once they are resolved.
    pub fn pre_resolved_attributes(&self) -> &AttributeMap {
        &self.pre_resolved_attributes
    }

    /// Attributes released by the last resolution.
    pub fn resolved_attributes(&self) -> &AttributeMap {
        &self.resolved_attributes
    }

    /// Take the released attributes out of the context.
    pub fn take_resolved_attributes(&mut self) -> AttributeMap {
        std::mem::take(&mut self.resolved_attributes)
    }

    pub fn resolved_definition(&self, id: &str) -> Option<&ResolvedAttributeDefinition> {
        self.resolved_definitions.get(id)
    }

    pub fn resolved_connector(&self, id: &str) -> Option<&ResolvedDataConnector> {
        self.resolved_connectors.get(id)
    }

    pub fn resolved_definitions(&self) -> impl Iterator<Item = &ResolvedAttributeDefinition> {
        self.resolved_definitions.values()
    }

    pub fn resolved_connectors(&self) -> impl Iterator<Item = &ResolvedDataConnector> {
        self.resolved_connectors.values()
    }

    pub(crate) fn record_definition(&mut self, resolved: ResolvedAttributeDefinition) {
        self.resolved_definitions
            .insert(resolved.definition_id.clone(), resolved);
    }

    pub(crate) fn record_connector(&mut self, resolved: ResolvedDataConnector) {
        self.resolved_connectors
            .insert(resolved.connector_id.clone(), resolved);
    }

    pub(crate) fn set_pre_resolved_attributes(&mut self, attributes: AttributeMap) {
        self.pre_resolved_attributes = attributes;
    }

    pub(crate) fn set_resolved_attributes(&mut self, attributes: AttributeMap) {
        self.resolved_attributes = attributes;
    }

    /// Values of `source_id` gathered across the dependencies.
    ///
    /// An attribute definition dependency contributes all of its values. A
    /// data connector dependency contributes the values of its listed
    /// attributes, or of `source_id` when none are listed.
    pub fn merged_values(
        &self,
        dependencies: &PluginDependencies,
        source_id: &str,
    ) -> Vec<AttributeValue> {
        let mut values = Vec::new();

        for id in &dependencies.attributes {
            if let Some(attribute) = self
                .resolved_definitions
                .get(id)
                .and_then(|r| r.attribute.as_ref())
            {
                values.extend(attribute.values().iter().cloned());
            }
        }

        for dependency in &dependencies.connectors {
            let Some(attributes) = self
                .resolved_connectors
                .get(&dependency.connector_id)
                .and_then(|r| r.attributes.as_ref())
            else {
                continue;
            };

            if dependency.attribute_ids.is_empty() {
                if let Some(attribute) = attributes.get(source_id) {
                    values.extend(attribute.values().iter().cloned());
                }
            } else {
                for id in &dependency.attribute_ids {
                    if let Some(attribute) = attributes.get(id) {
                        values.extend(attribute.values().iter().cloned());
                    }
                }
            }
        }

        values
    }

    /// All dependency values grouped by attribute id.
    pub fn dependency_values(
        &self,
        dependencies: &PluginDependencies,
    ) -> BTreeMap<String, Vec<AttributeValue>> {
        let mut grouped: BTreeMap<String, Vec<AttributeValue>> = BTreeMap::new();

        for id in &dependencies.attributes {
            if let Some(attribute) = self
                .resolved_definitions
                .get(id)
                .and_then(|r| r.attribute.as_ref())
            {
                grouped
                    .entry(attribute.id().to_string())
                    .or_default()
                    .extend(attribute.values().iter().cloned());
            }
        }

        for dependency in &dependencies.connectors {
            let Some(attributes) = self
                .resolved_connectors
                .get(&dependency.connector_id)
                .and_then(|r| r.attributes.as_ref())
            else {
                continue;
            };

            for (id, attribute) in attributes {
                if dependency.attribute_ids.is_empty() || dependency.attribute_ids.contains(id) {
                    grouped
                        .entry(id.clone())
                        .or_default()
                        .extend(attribute.values().iter().cloned());
                }
            }
        }

        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(id: &str, values: &[&str]) -> IdPAttribute {
        IdPAttribute::new(id)
            .unwrap()
            .with_values(values.iter().copied())
    }

    fn context() -> ResolutionContext {
        let mut context = ResolutionContext::new(RequestContext::new().with_principal("jsmith"));
        context.record_definition(ResolvedAttributeDefinition {
            definition_id: "affiliation".into(),
            attribute: Some(attribute("affiliation", &["member"])),
            dependency_only: false,
        });

        let mut ldap = AttributeMap::new();
        ldap.insert("mail".into(), attribute("mail", &["jsmith@example.org"]));
        ldap.insert("affiliation".into(), attribute("affiliation", &["staff"]));
        context.record_connector(ResolvedDataConnector {
            connector_id: "ldap".into(),
            resolved_by: "ldap".into(),
            attributes: Some(ldap),
        });
        context
    }

    #[test]
    fn test_merged_values_uses_source_for_connectors() {
        let context = context();
        let deps = PluginDependencies::new()
            .attribute("affiliation")
            .connector("ldap");

        let values = context.merged_values(&deps, "affiliation");
        assert_eq!(
            values,
            vec![AttributeValue::string("member"), AttributeValue::string("staff")]
        );
    }

    #[test]
    fn test_merged_values_with_listed_connector_attributes() {
        let context = context();
        let deps = PluginDependencies::new().connector_attributes("ldap", ["mail"]);

        let values = context.merged_values(&deps, "affiliation");
        assert_eq!(values, vec![AttributeValue::string("jsmith@example.org")]);
    }

    #[test]
    fn test_dependency_values_grouped() {
        let context = context();
        let deps = PluginDependencies::new()
            .attribute("affiliation")
            .connector("ldap");

        let grouped = context.dependency_values(&deps);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["affiliation"].len(), 2);
        assert_eq!(grouped["mail"].len(), 1);
    }

    #[test]
    fn test_missing_dependencies_contribute_nothing() {
        let context = ResolutionContext::new(RequestContext::new());
        let deps = PluginDependencies::new().attribute("uid").connector("ldap");
        assert!(context.merged_values(&deps, "uid").is_empty());
        assert!(context.dependency_values(&deps).is_empty());
    }
}
