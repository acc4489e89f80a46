//! Resolution engine
//!
//! Walks the plugin graph for one request: pre-requested definitions first,
//! then exporting data connectors, then the requested definitions. Each
//! plugin is resolved after its dependencies and at most once per request.

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use xavyo_attribute::AttributeMap;

use crate::context::{ResolutionContext, ResolvedAttributeDefinition, ResolvedDataConnector};
use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
use crate::failure::FailureTracker;
use crate::plugin::{AttributeDefinition, DataConnector};
use crate::settings::PluginDependencies;
use crate::validation::validate_graph;
use crate::values::post_process_values;

/// Builder for [`AttributeResolver`].
///
/// Plugins can only be added before `build`, which validates the graph.
#[must_use]
pub struct AttributeResolverBuilder {
    id: String,
    definitions: Vec<Arc<dyn AttributeDefinition>>,
    connectors: Vec<Arc<dyn DataConnector>>,
    strip_nulls: bool,
    suppress_display_information: bool,
}

impl AttributeResolverBuilder {
    /// Create a builder for a resolver with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definitions: Vec::new(),
            connectors: Vec::new(),
            strip_nulls: false,
            suppress_display_information: false,
        }
    }

    /// Add an attribute definition.
    pub fn definition(self, definition: impl AttributeDefinition + 'static) -> Self {
        self.definition_arc(Arc::new(definition))
    }

    /// Add a shared attribute definition.
    pub fn definition_arc(mut self, definition: Arc<dyn AttributeDefinition>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add a data connector.
    pub fn connector(self, connector: impl DataConnector + 'static) -> Self {
        self.connector_arc(Arc::new(connector))
    }

    /// Add a shared data connector.
    pub fn connector_arc(mut self, connector: Arc<dyn DataConnector>) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Drop empty values when finalizing attributes.
    pub fn strip_nulls(mut self, strip_nulls: bool) -> Self {
        self.strip_nulls = strip_nulls;
        self
    }

    /// Do not attach display names and descriptions from plugin settings.
    pub fn suppress_display_information(mut self, suppress: bool) -> Self {
        self.suppress_display_information = suppress;
        self
    }

    /// Validate the plugin graph and build the resolver.
    pub fn build(self) -> Result<AttributeResolver, ResolverConfigError> {
        let mut definitions = BTreeMap::new();
        for definition in self.definitions {
            let id = definition.id().to_string();
            if definitions.insert(id.clone(), definition).is_some() {
                return Err(ResolverConfigError::DuplicatePlugin { id });
            }
        }

        let mut connectors = BTreeMap::new();
        for connector in self.connectors {
            let id = connector.id().to_string();
            if connectors.insert(id.clone(), connector).is_some() {
                return Err(ResolverConfigError::DuplicatePlugin { id });
            }
        }

        validate_graph(&definitions, &connectors)?;

        debug!(
            resolver_id = %self.id,
            definitions = definitions.len(),
            connectors = connectors.len(),
            "Attribute resolver built"
        );

        let failures = FailureTracker::new(connectors.keys().cloned());
        Ok(AttributeResolver {
            id: self.id,
            definitions,
            connectors,
            failures,
            strip_nulls: self.strip_nulls,
            suppress_display_information: self.suppress_display_information,
        })
    }
}

/// Resolves attributes for requests.
///
/// Immutable after construction apart from per-connector failure instants,
/// and safe to share between concurrent requests.
pub struct AttributeResolver {
    id: String,
    definitions: BTreeMap<String, Arc<dyn AttributeDefinition>>,
    connectors: BTreeMap<String, Arc<dyn DataConnector>>,
    failures: FailureTracker,
    strip_nulls: bool,
    suppress_display_information: bool,
}

impl std::fmt::Debug for AttributeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeResolver")
            .field("id", &self.id)
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .field("connectors", &self.connectors.keys().collect::<Vec<_>>())
            .field("strip_nulls", &self.strip_nulls)
            .finish()
    }
}

impl AttributeResolver {
    /// Create a builder.
    pub fn builder(id: impl Into<String>) -> AttributeResolverBuilder {
        AttributeResolverBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn connector_ids(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    /// Last recorded failure of a data connector.
    pub fn last_failure(&self, connector_id: &str) -> Option<DateTime<Utc>> {
        self.failures.last(connector_id)
    }

    /// Clear the recorded failure of a data connector so it is retried.
    pub fn reset_failure(&self, connector_id: &str) {
        self.failures.reset(connector_id);
    }

    /// Resolve attributes into `context.resolved_attributes()`.
    ///
    /// Fails only when a data connector failure cannot be absorbed by
    /// failover and the connector propagates errors.
    pub async fn resolve(&self, context: &mut ResolutionContext) -> ResolutionResult<()> {
        debug!(
            resolver_id = %self.id,
            requester = ?context.request().requester_id(),
            principal = ?context.request().principal_name(),
            "Resolving attributes"
        );

        let pre_requested: Vec<String> = self
            .definitions
            .values()
            .filter(|d| d.settings().pre_requested)
            .map(|d| d.id().to_string())
            .collect();
        if !pre_requested.is_empty() {
            for id in &pre_requested {
                self.resolve_definition(context, id).await?;
            }
            let pre_resolved = self.finalize_definitions(context, true);
            trace!(count = pre_resolved.len(), "Pre-requested attributes resolved");
            context.set_pre_resolved_attributes(pre_resolved);
        }

        let exporting: Vec<String> = self
            .connectors
            .values()
            .filter(|c| c.settings().export.is_exporting())
            .map(|c| c.id().to_string())
            .collect();
        for id in &exporting {
            self.resolve_connector(context, id).await?;
        }

        let requested: Vec<String> = if context.requested_ids().is_empty() {
            self.definitions.keys().cloned().collect()
        } else {
            context.requested_ids().to_vec()
        };
        for id in &requested {
            self.resolve_definition(context, id).await?;
        }

        let mut released = self.finalize_definitions(context, false);
        self.merge_exported(context, &mut released);

        debug!(
            resolver_id = %self.id,
            released = released.len(),
            "Attribute resolution complete"
        );
        context.set_resolved_attributes(released);
        Ok(())
    }

    fn resolve_definition<'a>(
        &'a self,
        context: &'a mut ResolutionContext,
        id: &'a str,
    ) -> BoxFuture<'a, ResolutionResult<()>> {
        async move {
            if context.resolved_definition(id).is_some() {
                trace!(definition_id = %id, "Attribute definition already resolved");
                return Ok(());
            }
            let Some(definition) = self.definitions.get(id).cloned() else {
                debug!(definition_id = %id, "No attribute definition with this id");
                return Ok(());
            };

            self.resolve_dependencies(context, &definition.settings().dependencies)
                .await?;

            trace!(definition_id = %id, "Resolving attribute definition");
            let attribute = match definition.resolve(context).await {
                Ok(attribute) => attribute,
                Err(e) => {
                    warn!(
                        definition_id = %id,
                        error = %e,
                        "Attribute definition failed, omitting it"
                    );
                    None
                }
            };

            context.record_definition(ResolvedAttributeDefinition {
                definition_id: id.to_string(),
                attribute,
                dependency_only: definition.settings().dependency_only,
            });
            Ok(())
        }
        .boxed()
    }

    fn resolve_connector<'a>(
        &'a self,
        context: &'a mut ResolutionContext,
        id: &'a str,
    ) -> BoxFuture<'a, ResolutionResult<()>> {
        async move {
            if context.resolved_connector(id).is_some() {
                trace!(connector_id = %id, "Data connector already resolved");
                return Ok(());
            }
            let Some(connector) = self.connectors.get(id).cloned() else {
                debug!(connector_id = %id, "No data connector with this id");
                return Ok(());
            };
            let settings = connector.settings();

            if self
                .failures
                .in_no_retry_window(id, settings.no_retry_delay, Utc::now())
            {
                if let Some(failover_id) = &settings.failover_connector_id {
                    debug!(
                        connector_id = %id,
                        failover_id = %failover_id,
                        "Data connector inside no-retry window, using failover"
                    );
                    return self.resolve_failover(context, id, failover_id).await;
                }
                if settings.propagate_errors {
                    return Err(ResolutionError::NoRetryWindow {
                        connector_id: id.to_string(),
                    });
                }
                debug!(connector_id = %id, "Data connector inside no-retry window, skipping");
                context.record_connector(ResolvedDataConnector::empty(id));
                return Ok(());
            }

            self.resolve_dependencies(context, &settings.dependencies)
                .await?;

            trace!(connector_id = %id, "Resolving data connector");
            let outcome = connector.resolve(context).await.and_then(|attributes| {
                let attributes = attributes.filter(|a| !a.is_empty());
                if attributes.is_none() && settings.no_result_is_error {
                    Err(ResolutionError::no_result(id))
                } else {
                    Ok(attributes)
                }
            });

            match outcome {
                Ok(attributes) => {
                    context.record_connector(ResolvedDataConnector {
                        connector_id: id.to_string(),
                        resolved_by: id.to_string(),
                        attributes,
                    });
                    Ok(())
                }
                Err(e) => {
                    if e.is_source_failure() {
                        self.failures.record(id, Utc::now());
                        warn!(connector_id = %id, error = %e, "Data connector failed");
                    } else {
                        debug!(
                            connector_id = %id,
                            error = %e,
                            "Data connector produced no usable result"
                        );
                    }

                    if let Some(failover_id) = &settings.failover_connector_id {
                        return self.resolve_failover(context, id, failover_id).await;
                    }
                    if settings.propagate_errors {
                        return Err(e);
                    }
                    context.record_connector(ResolvedDataConnector::empty(id));
                    Ok(())
                }
            }
        }
        .boxed()
    }

    /// Resolve `failover_id` and record its result under `primary_id` too.
    async fn resolve_failover(
        &self,
        context: &mut ResolutionContext,
        primary_id: &str,
        failover_id: &str,
    ) -> ResolutionResult<()> {
        self.resolve_connector(context, failover_id).await?;

        let substitute = match context.resolved_connector(failover_id) {
            Some(resolved) => ResolvedDataConnector {
                connector_id: primary_id.to_string(),
                resolved_by: resolved.resolved_by.clone(),
                attributes: resolved.attributes.clone(),
            },
            None => ResolvedDataConnector::empty(primary_id),
        };
        debug!(
            connector_id = %primary_id,
            resolved_by = %substitute.resolved_by,
            "Recorded failover result"
        );
        context.record_connector(substitute);
        Ok(())
    }

    async fn resolve_dependencies(
        &self,
        context: &mut ResolutionContext,
        dependencies: &PluginDependencies,
    ) -> ResolutionResult<()> {
        for id in &dependencies.attributes {
            self.resolve_definition(context, id).await?;
        }
        for id in dependencies.connector_ids() {
            self.resolve_connector(context, id).await?;
        }
        Ok(())
    }

    /// Collect the resolved definitions' attributes.
    fn finalize_definitions(
        &self,
        context: &ResolutionContext,
        include_dependency_only: bool,
    ) -> AttributeMap {
        let mut released = AttributeMap::new();

        for resolved in context.resolved_definitions() {
            let Some(attribute) = &resolved.attribute else {
                trace!(
                    definition_id = %resolved.definition_id,
                    "Attribute definition produced nothing"
                );
                continue;
            };
            if resolved.dependency_only && !include_dependency_only {
                trace!(
                    definition_id = %resolved.definition_id,
                    "Attribute definition is dependency-only"
                );
                continue;
            }

            let mut attribute = attribute.clone();
            if !post_process_values(&mut attribute, self.strip_nulls) {
                debug!(attribute_id = %attribute.id(), "Attribute has no values, dropping it");
                continue;
            }

            if !self.suppress_display_information {
                if let Some(definition) = self.definitions.get(&resolved.definition_id) {
                    let settings = definition.settings();
                    if !settings.display_names.is_empty() {
                        attribute.set_display_names(settings.display_names.clone());
                    }
                    if !settings.display_descriptions.is_empty() {
                        attribute.set_display_descriptions(settings.display_descriptions.clone());
                    }
                }
            }

            released.insert(attribute.id().to_string(), attribute);
        }

        released
    }

    /// Add attributes exported by data connectors, never replacing a definition's attribute.
    fn merge_exported(&self, context: &ResolutionContext, released: &mut AttributeMap) {
        for connector in self.connectors.values() {
            let export = &connector.settings().export;
            if !export.is_exporting() {
                continue;
            }
            let Some(attributes) = context
                .resolved_connector(connector.id())
                .and_then(|r| r.attributes.as_ref())
            else {
                continue;
            };

            for (id, attribute) in attributes {
                if !export.exports(id) {
                    continue;
                }
                if released.contains_key(id) {
                    warn!(
                        connector_id = %connector.id(),
                        attribute_id = %id,
                        "Exported attribute collides with a resolved attribute, skipping it"
                    );
                    continue;
                }

                let mut attribute = attribute.clone();
                if !post_process_values(&mut attribute, self.strip_nulls) {
                    continue;
                }
                if !self.suppress_display_information {
                    let settings = connector.settings();
                    if let Some(names) = settings.display_names.get(id) {
                        attribute.set_display_names(names.clone());
                    }
                    if let Some(descriptions) = settings.display_descriptions.get(id) {
                        attribute.set_display_descriptions(descriptions.clone());
                    }
                }
                released.insert(id.clone(), attribute);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::StaticConnector;
    use crate::definitions::SimpleDefinition;
    use crate::settings::{ConnectorSettings, DefinitionSettings, ExportPolicy};
    use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

    fn static_connector(id: &str, attributes: &[(&str, &[&str])]) -> StaticConnector {
        exporting_connector(ConnectorSettings::new(id), attributes)
    }

    fn exporting_connector(
        settings: ConnectorSettings,
        attributes: &[(&str, &[&str])],
    ) -> StaticConnector {
        let map = attributes
            .iter()
            .map(|(name, values)| {
                let attribute = IdPAttribute::new(*name)
                    .unwrap()
                    .with_values(values.iter().copied());
                (name.to_string(), attribute)
            })
            .collect();
        StaticConnector::new(settings, map)
    }

    fn simple(id: &str, connector: &str) -> SimpleDefinition {
        SimpleDefinition::new(
            DefinitionSettings::new(id)
                .with_dependencies(PluginDependencies::new().connector(connector)),
        )
    }

    #[tokio::test]
    async fn test_resolves_all_definitions_without_hint() {
        let resolver = AttributeResolver::builder("test")
            .connector(static_connector(
                "static",
                &[("uid", &["jsmith"]), ("mail", &["jsmith@example.org"])],
            ))
            .definition(simple("uid", "static"))
            .definition(simple("mail", "static"))
            .build()
            .unwrap();

        let mut context = ResolutionContext::new(RequestContext::new());
        resolver.resolve(&mut context).await.unwrap();

        let released = context.resolved_attributes();
        assert_eq!(released.len(), 2);
        assert_eq!(
            released["uid"].values(),
            &[AttributeValue::string("jsmith")]
        );
    }

    #[tokio::test]
    async fn test_requested_ids_limit_resolution() {
        let resolver = AttributeResolver::builder("test")
            .connector(static_connector(
                "static",
                &[("uid", &["jsmith"]), ("mail", &["jsmith@example.org"])],
            ))
            .definition(simple("uid", "static"))
            .definition(simple("mail", "static"))
            .build()
            .unwrap();

        let mut context =
            ResolutionContext::new(RequestContext::new()).with_requested_ids(["mail", "unknown"]);
        resolver.resolve(&mut context).await.unwrap();

        assert_eq!(
            context.resolved_attributes().keys().collect::<Vec<_>>(),
            vec!["mail"]
        );
        assert!(context.resolved_definition("uid").is_none());
    }

    #[tokio::test]
    async fn test_display_information() {
        let definition = SimpleDefinition::new(
            DefinitionSettings::new("mail")
                .with_dependencies(PluginDependencies::new().connector("static"))
                .with_display_name("en", "E-mail"),
        );
        let build = |suppress: bool, definition: SimpleDefinition| {
            AttributeResolver::builder("test")
                .connector(static_connector("static", &[("mail", &["a@example.org"])]))
                .definition(definition)
                .suppress_display_information(suppress)
                .build()
                .unwrap()
        };

        let resolver = build(false, definition.clone());
        let mut context = ResolutionContext::new(RequestContext::new());
        resolver.resolve(&mut context).await.unwrap();
        assert_eq!(
            context.resolved_attributes()["mail"].display_name("en"),
            Some("E-mail")
        );

        let resolver = build(true, definition);
        let mut context = ResolutionContext::new(RequestContext::new());
        resolver.resolve(&mut context).await.unwrap();
        assert!(context.resolved_attributes()["mail"]
            .display_names()
            .is_empty());
    }

    #[tokio::test]
    async fn test_export_collision_keeps_definition() {
        let resolver = AttributeResolver::builder("test")
            .connector(exporting_connector(
                ConnectorSettings::new("static").with_export(ExportPolicy::All),
                &[("mail", &["exported@example.org"]), ("cn", &["John"])],
            ))
            .connector(static_connector("other", &[("mail", &["defined@example.org"])]))
            .definition(simple("mail", "other"))
            .build()
            .unwrap();

        let mut context = ResolutionContext::new(RequestContext::new());
        resolver.resolve(&mut context).await.unwrap();

        let released = context.resolved_attributes();
        assert_eq!(
            released["mail"].values(),
            &[AttributeValue::string("defined@example.org")]
        );
        assert_eq!(released["cn"].values(), &[AttributeValue::string("John")]);
    }

    #[tokio::test]
    async fn test_exported_display_information() {
        let build = |suppress: bool| {
            AttributeResolver::builder("test")
                .connector(exporting_connector(
                    ConnectorSettings::new("static")
                        .with_export(ExportPolicy::All)
                        .with_display_name("cn", "en", "Common name")
                        .with_display_description("cn", "en", "Full name"),
                    &[("cn", &["John"]), ("sn", &["Smith"])],
                ))
                .suppress_display_information(suppress)
                .build()
                .unwrap()
        };

        let mut context = ResolutionContext::new(RequestContext::new());
        build(false).resolve(&mut context).await.unwrap();
        let released = context.resolved_attributes();
        assert_eq!(released["cn"].display_name("en"), Some("Common name"));
        assert_eq!(
            released["cn"].display_descriptions().get("en").map(String::as_str),
            Some("Full name")
        );
        assert!(released["sn"].display_names().is_empty());

        let mut context = ResolutionContext::new(RequestContext::new());
        build(true).resolve(&mut context).await.unwrap();
        assert!(context.resolved_attributes()["cn"]
            .display_names()
            .is_empty());
    }

    #[test]
    fn test_duplicate_plugin_rejected() {
        let result = AttributeResolver::builder("test")
            .connector(static_connector("static", &[]))
            .definition(simple("uid", "static"))
            .definition(simple("uid", "static"))
            .build();
        assert!(matches!(
            result,
            Err(ResolverConfigError::DuplicatePlugin { ref id }) if id == "uid"
        ));
    }
}
