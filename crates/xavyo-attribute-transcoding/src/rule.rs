//! Transcoding rules
//!
//! A rule ties an internal attribute id to one external representation: the
//! transcoder to use, the external naming properties, and when the rule
//! applies.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use xavyo_attribute::RequestContext;

use crate::transcoder::AttributeTranscoder;

/// Predicate deciding whether a rule applies to a request.
pub type ActivationCondition = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// How a rule names its transcoder.
#[derive(Clone)]
pub enum TranscoderRef {
    /// A ready transcoder.
    Instance(Arc<dyn AttributeTranscoder>),
    /// A factory tag, resolved when the rule is installed.
    Tag(String),
}

impl fmt::Debug for TranscoderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscoderRef::Instance(t) => f.debug_tuple("Instance").field(t).finish(),
            TranscoderRef::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
        }
    }
}

/// Where a scoped value's scope goes in SAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeEncoding {
    /// A separate `Scope` XML attribute.
    #[default]
    Attribute,
    /// Inline as `value@scope`.
    Inline,
}

/// One mapping between an internal attribute and an external representation.
#[derive(Clone)]
pub struct TranscodingRule {
    attribute_id: String,
    transcoder: TranscoderRef,
    name: Option<String>,
    name_format: Option<String>,
    friendly_name: Option<String>,
    namespace: Option<String>,
    encode_type: bool,
    scope_encoding: ScopeEncoding,
    as_array: bool,
    relying_parties: BTreeSet<String>,
    condition: Option<ActivationCondition>,
    display_names: BTreeMap<String, String>,
    display_descriptions: BTreeMap<String, String>,
}

impl TranscodingRule {
    pub fn new(transcoder: TranscoderRef) -> Self {
        Self {
            attribute_id: String::new(),
            transcoder,
            name: None,
            name_format: None,
            friendly_name: None,
            namespace: None,
            encode_type: true,
            scope_encoding: ScopeEncoding::default(),
            as_array: false,
            relying_parties: BTreeSet::new(),
            condition: None,
            display_names: BTreeMap::new(),
            display_descriptions: BTreeMap::new(),
        }
    }

    /// Rule using a ready transcoder.
    pub fn with_transcoder(transcoder: Arc<dyn AttributeTranscoder>) -> Self {
        Self::new(TranscoderRef::Instance(transcoder))
    }

    /// Rule using a factory tag.
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self::new(TranscoderRef::Tag(tag.into()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_name_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = Some(format.into());
        self
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    /// Set the SAML 1 attribute namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Whether SAML values carry an `xsi:type`. Defaults to true.
    pub fn with_encode_type(mut self, encode_type: bool) -> Self {
        self.encode_type = encode_type;
        self
    }

    pub fn with_scope_encoding(mut self, scope_encoding: ScopeEncoding) -> Self {
        self.scope_encoding = scope_encoding;
        self
    }

    /// Emit single-valued OIDC claims as arrays too.
    pub fn with_as_array(mut self, as_array: bool) -> Self {
        self.as_array = as_array;
        self
    }

    /// Limit the rule to these relying parties.
    pub fn with_relying_parties<I, S>(mut self, relying_parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relying_parties = relying_parties.into_iter().map(Into::into).collect();
        self
    }

    /// Add an explicit activation condition.
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
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
        self.display_descriptions.insert(lang.into(), description.into());
        self
    }

    /// Internal attribute id. Set when the rule is installed.
    pub fn attribute_id(&self) -> &str {
        &self.attribute_id
    }

    pub fn transcoder_ref(&self) -> &TranscoderRef {
        &self.transcoder
    }

    /// The transcoder, once the rule is installed.
    pub fn transcoder(&self) -> Option<&Arc<dyn AttributeTranscoder>> {
        match &self.transcoder {
            TranscoderRef::Instance(t) => Some(t),
            TranscoderRef::Tag(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn name_format(&self) -> Option<&str> {
        self.name_format.as_deref()
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn encode_type(&self) -> bool {
        self.encode_type
    }

    pub fn scope_encoding(&self) -> ScopeEncoding {
        self.scope_encoding
    }

    pub fn as_array(&self) -> bool {
        self.as_array
    }

    pub fn relying_parties(&self) -> &BTreeSet<String> {
        &self.relying_parties
    }

    pub fn display_names(&self) -> &BTreeMap<String, String> {
        &self.display_names
    }

    pub fn display_descriptions(&self) -> &BTreeMap<String, String> {
        &self.display_descriptions
    }

    /// Check whether the rule applies to a request.
    pub fn is_active(&self, request: &RequestContext) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(request))
    }

    /// Bind the rule to an attribute and transcoder, folding the
    /// relying-party set into the activation condition.
    pub(crate) fn install(
        mut self,
        attribute_id: &str,
        transcoder: Arc<dyn AttributeTranscoder>,
    ) -> Self {
        self.attribute_id = attribute_id.to_string();
        self.transcoder = TranscoderRef::Instance(transcoder);

        if !self.relying_parties.is_empty() {
            let relying_parties = Arc::new(self.relying_parties.clone());
            let explicit = self.condition.take();
            self.condition = Some(Arc::new(move |request: &RequestContext| {
                explicit.as_ref().map_or(true, |condition| condition(request))
                    && request
                        .requester_id()
                        .is_some_and(|requester| relying_parties.contains(requester))
            }));
        }
        self
    }
}

impl fmt::Debug for TranscodingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodingRule")
            .field("attribute_id", &self.attribute_id)
            .field("transcoder", &self.transcoder)
            .field("name", &self.name)
            .field("name_format", &self.name_format)
            .field("friendly_name", &self.friendly_name)
            .field("namespace", &self.namespace)
            .field("encode_type", &self.encode_type)
            .field("scope_encoding", &self.scope_encoding)
            .field("as_array", &self.as_array)
            .field("relying_parties", &self.relying_parties)
            .field("has_condition", &self.condition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oidc::OidcStringTranscoder;

    fn installed(rule: TranscodingRule) -> TranscodingRule {
        rule.install("mail", Arc::new(OidcStringTranscoder))
    }

    #[test]
    fn test_unconditional_rule_always_active() {
        let rule = installed(TranscodingRule::with_tag("oidc_string").with_name("email"));
        assert!(rule.is_active(&RequestContext::new()));
        assert_eq!(rule.attribute_id(), "mail");
        assert!(rule.transcoder().is_some());
    }

    #[test]
    fn test_relying_parties_and_condition_combined() {
        let rule = installed(
            TranscodingRule::with_tag("oidc_string")
                .with_name("email")
                .with_relying_parties(["https://sp.example.org", "https://rp.example.org"])
                .with_condition(|request| request.principal_name().is_some()),
        );

        let both = RequestContext::new()
            .with_requester("https://sp.example.org")
            .with_principal("jsmith");
        assert!(rule.is_active(&both));

        let no_principal = RequestContext::new().with_requester("https://sp.example.org");
        assert!(!rule.is_active(&no_principal));

        let other_rp = RequestContext::new()
            .with_requester("https://other.example.org")
            .with_principal("jsmith");
        assert!(!rule.is_active(&other_rp));

        assert!(!rule.is_active(&RequestContext::new().with_principal("jsmith")));
    }
}
