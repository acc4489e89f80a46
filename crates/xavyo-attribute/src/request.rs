//! The ambient request
//!
//! Carries the parties involved in the request that triggered attribute
//! resolution. Plugins, matchers and transcoding activation conditions read
//! it; none of them mutate it.

use serde::{Deserialize, Serialize};

/// Request-level information available to the attribute pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Entity id of the relying party the attributes are released to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    /// Entity id of the issuer (this identity provider).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    /// Name of the authenticated principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
}

impl RequestContext {
    /// Create an empty request context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requester using builder pattern.
    pub fn with_requester(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = Some(requester_id.into());
        self
    }

    /// Set the issuer using builder pattern.
    pub fn with_issuer(mut self, issuer_id: impl Into<String>) -> Self {
        self.issuer_id = Some(issuer_id.into());
        self
    }

    /// Set the principal using builder pattern.
    pub fn with_principal(mut self, principal_name: impl Into<String>) -> Self {
        self.principal_name = Some(principal_name.into());
        self
    }

    /// Get the requester entity id.
    pub fn requester_id(&self) -> Option<&str> {
        self.requester_id.as_deref()
    }

    /// Get the issuer entity id.
    pub fn issuer_id(&self) -> Option<&str> {
        self.issuer_id.as_deref()
    }

    /// Get the authenticated principal name.
    pub fn principal_name(&self) -> Option<&str> {
        self.principal_name.as_deref()
    }
}
