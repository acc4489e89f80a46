//! Transcoder factories
//!
//! Configuration names transcoders by tag. Each tag maps to a constructor
//! registered here, and unknown tags are rejected when configuration loads.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::oidc::OidcStringTranscoder;
use crate::saml::{
    Saml1StringTranscoder, Saml2Base64Transcoder, Saml2ScopedTranscoder, Saml2StringTranscoder,
};
use crate::transcoder::AttributeTranscoder;

pub const SAML2_STRING: &str = "saml2_string";
pub const SAML2_SCOPED: &str = "saml2_scoped";
pub const SAML2_BASE64: &str = "saml2_base64";
pub const SAML1_STRING: &str = "saml1_string";
pub const OIDC_STRING: &str = "oidc_string";

type Constructor = Arc<dyn Fn() -> Arc<dyn AttributeTranscoder> + Send + Sync>;

/// Tag to transcoder constructor map.
#[derive(Clone)]
pub struct TranscoderFactories {
    constructors: BTreeMap<String, Constructor>,
}

impl TranscoderFactories {
    /// Create a map with no tags.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register a constructor, replacing any previous one for the tag.
    pub fn register<F>(mut self, tag: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn AttributeTranscoder> + Send + Sync + 'static,
    {
        self.constructors.insert(tag.into(), Arc::new(constructor));
        self
    }

    /// Create a transcoder for a tag.
    pub fn create(&self, tag: &str) -> Option<Arc<dyn AttributeTranscoder>> {
        self.constructors.get(tag).map(|constructor| constructor())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl Default for TranscoderFactories {
    /// The built-in SAML and OIDC transcoders.
    fn default() -> Self {
        Self::empty()
            .register(SAML2_STRING, || Arc::new(Saml2StringTranscoder))
            .register(SAML2_SCOPED, || Arc::new(Saml2ScopedTranscoder))
            .register(SAML2_BASE64, || Arc::new(Saml2Base64Transcoder))
            .register(SAML1_STRING, || Arc::new(Saml1StringTranscoder))
            .register(OIDC_STRING, || Arc::new(OidcStringTranscoder))
    }
}

impl fmt::Debug for TranscoderFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.constructors.keys()).finish()
    }
}
