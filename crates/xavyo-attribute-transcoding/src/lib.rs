//! # Attribute Transcoding
//!
//! Maps internal attributes to protocol representations (SAML 2, SAML 1,
//! OIDC claims) and back.
//!
//! A [`TranscodingRule`] binds an internal attribute id to a transcoder and
//! the external naming properties. The [`TranscoderRegistry`] indexes rules
//! by internal id and by the canonical external name, so the same rule
//! serves encoding and decoding.
//!
//! ## Crate Organization
//!
//! - [`types`] - Representation tags and the `EncodedAttribute` trait
//! - [`transcoder`] - The `AttributeTranscoder` trait
//! - [`rule`] - Transcoding rules and activation conditions
//! - [`naming`] - Canonical naming and effective type resolution
//! - [`factory`] - Transcoder factories keyed by tag
//! - [`registry`] - The transcoder registry
//! - [`saml`], [`oidc`] - Built-in representations and codecs
//! - [`config`] - Declarative rule configuration
//!
//! ## Example
//!
//! ```
//! use xavyo_attribute_transcoding::prelude::*;
//! use xavyo_attribute::{IdPAttribute, RequestContext};
//!
//! let registry = TranscoderRegistry::builder()
//!     .install("mail", [TranscodingRule::with_tag("oidc_string").with_name("email")])
//!     .build();
//!
//! let mail = IdPAttribute::new("mail").unwrap().with_values(["jsmith@example.org"]);
//! let claims = registry.encode(&RequestContext::new(), &mail, TypeTag::OIDC_CLAIM);
//! assert_eq!(claims.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod naming;
pub mod oidc;
pub mod registry;
pub mod rule;
pub mod saml;
pub mod transcoder;
pub mod types;

pub use config::{TranscodingConfig, TranscodingRuleConfig};
pub use error::{TranscodingConfigError, TranscodingError, TranscodingResult};
pub use factory::TranscoderFactories;
pub use naming::NamingRegistry;
pub use oidc::{OidcClaim, OidcStringTranscoder};
pub use registry::{TranscoderRegistry, TranscoderRegistryBuilder};
pub use rule::{ActivationCondition, ScopeEncoding, TranscoderRef, TranscodingRule};
pub use saml::{
    Saml1Attribute, Saml1StringTranscoder, Saml2Base64Transcoder, Saml2ScopedTranscoder,
    Saml2StringTranscoder, SamlAttribute, SamlAttributeValue,
};
pub use transcoder::AttributeTranscoder;
pub use types::{EncodedAttribute, TypeTag};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::TranscodingConfig;
    pub use crate::error::{TranscodingConfigError, TranscodingError, TranscodingResult};
    pub use crate::factory::TranscoderFactories;
    pub use crate::naming::NamingRegistry;
    pub use crate::oidc::OidcClaim;
    pub use crate::registry::{TranscoderRegistry, TranscoderRegistryBuilder};
    pub use crate::rule::{ScopeEncoding, TranscoderRef, TranscodingRule};
    pub use crate::saml::{Saml1Attribute, SamlAttribute, SamlAttributeValue};
    pub use crate::transcoder::AttributeTranscoder;
    pub use crate::types::{EncodedAttribute, TypeTag};
}
