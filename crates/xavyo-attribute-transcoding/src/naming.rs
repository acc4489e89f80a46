//! Canonical naming of external objects
//!
//! Reverse lookup needs a name for an external object. Each entry pairs a
//! type tag with the function computing that name, plus the other tags the
//! entry also serves. The effective type for a requested tag is the tag
//! itself when an entry is registered for it, otherwise the first entry, in
//! registration order, declaring it compatible.

use std::fmt;
use std::sync::Arc;

use crate::oidc::OidcClaim;
use crate::saml::{Saml1Attribute, SamlAttribute};
use crate::types::{EncodedAttribute, TypeTag};

/// Computes the canonical name of an external object.
pub type NamingFn = Arc<dyn Fn(&dyn EncodedAttribute) -> Option<String> + Send + Sync>;

#[derive(Clone)]
struct NamingEntry {
    tag: TypeTag,
    compatible: Vec<TypeTag>,
    naming: NamingFn,
}

/// Ordered naming functions keyed by type tag.
#[derive(Clone, Default)]
pub struct NamingRegistry {
    entries: Vec<NamingEntry>,
}

impl NamingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry naming the built-in SAML and OIDC types.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(TypeTag::SAML2_ATTRIBUTE, |obj| {
                obj.downcast_ref::<SamlAttribute>()
                    .map(SamlAttribute::canonical_name)
            })
            .register(TypeTag::SAML1_ATTRIBUTE, |obj| {
                obj.downcast_ref::<Saml1Attribute>()
                    .map(Saml1Attribute::canonical_name)
            })
            .register(TypeTag::OIDC_CLAIM, |obj| {
                obj.downcast_ref::<OidcClaim>().map(OidcClaim::canonical_name)
            })
    }

    /// Register a naming function for a tag.
    pub fn register<F>(self, tag: TypeTag, naming: F) -> Self
    where
        F: Fn(&dyn EncodedAttribute) -> Option<String> + Send + Sync + 'static,
    {
        self.register_compatible(tag, &[], naming)
    }

    /// Register a naming function that also serves other tags.
    pub fn register_compatible<F>(
        mut self,
        tag: TypeTag,
        compatible: &[TypeTag],
        naming: F,
    ) -> Self
    where
        F: Fn(&dyn EncodedAttribute) -> Option<String> + Send + Sync + 'static,
    {
        self.entries.push(NamingEntry {
            tag,
            compatible: compatible.to_vec(),
            naming: Arc::new(naming),
        });
        self
    }

    /// Resolve the effective type for a requested tag.
    pub fn effective_type(&self, requested: TypeTag) -> Option<TypeTag> {
        if self.entries.iter().any(|e| e.tag == requested) {
            return Some(requested);
        }
        self.entries
            .iter()
            .find(|e| e.compatible.contains(&requested))
            .map(|e| e.tag)
    }

    /// Get the effective type and canonical name of an external object.
    pub fn canonical_name(&self, encoded: &dyn EncodedAttribute) -> Option<(TypeTag, String)> {
        let effective = self.effective_type(encoded.type_tag())?;
        let entry = self.entries.iter().find(|e| e.tag == effective)?;
        (entry.naming)(encoded).map(|name| (effective, name))
    }

    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.entries.iter().map(|e| e.tag)
    }
}

impl fmt::Debug for NamingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| e.tag)).finish()
    }
}
