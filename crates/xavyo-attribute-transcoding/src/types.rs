//! External representation types

use std::any::Any;
use std::fmt;

/// Names an external attribute representation.
///
/// Tags compare by their string, so consumers can define their own
/// representations next to the built-in ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// A SAML 2.0 `<Attribute>`.
    pub const SAML2_ATTRIBUTE: TypeTag = TypeTag("saml2:Attribute");
    /// A SAML 1.1 `<Attribute>`.
    pub const SAML1_ATTRIBUTE: TypeTag = TypeTag("saml1:Attribute");
    /// An OIDC claim.
    pub const OIDC_CLAIM: TypeTag = TypeTag("oidc:Claim");

    pub const fn new(name: &'static str) -> Self {
        TypeTag(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An attribute in an external representation.
pub trait EncodedAttribute: Send + Sync + fmt::Debug + 'static {
    /// The representation this object belongs to.
    fn type_tag(&self) -> TypeTag;

    /// Access the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn EncodedAttribute {
    /// Downcast to a concrete representation.
    pub fn downcast_ref<T: EncodedAttribute>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
