//! # Attribute Model
//!
//! Protocol-neutral representation of identity attributes shared by the
//! resolver, the release filter and the transcoding registry.
//!
//! ## Crate Organization
//!
//! - [`value`] - Typed attribute values (`AttributeValue`)
//! - [`attribute`] - Attributes with ordered values and display metadata (`IdPAttribute`)
//! - [`request`] - The ambient request seen by plugins and matchers (`RequestContext`)
//! - [`error`] - Model validation errors
//!
//! ## Example
//!
//! ```
//! use xavyo_attribute::prelude::*;
//!
//! let attribute = IdPAttribute::new("eduPersonAffiliation")
//!     .unwrap()
//!     .with_values(["member", "staff"]);
//!
//! assert_eq!(attribute.values().len(), 2);
//! assert!(attribute.contains_value(&AttributeValue::string("staff")));
//! ```

pub mod attribute;
pub mod error;
pub mod request;
pub mod value;

pub use attribute::{AttributeMap, IdPAttribute};
pub use error::{AttributeError, AttributeResult};
pub use request::RequestContext;
pub use value::{AttributeValue, EmptyValue, OpaqueValue, ScopedValue};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::attribute::{AttributeMap, IdPAttribute};
    pub use crate::error::{AttributeError, AttributeResult};
    pub use crate::request::RequestContext;
    pub use crate::value::{AttributeValue, EmptyValue, OpaqueValue, ScopedValue};
}
