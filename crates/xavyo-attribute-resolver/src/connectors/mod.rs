//! Built-in data connectors
//!
//! `directory` and `relational` run templated searches through client traits
//! implemented by the host application; this crate never opens connections.

mod cache;
mod computed_id;
mod directory;
mod relational;
mod static_data;
mod template;

pub use cache::ResultCache;
pub use computed_id::{ComputedIdConnector, MIN_SALT_LENGTH};
pub use directory::{DirectoryClient, DirectoryConnector, DirectoryEntry};
pub use relational::{RelationalConnector, SqlClient, SqlRow};
pub use static_data::StaticConnector;
pub use template::{escape_ldap_filter, escape_sql, SearchTemplate};

/// Error type returned by host-supplied clients.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;
