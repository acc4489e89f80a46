//! Built-in attribute definitions

mod context_derived;
mod mapped;
mod principal_name;
mod regex_split;
mod scoped;
mod simple;

pub use context_derived::ContextDerivedDefinition;
pub use mapped::{MappedDefinition, ValueMapping};
pub use principal_name::PrincipalNameDefinition;
pub use regex_split::RegexSplitDefinition;
pub use scoped::ScopedDefinition;
pub use simple::SimpleDefinition;

use xavyo_attribute::{AttributeValue, IdPAttribute};

use crate::error::ResolutionResult;
use crate::settings::DefinitionSettings;

/// Build the attribute a definition produces.
pub(crate) fn build_attribute(
    settings: &DefinitionSettings,
    values: Vec<AttributeValue>,
) -> ResolutionResult<IdPAttribute> {
    let mut attribute = IdPAttribute::new(settings.id.as_str())?;
    attribute.set_values(values);
    Ok(attribute)
}
