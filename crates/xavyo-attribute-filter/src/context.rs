//! Filtering context

use xavyo_attribute::{AttributeMap, RequestContext};

/// What policies see while filtering one request.
///
/// `attributes` is the unfiltered attribute set, so requirement rules can
/// look at values that end up withheld.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    request: &'a RequestContext,
    attributes: &'a AttributeMap,
}

impl<'a> FilterContext<'a> {
    pub fn new(request: &'a RequestContext, attributes: &'a AttributeMap) -> Self {
        Self {
            request,
            attributes,
        }
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    pub fn attributes(&self) -> &'a AttributeMap {
        self.attributes
    }
}
