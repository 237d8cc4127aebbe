//! Variables extracted from a matched route.
use std::collections::HashMap;

use crate::core::url_parts::UrlParts;

/// Named values captured while aligning a URL against a route pattern.
///
/// Produced per successful match and owned by the caller; the middleware that
/// requested it drops it when the request completes.
#[derive(Debug, Clone)]
pub struct RouteVariables {
    /// `{name}` path captures (including a variable file extension), keyed by
    /// the variable name.
    pub path: HashMap<String, String>,
    /// Captured query values, keyed by the query parameter name.
    pub query: HashMap<String, String>,
    /// The decomposed request URL the capture ran against.
    pub url: UrlParts,
}

impl RouteVariables {
    pub(crate) fn new(url: UrlParts) -> Self {
        Self {
            path: HashMap::new(),
            query: HashMap::new(),
            url,
        }
    }
}
