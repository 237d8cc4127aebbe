//! Compiled route patterns.
//!
//! A [`Route`] compiles a pattern string such as
//! `/area/{controller}/{action}?tab={tab}` into classified path elements, an
//! optional file-extension element and per-key query elements. Compilation
//! reuses the URL decomposer, so patterns get the same percent-decoding and
//! extension splitting as incoming request URLs.
//!
//! Matching walks route and URL segments with two cursors and never
//! backtracks: a non-trailing `**` jumps the URL cursor so the remaining
//! route elements align with the URL tail. Ambiguous patterns with more than
//! one `**` are unsupported; the walk applies the skip rule to the first one
//! it reaches.
use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, Request};
use thiserror::Error;

use crate::core::{
    route::{ElementKind, PatternElement, RouteVariables},
    url_parts::UrlParts,
};

/// Route compilation failures. These are configuration errors raised while
/// the pipeline is being built, never per request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RouteError {
    /// A pattern token could not be classified.
    #[error("malformed pattern token '{token}': {reason}")]
    MalformedPattern {
        /// The offending token.
        token: String,
        /// Why classification rejected it.
        reason: &'static str,
    },

    /// The pattern string did not resolve to a URL against the route origin.
    #[error("pattern '{pattern}' is not a valid path against origin '{origin}': {source}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// The origin it was resolved against.
        origin: String,
        /// Underlying URL parse failure.
        #[source]
        source: eyre::Report,
    },
}

/// Which HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Accept every method.
    Any,
    /// Accept only the listed methods.
    Only(Vec<Method>),
}

/// Per-route configuration shared by `map`-style registrations.
#[derive(Debug, Clone)]
pub struct RouteSettings {
    pub methods: MethodFilter,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            methods: MethodFilter::Only(vec![Method::GET]),
        }
    }
}

impl RouteSettings {
    /// Restrict the route to the given methods.
    pub fn methods(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: MethodFilter::Only(methods.into_iter().collect()),
        }
    }

    /// Accept any HTTP method.
    pub fn any_method() -> Self {
        Self {
            methods: MethodFilter::Any,
        }
    }
}

/// A compiled URL pattern plus allowed methods.
///
/// Immutable after construction and shared read-only across every request it
/// is matched against.
#[derive(Debug, Clone)]
pub struct Route {
    /// The pattern as supplied at construction.
    pub pattern: String,
    origin: String,
    elements: Vec<PatternElement>,
    file_extension: Option<PatternElement>,
    query: HashMap<String, PatternElement>,
    methods: MethodFilter,
}

impl Route {
    /// Compile a pattern against an origin with default settings (`GET` only).
    pub fn new(pattern: &str, origin: &str) -> Result<Self, RouteError> {
        Self::with_settings(pattern, origin, RouteSettings::default())
    }

    /// Compile a pattern against an origin.
    ///
    /// Malformed patterns fail here, synchronously, so misconfiguration
    /// surfaces during activation rather than on a live request.
    pub fn with_settings(
        pattern: &str,
        origin: &str,
        settings: RouteSettings,
    ) -> Result<Self, RouteError> {
        let parts =
            UrlParts::parse_with_base(pattern, origin).map_err(|source| RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                origin: origin.to_string(),
                source,
            })?;

        let elements = parts
            .path_segments
            .iter()
            .map(|token| PatternElement::classify(token))
            .collect::<Result<Vec<_>, _>>()?;

        let file_extension = parts
            .file_extension
            .as_deref()
            .map(PatternElement::classify)
            .transpose()?;

        let mut query = HashMap::new();
        for (key, value) in &parts.query {
            query.insert(key.clone(), PatternElement::classify(value)?);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            origin: parts.origin,
            elements,
            file_extension,
            query,
            methods: settings.methods,
        })
    }

    /// Test a request against this route. Non-matches are the normal "try the
    /// next route" signal, never an error.
    pub fn is_match(&self, request: &Request<Bytes>) -> bool {
        if !self.allows_method(request.method()) {
            return false;
        }

        let Ok(url) = UrlParts::parse(&request.uri().to_string()) else {
            return false;
        };

        self.is_match_parts(&url)
    }

    /// Test an already-decomposed URL, skipping the method gate.
    pub fn is_match_parts(&self, url: &UrlParts) -> bool {
        if !self.origin.eq_ignore_ascii_case(&url.origin) {
            return false;
        }

        let tokens = &url.path_segments;
        let mut route_index = 0;
        let mut token_index = 0;
        let mut trailing_double_wildcard = false;

        while route_index < self.elements.len() && token_index < tokens.len() {
            let element = &self.elements[route_index];

            if element.kind() == ElementKind::DoubleWildcard {
                if route_index == self.elements.len() - 1 {
                    // Trailing `**` absorbs the rest of the URL.
                    trailing_double_wildcard = true;
                    break;
                }
                // Greedy-tail alignment: absorb everything except the final
                // N segments, where N is the number of route elements left.
                let remaining = self.elements.len() - route_index - 1;
                let Some(target) = tokens.len().checked_sub(remaining) else {
                    return false;
                };
                if target < token_index {
                    return false;
                }
                route_index += 1;
                token_index = target;
            } else if !element.matches(&tokens[token_index]) {
                return false;
            } else {
                route_index += 1;
                token_index += 1;
            }
        }

        // A `**` left as the only unconsumed route element absorbs zero
        // segments, e.g. /a/** against /a.
        if !trailing_double_wildcard
            && route_index + 1 == self.elements.len()
            && token_index == tokens.len()
        {
            trailing_double_wildcard =
                self.elements[route_index].kind() == ElementKind::DoubleWildcard;
        }

        if trailing_double_wildcard {
            return true;
        }

        if route_index != self.elements.len() || token_index != tokens.len() {
            return false;
        }

        let extension_ok = match (&self.file_extension, &url.file_extension) {
            (None, None) => true,
            (Some(element), Some(extension)) => element.matches(extension),
            _ => false,
        };
        if !extension_ok {
            return false;
        }

        // Every query element the route specifies must be present on the URL
        // with a matching value. An absent required key is a non-match,
        // consistent with the strictness of path matching.
        self.query.iter().all(|(key, element)| {
            url.query_get(key)
                .map(|value| element.matches(value))
                .unwrap_or(false)
        })
    }

    /// Extract named variables from a request.
    ///
    /// Re-walks the same alignment as [`Route::is_match`]; calling it on a
    /// non-matching request yields whatever partial captures the walk
    /// produces, so callers must gate on `is_match` first.
    pub fn get_variables(&self, request: &Request<Bytes>) -> RouteVariables {
        let url = UrlParts::parse(&request.uri().to_string()).unwrap_or(UrlParts {
            origin: String::new(),
            path_segments: Vec::new(),
            file_extension: None,
            query: Vec::new(),
        });
        self.get_variables_parts(url)
    }

    /// Extract variables from an already-decomposed URL.
    pub fn get_variables_parts(&self, url: UrlParts) -> RouteVariables {
        let mut variables = RouteVariables::new(url);
        let tokens = variables.url.path_segments.clone();

        let mut route_index = 0;
        let mut token_index = 0;

        while route_index < self.elements.len() && token_index < tokens.len() {
            let element = &self.elements[route_index];

            if element.kind() == ElementKind::DoubleWildcard {
                if route_index == self.elements.len() - 1 {
                    // Trailing `**`: nothing further to capture.
                    return variables;
                }
                let remaining = self.elements.len() - route_index - 1;
                let Some(target) = tokens.len().checked_sub(remaining) else {
                    return variables;
                };
                if target < token_index {
                    return variables;
                }
                route_index += 1;
                token_index = target;
                continue;
            }

            if element.kind() == ElementKind::Variable {
                variables
                    .path
                    .insert(element.value().to_string(), tokens[token_index].clone());
            }

            route_index += 1;
            token_index += 1;
        }

        if route_index + 1 == self.elements.len() && token_index == tokens.len() {
            // Zero-absorb trailing `**`.
            return variables;
        }

        if let Some(element) = &self.file_extension {
            if element.kind() == ElementKind::Variable {
                if let Some(extension) = &variables.url.file_extension {
                    variables
                        .path
                        .insert(element.value().to_string(), extension.clone());
                }
            }
        }

        for (key, element) in &self.query {
            if element.kind() == ElementKind::Variable {
                if let Some(value) = variables.url.query_get(key) {
                    let value = value.to_string();
                    variables.query.insert(key.clone(), value);
                }
            }
        }

        variables
    }

    fn allows_method(&self, method: &Method) -> bool {
        match &self.methods {
            MethodFilter::Any => true,
            MethodFilter::Only(methods) => methods.contains(method),
        }
    }
}
