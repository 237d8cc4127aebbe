//! Pattern element classification.
//!
//! One token of a route pattern (a path segment, the file-extension piece or
//! a query value) classifies into exactly one element kind. Classification is
//! deterministic and keeps the original casing; case-insensitive comparison
//! happens at match time.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::route::RouteError;

static VARIABLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([^{}]+)\}$").expect("variable token regex is valid"));

/// How a single pattern token participates in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Literal text, compared case-insensitively.
    Static,
    /// `{name}`: matches any one segment and captures it.
    Variable,
    /// `*`: matches any one segment without capturing.
    Wildcard,
    /// `**`: absorbs any number of segments (see the route walk).
    DoubleWildcard,
}

/// A classified pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternElement {
    kind: ElementKind,
    /// Literal value for Static/Wildcard/DoubleWildcard, captured variable
    /// name for Variable.
    value: String,
}

impl PatternElement {
    /// Classify one pattern token.
    ///
    /// Unbalanced or empty braces are configuration errors and fail here,
    /// at route construction time, rather than at match time.
    pub fn classify(token: &str) -> Result<Self, RouteError> {
        if let Some(captures) = VARIABLE_TOKEN.captures(token) {
            return Ok(Self {
                kind: ElementKind::Variable,
                value: captures[1].to_string(),
            });
        }

        if token.starts_with('{') && token.ends_with('}') {
            // Shaped like a variable but the regex rejected it: empty or
            // nested braces.
            return Err(RouteError::MalformedPattern {
                token: token.to_string(),
                reason: "variable tokens take the form {name}",
            });
        }
        if token.matches('{').count() != token.matches('}').count() {
            return Err(RouteError::MalformedPattern {
                token: token.to_string(),
                reason: "unbalanced '{' or '}'",
            });
        }

        let kind = match token {
            "*" => ElementKind::Wildcard,
            "**" => ElementKind::DoubleWildcard,
            _ => ElementKind::Static,
        };

        Ok(Self {
            kind,
            value: token.to_string(),
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Literal text or captured variable name, depending on the kind.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Test one URL token against this element.
    ///
    /// Static elements require case-insensitive equality; every other kind
    /// accepts any non-empty token.
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }

        match self.kind {
            ElementKind::Static => self.value.eq_ignore_ascii_case(candidate),
            _ => true,
        }
    }
}
