//! Route pattern compilation and matching.
pub mod element;
pub mod route;
pub mod variables;

pub use element::{ElementKind, PatternElement};
pub use route::{MethodFilter, Route, RouteError, RouteSettings};
pub use variables::RouteVariables;
