//! URL decomposition for route matching.
//!
//! Splits an absolute URL into the pieces the matching engine cares about:
//! origin, ordered path segments, an optional trailing file extension and a
//! decoded query map. Decomposition is a pure function of the input string;
//! no state is kept between calls.
//!
//! Segment boundaries are fixed *before* percent-decoding so that a decoded
//! `%2F` can never introduce a new segment.
use eyre::{Result, WrapErr};
use url::Url;

/// Decomposed view of an absolute URL.
///
/// Immutable after construction. `path_segments` never contains an empty
/// string and `file_extension` is only present when the last raw segment
/// contained a literal `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// `scheme://host[:port]`, used for same-origin checks. Default ports are
    /// omitted, matching what URL APIs report as an origin.
    pub origin: String,
    /// `/`-split, percent-decoded path segments with empty segments removed.
    pub path_segments: Vec<String>,
    /// Extension split off the last path segment, if it contained a `.`.
    pub file_extension: Option<String>,
    /// Decoded query parameters in document order.
    pub query: Vec<(String, String)>,
}

impl UrlParts {
    /// Decompose an absolute URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).wrap_err_with(|| format!("failed to parse URL '{raw}'"))?;
        Ok(Self::from_url(&url))
    }

    /// Decompose a URL that may be relative, resolving it against `base`.
    ///
    /// Route patterns are written as paths (`/area/{controller}`) and reuse
    /// this entry point with the route's origin as the base.
    pub fn parse_with_base(raw: &str, base: &str) -> Result<Self> {
        let base_url =
            Url::parse(base).wrap_err_with(|| format!("failed to parse base URL '{base}'"))?;
        let url = Url::options()
            .base_url(Some(&base_url))
            .parse(raw)
            .wrap_err_with(|| format!("failed to parse URL '{raw}' against base '{base}'"))?;
        Ok(Self::from_url(&url))
    }

    fn from_url(url: &Url) -> Self {
        let mut path_segments: Vec<String> = url
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode_component)
            .collect();

        // The extension belongs to the last segment only. "file.min.js"
        // yields base "file" and extension "min", the first two dot pieces.
        let mut file_extension = None;
        if let Some(last) = path_segments.last_mut() {
            if last.contains('.') {
                let mut pieces = last.split('.').map(str::trim);
                let base = pieces.next().unwrap_or_default().to_string();
                file_extension = pieces
                    .next()
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string);
                *last = base;
            }
        }

        let query = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Self {
            origin: origin_of(url),
            path_segments,
            file_extension,
            query,
        }
    }

    /// Look up a decoded query parameter by key (first occurrence).
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Build `scheme://host[:port]`, omitting the port when the URL carries none
/// explicitly (the `url` crate already drops default ports at parse time).
fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Percent-decode one path segment, keeping the raw text when the escape
/// sequence is not valid UTF-8.
fn decode_component(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_path_into_segments() {
        let parts = UrlParts::parse("http://www.example.com/a/b/c").unwrap();
        assert_eq!(parts.origin, "http://www.example.com");
        assert_eq!(parts.path_segments, vec!["a", "b", "c"]);
        assert!(parts.file_extension.is_none());
    }

    #[test]
    fn test_root_path_has_no_segments() {
        let parts = UrlParts::parse("http://example.com/").unwrap();
        assert!(parts.path_segments.is_empty());
        assert!(parts.file_extension.is_none());
    }

    #[test]
    fn test_empty_segments_are_removed() {
        let parts = UrlParts::parse("http://example.com//a///b/").unwrap();
        assert_eq!(parts.path_segments, vec!["a", "b"]);
    }

    #[test]
    fn test_file_extension_is_split_from_last_segment() {
        let parts = UrlParts::parse("http://example.com/js/app.js").unwrap();
        assert_eq!(parts.path_segments, vec!["js", "app"]);
        assert_eq!(parts.file_extension.as_deref(), Some("js"));
    }

    #[test]
    fn test_extension_takes_first_dot_pieces() {
        let parts = UrlParts::parse("http://example.com/app.min.js").unwrap();
        assert_eq!(parts.path_segments, vec!["app"]);
        assert_eq!(parts.file_extension.as_deref(), Some("min"));
    }

    #[test]
    fn test_dot_in_middle_segment_is_ignored() {
        let parts = UrlParts::parse("http://example.com/v1.2/data").unwrap();
        assert_eq!(parts.path_segments, vec!["v1.2", "data"]);
        assert!(parts.file_extension.is_none());
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let parts = UrlParts::parse("http://example.com/a%20b/%7Bid%7D").unwrap();
        assert_eq!(parts.path_segments, vec!["a b", "{id}"]);
    }

    #[test]
    fn test_query_pairs_are_decoded() {
        let parts = UrlParts::parse("http://example.com/x?a=1&name=j%20d").unwrap();
        assert_eq!(parts.query_get("a"), Some("1"));
        assert_eq!(parts.query_get("name"), Some("j d"));
        assert_eq!(parts.query_get("missing"), None);
    }

    #[test]
    fn test_explicit_port_kept_default_port_dropped() {
        let with_port = UrlParts::parse("http://example.com:8080/a").unwrap();
        assert_eq!(with_port.origin, "http://example.com:8080");

        let default_port = UrlParts::parse("http://example.com:80/a").unwrap();
        assert_eq!(default_port.origin, "http://example.com");
    }

    #[test]
    fn test_relative_path_resolves_against_base() {
        let parts = UrlParts::parse_with_base("/area/{id}", "http://www.example.com").unwrap();
        assert_eq!(parts.origin, "http://www.example.com");
        assert_eq!(parts.path_segments, vec!["area", "{id}"]);
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        assert!(UrlParts::parse("not a url").is_err());
    }
}
