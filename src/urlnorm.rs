//! Canonical URL identity for dedup comparisons.

use url::Url;

/// Canonical form of a URL used only for identity comparison, never for
/// navigation: scheme + authority + path, fragment and query dropped,
/// trailing slash stripped (the root path stays `/`).
///
/// An explicit port is preserved so `host:8080` and `host:9090` never
/// alias each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Normalize an absolute URL. Returns `None` when the input does not
    /// parse or has no host.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;

        let mut path = parsed.path().trim_end_matches('/').to_string();
        if path.is_empty() {
            path.push('/');
        }

        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Some(Self(format!("{}://{authority}{path}", parsed.scheme())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash_and_fragment() {
        let a = NormalizedUrl::parse("https://example.com/page/").unwrap();
        let b = NormalizedUrl::parse("https://example.com/page#section").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://example.com/page");
    }

    #[test]
    fn root_path_normalizes_to_slash() {
        let a = NormalizedUrl::parse("https://example.com").unwrap();
        let b = NormalizedUrl::parse("https://example.com/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://example.com/");
    }

    #[test]
    fn explicit_port_is_preserved() {
        let a = NormalizedUrl::parse("http://127.0.0.1:8080/docs").unwrap();
        let b = NormalizedUrl::parse("http://127.0.0.1:9090/docs").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn query_is_not_part_of_identity() {
        let a = NormalizedUrl::parse("https://example.com/p?page=2").unwrap();
        let b = NormalizedUrl::parse("https://example.com/p").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_relative_and_hostless_urls() {
        assert!(NormalizedUrl::parse("/relative/path").is_none());
        assert!(NormalizedUrl::parse("mailto:user@example.com").is_none());
    }
}
