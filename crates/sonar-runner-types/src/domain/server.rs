use crate::{Error, Result};
use std::fmt;
use std::net::IpAddr;

/// Base URL of the analysis server.
///
/// Trailing slashes are stripped on construction, so `http://host/` and
/// `http://host` compare equal, display the same, and join request paths
/// without producing `//`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerUrl(String);

impl ServerUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let Some((scheme, rest)) = trimmed.split_once("://") else {
            return Err(Error::InvalidServerUrl(raw.to_string()));
        };
        if !matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https") || rest.is_empty() {
            return Err(Error::InvalidServerUrl(raw.to_string()));
        }
        match reqwest::Url::parse(trimmed) {
            Ok(url) if url.host_str().is_some() => Ok(Self(trimmed.to_string())),
            _ => Err(Error::InvalidServerUrl(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a request path onto the base URL with exactly one separator.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Host part of the URL (without port or credentials).
    pub fn host(&self) -> &str {
        let rest = self.0.split_once("://").map(|(_, r)| r).unwrap_or(&self.0);
        let authority = rest.split('/').next().unwrap_or(rest);
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        if let Some(bracketed) = host_port.strip_prefix('[') {
            return bracketed.split(']').next().unwrap_or(bracketed);
        }
        host_port.split(':').next().unwrap_or(host_port)
    }

    pub fn is_loopback(&self) -> bool {
        let host = self.host();
        host.eq_ignore_ascii_case("localhost")
            || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ServerUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_ignored() {
        let plain = ServerUrl::parse("http://foo").unwrap();
        let slashed = ServerUrl::parse("http://foo/").unwrap();
        assert_eq!(plain, slashed);
        assert_eq!(slashed.to_string(), "http://foo");
        assert_eq!(slashed.join("/api/server/version"), "http://foo/api/server/version");
    }

    #[test]
    fn test_join_keeps_context_path() {
        let url = ServerUrl::parse("https://ci.example.com/sonar//").unwrap();
        assert_eq!(
            url.join("api/server/version"),
            "https://ci.example.com/sonar/api/server/version"
        );
    }

    #[test]
    fn test_rejects_missing_scheme() {
        assert!(ServerUrl::parse("localhost:9000").is_err());
        assert!(ServerUrl::parse("ftp://host").is_err());
        assert!(ServerUrl::parse("http://").is_err());
    }

    #[test]
    fn test_rejects_malformed_host() {
        let err = ServerUrl::parse("http://foo bar").unwrap_err();
        assert_eq!(err.to_string(), "Invalid server URL: 'http://foo bar'");
        assert!(ServerUrl::parse("http://foo:port").is_err());
    }

    #[test]
    fn test_host_extraction() {
        assert_eq!(ServerUrl::parse("http://foo").unwrap().host(), "foo");
        assert_eq!(
            ServerUrl::parse("http://user:pw@127.0.0.1:9000/sonar").unwrap().host(),
            "127.0.0.1"
        );
        assert_eq!(ServerUrl::parse("http://[::1]:9000").unwrap().host(), "::1");
        assert!(ServerUrl::parse("http://localhost:9000").unwrap().is_loopback());
        assert!(!ServerUrl::parse("http://foo").unwrap().is_loopback());
    }

    #[test]
    fn test_loopback_range() {
        assert!(ServerUrl::parse("http://127.0.0.2:9000").unwrap().is_loopback());
        assert!(ServerUrl::parse("http://[::1]:9000").unwrap().is_loopback());
        assert!(ServerUrl::parse("http://LOCALHOST").unwrap().is_loopback());
        assert!(!ServerUrl::parse("http://10.0.0.1").unwrap().is_loopback());
    }
}
