//! API base resolution and realtime endpoint URLs.
//!
//! The REST base (`https://host/api`) doubles as the root of the realtime
//! endpoint: its scheme is swapped for the WebSocket one and
//! `/topics/{id}/ws?token=...` is appended to its path.

use std::fmt;

use crate::error::ConnectionError;

/// Environment variable carrying the API base override.
pub const API_URL_ENV: &str = "DEVHUB_API_URL";

/// Validated API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    scheme: String,
    authority: String,
    /// Path without trailing slashes; empty for the root.
    path: String,
}

impl ApiBase {
    /// Parse an absolute `http`, `https`, `ws` or `wss` URL.
    ///
    /// Query and fragment are discarded. Trailing slashes are trimmed from the
    /// path.
    pub fn parse(url: &str) -> Result<Self, ConnectionError> {
        let invalid = |reason: &str| ConnectionError::InvalidEndpoint {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let Some((scheme, rest)) = url.trim().split_once("://") else {
            return Err(invalid("missing scheme"));
        };
        let scheme = scheme.to_ascii_lowercase();
        if !matches!(scheme.as_str(), "http" | "https" | "ws" | "wss") {
            return Err(invalid("unsupported scheme"));
        }

        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let (authority, path) = match rest.find('/') {
            Some(slash) => rest.split_at(slash),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            scheme,
            authority: authority.to_string(),
            path: path.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the base from an optional override and the page origin.
    ///
    /// An absolute override is used as is. A relative one is resolved against
    /// `origin` the way a browser resolves a link: `/api` replaces the path,
    /// `api` and `../api` are taken relative to the origin's directory.
    /// Without an override (or with a blank one) the base is the origin's
    /// host with the port stripped, suffixed `/api`.
    pub fn resolve(api_override: Option<&str>, origin: &str) -> Result<Self, ConnectionError> {
        let base = Self::parse(origin)?;

        match api_override.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) if value.contains("://") => Self::parse(value),
            Some(value) => {
                let value = value.split(['?', '#']).next().unwrap_or_default();
                let joined = if value.starts_with('/') {
                    value.to_string()
                } else {
                    format!("{}{value}", directory_of(origin))
                };
                Self::parse(&format!("{}://{}{}", base.scheme, base.authority, remove_dot_segments(&joined)))
            },
            None => Ok(Self {
                authority: strip_port(&base.authority).to_string(),
                path: "/api".to_string(),
                scheme: base.scheme,
            }),
        }
    }

    /// Host (and port, if any).
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path without trailing slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the realtime endpoint uses TLS.
    pub fn is_secure(&self) -> bool {
        matches!(self.scheme.as_str(), "https" | "wss")
    }

    /// WebSocket URL for a topic's realtime channel.
    pub fn topic_socket_url(&self, topic_id: &str, token: &str) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!(
            "{scheme}://{}{}/topics/{}/ws?token={}",
            self.authority,
            self.path,
            percent_encode(topic_id),
            percent_encode(token)
        )
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)
    }
}

/// Path of `url` up to and including its last `/`.
fn directory_of(url: &str) -> &str {
    let rest = url.trim().split_once("://").map_or("", |(_, rest)| rest);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let path = rest.find('/').map_or("", |slash| &rest[slash..]);
    match path.rfind('/') {
        Some(last) => &path[..=last],
        None => "/",
    }
}

/// Resolve `.` and `..` segments of an absolute path. `..` never climbs above
/// the root.
fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

fn strip_port(authority: &str) -> &str {
    let host_start = authority.rfind('@').map_or(0, |at| at + 1);
    let host = &authority[host_start..];

    if host.starts_with('[') {
        // IPv6 literal: the port follows the closing bracket.
        return match host.find(']') {
            Some(end) => &authority[..host_start + end + 1],
            None => authority,
        };
    }

    match host.rfind(':') {
        Some(colon) => &authority[..host_start + colon],
        None => authority,
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0f)]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_base_becomes_wss() {
        let base = ApiBase::parse("https://dvhub.tech/api").unwrap();
        assert_eq!(base.topic_socket_url("t1", "abc"), "wss://dvhub.tech/api/topics/t1/ws?token=abc");
    }

    #[test]
    fn http_base_becomes_ws_and_trailing_slashes_are_trimmed() {
        let base = ApiBase::parse("http://localhost:8080/api///").unwrap();
        assert_eq!(
            base.topic_socket_url("t1", "abc"),
            "ws://localhost:8080/api/topics/t1/ws?token=abc"
        );
    }

    #[test]
    fn token_is_percent_encoded() {
        let base = ApiBase::parse("http://h/api").unwrap();
        assert_eq!(base.topic_socket_url("t", "a b+c/="), "ws://h/api/topics/t/ws?token=a%20b%2Bc%2F%3D");
    }

    #[test]
    fn default_strips_port_and_appends_api() {
        let base = ApiBase::resolve(None, "http://localhost:5173").unwrap();
        assert_eq!(base.to_string(), "http://localhost/api");

        let blank = ApiBase::resolve(Some("  "), "https://[::1]:443").unwrap();
        assert_eq!(blank.to_string(), "https://[::1]/api");
    }

    #[test]
    fn relative_override_resolves_against_origin() {
        let base = ApiBase::resolve(Some("/backend/api/"), "https://app.example:8443/page").unwrap();
        assert_eq!(base.to_string(), "https://app.example:8443/backend/api");
    }

    #[test]
    fn bare_relative_override_joins_origin_directory() {
        let base = ApiBase::resolve(Some("api"), "https://h/app/").unwrap();
        assert_eq!(base.to_string(), "https://h/app/api");

        let from_page = ApiBase::resolve(Some("api"), "https://h/app/index.html?x=1").unwrap();
        assert_eq!(from_page.to_string(), "https://h/app/api");

        let from_root = ApiBase::resolve(Some("api/"), "http://localhost:8080").unwrap();
        assert_eq!(from_root.to_string(), "http://localhost:8080/api");
    }

    #[test]
    fn dot_segments_in_override_are_resolved() {
        let up = ApiBase::resolve(Some("../api"), "https://h/app/chat/").unwrap();
        assert_eq!(up.to_string(), "https://h/app/api");

        let clamped = ApiBase::resolve(Some("../../../api"), "https://h/app/").unwrap();
        assert_eq!(clamped.to_string(), "https://h/api");

        let here = ApiBase::resolve(Some("./api"), "https://h/app/").unwrap();
        assert_eq!(here.to_string(), "https://h/app/api");
    }

    #[test]
    fn absolute_override_wins() {
        let base = ApiBase::resolve(Some("https://api.example/v1"), "http://localhost:3000").unwrap();
        assert_eq!(base.to_string(), "https://api.example/v1");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(matches!(
            ApiBase::parse("ftp://host/api"),
            Err(ConnectionError::InvalidEndpoint { .. })
        ));
        assert!(ApiBase::parse("localhost/api").is_err());
    }
}
