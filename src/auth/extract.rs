//! Credential extraction.
//!
//! Credentials may arrive in the `Authorization` header or, for clients that
//! cannot set headers, in the `key` or `auth` query parameters. Extractors are
//! tried in a fixed order and the first one that finds something wins, so a
//! request never yields more than one candidate.

use serde::Serialize;
use std::fmt;

use super::IncomingRequest;

/// Channel a credential was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CredentialSource {
    /// `Authorization: Bearer <token>`
    #[serde(rename = "header-bearer")]
    HeaderBearer,
    /// `Authorization: ApiKey <token>`
    #[serde(rename = "header-apikey")]
    HeaderApiKey,
    /// `Authorization: <token>`
    #[serde(rename = "header-raw")]
    HeaderRaw,
    /// `?key=<token>`
    #[serde(rename = "query-key")]
    QueryKey,
    /// `?auth=<token>`
    #[serde(rename = "query-auth")]
    QueryAuth,
    /// No credential anywhere
    #[serde(rename = "none")]
    None,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::HeaderBearer => "header-bearer",
            CredentialSource::HeaderApiKey => "header-apikey",
            CredentialSource::HeaderRaw => "header-raw",
            CredentialSource::QueryKey => "query-key",
            CredentialSource::QueryAuth => "query-auth",
            CredentialSource::None => "none",
        }
    }

    /// Query parameters end up in proxy logs and browser history
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            CredentialSource::QueryKey | CredentialSource::QueryAuth
        )
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted, not yet validated credential
#[derive(Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub source: CredentialSource,
    pub key: Option<String>,
}

impl RawCandidate {
    fn found(source: CredentialSource, key: &str) -> Self {
        Self {
            source,
            key: Some(key.to_string()),
        }
    }

    /// Candidate for a request that carried no credential
    pub fn none() -> Self {
        Self {
            source: CredentialSource::None,
            key: None,
        }
    }
}

impl fmt::Debug for RawCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCandidate")
            .field("source", &self.source)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

type Extractor = fn(&IncomingRequest) -> Option<RawCandidate>;

/// Extractors in precedence order. Every header variant outranks every
/// query parameter.
const EXTRACTORS: &[Extractor] = &[
    bearer_header,
    api_key_header,
    raw_header,
    key_query_param,
    auth_query_param,
];

/// Pull the highest-precedence credential out of a request
pub fn extract(request: &IncomingRequest) -> RawCandidate {
    EXTRACTORS
        .iter()
        .find_map(|extractor| extractor(request))
        .unwrap_or_else(RawCandidate::none)
}

/// Non-empty, trimmed `Authorization` header value
fn authorization(request: &IncomingRequest) -> Option<&str> {
    request
        .header("authorization")
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Token following `scheme` (case-insensitive) and whitespace, if any
fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let (word, rest) = value.split_once(char::is_whitespace)?;
    if !word.eq_ignore_ascii_case(scheme) {
        return None;
    }

    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

fn bearer_header(request: &IncomingRequest) -> Option<RawCandidate> {
    let token = strip_scheme(authorization(request)?, "Bearer")?;
    Some(RawCandidate::found(CredentialSource::HeaderBearer, token))
}

fn api_key_header(request: &IncomingRequest) -> Option<RawCandidate> {
    let token = strip_scheme(authorization(request)?, "ApiKey")?;
    Some(RawCandidate::found(CredentialSource::HeaderApiKey, token))
}

fn raw_header(request: &IncomingRequest) -> Option<RawCandidate> {
    let value = authorization(request)?;
    Some(RawCandidate::found(CredentialSource::HeaderRaw, value))
}

fn query_param<'a>(request: &'a IncomingRequest, name: &str) -> Option<&'a str> {
    request
        .query_param(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn key_query_param(request: &IncomingRequest) -> Option<RawCandidate> {
    let value = query_param(request, "key")?;
    Some(RawCandidate::found(CredentialSource::QueryKey, value))
}

fn auth_query_param(request: &IncomingRequest) -> Option<RawCandidate> {
    let value = query_param(request, "auth")?;
    Some(RawCandidate::found(CredentialSource::QueryAuth, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(value: &str) -> IncomingRequest {
        IncomingRequest::new().with_header("Authorization", value)
    }

    fn assert_candidate(request: &IncomingRequest, source: CredentialSource, key: &str) {
        let candidate = extract(request);
        assert_eq!(candidate.source, source);
        assert_eq!(candidate.key.as_deref(), Some(key));
    }

    #[test]
    fn test_bearer_header() {
        assert_candidate(
            &with_header("Bearer abc123"),
            CredentialSource::HeaderBearer,
            "abc123",
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_candidate(
            &with_header("bearer abc123"),
            CredentialSource::HeaderBearer,
            "abc123",
        );
        assert_candidate(
            &with_header("APIKEY abc123"),
            CredentialSource::HeaderApiKey,
            "abc123",
        );
    }

    #[test]
    fn test_api_key_header() {
        assert_candidate(
            &with_header("ApiKey abc123"),
            CredentialSource::HeaderApiKey,
            "abc123",
        );
    }

    #[test]
    fn test_raw_header() {
        assert_candidate(&with_header("abc123"), CredentialSource::HeaderRaw, "abc123");
        assert_candidate(
            &with_header("Basic dXNlcjpwYXNz"),
            CredentialSource::HeaderRaw,
            "Basic dXNlcjpwYXNz",
        );
    }

    #[test]
    fn test_scheme_without_token_is_raw() {
        assert_candidate(&with_header("Bearer   "), CredentialSource::HeaderRaw, "Bearer");
    }

    #[test]
    fn test_token_whitespace_is_trimmed() {
        assert_candidate(
            &with_header("  Bearer    abc123  "),
            CredentialSource::HeaderBearer,
            "abc123",
        );
        assert_candidate(&with_header("\tabc123 "), CredentialSource::HeaderRaw, "abc123");
    }

    #[test]
    fn test_blank_header_falls_through_to_query() {
        let request = with_header("   ").with_query("key=abc123");
        assert_candidate(&request, CredentialSource::QueryKey, "abc123");
    }

    #[test]
    fn test_header_outranks_query() {
        let request = with_header("Bearer wrong").with_query("key=abc123&auth=abc123");
        assert_candidate(&request, CredentialSource::HeaderBearer, "wrong");

        let request = with_header("abc123").with_query("key=other");
        assert_candidate(&request, CredentialSource::HeaderRaw, "abc123");
    }

    #[test]
    fn test_key_param_outranks_auth_param() {
        let request = IncomingRequest::new().with_query("auth=second&key=first");
        assert_candidate(&request, CredentialSource::QueryKey, "first");
    }

    #[test]
    fn test_auth_param() {
        let request = IncomingRequest::new().with_query("auth=abc123");
        assert_candidate(&request, CredentialSource::QueryAuth, "abc123");
    }

    #[test]
    fn test_empty_query_values_are_absent() {
        let request = IncomingRequest::new().with_query("key=&auth=abc123");
        assert_candidate(&request, CredentialSource::QueryAuth, "abc123");

        let request = IncomingRequest::new().with_query("key=%20%20");
        assert_eq!(extract(&request), RawCandidate::none());
    }

    #[test]
    fn test_query_values_are_percent_decoded() {
        let request = IncomingRequest::new().with_query("key=a%2Bb%3Dc");
        assert_candidate(&request, CredentialSource::QueryKey, "a+b=c");
    }

    #[test]
    fn test_nothing_present() {
        let candidate = extract(&IncomingRequest::new().with_query("other=1"));
        assert_eq!(candidate.source, CredentialSource::None);
        assert!(candidate.key.is_none());
    }

    #[test]
    fn test_extract_is_pure() {
        let request = with_header("ApiKey abc123").with_query("key=zzz");
        assert_eq!(extract(&request), extract(&request));
    }

    #[test]
    fn test_debug_redacts_key() {
        let candidate = extract(&with_header("Bearer sekrit"));
        let rendered = format!("{:?}", candidate);
        assert!(!rendered.contains("sekrit"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_value(CredentialSource::HeaderApiKey).unwrap(),
            serde_json::json!("header-apikey")
        );
        assert_eq!(
            serde_json::to_value(CredentialSource::None).unwrap(),
            serde_json::json!("none")
        );
        assert!(CredentialSource::QueryAuth.is_query());
        assert!(!CredentialSource::HeaderRaw.is_query());
    }
}
