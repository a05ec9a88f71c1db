//! Authorization resolution.
//!
//! [`authorize`] turns an [`IncomingRequest`] into an [`AuthorizationVerdict`]:
//! the credential is extracted from the highest-precedence location that
//! carries one, checked against the [`AuthorizedKeySet`], and tagged with the
//! channel it came from. The pipeline never fails; a rejected request is
//! simply a verdict with `authorized = false`.

pub mod extract;
pub mod keys;

pub use extract::{extract, CredentialSource, RawCandidate};
pub use keys::AuthorizedKeySet;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// The parts of an HTTP request that can carry a credential
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    /// Header values keyed by lowercased name
    headers: HashMap<String, String>,
    /// First non-blank value of each query parameter
    query: HashMap<String, String>,
    /// Client address, for log lines only
    client_addr: Option<String>,
}

impl IncomingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. The first value for a given name is kept.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
        self
    }

    /// Parse a raw (still percent-encoded) query string
    pub fn with_query(mut self, query: &str) -> Self {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.trim().is_empty() {
                continue;
            }
            self.query
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        self
    }

    pub fn with_client_addr(mut self, addr: impl Into<String>) -> Self {
        self.client_addr = Some(addr.into());
        self
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn client_addr(&self) -> &str {
        self.client_addr.as_deref().unwrap_or("unknown")
    }
}

/// Outcome of authorizing one request
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationVerdict {
    pub authorized: bool,
    pub source: CredentialSource,
    /// Never serialized and never logged
    #[serde(skip)]
    pub key: Option<String>,
    /// Set when the credential travelled in the URL
    pub insecure_transport: bool,
}

impl AuthorizationVerdict {
    pub fn key_present(&self) -> bool {
        self.key.is_some()
    }
}

impl fmt::Debug for AuthorizationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationVerdict")
            .field("authorized", &self.authorized)
            .field("source", &self.source)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("insecure_transport", &self.insecure_transport)
            .finish()
    }
}

/// Resolve the authorization verdict for a request
pub fn authorize(request: &IncomingRequest, keys: &AuthorizedKeySet) -> AuthorizationVerdict {
    let RawCandidate { source, key } = extract(request);
    let authorized = keys.validate(key.as_deref());
    let insecure_transport = source.is_query();

    debug!(%source, authorized, "Resolved authorization");

    if insecure_transport {
        warn!(
            %source,
            client = request.client_addr(),
            "Authorization key received in URL parameter - consider using headers for better security"
        );
    }

    if !authorized {
        if key.is_none() {
            info!(client = request.client_addr(), "Request denied: No authorization key provided");
        } else {
            info!(%source, client = request.client_addr(), "Request denied: Invalid authorization key");
        }
    }

    AuthorizationVerdict {
        authorized,
        source,
        key,
        insecure_transport,
    }
}
