//! Client configuration: where the server is and how to reach it.

use url::Url;

use crate::error::RemoteError;

/// Scheme assumed when an address has none.
pub const DEFAULT_SCHEME: &str = "https";

/// Scheme assumed when a proxy address has none. Resolves names through
/// the proxy, which is what Tor expects.
pub const DEFAULT_PROXY_SCHEME: &str = "socks5h";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to a canary server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the server. Endpoint paths are joined onto its path.
    pub base_url: Url,
    /// Optional SOCKS5 proxy URL.
    pub proxy: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Build a configuration from a user-supplied address such as
    /// `localhost:8080`, `https://canary.example.org/proxy`, and an
    /// optional proxy such as `127.0.0.1:9050`.
    pub fn new(address: &str, proxy: Option<&str>) -> Result<Self, RemoteError> {
        Ok(Self {
            base_url: parse_address(address)?,
            proxy: proxy
                .filter(|p| !p.trim().is_empty())
                .map(|p| with_default_scheme(p.trim(), DEFAULT_PROXY_SCHEME)),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Parse a server address, assuming `https://` if no scheme is given.
pub fn parse_address(address: &str) -> Result<Url, RemoteError> {
    let full = with_default_scheme(address.trim(), DEFAULT_SCHEME);
    Url::parse(&full).map_err(|e| RemoteError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Join `path` onto the path of `address`.
///
/// `endpoint_url("localhost:8080/proxy", "submit")` is
/// `https://localhost:8080/proxy/submit`.
pub fn endpoint_url(address: &str, path: &str) -> Result<Url, RemoteError> {
    Ok(join_path(&parse_address(address)?, path))
}

pub(crate) fn join_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url
}

fn with_default_scheme(address: &str, scheme: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{scheme}://{address}")
    }
}
