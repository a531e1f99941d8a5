// # HTTP IP Source
//
// This crate provides an external-API IP source for dnsset.
//
// ## Architecture
//
// Asks an echo service (ip.sb by default) for the address the request came
// from. There is one endpoint per IP version, so each endpoint only answers
// over its own family; a response of the wrong family is still rejected.
//
// Each call makes exactly one request, bounded by a 10 second timeout.
// Nothing is cached and nothing is retried.

use dnsset_core::record::IpVersion;
use dnsset_core::traits::IpSource;
use dnsset_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default IPv4 echo endpoint
pub const DEFAULT_IPV4_URL: &str = "https://api-ipv4.ip.sb/ip";

/// Default IPv6 echo endpoint
pub const DEFAULT_IPV6_URL: &str = "https://api-ipv6.ip.sb/ip";

/// Request timeout
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// External-API IP source
pub struct ApiIpSource {
    /// URL answering with the IPv4 address
    ipv4_url: String,

    /// URL answering with the IPv6 address
    ipv6_url: String,

    /// Display name, naming the service that is asked
    name: String,

    /// HTTP client
    client: reqwest::Client,
}

impl ApiIpSource {
    /// Create a source using the ip.sb endpoints
    ///
    /// # Returns
    ///
    /// - `Err(Error::Transport)`: If the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        let mut source = Self::with_endpoints(DEFAULT_IPV4_URL, DEFAULT_IPV6_URL)?;
        source.name = "External API (ip.sb)".to_string();
        Ok(source)
    }

    /// Create a source using custom endpoints
    ///
    /// # Parameters
    ///
    /// - `ipv4_url`: Endpoint returning the IPv4 address as plain text
    /// - `ipv6_url`: Endpoint returning the IPv6 address as plain text
    pub fn with_endpoints(ipv4_url: impl Into<String>, ipv6_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        let ipv4_url = ipv4_url.into();
        Ok(Self {
            name: endpoint_name(&ipv4_url),
            ipv4_url,
            ipv6_url: ipv6_url.into(),
            client,
        })
    }

    /// Fetch the address of `version` from its endpoint
    async fn fetch_ip(&self, version: IpVersion) -> Result<IpAddr> {
        let url = match version {
            IpVersion::V4 => &self.ipv4_url,
            IpVersion::V6 => &self.ipv6_url,
        };
        tracing::debug!("Fetching {} address from {}", version, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "HTTP error from {url}: {}",
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response from {url}: {e}")))?;

        parse_response(&ip_text, version)
    }
}

/// Display name for a custom endpoint, from its host
fn endpoint_name(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("External API ({host})"),
            None => "External API".to_string(),
        },
        Err(_) => "External API".to_string(),
    }
}

/// Parse an echo service body as an address of `version`
///
/// IPv4-mapped IPv6 answers (`::ffff:a.b.c.d`) are IPv4 and come back in
/// their plain IPv4 form.
pub fn parse_response(body: &str, version: IpVersion) -> Result<IpAddr> {
    let ip_text = body.trim();

    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| Error::invalid_response(format!("Invalid IP address: '{ip_text}'")))?;

    if !version.matches(&ip) {
        return Err(Error::invalid_response(format!(
            "Expected {version}, got: {ip}"
        )));
    }

    Ok(ip.to_canonical())
}

#[async_trait::async_trait]
impl IpSource for ApiIpSource {
    async fn get_ipv4(&self) -> Result<IpAddr> {
        self.fetch_ip(IpVersion::V4).await
    }

    async fn get_ipv6(&self) -> Result<IpAddr> {
        self.fetch_ip(IpVersion::V6).await
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
