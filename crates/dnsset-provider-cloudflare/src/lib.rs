// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 implementation of the
// `DnsProvider` capability used by dnsset.
//
// ## Behaviour
//
// - ✅ One HTTP request per capability call (record listing follows pagination)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error mapping for HTTP status codes (401/403, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ✅ Proxy flag support (`proxied`)
// - ❌ NO retry logic (a failure is surfaced once, verbatim)
// - ❌ NO caching (every zone lookup hits the API)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsset_core::record::{DnsRecord, RecordRequest, RecordType, Zone};
use dnsset_core::traits::DnsProvider;
use dnsset_core::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for record listings
const PER_PAGE: u32 = 100;

/// Provider name used in errors and logs
const PROVIDER: &str = "cloudflare";

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    ttl: u32,
    #[serde(default)]
    proxied: bool,
}

impl RecordResult {
    /// Convert to a core record; `None` for non-address types
    fn into_record(self) -> Option<DnsRecord> {
        let record_type = self.record_type.parse::<RecordType>().ok()?;
        Some(DnsRecord {
            id: self.id,
            name: self.name,
            record_type,
            content: self.content,
            ttl: self.ttl,
            proxied: self.proxied,
        })
    }
}

/// Body of create and update requests
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
}

impl<'a> From<&'a RecordRequest> for RecordPayload<'a> {
    fn from(request: &'a RecordRequest) -> Self {
        Self {
            record_type: request.record_type.as_str(),
            name: &request.name,
            content: &request.content,
            ttl: request.ttl,
            proxied: request.proxied,
        }
    }
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PUT payload
/// - **NOT** actually create or modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `dry_run`: If true, perform GET requests but skip writes
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: If the token is empty
    /// - `Err(Error::Transport)`: If the HTTP client cannot be built
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are simulated
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the v4 envelope
    ///
    /// # Parameters
    ///
    /// - `request`: The prepared request (auth is added here)
    /// - `context`: What the request does, for error messages
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("{context}: HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("{context}: failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, &body, context));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::rejected(PROVIDER, format!("{context}: failed to parse response: {e}"))
        })?;

        if !envelope.success {
            return Err(Error::rejected(
                PROVIDER,
                format!("{context}: {}", join_messages(&envelope.errors)),
            ));
        }

        Ok(envelope)
    }

    /// Record the provider would have returned for a write in dry-run mode
    fn simulated(&self, record_id: &str, request: &RecordRequest) -> DnsRecord {
        DnsRecord {
            id: record_id.to_string(),
            name: request.name.clone(),
            record_type: request.record_type,
            content: request.content.clone(),
            ttl: request.ttl,
            proxied: request.proxied.unwrap_or(false),
        }
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, body: &str, context: &str) -> Error {
    let detail = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .filter(|envelope| !envelope.errors.is_empty())
        .map(|envelope| join_messages(&envelope.errors))
        .unwrap_or_else(|| body.trim().to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{context}: invalid API token or insufficient permissions. Status: {status}"
        )),
        429 => Error::transport(format!(
            "{context}: rate limit exceeded. Status: {status}"
        )),
        500..=599 => Error::transport(format!(
            "{context}: Cloudflare server error: {status} - {detail}"
        )),
        _ => Error::rejected(PROVIDER, format!("{context}: {status} - {detail}")),
    }
}

fn join_messages(messages: &[ApiMessage]) -> String {
    if messages.is_empty() {
        return "request was not successful".to_string();
    }

    messages
        .iter()
        .map(|m| format!("{} (code {})", m.message, m.code))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn find_zones(&self, root: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Looking up Cloudflare zones named {}", root);

        let request = self.client.get(self.url("/zones")).query(&[("name", root)]);
        let envelope: Envelope<Vec<ZoneResult>> = self.send(request, "zone lookup").await?;

        Ok(envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|z| Zone { id: z.id, name: z.name })
            .collect())
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=www.example.com&type=A&per_page=100&page=1
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: Option<RecordType>,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!(
            "Listing records for {} (type: {})",
            name,
            record_type.map_or("any", RecordType::as_str)
        );

        let url = self.url(&format!("/zones/{zone_id}/dns_records"));
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let mut query = vec![
                ("name", name.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            if let Some(record_type) = record_type {
                query.push(("type", record_type.as_str().to_string()));
            }

            let request = self.client.get(&url).query(&query);
            let envelope: Envelope<Vec<RecordResult>> =
                self.send(request, "record lookup").await?;

            records.extend(
                envelope
                    .result
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(RecordResult::into_record)
                    .filter(|r| record_type.is_none_or(|t| r.record_type == t)),
            );

            match envelope.result_info {
                Some(info) if page < info.total_pages => page += 1,
                _ => break,
            }
        }

        tracing::debug!("Found {} record(s) for {}", records.len(), name);
        Ok(records)
    }

    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": false}
    /// ```
    async fn create_record(&self, zone_id: &str, request: &RecordRequest) -> Result<DnsRecord> {
        let payload = RecordPayload::from(request);
        let url = self.url(&format!("/zones/{zone_id}/dns_records"));

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(self.simulated("dry-run", request));
        }

        tracing::info!(
            "Creating Cloudflare {} record: {} -> {}",
            request.record_type,
            request.name,
            request.content
        );

        let envelope: Envelope<RecordResult> = self
            .send(self.client.post(&url).json(&payload), "record create")
            .await?;

        envelope
            .result
            .and_then(RecordResult::into_record)
            .ok_or_else(|| Error::rejected(PROVIDER, "record create: response carried no record"))
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": false}
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        let payload = RecordPayload::from(request);
        let url = self.url(&format!("/zones/{zone_id}/dns_records/{record_id}"));

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(self.simulated(record_id, request));
        }

        tracing::info!(
            "Updating Cloudflare {} record {}: {} -> {}",
            request.record_type,
            record_id,
            request.name,
            request.content
        );

        let envelope: Envelope<RecordResult> = self
            .send(self.client.put(&url).json(&payload), "record update")
            .await?;

        envelope
            .result
            .and_then(RecordResult::into_record)
            .ok_or_else(|| Error::rejected(PROVIDER, "record update: response carried no record"))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_proxy(&self) -> bool {
        true
    }
}
