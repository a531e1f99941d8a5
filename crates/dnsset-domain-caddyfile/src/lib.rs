// # Caddyfile Domain Source
//
// Scans a Caddyfile for the site addresses it serves.
//
// ## Scanning Rules
//
// Only the text before the first `{` of a line is considered, so site
// blocks written as `example.com www.example.com {` are picked up, as are
// bare address lines. For each token (separated by whitespace or commas):
//
// 1. A leading `http://` or `https://` is removed
// 2. Port-only addresses (`:8080`) are dropped
// 3. A port suffix is removed (`example.com:443` → `example.com`)
// 4. Wildcards, IP literals and known directive keywords are dropped
// 5. What remains must be a valid domain name
//
// The result is de-duplicated and sorted.

use async_trait::async_trait;
use dnsset_core::traits::DomainSource;
use dnsset_core::{Domain, Error, Result};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Directive keywords that can appear before a `{` but are never site addresses
const DIRECTIVES: &[&str] = &[
    "root",
    "respond",
    "reverse_proxy",
    "proxy",
    "file_server",
    "encode",
    "header",
    "rewrite",
    "uri",
    "try_files",
    "basicauth",
    "request_header",
    "import",
    "log",
    "tls",
    "backend",
];

/// Domain source reading site addresses from a Caddyfile
#[derive(Debug, Clone)]
pub struct CaddyfileSource {
    path: PathBuf,
}

impl CaddyfileSource {
    /// Create a source for the Caddyfile at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DomainSource for CaddyfileSource {
    async fn get_domains(&self) -> Result<Vec<Domain>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open Caddyfile at {}: {e}", self.path.display()),
            ))
        })?;

        let domains = parse_domains(&contents);
        tracing::debug!(
            "Found {} domain(s) in {}",
            domains.len(),
            self.path.display()
        );

        if domains.is_empty() {
            return Err(Error::source_exhausted(format!(
                "no valid domains found in Caddyfile {}",
                self.path.display()
            )));
        }

        Ok(domains)
    }

    fn name(&self) -> String {
        format!("Caddyfile ({})", self.path.display())
    }
}

/// Extract site domains from Caddyfile text
///
/// Returns an empty list when nothing qualifies; the caller decides whether
/// that is an error.
pub fn parse_domains(contents: &str) -> Vec<Domain> {
    let mut domains = BTreeSet::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let head = line.split('{').next().unwrap_or_default();
        domains.extend(
            head.split(|c: char| c.is_whitespace() || c == ',')
                .filter_map(site_domain),
        );
    }

    domains.into_iter().collect()
}

/// Turn one address token into a domain, if it is one
fn site_domain(token: &str) -> Option<Domain> {
    let token = token
        .strip_prefix("https://")
        .or_else(|| token.strip_prefix("http://"))
        .unwrap_or(token);

    if token.is_empty() || token.starts_with(':') {
        return None;
    }

    let host = token.split(':').next().unwrap_or_default();
    if host.contains('*') || DIRECTIVES.contains(&host) || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    Domain::parse(host).ok()
}
