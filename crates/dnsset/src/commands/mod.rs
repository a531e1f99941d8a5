//! Command handlers and the state they share

pub mod list;
pub mod sync;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dnsset_core::DnssetConfig;
use dnsset_core::config::default_config_path;
use dnsset_core::traits::DnsProvider;
use dnsset_provider_cloudflare::CloudflareProvider;
use tracing::{debug, info};

use crate::cli::GlobalOpts;
use crate::prompt;

/// Configuration and provider, ready for a command to use
pub struct App {
    pub config: DnssetConfig,
    pub provider: Arc<dyn DnsProvider>,
}

impl App {
    /// Load configuration, ask for a missing API token and build the provider
    ///
    /// # Parameters
    ///
    /// - `global`: Global command-line options
    /// - `dry_run`: Build the provider without write access
    pub fn init(global: &GlobalOpts, dry_run: bool) -> Result<Self> {
        let path = match &global.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        debug!("Loading configuration from {}", path.display());

        let mut config = DnssetConfig::load(Some(&path))?;
        config.validate()?;

        if !config.cloudflare.has_token() {
            let token = prompt::api_token()?;
            save_token(&path, &token)?;
            eprintln!("✓ API token saved to {}", path.display());
            config.cloudflare.api_token = token;
        }

        let provider = CloudflareProvider::new(config.cloudflare.api_token.clone(), dry_run)?;
        info!(
            "Using {} provider{}",
            provider.provider_name(),
            if dry_run { " (dry run)" } else { "" }
        );

        Ok(Self {
            config,
            provider: Arc::new(provider),
        })
    }
}

/// Store `token` in the config file at `path`
///
/// Only the file contents are rewritten, so values that came from the
/// environment are not persisted.
fn save_token(path: &Path, token: &str) -> Result<()> {
    let mut on_disk = DnssetConfig::from_file(path)?;
    on_disk.cloudflare.api_token = token.to_string();
    on_disk
        .save(path)
        .with_context(|| format!("failed to save API token to {}", path.display()))
}
