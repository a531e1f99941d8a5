// # DNS Provider Trait
//
// Defines the port the reconciler is written against.
//
// ## Implementations
//
// - Cloudflare: `dnsset-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsset_core::{DnsProvider, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.find_zones("example.com").await?;
//     let records = provider
//         .list_records(&zones[0].id, "www.example.com", Some(RecordType::A))
//         .await?;
//
//     Ok(())
// }
// ```

use crate::record::{AUTO_TTL, DnsRecord, RecordRequest, RecordType, Zone};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Exposes exactly the operations reconciliation needs: zone lookup,
/// filtered record listing, record creation and record update.
///
/// # Error Conditions
///
/// Any call may fail with:
/// - [`Error::Transport`](crate::Error::Transport): network or HTTP failure
/// - [`Error::Authentication`](crate::Error::Authentication): invalid or expired credential
/// - [`Error::ProviderRejected`](crate::Error::ProviderRejected): the remote API refused the request
///
/// # Constraints
///
/// Providers are stateless adapters:
/// - ❌ No retry logic or backoff (a failed call is surfaced once)
/// - ❌ No caching between calls (records are read fresh every unit)
/// - ❌ No decision about whether an update is needed (owned by `RecordReconciler`)
/// - ✅ One API request per operation, or one per page for listings
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the zones matching a registrable root domain
    ///
    /// # Parameters
    ///
    /// - `root`: The reduced root (e.g. "example.com"), never a subdomain
    ///
    /// # Returns
    ///
    /// All matching zones, possibly empty
    async fn find_zones(&self, root: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List address records in a zone
    ///
    /// # Parameters
    ///
    /// - `zone_id`: The zone to search
    /// - `name`: Exact record name to match
    /// - `record_type`: Restrict to one type, or `None` for both A and AAAA
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: Option<RecordType>,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record
    ///
    /// # Returns
    ///
    /// The record as stored by the provider
    async fn create_record(
        &self,
        zone_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Overwrite an existing record
    ///
    /// # Parameters
    ///
    /// - `zone_id`: The zone owning the record
    /// - `record_id`: The record's provider-assigned ID
    /// - `request`: The new record contents
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for display only)
    fn provider_name(&self) -> &'static str;

    /// TTL value this provider uses for "automatic"
    fn auto_ttl(&self) -> u32 {
        AUTO_TTL
    }

    /// Whether records carry a meaningful proxy flag
    fn supports_proxy(&self) -> bool {
        false
    }
}
