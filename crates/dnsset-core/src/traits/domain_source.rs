// # Domain Source Trait
//
// Defines the interface for producing the candidate domain list of a pass.
//
// ## Implementations
//
// - Caddyfile scan: `dnsset-domain-caddyfile` crate
// - Manual entry: [`crate::sources::ManualDomainSource`]

use crate::domain::Domain;
use async_trait::async_trait;

/// Trait for domain source implementations
///
/// # Contract
///
/// - Every returned entry is a valid [`Domain`]
/// - The list contains no duplicates
/// - An empty result is never returned: a source that finds nothing fails
///   with [`Error::SourceExhausted`](crate::Error::SourceExhausted)
#[async_trait]
pub trait DomainSource: Send + Sync {
    /// Fetch the deduplicated domain list
    async fn get_domains(&self) -> Result<Vec<Domain>, crate::Error>;

    /// Human-readable source name
    fn name(&self) -> String;
}
