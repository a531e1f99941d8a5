// # IP Source Trait
//
// Defines the interface for determining the current public address.
//
// ## Implementations
//
// - Network interfaces: `dnsset-ip-netif` crate
// - External echo API: `dnsset-ip-http` crate
// - Manual entry: [`crate::sources::ManualIpSource`]
//
// ## Usage
//
// ```rust,ignore
// use dnsset_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let v4 = source.get_ipv4().await?;
//     println!("{} says {}", source.name(), v4);
//
//     Ok(())
// }
// ```

use crate::record::IpVersion;
use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// Each call probes once and yields a single address of the requested
/// family. Implementations must never return an address of the other
/// family; a probe that only finds the wrong family fails instead.
///
/// # Constraints
///
/// - ✅ Perform platform-specific or network I/O to find the address
/// - ✅ Bound every network call with a timeout
/// - ❌ Cache results between calls
/// - ❌ Retry on failure
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IPv4 address
    async fn get_ipv4(&self) -> Result<IpAddr, crate::Error>;

    /// Get the current IPv6 address
    async fn get_ipv6(&self) -> Result<IpAddr, crate::Error>;

    /// Human-readable source name
    fn name(&self) -> String;

    /// Get the current address of the given version
    async fn get(&self, version: IpVersion) -> Result<IpAddr, crate::Error> {
        match version {
            IpVersion::V4 => self.get_ipv4().await,
            IpVersion::V6 => self.get_ipv6().await,
        }
    }
}
