//! Address record types
//!
//! - [`RecordType`]: A (IPv4) or AAAA (IPv6)
//! - [`DnsRecord`]: a record as currently stored by the provider
//! - [`Zone`]: the provider-side grouping that owns records
//! - [`DesiredState`]: what one reconciliation unit should converge to

use crate::domain::Domain;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// TTL value the reference provider (Cloudflare) uses for "automatic"
pub const AUTO_TTL: u32 = 1;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// The version of a parsed address
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
    pub fn of(ip: &IpAddr) -> Self {
        match ip.to_canonical() {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Whether `ip` belongs to this version
    pub fn matches(self, ip: &IpAddr) -> bool {
        Self::of(ip) == self
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// DNS address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire representation ("A" or "AAAA")
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// The address family this record type carries
    pub fn ip_version(self) -> IpVersion {
        match self {
            RecordType::A => IpVersion::V4,
            RecordType::Aaaa => IpVersion::V6,
        }
    }

    /// Whether `ip` may be stored in a record of this type
    pub fn accepts(self, ip: &IpAddr) -> bool {
        self.ip_version().matches(ip)
    }
}

impl From<IpVersion> for RecordType {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::validation(format!(
                "unsupported record type '{other}' (expected A or AAAA)"
            ))),
        }
    }
}

/// A DNS record as currently stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record ID
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record content (string form of an address)
    pub content: String,
    /// TTL in seconds, where the provider's auto sentinel means automatic
    pub ttl: u32,
    /// Whether traffic is routed through the provider's proxy
    pub proxied: bool,
}

/// A provider-side zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned zone ID
    pub id: String,
    /// Zone name (registrable domain)
    pub name: String,
}

/// Payload for creating or updating an address record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record content
    pub content: String,
    /// Normalized TTL
    pub ttl: u32,
    /// Proxy flag, `None` for providers without proxy support
    pub proxied: Option<bool>,
}

/// Normalize a TTL for submission and comparison
///
/// An absent TTL or `0` becomes `auto` (the provider's automatic sentinel);
/// any positive value passes through unchanged. Normalizing an already
/// normalized value is a no-op.
pub fn normalize_ttl(ttl: Option<u32>, auto: u32) -> u32 {
    match ttl {
        None | Some(0) => auto,
        Some(seconds) => seconds,
    }
}

/// The state one reconciliation unit converges to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    domain: Domain,
    record_type: RecordType,
    address: IpAddr,
    ttl: Option<u32>,
    proxied: bool,
}

impl DesiredState {
    /// Create a desired state
    ///
    /// # Returns
    ///
    /// - `Err(Error::Validation)`: If `address` is not of the family
    ///   `record_type` carries (A with IPv6 or AAAA with IPv4)
    pub fn new(
        domain: Domain,
        record_type: RecordType,
        address: IpAddr,
        ttl: Option<u32>,
        proxied: bool,
    ) -> Result<Self> {
        let address = address.to_canonical();
        if !record_type.accepts(&address) {
            return Err(Error::validation(format!(
                "{record_type} record for {domain} cannot hold {} address {address}",
                IpVersion::of(&address)
            )));
        }

        Ok(Self {
            domain,
            record_type,
            address,
            ttl,
            proxied,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Requested TTL, `None` meaning automatic
    pub fn ttl(&self) -> Option<u32> {
        self.ttl
    }

    pub fn proxied(&self) -> bool {
        self.proxied
    }
}
