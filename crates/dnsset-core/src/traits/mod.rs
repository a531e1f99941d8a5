//! Core traits for dnsset
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: List, create and update address records via provider APIs
//! - [`IpSource`]: Determine the current IPv4 / IPv6 address
//! - [`DomainSource`]: Produce the candidate domain list

pub mod dns_provider;
pub mod domain_source;
pub mod ip_source;

pub use dns_provider::DnsProvider;
pub use domain_source::DomainSource;
pub use ip_source::IpSource;
