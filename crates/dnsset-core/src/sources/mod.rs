//! Built-in interactive sources
//!
//! The network-backed sources live in their own crates; the manual-entry
//! variants only need a [`LineReader`](crate::input::LineReader) and live here.

pub mod manual_domain;
pub mod manual_ip;

pub use manual_domain::ManualDomainSource;
pub use manual_ip::ManualIpSource;
