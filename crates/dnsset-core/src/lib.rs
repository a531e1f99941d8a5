// # dnsset-core
//
// Core library for reconciling DNS address records with the host's address.
//
// ## Architecture Overview
//
// This library provides the core functionality for one-shot DNS updates:
// - **DomainSource**: Trait for producing the candidate domain list
// - **IpSource**: Trait for determining the current IPv4 / IPv6 address
// - **DnsProvider**: Trait for listing, creating and updating records via provider APIs
// - **ZoneResolver**: Maps a domain to the provider zone that owns it
// - **RecordReconciler**: Decides create / update / no-op for one (domain, type) unit
// - **Orchestrator**: Drives a pass over every selected unit and reports outcomes
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Capability-Based**: The engine only depends on the three traits, never a concrete variant
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Records that already match are never written

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod input;
pub mod reconcile;
pub mod record;
pub mod selection;
pub mod sources;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::DnssetConfig;
pub use domain::{Domain, reduce_to_root};
pub use engine::{Orchestrator, PassEvent, PassPlan, PassReport};
pub use error::{Error, Result};
pub use input::{BufLineReader, LineReader};
pub use reconcile::{Outcome, ReconcileOptions, RecordReconciler, UnitStatus};
pub use record::{DesiredState, DnsRecord, IpVersion, RecordRequest, RecordType, Zone};
pub use selection::DomainSelection;
pub use traits::{DnsProvider, DomainSource, IpSource};
pub use zone::ZoneResolver;
