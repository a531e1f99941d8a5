//! Pass engine
//!
//! The Orchestrator drives one end-to-end pass:
//! - Fetching the candidate domains from a DomainSource
//! - Probing the current address once per record type via an IpSource
//! - Reconciling every (domain, record type) unit via RecordReconciler
//! - Reporting progress as events and the result as a [`PassReport`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   domains   ┌──────────────┐   address   ┌─────────────┐
//! │ DomainSource │────────────▶│ Orchestrator │◀────────────│  IpSource   │
//! └──────────────┘             └──────────────┘             └─────────────┘
//!                                     │
//!                  ┌──────────────────┼──────────────────┐
//!                  │                  │                  │
//!                  ▼                  ▼                  ▼
//!         ┌─────────────────┐ ┌──────────────┐   ┌─────────────┐
//!         │ RecordReconciler│ │ DnsProvider  │   │   Events    │
//!         │ (per unit)      │ │ (list)       │   │  (notify)   │
//!         └─────────────────┘ └──────────────┘   └─────────────┘
//! ```
//!
//! ## Failure scope
//!
//! A unit failure is reported and the pass moves on to the next unit. An
//! address that cannot be obtained fails only the units of that record type.
//! Only an empty domain list or an empty record type selection aborts a pass.

use crate::config::EngineConfig;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::reconcile::{RecordReconciler, UnitStatus};
use crate::record::{DesiredState, DnsRecord, RecordType};
use crate::traits::{DnsProvider, DomainSource, IpSource};
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by the Orchestrator during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassEvent {
    /// Pass started
    PassStarted {
        domains: usize,
        record_types: Vec<RecordType>,
    },

    /// Address for a record type obtained
    AddressDetected {
        record_type: RecordType,
        address: IpAddr,
        source: String,
    },

    /// Address for a record type could not be obtained
    AddressUnavailable {
        record_type: RecordType,
        error: String,
    },

    /// Reconciliation of one unit started
    UnitStarted {
        domain: Domain,
        record_type: RecordType,
    },

    /// Reconciliation of one unit finished
    UnitFinished {
        domain: Domain,
        record_type: RecordType,
        status: UnitStatus,
    },

    /// Pass finished
    PassFinished {
        created: usize,
        updated: usize,
        unchanged: usize,
        failed: usize,
    },
}

/// What a pass should converge every selected domain to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPlan {
    /// Record types to manage, in processing order
    pub record_types: Vec<RecordType>,

    /// Proxy flag for every unit
    pub proxied: bool,

    /// Requested TTL, `None` (or 0) meaning automatic
    pub ttl: Option<u32>,
}

impl PassPlan {
    /// Plan with automatic TTL and proxying disabled
    pub fn new(record_types: Vec<RecordType>) -> Self {
        Self {
            record_types,
            proxied: false,
            ttl: None,
        }
    }

    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Address lookup result for one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressReport {
    pub record_type: RecordType,
    pub result: std::result::Result<IpAddr, String>,
}

/// Outcome of one (domain, record type) unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub domain: Domain,
    pub record_type: RecordType,
    pub status: UnitStatus,
}

/// Result of a complete pass
#[derive(Debug, Clone)]
pub struct PassReport {
    /// When the pass started
    pub started_at: DateTime<Utc>,

    /// When the pass finished
    pub finished_at: DateTime<Utc>,

    /// One entry per planned record type
    pub addresses: Vec<AddressReport>,

    /// One entry per (domain, record type), domain-major order
    pub units: Vec<UnitReport>,
}

impl PassReport {
    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Updated(_)))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed(_)))
    }

    /// Whether every address lookup and every unit succeeded
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.addresses.iter().all(|a| a.result.is_ok())
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }
}

/// Pass engine
///
/// Holds the single provider instance used for the run. Each pass is
/// strictly sequential: one provider call at a time, units in
/// domain-major order.
pub struct Orchestrator {
    provider: Arc<dyn DnsProvider>,
    reconciler: RecordReconciler,
    event_tx: mpsc::Sender<PassEvent>,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (orchestrator, event_receiver) where event_receiver yields pass events
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<PassEvent>)> {
        if config.event_channel_capacity == 0 {
            return Err(Error::config("engine.event_channel_capacity must be > 0"));
        }

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);
        let reconciler =
            RecordReconciler::new(Arc::clone(&provider)).with_options(config.reconcile_options());

        let orchestrator = Self {
            provider,
            reconciler,
            event_tx: tx,
        };

        Ok((orchestrator, rx))
    }

    /// The provider this orchestrator writes to
    pub fn provider(&self) -> &Arc<dyn DnsProvider> {
        &self.provider
    }

    /// Fetch the candidate domains from `source`
    ///
    /// Duplicates are dropped, keeping first-occurrence order.
    ///
    /// # Returns
    ///
    /// - `Err(Error::SourceExhausted)`: If the source produced no domains
    pub async fn fetch_domains(&self, source: &dyn DomainSource) -> Result<Vec<Domain>> {
        debug!("Fetching domains from {}", source.name());
        let fetched = source.get_domains().await?;

        let mut domains: Vec<Domain> = Vec::with_capacity(fetched.len());
        for domain in fetched {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }

        if domains.is_empty() {
            return Err(Error::source_exhausted(format!(
                "{} returned no domains",
                source.name()
            )));
        }

        info!("{} returned {} domain(s)", source.name(), domains.len());
        Ok(domains)
    }

    /// Run one pass over `domains`
    ///
    /// # Parameters
    ///
    /// - `domains`: Domains to reconcile
    /// - `ip_source`: Where the desired address comes from
    /// - `plan`: Record types, proxy flag and TTL
    ///
    /// # Returns
    ///
    /// - `Ok(PassReport)`: The pass ran; individual units may have failed
    /// - `Err(Error::SourceExhausted)`: No domains were given
    /// - `Err(Error::Validation)`: No record types were given
    pub async fn run_pass(
        &self,
        domains: &[Domain],
        ip_source: &dyn IpSource,
        plan: &PassPlan,
    ) -> Result<PassReport> {
        if domains.is_empty() {
            return Err(Error::source_exhausted("no domains selected"));
        }

        let mut record_types: Vec<RecordType> = Vec::with_capacity(plan.record_types.len());
        for record_type in &plan.record_types {
            if !record_types.contains(record_type) {
                record_types.push(*record_type);
            }
        }
        if record_types.is_empty() {
            return Err(Error::validation("no record types selected"));
        }

        let started_at = Utc::now();
        self.emit_event(PassEvent::PassStarted {
            domains: domains.len(),
            record_types: record_types.clone(),
        });

        // One probe per record type, shared by every domain
        let mut addresses = Vec::with_capacity(record_types.len());
        for &record_type in &record_types {
            addresses.push(self.probe(ip_source, record_type).await);
        }

        let mut units = Vec::with_capacity(domains.len() * record_types.len());
        for domain in domains {
            for address in &addresses {
                let status = match &address.result {
                    Ok(ip) => self.run_unit(domain, address.record_type, *ip, plan).await,
                    Err(reason) => {
                        debug!(
                            "Skipping {} record for {}: no address",
                            address.record_type, domain
                        );
                        UnitStatus::Failed(format!(
                            "no {} address available: {}",
                            address.record_type.ip_version(),
                            reason
                        ))
                    }
                };

                units.push(UnitReport {
                    domain: domain.clone(),
                    record_type: address.record_type,
                    status,
                });
            }
        }

        let report = PassReport {
            started_at,
            finished_at: Utc::now(),
            addresses,
            units,
        };

        info!(
            "Pass finished: {} created, {} updated, {} unchanged, {} failed",
            report.created(),
            report.updated(),
            report.unchanged(),
            report.failed()
        );
        self.emit_event(PassEvent::PassFinished {
            created: report.created(),
            updated: report.updated(),
            unchanged: report.unchanged(),
            failed: report.failed(),
        });

        Ok(report)
    }

    /// List every address record currently stored for `domain`
    pub async fn list_records(&self, domain: &Domain) -> Result<Vec<DnsRecord>> {
        let zone = self.reconciler.resolver().resolve(domain).await?;
        self.provider
            .list_records(&zone.id, domain.as_str(), None)
            .await
    }

    async fn probe(&self, ip_source: &dyn IpSource, record_type: RecordType) -> AddressReport {
        let version = record_type.ip_version();
        debug!("Probing {} address via {}", version, ip_source.name());

        match ip_source.get(version).await {
            Ok(address) => {
                info!("Detected {} address {} via {}", version, address, ip_source.name());
                self.emit_event(PassEvent::AddressDetected {
                    record_type,
                    address,
                    source: ip_source.name(),
                });
                AddressReport {
                    record_type,
                    result: Ok(address),
                }
            }
            Err(e) => {
                warn!("Could not obtain {} address from {}: {}", version, ip_source.name(), e);
                self.emit_event(PassEvent::AddressUnavailable {
                    record_type,
                    error: e.to_string(),
                });
                AddressReport {
                    record_type,
                    result: Err(e.to_string()),
                }
            }
        }
    }

    async fn run_unit(
        &self,
        domain: &Domain,
        record_type: RecordType,
        address: IpAddr,
        plan: &PassPlan,
    ) -> UnitStatus {
        self.emit_event(PassEvent::UnitStarted {
            domain: domain.clone(),
            record_type,
        });

        let status =
            match DesiredState::new(domain.clone(), record_type, address, plan.ttl, plan.proxied) {
                Ok(desired) => self.reconciler.reconcile(&desired).await.status(),
                Err(e) => {
                    warn!("Rejected unit {} {}: {}", domain, record_type, e);
                    UnitStatus::Failed(e.to_string())
                }
            };

        self.emit_event(PassEvent::UnitFinished {
            domain: domain.clone(),
            record_type,
            status: status.clone(),
        });

        status
    }

    /// Emit a pass event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: PassEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
