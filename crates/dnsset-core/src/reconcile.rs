//! Record reconciliation
//!
//! Given a [`DesiredState`] and the provider's current records for the same
//! (name, type), decide between create, update and no-op, and issue exactly
//! the provider calls that decision needs.
//!
//! ## Flow
//!
//! 1. Resolve the zone via [`ZoneResolver`]
//! 2. List records filtered by name and type
//! 3. Normalize the TTL once; the same value is compared and submitted
//! 4. No existing record → create
//! 5. Otherwise update every record whose content or proxy flag diverges

use crate::error::{Error, Result};
use crate::record::{DesiredState, DnsRecord, RecordRequest, normalize_ttl};
use crate::traits::DnsProvider;
use crate::zone::ZoneResolver;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of reconciling one (domain, record type) unit
#[derive(Debug)]
pub enum Outcome {
    /// No record existed; one was created
    Created,
    /// This many existing records diverged and were updated
    Updated(usize),
    /// Every existing record already matched; no provider write was made
    NoOpMatchedAll,
    /// The unit failed; nothing after the failing call was attempted
    Failed(Error),
}

impl Outcome {
    /// Whether the unit converged
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    /// A cloneable summary of this outcome
    pub fn status(&self) -> UnitStatus {
        match self {
            Outcome::Created => UnitStatus::Created,
            Outcome::Updated(count) => UnitStatus::Updated(*count),
            Outcome::NoOpMatchedAll => UnitStatus::Unchanged,
            Outcome::Failed(err) => UnitStatus::Failed(err.to_string()),
        }
    }
}

/// Cloneable summary of an [`Outcome`], carried by pass events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Created,
    Updated(usize),
    Unchanged,
    Failed(String),
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Created => f.write_str("created"),
            UnitStatus::Updated(1) => f.write_str("updated"),
            UnitStatus::Updated(count) => write!(f, "updated {count} records"),
            UnitStatus::Unchanged => f.write_str("already up to date"),
            UnitStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Tunables for the no-op comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Also update records whose TTL differs from the normalized desired TTL
    pub ttl_drift_triggers_update: bool,
}

/// Converges remote address records to a desired state
#[derive(Clone)]
pub struct RecordReconciler {
    provider: Arc<dyn DnsProvider>,
    resolver: ZoneResolver,
    options: ReconcileOptions,
}

impl RecordReconciler {
    /// Create a reconciler with default options
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            resolver: ZoneResolver::new(Arc::clone(&provider)),
            provider,
            options: ReconcileOptions::default(),
        }
    }

    /// Replace the comparison options
    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// The resolver used for zone lookups
    pub fn resolver(&self) -> &ZoneResolver {
        &self.resolver
    }

    /// Reconcile one unit
    ///
    /// Never returns an error directly: failures are reported as
    /// [`Outcome::Failed`] so that callers can continue with sibling units.
    pub async fn reconcile(&self, desired: &DesiredState) -> Outcome {
        match self.try_reconcile(desired).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Reconciling {} record for {} failed: {}",
                    desired.record_type(),
                    desired.domain(),
                    e
                );
                Outcome::Failed(e)
            }
        }
    }

    async fn try_reconcile(&self, desired: &DesiredState) -> Result<Outcome> {
        let zone = self.resolver.resolve(desired.domain()).await?;

        let existing = self
            .provider
            .list_records(
                &zone.id,
                desired.domain().as_str(),
                Some(desired.record_type()),
            )
            .await?;

        let request = RecordRequest {
            name: desired.domain().to_string(),
            record_type: desired.record_type(),
            content: desired.address().to_string(),
            ttl: normalize_ttl(desired.ttl(), self.provider.auto_ttl()),
            proxied: self
                .provider
                .supports_proxy()
                .then_some(desired.proxied()),
        };

        if existing.is_empty() {
            self.provider.create_record(&zone.id, &request).await?;
            info!(
                "Created {} record {} -> {}",
                request.record_type, request.name, request.content
            );
            return Ok(Outcome::Created);
        }

        let mut updated = 0;
        for record in &existing {
            if self.matches(record, desired.address(), &request) {
                debug!(
                    "Record {} ({}) already matches {}",
                    record.id, record.name, request.content
                );
                continue;
            }

            self.provider
                .update_record(&zone.id, &record.id, &request)
                .await?;
            info!(
                "Updated {} record {} -> {} (was: {})",
                request.record_type, request.name, request.content, record.content
            );
            updated += 1;
        }

        if updated == 0 {
            Ok(Outcome::NoOpMatchedAll)
        } else {
            Ok(Outcome::Updated(updated))
        }
    }

    fn matches(&self, record: &DnsRecord, address: IpAddr, request: &RecordRequest) -> bool {
        let content_matches = record.content == request.content
            || record
                .content
                .parse::<IpAddr>()
                .is_ok_and(|current| current.to_canonical() == address);
        let proxy_matches = request.proxied.is_none_or(|proxied| record.proxied == proxied);
        let ttl_matches = !self.options.ttl_drift_triggers_update
            || normalize_ttl(Some(record.ttl), self.provider.auto_ttl()) == request.ttl;

        content_matches && proxy_matches && ttl_matches
    }
}
