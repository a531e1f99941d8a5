//! Test doubles and common utilities for contract tests
//!
//! The mock provider keeps an in-memory record table and logs every call,
//! so tests can assert both the resulting remote state and the exact
//! sequence of provider calls.

#![allow(dead_code)]

use dnsset_core::error::{Error, Result};
use dnsset_core::record::{DnsRecord, RecordRequest, RecordType, Zone};
use dnsset_core::traits::{DnsProvider, DomainSource, IpSource};
use dnsset_core::Domain;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One call received by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindZones(String),
    ListRecords {
        zone_id: String,
        name: String,
        record_type: Option<RecordType>,
    },
    Create {
        zone_id: String,
        request: RecordRequest,
    },
    Update {
        zone_id: String,
        record_id: String,
        request: RecordRequest,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Create { .. } | Call::Update { .. })
    }
}

#[derive(Default)]
struct MockState {
    /// (lookup key, zone) pairs; `find_zones` returns every zone whose key matches
    zones: Vec<(String, Zone)>,
    /// (zone id, record) pairs
    records: Vec<(String, DnsRecord)>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    next_id: usize,
}

/// A mock DnsProvider with an in-memory record table
pub struct MockDnsProvider {
    state: Mutex<MockState>,
    supports_proxy: bool,
}

impl MockDnsProvider {
    /// A provider with proxy support and no zones
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            supports_proxy: true,
        }
    }

    /// Register a zone returned for lookups of its own name
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.with_zone_for(name, id, name)
    }

    /// Register a zone returned for lookups of `query`
    pub fn with_zone_for(self, query: &str, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push((
            query.to_string(),
            Zone {
                id: id.to_string(),
                name: name.to_string(),
            },
        ));
        self
    }

    /// Seed an existing record
    pub fn with_record(
        self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
        proxied: bool,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("seed-{}", state.next_id);
            state.records.push((
                zone_id.to_string(),
                DnsRecord {
                    id,
                    name: name.to_string(),
                    record_type,
                    content: content.to_string(),
                    ttl,
                    proxied,
                },
            ));
        }
        self
    }

    /// Make every record listing for `name` fail with a transport error
    pub fn failing_for(self, name: &str) -> Self {
        self.state.lock().unwrap().failing.insert(name.to_string());
        self
    }

    pub fn without_proxy_support(mut self) -> Self {
        self.supports_proxy = false;
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Create and update calls only
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    /// Current records for `name`
    pub fn records(&self, name: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|(_, r)| r.name == name)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_zones(&self, root: &str) -> Result<Vec<Zone>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FindZones(root.to_string()));
        Ok(state
            .zones
            .iter()
            .filter(|(query, _)| query.eq_ignore_ascii_case(root))
            .map(|(_, zone)| zone.clone())
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: Option<RecordType>,
    ) -> Result<Vec<DnsRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListRecords {
            zone_id: zone_id.to_string(),
            name: name.to_string(),
            record_type,
        });

        if state.failing.contains(name) {
            return Err(Error::transport(format!("simulated outage for {name}")));
        }

        Ok(state
            .records
            .iter()
            .filter(|(zone, r)| {
                zone == zone_id
                    && r.name == name
                    && record_type.is_none_or(|t| r.record_type == t)
            })
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(&self, zone_id: &str, request: &RecordRequest) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            zone_id: zone_id.to_string(),
            request: request.clone(),
        });

        state.next_id += 1;
        let record = DnsRecord {
            id: format!("rec-{}", state.next_id),
            name: request.name.clone(),
            record_type: request.record_type,
            content: request.content.clone(),
            ttl: request.ttl,
            proxied: request.proxied.unwrap_or(false),
        };
        state.records.push((zone_id.to_string(), record.clone()));
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            request: request.clone(),
        });

        let (_, record) = state
            .records
            .iter_mut()
            .find(|(zone, r)| zone == zone_id && r.id == record_id)
            .ok_or_else(|| Error::rejected("mock", format!("no record {record_id}")))?;

        record.content = request.content.clone();
        record.ttl = request.ttl;
        if let Some(proxied) = request.proxied {
            record.proxied = proxied;
        }
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn supports_proxy(&self) -> bool {
        self.supports_proxy
    }
}

/// An IpSource returning fixed answers
pub struct StaticIpSource {
    v4: Option<IpAddr>,
    v6: Option<IpAddr>,
    lookup_count: AtomicUsize,
}

impl StaticIpSource {
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
        Self {
            v4: v4.map(|ip| ip.parse().unwrap()),
            v6: v6.map(|ip| ip.parse().unwrap()),
            lookup_count: AtomicUsize::new(0),
        }
    }

    /// Number of get_ipv4/get_ipv6 calls
    pub fn lookup_count(&self) -> usize {
        self.lookup_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn get_ipv4(&self) -> Result<IpAddr> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.v4.ok_or_else(|| Error::no_address("no IPv4 address configured"))
    }

    async fn get_ipv6(&self) -> Result<IpAddr> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.v6.ok_or_else(|| Error::no_address("no IPv6 address configured"))
    }

    fn name(&self) -> String {
        "static".to_string()
    }
}

/// A DomainSource returning a fixed list
pub struct StaticDomainSource(pub Vec<Domain>);

impl StaticDomainSource {
    pub fn of(names: &[&str]) -> Self {
        Self(domains(names))
    }
}

#[async_trait::async_trait]
impl DomainSource for StaticDomainSource {
    async fn get_domains(&self) -> Result<Vec<Domain>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> String {
        "static".to_string()
    }
}

pub fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}

pub fn domains(names: &[&str]) -> Vec<Domain> {
    names.iter().map(|n| domain(n)).collect()
}
