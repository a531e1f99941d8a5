//! `dnsset sync`: one reconciliation pass
//!
//! Every choice (domain source, selection, IP source, record types, proxy
//! mode) can come from a flag; whatever is missing is asked for.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dnsset_core::sources::{ManualDomainSource, ManualIpSource};
use dnsset_core::traits::{DnsProvider, DomainSource, IpSource};
use dnsset_core::{Domain, DomainSelection, Orchestrator, PassEvent, PassPlan, UnitStatus};
use dnsset_domain_caddyfile::CaddyfileSource;
use dnsset_ip_http::ApiIpSource;
use dnsset_ip_netif::InterfaceIpSource;
use tokio::sync::mpsc;
use tracing::warn;

use super::App;
use crate::DnssetExitCode;
use crate::cli::{IpSourceKind, RecordTypeChoice, SyncArgs};
use crate::prompt::{self, PromptReader};

const DOMAIN_SOURCES: &[&str] = &["Manual input", "Caddyfile"];
const IP_SOURCES: &[&str] = &["Network interface", "External API (ip.sb)", "Manual input"];
const RECORD_TYPES: &[&str] = &["IPv4 (A) only", "IPv6 (AAAA) only", "Both IPv4 and IPv6"];
const PROXY_MODES: &[&str] = &["DNS only (grey cloud)", "Proxied (yellow cloud)"];

/// Run one pass
///
/// # Returns
///
/// - `Ok(Success)`: Every unit converged
/// - `Ok(PartialFailure)`: The pass ran but an address or unit failed
/// - `Err(_)`: The pass was aborted before any record was touched
pub async fn run(app: &App, args: SyncArgs) -> Result<DnssetExitCode> {
    println!("=== dnsset - {} provider ===", app.provider.provider_name());

    let (orchestrator, events) = Orchestrator::new(Arc::clone(&app.provider), &app.config.engine)?;

    let source = domain_source(app, &args)?;
    let fetched = orchestrator.fetch_domains(source.as_ref()).await?;
    let domains = select_domains(fetched, args.select.as_deref())?;

    let ip_source = ip_source(&args)?;

    let record_types = match args.record_types {
        Some(choice) => choice,
        None => match prompt::select("Record types to update", RECORD_TYPES)? {
            0 => RecordTypeChoice::A,
            1 => RecordTypeChoice::Aaaa,
            _ => RecordTypeChoice::Both,
        },
    };

    let proxied = match args.proxy_choice() {
        Some(proxied) => proxied,
        None if app.provider.supports_proxy() => prompt::select("Proxy mode", PROXY_MODES)? == 1,
        None => false,
    };

    let plan = PassPlan::new(record_types.record_types())
        .with_proxied(proxied)
        .with_ttl(args.ttl.or(app.config.preferences.default_ttl));

    let printer = tokio::spawn(print_events(events));
    let result = orchestrator
        .run_pass(&domains, ip_source.as_ref(), &plan)
        .await;

    // Closes the event channel so the printer drains and exits
    drop(orchestrator);
    if let Err(e) = printer.await {
        warn!("Progress printer stopped: {}", e);
    }

    let report = result?;
    println!();
    println!(
        "DNS update completed! {} created, {} updated, {} unchanged, {} failed",
        report.created(),
        report.updated(),
        report.unchanged(),
        report.failed()
    );

    Ok(if report.is_clean() {
        DnssetExitCode::Success
    } else {
        DnssetExitCode::PartialFailure
    })
}

// ── Domains ──────────────────────────────────────────────────────────

/// Domains given with `--domains`
struct FlagDomainSource(Vec<Domain>);

impl FlagDomainSource {
    fn parse(names: &[String]) -> Result<Self> {
        let domains = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(Domain::parse)
            .collect::<dnsset_core::Result<Vec<_>>>()?;
        Ok(Self(domains))
    }
}

#[async_trait]
impl DomainSource for FlagDomainSource {
    async fn get_domains(&self) -> dnsset_core::Result<Vec<Domain>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> String {
        "Command line".to_string()
    }
}

fn domain_source(app: &App, args: &SyncArgs) -> Result<Box<dyn DomainSource>> {
    if !args.domains.is_empty() {
        return Ok(Box::new(FlagDomainSource::parse(&args.domains)?));
    }
    if let Some(path) = &args.caddyfile {
        return Ok(Box::new(CaddyfileSource::new(path.clone())));
    }

    match prompt::select("Where should domains come from?", DOMAIN_SOURCES)? {
        0 => {
            eprintln!("Enter domains, one per line (empty line to finish):");
            Ok(Box::new(ManualDomainSource::new(PromptReader::terminal())))
        }
        _ => {
            let path = prompt::caddyfile_path(&app.config.preferences.caddyfile_path)?;
            Ok(Box::new(CaddyfileSource::new(path)))
        }
    }
}

/// Narrow the fetched list to the domains the operator wants updated
fn select_domains(fetched: Vec<Domain>, answer: Option<&str>) -> Result<Vec<Domain>> {
    if fetched.len() == 1 {
        println!("Found domain: {}", fetched[0]);
        return Ok(fetched);
    }

    let answer = match answer {
        Some(answer) => answer.to_string(),
        None => {
            println!();
            println!("Found {} domains:", fetched.len());
            for (position, domain) in fetched.iter().enumerate() {
                println!("  {}. {}", position + 1, domain);
            }
            prompt::input("Select domains to update (comma-separated numbers, or 'all')")?
        }
    };

    let selection = DomainSelection::parse(&answer, fetched.len())?;
    Ok(selection.apply(fetched))
}

// ── Addresses ────────────────────────────────────────────────────────

fn ip_source(args: &SyncArgs) -> Result<Box<dyn IpSource>> {
    let kind = match args.ip_source {
        Some(kind) => kind,
        None => match prompt::select("How should the IP address be detected?", IP_SOURCES)? {
            0 => IpSourceKind::Interface,
            1 => IpSourceKind::Api,
            _ => IpSourceKind::Manual,
        },
    };

    let source: Box<dyn IpSource> = match kind {
        IpSourceKind::Interface => match &args.interface {
            Some(name) => Box::new(InterfaceIpSource::with_interface(name.clone())),
            None => Box::new(InterfaceIpSource::new()),
        },
        IpSourceKind::Api => Box::new(ApiIpSource::new()?),
        IpSourceKind::Manual => Box::new(ManualIpSource::new(PromptReader::terminal())),
    };
    Ok(source)
}

// ── Progress ─────────────────────────────────────────────────────────

async fn print_events(mut events: mpsc::Receiver<PassEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = describe(&event) {
            println!("{line}");
        }
    }
}

/// Progress line for an event, if it deserves one
fn describe(event: &PassEvent) -> Option<String> {
    match event {
        PassEvent::PassStarted {
            domains,
            record_types,
        } => {
            let types: Vec<&str> = record_types.iter().map(|t| t.as_str()).collect();
            Some(format!(
                "\nUpdating {} record(s) for {} domain(s)",
                types.join("/"),
                domains
            ))
        }
        PassEvent::AddressDetected {
            record_type,
            address,
            source,
        } => Some(format!(
            "Detected {record_type} address: {address} ({source})"
        )),
        PassEvent::AddressUnavailable { record_type, error } => {
            Some(format!("Failed to get {record_type} address: {error}"))
        }
        PassEvent::UnitFinished {
            domain,
            record_type,
            status: UnitStatus::Failed(reason),
        } => Some(format!(
            "  ✗ Failed to update {record_type} record for {domain}: {reason}"
        )),
        PassEvent::UnitFinished {
            domain,
            record_type,
            status,
        } => Some(format!("  ✓ {record_type} record for {domain}: {status}")),
        PassEvent::UnitStarted { .. } | PassEvent::PassFinished { .. } => None,
    }
}
