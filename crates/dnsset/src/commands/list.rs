//! `dnsset list`: show published address records

use std::sync::Arc;

use anyhow::Result;
use dnsset_core::traits::DnsProvider;
use dnsset_core::{DnsRecord, Domain, Orchestrator};

use super::App;
use crate::DnssetExitCode;
use crate::cli::ListArgs;

/// Print the A/AAAA records of each domain
///
/// A lookup failure for one domain is reported and the others are still
/// listed.
pub async fn run(app: &App, args: ListArgs) -> Result<DnssetExitCode> {
    let domains = args
        .domains
        .iter()
        .map(|name| Domain::parse(name.trim()))
        .collect::<dnsset_core::Result<Vec<_>>>()?;

    let (orchestrator, _events) = Orchestrator::new(Arc::clone(&app.provider), &app.config.engine)?;
    let auto_ttl = app.provider.auto_ttl();

    let mut failed = false;
    for domain in &domains {
        match orchestrator.list_records(domain).await {
            Ok(records) if records.is_empty() => println!("{domain}: no address records"),
            Ok(records) => {
                for record in &records {
                    println!("{}", format_record(record, auto_ttl));
                }
            }
            Err(e) => {
                eprintln!("{domain}: {e}");
                failed = true;
            }
        }
    }

    Ok(if failed {
        DnssetExitCode::PartialFailure
    } else {
        DnssetExitCode::Success
    })
}

fn format_record(record: &DnsRecord, auto_ttl: u32) -> String {
    let ttl = if record.ttl == auto_ttl {
        "auto".to_string()
    } else {
        record.ttl.to_string()
    };

    format!(
        "{:<4} {:<32} {:<39} ttl={:<6} {}",
        record.record_type.as_str(),
        record.name,
        record.content,
        ttl,
        if record.proxied { "proxied" } else { "dns-only" }
    )
}
