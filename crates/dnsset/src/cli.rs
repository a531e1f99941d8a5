//! Clap derive structures for the `dnsset` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dnsset_core::RecordType;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dnsset -- point DNS address records at this host
#[derive(Debug, Parser)]
#[command(
    name = "dnsset",
    version,
    about = "Point DNS address records at this host",
    long_about = "Reads a set of domains (typed in or scanned from a Caddyfile), detects\n\
        this host's public address and creates or updates the A/AAAA records\n\
        at the DNS provider so they point at it.\n\n\
        Runs a single pass and exits. Anything not given on the command line\n\
        is asked for interactively."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested command, `sync` when none was given
    pub fn selected_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Sync(SyncArgs::default()))
    }
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (default: ~/.config/dnsset/config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Look everything up but make no changes at the provider
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass (default)
    Sync(SyncArgs),

    /// Show the address records currently published for domains
    #[command(alias = "ls")]
    List(ListArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    /// Domains to update, comma-separated
    #[arg(long, short = 'd', value_delimiter = ',', conflicts_with = "caddyfile")]
    pub domains: Vec<String>,

    /// Read domains from this Caddyfile
    #[arg(long)]
    pub caddyfile: Option<PathBuf>,

    /// Which fetched domains to update: `all` or 1-based positions like `1,3`
    #[arg(long, short = 's')]
    pub select: Option<String>,

    /// Where to detect the public address
    #[arg(long, short = 'i', value_enum)]
    pub ip_source: Option<IpSourceKind>,

    /// Only look at this network interface (with `--ip-source interface`)
    #[arg(long)]
    pub interface: Option<String>,

    /// Record types to manage
    #[arg(long, short = 't', value_enum)]
    pub record_types: Option<RecordTypeChoice>,

    /// Route traffic through the provider's proxy
    #[arg(long, conflicts_with = "dns_only")]
    pub proxied: bool,

    /// Resolve directly to this host
    #[arg(long)]
    pub dns_only: bool,

    /// Record TTL in seconds (0 = automatic)
    #[arg(long)]
    pub ttl: Option<u32>,
}

impl SyncArgs {
    /// Proxy flag from `--proxied`/`--dns-only`, if either was given
    pub fn proxy_choice(&self) -> Option<bool> {
        match (self.proxied, self.dns_only) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Domains to look up
    #[arg(required = true)]
    pub domains: Vec<String>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IpSourceKind {
    /// Address assigned to a local network interface
    Interface,
    /// Address reported by an external echo service (ip.sb)
    Api,
    /// Type the address in
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordTypeChoice {
    /// IPv4 (A) only
    A,
    /// IPv6 (AAAA) only
    Aaaa,
    /// Both IPv4 and IPv6
    Both,
}

impl RecordTypeChoice {
    pub fn record_types(self) -> Vec<RecordType> {
        match self {
            RecordTypeChoice::A => vec![RecordType::A],
            RecordTypeChoice::Aaaa => vec![RecordType::Aaaa],
            RecordTypeChoice::Both => vec![RecordType::A, RecordType::Aaaa],
        }
    }
}
