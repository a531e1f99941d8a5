//! Interactive prompts
//!
//! Menus and confirmations go through `dialoguer`, secrets through
//! `rpassword`. Everything the operator is asked is written to stderr so
//! stdout only carries the progress output of a pass.

use std::io::{BufRead, BufReader, Stderr, Stdin, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, Select};
use dnsset_core::LineReader;

/// Cloudflare API tokens are 40 characters long
const EXPECTED_TOKEN_LEN: usize = 40;

/// Map a dialoguer / interactive I/O failure into an error.
fn prompt_err(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("Prompt failed: {e}")
}

/// Ask the operator to pick one of `items`
///
/// # Returns
///
/// The index of the chosen item
pub fn select(prompt: &str, items: &[&str]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_err)
}

/// Ask for one line of free text (may be empty)
pub fn input(prompt: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)
}

// ── Line reader for manual sources ───────────────────────────────────

/// [`LineReader`] that shows prompts and refusals on a terminal
pub struct PromptReader<R, W> {
    input: R,
    output: W,
}

impl PromptReader<BufReader<Stdin>, Stderr> {
    /// Read from stdin, prompt on stderr
    pub fn terminal() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> PromptReader<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead + Send, W: Write + Send> LineReader for PromptReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> dnsset_core::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn reject(&mut self, input: &str, reason: &str) {
        let _ = writeln!(self.output, "  ✗ '{input}': {reason}");
    }
}

// ── API token ────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum TokenCheck {
    Ok,
    Empty,
    Short(usize),
}

fn check_token(token: &str) -> TokenCheck {
    match token.len() {
        0 => TokenCheck::Empty,
        len if len < EXPECTED_TOKEN_LEN => TokenCheck::Short(len),
        _ => TokenCheck::Ok,
    }
}

/// Ask for a Cloudflare API token with hidden input
///
/// An empty answer is an error. A token shorter than expected is only
/// accepted after the operator confirms it.
pub fn api_token() -> Result<String> {
    eprintln!();
    eprintln!("=== Cloudflare API Token Required ===");
    eprintln!("No API token found in the configuration or environment.");
    eprintln!();
    eprintln!("To create a token:");
    eprintln!("  1. Go to https://dash.cloudflare.com/profile/api-tokens");
    eprintln!("  2. Click 'Create Token'");
    eprintln!("  3. Grant the permissions Zone:Read and DNS:Edit");
    eprintln!();

    let token = rpassword::prompt_password("Enter your Cloudflare API token (input hidden): ")
        .map_err(prompt_err)?;
    let token = token.trim().to_string();

    match check_token(&token) {
        TokenCheck::Empty => bail!("API token cannot be empty"),
        TokenCheck::Short(len) => {
            eprintln!(
                "Warning: the token is {len} characters long, Cloudflare tokens usually have {EXPECTED_TOKEN_LEN}"
            );
            let proceed = Confirm::new()
                .with_prompt("Use this token anyway?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;
            if !proceed {
                bail!("API token setup cancelled");
            }
        }
        TokenCheck::Ok => {}
    }

    Ok(token)
}

// ── Caddyfile path ───────────────────────────────────────────────────

/// Resolve an operator-entered path against `cwd`
fn resolve_path(entered: &str, cwd: &Path) -> PathBuf {
    let path = Path::new(entered);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Make sure a Caddyfile exists, asking for another path if it does not
///
/// # Parameters
///
/// - `configured`: Path from configuration or the command line
///
/// # Returns
///
/// An existing path, or an error if the operator gave none
pub fn caddyfile_path(configured: &Path) -> Result<PathBuf> {
    if configured.exists() {
        return Ok(configured.to_path_buf());
    }

    eprintln!("Caddyfile not found at {}", configured.display());
    let entered = input("Enter the path to your Caddyfile")?;
    let entered = entered.trim();
    if entered.is_empty() {
        bail!("no Caddyfile path provided");
    }

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let path = resolve_path(entered, &cwd);
    if !path.exists() {
        bail!("Caddyfile not found at {}", path.display());
    }

    eprintln!("Using Caddyfile: {}", path.display());
    Ok(path)
}
