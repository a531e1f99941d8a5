// # Manual IP Source
//
// Asks the operator to type the address.
//
// The read-validate-retry cycle is bounded: a blank line or end of input
// ends it immediately, and at most `max_attempts` invalid entries are
// accepted before giving up.

use crate::error::{Error, Result};
use crate::input::LineReader;
use crate::record::IpVersion;
use crate::traits::IpSource;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Mutex;
use tracing::debug;

/// Default number of invalid entries tolerated per request
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// IP source that reads the address from a [`LineReader`]
pub struct ManualIpSource {
    reader: Mutex<Box<dyn LineReader>>,
    max_attempts: usize,
}

impl ManualIpSource {
    /// Create a manual source reading from `reader`
    pub fn new(reader: impl LineReader + 'static) -> Self {
        Self {
            reader: Mutex::new(Box::new(reader)),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the number of invalid entries tolerated per request
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn prompt_for(&self, version: IpVersion) -> Result<IpAddr> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| Error::Other("input reader lock poisoned".to_string()))?;
        let prompt = format!("Enter {version} address: ");

        for attempt in 1..=self.max_attempts {
            let Some(line) = reader.read_line(&prompt)? else {
                return Err(Error::no_input(format!(
                    "input ended before an {version} address was entered"
                )));
            };

            let input = line.trim();
            if input.is_empty() {
                return Err(Error::no_input(format!("no {version} address provided")));
            }

            match input.parse::<IpAddr>() {
                Ok(ip) if version.matches(&ip) => return Ok(ip.to_canonical()),
                Ok(_) => reader.reject(input, &format!("please enter a valid {version} address")),
                Err(_) => reader.reject(input, "invalid IP address format"),
            }
            debug!("Rejected manual {} entry (attempt {})", version, attempt);
        }

        Err(Error::no_input(format!(
            "no valid {version} address after {} attempts",
            self.max_attempts
        )))
    }
}

#[async_trait]
impl IpSource for ManualIpSource {
    async fn get_ipv4(&self) -> Result<IpAddr> {
        self.prompt_for(IpVersion::V4)
    }

    async fn get_ipv6(&self) -> Result<IpAddr> {
        self.prompt_for(IpVersion::V6)
    }

    fn name(&self) -> String {
        "Manual Input".to_string()
    }
}
