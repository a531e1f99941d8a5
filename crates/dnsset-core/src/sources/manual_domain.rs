// # Manual Domain Source
//
// Reads one domain per line until a blank line or end of input.
// Invalid entries are handed to `LineReader::reject` and skipped.

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::input::LineReader;
use crate::traits::DomainSource;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::warn;

/// Default number of rejected entries before collection stops
pub const DEFAULT_MAX_INVALID: usize = 10;

/// Domain source that reads names from a [`LineReader`]
pub struct ManualDomainSource {
    reader: Mutex<Box<dyn LineReader>>,
    max_invalid: usize,
}

impl ManualDomainSource {
    /// Create a manual source reading from `reader`
    pub fn new(reader: impl LineReader + 'static) -> Self {
        Self {
            reader: Mutex::new(Box::new(reader)),
            max_invalid: DEFAULT_MAX_INVALID,
        }
    }

    /// Override the number of rejected entries tolerated
    pub fn with_max_invalid(mut self, max_invalid: usize) -> Self {
        self.max_invalid = max_invalid.max(1);
        self
    }

    fn collect(&self) -> Result<Vec<Domain>> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| Error::Other("input reader lock poisoned".to_string()))?;

        let mut domains: Vec<Domain> = Vec::new();
        let mut invalid = 0;

        while let Some(line) = reader.read_line("> ")? {
            let input = line.trim();
            if input.is_empty() {
                break;
            }

            match Domain::parse(input) {
                Ok(domain) => {
                    if !domains.contains(&domain) {
                        domains.push(domain);
                    }
                }
                Err(e) => {
                    reader.reject(input, &e.to_string());
                    invalid += 1;
                    if invalid >= self.max_invalid {
                        warn!("Too many invalid domain entries ({}), stopping input", invalid);
                        break;
                    }
                }
            }
        }

        if domains.is_empty() {
            return Err(Error::source_exhausted("no valid domains provided"));
        }

        Ok(domains)
    }
}

#[async_trait]
impl DomainSource for ManualDomainSource {
    async fn get_domains(&self) -> Result<Vec<Domain>> {
        self.collect()
    }

    fn name(&self) -> String {
        "Manual Input".to_string()
    }
}
