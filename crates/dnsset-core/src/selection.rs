//! Narrowing a fetched domain list
//!
//! The operator answers with `all` (or nothing) to keep every domain, or a
//! comma-separated list of 1-based positions such as `1, 3`.

use crate::domain::Domain;
use crate::error::{Error, Result};

/// Which fetched domains a pass should touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSelection {
    /// Every fetched domain
    All,
    /// Zero-based positions into the fetched list, in the order given
    Indices(Vec<usize>),
}

impl DomainSelection {
    /// Parse an operator answer against a list of `count` domains
    ///
    /// # Returns
    ///
    /// - `Err(Error::Validation)`: If an item is not a number or is out of range
    pub fn parse(input: &str, count: usize) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Ok(DomainSelection::All);
        }

        let mut indices = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            let position: usize = part
                .parse()
                .map_err(|_| Error::validation(format!("invalid selection: '{part}'")))?;

            if position == 0 || position > count {
                return Err(Error::validation(format!(
                    "selection {position} out of range (1-{count})"
                )));
            }

            let index = position - 1;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        Ok(DomainSelection::Indices(indices))
    }

    /// Apply the selection to the fetched list
    pub fn apply(&self, domains: Vec<Domain>) -> Vec<Domain> {
        match self {
            DomainSelection::All => domains,
            DomainSelection::Indices(indices) => indices
                .iter()
                .filter_map(|&index| domains.get(index).cloned())
                .collect(),
        }
    }
}
