//! Domain name value object
//!
//! A [`Domain`] is a validated hostname such as `example.com` or
//! `api.test.example.com`. Construction is the only place validation
//! happens, so every `Domain` in the system satisfies the grammar:
//!
//! - at least two dot-separated labels, total length ≤ 253
//! - each label 1–63 characters of `[A-Za-z0-9-]`, not starting or ending with `-`
//! - the final label (the suffix) at least 2 characters

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum total length of a domain name
pub const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label
pub const MAX_LABEL_LEN: usize = 63;

/// A validated domain name
///
/// Equality is exact string equality; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Parse and validate a domain name
    ///
    /// # Returns
    ///
    /// - `Ok(Domain)`: The input satisfies the domain grammar
    /// - `Err(Error::Validation)`: Otherwise, with the reason
    pub fn parse(input: &str) -> Result<Self> {
        validate(input)?;
        Ok(Self(input.to_string()))
    }

    /// Whether `input` satisfies the domain grammar
    pub fn is_valid(input: &str) -> bool {
        validate(input).is_ok()
    }

    /// The domain as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The registrable root this domain reduces to
    ///
    /// See [`reduce_to_root`].
    pub fn root(&self) -> &str {
        reduce_to_root(&self.0)
    }

    /// Number of labels in the name
    pub fn label_count(&self) -> usize {
        self.0.split('.').count()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Domain {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

/// Reduce a hostname to its registrable root
///
/// Names with two labels or fewer are returned unchanged; longer names are
/// reduced to their last two labels. Providers index zones by this root,
/// so it is the string used for zone lookups.
///
/// ```
/// use dnsset_core::domain::reduce_to_root;
///
/// assert_eq!(reduce_to_root("api.test.yyang.dev"), "yyang.dev");
/// assert_eq!(reduce_to_root("yyang.dev"), "yyang.dev");
/// ```
pub fn reduce_to_root(name: &str) -> &str {
    match name.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &name[idx + 1..],
        None => name,
    }
}

fn validate(input: &str) -> Result<()> {
    if input.is_empty() {
        return Err(Error::validation("domain name cannot be empty"));
    }

    if input.len() > MAX_DOMAIN_LEN {
        return Err(Error::validation(format!(
            "domain name too long: {} chars (max {MAX_DOMAIN_LEN})",
            input.len()
        )));
    }

    let labels: Vec<&str> = input.split('.').collect();
    if labels.len() < 2 {
        return Err(Error::validation(format!(
            "domain name needs at least two labels: '{input}'"
        )));
    }

    for label in &labels {
        if label.is_empty() {
            return Err(Error::validation(format!(
                "domain name has empty label: '{input}'"
            )));
        }

        if label.len() > MAX_LABEL_LEN {
            return Err(Error::validation(format!(
                "domain label too long: {} chars (max {MAX_LABEL_LEN}). Label: '{label}'",
                label.len()
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::validation(format!(
                "domain label contains invalid characters: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::validation(format!(
                "domain label cannot start or end with hyphen: '{label}'"
            )));
        }
    }

    if labels.last().is_some_and(|suffix| suffix.len() < 2) {
        return Err(Error::validation(format!(
            "domain suffix must be at least 2 characters: '{input}'"
        )));
    }

    Ok(())
}
