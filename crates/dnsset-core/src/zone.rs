//! Zone resolution
//!
//! Maps a domain to the provider zone that owns it by reducing the name to
//! its registrable root and querying the provider with that root.

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::record::Zone;
use crate::traits::DnsProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves domains to provider zones
///
/// No caching: every call queries the provider.
#[derive(Clone)]
pub struct ZoneResolver {
    provider: Arc<dyn DnsProvider>,
}

impl ZoneResolver {
    /// Create a resolver backed by `provider`
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the zone managing `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: The selected zone (see [`select_zone`])
    /// - `Err(Error::ZoneNotFound)`: The provider returned no zone for the root
    /// - `Err(_)`: Provider failures are propagated unchanged
    pub async fn resolve(&self, domain: &Domain) -> Result<Zone> {
        let root = domain.root();
        debug!("Looking up zone for {} (root: {})", domain, root);

        let zones = self.provider.find_zones(root).await?;
        if zones.len() > 1 {
            warn!(
                "{} zones returned for root {}, selecting deterministically",
                zones.len(),
                root
            );
        }

        let zone = select_zone(zones, root).ok_or_else(|| Error::zone_not_found(domain.as_str()))?;
        debug!("Resolved {} to zone {} ({})", domain, zone.name, zone.id);
        Ok(zone)
    }
}

/// Pick one zone out of a lookup result
///
/// Zones whose name equals `root` (ASCII case-insensitive) are preferred;
/// among the candidates the lexicographically smallest ID wins. Returns
/// `None` only for an empty input.
pub fn select_zone(zones: Vec<Zone>, root: &str) -> Option<Zone> {
    let (exact, other): (Vec<Zone>, Vec<Zone>) = zones
        .into_iter()
        .partition(|zone| zone.name.eq_ignore_ascii_case(root));

    let candidates = if exact.is_empty() { other } else { exact };
    candidates.into_iter().min_by(|a, b| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, name: &str) -> Zone {
        Zone {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_select_zone_empty() {
        assert_eq!(select_zone(Vec::new(), "example.com"), None);
    }

    #[test]
    fn test_select_zone_single() {
        let selected = select_zone(vec![zone("z1", "example.com")], "example.com");
        assert_eq!(selected, Some(zone("z1", "example.com")));
    }

    #[test]
    fn test_select_zone_prefers_exact_name() {
        let zones = vec![zone("a", "example.com.evil"), zone("m", "Example.com")];
        assert_eq!(select_zone(zones, "example.com").unwrap().id, "m");
    }

    #[test]
    fn test_select_zone_smallest_id_tie_break() {
        let zones = vec![
            zone("f00", "example.com"),
            zone("a11", "example.com"),
            zone("c22", "example.com"),
        ];
        assert_eq!(select_zone(zones, "example.com").unwrap().id, "a11");
    }
}
