// # Network Interface IP Source
//
// This crate provides an IP source that reads the host's own interface
// addresses, for hosts that hold their public address directly.
//
// ## Selection
//
// Interfaces are walked in enumeration order. Interfaces that are down or
// loopback are skipped, and so are addresses that cannot be publicly
// routed (see [`is_public_candidate`]). The first remaining address of the
// requested family wins.
//
// ## Platform Support
//
// Enumeration uses `getifaddrs(3)` and is available on unix targets. On
// other platforms every call fails with `NoAddressFound`.

use dnsset_core::record::IpVersion;
use dnsset_core::traits::IpSource;
use dnsset_core::{Error, Result};

use std::net::IpAddr;

/// One address as reported by the interface list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name, e.g. `eth0`
    pub interface: String,
    pub address: IpAddr,
    /// `IFF_UP` was set
    pub up: bool,
    /// `IFF_LOOPBACK` was set
    pub loopback: bool,
}

/// IP source reading local interface addresses
#[derive(Debug, Clone, Default)]
pub struct InterfaceIpSource {
    /// Only consider this interface, if set
    interface: Option<String>,
}

impl InterfaceIpSource {
    /// Consider every interface
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consider the named interface
    pub fn with_interface(interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
        }
    }

    fn find(&self, version: IpVersion) -> Result<IpAddr> {
        let addresses = enumerate()?;
        tracing::debug!("Enumerated {} interface address(es)", addresses.len());

        select_address(&addresses, version, self.interface.as_deref()).ok_or_else(|| {
            match &self.interface {
                Some(name) => Error::no_address(format!(
                    "no public {version} address found on interface {name}"
                )),
                None => Error::no_address(format!("no public {version} address found")),
            }
        })
    }
}

/// Whether `ip` could be a publicly routed address
///
/// Rejects unspecified, loopback, private (RFC 1918 and `fc00::/7`) and
/// link-local (`169.254.0.0/16` and `fe80::/10`) addresses.
pub fn is_public_candidate(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_unspecified() || v4.is_loopback() || v4.is_private() || v4.is_link_local())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let unique_local = (first & 0xfe00) == 0xfc00;
            let link_local = (first & 0xffc0) == 0xfe80;
            !(v6.is_unspecified() || v6.is_loopback() || unique_local || link_local)
        }
    }
}

/// Pick the first usable address of `version`
///
/// # Parameters
///
/// - `addresses`: Interface addresses in enumeration order
/// - `version`: Requested family
/// - `interface`: Restrict to this interface name
pub fn select_address(
    addresses: &[InterfaceAddress],
    version: IpVersion,
    interface: Option<&str>,
) -> Option<IpAddr> {
    addresses
        .iter()
        .filter(|a| a.up && !a.loopback)
        .filter(|a| interface.is_none_or(|name| a.interface == name))
        .map(|a| a.address.to_canonical())
        .find(|ip| version.matches(ip) && is_public_candidate(ip))
}

#[cfg(unix)]
fn enumerate() -> Result<Vec<InterfaceAddress>> {
    use std::ffi::CStr;
    use std::net::{Ipv4Addr, Ipv6Addr};

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: on success getifaddrs stores a list we own until freeifaddrs.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let mut addresses = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor is a non-null node of the list returned above.
        let ifa = unsafe { &*cursor };
        cursor = ifa.ifa_next;

        if ifa.ifa_addr.is_null() || ifa.ifa_name.is_null() {
            continue;
        }

        // SAFETY: ifa_addr is non-null and its family says which sockaddr it is.
        let family = i32::from(unsafe { (*ifa.ifa_addr).sa_family });
        let address = match family {
            libc::AF_INET => {
                // SAFETY: AF_INET entries point at a sockaddr_in.
                let sin = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in) };
                IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)))
            }
            libc::AF_INET6 => {
                // SAFETY: AF_INET6 entries point at a sockaddr_in6.
                let sin6 = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in6) };
                IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr))
            }
            _ => continue,
        };

        // SAFETY: ifa_name is a non-null NUL-terminated string owned by the list.
        let interface = unsafe { CStr::from_ptr(ifa.ifa_name) }
            .to_string_lossy()
            .into_owned();
        let flags = ifa.ifa_flags as libc::c_uint;

        addresses.push(InterfaceAddress {
            interface,
            address,
            up: (flags & libc::IFF_UP as libc::c_uint) != 0,
            loopback: (flags & libc::IFF_LOOPBACK as libc::c_uint) != 0,
        });
    }

    // SAFETY: head came from getifaddrs and no reference into it outlives this call.
    unsafe { libc::freeifaddrs(head) };

    Ok(addresses)
}

#[cfg(not(unix))]
fn enumerate() -> Result<Vec<InterfaceAddress>> {
    Err(Error::no_address(
        "interface enumeration is only supported on unix platforms",
    ))
}

#[async_trait::async_trait]
impl IpSource for InterfaceIpSource {
    async fn get_ipv4(&self) -> Result<IpAddr> {
        self.find(IpVersion::V4)
    }

    async fn get_ipv6(&self) -> Result<IpAddr> {
        self.find(IpVersion::V6)
    }

    fn name(&self) -> String {
        "Network Interface".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(interface: &str, ip: &str, up: bool, loopback: bool) -> InterfaceAddress {
        InterfaceAddress {
            interface: interface.to_string(),
            address: ip.parse().unwrap(),
            up,
            loopback,
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_non_public_v4() {
        for s in ["0.0.0.0", "127.0.0.1", "10.1.2.3", "172.16.0.1", "192.168.1.10", "169.254.3.4"] {
            assert!(!is_public_candidate(&ip(s)), "{s} should be rejected");
        }
        assert!(is_public_candidate(&ip("203.0.113.9")));
        assert!(is_public_candidate(&ip("172.32.0.1")));
    }

    #[test]
    fn test_rejects_non_public_v6() {
        for s in ["::", "::1", "fd12:3456::1", "fc00::1", "fe80::1", "febf::1"] {
            assert!(!is_public_candidate(&ip(s)), "{s} should be rejected");
        }
        assert!(is_public_candidate(&ip("2001:db8::1")));
        assert!(is_public_candidate(&ip("fec0::1")));
    }

    #[test]
    fn test_select_skips_down_and_loopback_interfaces() {
        let addresses = vec![
            addr("lo", "127.0.0.1", true, true),
            addr("wg0", "198.51.100.1", false, false),
            addr("eth0", "192.168.1.2", true, false),
            addr("eth0", "fe80::1", true, false),
            addr("eth1", "203.0.113.9", true, false),
            addr("eth1", "2001:db8::9", true, false),
            addr("eth2", "203.0.113.10", true, false),
        ];

        assert_eq!(select_address(&addresses, IpVersion::V4, None), Some(ip("203.0.113.9")));
        assert_eq!(select_address(&addresses, IpVersion::V6, None), Some(ip("2001:db8::9")));
        assert_eq!(
            select_address(&addresses, IpVersion::V4, Some("eth2")),
            Some(ip("203.0.113.10"))
        );
        assert_eq!(select_address(&addresses, IpVersion::V6, Some("eth0")), None);
    }

    #[test]
    fn test_select_never_crosses_family() {
        let addresses = vec![addr("eth0", "2001:db8::9", true, false)];
        assert_eq!(select_address(&addresses, IpVersion::V4, None), None);
    }

    #[test]
    fn test_select_reports_mapped_address_as_ipv4() {
        let addresses = vec![addr("eth0", "::ffff:203.0.113.9", true, false)];
        assert_eq!(select_address(&addresses, IpVersion::V4, None), Some(ip("203.0.113.9")));
        assert_eq!(select_address(&addresses, IpVersion::V6, None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_succeeds() {
        let addresses = enumerate().unwrap();
        assert!(addresses.iter().all(|a| !a.interface.is_empty()));
    }

    #[test]
    fn test_missing_interface_reports_name() {
        let source = InterfaceIpSource::with_interface("does-not-exist0");
        let err = tokio_test::block_on(source.get_ipv4()).unwrap_err();
        assert!(err.to_string().contains("does-not-exist0") || matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_name() {
        assert_eq!(InterfaceIpSource::new().name(), "Network Interface");
    }
}
