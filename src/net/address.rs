//! LAN address discovery for the URL shown to mobile clients.

use std::net::{IpAddr, Ipv4Addr};

/// Host name used when no LAN address is found.
pub const FALLBACK_HOST: &str = "localhost";

/// One address entry of a local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub ip: IpAddr,
    pub loopback: bool,
}

/// First non-loopback IPv4 address, in the order given.
pub fn pick_lan_address<'a, I>(addrs: I) -> Option<Ipv4Addr>
where
    I: IntoIterator<Item = &'a InterfaceAddr>,
{
    addrs.into_iter().find_map(|entry| match entry.ip {
        IpAddr::V4(v4) if !entry.loopback && !v4.is_loopback() => Some(v4),
        _ => None,
    })
}

/// Snapshot of the host's interface table.
pub fn local_interfaces() -> std::io::Result<Vec<InterfaceAddr>> {
    Ok(if_addrs::get_if_addrs()?
        .into_iter()
        .map(|iface| InterfaceAddr {
            loopback: iface.is_loopback(),
            ip: iface.ip(),
            name: iface.name,
        })
        .collect())
}

/// Address a LAN client can use to reach this host, or `"localhost"`.
///
/// Reads the interface table on every call; interfaces may change between
/// runs of the service.
pub fn resolve_local_address() -> String {
    match local_interfaces() {
        Ok(addrs) => match pick_lan_address(&addrs) {
            Some(ip) => {
                tracing::debug!(address = %ip, "Resolved LAN address");
                ip.to_string()
            }
            None => {
                tracing::debug!("No LAN IPv4 address found, using {FALLBACK_HOST}");
                FALLBACK_HOST.to_string()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to enumerate network interfaces");
            FALLBACK_HOST.to_string()
        }
    }
}
