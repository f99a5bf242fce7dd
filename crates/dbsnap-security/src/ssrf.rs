// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DNS resolver that refuses to connect the file server fetch to private addresses.
//!
//! The trusted base URL comes from configuration, but its hostname is still
//! resolved at request time. Filtering resolved addresses keeps a poisoned
//! or rebinding DNS answer from pointing the fetch at internal services.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::{error, info};

/// Resolver that drops private/reserved addresses unless allowlisted.
pub struct SsrfSafeResolver {
    allowed_private_ips: Vec<IpAddr>,
}

impl SsrfSafeResolver {
    /// Create a resolver. Entries that are not IP addresses are ignored.
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed_private_ips: allowed.iter().filter_map(|s| s.parse().ok()).collect(),
        }
    }

    /// RFC 1918, loopback, link-local, broadcast, unspecified, cloud
    /// metadata, and the IPv6 equivalents.
    pub fn is_private(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => {
                v4.is_private()
                    || v4.is_loopback()
                    || v4.is_link_local()
                    || v4.is_broadcast()
                    || v4.is_unspecified()
                    || *v4 == Ipv4Addr::new(169, 254, 169, 254)
            }
            IpAddr::V6(v6) => {
                if let Some(mapped) = v6.to_ipv4_mapped() {
                    return Self::is_private(&IpAddr::V4(mapped));
                }
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                    || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
            }
        }
    }

    fn keep(addrs: Vec<SocketAddr>, allowed: &[IpAddr], host: &str) -> Vec<SocketAddr> {
        addrs
            .into_iter()
            .filter(|addr| {
                let ip = addr.ip();
                if !Self::is_private(&ip) {
                    return true;
                }
                if allowed.contains(&ip) {
                    info!(ip = %ip, host, "allowing configured private IP");
                    true
                } else {
                    error!(ip = %ip, host, "SSRF blocked: resolved to private IP");
                    false
                }
            })
            .collect()
    }
}

impl Resolve for SsrfSafeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let allowed = self.allowed_private_ips.clone();
        let hostname = name.as_str().to_string();

        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(format!("{hostname}:0"))
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let filtered = SsrfSafeResolver::keep(addrs, &allowed, &hostname);
            if filtered.is_empty() {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    format!("SSRF blocked: {hostname} resolves only to private IPs").into();
                return Err(err);
            }

            let addrs: Addrs = Box::new(filtered.into_iter());
            Ok(addrs)
        })
    }
}
