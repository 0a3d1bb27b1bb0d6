//! Reverse hostname resolution with a per-scan cache.
//!
//! Each distinct target is looked up at most once for the lifetime of a
//! [`HostnameResolver`]. Failures are cached as "no name" and never
//! propagated; callers only ever see an absent hostname.

use crate::error::LookupError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Backend that maps a target to a host name.
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// Look up the name for a target (an IP literal or a hostname).
    async fn lookup(&self, target: &str) -> Result<String, LookupError>;
}

/// DNS-backed lookup using PTR records.
///
/// IP targets are reverse-resolved directly. Hostname targets are resolved
/// forward first and the first address is then reverse-resolved.
pub struct DnsLookup {
    resolver: TokioAsyncResolver,
}

impl DnsLookup {
    /// Create a lookup using the system resolver configuration, falling back
    /// to the library defaults when it cannot be read.
    pub fn system() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "system resolver configuration unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }

    /// Create a lookup with an explicit resolver configuration.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    async fn address_of(&self, target: &str) -> Result<IpAddr, LookupError> {
        if let Ok(ip) = target.parse::<IpAddr>() {
            return Ok(ip);
        }

        let response = self
            .resolver
            .lookup_ip(target)
            .await
            .map_err(|e| LookupError::DnsResolution(target.to_string(), e.to_string()))?;

        response
            .iter()
            .next()
            .ok_or_else(|| LookupError::NoRecords(target.to_string()))
    }
}

#[async_trait]
impl HostLookup for DnsLookup {
    async fn lookup(&self, target: &str) -> Result<String, LookupError> {
        let ip = self.address_of(target).await?;

        let names = self
            .resolver
            .reverse_lookup(ip)
            .await
            .map_err(|e| LookupError::DnsResolution(target.to_string(), e.to_string()))?;

        names
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .ok_or_else(|| LookupError::NoRecords(target.to_string()))
    }
}

/// Caching front end over a [`HostLookup`].
///
/// Safe to share across concurrent probes. Concurrent requests for the same
/// target wait on a single lookup.
pub struct HostnameResolver {
    lookup: Arc<dyn HostLookup>,
    cache: Mutex<HashMap<String, Arc<OnceCell<Option<String>>>>>,
}

impl HostnameResolver {
    /// Create a resolver with an empty cache.
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        Self {
            lookup,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a target to a useful host name.
    ///
    /// Returns `None` when the lookup fails or the name is the target itself.
    pub async fn resolve(&self, target: &str) -> Option<String> {
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(target.to_string()).or_default())
        };

        cell.get_or_init(|| async {
            match self.lookup.lookup(target).await {
                Ok(name) if name.is_empty() || name == target => None,
                Ok(name) => Some(name),
                Err(e) => {
                    debug!(target_host = target, error = %e, "hostname lookup failed");
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Number of distinct targets looked up so far.
    pub(crate) fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
