use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use magnetite_scraper_prelude::{ResolvedEndpoint, ScraperError, ScraperErrorReason};
use std::net::{IpAddr, SocketAddr};

use super::NAME;

/// Asks the configured server directly for the domain's A record. The system
/// resolver is never consulted: it may be the one refusing to answer.
pub async fn resolve_a(server: IpAddr, domain: &str) -> Result<ResolvedEndpoint, ScraperError> {
    let mut config = ResolverConfig::new();
    config.add_name_server(NameServerConfig::new(
        SocketAddr::new(server, 53),
        Protocol::Udp,
    ));
    let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());

    let lookup = resolver.ipv4_lookup(domain).await.map_err(|cause| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::DnsLookupFailed {
                domain: domain.to_string(),
                cause: cause.to_string(),
            },
        )
    })?;

    let address = lookup.iter().next().ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::DnsNoRecords {
                domain: domain.to_string(),
            },
        )
    })?;

    Ok(ResolvedEndpoint::new(domain, address.0.to_string()))
}
