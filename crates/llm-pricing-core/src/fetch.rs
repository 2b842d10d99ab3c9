use reqwest::Client;

use crate::cache::SnapshotCache;
use crate::config::{FetchConfig, PRICING_SNAPSHOT, ROUTING_SNAPSHOT};
use crate::error::{Error, Result};
use crate::source::{Catalogs, PricingSource, RoutingSource};

/// Fetches the catalogs over HTTP, going through a snapshot cache.
pub struct Fetcher<C> {
    http: Client,
    cache: C,
    config: FetchConfig,
}

impl<C: SnapshotCache> Fetcher<C> {
    pub fn new(cache: C, config: FetchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("llm-pricing/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            cache,
            config,
        })
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Download both catalogs in parallel. Either failing fails the run.
    pub async fn fetch_catalogs(&self) -> Result<Catalogs> {
        let (pricing, routing) = tokio::join!(
            self.fetch(&self.config.pricing_url, PRICING_SNAPSHOT, PricingSource::from_slice),
            self.fetch(&self.config.routing_url, ROUTING_SNAPSHOT, RoutingSource::from_slice),
        );
        let catalogs = Catalogs {
            pricing: pricing?,
            routing: routing?,
        };
        tracing::info!(
            pricing = catalogs.pricing.len(),
            routing = catalogs.routing.len(),
            "catalogs loaded"
        );
        Ok(catalogs)
    }

    /// Return the snapshot under `key` if usable, else download `url`.
    ///
    /// A downloaded body is parsed before it replaces the snapshot.
    pub async fn fetch<T>(
        &self,
        url: &str,
        key: &str,
        parse: impl Fn(&[u8]) -> Result<T>,
    ) -> Result<T> {
        if let Some(bytes) = self.cache.get(key) {
            match parse(&bytes) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => tracing::warn!(key, error = %e, "discarding unreadable snapshot"),
            }
        }

        tracing::info!(url, "fetching");
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Fetch {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        let parsed = parse(&body)?;

        if let Err(e) = self.cache.put(key, &body) {
            tracing::warn!(key, error = %e, "could not write snapshot");
        }
        Ok(parsed)
    }
}
