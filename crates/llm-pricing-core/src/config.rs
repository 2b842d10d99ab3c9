use std::time::Duration;

use crate::cache::SNAPSHOT_TTL;

pub const PRICING_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";
pub const ROUTING_URL: &str = "https://openrouter.ai/api/v1/models";

/// Snapshot keys under the cache directory.
pub const PRICING_SNAPSHOT: &str = "litellm-model-prices.json";
pub const ROUTING_SNAPSHOT: &str = "openrouter-models.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the two catalogs are fetched.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub pricing_url: String,
    pub routing_url: String,
    pub timeout: Duration,
    pub ttl: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            pricing_url: PRICING_URL.to_string(),
            routing_url: ROUTING_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            ttl: SNAPSHOT_TTL,
        }
    }
}
