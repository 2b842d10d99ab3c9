//! The two external catalogs: LiteLLM pricing/capabilities and OpenRouter
//! routing identifiers.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::Result;

/// One entry of the pricing catalog, as far as this crate reads it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PricingSourceEntry {
    #[serde(default)]
    pub input_cost_per_token: Option<f64>,
    #[serde(default)]
    pub output_cost_per_token: Option<f64>,
    #[serde(default)]
    pub litellm_provider: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_function_calling: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_vision: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_pdf_input: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_web_search: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_reasoning: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub supports_computer_use: bool,
}

/// Flags are read by truthiness; `null`, `0`, `""` and empty containers
/// are all false.
fn truthy<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// Anything the resolver can search: exact lookup plus ordered iteration.
pub trait KeyCatalog {
    /// The catalog's own copy of `id`, if present.
    fn key(&self, id: &str) -> Option<&str>;

    fn contains(&self, id: &str) -> bool {
        self.key(id).is_some()
    }

    /// Identifiers in source order.
    fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_>;
}

/// Pricing catalog keyed by identifier. Entries stay raw until looked up,
/// so one odd entry upstream cannot break the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct PricingSource {
    entries: Map<String, Value>,
}

impl PricingSource {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            entries: serde_json::from_slice(bytes)?,
        })
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed view of one entry. `None` if absent or not an object.
    pub fn entry(&self, id: &str) -> Option<PricingSourceEntry> {
        let raw = self.entries.get(id)?;
        match PricingSourceEntry::deserialize(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(id, error = %e, "unreadable pricing entry");
                None
            }
        }
    }
}

impl KeyCatalog for PricingSource {
    fn key(&self, id: &str) -> Option<&str> {
        self.entries.get_key_value(id).map(|(k, _)| k.as_str())
    }

    fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.entries.keys().map(String::as_str))
    }
}

#[derive(Debug, Deserialize)]
struct RoutingResponse {
    data: Vec<RoutingModel>,
}

#[derive(Debug, Deserialize)]
struct RoutingModel {
    id: String,
}

/// Routing-service model identifiers, in response order.
#[derive(Debug, Clone, Default)]
pub struct RoutingSource {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl RoutingSource {
    /// Parse a `{ "data": [ { "id": ... }, ... ] }` body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let resp: RoutingResponse = serde_json::from_slice(bytes)?;
        Ok(Self::from_ids(resp.data.into_iter().map(|m| m.id)))
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let index = ids.iter().cloned().collect();
        Self { ids, index }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl KeyCatalog for RoutingSource {
    fn key(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(String::as_str)
    }

    fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.ids.iter().map(String::as_str))
    }
}

/// Both fetched catalogs, ready for resolution.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub pricing: PricingSource,
    pub routing: RoutingSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_entry_reads_known_fields() {
        let body = br#"{
            "sample_spec": {"max_tokens": "set to max"},
            "gpt-4o": {
                "input_cost_per_token": 2.5e-06,
                "output_cost_per_token": 1e-05,
                "litellm_provider": "openai",
                "mode": "chat",
                "supports_vision": true,
                "supports_function_calling": true,
                "max_tokens": 16384
            }
        }"#;
        let source = PricingSource::from_slice(body).unwrap();
        assert_eq!(source.len(), 2);

        let entry = source.entry("gpt-4o").unwrap();
        assert_eq!(entry.litellm_provider.as_deref(), Some("openai"));
        assert!(entry.supports_vision);
        assert!(!entry.supports_pdf_input);
        assert_eq!(entry.input_cost_per_token, Some(2.5e-6));
    }

    #[test]
    fn null_and_non_bool_flags_do_not_lose_the_entry() {
        let body = br#"{
            "gpt-x": {
                "input_cost_per_token": 1e-6,
                "output_cost_per_token": 2e-6,
                "litellm_provider": "openai",
                "supports_vision": true,
                "supports_pdf_input": null,
                "supports_web_search": 1,
                "supports_reasoning": ""
            }
        }"#;
        let entry = PricingSource::from_slice(body).unwrap().entry("gpt-x").unwrap();
        assert!(entry.supports_vision);
        assert!(!entry.supports_pdf_input);
        assert!(entry.supports_web_search);
        assert!(!entry.supports_reasoning);
        assert_eq!(entry.input_cost_per_token, Some(1e-6));
    }

    #[test]
    fn pricing_ids_keep_source_order() {
        let source = PricingSource::from_slice(br#"{"z": {}, "a": {}, "m": {}}"#).unwrap();
        let ids: Vec<_> = source.ids().collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn routing_parses_data_ids() {
        let body = br#"{"data": [{"id": "openai/gpt-4o", "name": "GPT-4o"}, {"id": "x-ai/grok-4"}]}"#;
        let routing = RoutingSource::from_slice(body).unwrap();
        assert_eq!(routing.len(), 2);
        assert!(routing.contains("x-ai/grok-4"));
        assert!(!routing.contains("grok-4"));
    }

    #[test]
    fn routing_rejects_wrong_shape() {
        assert!(RoutingSource::from_slice(br#"[{"id": "a"}]"#).is_err());
    }
}
