use serde::{Deserialize, Serialize, Serializer};

use crate::alias::detect_alias;
use crate::capability::{derive_capabilities, Capability};
use crate::source::PricingSourceEntry;

/// A model as requested on the command line: `provider/model` or `model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub provider: Option<String>,
    pub name: String,
}

impl ModelRef {
    /// Split at the first `/`. An empty provider part counts as no hint.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((provider, name)) => Self {
                provider: (!provider.is_empty()).then(|| provider.to_string()),
                name: name.to_string(),
            },
            None => Self {
                provider: None,
                name: raw.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider {
            Some(p) => write!(f, "{p}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(serialize_with = "serialize_amount")]
    pub input: f64,
    #[serde(serialize_with = "serialize_amount")]
    pub output: f64,
}

impl Price {
    pub fn from_per_token(input: f64, output: f64) -> Self {
        Self {
            input: per_million(input),
            output: per_million(output),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.input.is_finite() && self.output.is_finite() && self.input >= 0.0 && self.output >= 0.0
    }
}

/// Scale a per-token cost to per-million and round to cents.
pub fn per_million(per_token: f64) -> f64 {
    (per_token * 1_000_000.0 * 100.0).round() / 100.0
}

/// Whole amounts are written as integers, like the rest of the file.
fn serialize_amount<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        s.serialize_i64(*value as i64)
    } else {
        s.serialize_f64(*value)
    }
}

/// A pricing-file entry derived from the external catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedEntry {
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_identifier: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl DerivedEntry {
    pub fn from_source(
        provider: String,
        model: &ModelRef,
        source: &PricingSourceEntry,
        openrouter_identifier: Option<String>,
    ) -> Self {
        if source.input_cost_per_token.is_none() || source.output_cost_per_token.is_none() {
            tracing::warn!(model = %model, "pricing entry lacks a token cost, using 0");
        }
        Self {
            provider,
            model: model.name.clone(),
            capabilities: derive_capabilities(source),
            openrouter_identifier,
            price: Price::from_per_token(
                source.input_cost_per_token.unwrap_or(0.0),
                source.output_cost_per_token.unwrap_or(0.0),
            ),
            alias: detect_alias(&model.name),
        }
    }
}
