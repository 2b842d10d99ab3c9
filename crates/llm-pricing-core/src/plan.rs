//! Per-model pipeline: resolve, derive, merge.

use crate::catalog::{MergeResult, PricingFile};
use crate::error::Result;
use crate::model::{DerivedEntry, ModelRef};
use crate::provider::canonical_provider;
use crate::resolve::{resolve_pricing, resolve_routing};
use crate::source::Catalogs;

/// What happened to one requested model.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added(DerivedEntry),
    /// Already in the file; treated as satisfied.
    Duplicate(DerivedEntry),
    NotInPricingSource,
    UnresolvedProvider,
    UnknownProvider(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Duplicate(_) => "exists",
            Self::NotInPricingSource => "not found",
            Self::UnresolvedProvider => "no provider",
            Self::UnknownProvider(_) => "unknown provider",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub requested: String,
    pub outcome: Outcome,
}

impl ModelReport {
    pub fn added(&self) -> Option<&DerivedEntry> {
        match &self.outcome {
            Outcome::Added(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Result of deriving one model, before it meets the pricing file.
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    Entry(DerivedEntry),
    NotInPricingSource,
    UnresolvedProvider,
}

/// Resolve `model` in both catalogs and build its pricing-file entry.
pub fn derive(model: &ModelRef, catalogs: &Catalogs) -> Derivation {
    let Some(hit) = resolve_pricing(model, &catalogs.pricing) else {
        return Derivation::NotInPricingSource;
    };
    let Some(source) = catalogs.pricing.entry(hit.id) else {
        return Derivation::NotInPricingSource;
    };
    tracing::debug!(model = %model, key = hit.id, rule = %hit.rule, "pricing match");

    let Some(provider) = canonical_provider(
        model.provider.as_deref(),
        source.litellm_provider.as_deref(),
    ) else {
        return Derivation::UnresolvedProvider;
    };

    let routing_id = resolve_routing(model, &catalogs.routing).map(|r| {
        tracing::debug!(model = %model, id = r.id, rule = %r.rule, "routing match");
        r.id.to_string()
    });

    Derivation::Entry(DerivedEntry::from_source(provider, model, &source, routing_id))
}

/// Derive and merge every requested model into `file`, in order.
///
/// Per-model problems are logged and recorded, never raised. Only a
/// malformed provider record in `file` is an error.
pub fn run(requested: &[String], catalogs: &Catalogs, file: &mut PricingFile) -> Result<Vec<ModelReport>> {
    let mut reports = Vec::with_capacity(requested.len());
    for raw in requested {
        let model = ModelRef::parse(raw);
        let outcome = match derive(&model, catalogs) {
            Derivation::NotInPricingSource => {
                tracing::warn!(model = %raw, "not found in pricing source, skipping");
                Outcome::NotInPricingSource
            }
            Derivation::UnresolvedProvider => {
                tracing::warn!(model = %raw, "cannot determine provider, skipping");
                Outcome::UnresolvedProvider
            }
            Derivation::Entry(entry) => match file.merge(&entry)? {
                MergeResult::Added => {
                    tracing::info!(provider = %entry.provider, model = %entry.model, "added");
                    Outcome::Added(entry)
                }
                MergeResult::Duplicate => {
                    tracing::warn!(provider = %entry.provider, model = %entry.model, "already present, skipping");
                    Outcome::Duplicate(entry)
                }
                MergeResult::UnknownProvider => {
                    tracing::warn!(provider = %entry.provider, model = %raw, "provider not in pricing file, skipping");
                    Outcome::UnknownProvider(entry.provider)
                }
            },
        };
        reports.push(ModelReport {
            requested: raw.clone(),
            outcome,
        });
    }
    Ok(reports)
}

/// Entries that were added, in request order.
pub fn added_entries(reports: &[ModelReport]) -> Vec<&DerivedEntry> {
    reports.iter().filter_map(ModelReport::added).collect()
}
