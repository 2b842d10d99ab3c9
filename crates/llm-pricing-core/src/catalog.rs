//! The persisted pricing file: provider key → provider record.
//!
//! Provider values are kept as raw JSON so untouched providers are written
//! back exactly as read. A provider that gains a model is decoded, extended
//! and re-encoded as a whole.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::write_atomic;
use crate::error::{Error, Result};
use crate::model::{DerivedEntry, Price};

/// Mapping read by the database sync to archive models.
const DEPRECIATION_DATE: &str = "depreciationDate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_identifier: Option<Map<String, Value>>,
    #[serde(default)]
    pub price: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Map<String, Value>>,
    /// Mappings owned by other tools (`name`, `description`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderRecord {
    pub fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Every per-model mapping, own and foreign, by field name.
    fn mappings(&self) -> Vec<(&str, &Map<String, Value>)> {
        let own = [
            ("capabilities", self.capabilities.as_ref()),
            ("openrouter_identifier", self.openrouter_identifier.as_ref()),
            ("price", Some(&self.price)),
            ("alias", self.alias.as_ref()),
        ];
        own.into_iter()
            .filter_map(|(name, map)| map.map(|m| (name, m)))
            .chain(
                self.extra
                    .iter()
                    .filter_map(|(name, v)| v.as_object().map(|m| (name.as_str(), m))),
            )
            .collect()
    }

    fn add(&mut self, entry: &DerivedEntry) -> Result<()> {
        let model = entry.model.clone();
        self.models.push(model.clone());
        if !entry.capabilities.is_empty() {
            self.capabilities
                .get_or_insert_with(Map::new)
                .insert(model.clone(), serde_json::to_value(&entry.capabilities)?);
        }
        if let Some(id) = entry.openrouter_identifier.as_deref().filter(|s| !s.is_empty()) {
            self.openrouter_identifier
                .get_or_insert_with(Map::new)
                .insert(model.clone(), Value::String(id.to_string()));
        }
        if let Some(alias) = entry.alias.as_deref().filter(|s| !s.is_empty()) {
            self.alias
                .get_or_insert_with(Map::new)
                .insert(model.clone(), Value::String(alias.to_string()));
        }
        self.price.insert(model, serde_json::to_value(entry.price)?);
        Ok(())
    }
}

/// What merging one entry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    Added,
    /// Already listed; nothing changed.
    Duplicate,
    /// No such provider key in the file; it is never created.
    UnknownProvider,
}

/// A broken invariant of the pricing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotAnObject { provider: String },
    Unreadable { provider: String, reason: String },
    DuplicateModel { provider: String, model: String },
    UnlistedModel { provider: String, mapping: String, model: String },
    MissingPrice { provider: String, model: String },
    BadPrice { provider: String, model: String },
    BadDate { provider: String, model: String, value: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { provider } => write!(f, "{provider}: not an object"),
            Self::Unreadable { provider, reason } => write!(f, "{provider}: {reason}"),
            Self::DuplicateModel { provider, model } => {
                write!(f, "{provider}: {model} listed more than once")
            }
            Self::UnlistedModel { provider, mapping, model } => {
                write!(f, "{provider}.{mapping}: {model} is not in models")
            }
            Self::MissingPrice { provider, model } => write!(f, "{provider}: {model} has no price"),
            Self::BadPrice { provider, model } => {
                write!(f, "{provider}.price: {model} needs non-negative input and output")
            }
            Self::BadDate { provider, model, value } => {
                write!(f, "{provider}.{DEPRECIATION_DATE}: {model} has invalid date {value:?}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingFile {
    providers: Map<String, Value>,
}

impl PricingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            providers: serde_json::from_slice(bytes)?,
        })
    }

    pub fn provider_keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn has_provider(&self, key: &str) -> bool {
        self.providers.contains_key(key)
    }

    pub fn record(&self, key: &str) -> Option<Result<ProviderRecord>> {
        self.providers
            .get(key)
            .map(|raw| ProviderRecord::deserialize(raw).map_err(Error::from))
    }

    /// Add one entry under its provider.
    ///
    /// The provider record is rebuilt and swapped in whole, so a failure
    /// leaves the previous record untouched. Existing fields keep their
    /// position; mappings the provider lacked are appended.
    pub fn merge(&mut self, entry: &DerivedEntry) -> Result<MergeResult> {
        let Some(record) = self.record(&entry.provider) else {
            return Ok(MergeResult::UnknownProvider);
        };
        let mut record = record?;
        if record.has_model(&entry.model) {
            return Ok(MergeResult::Duplicate);
        }
        record.add(entry)?;

        let Value::Object(updated) = serde_json::to_value(&record)? else {
            return Err(Error::Other(format!("{}: record did not encode as an object", entry.provider)));
        };
        let mut raw = match self.providers.get(&entry.provider) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        for (field, value) in updated {
            raw.insert(field, value);
        }
        self.providers.insert(entry.provider.clone(), Value::Object(raw));
        Ok(MergeResult::Added)
    }

    /// Check every provider record against the file's invariants.
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        for (provider, raw) in &self.providers {
            if !raw.is_object() {
                out.push(Violation::NotAnObject {
                    provider: provider.clone(),
                });
                continue;
            }
            match ProviderRecord::deserialize(raw) {
                Ok(record) => validate_record(provider, &record, &mut out),
                Err(e) => out.push(Violation::Unreadable {
                    provider: provider.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        out
    }

    /// 4-space indented JSON with a trailing newline.
    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.providers.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Validate, then replace `path` via temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(Error::InvalidFile {
                path: path.to_path_buf(),
                violations,
            });
        }
        write_atomic(path, &self.to_pretty_bytes()?)
    }
}

fn validate_record(provider: &str, record: &ProviderRecord, out: &mut Vec<Violation>) {
    let mut seen = std::collections::HashSet::new();
    for model in &record.models {
        if !seen.insert(model.as_str()) {
            out.push(Violation::DuplicateModel {
                provider: provider.to_string(),
                model: model.clone(),
            });
        }
        match record.price.get(model) {
            None => out.push(Violation::MissingPrice {
                provider: provider.to_string(),
                model: model.clone(),
            }),
            Some(v) => {
                let ok = Price::deserialize(v).map(|p| p.is_valid()).unwrap_or(false);
                if !ok {
                    out.push(Violation::BadPrice {
                        provider: provider.to_string(),
                        model: model.clone(),
                    });
                }
            }
        }
    }

    for (mapping, map) in record.mappings() {
        for model in map.keys() {
            if !seen.contains(model.as_str()) {
                out.push(Violation::UnlistedModel {
                    provider: provider.to_string(),
                    mapping: mapping.to_string(),
                    model: model.clone(),
                });
            }
        }
    }

    if let Some(dates) = record.extra.get(DEPRECIATION_DATE).and_then(Value::as_object) {
        for (model, value) in dates {
            let valid = match value {
                Value::Null => true,
                Value::String(text) => text.is_empty() || is_iso_date(text),
                _ => false,
            };
            if !valid {
                out.push(Violation::BadDate {
                    provider: provider.to_string(),
                    model: model.clone(),
                    value: value.to_string(),
                });
            }
        }
    }
}

/// `YYYY-MM-DD`, optionally followed by a `THH:MM:SS` time.
fn is_iso_date(text: &str) -> bool {
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
}
