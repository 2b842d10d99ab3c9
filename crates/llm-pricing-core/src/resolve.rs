//! Locate a requested model in an external catalog.
//!
//! Each catalog has an ordered list of matchers; the first one that hits
//! decides which entry is authoritative, so the order must not change.

use std::fmt;

use crate::alias::detect_alias;
use crate::model::ModelRef;
use crate::provider::{PRICING_PREFIXES, ROUTING_PREFIXES};
use crate::source::KeyCatalog;

/// One step of the ordered search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The bare model name as a key.
    Bare,
    /// `hint/model`, when a hint was given.
    Hinted,
    /// Each prefix in turn, prepended to the bare model name.
    Prefixed(&'static [&'static str]),
    /// Scan all keys by their last `/` segment.
    Suffix(SuffixMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixMode {
    /// Equal last segment, or a dated/build variant of it.
    Strict,
    /// Strict, then the undated form of the bare name, then any key
    /// containing the bare name.
    Loose,
}

/// Pricing lookups favor precision: a wrong price is worse than none.
pub const PRICING_MATCHERS: &[Matcher] = &[
    Matcher::Bare,
    Matcher::Hinted,
    Matcher::Prefixed(PRICING_PREFIXES),
    Matcher::Suffix(SuffixMode::Strict),
];

/// Routing lookups favor recall: the identifier is only a hint.
pub const ROUTING_MATCHERS: &[Matcher] = &[
    Matcher::Bare,
    Matcher::Hinted,
    Matcher::Prefixed(ROUTING_PREFIXES),
    Matcher::Suffix(SuffixMode::Loose),
];

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Bare,
    Hinted,
    Prefix(&'static str),
    SuffixExact,
    SuffixVariant,
    Undated,
    Substring,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare => write!(f, "bare name"),
            Self::Hinted => write!(f, "provider/model"),
            Self::Prefix(p) => write!(f, "prefix {p}"),
            Self::SuffixExact => write!(f, "suffix"),
            Self::SuffixVariant => write!(f, "dated suffix"),
            Self::Undated => write!(f, "undated name"),
            Self::Substring => write!(f, "substring"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub id: &'a str,
    pub rule: Rule,
}

/// Run `matchers` in order against `catalog`; first hit wins.
pub fn resolve<'a, C: KeyCatalog + ?Sized>(
    model: &ModelRef,
    catalog: &'a C,
    matchers: &[Matcher],
) -> Option<Resolved<'a>> {
    if model.name.is_empty() {
        return None;
    }
    matchers.iter().find_map(|m| apply(*m, model, catalog))
}

pub fn resolve_pricing<'a, C: KeyCatalog + ?Sized>(
    model: &ModelRef,
    catalog: &'a C,
) -> Option<Resolved<'a>> {
    resolve(model, catalog, PRICING_MATCHERS)
}

pub fn resolve_routing<'a, C: KeyCatalog + ?Sized>(
    model: &ModelRef,
    catalog: &'a C,
) -> Option<Resolved<'a>> {
    resolve(model, catalog, ROUTING_MATCHERS)
}

fn apply<'a, C: KeyCatalog + ?Sized>(
    matcher: Matcher,
    model: &ModelRef,
    catalog: &'a C,
) -> Option<Resolved<'a>> {
    match matcher {
        Matcher::Bare => exact(catalog, &model.name, Rule::Bare),
        Matcher::Hinted => {
            let hint = model.provider.as_deref()?;
            exact(catalog, &format!("{hint}/{}", model.name), Rule::Hinted)
        }
        Matcher::Prefixed(prefixes) => prefixes
            .iter()
            .find_map(|p| exact(catalog, &format!("{p}{}", model.name), Rule::Prefix(*p))),
        Matcher::Suffix(mode) => by_suffix(catalog, last_segment(&model.name), mode),
    }
}

fn exact<'a, C: KeyCatalog + ?Sized>(catalog: &'a C, key: &str, rule: Rule) -> Option<Resolved<'a>> {
    catalog.key(key).map(|id| Resolved { id, rule })
}

fn by_suffix<'a, C: KeyCatalog + ?Sized>(
    catalog: &'a C,
    bare: &str,
    mode: SuffixMode,
) -> Option<Resolved<'a>> {
    if bare.is_empty() {
        return None;
    }

    let found = catalog
        .ids()
        .find(|id| *id == bare || last_segment(id) == bare)
        .map(|id| Resolved { id, rule: Rule::SuffixExact })
        .or_else(|| {
            catalog
                .ids()
                .find(|id| detect_alias(last_segment(id)).as_deref() == Some(bare))
                .map(|id| Resolved { id, rule: Rule::SuffixVariant })
        });

    match mode {
        SuffixMode::Strict => found,
        SuffixMode::Loose => found
            .or_else(|| {
                let undated = detect_alias(bare)?;
                catalog
                    .ids()
                    .find(|id| last_segment(id) == undated)
                    .map(|id| Resolved { id, rule: Rule::Undated })
            })
            .or_else(|| {
                catalog
                    .ids()
                    .find(|id| id.contains(bare))
                    .map(|id| Resolved { id, rule: Rule::Substring })
            }),
    }
}

fn last_segment(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
