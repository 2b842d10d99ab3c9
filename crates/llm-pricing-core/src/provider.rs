//! Static provider tables: external vendor labels to canonical keys, and the
//! vendor prefixes tried when looking a bare model name up in each catalog.

/// External label (a LiteLLM `litellm_provider` value or a CLI hint) mapped
/// to the canonical key used at the top level of the pricing file.
#[derive(Debug, Clone, Copy)]
pub struct ProviderAlias {
    pub label: &'static str,
    pub canonical: &'static str,
}

pub const PROVIDER_ALIASES: &[ProviderAlias] = &[
    ProviderAlias { label: "openai",                    canonical: "openai" },
    ProviderAlias { label: "text-completion-openai",    canonical: "openai" },
    ProviderAlias { label: "anthropic",                 canonical: "anthropic" },
    ProviderAlias { label: "google",                    canonical: "google" },
    ProviderAlias { label: "gemini",                    canonical: "google" },
    ProviderAlias { label: "vertex_ai-language-models", canonical: "google" },
    ProviderAlias { label: "xai",                       canonical: "xai" },
    ProviderAlias { label: "x-ai",                      canonical: "xai" },
    ProviderAlias { label: "mistral",                   canonical: "mistral" },
    ProviderAlias { label: "mistralai",                 canonical: "mistral" },
    ProviderAlias { label: "deepseek",                  canonical: "deepseek" },
    ProviderAlias { label: "together_ai",               canonical: "together" },
    ProviderAlias { label: "together",                  canonical: "together" },
    ProviderAlias { label: "cohere",                    canonical: "cohere" },
    ProviderAlias { label: "cohere_chat",               canonical: "cohere" },
    ProviderAlias { label: "perplexity",                canonical: "perplexity" },
    ProviderAlias { label: "groq",                      canonical: "groq" },
    ProviderAlias { label: "fireworks_ai",              canonical: "fireworks" },
];

/// Prefixes guessed, in order, when resolving against the pricing catalog.
pub const PRICING_PREFIXES: &[&str] = &[
    "openai/",
    "anthropic/",
    "google/",
    "gemini/",
    "xai/",
    "x-ai/",
    "together_ai/",
    "cohere_chat/",
    "mistral/",
    "perplexity/",
    "replicate/",
    "bedrock/",
];

/// Prefixes guessed, in order, when resolving against the routing catalog.
pub const ROUTING_PREFIXES: &[&str] = &[
    "openai/",
    "anthropic/",
    "google/",
    "x-ai/",
    "meta-llama/",
    "mistralai/",
    "deepseek/",
];

/// Look a label up in [`PROVIDER_ALIASES`].
pub fn normalize(label: &str) -> Option<&'static str> {
    PROVIDER_ALIASES
        .iter()
        .find(|a| a.label == label)
        .map(|a| a.canonical)
}

/// Decide the canonical provider key for a model.
///
/// Table hit on the CLI hint, then table hit on the pricing entry's own
/// label, then the raw hint, then the raw label.
pub fn canonical_provider(hint: Option<&str>, source_label: Option<&str>) -> Option<String> {
    hint.and_then(normalize)
        .or_else(|| source_label.and_then(normalize))
        .map(str::to_string)
        .or_else(|| hint.map(str::to_string))
        .or_else(|| source_label.map(str::to_string))
        .filter(|p| !p.is_empty())
}
