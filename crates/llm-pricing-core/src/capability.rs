use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::PricingSourceEntry;

/// Capability tags stored in the pricing file.
///
/// `Mcp`, `Agentic`, `FileSearch` and `CodeInterpreter` are never derived
/// from the pricing catalog; they are set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Routing,
    Image,
    Pdf,
    Search,
    Reasoning,
    ComputerUse,
    ImageGen,
    Mcp,
    Agentic,
    FileSearch,
    CodeInterpreter,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Search => "search",
            Self::Reasoning => "reasoning",
            Self::ComputerUse => "computer-use",
            Self::ImageGen => "image-gen",
            Self::Mcp => "mcp",
            Self::Agentic => "agentic",
            Self::FileSearch => "file-search",
            Self::CodeInterpreter => "code-interpreter",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const IMAGE_GENERATION_MODE: &str = "image_generation";

type FlagTest = fn(&PricingSourceEntry) -> bool;

/// Derivation table; output order is table order.
const DERIVED: &[(FlagTest, Capability)] = &[
    (|e: &PricingSourceEntry| e.supports_function_calling, Capability::Routing),
    (|e: &PricingSourceEntry| e.supports_vision, Capability::Image),
    (|e: &PricingSourceEntry| e.supports_pdf_input, Capability::Pdf),
    (|e: &PricingSourceEntry| e.supports_web_search, Capability::Search),
    (|e: &PricingSourceEntry| e.supports_reasoning, Capability::Reasoning),
    (|e: &PricingSourceEntry| e.supports_computer_use, Capability::ComputerUse),
    (is_image_generation, Capability::ImageGen),
];

fn is_image_generation(e: &PricingSourceEntry) -> bool {
    e.mode.as_deref() == Some(IMAGE_GENERATION_MODE)
}

pub fn derive_capabilities(entry: &PricingSourceEntry) -> Vec<Capability> {
    DERIVED
        .iter()
        .filter(|(test, _)| test(entry))
        .map(|&(_, cap)| cap)
        .collect()
}
