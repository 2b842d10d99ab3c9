pub mod alias;
pub mod cache;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod plan;
pub mod provider;
pub mod resolve;
pub mod source;

pub use capability::Capability;
pub use catalog::{MergeResult, PricingFile, ProviderRecord, Violation};
pub use error::Error;
pub use model::{DerivedEntry, ModelRef, Price};
pub use plan::{ModelReport, Outcome};
pub use source::Catalogs;
