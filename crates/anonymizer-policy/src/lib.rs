//! Record anonymization policies.
//!
//! A policy pairs every attribute of a record type with a replacer: `SKIP`,
//! a named strategy from the [`ReplacerRegistry`] or a caller supplied
//! function. Policies are validated against the store's schema before they
//! touch any record, then alter and persist records one at a time through
//! a shared [`anonymizer_generate::Faker`].

pub mod config;
pub mod errors;
pub mod policy;
pub mod replacer;
pub mod set;
mod strategies;
pub mod template;

pub use config::{AnonymizerConfig, AttributeConfig, PolicyConfig};
pub use errors::PolicyError;
pub use policy::{AnonymizationPolicy, Directive, Persist, PolicyReport, PolicyState};
pub use replacer::{
    CustomReplacer, ParamUse, ReplaceArgs, ReplaceContext, Replacer, ReplacerRegistry, SKIP,
    Strategy,
};
pub use set::{PolicySet, RunReport};
pub use template::OptionTemplate;
