use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anonymizer_core::{ExistingValues, FieldSpec, FieldValue, Record};
use anonymizer_generate::Faker;

use crate::errors::PolicyError;
use crate::strategies;

/// Name used in configuration for attributes left untouched.
pub const SKIP: &str = "SKIP";

/// Whether a strategy reads the directive parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUse {
    None,
    Optional,
    Required,
}

impl ParamUse {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamUse::None => "none",
            ParamUse::Optional => "optional",
            ParamUse::Required => "required",
        }
    }
}

/// Everything a strategy may touch while producing one value.
pub struct ReplaceContext<'a> {
    pub faker: &'a mut Faker,
    pub existing: &'a dyn ExistingValues,
}

/// The attribute being replaced.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceArgs<'a> {
    pub record: &'a Record,
    pub field: &'a FieldSpec,
    pub current: &'a FieldValue,
    pub parameter: Option<&'a str>,
}

impl ReplaceArgs<'_> {
    pub fn required_parameter(&self, strategy: &str) -> Result<&str, PolicyError> {
        self.parameter.ok_or_else(|| {
            PolicyError::Configuration(format!(
                "{strategy} requires an option for {}",
                self.field.key()
            ))
        })
    }
}

/// Named replacement strategy.
pub trait Strategy: Send + Sync {
    fn id(&self) -> &'static str;

    fn param(&self) -> ParamUse {
        ParamUse::None
    }

    fn summary(&self) -> &'static str {
        ""
    }

    fn replace(
        &self,
        ctx: &mut ReplaceContext<'_>,
        args: &ReplaceArgs<'_>,
    ) -> Result<FieldValue, PolicyError>;
}

pub type ReplaceFn = dyn Fn(&mut ReplaceContext<'_>, &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError>
    + Send
    + Sync;

/// Caller supplied replacement function.
#[derive(Clone)]
pub struct CustomReplacer(Arc<ReplaceFn>);

impl CustomReplacer {
    pub fn new<F>(replace: F) -> Self
    where
        F: Fn(&mut ReplaceContext<'_>, &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(replace))
    }

    pub fn call(
        &self,
        ctx: &mut ReplaceContext<'_>,
        args: &ReplaceArgs<'_>,
    ) -> Result<FieldValue, PolicyError> {
        (self.0)(ctx, args)
    }
}

impl fmt::Debug for CustomReplacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomReplacer(..)")
    }
}

/// How a directive replaces its attribute.
#[derive(Debug, Clone)]
pub enum Replacer {
    Skip,
    Named(String),
    Custom(CustomReplacer),
}

impl Replacer {
    /// Configuration form: `"SKIP"` or a strategy name.
    pub fn parse(name: &str) -> Self {
        if name == SKIP {
            Replacer::Skip
        } else {
            Replacer::Named(name.to_string())
        }
    }

    pub fn custom<F>(replace: F) -> Self
    where
        F: Fn(&mut ReplaceContext<'_>, &ReplaceArgs<'_>) -> Result<FieldValue, PolicyError>
            + Send
            + Sync
            + 'static,
    {
        Replacer::Custom(CustomReplacer::new(replace))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Replacer::Skip)
    }

    pub fn label(&self) -> &str {
        match self {
            Replacer::Skip => SKIP,
            Replacer::Named(name) => name,
            Replacer::Custom(_) => "custom",
        }
    }
}

/// Strategy table keyed by name. Unknown names never fall back.
#[derive(Clone, Default)]
pub struct ReplacerRegistry {
    strategies: BTreeMap<&'static str, Arc<dyn Strategy>>,
}

impl ReplacerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        strategies::register(&mut registry);
        registry
    }

    /// Adds `strategy`, replacing any strategy already holding its id.
    pub fn register_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.insert(strategy.id(), Arc::from(strategy));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.values().map(|strategy| strategy.as_ref())
    }
}

impl fmt::Debug for ReplacerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.strategies.keys()).finish()
    }
}
