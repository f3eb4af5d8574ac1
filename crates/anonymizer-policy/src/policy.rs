use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use anonymizer_core::{ExistingValues, FieldSpec, FieldValue, Record, RecordStore};
use anonymizer_generate::Faker;

use crate::errors::PolicyError;
use crate::replacer::{
    CustomReplacer, ParamUse, ReplaceArgs, ReplaceContext, Replacer, ReplacerRegistry, Strategy,
};
use crate::template::OptionTemplate;

/// One configured `(attribute, replacer, option)` instruction.
#[derive(Debug, Clone)]
pub struct Directive {
    pub attribute: String,
    pub replacer: Replacer,
    pub option: Option<String>,
}

impl Directive {
    pub fn new(attribute: impl Into<String>, replacer: Replacer, option: Option<&str>) -> Self {
        Self {
            attribute: attribute.into(),
            replacer,
            option: option.map(str::to_string),
        }
    }

    pub fn skip(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Replacer::Skip, None)
    }

    pub fn named(attribute: impl Into<String>, strategy: &str) -> Self {
        Self::new(attribute, Replacer::parse(strategy), None)
    }

    pub fn named_with(attribute: impl Into<String>, strategy: &str, option: &str) -> Self {
        Self::new(attribute, Replacer::parse(strategy), Some(option))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyState {
    Unvalidated,
    Validated,
    Processing,
    Done,
}

/// Outcome of altering one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Save,
    Discard,
}

pub type SaveFilter = dyn Fn(&Record) -> Persist + Send + Sync;

/// Counts for one policy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyReport {
    pub record_type: String,
    pub started_at: DateTime<Utc>,
    pub processed: usize,
    pub saved: usize,
    pub discarded: usize,
}

#[derive(Clone)]
enum Action {
    Named(Arc<dyn Strategy>),
    Custom(CustomReplacer),
}

#[derive(Clone)]
struct CompiledDirective {
    field: FieldSpec,
    action: Action,
    template: Option<OptionTemplate>,
}

/// Anonymizes every record of one record type.
#[derive(Clone)]
pub struct AnonymizationPolicy {
    record_type: String,
    directives: Vec<Directive>,
    order: i32,
    save_filter: Option<Arc<SaveFilter>>,
    state: PolicyState,
    compiled: Vec<CompiledDirective>,
}

impl AnonymizationPolicy {
    pub fn new(record_type: impl Into<String>, directives: Vec<Directive>) -> Self {
        Self {
            record_type: record_type.into(),
            directives,
            order: 0,
            save_filter: None,
            state: PolicyState::Unvalidated,
            compiled: Vec::new(),
        }
    }

    /// Lower orders run first within a [`crate::PolicySet`].
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Decide per altered record whether it is written back.
    pub fn with_save_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Record) -> Persist + Send + Sync + 'static,
    {
        self.save_filter = Some(Arc::new(filter));
        self
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// Check the directives against the record type and resolve replacers.
    ///
    /// Every field must have exactly one directive and every directive must
    /// name a field. Named replacers must exist and their option use must
    /// match what the strategy declares.
    pub fn validate<S>(&mut self, store: &S, registry: &ReplacerRegistry) -> Result<(), PolicyError>
    where
        S: RecordStore + ?Sized,
    {
        let schema = store.schema(&self.record_type)?;

        let mut declared = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for directive in &self.directives {
            if !declared.insert(directive.attribute.as_str()) {
                duplicates.insert(directive.attribute.as_str());
            }
        }
        if !duplicates.is_empty() {
            return Err(PolicyError::Configuration(format!(
                "The attributes list for {} declares these fields more than once: {}.",
                self.record_type,
                join(&duplicates)
            )));
        }

        let fields = schema.field_names();
        if fields != declared {
            let missing: BTreeSet<&str> = fields.difference(&declared).copied().collect();
            let extra: BTreeSet<&str> = declared.difference(&fields).copied().collect();
            return Err(PolicyError::Configuration(mismatch_message(
                &self.record_type,
                &missing,
                &extra,
            )));
        }

        let mut compiled = Vec::new();
        for directive in &self.directives {
            let action = match &directive.replacer {
                Replacer::Skip => continue,
                Replacer::Named(name) => {
                    let strategy = registry.get(name).ok_or_else(|| {
                        PolicyError::Configuration(format!(
                            "unknown replacer '{name}' for {}.{}",
                            self.record_type, directive.attribute
                        ))
                    })?;
                    check_param_use(
                        strategy.as_ref(),
                        directive.option.is_some(),
                        &self.record_type,
                        &directive.attribute,
                    )?;
                    Action::Named(strategy)
                }
                Replacer::Custom(custom) => Action::Custom(custom.clone()),
            };
            let field = schema.field(&directive.attribute).cloned().ok_or_else(|| {
                PolicyError::Configuration(format!(
                    "unknown field {}.{}",
                    self.record_type, directive.attribute
                ))
            })?;
            let template = directive
                .option
                .as_deref()
                .map(|option| OptionTemplate::compile(option, schema))
                .transpose()?;
            compiled.push(CompiledDirective {
                field,
                action,
                template,
            });
        }

        debug!(
            record_type = %self.record_type,
            directives = self.directives.len(),
            replaced = compiled.len(),
            "policy validated"
        );
        self.compiled = compiled;
        self.state = PolicyState::Validated;
        Ok(())
    }

    /// Validate, then alter and persist every record of the record type.
    ///
    /// An error aborts the run; records persisted before it stay persisted.
    pub fn run<S>(
        &mut self,
        store: &mut S,
        faker: &mut Faker,
        registry: &ReplacerRegistry,
    ) -> Result<PolicyReport, PolicyError>
    where
        S: RecordStore,
    {
        self.validate(&*store, registry)?;
        self.state = PolicyState::Processing;

        let mut report = PolicyReport {
            record_type: self.record_type.clone(),
            started_at: Utc::now(),
            processed: 0,
            saved: 0,
            discarded: 0,
        };
        let keys = store.record_keys(&self.record_type)?;
        info!(record_type = %self.record_type, records = keys.len(), "policy started");

        for key in keys {
            let mut record = store.load(&self.record_type, key)?;
            let persist = self.alter_object(&mut record, faker, &*store)?;
            report.processed += 1;
            match persist {
                Persist::Save => {
                    store.persist(record)?;
                    report.saved += 1;
                }
                Persist::Discard => report.discarded += 1,
            }
            debug!(record_type = %self.record_type, key = %key, ?persist, "record altered");
        }

        self.state = PolicyState::Done;
        info!(
            record_type = %self.record_type,
            processed = report.processed,
            saved = report.saved,
            discarded = report.discarded,
            "policy finished"
        );
        Ok(report)
    }

    /// Apply every non-skip directive to `record`, in declared order.
    ///
    /// Later directives see values written by earlier ones. Nothing is
    /// persisted here.
    pub fn alter_object(
        &self,
        record: &mut Record,
        faker: &mut Faker,
        existing: &dyn ExistingValues,
    ) -> Result<Persist, PolicyError> {
        if self.state == PolicyState::Unvalidated {
            return Err(PolicyError::Configuration(format!(
                "policy for {} must be validated before altering records",
                self.record_type
            )));
        }

        let mut ctx = ReplaceContext { faker, existing };
        for directive in &self.compiled {
            let value = alter_attribute(&mut ctx, record, directive)?;
            record.set(directive.field.name.clone(), value);
        }

        Ok(self
            .save_filter
            .as_ref()
            .map_or(Persist::Save, |filter| filter(&*record)))
    }
}

impl fmt::Debug for AnonymizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnonymizationPolicy")
            .field("record_type", &self.record_type)
            .field("directives", &self.directives)
            .field("order", &self.order)
            .field("save_filter", &self.save_filter.is_some())
            .field("state", &self.state)
            .finish()
    }
}

fn alter_attribute(
    ctx: &mut ReplaceContext<'_>,
    record: &Record,
    directive: &CompiledDirective,
) -> Result<FieldValue, PolicyError> {
    let current = record
        .get(&directive.field.name)
        .cloned()
        .unwrap_or(FieldValue::Null);
    let parameter = directive
        .template
        .as_ref()
        .map(|template| template.resolve(record, &current));
    let args = ReplaceArgs {
        record,
        field: &directive.field,
        current: &current,
        parameter: parameter.as_deref(),
    };
    match &directive.action {
        Action::Named(strategy) => strategy.replace(ctx, &args),
        Action::Custom(custom) => custom.call(ctx, &args),
    }
}

fn check_param_use(
    strategy: &dyn Strategy,
    has_option: bool,
    record_type: &str,
    attribute: &str,
) -> Result<(), PolicyError> {
    match (strategy.param(), has_option) {
        (ParamUse::None, true) => Err(PolicyError::Configuration(format!(
            "replacer '{}' for {record_type}.{attribute} does not take an option",
            strategy.id()
        ))),
        (ParamUse::Required, false) => Err(PolicyError::Configuration(format!(
            "replacer '{}' for {record_type}.{attribute} requires an option",
            strategy.id()
        ))),
        _ => Ok(()),
    }
}

fn mismatch_message(record_type: &str, missing: &BTreeSet<&str>, extra: &BTreeSet<&str>) -> String {
    let mut detail = String::new();
    if !missing.is_empty() {
        detail.push_str(&format!(
            "The following fields are missing: {}. Add the replacer \"SKIP\" to skip these fields.",
            join(missing)
        ));
    }
    if !extra.is_empty() {
        if !detail.is_empty() {
            detail.push(' ');
        }
        detail.push_str(&format!(
            "The following non-existent fields were supplied: {}.",
            join(extra)
        ));
    }
    format!(
        "The attributes list for {record_type} does not match the complete list of fields for that record type. {detail}"
    )
}

fn join(names: &BTreeSet<&str>) -> String {
    names.iter().copied().collect::<Vec<_>>().join(", ")
}
