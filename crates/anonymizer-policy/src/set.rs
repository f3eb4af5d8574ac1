use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use anonymizer_core::RecordStore;
use anonymizer_generate::Faker;

use crate::errors::PolicyError;
use crate::policy::{AnonymizationPolicy, PolicyReport};
use crate::replacer::ReplacerRegistry;

/// Policies executed in ascending `order`; ties keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    policies: Vec<AnonymizationPolicy>,
}

/// Summary of one run across every policy of a set.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: u64,
    pub locale: String,
    pub policies: Vec<PolicyReport>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.policies.iter().map(|report| report.processed).sum()
    }

    pub fn saved(&self) -> usize {
        self.policies.iter().map(|report| report.saved).sum()
    }
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, policy: AnonymizationPolicy) {
        self.policies.push(policy);
        self.policies.sort_by_key(AnonymizationPolicy::order);
    }

    #[must_use]
    pub fn with(mut self, policy: AnonymizationPolicy) -> Self {
        self.push(policy);
        self
    }

    /// Policies in execution order.
    pub fn policies(&self) -> &[AnonymizationPolicy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Validate every policy, stopping at the first failure.
    pub fn validate<S>(&mut self, store: &S, registry: &ReplacerRegistry) -> Result<(), PolicyError>
    where
        S: RecordStore + ?Sized,
    {
        for policy in &mut self.policies {
            policy.validate(store, registry)?;
        }
        Ok(())
    }

    /// Run every policy against `store`, sharing `faker` and its
    /// uniqueness registry across record types.
    pub fn run<S>(
        &mut self,
        store: &mut S,
        faker: &mut Faker,
        registry: &ReplacerRegistry,
    ) -> Result<RunReport, PolicyError>
    where
        S: RecordStore,
    {
        self.validate(&*store, registry)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            run_id = %run_id,
            seed = faker.seed(),
            locale = %faker.locale(),
            policies = self.policies.len(),
            "anonymization started"
        );

        let mut reports = Vec::with_capacity(self.policies.len());
        for policy in &mut self.policies {
            reports.push(policy.run(store, faker, registry)?);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            seed: faker.seed(),
            locale: faker.locale().to_string(),
            policies: reports,
        };
        info!(
            run_id = %run_id,
            processed = report.processed(),
            saved = report.saved(),
            "anonymization finished"
        );
        Ok(report)
    }
}
