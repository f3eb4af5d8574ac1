use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use anonymizer_core::{ExistingValues, FieldSpec, FieldValue};

use crate::errors::GenerationError;
use crate::faker_rs::{FakeRsAdapter, FakerKind, LocaleKey};
use crate::generators::{self, lorem_text};
use crate::unique::UniquenessRegistry;

/// Generation session for one anonymization run.
///
/// Owns the RNG, the locale used for realistic text, the clock that bounds
/// date windows and the uniqueness registry. Every public generator routes
/// through [`Faker::allowed_value`] so field constraints always apply.
#[derive(Debug)]
pub struct Faker {
    rng: ChaCha8Rng,
    seed: u64,
    locale: LocaleKey,
    now: NaiveDateTime,
    uniques: UniquenessRegistry,
}

impl Faker {
    pub fn new(seed: u64) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            locale: LocaleKey::default(),
            now: now.with_nanosecond(0).unwrap_or(now),
            uniques: UniquenessRegistry::new(),
        }
    }

    /// Session seeded from the thread RNG; the seed is kept for reporting.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn with_locale(mut self, locale: LocaleKey) -> Self {
        self.locale = locale;
        self
    }

    /// Pin the clock used as the upper bound of date windows.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn uniques(&self) -> &UniquenessRegistry {
        &self.uniques
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    /// Run `source` under the constraints of `field`.
    pub fn allowed_value<F>(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
        mut source: F,
    ) -> Result<FieldValue, GenerationError>
    where
        F: FnMut(&mut dyn RngCore) -> Result<FieldValue, GenerationError>,
    {
        let Self { rng, uniques, .. } = self;
        uniques.enforce(field, existing, || source(&mut *rng))
    }

    pub fn varchar(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| generators::variable_text(field, rng))
    }

    pub fn simple_pattern(
        &mut self,
        pattern: &str,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(generators::pattern_text(pattern, rng)))
    }

    pub fn bool(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(generators::boolean(rng)))
    }

    pub fn integer(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(generators::integer(rng)))
    }

    pub fn positive_integer(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(generators::positive_integer(rng)))
    }

    pub fn small_integer(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(generators::small_integer(rng)))
    }

    pub fn positive_small_integer(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| {
            Ok(generators::positive_small_integer(rng))
        })
    }

    /// Random timestamp; with `reference`, within two years of it.
    pub fn datetime(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
        reference: Option<NaiveDateTime>,
    ) -> Result<FieldValue, GenerationError> {
        let now = self.now;
        self.allowed_value(field, existing, |rng| {
            Ok(generators::datetime(reference, now, rng))
        })
    }

    /// Like [`Faker::datetime`], truncated to a date before uniqueness is
    /// checked.
    pub fn date(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
        reference: Option<NaiveDate>,
    ) -> Result<FieldValue, GenerationError> {
        let now = self.now;
        self.allowed_value(field, existing, |rng| Ok(generators::date(reference, now, rng)))
    }

    pub fn decimal(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| generators::decimal(field, rng))
    }

    /// Lorem ipsum, shaped like `reference` when given.
    pub fn lorem(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
        reference: Option<&str>,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| Ok(lorem_text(reference, rng)))
    }

    pub fn choice(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        self.allowed_value(field, existing, |rng| generators::choice(field, rng))
    }

    /// Realistic text from the `fake` locale data.
    pub fn fake(
        &mut self,
        kind: FakerKind,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
    ) -> Result<FieldValue, GenerationError> {
        let locale = self.locale;
        self.allowed_value(field, existing, |rng| {
            Ok(FieldValue::Text(FakeRsAdapter::generate_text(kind, locale, rng)))
        })
    }
}
