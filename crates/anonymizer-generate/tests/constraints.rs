use std::collections::HashSet;

use chrono::NaiveDate;

use anonymizer_core::{FieldKind, FieldSpec, FieldValue, InMemoryStore, RecordSchema, RecordStore};
use anonymizer_generate::{Faker, FakerKind, GenerationError, LocaleKey};

fn fixed_now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn faker(seed: u64) -> Faker {
    Faker::new(seed).with_now(fixed_now())
}

fn store(fields: Vec<FieldSpec>) -> InMemoryStore {
    let schema = RecordSchema::new("account", fields).expect("schema");
    let mut store = InMemoryStore::new();
    store.add_record_type(schema).expect("add type");
    store
}

fn field(store: &InMemoryStore, name: &str) -> FieldSpec {
    store
        .schema("account")
        .ok()
        .and_then(|schema| schema.field(name).cloned())
        .expect("field exists")
}

#[test]
fn varchar_respects_max_length() {
    let store = store(vec![FieldSpec::text("login").with_max_length(8)]);
    let login = field(&store, "login");
    let mut faker = faker(1);

    for _ in 0..500 {
        let value = faker.varchar(Some(&login), &store).expect("varchar");
        assert!(value.as_str().expect("text").chars().count() <= 8);
    }
}

#[test]
fn varchar_without_max_length_is_a_configuration_error() {
    let store = store(vec![FieldSpec::text("login")]);
    let login = field(&store, "login");
    let mut faker = faker(1);

    let result = faker.varchar(Some(&login), &store);
    assert!(matches!(result, Err(GenerationError::Configuration(_))));
    assert!(matches!(
        faker.varchar(None, &store),
        Err(GenerationError::Configuration(_))
    ));
}

#[test]
fn faker_text_is_truncated_to_max_length() {
    let store = store(vec![FieldSpec::text("address").with_max_length(12)]);
    let address = field(&store, "address");
    let mut faker = faker(4).with_locale(LocaleKey::FrFr);

    for _ in 0..100 {
        let value = faker
            .fake(FakerKind::FullAddress, Some(&address), &store)
            .expect("address");
        assert!(value.as_str().expect("text").chars().count() <= 12);
    }
}

#[test]
fn decimal_has_two_places_below_one_thousand() {
    let store = store(vec![FieldSpec::decimal("balance", 2)]);
    let balance = field(&store, "balance");
    let mut faker = faker(8);

    for _ in 0..500 {
        let value = faker
            .decimal(Some(&balance), &store)
            .expect("decimal")
            .as_decimal()
            .expect("decimal value");
        assert_eq!(value.scale(), 2);
        assert!(value >= rust_decimal::Decimal::ZERO);
        assert!(value < rust_decimal::Decimal::from(1000));
    }
}

#[test]
fn decimal_without_places_is_a_configuration_error() {
    let store = store(vec![FieldSpec::new("balance", FieldKind::Decimal)]);
    let balance = field(&store, "balance");
    let mut faker = faker(8);
    assert!(matches!(
        faker.decimal(Some(&balance), &store),
        Err(GenerationError::Configuration(_))
    ));
}

#[test]
fn choice_draws_from_declared_set() {
    let choices = vec![FieldValue::from("gold"), FieldValue::from("silver")];
    let store = store(vec![
        FieldSpec::text("tier").with_choices(choices.clone()),
        FieldSpec::text("plain"),
    ]);
    let tier = field(&store, "tier");
    let mut faker = faker(13);

    for _ in 0..100 {
        let value = faker.choice(Some(&tier), &store).expect("choice");
        assert!(choices.contains(&value));
    }

    let plain = field(&store, "plain");
    assert!(matches!(
        faker.choice(Some(&plain), &store),
        Err(GenerationError::Configuration(_))
    ));
}

#[test]
fn unique_values_avoid_existing_and_generated_ones() {
    let mut store = store(vec![FieldSpec::new("pin", FieldKind::PositiveSmallInteger).unique()]);
    for pin in 0..10_000_i64 {
        store
            .insert("account", [("pin", FieldValue::Int(pin))])
            .expect("insert");
    }
    let pin = field(&store, "pin");
    let mut faker = faker(17);
    let mut seen = HashSet::new();

    for _ in 0..200 {
        let value = faker
            .positive_small_integer(Some(&pin), &store)
            .expect("unique pin");
        let number = value.as_i64().expect("int");
        assert!(number >= 10_000, "collided with existing value {number}");
        assert!(seen.insert(number), "generated {number} twice");
    }
}

#[test]
fn unique_dates_are_compared_after_truncation_to_date() {
    let store = store(vec![FieldSpec::new("joined", FieldKind::Date).unique()]);
    let joined = field(&store, "joined");
    let mut faker = faker(23);
    let reference = NaiveDate::from_ymd_opt(2023, 5, 1);
    let mut seen = HashSet::new();

    for _ in 0..100 {
        let value = faker
            .date(Some(&joined), &store, reference)
            .expect("unique date");
        assert!(seen.insert(value));
    }
}
