use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate, NaiveDateTime};
use rand::{Rng, RngCore};
use rust_decimal::Decimal;

use anonymizer_core::{FieldSpec, FieldValue};

use crate::errors::GenerationError;

const GENERAL_CHARS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 _-";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const INTEGER_RANGE: RangeInclusive<i64> = -1_000_000..=1_000_000;
const POSITIVE_INTEGER_RANGE: RangeInclusive<i64> = 0..=1_000_000;
const SMALL_INTEGER_RANGE: RangeInclusive<i64> = -32_768..=32_767;
const POSITIVE_SMALL_INTEGER_RANGE: RangeInclusive<i64> = 0..=32_767;

/// Exclusive upper bound of the unscaled decimal draw.
const DECIMAL_UNSCALED_MAX: i64 = 100_000;
/// Half-width of the window around a reference date.
const REFERENCE_WINDOW: Months = Months::new(24);

/// Earliest instant any date generator returns.
pub fn date_floor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Text of random length in `[0, max_length]` over letters, digits, space,
/// `_` and `-`.
pub fn variable_text(
    field: Option<&FieldSpec>,
    rng: &mut dyn RngCore,
) -> Result<FieldValue, GenerationError> {
    let field = field.ok_or_else(|| {
        GenerationError::Configuration("variable_text requires a field".to_string())
    })?;
    let max_length = field.max_length.ok_or_else(|| {
        GenerationError::Configuration(format!(
            "variable_text requires max_length on {}",
            field.key()
        ))
    })?;
    let len = rng.random_range(0..=max_length);
    let value = (0..len)
        .map(|_| GENERAL_CHARS[rng.random_range(0..GENERAL_CHARS.len())] as char)
        .collect::<String>();
    Ok(FieldValue::Text(value))
}

/// Expand `#` into a random digit and `?` into a random ASCII letter.
pub fn pattern_text(pattern: &str, rng: &mut dyn RngCore) -> FieldValue {
    let value = pattern
        .chars()
        .map(|ch| match ch {
            '#' => char::from(b'0' + rng.random_range(0..10_u8)),
            '?' => LETTERS[rng.random_range(0..LETTERS.len())] as char,
            other => other,
        })
        .collect::<String>();
    FieldValue::Text(value)
}

pub fn boolean(rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Bool(rng.random_bool(0.5))
}

pub fn integer(rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Int(rng.random_range(INTEGER_RANGE))
}

pub fn positive_integer(rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Int(rng.random_range(POSITIVE_INTEGER_RANGE))
}

pub fn small_integer(rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Int(rng.random_range(SMALL_INTEGER_RANGE))
}

pub fn positive_small_integer(rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Int(rng.random_range(POSITIVE_SMALL_INTEGER_RANGE))
}

/// Random timestamp at second precision.
///
/// Without a reference the window is `[date_floor(), now]`. With one it spans
/// two years either side of the reference, never later than `now` unless
/// the reference itself lies in the future.
pub fn datetime(
    reference: Option<NaiveDateTime>,
    now: NaiveDateTime,
    rng: &mut dyn RngCore,
) -> FieldValue {
    let (min, max) = window(reference, now);
    let span = (max - min).num_seconds().max(0);
    let offset = rng.random_range(0..=span);
    FieldValue::DateTime(min + chrono::Duration::seconds(offset))
}

/// Same window as [`datetime`], truncated to the calendar date.
pub fn date(reference: Option<NaiveDate>, now: NaiveDateTime, rng: &mut dyn RngCore) -> FieldValue {
    let reference = reference.and_then(|value| value.and_hms_opt(0, 0, 0));
    match datetime(reference, now, rng) {
        FieldValue::DateTime(value) => FieldValue::Date(value.date()),
        other => other,
    }
}

fn window(reference: Option<NaiveDateTime>, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let Some(reference) = reference else {
        let floor = date_floor();
        return (floor, now.max(floor));
    };
    let floor = date_floor();
    let min = reference
        .checked_sub_months(REFERENCE_WINDOW)
        .unwrap_or(floor)
        .max(floor);
    let ceiling = now.max(reference);
    let max = reference
        .checked_add_months(REFERENCE_WINDOW)
        .unwrap_or(ceiling)
        .min(ceiling)
        .max(min);
    (min, max)
}

/// Uniform integer in `[0, 100000)` scaled down by the field's decimal places.
pub fn decimal(
    field: Option<&FieldSpec>,
    rng: &mut dyn RngCore,
) -> Result<FieldValue, GenerationError> {
    let field = field.ok_or_else(|| {
        GenerationError::Configuration("decimal requires a field".to_string())
    })?;
    let places = field.decimal_places.ok_or_else(|| {
        GenerationError::Configuration(format!(
            "decimal requires decimal_places on {}",
            field.key()
        ))
    })?;
    let unscaled = rng.random_range(0..DECIMAL_UNSCALED_MAX);
    let value = Decimal::try_new(unscaled, places).map_err(|err| {
        GenerationError::Configuration(format!(
            "invalid decimal_places {places} on {}: {err}",
            field.key()
        ))
    })?;
    Ok(FieldValue::Decimal(value))
}

/// Uniform draw from the field's declared choices.
pub fn choice(
    field: Option<&FieldSpec>,
    rng: &mut dyn RngCore,
) -> Result<FieldValue, GenerationError> {
    let field = field.ok_or_else(|| {
        GenerationError::Configuration("choice requires a field".to_string())
    })?;
    let choices = field
        .choices
        .as_deref()
        .filter(|choices| !choices.is_empty())
        .ok_or_else(|| {
            GenerationError::Configuration(format!("choice requires choices on {}", field.key()))
        })?;
    Ok(choices[rng.random_range(0..choices.len())].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn reference_window_stays_within_two_years() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let reference = NaiveDate::from_ymd_opt(2015, 3, 10)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .unwrap_or_default();
        for _ in 0..200 {
            let value = datetime(Some(reference), now(), &mut rng);
            let value = value.as_datetime().expect("datetime");
            assert!(value >= reference - chrono::Duration::days(731));
            assert!(value <= reference + chrono::Duration::days(731));
        }
    }

    #[test]
    fn recent_reference_never_reaches_past_now() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let reference = now() - chrono::Duration::days(30);
        for _ in 0..200 {
            let value = datetime(Some(reference), now(), &mut rng);
            assert!(value.as_datetime().expect("datetime") <= now());
        }
    }

    #[test]
    fn unreferenced_dates_start_at_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let value = date(None, now(), &mut rng).as_date().expect("date");
            assert!(value >= date_floor().date());
            assert!(value <= now().date());
        }
    }

    #[test]
    fn pattern_text_keeps_literals() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let value = pattern_text("AB-##-??", &mut rng);
        let text = value.as_str().expect("text");
        assert_eq!(text.len(), 8);
        assert!(text.starts_with("AB-"));
        assert!(text[3..5].chars().all(|ch| ch.is_ascii_digit()));
        assert_eq!(&text[5..6], "-");
        assert!(text[6..].chars().all(|ch| ch.is_ascii_alphabetic()));
    }
}
