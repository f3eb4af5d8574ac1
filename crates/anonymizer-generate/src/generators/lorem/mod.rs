use fake::Fake;
use fake::faker::lorem::en::Paragraph;
use rand::{Rng, RngCore};

use anonymizer_core::FieldValue;

const SENTENCES_PER_PARAGRAPH: std::ops::Range<usize> = 3..6;
const PARAGRAPHS: std::ops::RangeInclusive<usize> = 3..=5;

/// Lorem ipsum filler.
///
/// With a reference the output keeps its shape: one filler line per
/// reference line, each exactly as many characters long, joined with the
/// same `\n` breaks. Without one, a few paragraphs separated by blank lines.
pub fn lorem_text(reference: Option<&str>, rng: &mut dyn RngCore) -> FieldValue {
    let value = match reference {
        Some(reference) => reference
            .split('\n')
            .map(|line| filler(line.chars().count(), rng))
            .collect::<Vec<_>>()
            .join("\n"),
        None => paragraphs(rng),
    };
    FieldValue::Text(value)
}

fn paragraph(rng: &mut dyn RngCore) -> String {
    Paragraph(SENTENCES_PER_PARAGRAPH).fake_with_rng(rng)
}

fn paragraphs(rng: &mut dyn RngCore) -> String {
    let count = rng.random_range(PARAGRAPHS);
    (0..count)
        .map(|_| paragraph(rng))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Filler of exactly `length` characters, without line breaks.
fn filler(length: usize, rng: &mut dyn RngCore) -> String {
    let mut collected = String::new();
    let mut count = 0;
    while count < length {
        if count > 0 {
            collected.push(' ');
            count += 1;
        }
        let next = paragraph(rng).replace('\n', " ");
        count += next.chars().count();
        collected.push_str(&next);
    }
    collected.chars().take(length).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reference_shape_is_preserved() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let reference = "Dear customer,\n\nyour order #4411 shipped today.\nRegards";
        let value = lorem_text(Some(reference), &mut rng);
        let text = value.as_str().expect("text");

        let expected: Vec<usize> = reference.split('\n').map(|line| line.chars().count()).collect();
        let actual: Vec<usize> = text.split('\n').map(|line| line.chars().count()).collect();
        assert_eq!(actual, expected);
        assert_ne!(text, reference);
    }

    #[test]
    fn unreferenced_lorem_has_several_paragraphs() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let value = lorem_text(None, &mut rng);
        let paragraphs = value.as_str().expect("text").split("\n\n").count();
        assert!((3..=5).contains(&paragraphs));
    }

    #[test]
    fn empty_reference_yields_empty_text() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(lorem_text(Some(""), &mut rng), FieldValue::text(""));
    }
}
