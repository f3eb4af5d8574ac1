//! Option mini-language attached to a directive.
//!
//! An option is a comma separated list of segments evaluated left to right.
//! A segment naming an attribute of the record type reads that attribute's
//! current value. Any other segment is a literal template: `{}` embeds the
//! parameter computed so far (`{{` and `}}` are literal braces), then each
//! `!` at character position `i` is replaced by the `i`-th character of the
//! value being anonymized, or dropped when that value is shorter. Literal
//! segments append to one accumulator shared by the whole option, and the
//! accumulator becomes the parameter after each literal segment.

use anonymizer_core::{FieldValue, Record, RecordSchema};

use crate::errors::PolicyError;

const SEPARATOR: char = ',';
const KEEP_ORIGINAL: char = '!';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Embed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Current value of another attribute of the same record.
    Sibling(String),
    Literal(Vec<Piece>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl OptionTemplate {
    /// Parse `option` against the attributes of `schema`.
    ///
    /// Sibling lookup wins over literal parsing, so a segment equal to an
    /// attribute name is never treated as text.
    pub fn compile(option: &str, schema: &RecordSchema) -> Result<Self, PolicyError> {
        let segments = option
            .split(SEPARATOR)
            .map(|segment| {
                if schema.has_field(segment) {
                    Ok(Segment::Sibling(segment.to_string()))
                } else {
                    parse_literal(segment).map(Segment::Literal).map_err(|reason| {
                        PolicyError::Configuration(format!(
                            "invalid option '{option}' for record type '{}': {reason}",
                            schema.name
                        ))
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: option.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Compute the parameter handed to the replacer.
    pub fn resolve(&self, record: &Record, original: &FieldValue) -> String {
        let original: Vec<char> = original.to_string().chars().collect();
        let mut parameter = String::new();
        let mut accumulated = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Sibling(name) => {
                    parameter = record.get(name).map(ToString::to_string).unwrap_or_default();
                }
                Segment::Literal(pieces) => {
                    let rendered = render(pieces, &parameter);
                    for (index, ch) in rendered.chars().enumerate() {
                        if ch == KEEP_ORIGINAL {
                            if let Some(kept) = original.get(index) {
                                accumulated.push(*kept);
                            }
                        } else {
                            accumulated.push(ch);
                        }
                    }
                    parameter = accumulated.clone();
                }
            }
        }

        parameter
    }
}

fn render(pieces: &[Piece], parameter: &str) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Embed => out.push_str(parameter),
        }
    }
    out
}

fn parse_literal(segment: &str) -> Result<Vec<Piece>, String> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = segment.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => match chars.next() {
                Some('{') => text.push('{'),
                Some('}') => {
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Embed);
                }
                Some(other) => {
                    return Err(format!(
                        "only empty '{{}}' placeholders are supported, found '{{{other}'"
                    ));
                }
                None => return Err("unclosed '{'".to_string()),
            },
            '}' => {
                if chars.next_if_eq(&'}').is_none() {
                    return Err("single '}' encountered".to_string());
                }
                text.push('}');
            }
            other => text.push(other),
        }
    }

    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anonymizer_core::{FieldSpec, RecordKey};

    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new(
            "person",
            vec![
                FieldSpec::text("first_name"),
                FieldSpec::text("last_name"),
                FieldSpec::text("email"),
            ],
        )
        .expect("schema")
    }

    fn record(first: &str, last: &str) -> Record {
        let mut values = BTreeMap::new();
        values.insert("first_name".to_string(), FieldValue::from(first));
        values.insert("last_name".to_string(), FieldValue::from(last));
        values.insert("email".to_string(), FieldValue::Null);
        Record::new("person", RecordKey(0), values)
    }

    fn resolve(option: &str, record: &Record, original: &str) -> String {
        OptionTemplate::compile(option, &schema())
            .expect("compile")
            .resolve(record, &FieldValue::from(original))
    }

    #[test]
    fn sibling_segment_reads_current_value() {
        let record = record("Jean", "Dupont");
        assert_eq!(resolve("last_name", &record, "x"), "Dupont");
    }

    #[test]
    fn sibling_lookup_takes_precedence_over_literal() {
        let template = OptionTemplate::compile("first_name", &schema()).expect("compile");
        assert_eq!(
            template.segments(),
            &[Segment::Sibling("first_name".to_string())]
        );
    }

    #[test]
    fn bang_keeps_original_characters_and_drops_past_the_end() {
        let record = record("Jean", "Dupont");
        assert_eq!(resolve("###-!!!", &record, "ABCDEF"), "###-EF");
    }

    #[test]
    fn previous_parameter_is_embedded() {
        let record = record("Jean", "Dupont");
        assert_eq!(
            resolve("first_name,{}.!@example.com", &record, "dupont"),
            "Jean.t@example.com"
        );
    }

    #[test]
    fn literal_segments_share_one_accumulator() {
        let record = record("Jean", "Dupont");
        assert_eq!(resolve("ab,cd", &record, ""), "abcd");
        assert_eq!(resolve("ab,{}", &record, ""), "abab");
    }

    #[test]
    fn empty_parameter_embeds_as_nothing() {
        let record = record("Jean", "Dupont");
        assert_eq!(resolve("{}x", &record, ""), "x");
        assert_eq!(resolve("email,<{}>", &record, ""), "<>");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let record = record("Jean", "Dupont");
        assert_eq!(resolve("{{}}", &record, ""), "{}");
    }

    #[test]
    fn named_placeholders_are_rejected() {
        for option in ["{name}", "{", "}", "a}b"] {
            assert!(
                matches!(
                    OptionTemplate::compile(option, &schema()),
                    Err(PolicyError::Configuration(_))
                ),
                "{option} should not compile"
            );
        }
    }
}
