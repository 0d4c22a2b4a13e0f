#![forbid(unsafe_code)]

mod parser;
mod record_builder;
mod tokenizer;

use ged_core::{GedcomError, GedcomWarning, OnError, ParseConfig, Transmission};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

pub use parser::GedcomParser;
pub use tokenizer::tokenize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub transmission: Transmission,
    pub warnings: Vec<GedcomWarning>,
    /// Line-level errors; each one cost only its own line (and that line's children).
    pub errors: Vec<GedcomError>,
}

impl ParseResult {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a whole transmission, logging and collecting line errors.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    parse_with_config(input, &ParseConfig::default())
}

#[must_use]
pub fn parse_with_config(input: &str, config: &ParseConfig) -> ParseResult {
    let mut parser = GedcomParser::with_config(config.clone());
    let mut errors = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        if let Err(error) = parser.parse_line(index + 1, raw) {
            warn!("Parse error [{}]: {error}", error.code().as_str());
            errors.push(error);
            if config.on_error == OnError::Abort {
                break;
            }
        }
    }

    let (mut result, trailer_error) = parser.into_result();
    errors.extend(trailer_error);
    debug!(
        "Parsed: {} records, {} warnings, {} errors",
        result.transmission.record_count(),
        result.warnings.len(),
        errors.len()
    );
    result.errors = errors;
    result
}

#[must_use]
pub fn parse_summary_json(parsed: &ParseResult) -> String {
    let transmission = &parsed.transmission;
    json!({
        "record_counts": transmission.counts(),
        "has_trailer": transmission.has_trailer(),
        "dangling_reference_count": transmission.dangling_references().len(),
        "warning_count": parsed.warnings.len(),
        "warnings": parsed
            .warnings
            .iter()
            .map(|warning| json!({
                "code": warning.code.as_str(),
                "line": warning.line,
                "message": warning.message,
            }))
            .collect::<Vec<_>>(),
        "error_count": parsed.errors.len(),
        "errors": parsed
            .errors
            .iter()
            .map(|error| json!({
                "code": error.code().as_str(),
                "line": error.line(),
                "message": error.to_string(),
            }))
            .collect::<Vec<_>>(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_summary_json, parse_with_config};
    use ged_core::{
        Category, GedcomError, GedcomWarningCode, NEWLINE_MARKER, OnError, ParseConfig,
        RecordKind,
    };
    use proptest::prelude::*;

    #[test]
    fn individual_name_is_reachable_through_index() {
        let result = parse("0 @I1@ INDI\n1 NAME John /Smith/\n0 TRLR");
        assert!(result.is_clean(), "{:?}", result.errors);

        let transmission = &result.transmission;
        let individual = transmission
            .find(Category::Individual, "I1")
            .expect("I1 is indexed");
        let name = transmission
            .children(individual, "name")
            .next()
            .expect("name record");
        assert_eq!(name.first_text("name").as_deref(), Some("John /Smith/"));
    }

    #[test]
    fn level_skip_is_structural_error() {
        let result = parse("0 @I1@ INDI\n2 DATE 1900\n0 TRLR");
        assert!(matches!(
            result.errors.as_slice(),
            [GedcomError::Structural { line: 2, .. }]
        ));
    }

    #[test]
    fn conc_and_cont_extend_a_single_slot() {
        let result = parse("0 @I1@ INDI\n1 NOTE Hello\n2 CONC World\n1 NOTE Hello\n2 CONT Next\n0 TRLR");
        assert!(result.is_clean(), "{:?}", result.errors);

        let transmission = &result.transmission;
        let individual = transmission
            .find(Category::Individual, "I1")
            .expect("I1 is indexed");
        let notes: Vec<_> = transmission.children(individual, "note_citation").collect();
        assert_eq!(notes.len(), 2);

        let joined = notes[0].field("text").expect("text field");
        assert_eq!(joined.len(), 1);
        assert_eq!(notes[0].first_text("text").as_deref(), Some("Hello World"));

        let broken = notes[1].field("text").and_then(|slots| slots[0].as_words());
        assert_eq!(
            broken,
            Some(&["Hello".to_string(), NEWLINE_MARKER.to_string(), "Next".to_string()][..])
        );
    }

    #[test]
    fn duplicate_individual_key_fails_second_record() {
        let result = parse("0 @I1@ INDI\n1 SEX M\n0 @I1@ INDI\n1 SEX F\n0 TRLR");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0],
            GedcomError::DuplicateKey { line: 3, category: Category::Individual, key } if key == "I1"
        ));
        let individual = result
            .transmission
            .find(Category::Individual, "I1")
            .expect("first I1 survives");
        assert_eq!(individual.first_text("sex").as_deref(), Some("M"));
        assert_eq!(result.transmission.records_of(RecordKind::Individual).count(), 1);
    }

    #[test]
    fn forward_reference_resolves_after_input() {
        let result = parse("0 @I1@ INDI\n1 FAMC @F9@\n0 @F9@ FAM\n1 CHIL @I1@\n0 TRLR");
        assert!(result.is_clean(), "{:?}", result.errors);

        let transmission = &result.transmission;
        let individual = transmission
            .find(Category::Individual, "I1")
            .expect("I1 is indexed");
        let link = transmission
            .children(individual, "child_to_family_link")
            .next()
            .expect("FAMC link");
        let family_ref = link.references("family").next().expect("family reference");
        let family = transmission.resolve(family_ref).expect("F9 resolves");
        assert_eq!(family.kind, RecordKind::Family);
        assert!(transmission.dangling_references().is_empty());
    }

    #[test]
    fn underscore_tag_becomes_note_and_parsing_continues() {
        let result = parse("0 @I1@ INDI\n1 _FAV blue and green\n1 SEX F\n0 TRLR");
        assert!(result.is_clean(), "{:?}", result.errors);
        assert!(
            result
                .warnings
                .iter()
                .any(|warning| warning.code == GedcomWarningCode::UserTagPromoted)
        );

        let transmission = &result.transmission;
        let individual = transmission
            .find(Category::Individual, "I1")
            .expect("I1 is indexed");
        let note = transmission
            .children(individual, "user_note")
            .next()
            .expect("user note");
        assert_eq!(note.first_text("text").as_deref(), Some("_FAV blue and green"));
        assert_eq!(individual.first_text("sex").as_deref(), Some("F"));
    }

    #[test]
    fn level_zero_user_record_keeps_its_xref() {
        let result = parse("0 @X1@ _PLAC Somewhere\n0 TRLR");
        assert!(result.is_clean(), "{:?}", result.errors);
        let note = result
            .transmission
            .records_of(RecordKind::UserDefinedNote)
            .next()
            .expect("top-level user note");
        assert_eq!(note.first_text("text").as_deref(), Some("@X1@ _PLAC Somewhere"));
    }

    #[test]
    fn unknown_standard_tag_is_an_error_not_a_note() {
        let result = parse("0 @I1@ INDI\n1 BOGUS data\n0 TRLR");
        assert!(matches!(
            result.errors.as_slice(),
            [GedcomError::UnrecognizedTag { line: 2, tag, .. }] if tag == "BOGUS"
        ));
    }

    #[test]
    fn abort_stops_at_first_error() {
        let input = "0 @I1@ INDI\n1 BOGUS\n0 @I2@ INDI\n0 TRLR";
        let config = ParseConfig {
            on_error: OnError::Abort,
            ..ParseConfig::default()
        };
        let aborted = parse_with_config(input, &config);
        assert_eq!(aborted.errors.len(), 1);
        assert!(aborted.transmission.find(Category::Individual, "I2").is_none());

        let continued = parse(input);
        assert_eq!(continued.errors.len(), 1);
        assert!(continued.transmission.find(Category::Individual, "I2").is_some());
    }

    #[test]
    fn required_trailer_is_reported_as_error() {
        let config = ParseConfig {
            require_trailer: true,
            ..ParseConfig::default()
        };
        let result = parse_with_config("0 HEAD", &config);
        assert_eq!(result.errors, vec![GedcomError::MissingTrailer]);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let result = parse("0 HEAD\r\n\r\n1 CHAR ASCII\r\n0 TRLR\r\n");
        assert!(result.is_clean(), "{:?}", result.errors);
        let header = result.transmission.header().expect("header");
        assert_eq!(header.first_text("character_set").as_deref(), Some("ASCII"));
    }

    #[test]
    fn summary_json_contains_counts_and_codes() {
        let result = parse("0 @I1@ INDI\n1 BOGUS\n0 @F1@ FAM\n1 HUSB @I1@\n1 WIFE @I2@");
        let summary = parse_summary_json(&result);
        assert!(summary.contains("\"individual\":1"));
        assert!(summary.contains("\"family\":1"));
        assert!(summary.contains("\"dangling_reference_count\":1"));
        assert!(summary.contains("\"has_trailer\":false"));
        assert!(summary.contains("gedcom/error/unrecognized-tag"));
        assert!(summary.contains("gedcom/warn/missing-trailer"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_is_total_and_errors_carry_lines(input in ".{0,256}") {
            let result = parse(&input);
            let line_count = input.lines().count();
            for error in &result.errors {
                if let Some(line) = error.line() {
                    prop_assert!(line >= 1 && line <= line_count);
                }
            }
        }

        #[test]
        fn prop_structured_noise_never_panics(
            lines in proptest::collection::vec(
                (0u32..4, proptest::option::of("[A-Z0-9]{1,4}"), "[A-Z_]{1,5}", "[ -~]{0,20}"),
                0..24,
            )
        ) {
            let input = lines
                .iter()
                .map(|(level, xref, tag, data)| match xref {
                    Some(key) => format!("{level} @{key}@ {tag} {data}"),
                    None => format!("{level} {tag} {data}"),
                })
                .collect::<Vec<_>>()
                .join("\n");
            let result = parse(&input);
            prop_assert!(result.transmission.record_count() >= 1);
            for xref in result.transmission.dangling_references() {
                prop_assert!(result.transmission.resolve(&xref).is_err());
            }
        }
    }
}
