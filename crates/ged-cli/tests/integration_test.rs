//! Integration tests for the GEDCOM pipeline.
//!
//! These tests verify the end-to-end flow from loading a file to parsing,
//! cross-reference resolution and re-emission.

use std::fs;

use ged_core::{Category, GedcomConfig, GedcomError, OnError, RecordKind};
use ged_emit::{emit_transmission, emit_with_config, to_text};
use ged_parser::{parse, parse_summary_json, parse_with_config};

const SAMPLE: &str = "\
0 HEAD
1 SOUR GED
2 NAME Family Archive
1 SUBM @U1@
1 GEDC
2 VERS 5.5
2 FORM LINEAGE-LINKED
1 CHAR UTF-8
0 @U1@ SUBM
1 NAME Archive Keeper
0 @I1@ INDI
1 NAME Thomas /Hardy/
1 SEX M
1 BIRT
2 DATE 2 JUN 1840
2 PLAC Higher Bockhampton, Dorset
1 FAMS @F1@
0 @I2@ INDI
1 NAME Emma /Gifford/
1 SEX F
1 FAMS @F1@
1 NOTE @N1@
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 MARR
2 DATE 17 SEP 1874
0 @N1@ NOTE Met in Cornwall while he restored the church at St Juliot.
0 TRLR
";

/// Test that a complete transmission parses cleanly and every pointer resolves.
#[test]
fn sample_parses_and_resolves_all_pointers() {
    let parsed = parse(SAMPLE);
    assert!(parsed.is_clean(), "Parse errors: {:?}", parsed.errors);
    assert!(
        parsed.warnings.is_empty(),
        "Parse warnings: {:?}",
        parsed.warnings
    );

    let transmission = &parsed.transmission;
    assert!(transmission.has_trailer());
    assert!(transmission.dangling_references().is_empty());

    let counts = transmission.counts();
    assert_eq!(counts.get("individual"), Some(&2));
    assert_eq!(counts.get("family"), Some(&1));
    assert_eq!(counts.get("note"), Some(&1));

    let family = transmission
        .find(Category::Family, "F1")
        .expect("F1 is indexed");
    let husband = family.references("husband").next().expect("HUSB pointer");
    let husband = transmission.resolve(husband).expect("I1 resolves");
    assert_eq!(husband.kind, RecordKind::Individual);
}

/// Test that parse -> emit -> parse yields the same tree and the same text.
#[test]
fn sample_round_trips_through_emitter() {
    let first = parse(SAMPLE);
    let emitted = emit_transmission(&first.transmission);
    assert_eq!(emitted, SAMPLE);

    let second = parse(&emitted);
    assert!(second.is_clean(), "Reparse errors: {:?}", second.errors);
    assert_eq!(second.transmission, first.transmission);
}

/// Test that a damaged line costs only itself and its children.
#[test]
fn damaged_lines_are_isolated() {
    let damaged = SAMPLE.replace("1 SEX F\n", "1 SEX F\n1 BOGUS tag\n2 DATE 1900\n");
    let parsed = parse(&damaged);

    assert_eq!(parsed.errors.len(), 1);
    assert!(matches!(
        &parsed.errors[0],
        GedcomError::UnrecognizedTag { tag, .. } if tag == "BOGUS"
    ));
    assert_eq!(parsed.warnings.len(), 1, "child of the bad line is skipped");

    let clean = parse(SAMPLE);
    assert_eq!(
        emit_transmission(&parsed.transmission),
        emit_transmission(&clean.transmission)
    );
}

#[test]
fn file_input_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("family.ged");
    let output = dir.path().join("family.out.ged");
    fs::write(&input, SAMPLE).expect("write input");

    let source = fs::read_to_string(&input).expect("read input");
    let parsed = parse(&source);
    fs::write(&output, emit_transmission(&parsed.transmission)).expect("write output");

    let written = fs::read_to_string(&output).expect("read output");
    assert_eq!(written, SAMPLE);
}

#[test]
fn toml_config_drives_parse_and_emit() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("ged.toml");
    fs::write(
        &path,
        "[parse]\nrequire_trailer = true\non_error = \"abort\"\n\n[emit]\nwrap_width = 40\n",
    )
    .expect("write config");

    let text = fs::read_to_string(&path).expect("read config");
    let config: GedcomConfig = toml::from_str(&text).expect("config parses");
    assert!(config.parse.require_trailer);
    assert_eq!(config.parse.on_error, OnError::Abort);
    assert_eq!(config.emit.wrap_width, 40);
    assert_eq!(config.emit.line_terminator, "\n");

    let without_trailer = SAMPLE.replace("0 TRLR\n", "");
    let parsed = parse_with_config(&without_trailer, &config.parse);
    assert_eq!(parsed.errors, vec![GedcomError::MissingTrailer]);

    let emitted = emit_with_config(&parsed.transmission, &config.emit);
    assert!(emitted.lines().all(|line| line.chars().count() <= 40));
    assert!(emitted.contains("\n1 CONC "));
    assert!(emitted.ends_with("0 TRLR\n"));
}

#[test]
fn empty_config_file_uses_defaults() {
    let config: GedcomConfig = toml::from_str("").expect("empty config parses");
    assert_eq!(config, GedcomConfig::default());
}

#[test]
fn find_prints_regenerated_record() {
    let parsed = parse(SAMPLE);
    let transmission = &parsed.transmission;
    let category = Category::parse("INDI").expect("tag names a category");
    let record = transmission
        .find(category, "I2")
        .expect("I2 is indexed");

    assert_eq!(
        to_text(transmission, record, 0),
        "0 @I2@ INDI\n1 NAME Emma /Gifford/\n1 SEX F\n1 FAMS @F1@\n1 NOTE @N1@\n"
    );
}

#[test]
fn summary_reports_dangling_references() {
    let input = SAMPLE.replace("1 WIFE @I2@", "1 WIFE @I9@");
    let parsed = parse(&input);
    assert!(parsed.is_clean(), "{:?}", parsed.errors);

    let dangling = parsed.transmission.dangling_references();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].key, "I9");

    let summary: serde_json::Value =
        serde_json::from_str(&parse_summary_json(&parsed)).expect("summary is JSON");
    assert_eq!(summary["dangling_reference_count"], 1);
    assert_eq!(summary["has_trailer"], true);
    assert_eq!(summary["record_counts"]["individual"], 2);
}

#[test]
fn full_tree_serializes_to_json() {
    let parsed = parse(SAMPLE);
    let json = serde_json::to_string(&parsed.transmission).expect("tree serializes");
    assert!(json.contains("Thomas"));
    assert!(json.contains("\"F1\""));
}
