// Unit tests for metadata ignore rules

use super::*;
use serde_json::json;

#[test]
fn test_remux_defaults_cover_volatile_fields() {
    let rules = MetadataIgnoreRules::remux_defaults().unwrap();

    assert!(rules.is_ignored("root['streams'][3]['bit_rate']"));
    assert!(rules.is_ignored("root['programs'][0]['streams'][12]['index']"));
    assert!(rules.is_ignored("root['programs'][2]['pcr_pid']"));
    assert!(rules.is_ignored("root['programs'][0]['tags']['service_provider']"));
}

#[test]
fn test_remux_defaults_keep_meaningful_fields() {
    let rules = MetadataIgnoreRules::remux_defaults().unwrap();

    assert!(!rules.is_ignored("root['streams'][0]['tags']"));
    assert!(!rules.is_ignored("root['streams'][0]['tags']['language']"));
    assert!(!rules.is_ignored("root['programs'][0]['program_id']"));
    assert!(!rules.is_ignored("root['streams'][0]['bit_rate_extra']"));
    assert!(!rules.is_ignored("root['streams'][0]['codec_name']"));
}

#[test]
fn test_without_empty_programs_drops_stream_less_programs() {
    let input = json!({
        "programs": [
            {"program_id": 1024, "streams": [{"index": 0}]},
            {"program_id": 1025, "streams": []},
            {"program_id": 1026},
            {"program_id": 1027, "streams": [{"index": 1}]},
        ],
        "streams": [],
    });
    let stripped = without_empty_programs(input);

    let ids: Vec<u64> = stripped["programs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|program| program["program_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1024, 1027]);
    assert_eq!(without_empty_programs(json!({"streams": []})), json!({"streams": []}));
}

#[test]
fn test_for_input_ignores_unrecognized_codec_identification() {
    let input = json!({
        "programs": [],
        "streams": [
            {"index": 0, "codec_type": "data"},
            {"index": 1, "codec_type": "video", "codec_name": "mpeg2video"},
        ],
    });
    let rules = MetadataIgnoreRules::for_input(&input).unwrap();

    assert!(rules.is_ignored("root['streams'][0]['codec_name']"));
    assert!(rules.is_ignored("root['streams'][0]['codec_long_name']"));
    assert!(rules.is_ignored("root['streams'][0]['codec_type']"));
    assert!(!rules.is_ignored("root['streams'][0]['tags']"));
    assert!(!rules.is_ignored("root['streams'][1]['codec_name']"));
}

#[test]
fn test_with_pattern_rejects_invalid_regex() {
    let rules = MetadataIgnoreRules::remux_defaults().unwrap();
    let count = rules.len();
    assert!(rules.clone().with_pattern("root\\['(").is_err());
    assert_eq!(rules.with_pattern(r"root\['format'\]").unwrap().len(), count + 1);
}
