// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for key rendering and parsing.

use std::collections::HashSet;

use readthru_key::{CacheKey, KeyError, KeyShape, parse, serialize};
use rstest::rstest;

const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');

#[test]
fn student_key_renders_canonically() {
    let key = STUDENT_COURSES.key(42);
    assert_eq!(key.as_str(), "S_42_C");
    assert_eq!(serialize('S', 42, 'C'), key.as_str());
}

#[test]
fn rendering_is_deterministic() {
    let first = STUDENT_COURSES.key("alice".to_owned());
    let second = STUDENT_COURSES.key("alice".to_owned());
    assert_eq!(first, second);
    assert_eq!(first.as_str(), second.as_str());
}

#[test]
fn distinct_triples_render_distinctly() {
    let prefixes = ['S', 'T', 'U'];
    let suffixes = ['C', 'D'];
    let ids = ["1", "12", "2", "a", "ab", "b"];

    let mut seen = HashSet::new();
    for prefix in prefixes {
        for suffix in suffixes {
            for id in ids {
                assert!(
                    seen.insert(serialize(prefix, id, suffix)),
                    "collision for ({prefix}, {id}, {suffix})"
                );
            }
        }
    }
    assert_eq!(seen.len(), prefixes.len() * suffixes.len() * ids.len());
}

#[rstest]
#[case(0)]
#[case(42)]
#[case(u64::MAX)]
fn numeric_ids_parse_back(#[case] id: u64) {
    let key = STUDENT_COURSES.key(id);
    let parsed: CacheKey<u64> = STUDENT_COURSES.parse(key.as_str()).unwrap();
    assert_eq!(parsed, key);
}

#[rstest]
#[case("plain")]
#[case("with space")]
#[case("under_score")]
#[case("ünïcödé")]
fn string_ids_parse_back(#[case] id: &str) {
    let key = STUDENT_COURSES.key(id.to_owned());
    let parsed: CacheKey<String> = parse(key.as_str()).unwrap();
    assert_eq!(parsed.unique_id(), id);
    assert_eq!(parsed.shape(), STUDENT_COURSES);
}

#[rstest]
#[case("")]
#[case("S")]
#[case("SC")]
#[case("S_C")]
#[case("S-42-C")]
#[case("S_42C")]
#[case("S42_C")]
fn malformed_keys_are_rejected(#[case] raw: &str) {
    assert_eq!(
        parse::<String>(raw).unwrap_err(),
        KeyError::Malformed { raw: raw.to_owned() }
    );
}

#[rstest]
#[case("S_042_C", "S_42_C")]
#[case("S_+7_C", "S_7_C")]
#[case("S_00_C", "S_0_C")]
fn non_canonical_ids_are_rejected(#[case] raw: &str, #[case] canonical: &str) {
    let err = STUDENT_COURSES.parse::<u32>(raw).unwrap_err();
    assert_eq!(
        err,
        KeyError::NonCanonical {
            raw: raw.to_owned(),
            canonical: canonical.to_owned(),
        }
    );
}

#[test]
fn parsed_key_equals_built_key() {
    let parsed: CacheKey<u32> = STUDENT_COURSES.parse("S_42_C").unwrap();
    assert_eq!(parsed, STUDENT_COURSES.key(42));
}

#[test]
fn error_messages_name_the_input() {
    let err = STUDENT_COURSES.parse::<u32>("S_x_C").unwrap_err();
    assert_eq!(err.to_string(), "unique id 'x' is invalid: invalid digit found in string");

    let err = STUDENT_COURSES.parse::<u32>("T_1_C").unwrap_err();
    assert_eq!(err.to_string(), "key 'T_1_C' does not belong to the S_*_C key family");
}
