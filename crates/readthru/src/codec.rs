// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JSON payload encoding.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Result<Bytes, Error> {
    serde_json::to_vec(value).map(Bytes::from).map_err(|source| Error::Encode {
        key: key.to_owned(),
        source: Arc::new(source),
    })
}

/// Encodes `value` and checks that the payload decodes back into `T`.
///
/// JSON cannot represent every value serde can describe: non-finite floats become `null`.
/// Such a payload would fail every later read of the key, so it is rejected up front.
pub(crate) fn encode_checked<T: Serialize + DeserializeOwned>(key: &str, value: &T) -> Result<Bytes, Error> {
    let payload = encode(key, value)?;
    serde_json::from_slice::<T>(&payload).map_err(|source| Error::Encode {
        key: key.to_owned(),
        source: Arc::new(source),
    })?;
    Ok(payload)
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, payload: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(payload).map_err(|source| Error::CorruptEntry {
        key: key.to_owned(),
        source: Arc::new(source),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Course {
        id: u32,
        name: String,
        tags: Vec<String>,
        credits: Option<f64>,
    }

    #[test]
    fn structured_values_survive_a_round_trip() {
        let courses = vec![
            Course {
                id: 1,
                name: "CS".to_owned(),
                tags: vec!["core".to_owned()],
                credits: Some(7.5),
            },
            Course {
                id: 2,
                name: "Ünïcödé \"quoted\"".to_owned(),
                tags: Vec::new(),
                credits: None,
            },
        ];

        let payload = encode("S_42_C", &courses).unwrap();
        let decoded: Vec<Course> = decode("S_42_C", &payload).unwrap();

        assert_eq!(decoded, courses);
    }

    #[test]
    fn maps_and_scalars_survive_a_round_trip() {
        let map = BTreeMap::from([("a".to_owned(), 1_i64), ("b".to_owned(), i64::MIN)]);
        let payload = encode("k", &map).unwrap();
        assert_eq!(decode::<BTreeMap<String, i64>>("k", &payload).unwrap(), map);

        let payload = encode("k", &u64::MAX).unwrap();
        assert_eq!(decode::<u64>("k", &payload).unwrap(), u64::MAX);
    }

    #[test]
    fn encodes_as_json() {
        let payload = encode("k", &vec![("id", 1)]).unwrap();
        assert_eq!(payload, Bytes::from_static(br#"[["id",1]]"#));
    }

    #[test]
    fn undecodable_payload_is_corrupt_entry() {
        let error = decode::<Vec<Course>>("S_42_C", b"{not json").unwrap_err();

        assert!(matches!(&error, Error::CorruptEntry { key, .. } if key == "S_42_C"));
    }

    #[test]
    fn type_mismatch_is_corrupt_entry() {
        let payload = encode("k", &"text").unwrap();
        let error = decode::<u32>("k", &payload).unwrap_err();

        assert!(matches!(error, Error::CorruptEntry { .. }));
    }

    #[test]
    fn unencodable_value_is_encode_error() {
        // JSON object keys must be strings.
        let map = BTreeMap::from([(vec![1_u8], 1_u8)]);
        let error = encode("k", &map).unwrap_err();

        assert!(matches!(&error, Error::Encode { key, .. } if key == "k"));
    }

    #[test]
    fn checked_encoding_rejects_lossy_values() {
        assert!(matches!(encode("k", &f64::NAN), Ok(payload) if payload == Bytes::from_static(b"null")));

        let error = encode_checked("k", &f64::NAN).unwrap_err();
        assert!(matches!(&error, Error::Encode { key, .. } if key == "k"));

        let error = encode_checked("k", &vec![1.0, f64::INFINITY]).unwrap_err();
        assert!(matches!(error, Error::Encode { .. }));
    }

    #[test]
    fn checked_encoding_keeps_faithful_values() {
        assert_eq!(encode_checked("k", &Some(2.5_f64)).unwrap(), Bytes::from_static(b"2.5"));
        assert_eq!(encode_checked("k", &None::<f64>).unwrap(), Bytes::from_static(b"null"));
    }
}
