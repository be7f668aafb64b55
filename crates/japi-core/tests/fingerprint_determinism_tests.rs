// Property tests for the fingerprint codec
// Determinism across calls and independence from map insertion order

use japi_core::fingerprint::{FingerprintCodec, FINGERPRINT_HEX_LEN};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(value in json_value()) {
        let codec = FingerprintCodec;
        let (bytes1, fp1) = codec.encode(&value).unwrap();
        let (bytes2, fp2) = codec.encode(&value).unwrap();

        prop_assert_eq!(bytes1, bytes2);
        prop_assert_eq!(fp1.as_str().len(), FINGERPRINT_HEX_LEN);
        prop_assert_eq!(fp1, fp2);
    }

    #[test]
    fn insertion_order_does_not_change_fingerprint(
        entries in prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..12)
    ) {
        let codec = FingerprintCodec;

        let forward: HashMap<String, i32> = entries.iter().cloned().collect();
        let mut reversed_map = Map::new();
        for (k, v) in entries.iter().rev() {
            // keep the last write for duplicate keys, same as the HashMap
            if !reversed_map.contains_key(k) {
                reversed_map.insert(k.clone(), Value::from(forward[k]));
            }
        }

        let a = codec.encode(&forward).unwrap().1;
        let b = codec.encode(&Value::Object(reversed_map)).unwrap().1;
        prop_assert_eq!(a, b);
    }
}

#[test]
fn test_known_payload_fingerprint_is_stable() {
    // Pinned so a codec change is caught before it invalidates stored histories
    let codec = FingerprintCodec;
    let bytes = codec
        .serialize(&serde_json::json!({"params": ["user", "bb"]}))
        .unwrap();
    assert_eq!(bytes, br#"{"params":["user","bb"]}"#.to_vec());
    assert_eq!(codec.fingerprint(&bytes), codec.fingerprint(&bytes));
}
