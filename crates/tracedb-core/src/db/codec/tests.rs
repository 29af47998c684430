use super::*;
use crate::test_support::Gadget;
use proptest::prelude::*;

#[test]
fn encode_stamps_kind_and_decode_round_trips() {
    let gadget = Gadget::new("G1", "Security-Org", "lens");
    let bytes = encode(&gadget).expect("encode");

    assert_eq!(peek_kind(&bytes).as_deref(), Some(Gadget::KIND));
    let decoded: Gadget = decode(&bytes).expect("decode");
    assert_eq!(decoded, gadget);
}

#[test]
fn decode_rejects_foreign_kind() {
    let bytes = br#"{"docType":"asset","id":"G1","org":"x","label":"y"}"#;
    let err = decode::<Gadget>(bytes).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedRecord);
    assert!(err.message.contains("asset"));
}

#[test]
fn decode_rejects_missing_kind() {
    let bytes = br#"{"id":"G1","org":"x","label":"y"}"#;
    let err = decode::<Gadget>(bytes).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedRecord);
}

#[test]
fn encode_rejects_empty_required_field() {
    let gadget = Gadget::new("G1", "", "lens");
    let err = encode(&gadget).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedRecord);
    assert!(err.message.contains("org"));
}

#[test]
fn encode_rejects_empty_primary_key() {
    let gadget = Gadget::new("", "Security-Org", "lens");
    let err = encode(&gadget).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedRecord);
}

#[test]
fn index_key_rejects_delimiter_in_value() {
    let gadget = Gadget::new("G1", "Bad\u{0}Org", "lens");
    let err = index_key(&gadget).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedRecord);
}

#[test]
fn peek_kind_ignores_index_markers() {
    assert_eq!(peek_kind(&[0x00]), None);
    assert_eq!(peek_kind(b"[1,2]"), None);
}

#[test]
fn index_key_follows_descriptor_order() {
    let gadget = Gadget::new("G1", "Security-Org", "lens");
    let key = index_key(&gadget).expect("index key");
    let (namespace, values) = key.split();

    assert_eq!(namespace, Gadget::INDEX.namespace);
    assert_eq!(values, vec!["Security-Org", "G1"]);
    assert_eq!(key.last_value(), Some("G1"));
}

#[test]
fn composite_prefix_does_not_match_longer_value() {
    let prefix = CompositeKey::new("ns", &["Security-Org"]).unwrap();
    let exact = CompositeKey::new("ns", &["Security-Org", "G1"]).unwrap();
    let longer = CompositeKey::new("ns", &["Security-Org2", "G1"]).unwrap();
    let end = prefix.prefix_end();

    assert!(exact.as_str() >= prefix.as_str() && exact.as_str() < end.as_str());
    assert!(!(longer.as_str() >= prefix.as_str() && longer.as_str() < end.as_str()));
}

#[test]
fn composite_key_rejects_empty_namespace() {
    assert_eq!(
        CompositeKey::new::<&str>("", &[]).unwrap_err(),
        CompositeKeyError::EmptyNamespace
    );
}

#[test]
fn composite_key_from_raw_rejects_plain_keys() {
    assert_eq!(
        CompositeKey::from_raw("P1").unwrap_err(),
        CompositeKeyError::NotComposite
    );
}

proptest! {
    #[test]
    fn composite_prefix_bounds_exactly_matching_keys(
        owner in "[A-Za-z0-9-]{1,8}",
        other in "[A-Za-z0-9-]{1,8}",
        id in "[A-Za-z0-9]{1,8}",
    ) {
        let prefix = CompositeKey::new("ns", &[owner.as_str()]).unwrap();
        let end = prefix.prefix_end();
        let key = CompositeKey::new("ns", &[other.as_str(), id.as_str()]).unwrap();
        let in_range = key.as_str() >= prefix.as_str() && key.as_str() < end.as_str();

        prop_assert_eq!(in_range, owner == other);
    }

    #[test]
    fn composite_split_recovers_components(
        values in prop::collection::vec("[a-z0-9 .-]{0,6}", 0..5),
    ) {
        let key = CompositeKey::new("ns", &values).unwrap();
        let (namespace, split) = key.split();

        prop_assert_eq!(namespace, "ns");
        prop_assert_eq!(split, values.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
