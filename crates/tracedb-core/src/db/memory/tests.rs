use super::*;
use crate::test_support::{admin, ts};

fn doc(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

fn seeded() -> MemoryLedger {
    let mut ledger = MemoryLedger::new();
    let mut tx = ledger.begin("seed", ts(1), admin());
    tx.put("P1", &doc(r#"{"docType":"part","owner":"Security-Org","qty":3}"#))
        .unwrap();
    tx.put("P2", &doc(r#"{"docType":"part","owner":"Brand-Org","qty":7}"#))
        .unwrap();
    tx.put("P3", &doc(r#"{"docType":"part","owner":"Security-Org","qty":11}"#))
        .unwrap();
    tx.put("A1", &doc(r#"{"docType":"asset","maker":"Brand-Org"}"#))
        .unwrap();
    tx.put("\u{0}parts-by-org\u{0}Security-Org\u{0}P1\u{0}", &[0x00])
        .unwrap();
    tx.commit();

    ledger
}

fn keys(iter: StateScanIter<'_>) -> Vec<String> {
    iter.map(|entry| entry.unwrap().key).collect()
}

#[test]
fn commit_applies_all_staged_writes() {
    let mut ledger = MemoryLedger::new();
    let mut tx = ledger.begin("tx1", ts(1), admin());
    tx.put("a", b"1").unwrap();
    tx.put("b", b"2").unwrap();
    tx.commit();

    assert_eq!(ledger.committed("a"), Some(&b"1"[..]));
    assert_eq!(ledger.committed("b"), Some(&b"2"[..]));
    assert_eq!(ledger.len(), 2);
}

#[test]
fn abort_discards_staged_writes() {
    let mut ledger = seeded();
    let before = ledger.len();

    let mut tx = ledger.begin("tx2", ts(2), admin());
    tx.put("P9", b"{}").unwrap();
    tx.delete("P1").unwrap();
    tx.abort();

    assert_eq!(ledger.len(), before);
    assert!(ledger.committed("P1").is_some());
    assert!(ledger.committed("P9").is_none());
}

#[test]
fn dropped_transaction_leaves_ledger_untouched() {
    let mut ledger = MemoryLedger::new();
    {
        let mut tx = ledger.begin("tx1", ts(1), admin());
        tx.put("a", b"1").unwrap();
    }

    assert!(ledger.is_empty());
}

#[test]
fn reads_observe_own_staged_writes() {
    let mut ledger = seeded();
    let mut tx = ledger.begin("tx2", ts(2), admin());

    tx.put("P9", b"x").unwrap();
    tx.delete("P1").unwrap();

    assert_eq!(tx.get("P9").unwrap(), Some(b"x".to_vec()));
    assert_eq!(tx.get("P1").unwrap(), None);
    assert_eq!(keys(tx.range_scan("P", "Q").unwrap()), ["P2", "P3", "P9"]);
}

#[test]
fn put_rejects_empty_key() {
    let mut ledger = MemoryLedger::new();
    let mut tx = ledger.begin("tx1", ts(1), admin());

    assert!(matches!(tx.put("", b"x"), Err(LedgerError::InvalidQuery(_))));
}

#[test]
fn range_scan_is_half_open_and_ordered() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    assert_eq!(keys(tx.range_scan("P1", "P3").unwrap()), ["P1", "P2"]);
    assert!(keys(tx.range_scan("P3", "P1").unwrap()).is_empty());
    assert!(keys(tx.range_scan("P2", "P2").unwrap()).is_empty());
}

#[test]
fn open_range_scan_includes_composite_keys_first() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    let all = keys(tx.range_scan("", "").unwrap());
    assert_eq!(all.len(), 5);
    assert!(is_composite(&all[0]));
}

#[test]
fn rich_query_matches_equality_and_skips_index_entries() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    let hits = keys(
        tx.rich_query(r#"{"selector":{"docType":"part","owner":"Security-Org"}}"#)
            .unwrap(),
    );
    assert_eq!(hits, ["P1", "P3"]);
}

#[test]
fn rich_query_supports_comparison_operators() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    let run = |query: &str| keys(tx.rich_query(query).unwrap());

    assert_eq!(run(r#"{"selector":{"qty":{"$gt":3}}}"#), ["P2", "P3"]);
    assert_eq!(run(r#"{"selector":{"qty":{"$gte":3,"$lt":11}}}"#), ["P1", "P2"]);
    assert_eq!(run(r#"{"selector":{"qty":{"$lte":7}}}"#), ["P1", "P2"]);
    assert_eq!(
        run(r#"{"selector":{"owner":{"$in":["Brand-Org","Other-Org"]}}}"#),
        ["P2"]
    );
    assert_eq!(
        run(r#"{"selector":{"docType":"part","owner":{"$ne":"Brand-Org"}}}"#),
        ["P1", "P3"]
    );
    assert_eq!(run(r#"{"selector":{"maker":{"$exists":true}}}"#), ["A1"]);
    assert_eq!(
        run(r#"{"selector":{"docType":{"$eq":"part"},"maker":{"$exists":false}}}"#),
        ["P1", "P2", "P3"]
    );
}

#[test]
fn rich_query_supports_combinators() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    let hits = keys(
        tx.rich_query(r#"{"selector":{"$or":[{"qty":3},{"maker":"Brand-Org"}]}}"#)
            .unwrap(),
    );
    assert_eq!(hits, ["A1", "P1"]);

    let hits = keys(
        tx.rich_query(r#"{"selector":{"$and":[{"docType":"part"},{"qty":{"$gt":5}}]}}"#)
            .unwrap(),
    );
    assert_eq!(hits, ["P2", "P3"]);
}

#[test]
fn mixed_types_never_compare() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    assert!(
        keys(tx.rich_query(r#"{"selector":{"qty":{"$gt":"1"}}}"#).unwrap()).is_empty()
    );
}

#[test]
fn rich_query_rejects_malformed_queries() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());

    for query in [
        "not json",
        "[]",
        r#"{"use_index":"x"}"#,
        r#"{"selector":1}"#,
        r#"{"selector":{"qty":{"$regex":"x"}}}"#,
        r#"{"selector":{"$nor":[]}}"#,
        r#"{"selector":{"$or":{}}}"#,
    ] {
        assert!(
            matches!(tx.rich_query(query), Err(LedgerError::InvalidQuery(_))),
            "query accepted: {query}"
        );
    }
}

#[test]
fn paginated_rich_query_walks_pages_with_bookmarks() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());
    let query = r#"{"selector":{"docType":"part"}}"#;

    let (page, meta) = tx.rich_query_paginated(query, 2, "").unwrap();
    assert_eq!(keys(page), ["P1", "P2"]);
    assert_eq!(meta.fetched_records_count, 2);
    assert!(!meta.bookmark.is_empty());

    let (page, meta) = tx.rich_query_paginated(query, 2, &meta.bookmark).unwrap();
    assert_eq!(keys(page), ["P3"]);
    assert_eq!(meta.fetched_records_count, 1);
    assert!(meta.bookmark.is_empty());
}

#[test]
fn paginated_rich_query_rejects_zero_page_and_bad_bookmark() {
    let mut ledger = seeded();
    let tx = ledger.begin("read", ts(2), admin());
    let query = r#"{"selector":{"docType":"part"}}"#;

    assert!(tx.rich_query_paginated(query, 0, "").is_err());
    assert!(tx.rich_query_paginated(query, 2, "zz").is_err());
}

#[test]
fn history_records_each_commit_in_order() {
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin("tx1", ts(10), admin());
    tx.put("P1", b"v1").unwrap();
    tx.commit();

    let mut tx = ledger.begin("tx2", ts(20), admin());
    tx.put("P1", b"v2").unwrap();
    tx.commit();

    let mut tx = ledger.begin("tx3", ts(30), admin());
    tx.delete("P1").unwrap();
    tx.commit();

    let tx = ledger.begin("read", ts(40), admin());
    assert_eq!(tx.history_order(), crate::db::ledger::HistoryOrder::CommitOrder);

    let log: Vec<KeyModification> = tx.history_for("P1").unwrap().map(Result::unwrap).collect();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].tx_id, "tx1");
    assert_eq!(log[1].value, b"v2");
    assert_eq!(log[1].timestamp, ts(20));
    assert!(log[2].is_delete);
    assert!(log[2].value.is_empty());
}

#[test]
fn history_of_unknown_key_is_empty() {
    let mut ledger = MemoryLedger::new();
    let tx = ledger.begin("read", ts(1), admin());

    assert_eq!(tx.history_for("missing").unwrap().count(), 0);
}

#[test]
fn transaction_reports_its_identity() {
    let mut ledger = MemoryLedger::new();
    let tx = ledger.begin("tx1", ts(1), admin());

    assert_eq!(tx.tx_id(), "tx1");
    assert_eq!(
        tx.current_identity().unwrap().organization(),
        Some("Brand-Org")
    );
}
