mod common;

use common::{admin, part, ts};
use tracedb_contract::{
    AssetContract, ContractConfig, PartContract, contract::reference_asset, init_ledger,
    model::Asset,
};
use tracedb_core::{db::memory::MemoryLedger, prelude::*};

fn seeded() -> MemoryLedger {
    let config = ContractConfig::default();
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin("init", ts(1), admin());
    init_ledger(&config, &mut tx).unwrap();
    tx.commit();

    ledger
}

#[test]
fn init_ledger_assembles_reference_asset() {
    let config = ContractConfig::default();
    let mut ledger = seeded();
    let parts = PartContract::new(&config);
    let assets = AssetContract::new(&config);

    let tx = ledger.begin("read", ts(2), admin());
    let held = parts.query_parts_by_owner(&tx, "Brand-Org").unwrap();
    assert_eq!(held.len(), 4);
    assert!(held.iter().all(|p| p.transfer_date == "2023-05-15"));

    let asset = assets.read_asset(&tx, "IVSLAB-PVC23FG0001").unwrap();
    assert_eq!(asset.made_by, "Brand.Co");
    for (_, component) in asset.components() {
        assert_eq!(component.organization, "Brand-Org");
        assert!(!component.manufacturer.is_empty());
    }

    let by_maker = assets.query_assets_by_owner(&tx, "Brand.Co").unwrap();
    assert_eq!(by_maker.len(), 1);
    assert!(assets.asset_exists(&tx, "IVSLAB-PVC23FG0001").unwrap());
    assert!(!assets.asset_exists(&tx, "IVSLAB-S23FA0001").unwrap());
}

#[test]
fn assembly_rejects_parts_held_elsewhere() {
    let config = ContractConfig::default();
    let parts = PartContract::new(&config);
    let assets = AssetContract::new(&config);
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin("tx1", ts(1), admin());
    for component in reference_asset().components() {
        let pid = component.1.pid.clone();
        parts.create_part(&mut tx, &part(&pid, "Brand-Org")).unwrap();
    }
    parts
        .transfer_part(&mut tx, "IVSLAB-C23FA0001", "2024-01-02", "CMOS-Org")
        .unwrap();
    tx.commit();

    let mut tx = ledger.begin("tx2", ts(2), admin());
    let err = assets.create_asset(&mut tx, &reference_asset()).unwrap_err();
    assert_eq!(err.class, ErrorClass::MalformedRecord);
    assert!(err.message.contains("CMOSChip"));
    assert!(!assets.asset_exists(&tx, "IVSLAB-PVC23FG0001").unwrap());
}

#[test]
fn assembly_requires_parts_on_the_ledger() {
    let config = ContractConfig::default();
    let assets = AssetContract::new(&config);
    let mut ledger = MemoryLedger::new();

    let mut tx = ledger.begin("tx1", ts(1), admin());
    let err = assets.create_asset(&mut tx, &reference_asset()).unwrap_err();
    assert!(err.is_not_found());

    let mut incomplete = reference_asset();
    incomplete.network_chip = Default::default();
    let err = assets.create_asset(&mut tx, &incomplete).unwrap_err();
    assert_eq!(err.class, ErrorClass::MalformedRecord);
}

#[test]
fn serial_number_range_is_inclusive_and_paged() {
    let config = ContractConfig::default();
    let assets = AssetContract::new(&config);
    let mut ledger = seeded();

    let mut tx = ledger.begin("tx1", ts(3), admin());
    for (id, serial) in [("A2", "SN-002"), ("A3", "SN-003"), ("A4", "SN-004")] {
        let mut asset = reference_asset();
        asset.id = id.to_string();
        asset.serial_number = serial.to_string();
        assets.create_asset(&mut tx, &asset).unwrap();
    }
    tx.commit();

    let tx = ledger.begin("read", ts(4), admin());
    let first = assets
        .get_assets_by_range_with_pagination(&tx, "SN-002", "SN-004", Some(2), &Bookmark::first())
        .unwrap();
    assert_eq!(first.fetched_records_count, 2);
    assert!(first.has_more());

    let second = assets
        .get_assets_by_range_with_pagination(&tx, "SN-002", "SN-004", Some(2), &first.bookmark)
        .unwrap();
    assert_eq!(second.fetched_records_count, 1);
    assert!(!second.has_more());

    let mut ids: Vec<String> = first
        .records
        .iter()
        .chain(&second.records)
        .map(|a: &Asset| a.id.clone())
        .collect();
    ids.sort();
    assert_eq!(ids, ["A2", "A3", "A4"]);
}

#[test]
fn asset_history_ends_with_tombstone() {
    let config = ContractConfig::default();
    let assets = AssetContract::new(&config);
    let mut ledger = seeded();

    let mut tx = ledger.begin("tx-delete", ts(50), admin());
    assets.delete_asset(&mut tx, "IVSLAB-PVC23FG0001").unwrap();
    tx.commit();

    let tx = ledger.begin("read", ts(60), admin());
    let history = assets.asset_history(&tx, "IVSLAB-PVC23FG0001").unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[1].is_delete);
    assert_eq!(history[1].record.serial_number, "IVSPN902300AACDC01");
    assert!(assets.get_all_assets(&tx).unwrap().is_empty());
}
