// Shared fixtures for contract scenario tests.
#![allow(dead_code)]

use tracedb_contract::model::Part;
use tracedb_core::db::ledger::{IdentityAttributes, Timestamp};

pub fn ts(seconds: i64) -> Timestamp {
    Timestamp::new(seconds, 0)
}

pub fn admin() -> IdentityAttributes {
    IdentityAttributes::member("Brand-Org", Some("admin"))
}

pub fn member(organization: &str) -> IdentityAttributes {
    IdentityAttributes::member(organization, None)
}

pub fn part(pid: &str, organization: &str) -> Part {
    Part {
        pid: pid.to_string(),
        manufacturer: "Security.Co".to_string(),
        manufacture_location: "Taiwan".to_string(),
        part_name: "SecurityChip-v1".to_string(),
        part_number: "SPN3R1C00AA1".to_string(),
        organization: organization.to_string(),
        manufacture_date: "2024-01-01".to_string(),
        transfer_date: String::new(),
    }
}

pub fn pids(parts: &[Part]) -> Vec<&str> {
    parts.iter().map(|p| p.pid.as_str()).collect()
}
