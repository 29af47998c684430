//! Supply-chain traceability contracts over tracedb.
//!
//! Parts move between organizations until the assembly organization holds
//! all four components of an asset. Projects and users are kept alongside.
//! Each entry point takes the host transaction context and authorizes the
//! caller before touching state.
#![warn(unreachable_pub)]

pub mod config;
pub mod contract;
pub mod model;

pub use config::{ConfigError, ContractConfig};
pub use contract::{AssetContract, PartContract, ProjectContract, UserContract, init_ledger};
