mod asset;
mod part;
mod project;
mod seed;
mod user;

pub use asset::AssetContract;
pub use part::PartContract;
pub use project::{ProjectContract, reference_project};
pub use seed::{init_ledger, reference_asset, reference_parts};
pub use user::UserContract;

use crate::config::ContractConfig;
use tracedb_core::{db::cursor::Paginator, prelude::*};

// Fetch one page after clamping the caller's page size to the config.
fn page<R, S>(
    config: &ContractConfig,
    state: &S,
    query: &PageQuery,
    page_size: Option<u32>,
    bookmark: &Bookmark,
) -> Result<PaginatedResult<R>, InternalError>
where
    R: Record,
    S: LedgerState + ?Sized,
{
    let page_size = config.page_size(page_size)?;

    Paginator::new(state).page(query, page_size, bookmark)
}

fn parse_selector(query: &str) -> Result<Selector, InternalError> {
    Ok(Selector::parse(query)?)
}
