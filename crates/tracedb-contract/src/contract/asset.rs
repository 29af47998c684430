use crate::{
    config::ContractConfig,
    contract::{page, parse_selector},
    model::{Asset, Part},
};
use tracedb_core::{
    db::{access::AccessGate, history::HistoryReader, query::QueryEngine},
    prelude::*,
};

///
/// AssetContract
///
/// Entry points for assembled assets. Every operation requires the admin
/// role.
///

pub struct AssetContract<'c> {
    config: &'c ContractConfig,
}

impl<'c> AssetContract<'c> {
    #[must_use]
    pub const fn new(config: &'c ContractConfig) -> Self {
        Self { config }
    }

    fn admin(&self) -> Capability {
        Capability::role(self.config.admin_role.as_str())
    }

    fn authorize<S: LedgerState + ?Sized>(&self, state: &S) -> Result<(), InternalError> {
        AccessGate::authorize(state, &self.admin()).map(|_| ())
    }

    /// Assemble an asset from four parts already held by the assembly
    /// organization.
    ///
    /// Each component is replaced by the part as currently stored, so the
    /// asset embeds ledger state rather than caller-supplied copies.
    pub fn create_asset<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        asset: &Asset,
    ) -> Result<Asset, InternalError> {
        let mut db = Db::new(state);
        db.authorize(&self.admin())?;
        asset.validate()?;

        let mut assembled = asset.clone();
        {
            let query = db.query();
            for (slot, component) in assembled.components_mut() {
                let stored: Part = query.get(&component.pid)?;
                if stored.organization != self.config.assembly_organization {
                    return Err(RecordError::InvalidField {
                        kind: Asset::KIND,
                        field: slot,
                        reason: format!(
                            "part {} is held by '{}', not '{}'",
                            stored.pid, stored.organization, self.config.assembly_organization
                        ),
                    }
                    .into());
                }
                *component = stored;
            }
        }

        db.store().create(&assembled)?;
        log::info!("asset: assembled {} by '{}'", assembled.id, assembled.made_by);

        Ok(assembled)
    }

    pub fn read_asset<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<Asset, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).get(id)
    }

    pub fn asset_exists<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<bool, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).exists::<Asset>(id)
    }

    pub fn delete_asset<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        id: &str,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&self.admin())?;
        db.store().delete::<Asset>(id)?;

        log::info!("asset: deleted {id}");

        Ok(())
    }

    pub fn get_all_assets<S: LedgerState + ?Sized>(
        &self,
        state: &S,
    ) -> Result<Vec<Asset>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).all()
    }

    /// Assets with IDs in `[start, end)`; empty bounds are open.
    pub fn get_assets_by_range<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        start: &str,
        end: &str,
    ) -> Result<Vec<Asset>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).range_scan(start, end)
    }

    pub fn query_assets_by_owner<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        made_by: &str,
    ) -> Result<Vec<Asset>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).attribute_scan(Asset::INDEX.namespace, &[made_by])
    }

    pub fn query_assets<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        query: &str,
    ) -> Result<Vec<Asset>, InternalError> {
        self.authorize(state)?;
        let selector = parse_selector(query)?;

        QueryEngine::new(state).selector_query(&selector)
    }

    pub fn query_assets_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        query: &str,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Asset>, InternalError> {
        self.authorize(state)?;
        let selector = parse_selector(query)?;

        page(
            self.config,
            state,
            &PageQuery::Selector(selector),
            page_size,
            bookmark,
        )
    }

    /// Assets whose serial number lies in `[start, end]`, one page at a time.
    pub fn get_assets_by_range_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        start: &str,
        end: &str,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Asset>, InternalError> {
        self.authorize(state)?;
        let selector = Selector::for_kind::<Asset>().between("SerialNumber", start, end)?;

        page(
            self.config,
            state,
            &PageQuery::Selector(selector),
            page_size,
            bookmark,
        )
    }

    pub fn asset_history<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<Vec<HistoryEntry<Asset>>, InternalError> {
        self.authorize(state)?;

        HistoryReader::new(state).history(id)
    }
}
