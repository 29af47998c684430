use crate::{
    config::ContractConfig,
    contract::{page, parse_selector},
    model::Part,
};
use tracedb_core::{
    db::{access::AccessGate, history::HistoryReader, query::QueryEngine},
    prelude::*,
};

///
/// PartContract
///
/// Entry points for component parts. Every operation requires the admin
/// role.
///

pub struct PartContract<'c> {
    config: &'c ContractConfig,
}

impl<'c> PartContract<'c> {
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

    pub fn create_part<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        part: &Part,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&self.admin())?;
        db.store().create(part)?;

        log::info!("part: created {} held by '{}'", part.pid, part.organization);

        Ok(())
    }

    pub fn read_part<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        pid: &str,
    ) -> Result<Part, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).get(pid)
    }

    pub fn part_exists<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        pid: &str,
    ) -> Result<bool, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).exists::<Part>(pid)
    }

    /// Hand a part to another organization, returning the previous holder.
    pub fn transfer_part<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        pid: &str,
        transfer_date: &str,
        new_organization: &str,
    ) -> Result<String, InternalError> {
        let mut db = Db::new(state);
        db.authorize(&self.admin())?;

        let previous = db
            .store()
            .transfer::<Part>(pid, new_organization, transfer_date)?;
        log::info!("part: {pid} transferred from '{previous}' to '{new_organization}'");

        Ok(previous)
    }

    pub fn delete_part<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        pid: &str,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&self.admin())?;
        db.store().delete::<Part>(pid)?;

        log::info!("part: deleted {pid}");

        Ok(())
    }

    pub fn get_all_parts<S: LedgerState + ?Sized>(
        &self,
        state: &S,
    ) -> Result<Vec<Part>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).all()
    }

    /// Parts with PIDs in `[start, end)`; empty bounds are open.
    pub fn get_parts_by_range<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        start: &str,
        end: &str,
    ) -> Result<Vec<Part>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).range_scan(start, end)
    }

    /// Parts currently held by one organization.
    pub fn query_parts_by_owner<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        organization: &str,
    ) -> Result<Vec<Part>, InternalError> {
        self.authorize(state)?;

        QueryEngine::new(state).attribute_scan(Part::INDEX.namespace, &[organization])
    }

    pub fn query_parts<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        query: &str,
    ) -> Result<Vec<Part>, InternalError> {
        self.authorize(state)?;
        let selector = parse_selector(query)?;

        QueryEngine::new(state).selector_query(&selector)
    }

    pub fn query_parts_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        query: &str,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Part>, InternalError> {
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

    /// Parts held by one organization, one page at a time.
    pub fn query_parts_by_owner_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        organization: &str,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Part>, InternalError> {
        self.authorize(state)?;

        page(
            self.config,
            state,
            &PageQuery::attribute(Part::INDEX.namespace, &[organization]),
            page_size,
            bookmark,
        )
    }

    pub fn part_history<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        pid: &str,
    ) -> Result<Vec<HistoryEntry<Part>>, InternalError> {
        self.authorize(state)?;

        HistoryReader::new(state).history(pid)
    }
}
