use crate::{config::ContractConfig, contract::page, model::Project};
use serde_json::Value;
use tracedb_core::{
    db::{access::AccessGate, history::HistoryReader, query::QueryEngine},
    prelude::*,
};

///
/// ProjectContract
///
/// Writes and point reads need an organization; bulk reads need the admin
/// role.
///

pub struct ProjectContract<'c> {
    config: &'c ContractConfig,
}

impl<'c> ProjectContract<'c> {
    #[must_use]
    pub const fn new(config: &'c ContractConfig) -> Self {
        Self { config }
    }

    fn admin(&self) -> Capability {
        Capability::role(self.config.admin_role.as_str())
    }

    pub fn insert<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        project: &Project,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;
        db.store().create(project)?;

        log::info!("project: inserted {}", project.id);

        Ok(())
    }

    /// Replace a stored project wholesale, moving its index entry when the
    /// origin attributes change.
    pub fn update<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        project: &Project,
    ) -> Result<Project, InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;

        db.store().replace(project)
    }

    pub fn transfer_project<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        id: &str,
        new_owner: &str,
        transfer_date: &str,
    ) -> Result<String, InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;

        let previous = db
            .store()
            .transfer::<Project>(id, new_owner, transfer_date)?;
        log::info!("project: {id} transferred from '{previous}' to '{new_owner}'");

        Ok(previous)
    }

    pub fn delete<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        id: &str,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;
        db.store().delete::<Project>(id)?;

        Ok(())
    }

    pub fn select_by_id<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<Project, InternalError> {
        AccessGate::authorize(state, &Capability::Member)?;

        QueryEngine::new(state).get(id)
    }

    pub fn exists<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<bool, InternalError> {
        AccessGate::authorize(state, &Capability::Member)?;

        QueryEngine::new(state).exists::<Project>(id)
    }

    pub fn select_all<S: LedgerState + ?Sized>(
        &self,
        state: &S,
    ) -> Result<Vec<Project>, InternalError> {
        AccessGate::authorize(state, &self.admin())?;

        QueryEngine::new(state).selector_query(&Selector::for_kind::<Project>())
    }

    /// Projects whose field `key` equals `value`.
    pub fn select_by_field<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        key: &str,
        value: &str,
    ) -> Result<Vec<Project>, InternalError> {
        AccessGate::authorize(state, &self.admin())?;
        let selector = Selector::for_kind::<Project>().eq(key, Value::from(value))?;

        QueryEngine::new(state).selector_query(&selector)
    }

    pub fn select_all_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Project>, InternalError> {
        AccessGate::authorize(state, &self.admin())?;

        page(
            self.config,
            state,
            &PageQuery::Selector(Selector::for_kind::<Project>()),
            page_size,
            bookmark,
        )
    }

    pub fn select_by_field_with_pagination<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        key: &str,
        value: &str,
        page_size: Option<u32>,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<Project>, InternalError> {
        AccessGate::authorize(state, &self.admin())?;
        let selector = Selector::for_kind::<Project>().eq(key, Value::from(value))?;

        page(
            self.config,
            state,
            &PageQuery::Selector(selector),
            page_size,
            bookmark,
        )
    }

    pub fn select_history<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<Vec<HistoryEntry<Project>>, InternalError> {
        AccessGate::authorize(state, &Capability::Member)?;

        HistoryReader::new(state).history(id)
    }

    /// Seed the reference project.
    pub fn init_ledger<S: LedgerState + ?Sized>(&self, state: &mut S) -> Result<(), InternalError> {
        self.insert(state, &reference_project())
    }
}

#[must_use]
pub fn reference_project() -> Project {
    Project {
        id: "IVSLAB23FA05A1ADC01".to_string(),
        name: "Surveillance product traceability".to_string(),
        developer: "PoC".to_string(),
        organization: "IVS-Orgs".to_string(),
        owner: "IVS-Orgs".to_string(),
        category: "blockchain".to_string(),
        describes: "Traceable, transparent supply-chain records for video surveillance products."
            .to_string(),
        ..Project::default()
    }
}
