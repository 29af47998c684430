use crate::{config::ContractConfig, model::User};
use tracedb_core::{
    db::{access::AccessGate, query::QueryEngine},
    prelude::*,
};

///
/// UserContract
///

pub struct UserContract<'c> {
    config: &'c ContractConfig,
}

impl<'c> UserContract<'c> {
    #[must_use]
    pub const fn new(config: &'c ContractConfig) -> Self {
        Self { config }
    }

    pub fn create_user<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        username: &str,
        name: &str,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;

        db.store().create(&User::new(username, name))
    }

    pub fn read_user<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        username: &str,
    ) -> Result<User, InternalError> {
        AccessGate::authorize(state, &Capability::Member)?;

        QueryEngine::new(state).get(username)
    }

    /// Rename a user; the `users-by-name` entry follows the new name.
    pub fn update_user<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        username: &str,
        name: &str,
    ) -> Result<User, InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;

        db.store().update::<User, _>(username, |user| {
            user.name = name.to_string();
            Ok(())
        })
    }

    pub fn delete_user<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        username: &str,
    ) -> Result<(), InternalError> {
        let mut db = Db::new(state);
        db.authorize(&Capability::Member)?;
        db.store().delete::<User>(username)?;

        Ok(())
    }

    pub fn user_exists<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        username: &str,
    ) -> Result<bool, InternalError> {
        AccessGate::authorize(state, &Capability::Member)?;

        QueryEngine::new(state).exists::<User>(username)
    }

    pub fn get_all_users<S: LedgerState + ?Sized>(
        &self,
        state: &S,
    ) -> Result<Vec<User>, InternalError> {
        AccessGate::authorize(state, &Capability::role(self.config.admin_role.as_str()))?;

        QueryEngine::new(state).all()
    }

    /// Seed the reference user.
    pub fn init_ledger<S: LedgerState + ?Sized>(&self, state: &mut S) -> Result<(), InternalError> {
        self.create_user(state, "SF.Chen", "SF.Chen")
    }
}
