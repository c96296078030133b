use std::{path::Path, sync::Arc};

use tracing::{debug, error};

use crate::{
    Error, Result,
    model::{NewUser, UserId, UserPatch, UserRecord, UserSummary},
    repository::config::{CoreConfig, StoreConfig},
    upload,
};

mod db;
mod rest;

pub mod config;
pub mod store;

pub use db::LocalStore;
pub use rest::RestStore;
pub use store::{RecordStore, StoreError};

/// Central access point for the `users` table.
///
/// The [`Repository`] wraps whichever [`RecordStore`] the configuration selects and
/// gives the views a single, consistent interface for reading and writing
/// records. Every failure is logged here before it is handed back to the caller.
#[derive(Clone, Debug)]
pub struct Repository {
    store: Arc<dyn RecordStore>,
}

impl Repository {
    /// Open the store selected by the configuration file.
    pub fn new() -> Result<Self> {
        let cfg = CoreConfig::load()?;
        let store: Arc<dyn RecordStore> = match &cfg.store {
            StoreConfig::Local { .. } => Arc::new(LocalStore::open(&cfg.local_db_path()?)?),
            StoreConfig::Rest(rest) => Arc::new(RestStore::new(rest)?),
        };

        Ok(Self { store })
    }

    /// A repository backed by a throwaway in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(Arc::new(LocalStore::in_memory()?)))
    }

    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All users, oldest first.
    pub fn users(&self) -> Result<Vec<UserSummary>> {
        let users = logged("fetching users", self.store.list_records())?;
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    pub fn user(&self, id: &UserId) -> Result<Option<UserRecord>> {
        logged("fetching user data", self.store.get_record(id))
    }

    pub fn add_user(&self, user: &NewUser) -> Result<UserId> {
        user.validate()?;
        let id = logged("adding user", self.store.insert_record(user))?;
        debug!("Added user {id} ({})", user.name);
        Ok(id)
    }

    pub fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        logged("updating user", self.store.update_record(id, patch))?;
        debug!(
            "Updated {} of user {id}",
            patch
                .fields()
                .map(|field| field.column())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }

    /// Apply a partial update and read the record back, the way every editor
    /// commits.
    pub fn update_and_fetch(&self, id: &UserId, patch: &UserPatch) -> Result<Option<UserRecord>> {
        self.update_user(id, patch)?;
        self.user(id)
    }

    pub fn remove_user(&self, id: &UserId) -> Result<()> {
        logged("deleting user", self.store.delete_record(id))?;
        debug!("Removed user {id}");
        Ok(())
    }

    /// Record a picked avatar. Only the file name is stored.
    pub fn set_avatar(&self, id: &UserId, path: &Path) -> Result<()> {
        let patch = upload::avatar_patch(path).ok_or_else(|| Error::NoFileName(path.into()))?;
        self.update_user(id, &patch)
    }

    /// Record a picked resume. Only the file name is stored.
    pub fn set_resume(&self, id: &UserId, path: &Path) -> Result<()> {
        let patch = upload::resume_patch(path).ok_or_else(|| Error::NoFileName(path.into()))?;
        self.update_user(id, &patch)
    }

    pub fn clear_resume(&self, id: &UserId) -> Result<()> {
        self.update_user(id, &upload::clear_resume_patch())
    }
}

/// Write store failures to the diagnostic log before handing them on.
fn logged<T>(action: &str, result: std::result::Result<T, StoreError>) -> Result<T> {
    result.map_err(|err| {
        error!("Error {action}: {err}");
        Error::Store(err)
    })
}
