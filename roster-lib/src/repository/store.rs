use std::fmt::Debug;

use thiserror::Error;

use crate::model::{NewUser, UserId, UserPatch, UserRecord, UserSummary};

/// Any failure reaching the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Internal database error {0}")]
    Database(#[from] agdb::DbError),
    #[error("Request to the record store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Record store answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Record store returned no id for the new record")]
    MissingId,
    #[error("Database was written by a newer version (model version {0})")]
    UnsupportedModel(u64),
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// The CRUD contract every backend of the `users` table fulfils.
///
/// Updates carry no concurrency token: concurrent writers race, and the last
/// write to a given column wins.
pub trait RecordStore: Send + Sync + Debug {
    /// All records, oldest first.
    fn list_records(&self) -> Result<Vec<UserSummary>, StoreError>;

    /// A single record. A missing record is `Ok(None)`, not an error.
    fn get_record(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    fn insert_record(&self, user: &NewUser) -> Result<UserId, StoreError>;

    /// Write exactly the columns named by `patch`. Unknown ids are ignored.
    fn update_record(&self, id: &UserId, patch: &UserPatch) -> Result<(), StoreError>;

    /// Unknown ids are ignored.
    fn delete_record(&self, id: &UserId) -> Result<(), StoreError>;
}
