use std::{path::Path, sync::Arc};

use agdb::{Comparison, DbAny, DbId, DbKeyValue, QueryBuilder};
use derive_more::Deref;
use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    model::{FieldValue, NewUser, UserId, UserPatch, UserRecord, UserSummary},
    repository::{
        db::models::{CURRENT_MODEL_VERSION, ModelVersion, UserModel},
        store::{RecordStore, StoreError},
    },
};

pub(crate) mod models;

/// Handle to the embedded agdb database backing [`LocalStore`].
#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let path_str = path.to_string_lossy();

        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(&path_str)?)),
        };

        db.init()?;

        Ok(db)
    }

    /// Create a memory backed database
    pub fn in_memory() -> Result<Self, StoreError> {
        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("roster")?)),
        };

        db.init()?;

        Ok(db)
    }

    fn init(&mut self) -> Result<(), StoreError> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count == 0 {
            self.db
                .write()
                .transaction_mut(|t| -> Result<(), StoreError> {
                    t.exec_mut(
                        QueryBuilder::insert()
                            .nodes()
                            .aliases(["users", "model_version", "next_uid"])
                            .query(),
                    )?;

                    // Creation sequence handed to the next inserted user
                    t.exec_mut(
                        QueryBuilder::insert()
                            .values([[("next_uid", 0_u64).into()]])
                            .ids("next_uid")
                            .query(),
                    )?;

                    Ok(())
                })?;
        }

        let result = self.db.read().exec(
            QueryBuilder::select()
                .elements::<ModelVersion>()
                .search()
                .from("model_version")
                .where_()
                .neighbor()
                .query(),
        )?;

        let model_version: Option<ModelVersion> = result.try_into().into_iter().next();

        match model_version {
            Some(mv) if mv.version() > CURRENT_MODEL_VERSION => {
                return Err(StoreError::UnsupportedModel(mv.version()));
            }
            Some(_) => {}
            None => {
                self.db
                    .write()
                    .transaction_mut(|t| -> Result<(), StoreError> {
                        let model_version_id = t
                            .exec_mut(
                                QueryBuilder::insert()
                                    .element(ModelVersion::default())
                                    .query(),
                            )?
                            .elements
                            .first()
                            .map(|element| element.id)
                            .ok_or(StoreError::MissingId)?;

                        t.exec_mut(
                            QueryBuilder::insert()
                                .edges()
                                .from("model_version")
                                .to(model_version_id)
                                .query(),
                        )?;

                        Ok(())
                    })?;
            }
        }

        Ok(())
    }

    /// Find the node holding the user with the given id
    fn find(&self, id: &UserId) -> Result<Option<UserModel>, StoreError> {
        let result = self.db.read().exec(
            QueryBuilder::select()
                .elements::<UserModel>()
                .search()
                .from("users")
                .where_()
                .key("id")
                .value(Comparison::Equal(id.as_str().into()))
                .query(),
        )?;

        let mut models: Vec<UserModel> = result.try_into()?;
        Ok(models.pop())
    }
}

/// Record store kept on this machine in an agdb file.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Db,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        debug!("Opening local record store at {}", path.display());
        Ok(Self { db: Db::open(path)? })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: Db::in_memory()?,
        })
    }

    fn db_id(&self, id: &UserId) -> Result<Option<DbId>, StoreError> {
        Ok(self.db.find(id)?.and_then(|model| model.db_id))
    }
}

impl RecordStore for LocalStore {
    fn list_records(&self) -> Result<Vec<UserSummary>, StoreError> {
        let result = self.db.read().exec(
            QueryBuilder::select()
                .elements::<UserModel>()
                .search()
                .from("users")
                .where_()
                .neighbor()
                .query(),
        )?;

        let mut models: Vec<UserModel> = result.try_into()?;
        models.sort_by_key(|model| model.uid);

        Ok(models.iter().map(UserModel::summary).collect())
    }

    fn get_record(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.db
            .find(id)?
            .map(|model| model.into_record().map_err(StoreError::from))
            .transpose()
    }

    fn insert_record(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let id = Uuid::new_v4().to_string();

        self.db
            .write()
            .transaction_mut(|t| -> Result<(), StoreError> {
                let uid = t
                    .exec(
                        QueryBuilder::select()
                            .values("next_uid")
                            .ids("next_uid")
                            .query(),
                    )?
                    .elements
                    .pop()
                    .and_then(|mut element| element.values.pop())
                    .map(|kv| kv.value.to_u64())
                    .transpose()?
                    .unwrap_or_default();

                t.exec_mut(
                    QueryBuilder::insert()
                        .values([[("next_uid", uid + 1).into()]])
                        .ids("next_uid")
                        .query(),
                )?;

                let model = UserModel::new(uid, id.clone(), &user.name, &user.email, &user.contact);
                let user_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .map(|element| element.id)
                    .ok_or(StoreError::MissingId)?;

                // Link the user to the root "users" node
                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from("users")
                        .to(user_id)
                        .query(),
                )?;

                Ok(())
            })?;

        debug!("Inserted user {id}");

        Ok(id.into())
    }

    fn update_record(&self, id: &UserId, patch: &UserPatch) -> Result<(), StoreError> {
        let Some(db_id) = self.db_id(id)? else {
            warn!("Update of unknown user {id} ignored");
            return Ok(());
        };

        let mut written: Vec<DbKeyValue> = Vec::new();
        let mut cleared: Vec<&'static str> = Vec::new();

        for (field, value) in patch.iter() {
            match value {
                FieldValue::Text(Some(text)) => written.push((field.column(), text.clone()).into()),
                FieldValue::Text(None) => cleared.push(field.column()),
                FieldValue::WorkExperience(entries) => {
                    written.push((field.column(), serde_json::to_string(entries)?).into())
                }
            }
        }

        self.db
            .write()
            .transaction_mut(|t| -> Result<(), StoreError> {
                if !written.is_empty() {
                    t.exec_mut(QueryBuilder::insert().values(vec![written.clone()]).ids(db_id).query())?;
                }

                for key in &cleared {
                    t.exec_mut(QueryBuilder::remove().values(*key).ids(db_id).query())?;
                }

                Ok(())
            })
    }

    fn delete_record(&self, id: &UserId) -> Result<(), StoreError> {
        let Some(db_id) = self.db_id(id)? else {
            debug!("Delete of unknown user {id} ignored");
            return Ok(());
        };

        self.db
            .write()
            .exec_mut(QueryBuilder::remove().ids(db_id).query())?;

        debug!("Removed user {id}");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;
    use crate::model::{Field, WorkExperience};

    fn store() -> LocalStore {
        LocalStore::in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_list_in_creation_order() {
        let store = store();

        let first = store
            .insert_record(&NewUser::new("A", "a@x.com", "1"))
            .unwrap();
        let second = store
            .insert_record(&NewUser::new("B", "b@x.com", "2"))
            .unwrap();

        let users = store.list_records().unwrap();

        assert_ne!(first, second);
        assert_eq!(
            users.iter().map(|u| u.id.clone()).collect::<Vec<_>>(),
            vec![first, second]
        );
    }

    #[test]
    fn test_get_missing_is_none() {
        assert!(store().get_record(&"nope".into()).unwrap().is_none());
    }

    #[test]
    fn test_update_writes_and_clears_only_named_fields() {
        let store = store();
        let id = store
            .insert_record(&NewUser::new("A", "a@x.com", "1"))
            .unwrap();

        store
            .update_record(
                &id,
                &UserPatch::new()
                    .text(Field::Course, "CS")
                    .text(Field::ResumeUrl, "cv.pdf")
                    .work_experience(vec![WorkExperience {
                        domain: "Tech".into(),
                        subdomain: "Rust".into(),
                        experience: "1-3".into(),
                    }]),
            )
            .unwrap();
        store
            .update_record(&id, &UserPatch::new().clear(Field::ResumeUrl))
            .unwrap();

        let record = store.get_record(&id).unwrap().unwrap();

        assert_eq!(record.name, "A");
        assert_eq!(record.course.as_deref(), Some("CS"));
        assert_eq!(record.resume_url, None);
        assert_eq!(record.work_experience.len(), 1);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_clearing_contact_keeps_roster_readable() {
        let store = store();
        let id = store
            .insert_record(&NewUser::new("A", "a@x.com", "123"))
            .unwrap();

        store
            .update_record(&id, &UserPatch::new().clear(Field::Contact))
            .unwrap();

        assert_eq!(store.get_record(&id).unwrap().unwrap().contact, "");
        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let store = store();
        let id = store
            .insert_record(&NewUser::new("A", "a@x.com", "1"))
            .unwrap();

        store.delete_record(&id).unwrap();

        assert!(store.list_records().unwrap().is_empty());
        assert!(store.get_record(&id).unwrap().is_none());
        // Deleting again is not an error
        store.delete_record(&id).unwrap();
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.db");

        let id = {
            let store = LocalStore::open(&path).unwrap();
            store
                .insert_record(&NewUser::new("A", "a@x.com", "1"))
                .unwrap()
        };

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.get_record(&id).unwrap().unwrap().email, "a@x.com");
    }
}
