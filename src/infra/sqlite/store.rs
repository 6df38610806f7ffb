use std::path::PathBuf;

use crate::infra::sqlite::queries::{delete_setting, load_setting, upsert_setting};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::store::{LocalStore, StoreError};

pub struct SqliteStore {
    pub db_path: PathBuf,
}

impl LocalStore for SqliteStore {
    fn init(&self) -> Result<(), StoreError> {
        init_db(&self.db_path).map_err(|err| StoreError::Message(err.to_string()))
    }

    fn load_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        load_setting(&self.db_path, key).map_err(|err| StoreError::Message(err.to_string()))
    }

    fn save_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        upsert_setting(&self.db_path, key, value)
            .map_err(|err| StoreError::Message(err.to_string()))
    }

    fn delete_setting(&self, key: &str) -> Result<(), StoreError> {
        delete_setting(&self.db_path, key).map_err(|err| StoreError::Message(err.to_string()))
    }
}
