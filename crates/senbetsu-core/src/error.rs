use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SenbetsuError {
    #[error("no entity id given")]
    InvalidEntity,

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("filter actor closed")]
    ActorClosed,
}

impl From<rusqlite::Error> for SenbetsuError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(StoreError::Sqlite(e))
    }
}
