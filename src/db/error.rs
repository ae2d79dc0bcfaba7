use thiserror::Error;

/// Failures reading or writing the local store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON value under an `app_meta` key no longer deserializes.
    #[error("stored value '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A row holds a value our types cannot represent.
    #[error("invalid {table} record: {detail}")]
    InvalidRecord { table: &'static str, detail: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
