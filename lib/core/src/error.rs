use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures while reading a catalog from its source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Catalog source unavailable: {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("Malformed catalog: {0}")]
    Malformed(String),

    #[error("Duplicate product id '{id}' at rows {first_row} and {second_row}")]
    DuplicateId {
        id: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Cannot build a similarity engine from an empty catalog")]
    EmptyCatalog,

    #[error("Product not found: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}
