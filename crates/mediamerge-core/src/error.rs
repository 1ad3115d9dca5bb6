use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unparseable capture date on original asset: {value:?}")]
    DateParse { value: Option<String> },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Media decode error: {0}")]
    Media(String),

    #[error("{0}")]
    Other(String),
}

/// True when a SQLite error is a constraint violation, e.g. a second insert
/// of the same (original, duplicate) match link. These are recovered locally
/// instead of aborting the detection pass.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
