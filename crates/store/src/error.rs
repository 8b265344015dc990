use thiserror::Error;

/// Errors raised while applying a mutation plan.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with an existing primary key.
    #[error("Row already exists in {table}: {key}")]
    AlreadyExists { table: &'static str, key: String },

    /// An update targeted a key that does not exist.
    #[error("Row not found in {table}: {key}")]
    RowNotFound { table: &'static str, key: String },

    /// An insert did not carry a value for the table's key column.
    #[error("Insert into {table} is missing key column {column}")]
    MissingKey {
        table: &'static str,
        column: &'static str,
    },

    /// The store refused the transaction (connectivity, contention, shutdown).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
