use mimo_core::error::CoreError;

/// Error from a repository operation that enforces business rules inside a
/// transaction (e.g. registering a sale).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
