//! Errors raised by repository operations that enforce a domain rule inside
//! a transaction.

use hms_core::error::CoreError;

/// Either the rule rejected the operation (and the transaction was rolled
/// back) or the database failed.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
