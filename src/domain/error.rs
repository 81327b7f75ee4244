//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent unusable tree input.
/// Everything recoverable (unparseable amounts, budget exhaustion) is not an error.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("input tree list is empty: no root node")]
    EmptyRoot,

    #[error("invalid tree document: {0}")]
    Parse(String),
}
