//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Infrastructure errors wrap application errors and add process-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// The external graph renderer could not be run or exited non-zero.
    #[error("graph renderer failed: {message}")]
    Render {
        message: String,
        exit_code: Option<i32>,
    },
}
