//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Render { .. } => crate::exitcode::UNAVAILABLE,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::EmptyRoot | DomainError::Parse(_)) => {
            crate::exitcode::DATAERR
        }
        ApplicationError::InputNotFound(_) => crate::exitcode::NOINPUT,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => {
            if let Some(InfraError::Render { .. }) = source.downcast_ref::<InfraError>() {
                crate::exitcode::UNAVAILABLE
            } else if source.is::<std::io::Error>() {
                crate::exitcode::IOERR
            } else {
                crate::exitcode::SOFTWARE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_root_when_mapping_then_data_error() {
        let err = CliError::from(ApplicationError::Domain(DomainError::EmptyRoot));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(err.to_string(), "input tree list is empty: no root node");
    }

    #[test]
    fn given_renderer_failure_when_mapping_then_unavailable() {
        let err = CliError::from(ApplicationError::OperationFailed {
            context: "dot".into(),
            source: Box::new(InfraError::Render {
                message: "boom".into(),
                exit_code: Some(1),
            }),
        });
        assert_eq!(err.exit_code(), crate::exitcode::UNAVAILABLE);
    }

    #[test]
    fn given_config_error_when_mapping_then_config_code() {
        let err = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
