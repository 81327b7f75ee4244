//! Error conversion helpers for I/O done by the services

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Attach a short description (and optionally a path) to an `io::Result`.
pub trait IoResultExt<T> {
    /// e.g. `fs.read_to_string(&p).with_path_context("read tree", &p)?`
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    fn with_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action.to_string(),
            source: Box::new(e),
        })
    }
}
