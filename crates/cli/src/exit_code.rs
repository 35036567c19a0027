//! Process exit codes
//!
//! Scripts rely on these values; do not renumber.

use bfs_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Failure with no more specific code, or differences found by `diff`
    GeneralError = 1,
    /// Bad arguments or configuration
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a core error
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Config(_) | Error::TomlDe(_) | Error::TomlSer(_) => ExitCode::UsageError,
            Error::Network(_) => ExitCode::NetworkError,
            Error::Auth(_) => ExitCode::AuthError,
            Error::NotFound(_) => ExitCode::NotFound,
            Error::Io(_) => ExitCode::GeneralError,
        }
    }
}
