//! Process exit codes
//!
//! Scripts can rely on these values staying stable.

/// Exit code returned by the `drb` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Unclassified failure
    GeneralError = 1,
    /// Bad arguments or invalid option values
    UsageError = 2,
    /// Network failure or timeout
    NetworkError = 3,
    /// Missing or rejected credentials
    AuthError = 4,
    /// The path does not exist
    NotFound = 5,
}

impl ExitCode {
    /// Map a client error to the exit code a script should see
    pub fn from_error(error: &drb_core::Error) -> Self {
        use drb_core::Error;

        match error {
            Error::MissingOption(_)
            | Error::UnknownOption(_)
            | Error::DuplicatedOption(_)
            | Error::InvalidValue { .. } => ExitCode::UsageError,
            Error::Network(_) | Error::Timeout => ExitCode::NetworkError,
            Error::Server { status: 401, .. } | Error::Server { status: 403, .. } => {
                ExitCode::AuthError
            }
            Error::Server { status: 404, .. } => ExitCode::NotFound,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
