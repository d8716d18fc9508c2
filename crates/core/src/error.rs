//! Error taxonomy for the drb client
//!
//! Local errors carry small positive codes (1-8). Server failures surface the
//! HTTP status verbatim, so callers that only look at [`Error::code`] see the
//! same integers the Dropbox API documents.

use crate::option::OptionId;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Code reported for a successful call
pub const CODE_OK: u16 = 0;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A plumbing option required by the endpoint has no value and no default
    #[error("Missing option: {0}")]
    MissingOption(OptionId),

    /// The option has no descriptor or no query form for this endpoint
    #[error("Unknown option: {0}")]
    UnknownOption(OptionId),

    /// The option appears twice in one call
    #[error("Duplicated option: {0}")]
    DuplicatedOption(OptionId),

    #[error("Invalid value for {option}: {reason}")]
    InvalidValue { option: OptionId, reason: String },

    #[error("Memory allocation failed")]
    Alloc,

    /// Something that should not happen has happened
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Network issue: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Non-200 answer from the server
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Integer code of this error
    ///
    /// Local codes are 1 to 8; server errors return the HTTP status (> 100).
    pub fn code(&self) -> u16 {
        match self {
            Error::MissingOption(_) => 1,
            Error::UnknownOption(_) => 2,
            Error::DuplicatedOption(_) => 3,
            Error::InvalidValue { .. } => 4,
            Error::Alloc => 5,
            Error::Unknown(_) | Error::Config(_) | Error::Io(_) => 6,
            Error::Network(_) => 7,
            Error::Timeout => 8,
            Error::Server { status, .. } => *status,
        }
    }

    /// Whether the error was produced before or around the network call,
    /// as opposed to being reported by the server
    pub fn is_local(&self) -> bool {
        !matches!(self, Error::Server { .. })
    }

    /// Static description of a local error code
    pub fn local_description(&self) -> Option<&'static str> {
        let message = match self.code() {
            1 => "Missing option",
            2 => "Unknown option",
            3 => "Duplicated option",
            4 => "Invalid value",
            5 => "Memory allocation failed",
            6 => "Unknown error",
            7 => "Network issue",
            8 => "Request timed out",
            _ => return None,
        };
        Some(message)
    }

    /// Message a caller would show in place of the result record
    ///
    /// Local errors use their static description, server errors the text of
    /// the JSON `error` field when the server sent one.
    pub fn output_message(&self) -> Option<String> {
        match self {
            Error::Server { message, .. } => message.clone(),
            _ => self.local_description().map(str::to_string),
        }
    }

    pub(crate) fn invalid(option: OptionId, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            option,
            reason: reason.into(),
        }
    }
}
