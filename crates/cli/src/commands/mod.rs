//! Command implementations
//!
//! Each command loads the configuration, builds a client with the configured
//! defaults and maps failures onto [`ExitCode`]s.

pub mod account;
pub mod auth;
pub mod completions;
pub mod copy_ref;
pub mod delta;
pub mod fileops;
pub mod get;
pub mod ls;
pub mod put;
pub mod restore;
pub mod revisions;
pub mod search;
pub mod share;
pub mod stat;
pub mod thumbnail;

use drb_core::{Client, ConfigManager, Error, OptionId, ROOT_AUTO};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub output: OutputConfig,
    /// Overrides the configured root
    pub root: Option<String>,
}

/// Build an authorized client with the configured defaults applied
pub fn connect(global: &GlobalOptions, formatter: &Formatter) -> Result<Client, ExitCode> {
    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to locate configuration: {e}"));
            return Err(ExitCode::GeneralError);
        }
    };

    let config = match manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return Err(ExitCode::GeneralError);
        }
    };

    let (Some(app), Some(token)) = (config.app, config.token) else {
        formatter.error("Not authorized. Run `drb auth --key <KEY> --secret <SECRET>` first");
        return Err(ExitCode::AuthError);
    };

    let mut client = match drb_http::connect(app, Some(token)) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create client: {e}"));
            return Err(ExitCode::NetworkError);
        }
    };

    let root = global
        .root
        .clone()
        .or(config.defaults.root.clone())
        .unwrap_or_else(|| ROOT_AUTO.to_string());

    let mut defaults = config.defaults.to_options();
    defaults.push(OptionId::Root, root);

    if let Err(e) = client.set_default(defaults) {
        formatter.error(&format!("Invalid default option in configuration: {e}"));
        return Err(ExitCode::UsageError);
    }

    Ok(client)
}

/// Print `error` in context and pick the exit code
pub fn report(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from_error(error)
}

/// Remote paths always start with `/`
pub fn remote_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Last component of a remote path
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Render an RFC 2822 timestamp as `YYYY-MM-DD HH:MM`
pub fn format_modified(text: &str) -> String {
    match jiff::fmt::rfc2822::parse(text) {
        Ok(zoned) => zoned.strftime("%Y-%m-%d %H:%M").to_string(),
        Err(_) => text.to_string(),
    }
}
