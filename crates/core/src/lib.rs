//! drb-core: Core library for the drb Dropbox client
//!
//! This crate provides the core functionality for drb, including:
//! - The option registry and typed option lists
//! - Argument resolution against per-endpoint rules and client defaults
//! - Request assembly for every Core API endpoint
//! - A growable in-memory stream for upload and download payloads
//! - Response records and JSON decoding
//! - Configuration management
//!
//! HTTP and OAuth signing are reached through the [`Transport`] and
//! [`Signer`] traits, so the crate does not depend on any HTTP stack.

pub mod auth;
pub mod client;
pub mod config;
pub mod defaults;
pub mod encode;
pub mod endpoint;
pub mod error;
pub mod json;
pub mod option;
pub mod resolve;
pub mod stream;
pub mod traits;
pub mod types;

pub use auth::{Credentials, Token, authorize_url, parse_token_reply};
pub use client::{Client, METADATA_HEADER, PreparedRequest, memory_sink};
pub use config::{Config, ConfigManager, DefaultOptions};
pub use defaults::Defaults;
pub use endpoint::{Endpoint, Method, Style};
pub use error::{Error, Result};
pub use option::{
    IoHandle, OptionId, OptionSet, Options, ROOT_AUTO, ROOT_DROPBOX, ROOT_SANDBOX, Value,
};
pub use resolve::{OptionRules, QueryString};
pub use stream::{StreamBuffer, pipe};
pub use traits::{HttpRequest, HttpResponse, RequestBody, Signer, Transport};
pub use types::{
    AccountInfo, CopyRef, Delta, DeltaEntry, Link, Metadata, MetadataList, PollDelta, QuotaInfo,
};
