//! drb-http: HTTP adapter for drb
//!
//! This crate provides the reqwest-based implementation of the Transport
//! trait and the OAuth 1.0 HMAC-SHA1 implementation of the Signer trait
//! defined in drb-core.

pub mod oauth;
pub mod transport;

use std::sync::Arc;

use drb_core::{Client, Result, Token};

pub use oauth::HmacSha1Signer;
pub use transport::ReqwestTransport;

/// Build a client talking to Dropbox over HTTPS
pub fn connect(app: Token, access_token: Option<Token>) -> Result<Client> {
    let transport = Arc::new(ReqwestTransport::new()?);
    let signer = Arc::new(HmacSha1Signer::new());

    let client = Client::new(app, transport, signer);
    Ok(match access_token {
        Some(token) => client.with_token(token),
        None => client,
    })
}
