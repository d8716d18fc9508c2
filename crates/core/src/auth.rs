//! OAuth 1.0 tokens
//!
//! The three-legged flow: obtain a request token, send the user to
//! [`authorize_url`], then exchange the authorized request token for an
//! access token. Token replies are form-encoded
//! `oauth_token=...&oauth_token_secret=...` bodies.

use serde::{Deserialize, Serialize};

use crate::encode::encode_value;
use crate::endpoint::AUTHORIZE_URL;

/// OAuth key/secret pair, used both for the application and for user tokens
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub key: String,
    pub secret: String,
}

impl Token {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

/// Everything a signer needs to authenticate a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Application key and secret
    pub consumer: Token,
    /// Request or access token, once obtained
    pub token: Option<Token>,
}

impl Credentials {
    pub fn new(consumer: Token) -> Self {
        Self {
            consumer,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn token_secret(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.secret.as_str())
    }
}

/// Parse a token exchange reply
///
/// Returns `None` unless both `oauth_token` and `oauth_token_secret` are
/// present.
pub fn parse_token_reply(reply: &str) -> Option<Token> {
    let mut key = None;
    let mut secret = None;

    for pair in reply.trim().split('&') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value).ok()?.into_owned();
        match name {
            "oauth_token" => key = Some(value),
            "oauth_token_secret" => secret = Some(value),
            _ => {}
        }
    }

    Some(Token::new(key?, secret?))
}

/// Page where the user authorizes `request_token`
pub fn authorize_url(request_token: &Token) -> String {
    format!(
        "{AUTHORIZE_URL}?oauth_token={}",
        encode_value(&request_token.key)
    )
}
