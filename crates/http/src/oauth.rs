//! OAuth 1.0 HMAC-SHA1 request signing
//!
//! Implements the signature method of RFC 5849:
//! <https://www.rfc-editor.org/rfc/rfc5849#section-3.4>
//!
//! 1. Collect the request parameters and the protocol parameters
//! 2. Normalize them into a sorted, encoded parameter string
//! 3. Build the signature base string from method, base URI and parameters
//! 4. Sign it with `HMAC-SHA1(enc(consumer_secret)&enc(token_secret))`

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use url::Url;

use drb_core::{Credentials, Error, Method, QueryString, Result, Signer};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding: everything but `ALPHA DIGIT - . _ ~`
fn enc(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signer producing `oauth_*` parameters with an HMAC-SHA1 signature
#[derive(Debug, Default)]
pub struct HmacSha1Signer {
    counter: AtomicU64,
}

impl HmacSha1Signer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign with an explicit timestamp and nonce
    pub fn sign_at(
        &self,
        method: Method,
        url: &str,
        params: &QueryString,
        credentials: &Credentials,
        timestamp: u64,
        nonce: &str,
    ) -> Result<String> {
        let mut pairs = Vec::new();
        for (name, value) in params.pairs() {
            pairs.push((decode(name)?, decode(value)?));
        }

        pairs.push(("oauth_consumer_key".into(), credentials.consumer.key.clone()));
        pairs.push(("oauth_nonce".into(), nonce.to_string()));
        pairs.push(("oauth_signature_method".into(), SIGNATURE_METHOD.into()));
        pairs.push(("oauth_timestamp".into(), timestamp.to_string()));
        if let Some(token) = &credentials.token {
            pairs.push(("oauth_token".into(), token.key.clone()));
        }
        pairs.push(("oauth_version".into(), OAUTH_VERSION.into()));

        let normalized = normalize_parameters(&pairs);
        let base = base_string(method, url, &normalized)?;

        let key = format!(
            "{}&{}",
            enc(&credentials.consumer.secret),
            enc(credentials.token_secret())
        );
        let signature = hmac_sha1_base64(key.as_bytes(), base.as_bytes())?;

        Ok(format!("{normalized}&oauth_signature={}", enc(&signature)))
    }

    /// Hex SHA-256 of the current time and a per-signer counter
    fn nonce(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        let mut hasher = Sha256::new();
        hasher.update(nanos.to_le_bytes());
        hasher.update(count.to_le_bytes());
        hasher.update(std::process::id().to_le_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..32].to_string()
    }
}

impl Signer for HmacSha1Signer {
    fn sign(
        &self,
        method: Method,
        url: &str,
        params: &QueryString,
        credentials: &Credentials,
    ) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.sign_at(method, url, params, credentials, timestamp, &self.nonce())
    }
}

fn decode(value: &str) -> Result<String> {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .map_err(|e| Error::Unknown(format!("undecodable parameter {value:?}: {e}")))
}

/// Encode and sort `pairs`, joined as `name=value&...`
pub fn normalize_parameters(pairs: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(name, value)| (enc(name), enc(value)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signature base string for an already normalized parameter string
pub fn base_string(method: Method, url: &str, normalized: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Unknown(format!("invalid URL {url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Unknown(format!("URL without host: {url}")))?
        .to_ascii_lowercase();

    // Url::port() is None for the scheme's default port
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };
    let base_uri = format!("{}://{authority}{}", parsed.scheme(), parsed.path());

    Ok(format!(
        "{}&{}&{}",
        method.as_str(),
        enc(&base_uri),
        enc(normalized)
    ))
}

fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac =
        HmacSha1::new_from_slice(key).map_err(|e| Error::Unknown(format!("HMAC key: {e}")))?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drb_core::Token;

    fn photos_credentials() -> Credentials {
        Credentials::new(Token::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44"))
            .with_token(Token::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00"))
    }

    fn photos_params() -> QueryString {
        let mut params = QueryString::new();
        params.append("file", "vacation.jpg");
        params.append("size", "original");
        params
    }

    #[test]
    fn test_reference_base_string() {
        let signed = HmacSha1Signer::new()
            .sign_at(
                Method::Get,
                "http://photos.example.net/photos",
                &photos_params(),
                &photos_credentials(),
                1191242096,
                "kllo9940pd9333jh",
            )
            .unwrap();
        let normalized = signed.split("&oauth_signature=").next().unwrap();

        assert_eq!(
            base_string(Method::Get, "http://photos.example.net/photos", normalized).unwrap(),
            "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg\
             %26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh\
             %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096\
             %26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
        );
    }

    #[test]
    fn test_reference_signature() {
        let signed = HmacSha1Signer::new()
            .sign_at(
                Method::Get,
                "http://photos.example.net/photos",
                &photos_params(),
                &photos_credentials(),
                1191242096,
                "kllo9940pd9333jh",
            )
            .unwrap();

        assert!(signed.ends_with("&oauth_signature=tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D"));
    }

    #[test]
    fn test_base_uri_normalization() {
        let base = base_string(Method::Post, "HTTPS://API.Dropbox.com:443/1/delta?x=1", "a=b").unwrap();
        assert_eq!(base, "POST&https%3A%2F%2Fapi.dropbox.com%2F1%2Fdelta&a%3Db");

        let base = base_string(Method::Get, "http://example.com:8080/p", "").unwrap();
        assert_eq!(base, "GET&http%3A%2F%2Fexample.com%3A8080%2Fp&");
    }

    #[test]
    fn test_path_parameters_are_reencoded() {
        let mut params = QueryString::new();
        params.append("path", "/a%20b/c");
        let credentials = Credentials::new(Token::new("k", "s"));

        let signed = HmacSha1Signer::new()
            .sign_at(Method::Post, "https://api.dropbox.com/1/fileops/delete", &params, &credentials, 1, "n")
            .unwrap();
        assert!(signed.contains("path=%2Fa%20b%2Fc"));
        assert!(!signed.contains("oauth_token="));
    }

    #[test]
    fn test_nonce_changes() {
        let signer = HmacSha1Signer::new();
        let first = signer.nonce();
        let second = signer.nonce();
        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }
}
