//! Authentication utilities for the Gate.io v4 API
//!
//! Requests are signed with HMAC-SHA512 over
//! `METHOD\nPATH\nQUERY\nHEX(SHA512(BODY))\nTIMESTAMP` using the API secret,
//! and sent with the `KEY`, `Timestamp` and `SIGN` headers.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::LadderError;

type HmacSha512 = Hmac<Sha512>;

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GATEIO_KEY";

/// Environment variable holding the API secret
pub const API_SECRET_VAR: &str = "GATEIO_SECRET";

/// Hex-encoded SHA-512 of a request body (empty string for no body)
pub fn hash_payload(body: &str) -> String {
    hex::encode(Sha512::digest(body.as_bytes()))
}

/// Generate the `SIGN` header value
///
/// # Example
///
/// ```
/// use gate_ladder::gateio::auth::sign_request;
///
/// let sign = sign_request("GET", "/api/v4/spot/accounts", "", "", 1700000000, "secret");
/// assert_eq!(sign.len(), 128);
/// ```
pub fn sign_request(
    method: &str,
    path: &str,
    query: &str,
    body: &str,
    timestamp: i64,
    secret: &str,
) -> String {
    let message = format!(
        "{}\n{}\n{}\n{}\n{}",
        method,
        path,
        query,
        hash_payload(body),
        timestamp
    );
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// API credentials container
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Load `.env`-style file then read the credentials from the
    /// environment. Variables already set in the process win over the file.
    pub fn from_env_file(path: &Path) -> Result<Self, LadderError> {
        match dotenv::from_path(path) {
            Ok(()) => debug!("Loaded environment from {}", path.display()),
            Err(e) => warn!("Could not load {}: {}", path.display(), e),
        }
        Self::from_env()
    }

    /// Read `GATEIO_KEY` and `GATEIO_SECRET`; both must be non-empty
    pub fn from_env() -> Result<Self, LadderError> {
        let api_key = non_empty_var(API_KEY_VAR);
        let api_secret = non_empty_var(API_SECRET_VAR);

        match (api_key, api_secret) {
            (Some(key), Some(secret)) => Ok(Self::new(key, secret)),
            (key, secret) => {
                let mut missing = Vec::new();
                if key.is_none() {
                    missing.push(API_KEY_VAR);
                }
                if secret.is_none() {
                    missing.push(API_SECRET_VAR);
                }
                Err(LadderError::MissingCredentials(missing))
            }
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request with this secret
    pub fn sign(&self, method: &str, path: &str, query: &str, body: &str, timestamp: i64) -> String {
        sign_request(method, path, query, body, timestamp, &self.api_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_empty_payload() {
        // SHA-512 of the empty string
        assert_eq!(
            hash_payload(""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn test_sign_request_shape() {
        let sign = sign_request("GET", "/api/v4/spot/accounts", "", "", 1_700_000_000, "secret");
        assert_eq!(sign.len(), 128);
        assert!(sign.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_consistency() {
        let a = sign_request("POST", "/api/v4/spot/orders", "", "{}", 1, "secret");
        let b = sign_request("POST", "/api/v4/spot/orders", "", "{}", 1, "secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_depends_on_every_part() {
        let base = sign_request("GET", "/api/v4/spot/orders", "limit=10", "", 1, "secret");
        assert_ne!(base, sign_request("POST", "/api/v4/spot/orders", "limit=10", "", 1, "secret"));
        assert_ne!(base, sign_request("GET", "/api/v4/spot/tickers", "limit=10", "", 1, "secret"));
        assert_ne!(base, sign_request("GET", "/api/v4/spot/orders", "limit=11", "", 1, "secret"));
        assert_ne!(base, sign_request("GET", "/api/v4/spot/orders", "limit=10", "x", 1, "secret"));
        assert_ne!(base, sign_request("GET", "/api/v4/spot/orders", "limit=10", "", 2, "secret"));
        assert_ne!(base, sign_request("GET", "/api/v4/spot/orders", "limit=10", "", 1, "other"));
    }

    #[test]
    fn test_credentials_sign_matches_free_function() {
        let creds = Credentials::new("key", "secret");
        assert_eq!(creds.api_key(), "key");
        assert_eq!(
            creds.sign("GET", "/api/v4/account/detail", "", "", 5),
            sign_request("GET", "/api/v4/account/detail", "", "", 5, "secret")
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("key", "super-secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("key"));
        assert!(!debug.contains("super-secret"));
    }
}
