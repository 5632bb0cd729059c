//! API credentials for the stream handshake
//!
//! # Security
//!
//! The key secret is held in a [`SecretString`], which zeroizes memory on drop
//! and keeps the value out of `Debug` output. It is only exposed while the
//! auth frame is being serialized.

use luno_types::{AuthRequest, LunoError, LunoResult};
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the API key ID
pub const API_KEY_ID_ENV: &str = "LUNO_API_KEY_ID";
/// Environment variable holding the API key secret
pub const API_KEY_SECRET_ENV: &str = "LUNO_API_KEY_SECRET";

/// Luno API key pair
pub struct Credentials {
    api_key_id: String,
    api_key_secret: SecretString,
}

impl Credentials {
    /// Create credentials from a key ID and secret
    pub fn new(api_key_id: impl Into<String>, api_key_secret: impl Into<String>) -> Self {
        Self {
            api_key_id: api_key_id.into(),
            api_key_secret: SecretString::from(api_key_secret.into()),
        }
    }

    /// Create credentials from environment variables
    ///
    /// Reads `LUNO_API_KEY_ID` and `LUNO_API_KEY_SECRET`.
    pub fn from_env() -> LunoResult<Self> {
        let api_key_id = std::env::var(API_KEY_ID_ENV)
            .map_err(|_| LunoError::MissingCredentials(API_KEY_ID_ENV.to_string()))?;
        let api_key_secret = std::env::var(API_KEY_SECRET_ENV)
            .map_err(|_| LunoError::MissingCredentials(API_KEY_SECRET_ENV.to_string()))?;

        Ok(Self::new(api_key_id, api_key_secret))
    }

    /// Get the API key ID
    pub fn api_key_id(&self) -> &str {
        &self.api_key_id
    }

    /// Serialize the auth frame sent first on every connection
    ///
    /// The returned string contains the secret; never log it.
    pub fn auth_frame(&self) -> LunoResult<String> {
        let request = AuthRequest::new(&self.api_key_id, self.api_key_secret.expose_secret());
        serde_json::to_string(&request).map_err(|e| LunoError::InvalidJson {
            message: e.to_string(),
            raw: None,
        })
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_key_id: self.api_key_id.clone(),
            api_key_secret: SecretString::from(self.api_key_secret.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"[REDACTED]")
            .finish()
    }
}
