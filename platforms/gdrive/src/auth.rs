use std::{
    path::Path,
    time::{Duration, Instant},
};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use kiroku::{ArchiveError, ArchiveResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Only grants access to files created by this application.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: i64 = 3600;
/// Tokens are refreshed this long before the issuer's expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// The JSON key file of a Google Cloud service account.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub r#type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub async fn from_file(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ArchiveError::Credentials(format!("{}: {e}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> ArchiveResult<Self> {
        let key: Self =
            serde_json::from_str(data).map_err(|e| ArchiveError::Credentials(e.to_string()))?;
        if key.r#type != "service_account" {
            return Err(ArchiveError::Credentials(format!(
                "unsupported credentials type: {}",
                key.r#type
            )));
        }
        Ok(key)
    }

    /// Signed JWT asserting this account for `scope`.
    fn assertion(&self, scope: &str) -> ArchiveResult<String> {
        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| ArchiveError::Credentials(format!("private key: {e}")))?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| ArchiveError::Credentials(format!("sign assertion: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// A bearer token and the instant it stops being used.
#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(value: String, expires_in: u64) -> Self {
        let lifetime = Duration::from_secs(expires_in).saturating_sub(EXPIRY_MARGIN);
        Self {
            value,
            refresh_at: Instant::now() + lifetime,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

pub enum DriveAuth {
    /// Exchange a service account assertion for a token, again whenever it expires.
    ServiceAccount {
        key: ServiceAccountKey,
        scope: String,
        token: Mutex<Option<CachedToken>>,
    },
    /// A token obtained elsewhere.
    AccessToken(String),
}

impl DriveAuth {
    pub fn service_account(key: ServiceAccountKey) -> Self {
        Self::ServiceAccount {
            key,
            scope: DRIVE_FILE_SCOPE.to_string(),
            token: Mutex::new(None),
        }
    }

    pub async fn token(&self, client: &Client) -> ArchiveResult<String> {
        match self {
            DriveAuth::ServiceAccount { key, scope, token } => {
                let mut cached = token.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                    return Ok(token.value.clone());
                }

                let token = fetch_token(client, key, scope).await?;
                let value = token.value.clone();
                *cached = Some(token);
                Ok(value)
            }
            DriveAuth::AccessToken(token) => Ok(token.clone()),
        }
    }
}

async fn fetch_token(
    client: &Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> ArchiveResult<CachedToken> {
    let assertion = key.assertion(scope)?;
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;
    let response = ArchiveError::check_status(response).await?;

    let token: TokenResponse = serde_json::from_str(&response.text().await?)?;
    log::debug!(
        "Obtained drive token for {}, expires in {}s",
        key.client_email,
        token.expires_in
    );
    Ok(CachedToken::new(token.access_token, token.expires_in))
}
