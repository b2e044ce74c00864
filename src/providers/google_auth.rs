use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use super::ensure_success;

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/spreadsheets",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before Google says the token expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields we need from a service-account JSON key file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Access tokens for a service account via the JWT bearer grant.
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials in {}", path.display()))?;
        Ok(Self::new(key))
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.request_token(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims<'_> {
        let iat = now.timestamp();
        Claims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat,
            exp: iat + 3600,
        }
    }

    async fn request_token(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .context("Service account private key is not a valid RSA PEM")?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)
            .context("Failed to sign service account assertion")?;

        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("Google token request failed")?;

        let body: TokenResponse = ensure_success(resp, "Google token request")
            .await?
            .json()
            .await
            .context("Failed to parse Google token response")?;

        Ok(CachedToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(body.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "sync@project.iam.gserviceaccount.com".into(),
            private_key: "unused".into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
        }
    }

    #[test]
    fn claims_cover_sheets_and_drive_for_an_hour() {
        let tokens = ServiceAccountTokens::new(key());
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = tokens.claims(now);
        assert_eq!(claims.iss, "sync@project.iam.gserviceaccount.com");
        assert_eq!(claims.aud, DEFAULT_TOKEN_URI);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.scope.contains("auth/spreadsheets"));
        assert!(claims.scope.contains("auth/drive.file"));
    }

    #[test]
    fn key_file_defaults_token_uri() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type": "service_account", "client_email": "a@b.c", "private_key": "pem"}}"#
        )
        .unwrap();
        let tokens = ServiceAccountTokens::from_file(file.path()).unwrap();
        assert_eq!(tokens.key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(tokens.key.client_email, "a@b.c");
    }

    #[test]
    fn missing_key_file_is_an_error() {
        let err = ServiceAccountTokens::from_file(Path::new("/nonexistent/key.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read credentials"));
    }

    #[tokio::test]
    async fn cached_token_is_reused() {
        let tokens = ServiceAccountTokens::new(key());
        *tokens.cached.lock().await = Some(CachedToken {
            token: "ya29.cached".into(),
            expires_at: Utc::now() + Duration::seconds(600),
        });
        assert_eq!(tokens.access_token().await.unwrap(), "ya29.cached");
    }

    #[tokio::test]
    async fn invalid_private_key_fails_before_any_request() {
        let tokens = ServiceAccountTokens::new(key());
        let err = tokens.access_token().await.unwrap_err();
        assert!(err.to_string().contains("not a valid RSA PEM"));
    }
}
