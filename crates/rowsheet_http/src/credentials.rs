use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, Request};
use ring::signature::RsaKeyPair;
use rowsheet_error::{ErrorKind, Result, ResultExt, SheetsError};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::{HttpClient, read_checked_json_response, set_form_body};

/// Read and write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// A service account key as downloaded from the cloud console.
#[derive(Debug, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        let account: Self = serde_json::from_str(input)
            .context("Failed to deserialize json service account key")?;
        if account.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(SheetsError::new("Credentials are not a service account key")
                .with_kind(ErrorKind::Initialization)
                .with_field("type", account.key_type));
        }
        Ok(account)
    }

    pub fn try_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context_fn(|| format!("Failed to read credentials file '{}'", path.display()))?;
        Self::try_from_str(&content)
    }

    /// Build a signed RS256 JWT asserting this service account for `scope`.
    pub fn signed_jwt(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp() as u64;
        let exp = (now + Duration::hours(1)).timestamp() as u64;

        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat,
            exp,
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_string(&header).context("Failed to encode jwt header")?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_string(&claims).context("Failed to encode jwt claims")?);
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let key_pair = self.key_pair()?;

        // Sign with PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| SheetsError::new("Failed to sign payload"))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{}.{}", signing_input, sig_b64))
    }

    /// Fetch an access token for `scope` using this service account.
    pub async fn fetch_access_token<C>(&self, client: &C, scope: &str) -> Result<AccessToken>
    where
        C: HttpClient,
    {
        let jwt = self.signed_jwt(scope, Utc::now())?;

        // Exchange the JWT for an access token
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())];
        let url = Url::parse(&self.token_uri).context("Failed to parse token uri as url")?;
        let mut request = Request::new(Method::POST, url);
        set_form_body(&mut request, &params)?;

        debug!(client_email = %self.client_email, %scope, "exchanging jwt for access token");
        let resp = client.do_request(request).await?;
        let tok_resp: AccessToken = read_checked_json_response(resp)
            .await
            .map_err(|e| e.wrap("Token exchange rejected"))?;

        Ok(tok_resp)
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader).context("invalid PEM private key")?;
        let key_pair = match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
                    .map_err(|_| SheetsError::new("Failed to create rsa key pair from pkcs8 key"))?
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der())
                    .map_err(|_| SheetsError::new("Failed to create rsa key pair from pkcs1 key"))?
            }
            _ => return Err(SheetsError::new("Missing key").with_kind(ErrorKind::Initialization)),
        };
        Ok(key_pair)
    }
}
