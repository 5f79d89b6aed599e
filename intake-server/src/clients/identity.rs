//! Staff identity provider client
//!
//! Credentials, sessions and MFA factors are owned entirely by the
//! identity provider; this client passes tokens through and decodes the
//! provider's HS256 access token for the assurance-level claim.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::utils::{AppError, AppResult, ErrorCode};

/// TOTP factor as reported by the provider, referenced by id and status only
#[derive(Debug, Clone, Deserialize)]
pub struct MfaFactor {
    pub id: String,
    pub factor_type: String,
    pub status: String,
}

impl MfaFactor {
    /// A factor only counts once the provider has verified enrollment
    pub fn is_verified_totp(&self) -> bool {
        self.factor_type == "totp" && self.status == "verified"
    }
}

/// Staff account as reported by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub factors: Vec<MfaFactor>,
}

/// Session returned by password sign-in and MFA verification
#[derive(Debug, Clone, Deserialize)]
pub struct SignInSession {
    pub access_token: String,
    pub user: IdentityUser,
}

/// Claims decoded from the provider's access token
#[derive(Debug, Clone, Deserialize)]
pub struct StaffClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    /// Authenticator assurance level: "aal1" or "aal2"
    #[serde(default)]
    pub aal: Option<String>,
}

/// Client for the staff identity provider
#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
    api_key: String,
    jwt_secret: String,
}

impl IdentityClient {
    pub fn new(http: Client, base_url: String, api_key: String, jwt_secret: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            jwt_secret,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Password sign-in; yields an `aal1` session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<SignInSession> {
        let resp = self
            .http
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| provider_error(format!("Identity provider unreachable: {}", e)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AppError::invalid_credentials());
        }
        if !status.is_success() {
            return Err(provider_error(format!("Identity provider returned {}", status)));
        }

        resp.json()
            .await
            .map_err(|e| provider_error(format!("Invalid identity provider response: {}", e)))
    }

    /// Fetch the user (including MFA factors) for an access token
    pub async fn get_user(&self, access_token: &str) -> AppResult<IdentityUser> {
        let resp = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| provider_error(format!("Identity provider unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(provider_error(format!(
                "Identity provider returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| provider_error(format!("Invalid identity provider response: {}", e)))
    }

    /// List the MFA factors attached to an access token's account
    pub async fn list_factors(&self, access_token: &str) -> AppResult<Vec<MfaFactor>> {
        Ok(self.get_user(access_token).await?.factors)
    }

    /// Start an MFA challenge for a factor, returning the challenge id
    pub async fn create_mfa_challenge(
        &self,
        access_token: &str,
        factor_id: &str,
    ) -> AppResult<String> {
        let resp = self
            .http
            .post(self.auth_url(&format!("/factors/{}/challenge", factor_id)))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| provider_error(format!("Identity provider unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(provider_error(format!(
                "Identity provider returned {}",
                resp.status()
            )));
        }

        #[derive(Deserialize)]
        struct Challenge {
            id: String,
        }
        let challenge: Challenge = resp
            .json()
            .await
            .map_err(|e| provider_error(format!("Invalid identity provider response: {}", e)))?;
        Ok(challenge.id)
    }

    /// Verify a TOTP code against a challenge; yields an `aal2` session
    pub async fn verify_mfa_challenge(
        &self,
        access_token: &str,
        factor_id: &str,
        challenge_id: &str,
        code: &str,
    ) -> AppResult<SignInSession> {
        let resp = self
            .http
            .post(self.auth_url(&format!("/factors/{}/verify", factor_id)))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&json!({ "challenge_id": challenge_id, "code": code }))
            .send()
            .await
            .map_err(|e| provider_error(format!("Identity provider unreachable: {}", e)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Invalid verification code",
            ));
        }
        if !status.is_success() {
            return Err(provider_error(format!("Identity provider returned {}", status)));
        }

        resp.json()
            .await
            .map_err(|e| provider_error(format!("Invalid identity provider response: {}", e)))
    }

    /// Decode and validate the provider's access token locally
    pub fn decode_claims(&self, access_token: &str) -> AppResult<StaffClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["authenticated"]);
        validation.set_required_spec_claims(&["sub", "exp", "aud"]);

        let data = decode::<StaffClaims>(
            access_token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

        Ok(data.claims)
    }
}

fn provider_error(msg: String) -> AppError {
    AppError::with_message(ErrorCode::IdentityProviderError, msg)
}
