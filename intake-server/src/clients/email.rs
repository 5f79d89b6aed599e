//! Transactional email client

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Client for the third-party transactional email API
#[derive(Clone)]
pub struct EmailClient {
    http: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(http: Client, base_url: String, api_key: String, from: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from,
        }
    }

    /// Send an HTML + text email, returning the provider's message id
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> AppResult<String> {
        let resp = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": subject,
                "html": html,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::EmailSendFailed,
                    format!("Email sender unreachable: {}", e),
                )
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(to = %to, status = %status, body = %body, "Email send failed");
            return Err(AppError::with_message(
                ErrorCode::EmailSendFailed,
                format!("Email sender returned {}", status),
            ));
        }

        let sent: SendResponse = resp.json().await.map_err(|e| {
            AppError::with_message(
                ErrorCode::EmailSendFailed,
                format!("Invalid email sender response: {}", e),
            )
        })?;
        Ok(sent.id)
    }
}
