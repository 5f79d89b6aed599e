//! Notification sending
//!
//! Sends templated HTML/text email through the transactional sender and
//! appends a row to the `order_emails` send history. The history row is
//! written only after a successful send.

pub mod templates;

use chrono::Utc;
use shared::models::{EmailType, OrderEmail, OrderType};

use crate::clients::{EmailClient, RecordStoreClient};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

pub use templates::EmailBody;

/// Notification sender bound to the email and store clients
pub struct NotificationService<'a> {
    email: &'a EmailClient,
    store: &'a RecordStoreClient,
}

impl<'a> NotificationService<'a> {
    pub fn new(state: &'a ServerState) -> Self {
        Self {
            email: &state.email,
            store: &state.store,
        }
    }

    /// Send an email and record it in the send history.
    ///
    /// Returns [`ErrorCode::EmailRecordFailed`] when the send succeeded
    /// but the history insert did not; callers that only care about
    /// delivery can treat that case as sent.
    pub async fn send_and_log(
        &self,
        order_id: &str,
        order_type: OrderType,
        email_type: EmailType,
        recipient: &str,
        body: &EmailBody,
    ) -> AppResult<()> {
        let message_id = self
            .email
            .send(recipient, &body.subject, &body.html, &body.text)
            .await?;

        tracing::info!(
            order_id = %order_id,
            order_type = %order_type,
            recipient = %recipient,
            message_id = %message_id,
            "Notification email sent"
        );

        let row = OrderEmail {
            id: None,
            order_id: order_id.to_string(),
            order_type,
            email_type,
            recipient_email: recipient.to_string(),
            sent_at: Utc::now(),
        };
        let row = serde_json::to_value(&row)
            .map_err(|e| AppError::internal(format!("Failed to serialize email row: {}", e)))?;
        self.store
            .insert("order_emails", &row)
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order_id, error = %e,
                    "Email sent but history row could not be recorded");
                AppError::with_message(ErrorCode::EmailRecordFailed, e.message)
            })?;

        Ok(())
    }

    /// Send the order confirmation for a completed submission
    pub async fn send_confirmation(
        &self,
        order_type: OrderType,
        order_id: &str,
        recipient: &str,
        first_name: &str,
    ) -> AppResult<()> {
        let body = templates::order_confirmation(order_type, order_id, first_name);
        self.send_and_log(order_id, order_type, EmailType::Confirmation, recipient, &body)
            .await
    }
}
