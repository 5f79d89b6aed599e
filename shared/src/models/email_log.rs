//! Email send-history model
//!
//! Append-only log, one row per successfully sent notification. Rows are
//! never mutated; they disappear only through cascading order deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::OrderType;

/// Kind of notification that was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    /// Order confirmation sent at submission time
    Confirmation,
    /// Invoice notice
    Invoice,
    /// Free-form staff message
    Custom,
}

/// Email log row (`order_emails`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub order_id: String,
    pub order_type: OrderType,
    pub email_type: EmailType,
    pub recipient_email: String,
    pub sent_at: DateTime<Utc>,
}
