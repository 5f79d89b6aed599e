//! Invoice model
//!
//! Mirrors the payment processor's invoice object. Rows are created and
//! updated exclusively by webhook delivery (upsert on
//! `stripe_invoice_id`), never by direct client action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invoice status as reported by the payment processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Open,
    Paid,
    Unpaid,
    Void,
    Uncollectible,
}

impl InvoiceStatus {
    /// Parse a processor-side status string
    pub fn from_processor(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "open" => Some(Self::Open),
            "paid" => Some(Self::Paid),
            "unpaid" => Some(Self::Unpaid),
            "void" => Some(Self::Void),
            "uncollectible" => Some(Self::Uncollectible),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::Void => "void",
            Self::Uncollectible => "uncollectible",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label for an order's invoice state; absent means the
/// synthetic "No Invoice"
pub fn status_label(status: Option<InvoiceStatus>) -> &'static str {
    match status {
        Some(s) => s.as_str(),
        None => "No Invoice",
    }
}

/// Invoice row (`invoices`), keyed by `stripe_invoice_id` with a
/// back-reference to the owning order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub stripe_invoice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub status: InvoiceStatus,
    /// Amount due in the smallest currency unit (cents)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_invoice_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
