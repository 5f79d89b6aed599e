//! Order models
//!
//! Two order variants exist: "Living" (artwork from a tattoo on a living
//! person) and "Memoriam" (artwork from a tattoo photographed after
//! passing, coordinated with a funeral home). Rows are created
//! near-empty at submission start and patched as the wizard progresses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "living", alias = "Living")]
    Living,
    #[serde(rename = "memoriam", alias = "Memoriam")]
    Memoriam,
}

impl OrderType {
    /// Record store table holding this variant
    pub fn table(&self) -> &'static str {
        match self {
            OrderType::Living => "living_orders",
            OrderType::Memoriam => "memoriam_orders",
        }
    }

    /// Human-facing label, as stored in `order_type` columns
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Living => "Living",
            OrderType::Memoriam => "Memoriam",
        }
    }

    /// Request-side value, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Living => "living",
            OrderType::Memoriam => "memoriam",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed enumeration of art mediums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medium {
    #[serde(rename = "Acrylic")]
    Acrylic,
    #[serde(rename = "Charcoal")]
    Charcoal,
    #[serde(rename = "Colored Pencil")]
    ColoredPencil,
    #[serde(rename = "Ink")]
    Ink,
    #[serde(rename = "Pastel")]
    Pastel,
    #[serde(rename = "Watercolor")]
    Watercolor,
}

/// Mutually exclusive order classification: reproduce the tattoo exactly,
/// or apply creative changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AsIs,
    Altered,
}

/// What happens to submitted photographs after the artwork ships.
///
/// Referenced by invoicing (the 1-year retention fee) but not collected
/// by the public intake forms; staff set it from the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotographDisposition {
    #[serde(rename = "RETURN_TO_FAMILY")]
    ReturnToFamily,
    #[serde(rename = "RETAIN_1_YEAR")]
    Retain1Year,
}

/// Living order row (`living_orders`)
///
/// Medium selection and classification live in dependent rows
/// ([`OrderMedium`], [`LivingDetail`]), created in the same logical
/// creation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivingOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downpayment_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_form_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_form_path: Option<String>,
    pub date_loaded: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Memoriam order row (`memoriam_orders`)
///
/// Carries the funeral-home contact fields inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoriamOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub funeral_home_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funeral_home_contact: Option<String>,
    pub funeral_home_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funeral_home_email: Option<String>,
    pub classification: Classification,
    pub medium: Medium,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_form_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_form_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photograph_disposition: Option<PhotographDisposition>,
    pub date_loaded: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Medium-selection row dependent on a living order (`order_mediums`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMedium {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub order_id: String,
    pub medium: Medium,
}

/// Type-specific detail row dependent on a living order (`living_details`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivingDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub order_id: String,
    pub classification: Classification,
}

/// Uploaded image reference (`order_images`)
///
/// Every image path embeds the owning order's id as its storage folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub order_id: String,
    pub image_path: String,
}

/// Per-file upload progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileUploadStatus {
    Pending,
    Success,
    Error,
}

/// Per-file progress entry surfaced to the submission caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    pub file_name: String,
    pub bucket: String,
    pub status: FileUploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileUpload {
    pub fn pending(file_name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            bucket: bucket.into(),
            status: FileUploadStatus::Pending,
            error: None,
        }
    }

    pub fn succeed(&mut self) {
        self.status = FileUploadStatus::Success;
        self.error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = FileUploadStatus::Error;
        self.error = Some(error.into());
    }
}
