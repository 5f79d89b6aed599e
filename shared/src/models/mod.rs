//! Domain models
//!
//! Rows as they live in the external record store, plus the enums and
//! progress types shared between the intake API and the back office.

pub mod email_log;
pub mod invoice;
pub mod order;

pub use email_log::{EmailType, OrderEmail};
pub use invoice::{Invoice, InvoiceStatus};
pub use order::{
    Classification, FileUpload, FileUploadStatus, LivingDetail, LivingOrder, Medium, MemoriamOrder,
    OrderImage, OrderMedium, OrderType, PhotographDisposition,
};
