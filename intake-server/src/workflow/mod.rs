//! 订单提交工作流
//!
//! 创建记录 → 上传文件 → 补偿删除。无重试、无持久状态；
//! 失败只通过补偿删除恢复。

pub mod submission;

pub use submission::{
    LivingSubmission, MemoriamSubmission, SubmissionFiles, SubmissionOutcome, SubmissionWorkflow,
    SubmittedFile,
};

use shared::models::OrderType;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Row tables dependent on an order, cleaned up before the order row
fn dependent_tables(order_type: OrderType) -> &'static [&'static str] {
    match order_type {
        OrderType::Living => &["order_mediums", "living_details", "order_images", "order_emails", "invoices"],
        OrderType::Memoriam => &["order_images", "order_emails", "invoices"],
    }
}

/// Delete an order and everything hanging off it: storage objects under
/// the order's folder in both buckets, dependent rows, then the order
/// row itself.
///
/// Object and dependent-row cleanup is best-effort (failures are
/// logged); only a failure to delete the order row is surfaced, since
/// that is the one piece the caller relies on being gone.
pub async fn cascade_delete_order(
    state: &ServerState,
    order_type: OrderType,
    order_id: &str,
) -> AppResult<()> {
    for bucket in [&state.config.forms_bucket, &state.config.images_bucket] {
        match state.storage.delete_prefix(bucket, order_id).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!(order_id = %order_id, bucket = %bucket, deleted = deleted,
                    "Deleted order objects");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(order_id = %order_id, bucket = %bucket, error = %e,
                    "Failed to clean up order objects");
            }
        }
    }

    for table in dependent_tables(order_type) {
        if let Err(e) = state.store.delete_where(table, "order_id", order_id).await {
            tracing::warn!(order_id = %order_id, table = %table, error = %e,
                "Failed to delete dependent rows");
        }
    }

    state
        .store
        .delete(order_type.table(), order_id)
        .await
        .map_err(|e| {
            tracing::error!(order_id = %order_id, error = %e, "Order row delete failed");
            AppError::with_message(ErrorCode::OrderDeleteFailed, e.message)
        })
}
