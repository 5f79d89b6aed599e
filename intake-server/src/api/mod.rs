//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`living_form`] - Living 订单提交
//! - [`memoriam_form`] - Memoriam 订单提交 / 查询 / 修改 / 删除
//! - [`emails`] - 邮件发送与历史
//! - [`invoices`] - 发票创建
//! - [`webhook`] - 支付处理器回调
//! - [`captcha`] - CAPTCHA 验证
//! - [`staff`] - 员工登录 / MFA

pub mod intake;

pub mod captcha;
pub mod emails;
pub mod health;
pub mod invoices;
pub mod living_form;
pub mod memoriam_form;
pub mod staff;
pub mod webhook;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
