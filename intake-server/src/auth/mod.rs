//! 员工认证守卫
//!
//! 会话 + MFA 状态机。状态在每个请求上重新计算，不做本地存储。

pub mod guard;

pub use guard::{AalLevel, SessionState, classify_session};
