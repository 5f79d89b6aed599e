//! Intake Server - 纪念艺术品订单接收与后台管理服务
//!
//! # 架构概述
//!
//! 本模块是 Intake Server 的主入口，提供以下核心功能：
//!
//! - **订单提交工作流** (`workflow`): 创建记录 → 上传文件 → 补偿删除
//! - **外部服务客户端** (`clients`): 记录存储、对象存储、邮件、支付、CAPTCHA、身份认证
//! - **员工认证** (`auth`): 会话 + MFA 状态机守卫
//! - **后台数据提供器** (`admin`): list/getOne/create/update/delete 适配器
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! intake-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── clients/       # 外部服务客户端
//! ├── auth/          # 员工认证守卫
//! ├── workflow/      # 订单提交工作流
//! ├── notify/        # 邮件通知
//! ├── admin/         # 后台数据提供器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod clients;
pub mod core;
pub mod notify;
pub mod utils;
pub mod workflow;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____      __        __
   /  _/___  / /_____ _/ /_____
   / // __ \/ __/ __ `/ //_/ _ \
 _/ // / / / /_/ /_/ / ,< /  __/
/___/_/ /_/\__/\__,_/_/|_|\___/
    "#
    );
}
