/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TATTOO_ENV | development | 运行环境 |
/// | STRICT_MODE | 生产环境 true | CAPTCHA 强制开关 |
/// | STORE_URL | http://localhost:54321 | 记录存储地址 |
/// | STORE_API_KEY | - | 记录存储密钥 |
/// | IDENTITY_JWT_SECRET | - | 身份令牌签名密钥 |
///
/// # 示例
///
/// ```ignore
/// TATTOO_ENV=production STORE_URL=https://db.example.com cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// CAPTCHA / 通知强制开关 (显式、可审计；默认跟随生产环境)
    pub strict_mode: bool,

    // === 记录存储 (外部关系型存储) ===
    /// 记录存储 REST 地址
    pub store_url: String,
    /// 记录存储 API 密钥
    pub store_api_key: String,

    // === 对象存储 ===
    /// 对象存储地址 (默认与记录存储同主机)
    pub storage_url: String,
    /// 表单文档桶
    pub forms_bucket: String,
    /// 图片桶
    pub images_bucket: String,

    // === 邮件 ===
    /// 邮件 API 地址
    pub email_api_url: String,
    /// 邮件 API 密钥
    pub email_api_key: String,
    /// 发件人地址
    pub email_from: String,

    // === 支付 ===
    /// 支付处理器 API 地址
    pub payments_api_url: String,
    /// 支付处理器密钥
    pub payments_secret_key: String,
    /// Webhook 签名密钥
    pub webhook_secret: String,

    // === CAPTCHA ===
    /// CAPTCHA 验证地址
    pub captcha_verify_url: String,
    /// CAPTCHA 密钥
    pub captcha_secret: String,

    // === 身份认证 (员工) ===
    /// 身份提供方地址
    pub identity_url: String,
    /// 访问令牌 HS256 签名密钥 (用于解析 aal claim)
    pub identity_jwt_secret: String,

    // === 日志 ===
    /// 日志文件目录 (为空则只输出到终端)
    pub log_dir: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = env_or("TATTOO_ENV", "development");
        let is_production = environment == "production";
        let store_url = env_or("STORE_URL", "http://localhost:54321");

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            strict_mode: std::env::var("STRICT_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(is_production),
            environment,

            store_api_key: env_or("STORE_API_KEY", ""),
            storage_url: std::env::var("STORAGE_URL").unwrap_or_else(|_| store_url.clone()),
            forms_bucket: env_or("FORMS_BUCKET", "order-forms"),
            images_bucket: env_or("IMAGES_BUCKET", "order-images"),

            email_api_url: env_or("EMAIL_API_URL", "https://api.resend.com"),
            email_api_key: env_or("EMAIL_API_KEY", ""),
            email_from: env_or("EMAIL_FROM", "orders@intake.example.com"),

            payments_api_url: env_or("PAYMENTS_API_URL", "https://api.stripe.com"),
            payments_secret_key: env_or("PAYMENTS_SECRET_KEY", ""),
            webhook_secret: env_or("WEBHOOK_SECRET", ""),

            captcha_verify_url: env_or(
                "CAPTCHA_VERIFY_URL",
                "https://www.google.com/recaptcha/api/siteverify",
            ),
            captcha_secret: env_or("CAPTCHA_SECRET", ""),

            identity_url: std::env::var("IDENTITY_URL").unwrap_or_else(|_| store_url.clone()),
            identity_jwt_secret: env_or("IDENTITY_JWT_SECRET", ""),

            log_dir: std::env::var("LOG_DIR").ok(),

            store_url,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
