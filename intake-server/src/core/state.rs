use crate::clients::{
    CaptchaVerifier, EmailClient, IdentityClient, ObjectStorageClient, PaymentsClient,
    RecordStoreClient,
};
use crate::core::Config;

/// 服务器状态 - 持有所有外部服务客户端
///
/// ServerState 是核心数据结构，持有注入到处理器的无状态客户端句柄。
/// 所有客户端共享同一个 `reqwest::Client` 连接池（由运行时持有，
/// 不在调用点重复构造）。Clone 是浅拷贝。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 记录存储客户端 (外部关系型存储) |
/// | storage | 对象存储客户端 |
/// | email | 邮件发送客户端 |
/// | payments | 支付/发票客户端 |
/// | captcha | CAPTCHA 验证客户端 |
/// | identity | 员工身份客户端 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 记录存储客户端
    pub store: RecordStoreClient,
    /// 对象存储客户端
    pub storage: ObjectStorageClient,
    /// 邮件客户端
    pub email: EmailClient,
    /// 支付客户端
    pub payments: PaymentsClient,
    /// CAPTCHA 验证客户端
    pub captcha: CaptchaVerifier,
    /// 身份客户端
    pub identity: IdentityClient,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 构造一个共享的 HTTP 客户端并注入到各服务客户端
    pub fn initialize(config: &Config) -> Self {
        let http = reqwest::Client::new();

        Self {
            store: RecordStoreClient::new(
                http.clone(),
                config.store_url.clone(),
                config.store_api_key.clone(),
            ),
            storage: ObjectStorageClient::new(
                http.clone(),
                config.storage_url.clone(),
                config.store_api_key.clone(),
            ),
            email: EmailClient::new(
                http.clone(),
                config.email_api_url.clone(),
                config.email_api_key.clone(),
                config.email_from.clone(),
            ),
            payments: PaymentsClient::new(
                http.clone(),
                config.payments_api_url.clone(),
                config.payments_secret_key.clone(),
            ),
            captcha: CaptchaVerifier::new(
                http.clone(),
                config.captcha_verify_url.clone(),
                config.captcha_secret.clone(),
            ),
            identity: IdentityClient::new(
                http,
                config.identity_url.clone(),
                config.store_api_key.clone(),
                config.identity_jwt_secret.clone(),
            ),
            config: config.clone(),
        }
    }
}
