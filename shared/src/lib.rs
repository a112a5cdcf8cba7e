use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;

pub use date::Timestamp;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 短信验证码长度（一次性验证码为 6 位数字）
pub const VERIFICATION_CODE_LEN: usize = 6;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 当前认证用户的身份负载
///
/// 后端返回的用户数据。`id` 是不透明标识符，客户端不做任何解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    /// 手机号是主要登录凭据
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 手机号是否已通过短信验证
    #[serde(default)]
    pub phone_verified: bool,
    /// 注册时间（毫秒时间戳，旧账号可能缺失）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl UserInfo {
    /// 界面显示用的称呼：优先全名，退回手机号
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.phone_number)
    }
}

// =========================================================
// 请求负载 (Request Payloads)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPhoneRequest {
    pub phone_number: String,
    pub verification_code: String,
}

/// GET /auth/profile 没有请求体，空结构体仅承载端点元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest;

// =========================================================
// 响应负载 (Response Payloads)
// =========================================================

/// 登录 / 验证成功后的凭据负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    /// 不透明 bearer token，客户端不解析其中的 claims
    pub token: String,
    pub user: UserInfo,
}

/// 注册成功的确认（注册本身不发放凭据）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
}

/// 错误响应信封：非 2xx 响应携带可读的 message 字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
