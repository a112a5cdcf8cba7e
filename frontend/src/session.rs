//! 会话管理模块
//!
//! 持有身份生命周期与身份变更操作（登录 / 注册 / 验证 / 登出）。
//! 与 UI 框架解耦：传输层与凭据存储均以 trait 注入，逻辑可在
//! 原生环境下用 mock 驱动测试（响应式镜像见 `auth` 模块）。
//!
//! 状态机：
//! `Booting → {Anonymous, Authenticated}`；
//! `Anonymous → PendingVerification → Authenticated`（注册 + 验证）；
//! 登出 / 会话过期回到 `Anonymous`。
//!
//! 不变量：内存中存在 Authenticated 身份 ⇔ Token Store 持有凭据。
//! 写入顺序保证这一点：先持久化凭据，再设置身份；拆除时两者一起清。

use crate::gateway::{ApiGateway, GatewayError, HttpTransport};
use crate::notice::NoticeSink;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tahan_shared::{LoginRequest, ProfileRequest, RegisterAck, RegisterRequest, UserInfo,
    VerifyPhoneRequest};

// =========================================================
// 凭据存储 (Token Store)
// =========================================================

/// LocalStorage 中的固定存储键（本核心唯一的持久化条目）
pub const STORAGE_TOKEN_KEY: &str = "tahan_token";

/// 持久化凭据的唯一归属者
///
/// 只存取一个不透明 token 字符串，不校验其内容，不发起网络请求。
pub trait TokenStore {
    /// 保存 token，覆盖旧值
    fn save(&self, token: &str);
    /// 读取 token（不存在时为 None）
    fn read(&self) -> Option<String>;
    /// 删除 token；幂等，不存在时为无操作
    fn clear(&self);
}

/// 浏览器 LocalStorage 实现
///
/// 凭据在页面刷新间存活，作用域为当前浏览器 profile。
pub struct BrowserTokenStore;

impl BrowserTokenStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl TokenStore for BrowserTokenStore {
    fn save(&self, token: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(STORAGE_TOKEN_KEY, token);
        }
    }

    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(STORAGE_TOKEN_KEY).ok()?
    }

    fn clear(&self) {
        // removeItem 对不存在的键本身就是无操作
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(STORAGE_TOKEN_KEY);
        }
    }
}

// =========================================================
// 会话状态 (Session Phase)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    /// 启动校验中：持久化凭据被验证（或判定不存在）之前，
    /// 路由守卫不得做出任何放行决定
    #[default]
    Booting,
    /// 未认证
    Anonymous,
    /// 已注册待验证：等待发往该手机号的一次性验证码
    PendingVerification { phone_number: String },
    /// 已认证
    Authenticated { user: UserInfo },
}

impl SessionPhase {
    pub fn is_booting(&self) -> bool {
        matches!(self, SessionPhase::Booting)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionPhase::Authenticated { .. })
    }

    /// 当前身份（仅 Authenticated 时存在）
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            SessionPhase::Authenticated { user } => Some(user),
            _ => None,
        }
    }
}

// =========================================================
// 错误分类 (Error Taxonomy)
// =========================================================

// 后端未提供 message 时各操作的兜底文案
const MSG_LOGIN_FAILED: &str = "Login failed. Please check your phone number and password.";
const MSG_REGISTRATION_FAILED: &str = "Registration failed. Please review your details.";
const MSG_VERIFICATION_FAILED: &str = "Verification failed. Please check the code and try again.";

/// 会话操作错误
///
/// 网关的通用 HTTP 错误按"哪个操作在途"映射为具体类别：
/// 登录期间的 401 是 `InvalidCredentials` 而非 `SessionExpired` ——
/// 那时根本没有会话可过期。
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// 登录被拒（手机号 / 密码组合错误）
    InvalidCredentials(String),
    /// 注册被拒（手机号已占用、字段校验失败等）
    RegistrationRejected(String),
    /// 验证码错误或已过期
    VerificationFailed(String),
    /// 已认证调用收到 401：会话被强制终止
    SessionExpired(String),
    /// 传输失败或超时：会话状态不变，由调用方决定重试或回退
    Network(String),
    /// 5xx：会话状态不变
    Server(String),
}

impl AuthError {
    /// 用户可见的消息文本
    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials(msg)
            | AuthError::RegistrationRejected(msg)
            | AuthError::VerificationFailed(msg)
            | AuthError::SessionExpired(msg)
            | AuthError::Network(msg)
            | AuthError::Server(msg) => msg,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

/// 公开端点操作的错误映射：业务拒绝包装为操作专属类别
fn map_rejection(
    err: GatewayError,
    default_msg: &str,
    wrap: fn(String) -> AuthError,
) -> AuthError {
    match err {
        GatewayError::Network { message } => AuthError::Network(message),
        GatewayError::Server { message, .. } => AuthError::Server(message),
        GatewayError::SessionExpired { message } => AuthError::SessionExpired(message),
        GatewayError::Rejected { message, .. } => {
            wrap(message.unwrap_or_else(|| default_msg.to_string()))
        }
        GatewayError::AccessDenied { message }
        | GatewayError::NotFound { message }
        | GatewayError::RateLimited { message } => wrap(message),
    }
}

// =========================================================
// 会话管理器 (Session Manager)
// =========================================================

/// 身份生命周期的唯一归属者
///
/// 单线程事件驱动模型下的唯一写者：Token Store 与身份只由本类型
/// 串行修改，视图层只读快照（经 `on_change` 镜像到信号）。
pub struct SessionManager<C: HttpTransport, S: TokenStore> {
    gateway: ApiGateway<C, S>,
    store: Rc<S>,
    phase: RefCell<SessionPhase>,
    on_change: RefCell<Option<Rc<dyn Fn(&SessionPhase)>>>,
}

impl<C: HttpTransport, S: TokenStore> SessionManager<C, S> {
    pub fn new(
        base_url: impl Into<String>,
        client: C,
        store: S,
        notices: Rc<dyn NoticeSink>,
    ) -> Self {
        let store = Rc::new(store);
        Self {
            gateway: ApiGateway::new(base_url, client, store.clone(), notices),
            store,
            phase: RefCell::new(SessionPhase::Booting),
            on_change: RefCell::new(None),
        }
    }

    /// 注册状态变更回调（响应式层把状态镜像进信号）
    pub fn set_on_change(&self, callback: impl Fn(&SessionPhase) + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// 当前状态快照
    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase.borrow().is_authenticated()
    }

    fn set_phase(&self, next: SessionPhase) {
        *self.phase.borrow_mut() = next;
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            let snapshot = self.phase.borrow().clone();
            callback(&snapshot);
        }
    }

    /// 强制拆除会话：清除凭据与身份
    ///
    /// 会话过期是唯一触发自动状态变更的错误，其余错误都不动状态。
    fn teardown(&self) {
        self.store.clear();
        self.set_phase(SessionPhase::Anonymous);
    }

    /// 包装网关调用：认证端点报告"会话过期"时执行强制登出
    async fn send<R: tahan_shared::protocol::ApiRequest>(
        &self,
        payload: &R,
    ) -> Result<R::Response, GatewayError> {
        match self.gateway.send(payload).await {
            Err(err) if err.is_session_expired() => {
                crate::log_info!("[Session] Session expired, forcing logout.");
                self.teardown();
                Err(err)
            }
            other => other,
        }
    }

    /// 启动校验（每次页面加载执行一次）
    ///
    /// 无持久化凭据 → 直接 `Anonymous`，不发起任何网络请求；
    /// 有凭据 → 调用 profile 端点验证，任何失败（含过期 / 无效凭据）
    /// 都清除凭据并回到 `Anonymous`。路由守卫的首次放行决定必须等待
    /// 本方法完成（见 `web::router` 的就绪门控）。
    pub async fn boot(&self) {
        if self.store.read().is_none() {
            self.set_phase(SessionPhase::Anonymous);
            return;
        }

        match self.send(&ProfileRequest).await {
            Ok(profile) => {
                crate::log_info!("[Session] Restored session from stored credential.");
                self.set_phase(SessionPhase::Authenticated { user: profile.user });
            }
            Err(_) => {
                // 401 时网关已清过凭据；clear 幂等，这里兜底其余失败
                self.store.clear();
                self.set_phase(SessionPhase::Anonymous);
            }
        }
    }

    /// 登录：成功后持久化凭据并填充身份（`Anonymous → Authenticated`）
    ///
    /// 失败时状态不变，错误为 `InvalidCredentials`（转发后端消息）。
    pub async fn login(
        &self,
        phone_number: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<UserInfo, AuthError> {
        let request = LoginRequest {
            phone_number: phone_number.into(),
            password: password.into(),
        };
        let payload = self
            .send(&request)
            .await
            .map_err(|e| map_rejection(e, MSG_LOGIN_FAILED, AuthError::InvalidCredentials))?;

        // 先持久化凭据再设置身份，维持不变量
        self.store.save(&payload.token);
        self.set_phase(SessionPhase::Authenticated {
            user: payload.user.clone(),
        });
        Ok(payload.user)
    }

    /// 注册：成功仅进入待验证状态 —— 不发放凭据、不认证
    /// （`Anonymous → PendingVerification`，记住提交的手机号）
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterAck, AuthError> {
        let phone_number = request.phone_number.clone();
        let ack = self
            .send(&request)
            .await
            .map_err(|e| map_rejection(e, MSG_REGISTRATION_FAILED, AuthError::RegistrationRejected))?;

        self.set_phase(SessionPhase::PendingVerification { phone_number });
        Ok(ack)
    }

    /// 验证手机号：成功后与登录一样获得凭据与身份
    /// （`PendingVerification → Authenticated`）
    pub async fn verify_phone(
        &self,
        phone_number: impl Into<String>,
        verification_code: impl Into<String>,
    ) -> Result<UserInfo, AuthError> {
        let request = VerifyPhoneRequest {
            phone_number: phone_number.into(),
            verification_code: verification_code.into(),
        };
        let payload = self
            .send(&request)
            .await
            .map_err(|e| map_rejection(e, MSG_VERIFICATION_FAILED, AuthError::VerificationFailed))?;

        self.store.save(&payload.token);
        self.set_phase(SessionPhase::Authenticated {
            user: payload.user.clone(),
        });
        Ok(payload.user)
    }

    /// 放弃验证流程，回到未认证状态
    pub fn abandon_verification(&self) {
        if matches!(&*self.phase.borrow(), SessionPhase::PendingVerification { .. }) {
            self.set_phase(SessionPhase::Anonymous);
        }
    }

    /// 重新拉取身份
    ///
    /// 会话过期（401）会触发强制登出；其余失败不动状态。
    pub async fn refresh_profile(&self) -> Result<UserInfo, AuthError> {
        let profile = self.send(&ProfileRequest).await.map_err(|e| match e {
            GatewayError::SessionExpired { message } => AuthError::SessionExpired(message),
            GatewayError::Network { message } => AuthError::Network(message),
            other => AuthError::Server(other.message().to_string()),
        })?;

        self.set_phase(SessionPhase::Authenticated {
            user: profile.user.clone(),
        });
        Ok(profile.user)
    }

    /// 登出：纯客户端动作，同步完成，不依赖后端可达性
    pub fn logout(&self) {
        self.teardown();
    }
}

// =========================================================
// 测试环境实现 (Mock)
// =========================================================

#[cfg(test)]
pub mod mock {
    use super::TokenStore;
    use std::cell::RefCell;

    /// 内存凭据存储，记录 clear 调用次数以验证幂等性
    #[derive(Default)]
    pub struct MemoryTokenStore {
        token: RefCell<Option<String>>,
        pub clears: RefCell<u32>,
    }

    impl MemoryTokenStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_token(token: &str) -> Self {
            Self {
                token: RefCell::new(Some(token.to_string())),
                clears: RefCell::new(0),
            }
        }
    }

    impl TokenStore for MemoryTokenStore {
        fn save(&self, token: &str) {
            *self.token.borrow_mut() = Some(token.to_string());
        }

        fn read(&self) -> Option<String> {
            self.token.borrow().clone()
        }

        fn clear(&self) {
            *self.clears.borrow_mut() += 1;
            *self.token.borrow_mut() = None;
        }
    }
}
