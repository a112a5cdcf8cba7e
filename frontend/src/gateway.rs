//! API 网关客户端
//!
//! 所有后端调用的唯一 HTTP 入口，承担两个横切契约：
//!
//! - **请求侧**：Token Store 中存在凭据时附加 `Authorization: Bearer` 头
//!   （不存在时照常发出，公开端点不需要凭据）；
//! - **响应侧**：把 HTTP 状态 / 传输失败分类为 [`GatewayError`]，
//!   对每个失败发布一条用户可见通知，认证端点收到 401 时清除
//!   持久化凭据。分类只是旁路，原始错误仍上抛给调用方，
//!   由其决定重试或回退（如展示缓存内容）。
//!
//! 网关不做任何重试；单次失败立即上抛。

use crate::notice::{Notice, NoticeSink};
use crate::session::TokenStore;
use crate::web;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tahan_shared::ErrorBody;
use tahan_shared::protocol::{ApiRequest, HttpMethod};

// =========================================================
// 常量定义
// =========================================================

/// 请求超时（毫秒）：超过即按网络错误处理
pub const REQUEST_TIMEOUT_MS: u32 = 10_000;

// 各分类在后端未提供 message 时的兜底文案
const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const MSG_ACCESS_DENIED: &str = "You do not have access to this resource.";
const MSG_NOT_FOUND: &str = "The requested resource was not found.";
const MSG_RATE_LIMITED: &str = "Too many requests. Please try again later.";
const MSG_SERVER: &str = "The server encountered an error. Please try again.";
const MSG_NETWORK: &str = "Network error. Please check your connection.";
const MSG_TIMEOUT: &str = "The request timed out. Please try again.";
const MSG_BAD_RESPONSE: &str = "Unexpected response from the server.";
const MSG_REJECTED: &str = "The request was rejected.";

// =========================================================
// 核心抽象层 (HTTP Transport Abstraction)
// =========================================================

/// 传输层请求描述
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// 传输层响应（响应体已完整读出）
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输层错误（没有拿到可分类的 HTTP 响应）
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// 请求未能发出（URL / Header 构建失败等）
    Build(String),
    /// 网络层失败（连接失败、跨域拒绝等）
    Network(String),
    /// 超过 [`REQUEST_TIMEOUT_MS`] 未完成
    Timeout,
}

#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =========================================================
// 错误分类 (Response Classification)
// =========================================================

/// 分类后的网关错误
///
/// 调用方据此模式匹配做特性级处理；`message` 优先取后端返回的
/// `message` 字段（原样转发），缺失时使用各分类的兜底文案。
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// 认证端点返回 401：会话已过期，网关已清除 Token Store。
    /// 这是唯一会触发会话状态拆除的分类。
    SessionExpired { message: String },
    /// 403：无权访问，会话保持不变
    AccessDenied { message: String },
    /// 404：资源不存在
    NotFound { message: String },
    /// 429：限流，稍后重试
    RateLimited { message: String },
    /// 5xx：服务端错误，会话状态不变
    Server { status: u16, message: String },
    /// 其余 4xx（含公开端点的 401）：业务拒绝。
    /// `message` 为 None 时由调用方按所在操作补充具体文案。
    Rejected { status: u16, message: Option<String> },
    /// 传输失败 / 超时 / 响应不可解析；会话状态不变
    Network { message: String },
}

impl GatewayError {
    /// 用户可见的消息文本
    pub fn message(&self) -> &str {
        match self {
            GatewayError::SessionExpired { message }
            | GatewayError::AccessDenied { message }
            | GatewayError::NotFound { message }
            | GatewayError::RateLimited { message }
            | GatewayError::Server { message, .. }
            | GatewayError::Network { message } => message,
            GatewayError::Rejected { message, .. } => message.as_deref().unwrap_or(MSG_REJECTED),
        }
    }

    /// 该错误是否意味着当前会话已失效
    pub fn is_session_expired(&self) -> bool {
        matches!(self, GatewayError::SessionExpired { .. })
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for GatewayError {}

/// 传输层错误 → 网关分类（统一归入网络错误）
fn classify_transport(err: TransportError) -> GatewayError {
    let message = match err {
        TransportError::Timeout => MSG_TIMEOUT.to_string(),
        TransportError::Build(_) | TransportError::Network(_) => MSG_NETWORK.to_string(),
    };
    GatewayError::Network { message }
}

// =========================================================
// 网关客户端
// =========================================================

pub struct ApiGateway<C: HttpTransport, S: TokenStore> {
    base_url: String,
    client: C,
    store: Rc<S>,
    notices: Rc<dyn NoticeSink>,
}

impl<C: HttpTransport, S: TokenStore> ApiGateway<C, S> {
    pub fn new(
        base_url: impl Into<String>,
        client: C,
        store: Rc<S>,
        notices: Rc<dyn NoticeSink>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            store,
            notices,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个协议请求并解析其响应
    ///
    /// 端点元数据（路径 / 方法 / 是否认证端点）来自 [`ApiRequest`] 实现。
    pub async fn send<R: ApiRequest>(&self, payload: &R) -> Result<R::Response, GatewayError> {
        let mut req = HttpRequest::new(&self.url(R::PATH), R::METHOD);

        // 请求侧契约：持有凭据则注入，缺失时照常发出
        if let Some(token) = self.store.read() {
            req = req.with_header("Authorization", &format!("Bearer {}", token));
        }

        if R::METHOD == HttpMethod::Post {
            let body = serde_json::to_string(payload).map_err(|_| {
                self.fail(GatewayError::Network {
                    message: MSG_NETWORK.to_string(),
                })
            })?;
            req = req
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        let response = match self.client.send(req).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(classify_transport(err))),
        };

        if !response.is_success() {
            let err = self.classify(R::REQUIRES_AUTH, &response);
            if err.is_session_expired() {
                // 凭据已失效：立即清除持久化凭据。
                // 内存身份的清除由 Session Manager（唯一写者）完成。
                self.store.clear();
            }
            return Err(self.fail(err));
        }

        serde_json::from_str::<R::Response>(&response.body).map_err(|_| {
            self.fail(GatewayError::Network {
                message: MSG_BAD_RESPONSE.to_string(),
            })
        })
    }

    /// 响应侧契约：非 2xx 状态 → 错误分类
    fn classify(&self, requires_auth: bool, response: &HttpResponse) -> GatewayError {
        // 错误信封里的 message 原样转发
        let backend_msg = serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message);
        let or_default =
            |fallback: &str| backend_msg.clone().unwrap_or_else(|| fallback.to_string());

        match response.status {
            401 if requires_auth => GatewayError::SessionExpired {
                message: or_default(MSG_SESSION_EXPIRED),
            },
            403 => GatewayError::AccessDenied {
                message: or_default(MSG_ACCESS_DENIED),
            },
            404 => GatewayError::NotFound {
                message: or_default(MSG_NOT_FOUND),
            },
            429 => GatewayError::RateLimited {
                message: or_default(MSG_RATE_LIMITED),
            },
            status if status >= 500 => GatewayError::Server {
                status,
                message: or_default(MSG_SERVER),
            },
            status => GatewayError::Rejected {
                status,
                message: backend_msg.clone(),
            },
        }
    }

    /// 发布通知并原样返回错误（分类是旁路，不替代调用方处理）
    fn fail(&self, err: GatewayError) -> GatewayError {
        self.notices.publish(Notice::error(err.message()));
        err
    }
}

// =========================================================
// 实现层: 浏览器 Fetch 传输
// =========================================================

/// 基于 `web_sys::fetch` 的传输实现，带固定超时
pub struct FetchTransport {
    timeout_ms: u32,
}

impl FetchTransport {
    pub fn new() -> Self {
        Self {
            timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        use futures::future::{Either, select};
        use std::pin::pin;

        let request = async move {
            let mut builder = match req.method {
                HttpMethod::Get => web::HttpClient::get(&req.url),
                HttpMethod::Post => web::HttpClient::post(&req.url),
            };
            for (key, value) in &req.headers {
                builder = builder.header(key, value);
            }
            if let Some(body) = req.body {
                builder = builder.body(body);
            }
            builder.send().await
        };

        // 请求与超时竞速；响应体在 send 内读完，超时覆盖整个往返
        let request = pin!(request);
        let timeout = pin!(web::sleep(self.timeout_ms as i32));

        match select(request, timeout).await {
            Either::Left((result, _)) => result
                .map(|r| HttpResponse {
                    status: r.status,
                    body: r.body,
                })
                .map_err(|e| match e {
                    web::HttpError::RequestBuildFailed(msg) => TransportError::Build(msg),
                    web::HttpError::NetworkError(msg) => TransportError::Network(msg),
                    web::HttpError::ResponseParseFailed(msg) => TransportError::Network(msg),
                }),
            Either::Right(_) => Err(TransportError::Timeout),
        }
    }
}

// =========================================================
// 测试工具: Mock 传输层
// =========================================================

#[cfg(test)]
pub mod mock {
    use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// URL → (状态码, 响应体) 的映射，并记录所有发出的请求
    pub struct MockTransport {
        responses: RefCell<HashMap<String, (u16, String)>>,
        requests: Rc<RefCell<Vec<HttpRequest>>>,
        fail_with: RefCell<Option<TransportError>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: RefCell::new(HashMap::new()),
                requests: Rc::new(RefCell::new(Vec::new())),
                fail_with: RefCell::new(None),
            }
        }

        pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
            self.responses
                .borrow_mut()
                .insert(url.to_string(), (status, body.to_string()));
        }

        /// 之后的所有请求都以传输层错误失败
        pub fn fail_with(&self, err: TransportError) {
            *self.fail_with.borrow_mut() = Some(err);
        }

        /// 请求日志句柄（移交给网关之前保留）
        pub fn requests(&self) -> Rc<RefCell<Vec<HttpRequest>>> {
            self.requests.clone()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpTransport for MockTransport {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(req.clone());

            if let Some(err) = self.fail_with.borrow().clone() {
                return Err(err);
            }

            let responses = self.responses.borrow();
            if let Some((status, body)) = responses.get(&req.url) {
                Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                })
            } else {
                Ok(HttpResponse {
                    status: 404,
                    body: "{}".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests;
