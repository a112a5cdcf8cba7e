use super::mock::MockTransport;
use super::*;
use crate::notice::mock::RecordingNotices;
use crate::session::mock::MemoryTokenStore;
use serde_json::json;
use std::cell::RefCell;
use tahan_shared::{LoginRequest, ProfileRequest};

const BASE: &str = "http://api.test";

// =========================================================
// 辅助函数
// =========================================================

fn harness(
    transport: MockTransport,
    store: Rc<MemoryTokenStore>,
) -> (
    ApiGateway<MockTransport, MemoryTokenStore>,
    Rc<RefCell<Vec<Notice>>>,
) {
    let notices = RecordingNotices::new();
    let log = notices.handle();
    let gateway = ApiGateway::new(BASE, transport, store, Rc::new(notices));
    (gateway, log)
}

fn login_request() -> LoginRequest {
    LoginRequest {
        phone_number: "+60123456789".to_string(),
        password: "secret".to_string(),
    }
}

fn user_json() -> serde_json::Value {
    json!({"id": "u-1", "phoneNumber": "+60123456789"})
}

// =========================================================
// 请求侧契约
// =========================================================

#[tokio::test]
async fn attaches_bearer_header_when_token_present() {
    let transport = MockTransport::new();
    let requests = transport.requests();
    transport.mock_response(
        "http://api.test/auth/profile",
        200,
        json!({"user": user_json()}),
    );

    let store = Rc::new(MemoryTokenStore::with_token("tok-123"));
    let (gateway, _) = harness(transport, store);

    gateway.send(&ProfileRequest).await.unwrap();

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("Authorization").map(String::as_str),
        Some("Bearer tok-123")
    );
}

#[tokio::test]
async fn proceeds_without_authorization_when_no_token() {
    let transport = MockTransport::new();
    let requests = transport.requests();
    transport.mock_response(
        "http://api.test/auth/login",
        200,
        json!({"token": "tok-1", "user": user_json()}),
    );

    let (gateway, _) = harness(transport, Rc::new(MemoryTokenStore::new()));

    gateway.send(&login_request()).await.unwrap();

    let requests = requests.borrow();
    assert!(!requests[0].headers.contains_key("Authorization"));
    // POST 请求携带 JSON 体
    assert_eq!(
        requests[0].headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
    assert!(requests[0].body.as_deref().unwrap().contains("phoneNumber"));
}

#[tokio::test]
async fn joins_base_url_with_trailing_slash() {
    let transport = MockTransport::new();
    let requests = transport.requests();
    let notices = RecordingNotices::new();
    let gateway = ApiGateway::new(
        "http://api.test/",
        transport,
        Rc::new(MemoryTokenStore::new()),
        Rc::new(notices),
    );

    let _ = gateway.send(&login_request()).await;

    assert_eq!(requests.borrow()[0].url, "http://api.test/auth/login");
}

// =========================================================
// 响应侧契约：状态分类
// =========================================================

#[tokio::test]
async fn authenticated_401_expires_session_and_clears_store() {
    let transport = MockTransport::new();
    transport.mock_response(
        "http://api.test/auth/profile",
        401,
        json!({"message": "Token expired"}),
    );

    let store = Rc::new(MemoryTokenStore::with_token("stale"));
    let (gateway, notices) = harness(transport, store.clone());

    let err = gateway.send(&ProfileRequest).await.unwrap_err();

    assert!(err.is_session_expired());
    // 后端消息原样转发
    assert_eq!(err.message(), "Token expired");
    // 凭据被网关清除
    assert!(store.read().is_none());
    // 通知同时发布
    assert_eq!(notices.borrow().len(), 1);
    assert_eq!(notices.borrow()[0].message, "Token expired");
    assert!(notices.borrow()[0].is_error);
}

#[tokio::test]
async fn public_401_is_rejection_not_expiry() {
    let transport = MockTransport::new();
    transport.mock_response(
        "http://api.test/auth/login",
        401,
        json!({"message": "Invalid phone number or password"}),
    );

    // 即便本地残留着一个旧凭据，登录被拒也不得拆除它
    let store = Rc::new(MemoryTokenStore::with_token("stale"));
    let (gateway, _) = harness(transport, store.clone());

    let err = gateway.send(&login_request()).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 401,
            message: Some("Invalid phone number or password".to_string()),
        }
    );
    assert!(store.read().is_some());
}

#[tokio::test]
async fn forbidden_is_access_denied_and_keeps_session() {
    let transport = MockTransport::new();
    transport.mock_response("http://api.test/auth/profile", 403, json!({}));

    let store = Rc::new(MemoryTokenStore::with_token("tok-1"));
    let (gateway, notices) = harness(transport, store.clone());

    let err = gateway.send(&ProfileRequest).await.unwrap_err();

    assert!(matches!(err, GatewayError::AccessDenied { .. }));
    // 无后端消息时使用兜底文案
    assert_eq!(err.message(), MSG_ACCESS_DENIED);
    // 403 不拆除会话
    assert!(store.read().is_some());
    assert_eq!(notices.borrow().len(), 1);
}

#[tokio::test]
async fn remaining_statuses_classify_by_table() {
    // (状态码, 期待的分类检查)
    let cases: Vec<(u16, fn(&GatewayError) -> bool)> = vec![
        (404, |e| matches!(e, GatewayError::NotFound { .. })),
        (429, |e| matches!(e, GatewayError::RateLimited { .. })),
        (500, |e| matches!(e, GatewayError::Server { status: 500, .. })),
        (503, |e| matches!(e, GatewayError::Server { status: 503, .. })),
        (422, |e| matches!(e, GatewayError::Rejected { status: 422, .. })),
    ];

    for (status, check) in cases {
        let transport = MockTransport::new();
        transport.mock_response("http://api.test/auth/profile", status, json!({}));
        let store = Rc::new(MemoryTokenStore::with_token("tok-1"));
        let (gateway, _) = harness(transport, store.clone());

        let err = gateway.send(&ProfileRequest).await.unwrap_err();
        assert!(check(&err), "status {} classified as {:?}", status, err);
        // 只有 401 会清除凭据
        assert!(store.read().is_some(), "status {} must keep token", status);
    }
}

// =========================================================
// 响应侧契约：传输失败与超时
// =========================================================

#[tokio::test]
async fn transport_failure_is_network_error() {
    let transport = MockTransport::new();
    transport.fail_with(TransportError::Network("connection refused".to_string()));

    let (gateway, notices) = harness(transport, Rc::new(MemoryTokenStore::new()));

    let err = gateway.send(&login_request()).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Network {
            message: MSG_NETWORK.to_string(),
        }
    );
    assert_eq!(notices.borrow().len(), 1);
}

#[tokio::test]
async fn timeout_is_network_error_with_timeout_text() {
    let transport = MockTransport::new();
    transport.fail_with(TransportError::Timeout);

    let (gateway, _) = harness(transport, Rc::new(MemoryTokenStore::new()));

    let err = gateway.send(&login_request()).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Network {
            message: MSG_TIMEOUT.to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_success_body_is_network_error() {
    let transport = MockTransport::new();
    // 2xx 但缺少约定的负载字段
    transport.mock_response("http://api.test/auth/login", 200, json!({"ok": true}));

    let (gateway, notices) = harness(transport, Rc::new(MemoryTokenStore::new()));

    let err = gateway.send(&login_request()).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Network {
            message: MSG_BAD_RESPONSE.to_string(),
        }
    );
    assert_eq!(notices.borrow().len(), 1);
}
