//! Tahan 前端应用
//!
//! 面向马来西亚中小微企业的经营韧性平台客户端。
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route` / `web::router`: 路由定义与带守卫的路由服务
//! - `session`: 会话状态机（平台无关，可原生测试）
//! - `auth`: 会话状态的响应式上下文
//! - `gateway`: 统一的后端 HTTP 入口（凭据注入 + 错误分类）
//! - `notice`: 网关错误通知的用户可见出口
//! - `components`: UI 组件层

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

mod auth;
mod config;
mod gateway;
mod notice;
mod session;

mod components {
    pub mod dashboard;
    mod icons;
    pub mod login;
}

use crate::auth::AuthContext;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::notice::{NoticeBoard, NoticeHost};

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod timer;

    pub use http::{HttpClient, HttpError, HttpResponse};
    pub use timer::sleep;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet, use_router};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    }
}

#[component]
fn NotFoundPage() -> impl IntoView {
    let router = use_router();

    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <button class="btn btn-primary mt-6" on:click=move |_| router.navigate("/")>
                    "Back to home"
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 通知板：网关错误分类的用户可见出口
    let notices = NoticeBoard::new();
    provide_context(notices);

    // 2. 认证上下文（唯一的会话管理器实例注入视图树）
    let auth_ctx = AuthContext::new(notices);
    provide_context(auth_ctx.clone());

    // 3. 启动校验：路由守卫在其完成前不做任何放行决定
    auth_ctx.spawn_boot();

    // 4. 注入认证 / 就绪信号，路由守卫与会话系统由此解耦
    let is_authenticated = auth_ctx.is_authenticated_signal();
    let is_ready = auth_ctx.is_ready_signal();

    view! {
        <Router is_authenticated=is_authenticated is_ready=is_ready>
            <NoticeHost />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
