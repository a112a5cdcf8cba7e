//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//!
//! 守卫契约：在会话启动校验（就绪信号）完成之前不做任何放行决定，
//! 刷新页面时持有有效凭据的用户因此不会被误弹回登录页。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{self, AppRoute};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证与就绪状态均以信号注入，与会话系统解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证状态检查（注入的信号）
    is_authenticated: Signal<bool>,
    /// 会话启动校验是否完成（注入的信号）
    is_ready: Signal<bool>,
}

impl RouterService {
    /// 创建新的路由服务
    ///
    /// # Arguments
    /// * `is_authenticated` - 认证状态信号，由外部注入实现解耦
    /// * `is_ready` - 启动校验完成信号；首次守卫决策以此门控
    fn new(is_authenticated: Signal<bool>, is_ready: Signal<bool>) -> Self {
        // 初始路由先按 URL 记录，守卫在就绪后统一评估
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
            is_ready,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 启动校验完成信号（出口组件据此决定是否渲染页面）
    pub fn is_ready(&self) -> Signal<bool> {
        self.is_ready
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        // 启动校验完成前不接受导航（此时出口也未渲染任何页面）
        if !self.is_ready.get_untracked() {
            return;
        }
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 导航到指定路由
    ///
    /// # Arguments
    /// * `target_route` - 目标路由
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();

        // --- Step 1: 守卫验证 ---
        if !route::can_enter(&target_route, is_auth) {
            crate::log_info!("[Router] Access denied. Redirecting to login.");
            self.apply(AppRoute::auth_failure_redirect(), use_push);
            return;
        }

        // 已认证用户不停留在登录页
        if target_route.should_redirect_when_authenticated() && is_auth {
            crate::log_info!("[Router] Already authenticated. Redirecting to dashboard.");
            self.apply(AppRoute::auth_success_redirect(), use_push);
            return;
        }

        // --- Step 2: 加载页面 (更新状态) ---
        self.apply(target_route, use_push);
    }

    /// 写入 History 并更新路由信号
    fn apply(&self, target: AppRoute, use_push: bool) {
        if use_push {
            push_history_state(target.to_path());
        } else {
            replace_history_state(target.to_path());
        }
        self.set_route.set(target);
    }

    /// 首次守卫决策：等待启动校验完成后评估地址栏中的初始路由
    ///
    /// 刷新页面时持久化凭据可能仍然有效；在校验结束前评估守卫
    /// 会把已认证用户错误地弹回登录页。
    fn setup_initial_resolution(&self) {
        let svc = *self;
        Effect::new(move |resolved: Option<bool>| {
            if resolved.unwrap_or(false) {
                return true;
            }
            if !svc.is_ready.get() {
                return false;
            }
            // 使用 replace 避免在历史栈里留下未守卫的中间态
            svc.navigate_to_route(AppRoute::from_path(&current_path()), false);
            true
        });
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let svc = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target_route = AppRoute::from_path(&current_path());

            if !svc.is_ready.get_untracked() {
                // 启动校验未完成：先记录路径，就绪后由首次守卫决策统一处理
                svc.set_route.set(target_route);
                return;
            }

            // popstate 时也执行守卫逻辑
            if !route::can_enter(&target_route, svc.is_authenticated.get_untracked()) {
                let redirect = AppRoute::auth_failure_redirect();
                replace_history_state(redirect.to_path());
                svc.set_route.set(redirect);
            } else {
                svc.set_route.set(target_route);
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let svc = *self;

        // 使用 Effect 监听认证状态变化
        Effect::new(move |_| {
            if !svc.is_ready.get() {
                return;
            }
            let is_auth = svc.is_authenticated.get();
            let current = svc.current_route.get_untracked();

            if is_auth {
                // 用户刚登录（或恢复了会话），离开登录页
                if current.should_redirect_when_authenticated() {
                    crate::log_info!(
                        "[Router] Auth state changed: logged in, redirecting to dashboard."
                    );
                    svc.apply(AppRoute::auth_success_redirect(), true);
                }
            } else {
                // 登出或会话过期，受保护页面弹回登录
                if current.requires_auth() {
                    crate::log_info!(
                        "[Router] Auth state changed: logged out, redirecting to login."
                    );
                    svc.apply(AppRoute::auth_failure_redirect(), true);
                }
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>, is_ready: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated, is_ready);

    // 初始化监听器与守卫
    router.init_popstate_listener();
    router.setup_initial_resolution();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 会话启动校验完成信号
    is_ready: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(is_authenticated, is_ready);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
/// 就绪前只渲染加载指示，确保守卫不会基于未校验的状态放行。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        if !router.is_ready().get() {
            view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any()
        } else {
            matcher(router.current_route().get())
        }
    }
}
