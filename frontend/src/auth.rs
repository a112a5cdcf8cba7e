//! 认证上下文模块
//!
//! 管理用户认证状态，与路由系统解耦：
//! 路由服务只消费注入的认证 / 就绪信号，不直接依赖会话管理器。
//! 会话状态经 `on_change` 回调镜像进只读信号；所有变更操作都经由
//! 唯一的 [`SessionManager`] 实例发起。

use crate::config;
use crate::gateway::FetchTransport;
use crate::notice::NoticeBoard;
use crate::session::{BrowserTokenStore, SessionManager, SessionPhase};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

/// 浏览器环境下的具体会话管理器类型
pub type Session = SessionManager<FetchTransport, BrowserTokenStore>;

/// 认证上下文
///
/// 通过 Context 在组件间共享：状态只读，变更走 `session`。
#[derive(Clone)]
pub struct AuthContext {
    /// 会话状态（只读镜像）
    pub state: ReadSignal<SessionPhase>,
    /// 会话管理器（身份与凭据的唯一写者）
    pub session: Rc<Session>,
}

impl AuthContext {
    /// 创建认证上下文并接线状态镜像
    pub fn new(notices: NoticeBoard) -> Self {
        let (state, set_state) = signal(SessionPhase::Booting);

        let session = Rc::new(Session::new(
            config::api_base_url(),
            FetchTransport::new(),
            BrowserTokenStore,
            Rc::new(notices),
        ));
        session.set_on_change(move |phase| set_state.set(phase.clone()));

        Self { state, session }
    }

    /// 发起启动校验
    ///
    /// 路由守卫在校验完成前不做首次放行决定（就绪信号门控）。
    pub fn spawn_boot(&self) {
        let session = self.session.clone();
        spawn_local(async move {
            session.boot().await;
        });
    }

    /// 认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated())
    }

    /// 启动校验完成信号：Booting 阶段结束即就绪
    pub fn is_ready_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || !state.get().is_booting())
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}
