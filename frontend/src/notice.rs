//! 通知模块
//!
//! 网关错误分类的用户可见出口。核心层只依赖 `NoticeSink` 抽象，
//! UI 层用信号实现并渲染 toast —— 与路由服务消费注入信号的
//! 解耦方式一致。

use leptos::prelude::*;

/// 一条用户可见的通知
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    #[allow(dead_code)]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }
}

/// 通知接收端抽象
///
/// 网关对每个失败响应发布一条通知；发布只是旁路提示，
/// 原始错误仍然返回给调用方处理。
pub trait NoticeSink {
    fn publish(&self, notice: Notice);
}

/// 基于信号的通知板（UI 层实现，同一时刻显示一条）
#[derive(Clone, Copy)]
pub struct NoticeBoard {
    notice: ReadSignal<Option<Notice>>,
    set_notice: WriteSignal<Option<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        let (notice, set_notice) = signal(None);
        Self { notice, set_notice }
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSink for NoticeBoard {
    fn publish(&self, notice: Notice) {
        self.set_notice.set(Some(notice));
    }
}

/// 从 Context 获取通知板
pub fn use_notices() -> NoticeBoard {
    use_context::<NoticeBoard>().expect("NoticeBoard should be provided")
}

/// toast 出口组件：渲染当前通知，3 秒后自动消失
#[component]
pub fn NoticeHost() -> impl IntoView {
    let board = use_notices();
    let notice = board.notice;
    let set_notice = board.set_notice;

    // 3秒后清除通知
    Effect::new(move |_| {
        if notice.get().is_some() {
            set_timeout(
                move || set_notice.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    view! {
        <Show when=move || notice.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    if notice.get().map(|n| n.is_error).unwrap_or(false) {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || notice.get().map(|n| n.message).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}

// =========================================================
// 测试工具: 记录型通知接收端
// =========================================================
