//! 定时器封装模块
//!
//! 将 `setTimeout` 包装为一次性的延时 Future，供请求超时竞速使用。

use wasm_bindgen_futures::JsFuture;

/// 等待指定毫秒数
///
/// 仅在浏览器环境可用；原生测试不经过此处（测试走 Mock 传输层）。
/// 若拿不到 window 对象，返回的 Future 永不完成。
pub async fn sleep(millis: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
        }
    });
    let _ = JsFuture::from(promise).await;
}
