//! 运行配置模块
//!
//! 后端基础 URL 是本应用唯一必需的外部配置，构建期注入。

/// 默认后端地址（本地开发）
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// 后端基础 URL
///
/// 构建时通过 `TAHAN_API_URL` 环境变量覆盖（部署注入）。
pub fn api_base_url() -> String {
    option_env!("TAHAN_API_URL")
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}
