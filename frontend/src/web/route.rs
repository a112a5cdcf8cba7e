//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖 DOM 或 web_sys。
//! 守卫决策 `can_enter` 是认证状态的纯函数，可直接测试。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录 / 注册 / 验证页（默认路由）
    #[default]
    Login,
    /// 业务面板（需要认证）
    Dashboard,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" | "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Dashboard => "/dashboard",
            Self::NotFound => "/404",
        }
    }

    /// 该路由是否需要认证
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// 已认证用户是否应离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 守卫拒绝时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 认证成功后（从登录页）的重定向目标
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

/// **守卫决策**：目标路由在当前认证状态下是否放行
///
/// 必须在会话启动校验完成后调用；路由服务以就绪信号门控首次决策，
/// 避免刷新页面时把持有有效凭据的用户误弹回登录页。
pub fn can_enter(route: &AppRoute, authenticated: bool) -> bool {
    !route.requires_auth() || authenticated
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/dashboard"), AppRoute::Dashboard);
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(AppRoute::from_path("/invoices"), AppRoute::NotFound);
        assert_eq!(AppRoute::NotFound.to_path(), "/404");
    }

    #[test]
    fn only_dashboard_requires_auth() {
        assert!(AppRoute::Dashboard.requires_auth());
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::NotFound.requires_auth());
    }

    #[test]
    fn guard_blocks_anonymous_from_protected_routes() {
        assert!(!can_enter(&AppRoute::Dashboard, false));
        assert!(can_enter(&AppRoute::Dashboard, true));
        // 公开路由对任何人放行
        assert!(can_enter(&AppRoute::Login, false));
        assert!(can_enter(&AppRoute::NotFound, false));
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(AppRoute::auth_failure_redirect(), AppRoute::Login);
        assert_eq!(AppRoute::auth_success_redirect(), AppRoute::Dashboard);
        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert!(!AppRoute::Dashboard.should_redirect_when_authenticated());
    }
}
