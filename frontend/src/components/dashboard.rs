//! 业务面板外壳
//!
//! 受保护路由的最小外壳：身份卡片、手动刷新与登出。
//! 真正的业务面板（储备金 / 发票 / 风险评估等）由各自的特性模块提供。

use crate::auth::use_auth;
use crate::components::icons::{BadgeCheck, LogOut, RefreshCw, ShieldCheck, UserRound};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let state = auth.state;

    let (refreshing, set_refreshing) = signal(false);

    // 身份快照（路由守卫保证进入本页时已认证）
    let user = move || state.get().user().cloned();

    let on_refresh = {
        let session = auth.session.clone();
        move |_| {
            set_refreshing.set(true);
            let session = session.clone();
            spawn_local(async move {
                // 失败的通知由网关发布；会话过期时路由服务会自动跳回登录页
                let _ = session.refresh_profile().await;
                set_refreshing.set(false);
            });
        }
    };

    let on_logout = {
        let session = auth.session.clone();
        // 注销后的跳转由路由服务的认证状态监听自动处理
        move |_| session.logout()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-3xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <ShieldCheck attr:class="text-primary h-6 w-6" />
                        <a class="btn btn-ghost text-xl">"Tahan"</a>
                        <span class="badge badge-neutral hidden md:inline-flex">
                            "MSME Resilience Platform"
                        </span>
                    </div>
                    <div class="flex-none gap-2">
                        <button
                            on:click=on_refresh
                            disabled=move || refreshing.get()
                            class="btn btn-ghost btn-circle"
                        >
                            <RefreshCw attr:class=move || if refreshing.get() {
                                "h-5 w-5 animate-spin"
                            } else {
                                "h-5 w-5"
                            } />
                        </button>
                        <button on:click=on_logout class="btn btn-outline btn-error gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Sign out"
                        </button>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">
                            <UserRound attr:class="h-5 w-5" /> "Account"
                        </h3>
                        {move || match user() {
                            Some(user) => {
                                let name = user.display_name().to_string();
                                let verified = user.phone_verified;
                                let phone = user.phone_number.clone();
                                let email = user.email.clone().unwrap_or_else(|| "—".to_string());
                                let member_since = user.created_at.map(|ts| ts.format_date());
                                view! {
                                    <div class="space-y-3">
                                        <div class="flex items-center gap-2">
                                            <span class="text-2xl font-bold">{name}</span>
                                            {verified.then(|| view! {
                                                <div class="badge badge-success gap-1">
                                                    <BadgeCheck attr:class="h-4 w-4" /> "Verified"
                                                </div>
                                            })}
                                        </div>
                                        <div class="text-sm opacity-70">"Phone: " {phone}</div>
                                        <div class="text-sm opacity-70">"Email: " {email}</div>
                                        {member_since.map(|date| view! {
                                            <div class="text-sm opacity-50">"Member since " {date}</div>
                                        })}
                                    </div>
                                }
                                .into_any()
                            }
                            None => view! {
                                <span class="loading loading-spinner loading-md"></span>
                            }
                            .into_any(),
                        }}
                    </div>
                </div>
            </div>
        </div>
    }
}
