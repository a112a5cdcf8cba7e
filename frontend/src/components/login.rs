//! 认证页组件
//!
//! 登录 / 注册 / 手机验证的多步流程，驱动会话管理器的四个身份操作。
//! 注册成功后会话进入待验证状态，验证面板随之自动激活；
//! 认证成功后的跳转由路由服务监听认证状态自动完成。

use crate::auth::{Session, use_auth};
use crate::components::icons::ShieldCheck;
use crate::session::SessionPhase;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;
use tahan_shared::{RegisterRequest, VERIFICATION_CODE_LEN};

/// 认证页标签
#[derive(Debug, Clone, Copy, PartialEq)]
enum AuthTab {
    Login,
    Register,
}

/// 各面板共享的提交状态
#[derive(Clone, Copy)]
struct FormState {
    is_submitting: ReadSignal<bool>,
    set_is_submitting: WriteSignal<bool>,
    set_error_msg: WriteSignal<Option<String>>,
}

/// 空白输入视为未填写的可选字段
fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let state = auth.state;
    let session = auth.session;

    let (active_tab, set_active_tab) = signal(AuthTab::Login);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 各表单字段在页面作用域持有，面板切换不丢输入
    let (login_phone, set_login_phone) = signal(String::new());
    let (login_password, set_login_password) = signal(String::new());
    let (reg_phone, set_reg_phone) = signal(String::new());
    let (reg_name, set_reg_name) = signal(String::new());
    let (reg_email, set_reg_email) = signal(String::new());
    let (reg_password, set_reg_password) = signal(String::new());
    let (code, set_code) = signal(String::new());

    let form = FormState {
        is_submitting,
        set_is_submitting,
        set_error_msg,
    };

    // 待验证手机号来自会话状态：注册成功后自动进入验证面板
    let pending_phone = move || match state.get() {
        SessionPhase::PendingVerification { phone_number } => Some(phone_number),
        _ => None,
    };

    let tab_class = move |tab: AuthTab| {
        if active_tab.get() == tab {
            "tab tab-active"
        } else {
            "tab"
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ShieldCheck attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Tahan"</h1>
                        <p class="text-base-content/70">
                            "Resilience tools for your business"
                        </p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div class="card-body">
                        // 标签栏（验证面板激活时隐藏）
                        <Show when=move || pending_phone().is_none()>
                            <div role="tablist" class="tabs tabs-boxed mb-2">
                                <a
                                    role="tab"
                                    class=move || tab_class(AuthTab::Login)
                                    on:click=move |_| {
                                        set_active_tab.set(AuthTab::Login);
                                        set_error_msg.set(None);
                                    }
                                >
                                    "Login"
                                </a>
                                <a
                                    role="tab"
                                    class=move || tab_class(AuthTab::Register)
                                    on:click=move |_| {
                                        set_active_tab.set(AuthTab::Register);
                                        set_error_msg.set(None);
                                    }
                                >
                                    "Register"
                                </a>
                            </div>
                        </Show>

                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        {
                            let session = session.clone();
                            move || {
                                if let Some(phone_number) = pending_phone() {
                                    verify_panel(
                                        session.clone(),
                                        form,
                                        phone_number,
                                        code,
                                        set_code,
                                        set_active_tab,
                                    )
                                } else if active_tab.get() == AuthTab::Login {
                                    login_panel(
                                        session.clone(),
                                        form,
                                        login_phone,
                                        set_login_phone,
                                        login_password,
                                        set_login_password,
                                    )
                                } else {
                                    register_panel(
                                        session.clone(),
                                        form,
                                        reg_phone,
                                        set_reg_phone,
                                        reg_name,
                                        set_reg_name,
                                        reg_email,
                                        set_reg_email,
                                        reg_password,
                                        set_reg_password,
                                    )
                                }
                            }
                        }
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 登录面板
fn login_panel(
    session: Rc<Session>,
    form: FormState,
    phone: ReadSignal<String>,
    set_phone: WriteSignal<String>,
    password: ReadSignal<String>,
    set_password: WriteSignal<String>,
) -> AnyView {
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if phone.get().is_empty() || password.get().is_empty() {
            form.set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        form.set_is_submitting.set(true);
        form.set_error_msg.set(None);

        let session = session.clone();
        spawn_local(async move {
            // 成功后的跳转由路由服务的认证状态监听自动处理
            if let Err(err) = session
                .login(phone.get_untracked(), password.get_untracked())
                .await
            {
                form.set_error_msg.set(Some(err.message().to_string()));
            }
            form.set_is_submitting.set(false);
        });
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <div class="form-control">
                <label class="label" for="login-phone">
                    <span class="label-text">"Phone number"</span>
                </label>
                <input
                    id="login-phone"
                    type="tel"
                    placeholder="+60 12-345 6789"
                    on:input=move |ev| set_phone.set(event_target_value(&ev))
                    prop:value=phone
                    class="input input-bordered w-full"
                    required
                />
            </div>
            <div class="form-control">
                <label class="label" for="login-password">
                    <span class="label-text">"Password"</span>
                </label>
                <input
                    id="login-password"
                    type="password"
                    placeholder="••••••••"
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    prop:value=password
                    class="input input-bordered w-full"
                    required
                />
            </div>
            <div class="form-control mt-6">
                <button class="btn btn-primary w-full" disabled=move || form.is_submitting.get()>
                    {move || if form.is_submitting.get() {
                        view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                    } else {
                        "Sign in".into_any()
                    }}
                </button>
            </div>
        </form>
    }
    .into_any()
}

/// 注册面板
fn register_panel(
    session: Rc<Session>,
    form: FormState,
    phone: ReadSignal<String>,
    set_phone: WriteSignal<String>,
    name: ReadSignal<String>,
    set_name: WriteSignal<String>,
    email: ReadSignal<String>,
    set_email: WriteSignal<String>,
    password: ReadSignal<String>,
    set_password: WriteSignal<String>,
) -> AnyView {
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if phone.get().is_empty() || password.get().is_empty() {
            form.set_error_msg
                .set(Some("Phone number and password are required".to_string()));
            return;
        }

        form.set_is_submitting.set(true);
        form.set_error_msg.set(None);

        let request = RegisterRequest {
            phone_number: phone.get_untracked(),
            full_name: none_if_empty(name.get_untracked()),
            email: none_if_empty(email.get_untracked()),
            password: password.get_untracked(),
        };

        let session = session.clone();
        spawn_local(async move {
            // 成功后会话进入待验证状态，验证面板自动激活
            if let Err(err) = session.register(request).await {
                form.set_error_msg.set(Some(err.message().to_string()));
            }
            form.set_is_submitting.set(false);
        });
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <div class="form-control">
                <label class="label" for="reg-phone">
                    <span class="label-text">"Phone number"</span>
                </label>
                <input
                    id="reg-phone"
                    type="tel"
                    placeholder="+60 12-345 6789"
                    on:input=move |ev| set_phone.set(event_target_value(&ev))
                    prop:value=phone
                    class="input input-bordered w-full"
                    required
                />
            </div>
            <div class="form-control">
                <label class="label" for="reg-name">
                    <span class="label-text">"Full name " <span class="opacity-50">"(optional)"</span></span>
                </label>
                <input
                    id="reg-name"
                    type="text"
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                    prop:value=name
                    class="input input-bordered w-full"
                />
            </div>
            <div class="form-control">
                <label class="label" for="reg-email">
                    <span class="label-text">"Email " <span class="opacity-50">"(optional)"</span></span>
                </label>
                <input
                    id="reg-email"
                    type="email"
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                    prop:value=email
                    class="input input-bordered w-full"
                />
            </div>
            <div class="form-control">
                <label class="label" for="reg-password">
                    <span class="label-text">"Password"</span>
                </label>
                <input
                    id="reg-password"
                    type="password"
                    placeholder="••••••••"
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    prop:value=password
                    class="input input-bordered w-full"
                    required
                />
            </div>
            <div class="form-control mt-6">
                <button class="btn btn-primary w-full" disabled=move || form.is_submitting.get()>
                    {move || if form.is_submitting.get() {
                        view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                    } else {
                        "Create account".into_any()
                    }}
                </button>
            </div>
        </form>
    }
    .into_any()
}

/// 验证面板：输入发往注册手机号的一次性验证码
fn verify_panel(
    session: Rc<Session>,
    form: FormState,
    phone_number: String,
    code: ReadSignal<String>,
    set_code: WriteSignal<String>,
    set_active_tab: WriteSignal<AuthTab>,
) -> AnyView {
    let submit_phone = phone_number.clone();
    let submit_session = session.clone();
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let entered = code.get();
        if entered.len() != VERIFICATION_CODE_LEN || !entered.chars().all(|c| c.is_ascii_digit()) {
            form.set_error_msg.set(Some(format!(
                "Enter the {}-digit code sent to your phone",
                VERIFICATION_CODE_LEN
            )));
            return;
        }

        form.set_is_submitting.set(true);
        form.set_error_msg.set(None);

        let session = submit_session.clone();
        let phone_number = submit_phone.clone();
        spawn_local(async move {
            // 成功后与登录一致：凭据入库、身份就绪，路由自动跳转
            if let Err(err) = session.verify_phone(phone_number, entered).await {
                form.set_error_msg.set(Some(err.message().to_string()));
            }
            form.set_is_submitting.set(false);
        });
    };

    let on_back = move |_| {
        // 放弃验证流程：回到注册面板重新开始
        session.abandon_verification();
        set_active_tab.set(AuthTab::Register);
        form.set_error_msg.set(None);
        set_code.set(String::new());
    };

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <div class="text-center space-y-1 mb-2">
                <h2 class="text-xl font-bold">"Verify your phone"</h2>
                <p class="text-sm text-base-content/70">
                    "We sent a " {VERIFICATION_CODE_LEN.to_string()} "-digit code to "
                    <span class="font-mono">{phone_number.clone()}</span>
                </p>
            </div>
            <div class="form-control">
                <label class="label" for="verify-code">
                    <span class="label-text">"Verification code"</span>
                </label>
                <input
                    id="verify-code"
                    type="text"
                    inputmode="numeric"
                    placeholder="123456"
                    maxlength="6"
                    on:input=move |ev| set_code.set(event_target_value(&ev))
                    prop:value=code
                    class="input input-bordered w-full text-center font-mono text-lg tracking-widest"
                    required
                />
            </div>
            <div class="form-control mt-6">
                <button class="btn btn-primary w-full" disabled=move || form.is_submitting.get()>
                    {move || if form.is_submitting.get() {
                        view! { <span class="loading loading-spinner"></span> "Verifying..." }.into_any()
                    } else {
                        "Verify".into_any()
                    }}
                </button>
            </div>
            <button type="button" class="btn btn-ghost btn-sm w-full" on:click=on_back>
                "Back to registration"
            </button>
        </form>
    }
    .into_any()
}
