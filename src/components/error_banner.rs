//! Error Banner Component
//!
//! Shows the current notice with optional Retry and a dismiss button.

use leptos::prelude::*;

use crate::context::use_app_context;

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let ctx = use_app_context();

    move || {
        ctx.notice.get().map(|notice| {
            view! {
                <div class="error-banner" role="alert">
                    <span class="error-message">{notice.message.clone()}</span>
                    {notice.can_retry().then(|| view! {
                        <button class="retry-btn" on:click=move |_| ctx.retry_notice()>"Retry"</button>
                    })}
                    <button class="close-btn" on:click=move |_| ctx.dismiss()>"×"</button>
                </div>
            }
        })
    }
}
