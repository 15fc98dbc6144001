//! Modal Component
//!
//! Overlay dialog. Clicking the backdrop or the × button closes it; clicks
//! inside the content stay inside.

use leptos::prelude::*;

#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] on_close: Callback<()>,
    children: ChildrenFn,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div class="modal-overlay" on:click=move |_| on_close.run(())>
                <div class="modal-content" on:click=|ev| ev.stop_propagation()>
                    <button class="modal-close-btn" on:click=move |_| on_close.run(())>"×"</button>
                    {children()}
                </div>
            </div>
        </Show>
    }
}
