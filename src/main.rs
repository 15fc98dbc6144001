//! Smart Life Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod dispatch;
mod models;
mod pages;
mod store;
mod view;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

use crate::api::ApiClient;
use crate::config::AppConfig;

fn main() {
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = rolling_logger::init_logger("SmartLife", level) {
        web_sys::console::warn_1(&format!("[APP] Logger not installed: {}", e).into());
    }

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("[APP] Invalid build configuration, using defaults: {}", e);
        AppConfig::default()
    });
    log::info!("[APP] Starting against {}", config.api_base_url);

    match ApiClient::new(config) {
        Ok(api) => mount_to_body(move || view! { <App api=api /> }),
        Err(e) => log::error!("[APP] {}", e),
    }
}
