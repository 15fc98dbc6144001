//! Application Context
//!
//! Shared state provided via Leptos Context API: the API client and the
//! transient error notice with its retry action.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ApiClient, ApiError, Resource};
use crate::dispatch;
use crate::models::Entity;
use crate::store::Collection;

/// A failure shown to the user until dismissed or timed out
#[derive(Clone)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    retry: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Notice {
    pub fn can_retry(&self) -> bool {
        self.retry.is_some()
    }
}

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// HTTP client with the injected configuration
    api: StoredValue<ApiClient>,
    /// Currently shown error notice - read
    pub notice: ReadSignal<Option<Notice>>,
    /// Currently shown error notice - write
    set_notice: WriteSignal<Option<Notice>>,
    notice_seq: StoredValue<u64>,
}

impl AppContext {
    pub fn new(api: ApiClient) -> Self {
        let (notice, set_notice) = signal::<Option<Notice>>(None);
        Self {
            api: StoredValue::new(api),
            notice,
            set_notice,
            notice_seq: StoredValue::new(0),
        }
    }

    pub fn api(&self) -> ApiClient {
        self.api.get_value()
    }

    /// Show an error; replaces whatever notice is up
    pub fn report(&self, message: String, retry: Option<Arc<dyn Fn() + Send + Sync>>) {
        let id = self.notice_seq.get_value() + 1;
        self.notice_seq.set_value(id);
        self.set_notice.set(Some(Notice { id, message, retry }));

        // Auto-dismiss unless a newer notice took its place
        let set_notice = self.set_notice;
        let timeout_ms = self.api.with_value(|api| api.config().notice_timeout_ms);
        gloo_timers::callback::Timeout::new(timeout_ms, move || {
            set_notice.try_update(|current| {
                if current.as_ref().map(|n| n.id) == Some(id) {
                    *current = None;
                }
            });
        })
        .forget();
    }

    pub fn dismiss(&self) {
        self.set_notice.set(None);
    }

    /// Dismiss the current notice and run its retry action
    pub fn retry_notice(&self) {
        let retry = self.notice.get_untracked().and_then(|n| n.retry);
        self.dismiss();
        if let Some(retry) = retry {
            retry();
        }
    }

    /// Run an operation in the background. On failure it is reported with a
    /// retry action that runs the same operation again.
    pub fn spawn_retryable<F, Fut, T, E>(&self, label: &'static str, op: Arc<F>)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        E: Display,
    {
        let ctx = *self;
        spawn_local(async move {
            if let Err(err) = op().await {
                log::warn!("[{}] {}", label, err);
                let retry_op = op.clone();
                ctx.report(
                    err.to_string(),
                    Some(Arc::new(move || ctx.spawn_retryable(label, retry_op.clone()))),
                );
            }
        });
    }

    /// Fetch a whole collection into its store
    pub fn load<T>(&self, store: RwSignal<Collection<T>>, label: &'static str)
    where
        T: Entity,
        ApiClient: Resource<T>,
    {
        let api = self.api();
        self.spawn_retryable(
            label,
            Arc::new(move || {
                let api = api.clone();
                async move {
                    let count = dispatch::load::<T, _, _>(&store, &api).await?;
                    log::info!("[{}] Loaded {} entries", label, count);
                    Ok::<_, ApiError>(count)
                }
            }),
        );
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
