//! Shared server state: the dataset cache and the debounced live view.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use caudal_loader::{Dataset, Loader};
use caudal_report::{build_view, DashboardView};

use crate::debounce::Debouncer;
use crate::models::{ReloadSummary, ViewRequest};

/// Where the dataset comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A JSON file on disk.
    Path(PathBuf),
    /// An HTTP endpoint serving the JSON document.
    Url(String),
}

impl Source {
    /// Interpret a command-line argument as a file path or URL.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Load the dataset from this source.
    fn load(&self, loader: &Loader) -> Result<Dataset, caudal_loader::LoadError> {
        match self {
            Self::Path(path) => loader.load_path(path),
            Self::Url(url) => loader.fetch(url),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Whether a dataset is currently cached.
///
/// `Unavailable` covers both "not loaded yet" and "last load failed"; data
/// endpoints answer 503 with the reason until a later reload succeeds.
#[derive(Debug)]
pub enum LoadState {
    /// A dataset is cached and servable.
    Ready(Dataset),
    /// No dataset; the reason is served with the 503.
    Unavailable {
        /// Why there is no dataset.
        reason: String,
    },
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Unavailable {
            reason: "dataset not loaded yet".to_string(),
        }
    }
}

/// Dataset cache plus the debounce-maintained live view.
///
/// Shared between the request handlers and the debounce worker; everything
/// behind `RwLock` so reads stay concurrent.
#[derive(Debug)]
pub struct ViewHub {
    /// Where reloads fetch from.
    pub source: Source,
    /// Loader configuration used for every load.
    pub loader: Loader,
    /// The cached dataset, or why there is none.
    pub data: RwLock<LoadState>,
    /// The most recently computed live view.
    pub live: RwLock<Option<DashboardView>>,
    /// The request the live view was computed for; reloads recompute with it.
    pub last_request: RwLock<ViewRequest>,
}

impl ViewHub {
    /// A hub with nothing loaded yet.
    #[must_use]
    pub fn new(source: Source, loader: Loader) -> Self {
        Self {
            source,
            loader,
            data: RwLock::new(LoadState::default()),
            live: RwLock::new(None),
            last_request: RwLock::new(ViewRequest::default()),
        }
    }

    /// Recompute the live view for `request` against the cached dataset.
    ///
    /// A no-op while no dataset is cached; the request still becomes the
    /// one a later reload recomputes with.
    pub async fn recompute(&self, request: ViewRequest) {
        *self.last_request.write().await = request.clone();

        let data = self.data.read().await;
        let LoadState::Ready(dataset) = &*data else {
            return;
        };
        let view = build_view(
            &dataset.transactions,
            &request.filter_config(),
            request.granularity,
        );
        drop(data);

        *self.live.write().await = Some(view);
        tracing::debug!(granularity = %request.granularity, "live view recomputed");
    }

    /// Reload the dataset from the configured source.
    ///
    /// On success the cache is replaced and the live view recomputed with
    /// the last submitted request. On failure the cache empties, so data
    /// endpoints answer 503 until a later reload succeeds.
    ///
    /// # Errors
    ///
    /// The load error text, already stored as the unavailable reason.
    pub async fn reload(&self) -> Result<ReloadSummary, String> {
        let source = self.source.clone();
        let loader = self.loader.clone();
        let result = tokio::task::spawn_blocking(move || source.load(&loader))
            .await
            .map_err(|e| format!("load task failed: {e}"))?;

        match result {
            Ok(dataset) => {
                let summary = ReloadSummary {
                    transactions: dataset.len(),
                    years: dataset.years.len(),
                    categories: dataset.categories.len(),
                    rejected: dataset.rejected.len(),
                };
                tracing::info!(
                    transactions = summary.transactions,
                    rejected = summary.rejected,
                    "dataset loaded"
                );
                *self.data.write().await = LoadState::Ready(dataset);

                let request = self.last_request.read().await.clone();
                self.recompute(request).await;
                Ok(summary)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(error = %reason, "load failed");
                *self.data.write().await = LoadState::Unavailable {
                    reason: reason.clone(),
                };
                *self.live.write().await = None;
                Err(reason)
            }
        }
    }
}

/// Full application state handed to the router.
pub struct AppState {
    /// The shared dataset cache and live view.
    pub hub: Arc<ViewHub>,
    /// Status-page templates.
    pub tera: tera::Tera,
    /// The debounced live-view updater.
    pub debouncer: Debouncer<ViewRequest>,
}

impl AppState {
    /// Wire the hub to a debounce worker and assemble the state.
    #[must_use]
    pub fn new(hub: Arc<ViewHub>, tera: tera::Tera, window: Duration) -> Arc<Self> {
        let worker = Arc::clone(&hub);
        let debouncer = Debouncer::new(window, move |request: ViewRequest| {
            let hub = Arc::clone(&worker);
            async move { hub.recompute(request).await }
        });
        Arc::new(Self {
            hub,
            tera,
            debouncer,
        })
    }
}
