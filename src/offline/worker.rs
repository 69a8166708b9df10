use reqwest::Url;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{BoardError, BoardResult};
use crate::offline::{
    network::{AssetNetwork, AssetResponse, OFFLINE},
    store::CacheStorage,
};

/// Prefix of every asset store owned by this application.
pub const CACHE_PREFIX: &'static str = "kstreet-";

/// Same-origin files cached on install.
pub const APP_SHELL: [&'static str; 7] = [
    "/",
    "/index.html",
    "/style.css",
    "/script.js",
    "/favicon.svg",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted, the feed client caches these itself
    Passthrough,
    CacheFirst,
    StaleWhileRevalidate,
}

#[derive(Debug, Clone)]
pub struct RoutingRules {
    pub data_hosts: Vec<String>,
    pub font_hosts: Vec<String>,
    /// Same-origin path prefixes served cache-first
    pub cache_first_prefixes: Vec<String>,
}

impl Default for RoutingRules {
    fn default() -> Self {
        RoutingRules {
            data_hosts: vec!["docs.google.com".to_string()],
            font_hosts: vec![
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            cache_first_prefixes: vec!["/icons/".to_string()],
        }
    }
}

impl RoutingRules {
    /// First matching rule wins.
    pub fn route(&self, url: &Url) -> Route {
        let host = url.host_str().unwrap_or_default();
        if self.data_hosts.iter().any(|h| h == host) {
            return Route::Passthrough;
        }
        if self.font_hosts.iter().any(|h| h == host)
            || self
                .cache_first_prefixes
                .iter()
                .any(|prefix| url.path().starts_with(prefix.as_str()))
        {
            return Route::CacheFirst;
        }
        Route::StaleWhileRevalidate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Installing,
    Installed,
    /// Clients claimed, requests are intercepted
    Activated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Left to default network handling
    Passthrough,
    Respond(AssetResponse),
}

/// Versioned offline cache for the dashboard's static assets.
pub struct AssetWorker {
    origin: Url,
    cache_name: String,
    rules: RoutingRules,
    storage: CacheStorage,
    network: Arc<dyn AssetNetwork>,
    state: Mutex<Lifecycle>,
    revalidations: Mutex<Vec<JoinHandle<()>>>,
}

impl AssetWorker {
    pub fn new(
        origin: Url,
        version: &str,
        rules: RoutingRules,
        storage: CacheStorage,
        network: Arc<dyn AssetNetwork>,
    ) -> Self {
        AssetWorker {
            origin,
            cache_name: format!("{CACHE_PREFIX}{version}"),
            rules,
            storage,
            network,
            state: Mutex::new(Lifecycle::Installing),
            revalidations: Mutex::new(vec![]),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn state(&self) -> Lifecycle {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: Lifecycle) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Pre-cache the app shell. Nothing is stored unless every file was fetched.
    pub async fn install(&self) -> BoardResult<()> {
        self.storage.open(&self.cache_name);

        let urls = APP_SHELL
            .iter()
            .map(|path| {
                self.origin.join(path).map_err(|e| BoardError::Install {
                    url: path.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<BoardResult<Vec<Url>>>()?;

        let entries = futures::future::try_join_all(urls.iter().map(|url| async move {
            let response = self.network.fetch(url).await.map_err(|e| BoardError::Install {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            if !response.is_ok() {
                return Err(BoardError::Install {
                    url: url.to_string(),
                    reason: format!("HTTP {} {}", response.status, response.status_text),
                });
            }
            Ok::<(String, AssetResponse), BoardError>((url.to_string(), response))
        }))
        .await?;

        info!("Cached {} app shell files in {}", entries.len(), self.cache_name);
        self.storage.put_all(&self.cache_name, entries);
        self.set_state(Lifecycle::Installed);
        Ok(())
    }

    /// Purge stores of previous versions and start intercepting requests.
    /// Returns the names of the deleted stores.
    pub fn activate(&self) -> Vec<String> {
        let stale = self
            .storage
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(CACHE_PREFIX) && *key != self.cache_name)
            .collect::<Vec<String>>();
        for key in stale.iter() {
            self.storage.delete(key);
            info!("Deleted stale asset cache {key}");
        }
        self.set_state(Lifecycle::Activated);
        stale
    }

    /// Route an intercepted request. Requests are only intercepted once activated.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        if self.state() != Lifecycle::Activated {
            return FetchOutcome::Passthrough;
        }
        match self.rules.route(url) {
            Route::Passthrough => FetchOutcome::Passthrough,
            Route::CacheFirst => FetchOutcome::Respond(self.cache_first(url).await),
            Route::StaleWhileRevalidate => {
                FetchOutcome::Respond(self.stale_while_revalidate(url).await)
            }
        }
    }

    /// `fetch`, with pass-through requests sent straight to the network.
    pub async fn respond(&self, url: &Url) -> BoardResult<AssetResponse> {
        match self.fetch(url).await {
            FetchOutcome::Respond(response) => Ok(response),
            FetchOutcome::Passthrough => self.network.fetch(url).await,
        }
    }

    /// Wait for background revalidations started so far.
    pub async fn settle(&self) {
        let pending = std::mem::take(
            &mut *self
                .revalidations
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in pending {
            if let Err(e) = handle.await {
                warn!("Revalidation task failed. {e}");
            }
        }
    }

    /// Revalidation handles currently held for `settle`. Finished ones are
    /// dropped whenever a new revalidation starts.
    pub fn tracked_revalidations(&self) -> usize {
        self.revalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn cache_first(&self, url: &Url) -> AssetResponse {
        if let Some(cached) = self.storage.match_url(url.as_str()) {
            return cached;
        }

        match self.network.fetch(url).await {
            Ok(response) => {
                if response.is_ok() || response.is_opaque() {
                    self.storage
                        .put(&self.cache_name, url.as_str(), response.clone());
                }
                response
            }
            Err(e) => {
                debug!("{url} unavailable and not cached. {e}");
                AssetResponse::offline("")
            }
        }
    }

    async fn stale_while_revalidate(&self, url: &Url) -> AssetResponse {
        match self.storage.match_url(url.as_str()) {
            Some(cached) => {
                // Not awaited: the refreshed copy is for the next request.
                let refresh = revalidate(
                    self.network.clone(),
                    self.storage.clone(),
                    self.cache_name.clone(),
                    url.clone(),
                );
                let handle = tokio::spawn(async move {
                    refresh.await;
                });
                let mut revalidations = self
                    .revalidations
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                revalidations.retain(|pending| !pending.is_finished());
                revalidations.push(handle);
                cached
            }
            None => revalidate(
                self.network.clone(),
                self.storage.clone(),
                self.cache_name.clone(),
                url.clone(),
            )
            .await
            .unwrap_or_else(|| AssetResponse::offline(OFFLINE)),
        }
    }
}

/// Fetch `url` and refresh the cached copy when the response is ok.
async fn revalidate(
    network: Arc<dyn AssetNetwork>,
    storage: CacheStorage,
    cache_name: String,
    url: Url,
) -> Option<AssetResponse> {
    match network.fetch(&url).await {
        Ok(response) => {
            if response.is_ok() {
                storage.put(&cache_name, url.as_str(), response.clone());
            }
            Some(response)
        }
        Err(e) => {
            debug!("Revalidation of {url} failed. {e}");
            None
        }
    }
}
