//! Catalog backend client with a staleness cache.
//!
//! Every fetch takes a generation number when it starts; a response is only
//! applied if it is newer than what the cache already holds, so a slow
//! response can never overwrite a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BackendCategory, NewsArticle, Product};
use crate::store::Storefront;

const MIN_RETRY_INTERVAL: Duration = Duration::from_secs(1);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// One cached upstream resource.
struct Slot<T> {
    data: Option<Arc<T>>,
    fetched_at: Option<Instant>,
    generation: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            data: None,
            fetched_at: None,
            generation: 0,
        }
    }
}

impl<T> Slot<T> {
    fn fresh(&self, stale_time: Duration) -> Option<Arc<T>> {
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() < stale_time {
            self.data.clone()
        } else {
            None
        }
    }

    /// Store `data` if it comes from a newer fetch than the cached one.
    ///
    /// Returns the data now current and whether `data` was applied.
    fn accept(&mut self, generation: u64, data: T) -> (Arc<T>, bool) {
        if generation > self.generation {
            let data = Arc::new(data);
            self.data = Some(data.clone());
            self.fetched_at = Some(Instant::now());
            self.generation = generation;
            return (data, true);
        }
        let current = self.data.clone().unwrap_or_else(|| Arc::new(data));
        (current, false)
    }

    /// Serve previous data after a failed refetch, if there is any.
    ///
    /// The previous data counts as fresh for another stale window, so an
    /// unreachable backend is not retried on every read.
    fn fallback(&mut self, path: &str, err: AppError) -> Result<Arc<T>, AppError> {
        match &self.data {
            Some(data) => {
                tracing::warn!("Refetch of {} failed, serving previous data: {}", path, err);
                self.fetched_at = Some(Instant::now());
                Ok(data.clone())
            }
            None => Err(err),
        }
    }

    fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

/// Fetches and caches categories, products and news from the catalog backend.
pub struct CatalogFetcher {
    client: ClientWithMiddleware,
    api_url: String,
    categories_stale_time: Duration,
    products_stale_time: Duration,
    generation: AtomicU64,
    categories: RwLock<Slot<Vec<BackendCategory>>>,
    products: RwLock<Slot<Vec<Product>>>,
    news: RwLock<Slot<Vec<NewsArticle>>>,
}

impl CatalogFetcher {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.fetch_timeout)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
            .build_with_max_retries(config.fetch_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            categories_stale_time: config.categories_stale_time,
            products_stale_time: config.products_stale_time,
            generation: AtomicU64::new(0),
            categories: RwLock::new(Slot::default()),
            products: RwLock::new(Slot::default()),
            news: RwLock::new(Slot::default()),
        })
    }

    /// Make sure the storefront holds a fresh category tree.
    ///
    /// A newly accepted payload replaces the tree wholesale. When the backend
    /// is unreachable but a tree was loaded before, the old tree stays.
    pub async fn load_categories(&self, storefront: &RwLock<Storefront>) -> Result<(), AppError> {
        if self
            .categories
            .read()
            .await
            .fresh(self.categories_stale_time)
            .is_some()
        {
            return Ok(());
        }

        let generation = self.next_generation();
        match self.get_json::<Vec<BackendCategory>>("/categories").await {
            Ok(categories) => {
                let mut slot = self.categories.write().await;
                let count = categories.len();
                let (current, applied) = slot.accept(generation, categories);
                if applied {
                    storefront
                        .write()
                        .await
                        .categories
                        .set_backend_categories(current.as_ref().clone());
                    tracing::info!("Loaded {} categories (generation {})", count, generation);
                } else {
                    tracing::debug!("Discarding stale category response (generation {})", generation);
                }
                Ok(())
            }
            Err(e) => self
                .categories
                .write()
                .await
                .fallback("/categories", e)
                .map(|_| ()),
        }
    }

    /// Current product list, refetched when stale.
    pub async fn load_products(&self) -> Result<Arc<Vec<Product>>, AppError> {
        self.load(&self.products, "/products", self.products_stale_time)
            .await
    }

    /// Current news list, refetched when stale.
    pub async fn load_news(&self) -> Result<Arc<Vec<NewsArticle>>, AppError> {
        self.load(&self.news, "/news", self.products_stale_time).await
    }

    /// Mark everything stale so the next read refetches.
    pub async fn invalidate(&self) {
        self.categories.write().await.invalidate();
        self.products.write().await.invalidate();
        self.news.write().await.invalidate();
        tracing::info!("Catalog cache invalidated");
    }

    async fn load<T: DeserializeOwned>(
        &self,
        slot: &RwLock<Slot<T>>,
        path: &str,
        stale_time: Duration,
    ) -> Result<Arc<T>, AppError> {
        if let Some(data) = slot.read().await.fresh(stale_time) {
            return Ok(data);
        }

        let generation = self.next_generation();
        match self.get_json::<T>(path).await {
            Ok(data) => {
                let (current, applied) = slot.write().await.accept(generation, data);
                if !applied {
                    tracing::debug!("Discarding stale {} response (generation {})", path, generation);
                }
                Ok(current)
            }
            Err(e) => slot.write().await.fallback(path, e),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GET {} returned {}",
                path, status
            )));
        }

        Ok(response.json::<T>().await?)
    }
}
