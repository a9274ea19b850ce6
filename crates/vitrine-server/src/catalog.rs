//! Read access to the image catalog for request handlers.
//!
//! Every query runs on the blocking pool with a bounded wait. The full list
//! is cached for a fixed lifetime and refreshed by one caller at a time;
//! when a refresh fails the previous list is served instead and the failure
//! is only logged.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, error, warn};

use vitrine_shared::{ImageId, ImageRecord, StorageRequest, ValidStorageRequest};
use vitrine_store::{Database, StoreError};

use crate::error::ServerError;

#[derive(Debug, Clone)]
struct CachedList {
    images: Arc<Vec<ImageRecord>>,
    fetched_at: Instant,
}

impl CachedList {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Clone)]
pub struct Catalog {
    db: Arc<Mutex<Database>>,
    ttl: Duration,
    timeout: Duration,
    cache: Arc<RwLock<Option<CachedList>>>,
    refresh: Arc<AsyncMutex<()>>,
}

impl Catalog {
    pub fn new(db: Database, ttl: Duration, timeout: Duration) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            ttl,
            timeout,
            cache: Arc::new(RwLock::new(None)),
            refresh: Arc::new(AsyncMutex::new(())),
        }
    }

    /// All images ascending by number.
    pub async fn list(&self) -> Result<Arc<Vec<ImageRecord>>, ServerError> {
        if let Some(images) = self.fresh().await {
            return Ok(images);
        }

        let _refresh = self.refresh.lock().await;
        // Whoever held the guard before us may have just refreshed.
        if let Some(images) = self.fresh().await {
            return Ok(images);
        }

        match self.query(|db| db.list_images()).await {
            Ok(images) => {
                debug!(count = images.len(), "catalog refreshed");
                let images = Arc::new(images);
                *self.cache.write().await = Some(CachedList {
                    images: images.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(images)
            }
            Err(e) => match self.cache.read().await.as_ref() {
                Some(stale) => {
                    warn!(
                        error = %e,
                        age_secs = stale.fetched_at.elapsed().as_secs(),
                        "catalog refresh failed, serving stale list"
                    );
                    Ok(stale.images.clone())
                }
                None => {
                    error!(error = %e, "catalog fetch failed");
                    Err(e)
                }
            },
        }
    }

    async fn fresh(&self) -> Option<Arc<Vec<ImageRecord>>> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.is_fresh(self.ttl))
            .map(|cached| cached.images.clone())
    }

    pub async fn get(&self, id: ImageId) -> Result<ImageRecord, ServerError> {
        let lookup = id.clone();
        match self.query(move |db| db.get_image(&lookup)).await {
            Err(ServerError::Store(StoreError::NotFound)) => Err(ServerError::ImageNotFound(id)),
            other => other,
        }
    }

    pub async fn create_storage_request(
        &self,
        form: ValidStorageRequest,
    ) -> Result<StorageRequest, ServerError> {
        self.query(move |db| db.insert_storage_request(&form)).await
    }

    async fn query<T, F>(&self, op: F) -> Result<T, ServerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut db = db.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut db)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(ServerError::Timeout(self.timeout)),
            Ok(Err(join)) => Err(ServerError::Internal(format!("store task failed: {join}"))),
            Ok(Ok(result)) => result.map_err(ServerError::from),
        }
    }
}
