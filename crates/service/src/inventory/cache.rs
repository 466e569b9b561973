use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sea_orm::ConnectionTrait;
use tracing::debug;

use super::{stock_for, stock_report, ItemStock, StockLine};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StockKey {
    Report,
    Item(i32),
}

#[derive(Debug, Clone)]
enum StockValue {
    Report(Arc<Vec<StockLine>>),
    Item(ItemStock),
}

/// Short-lived cache in front of the stock read endpoints.
///
/// Entries expire after the configured TTL and are dropped wholesale by
/// [`InventoryCache::invalidate`] whenever units are allocated, released,
/// created or deleted. A zero TTL turns caching off.
#[derive(Clone)]
pub struct InventoryCache {
    inner: Option<Cache<StockKey, StockValue>>,
}

impl InventoryCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| Cache::builder().max_capacity(10_000).time_to_live(ttl).build());
        Self { inner }
    }

    pub async fn report<C: ConnectionTrait>(&self, db: &C) -> Result<Arc<Vec<StockLine>>, ServiceError> {
        if let Some(cache) = &self.inner {
            if let Some(StockValue::Report(hit)) = cache.get(&StockKey::Report).await {
                debug!("stock report cache hit");
                return Ok(hit);
            }
        }
        let fresh = Arc::new(stock_report(db).await?);
        if let Some(cache) = &self.inner {
            cache.insert(StockKey::Report, StockValue::Report(fresh.clone())).await;
        }
        Ok(fresh)
    }

    pub async fn item<C: ConnectionTrait>(&self, db: &C, desc_id: i32) -> Result<ItemStock, ServiceError> {
        let key = StockKey::Item(desc_id);
        if let Some(cache) = &self.inner {
            if let Some(StockValue::Item(hit)) = cache.get(&key).await {
                return Ok(hit);
            }
        }
        let fresh = stock_for(db, desc_id).await?;
        if let Some(cache) = &self.inner {
            cache.insert(key, StockValue::Item(fresh.clone())).await;
        }
        Ok(fresh)
    }

    /// Drop every cached entry. Call after any stock mutation commits.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
        }
    }
}

impl Default for InventoryCache {
    fn default() -> Self { Self::new(Duration::from_secs(5)) }
}
