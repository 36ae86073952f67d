pub mod refresh;
pub mod store;

pub use refresh::RefreshClock;
pub use store::{CacheEntry, KvStore, MemoryStore};

use chrono::{DateTime, Duration as ChronoDuration, Local};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// 缓存读取结果
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub data: T,
    pub last_update: DateTime<Local>,
    pub hit: bool,
}

/// 限时缓存: 未过期直接返回, 否则调用 fetch 并写回
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
    clock: Arc<RefreshClock>,
}

/// 缓存键: `<view>/<nif>/<filial>/<periodo>`
pub fn cache_key(view: &str, nif: &str, branch: Option<&str>, period_code: u8) -> String {
    format!("{}/{}/{}/{}", view, nif, branch.unwrap_or(""), period_code)
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<RefreshClock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &RefreshClock {
        &self.clock
    }

    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        force: bool,
        fetch: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_at(Local::now(), key, ttl, force, fetch).await
    }

    pub async fn fetch_at<T, E, F, Fut>(
        &self,
        now: DateTime<Local>,
        key: &str,
        ttl: Duration,
        force: bool,
        fetch: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if force {
            self.store.remove(key);
        } else if let Some(entry) = self.store.get(key) {
            let age = (now - entry.stored_at).to_std().unwrap_or_default();
            if age < ttl {
                match serde_json::from_value::<T>(entry.payload) {
                    Ok(data) => {
                        tracing::debug!("缓存命中 {}", key);
                        return Ok(Cached {
                            data,
                            last_update: entry.stored_at,
                            hit: true,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("缓存数据无法解析, 丢弃 {}: {}", key, e);
                        self.store.remove(key);
                    }
                }
            } else {
                self.store.remove(key);
            }
        }

        let data = fetch().await?;
        let payload = serde_json::to_value(&data)?;

        // 写入前顺带清理其它已过期的键
        let purged = self.store.purge_expired(now);
        if purged > 0 {
            tracing::debug!("清理过期缓存 {} 条", purged);
        }

        let expires_at = ChronoDuration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);
        self.store.set(
            key,
            CacheEntry {
                payload,
                stored_at: now,
                expires_at,
            },
        );
        self.clock.mark_updated(now);

        Ok(Cached {
            data,
            last_update: now,
            hit: false,
        })
    }

    /// 清除某个 NIF 的全部缓存
    pub fn invalidate_nif(&self, nif: &str) -> usize {
        self.store
            .remove_matching(&|key| key.split('/').nth(1) == Some(nif))
    }
}
