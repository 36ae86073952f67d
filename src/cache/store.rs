use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde_json::Value;

/// 缓存条目: JSON 数据 + 写入时间 + 过期时间
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Value,
    pub stored_at: DateTime<Local>,
    pub expires_at: DateTime<Local>,
}

/// 键值存储接口
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn set(&self, key: &str, entry: CacheEntry);
    fn remove(&self, key: &str) -> bool;
    /// 删除所有满足条件的键, 返回删除数量
    fn remove_matching(&self, predicate: &dyn Fn(&str) -> bool) -> usize;
    /// 删除 `now` 时已过期的条目, 返回删除数量
    fn purge_expired(&self, now: DateTime<Local>) -> usize;
}

/// 进程内存储 (DashMap)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    fn set(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn remove_matching(&self, predicate: &dyn Fn(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        before - self.entries.len()
    }

    fn purge_expired(&self, now: DateTime<Local>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn entry(n: i64) -> CacheEntry {
        let now = Local::now();
        CacheEntry {
            payload: json!({ "n": n }),
            stored_at: now,
            expires_at: now + Duration::minutes(3),
        }
    }

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("a", entry(1));

        assert_eq!(store.get("a").unwrap().payload["n"], 1);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn remove_matching_counts_removed_keys() {
        let store = MemoryStore::new();
        store.set("resumo/111/", entry(1));
        store.set("produtos/111/2", entry(2));
        store.set("resumo/222/", entry(3));

        let removed = store.remove_matching(&|key| key.contains("/111/"));

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn purge_expired_drops_only_stale_entries() {
        let store = MemoryStore::new();
        let now = Local::now();
        let mut stale = entry(1);
        stale.expires_at = now - Duration::seconds(1);
        store.set("stale", stale);
        store.set("fresh", entry(2));

        assert_eq!(store.purge_expired(now), 1);
        assert!(store.get("stale").is_none());
        assert!(store.get("fresh").is_some());
    }
}
