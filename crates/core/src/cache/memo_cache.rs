//! 进程内记忆化缓存
//!
//! 基于 DashMap 的泛型 KV 缓存，支持可选 TTL。分析核心本身无状态，
//! 缓存只存在于调用方（编排层），键由调用方决定。

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    expire_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.expire_at.map_or(false, |at| Instant::now() > at)
    }
}

/// 内存缓存实现（使用DashMap）
pub struct MemoCache<K, V>
where
    K: Eq + Hash,
{
    map: Arc<DashMap<K, CacheEntry<V>>>,
    default_ttl: Option<Duration>,
}

impl<K, V> Clone for MemoCache<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// 获取缓存值，过期则删除并返回 None
    ///
    /// 删除时在分片锁内重新检查过期，不会误删并发写入的新值。
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.map.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        if self.map.remove_if(key, |_, entry| entry.is_expired()).is_some() {
            debug!("缓存过期: {:?}", key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let expire_at = ttl.map(|d| Instant::now() + d);
        self.map.insert(key, CacheEntry { value, expire_at });
    }

    /// 缓存未命中时计算并写入
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    /// 删除所有满足条件的键，返回删除数量
    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let before = self.map.len();
        self.map.retain(|k, _| !predicate(k));
        before.saturating_sub(self.map.len())
    }

    pub fn clear(&self) {
        self.map.clear();
    }

    /// 当前条目数（含尚未清理的过期条目）
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
