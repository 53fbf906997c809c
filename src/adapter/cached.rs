//! 带缓存的键值存储适配器
//!
//! 读：先查缓存，未命中时经连接池读取存储并回填缓存。
//! 写：先写存储，成功后刷新缓存；删除成功后使缓存条目失效。

use rat_logger::debug;
use std::sync::Arc;

use super::{KvConnection, store_error};
use crate::cache::LruCache;
use crate::error::QuickCacheResult;
use crate::pool::{ConnectionFactory, ConnectionPool};

/// 带缓存的键值存储
pub struct CachedKvStore<F>
where
    F: ConnectionFactory,
    F::Connection: KvConnection,
{
    cache: Arc<LruCache>,
    pool: Arc<ConnectionPool<F>>,
}

impl<F> CachedKvStore<F>
where
    F: ConnectionFactory,
    F::Connection: KvConnection,
{
    pub fn new(cache: Arc<LruCache>, pool: Arc<ConnectionPool<F>>) -> Self {
        Self { cache, pool }
    }

    /// 读取键值（缓存旁路读）
    pub fn get(&self, key: &str) -> QuickCacheResult<Option<String>> {
        if let Some(value) = self.cache.get(key) {
            debug!("缓存命中: key={}", key);
            return Ok(Some(value));
        }

        let connection = self.pool.acquire()?;
        let found = connection.with(|conn| conn.read(key))?.map_err(store_error)?;

        if let Some(value) = &found {
            self.cache.put(key.to_string(), value.clone());
        }
        debug!("缓存未命中: key={}, 存储命中={}", key, found.is_some());
        Ok(found)
    }

    /// 写入键值（写穿）
    pub fn put(&self, key: &str, value: &str) -> QuickCacheResult<()> {
        let connection = self.pool.acquire()?;
        connection
            .with(|conn| conn.upsert(key, value))?
            .map_err(store_error)?;

        self.cache.put(key.to_string(), value.to_string());
        Ok(())
    }

    /// 删除键，返回存储中是否存在该键
    ///
    /// 存储调用成功后无论是否删到记录都会移除缓存条目。
    pub fn delete(&self, key: &str) -> QuickCacheResult<bool> {
        let connection = self.pool.acquire()?;
        let deleted = connection
            .with(|conn| conn.delete(key))?
            .map_err(store_error)?;

        self.cache.remove(key);
        Ok(deleted)
    }

    pub fn cache(&self) -> &Arc<LruCache> {
        &self.cache
    }

    pub fn pool(&self) -> &Arc<ConnectionPool<F>> {
        &self.pool
    }
}
