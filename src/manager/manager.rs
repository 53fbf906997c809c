//! 缓存注册表核心定义

use dashmap::DashMap;
use rat_logger::{debug, info};
use std::sync::Arc;

use crate::cache::LruCache;
use crate::error::{QuickCacheError, QuickCacheResult};
use crate::types::CacheConfig;

/// 缓存注册表 - 别名到缓存实例的映射
#[derive(Debug, Default)]
pub struct CacheRegistry {
    /// 缓存映射 (别名 -> 缓存)
    pub(crate) caches: DashMap<String, Arc<LruCache>>,
}

impl CacheRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置创建并注册缓存
    ///
    /// 别名已存在时返回配置错误，已有缓存不会被替换。
    pub fn create_cache(&self, config: &CacheConfig) -> QuickCacheResult<Arc<LruCache>> {
        use dashmap::mapref::entry::Entry;

        match self.caches.entry(config.alias.clone()) {
            Entry::Occupied(_) => Err(crate::quick_error!(
                config,
                format!("缓存别名已存在: {}", config.alias)
            )),
            Entry::Vacant(slot) => {
                let cache = Arc::new(LruCache::new(config.capacity));
                slot.insert(Arc::clone(&cache));
                info!("注册缓存: 别名={}, 容量={}", config.alias, config.capacity);
                Ok(cache)
            }
        }
    }

    /// 获取指定别名的缓存
    pub fn get_cache(&self, alias: &str) -> QuickCacheResult<Arc<LruCache>> {
        self.caches
            .get(alias)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| QuickCacheError::NotFound {
                message: crate::i18n::tf("error.cache_alias_not_found", &[("alias", alias)]),
            })
    }

    /// 注销缓存，返回被注销的实例
    pub fn remove_cache(&self, alias: &str) -> Option<Arc<LruCache>> {
        let removed = self.caches.remove(alias).map(|(_, cache)| cache);
        if removed.is_some() {
            debug!("注销缓存: 别名={}", alias);
        }
        removed
    }

    /// 已注册的别名列表（按字典序）
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.caches.iter().map(|entry| entry.key().clone()).collect();
        aliases.sort();
        aliases
    }
}
