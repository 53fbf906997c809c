//! 缓存统计与清理操作

use rat_logger::info;
use std::collections::HashMap;

use super::CacheRegistry;
use crate::cache::CacheStats;
use crate::error::QuickCacheResult;

impl CacheRegistry {
    /// 获取指定缓存的统计信息
    pub fn get_cache_stats(&self, alias: &str) -> QuickCacheResult<CacheStats> {
        Ok(self.get_cache(alias)?.stats())
    }

    /// 获取全部缓存的统计信息
    pub fn all_cache_stats(&self) -> HashMap<String, CacheStats> {
        self.caches
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect()
    }

    /// 清理指定缓存
    pub fn clear_cache(&self, alias: &str) -> QuickCacheResult<()> {
        self.get_cache(alias)?.clear();
        info!("已清理缓存 {}", alias);
        Ok(())
    }

    /// 清理全部缓存
    pub fn clear_all_caches(&self) {
        for entry in self.caches.iter() {
            entry.value().clear();
            info!("已清理缓存 {}", entry.key());
        }
    }
}
