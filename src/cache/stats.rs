//! 缓存统计模块
//!
//! 提供缓存性能统计和信息收集功能

use serde::{Deserialize, Serialize};

/// 缓存性能计数器
///
/// 与缓存结构位于同一把锁之内，因此计数与结构状态始终一致。
#[derive(Debug, Clone, Default)]
pub struct CachePerformanceStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 新键写入次数
    pub inserts: u64,
    /// 已存在键的覆盖次数
    pub updates: u64,
    /// 容量淘汰次数
    pub evictions: u64,
    /// 显式删除次数
    pub removals: u64,
    /// 容量为零时被拒绝的写入次数
    pub rejected: u64,
}

impl CachePerformanceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 缓存命中率
    pub hit_rate: f64,
    /// 新键写入次数
    pub inserts: u64,
    /// 覆盖写入次数
    pub updates: u64,
    /// 淘汰次数
    pub evictions: u64,
    /// 删除次数
    pub removals: u64,
    /// 当前缓存条目数
    pub entries: usize,
    /// 缓存容量
    pub capacity: usize,
}

impl CacheStats {
    /// 由计数器和当前规模生成快照
    pub(crate) fn from_counters(
        counters: &CachePerformanceStats,
        entries: usize,
        capacity: usize,
    ) -> Self {
        Self {
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: counters.hit_rate(),
            inserts: counters.inserts,
            updates: counters.updates,
            evictions: counters.evictions,
            removals: counters.removals,
            entries,
            capacity,
        }
    }
}
