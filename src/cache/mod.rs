//! 缓存模块
//!
//! 提供线程安全的固定容量LRU缓存、统计信息以及缓存键生成规则。

pub mod lru;
pub mod stats;
pub mod key_generator;

// 重新导出主要的公共类型和结构体
pub use lru::{CacheSnapshot, LruCache, PutOutcome};
pub use stats::{CachePerformanceStats, CacheStats};
pub use key_generator::{movie_cache_key, MOVIE_KEY_PREFIX, MOVIE_LIST_KEY};
