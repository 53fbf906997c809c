use serde::{Deserialize, Serialize};

/// 默认缓存容量
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// 缓存配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 缓存别名
    #[serde(default = "default_cache_alias")]
    pub alias: String,
    /// 最大容量（条目数），为零时缓存不保留任何条目
    pub capacity: usize,
}

/// 默认缓存别名
fn default_cache_alias() -> String {
    "default".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            alias: default_cache_alias(),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
