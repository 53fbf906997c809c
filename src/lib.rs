//! rat_quickcache - 线程安全的LRU缓存与按线程绑定的连接池
//!
//! 在关系型存储前面提供固定容量的LRU缓存，并为每个调用线程维护一个
//! 后端连接；连接数达到上限时按溢出策略整体回收。

use once_cell::sync::OnceCell;

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod pool;
pub mod manager;
pub mod adapter;
pub mod config;
pub mod cache;
pub mod i18n;

// 重新导出常用类型和函数
pub use error::{QuickCacheError, QuickCacheResult};
pub use types::*;
pub use pool::{BackingConnection, ConnectionFactory, ConnectionPool, PoolStats, PooledConnection};
pub use manager::CacheRegistry;
pub use adapter::{
    CachedKvStore, CachedMovieCatalog, KvConnection, MemoryBackend, MemoryConnection,
    MovieConnection,
};
pub use config::{
    CacheConfigBuilder, DatabaseConfigBuilder, GlobalConfig, GlobalConfigBuilder,
    PoolConfigBuilder, memory_config, mysql_config,
};
pub use cache::{CacheSnapshot, CacheStats, LruCache, MOVIE_LIST_KEY, PutOutcome, movie_cache_key};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// 初始化rat_quickcache库
///
/// 注册多语言错误消息并按环境变量选择语言，重复调用无副作用。
///
/// 注意：日志系统由调用者自行初始化，本库不会初始化日志
pub fn init() {
    INITIALIZED.get_or_init(|| {
        i18n::ErrorMessageI18n::init();
    });
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
