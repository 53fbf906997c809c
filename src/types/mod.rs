//! 类型定义和配置
//!
//! 定义后端存储类型、连接池与缓存配置以及业务数据类型

pub mod database_config;
pub mod cache_config;
pub mod movie;

// 重新导出所有公共类型
pub use database_config::{DatabaseConfig, DatabaseType, OverflowPolicy, PoolConfig};
pub use cache_config::{CacheConfig, DEFAULT_CACHE_CAPACITY};
pub use movie::{Movie, NewMovie};
