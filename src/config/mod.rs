//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 构建器要求所有配置项显式设置

pub mod builders;
pub mod convenience;
pub mod core;

// 重新导出所有公共类型
pub use builders::{
    CacheConfigBuilder, DatabaseConfigBuilder, GlobalConfigBuilder, PoolConfigBuilder,
};
pub use convenience::{memory_config, mysql_config};
pub use core::GlobalConfig;
