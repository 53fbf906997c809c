//! # 全局配置构建器模块
//!
//! 提供全局配置的构建器实现，支持链式调用和严格验证

use crate::config::core::GlobalConfig;
use crate::error::QuickCacheError;
use crate::types::*;
use rat_logger::info;

/// 全局配置构建器
///
/// 提供链式配置接口，支持流畅的API调用
#[derive(Debug, Default)]
pub struct GlobalConfigBuilder {
    database: Option<DatabaseConfig>,
    pool: Option<PoolConfig>,
    caches: Vec<CacheConfig>,
}

impl GlobalConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置后端存储配置
    ///
    /// # 参数
    ///
    /// * `config` - 数据库配置
    pub fn database(mut self, config: DatabaseConfig) -> Self {
        self.database = Some(config);
        self
    }

    /// 设置连接池配置
    ///
    /// # 参数
    ///
    /// * `config` - 连接池配置
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// 添加缓存配置
    ///
    /// # 参数
    ///
    /// * `config` - 缓存配置
    pub fn add_cache(mut self, config: CacheConfig) -> Self {
        self.caches.push(config);
        self
    }

    /// 构建全局配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，或缓存别名重复，将返回错误
    pub fn build(self) -> Result<GlobalConfig, QuickCacheError> {
        let database = self
            .database
            .ok_or_else(|| crate::quick_error!(config, "数据库配置必须设置"))?;

        let pool = self
            .pool
            .ok_or_else(|| crate::quick_error!(config, "连接池配置必须设置"))?;

        let config = GlobalConfig {
            database,
            pool,
            caches: self.caches,
        };
        config.validate()?;

        info!(
            "创建全局配置: 缓存数量={}, 最大连接数={}",
            config.caches.len(),
            config.pool.max_connections
        );
        Ok(config)
    }
}
