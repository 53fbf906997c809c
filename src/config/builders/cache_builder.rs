//! # 缓存配置构建器模块

use crate::error::QuickCacheError;
use crate::types::*;
use rat_logger::info;

/// 缓存配置构建器
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    alias: Option<String>,
    capacity: Option<usize>,
}

impl CacheConfig {
    /// 创建缓存配置构建器
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }
}

impl CacheConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置缓存别名
    pub fn alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 设置缓存容量（条目数）
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// 构建缓存配置
    ///
    /// 容量允许为零，此时缓存不保留任何条目
    pub fn build(self) -> Result<CacheConfig, QuickCacheError> {
        let alias = self
            .alias
            .ok_or_else(|| crate::quick_error!(config, "缓存别名必须设置"))?;
        if alias.is_empty() {
            return Err(crate::quick_error!(config, "缓存别名不能为空"));
        }

        let capacity = self
            .capacity
            .ok_or_else(|| crate::quick_error!(config, "缓存容量必须设置"))?;

        info!("创建缓存配置: 别名={}, 容量={}", alias, capacity);
        Ok(CacheConfig { alias, capacity })
    }
}
