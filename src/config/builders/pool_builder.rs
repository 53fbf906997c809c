//! # 连接池配置构建器模块
//!
//! 提供连接池配置的构建器实现，支持链式调用和严格验证

use crate::error::QuickCacheError;
use crate::types::*;
use rat_logger::info;

/// 连接池配置构建器
///
/// 严格要求所有配置项必须显式设置
#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    max_connections: Option<usize>,
    overflow_policy: Option<OverflowPolicy>,
}

impl PoolConfig {
    /// 创建连接池配置构建器
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }
}

impl PoolConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置最大连接数
    ///
    /// # 参数
    ///
    /// * `max_connections` - 最大连接数
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// 设置溢出策略
    ///
    /// # 参数
    ///
    /// * `policy` - 连接数达到上限时的处理方式
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = Some(policy);
        self
    }

    /// 构建连接池配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置或最大连接数为零，将返回错误
    pub fn build(self) -> Result<PoolConfig, QuickCacheError> {
        let max_connections = self.max_connections.ok_or_else(|| {
            crate::quick_error!(config, "最大连接数必须设置")
        })?;

        let overflow_policy = self.overflow_policy.ok_or_else(|| {
            crate::quick_error!(config, "溢出策略必须设置")
        })?;

        let config = PoolConfig {
            max_connections,
            overflow_policy,
        };
        config.validate()?;

        info!(
            "创建连接池配置: 最大连接数={}, 溢出策略={:?}",
            max_connections, overflow_policy
        );
        Ok(config)
    }
}
