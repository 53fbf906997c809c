//! # 配置管理模块 - 核心配置类型

use crate::error::QuickCacheError;
use crate::types::*;
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 全局配置
///
/// 一个后端存储、一个连接池以及若干按别名区分的缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// 后端存储配置
    pub database: DatabaseConfig,
    /// 连接池配置
    pub pool: PoolConfig,
    /// 缓存配置列表
    pub caches: Vec<CacheConfig>,
}

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

fn parse_error(format: ConfigFormat, message: String) -> QuickCacheError {
    QuickCacheError::ConfigError {
        message: crate::i18n::tf(
            "error.config_parse",
            &[("format", format.name()), ("message", message.as_str())],
        ),
    }
}

impl GlobalConfig {
    /// 创建全局配置构建器
    pub fn builder() -> super::builders::GlobalConfigBuilder {
        super::builders::GlobalConfigBuilder::new()
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), QuickCacheError> {
        self.pool.validate()?;

        if self.caches.is_empty() {
            return Err(crate::quick_error!(config, "至少需要配置一个缓存"));
        }

        let mut aliases = HashSet::new();
        for cache in &self.caches {
            if cache.alias.is_empty() {
                return Err(crate::quick_error!(config, "缓存别名不能为空"));
            }
            if !aliases.insert(cache.alias.as_str()) {
                return Err(crate::quick_error!(
                    config,
                    format!("缓存别名重复: {}", cache.alias)
                ));
            }
        }
        Ok(())
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self, QuickCacheError> {
        let config: GlobalConfig = toml::from_str(content)
            .map_err(|e| parse_error(ConfigFormat::Toml, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> Result<Self, QuickCacheError> {
        let config: GlobalConfig = serde_json::from_str(content)
            .map_err(|e| parse_error(ConfigFormat::Json, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载配置
    ///
    /// 扩展名为 `.toml` 时按TOML解析，其余按JSON解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, QuickCacheError> {
        let path = config_path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config = match ConfigFormat::from_path(path) {
            ConfigFormat::Toml => Self::from_toml_str(&content)?,
            ConfigFormat::Json => Self::from_json_str(&content)?,
        };

        info!("从文件加载配置: {:?}", path);
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> Result<(), QuickCacheError> {
        let path = config_path.as_ref();
        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| parse_error(format, e.to_string()))?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| parse_error(format, e.to_string()))?,
        };

        std::fs::write(path, content)?;

        info!("保存配置到文件: {:?}", path);
        Ok(())
    }

    /// 获取指定别名的缓存配置
    ///
    /// # 参数
    ///
    /// * `alias` - 缓存别名
    pub fn get_cache(&self, alias: &str) -> Result<&CacheConfig, QuickCacheError> {
        self.caches
            .iter()
            .find(|cache| cache.alias == alias)
            .ok_or_else(|| crate::quick_error!(config, format!("找不到缓存配置: {}", alias)))
    }
}
