//! # 数据库配置构建器模块
//!
//! 提供数据库配置的构建器实现，支持链式调用和严格验证

use crate::error::QuickCacheError;
use crate::types::*;
use rat_logger::info;

/// 数据库配置构建器
///
/// 严格要求所有配置项必须显式设置
#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    db_type: Option<DatabaseType>,
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

impl DatabaseConfig {
    /// 创建数据库配置构建器
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::new()
    }
}

impl DatabaseConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置数据库类型
    pub fn db_type(mut self, db_type: DatabaseType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    /// 设置主机地址
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置端口
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// 设置用户名
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// 设置密码
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// 设置数据库名
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// 构建数据库配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<DatabaseConfig, QuickCacheError> {
        let db_type = self
            .db_type
            .ok_or_else(|| crate::quick_error!(config, "数据库类型必须设置"))?;
        let host = self
            .host
            .ok_or_else(|| crate::quick_error!(config, "主机地址必须设置"))?;
        let port = self
            .port
            .ok_or_else(|| crate::quick_error!(config, "端口必须设置"))?;
        let username = self
            .username
            .ok_or_else(|| crate::quick_error!(config, "用户名必须设置"))?;
        let password = self
            .password
            .ok_or_else(|| crate::quick_error!(config, "密码必须设置"))?;
        let database = self
            .database
            .ok_or_else(|| crate::quick_error!(config, "数据库名必须设置"))?;

        info!("创建数据库配置: 类型={:?}, 主机={}:{}", db_type, host, port);

        Ok(DatabaseConfig {
            db_type,
            host,
            port,
            username,
            password,
            database,
        })
    }
}
