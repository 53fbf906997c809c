//! # 便利配置函数模块
//!
//! 提供常用后端存储配置的便利函数

use crate::error::QuickCacheError;
use crate::types::*;

/// 进程内存储配置
pub fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        db_type: DatabaseType::Memory,
        host: "localhost".to_string(),
        port: 0,
        username: String::new(),
        password: String::new(),
        database: "memory".to_string(),
    }
}

/// 创建MySQL数据库配置
///
/// # 参数
///
/// * `host` - 主机地址
/// * `port` - 端口号
/// * `database` - 数据库名
/// * `username` - 用户名
/// * `password` - 密码
pub fn mysql_config<S: Into<String>>(
    host: S,
    port: u16,
    database: S,
    username: S,
    password: S,
) -> Result<DatabaseConfig, QuickCacheError> {
    DatabaseConfig::builder()
        .db_type(DatabaseType::MySQL)
        .host(host)
        .port(port)
        .database(database)
        .username(username)
        .password(password)
        .build()
}
