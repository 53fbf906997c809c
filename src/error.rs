//! 错误处理模块
//!
//! 定义缓存层与连接池统一使用的错误类型。缓存未命中不是错误，
//! 以 `None` 表示；这里只收录真正需要调用方决策的失败。

use thiserror::Error;

/// 缓存层错误类型
#[derive(Error, Debug)]
pub enum QuickCacheError {
    /// 无法建立后端存储连接
    #[error("{message}")]
    ConnectionUnavailable { message: String },

    /// 连接已被连接池关闭（释放或溢出重置之后继续使用旧句柄）
    #[error("{}", crate::i18n::tf("error.connection_closed", &[("connection_id", .connection_id.as_str())]))]
    ConnectionClosed { connection_id: String },

    /// 当前线程已在此连接的闭包内（嵌套使用或在闭包内关闭）
    #[error("{}", crate::i18n::tf("error.connection_in_use", &[("connection_id", .connection_id.as_str())]))]
    ConnectionInUse { connection_id: String },

    /// 关闭后端连接失败
    #[error("{message}")]
    CloseFailed { message: String },

    /// 连接池已满且溢出策略为拒绝
    #[error("{}", crate::i18n::tf("error.pool_exhausted", &[("max", .max_connections.to_string().as_str())]))]
    PoolExhausted { max_connections: usize },

    /// 后端存储操作失败
    #[error("{message}")]
    StoreError { message: String },

    /// 配置错误
    #[error("{message}")]
    ConfigError { message: String },

    /// 序列化错误
    #[error("{message}")]
    SerializationError { message: String },

    /// 目标记录不存在
    #[error("{message}")]
    NotFound { message: String },

    /// IO错误
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 缓存层结果类型
pub type QuickCacheResult<T> = Result<T, QuickCacheError>;

impl QuickCacheError {
    /// 是否为连接类错误（调用方通常据此返回“存储不可用”）
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            QuickCacheError::ConnectionUnavailable { .. }
                | QuickCacheError::ConnectionClosed { .. }
                | QuickCacheError::PoolExhausted { .. }
        )
    }
}

impl From<serde_json::Error> for QuickCacheError {
    fn from(e: serde_json::Error) -> Self {
        QuickCacheError::SerializationError {
            message: crate::i18n::tf("error.json", &[("message", e.to_string().as_str())]),
        }
    }
}

/// 快速构建常用错误
///
/// ```ignore
/// return Err(quick_error!(config, "最大连接数不能为零"));
/// ```
#[macro_export]
macro_rules! quick_error {
    (connection, $msg:expr) => {
        $crate::error::QuickCacheError::ConnectionUnavailable {
            message: $crate::i18n::tf("error.connection", &[("message", $msg.to_string().as_str())]),
        }
    };
    (store, $msg:expr) => {
        $crate::error::QuickCacheError::StoreError {
            message: $crate::i18n::tf("error.store", &[("message", $msg.to_string().as_str())]),
        }
    };
    (config, $msg:expr) => {
        $crate::error::QuickCacheError::ConfigError {
            message: $crate::i18n::tf("error.config", &[("message", $msg.to_string().as_str())]),
        }
    };
    (not_found, $msg:expr) => {
        $crate::error::QuickCacheError::NotFound {
            message: $crate::i18n::tf("error.not_found", &[("message", $msg.to_string().as_str())]),
        }
    };
}
