//! 连接池模块
//!
//! 按调用线程绑定后端存储连接：每个线程最多一个连接，首次使用时建立，
//! 之后按线程复用；连接数达到上限时按溢出策略回收。

pub mod types;
pub mod pool;

// 重新导出主要的公共类型和结构体
pub use types::{BackingConnection, ConnectionFactory, PoolStats, PooledConnection};
pub use pool::ConnectionPool;
