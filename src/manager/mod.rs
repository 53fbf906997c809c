//! 缓存注册表模块
//!
//! 按别名管理多个LRU缓存实例。注册表本身是普通值，由组合根创建并以
//! `Arc` 传给各个处理器，不存在进程级的全局实例。

mod manager;
mod cache_ops;

// 重新导出主要类型
pub use manager::CacheRegistry;
