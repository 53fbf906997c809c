//! 后端存储适配器模块
//!
//! 定义驱动需要实现的连接接口，以及在连接池和LRU缓存之上实现
//! 读穿/写穿语义的缓存适配器。

use crate::pool::BackingConnection;
use crate::types::{Movie, NewMovie};

mod cached;
mod cached_catalog;
pub mod memory;

pub use cached::CachedKvStore;
pub use cached_catalog::CachedMovieCatalog;
pub use memory::{MemoryBackend, MemoryConnection};

/// 键值存储连接接口
pub trait KvConnection: BackingConnection {
    /// 读取键对应的值
    fn read(&mut self, key: &str) -> anyhow::Result<Option<String>>;

    /// 插入或覆盖键值
    fn upsert(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    /// 删除键，返回是否有记录被删除
    fn delete(&mut self, key: &str) -> anyhow::Result<bool>;
}

/// 电影目录存储连接接口
pub trait MovieConnection: BackingConnection {
    /// 新增电影，返回存储分配的id
    fn add_movie(&mut self, movie: &NewMovie) -> anyhow::Result<i64>;

    /// 按id顺序列出全部电影
    fn list_movies(&mut self) -> anyhow::Result<Vec<Movie>>;

    /// 按标题查找电影，忽略ASCII大小写
    ///
    /// 与缓存键 `movie:<小写标题>` 的规则一致，缓存冷热不影响查找结果。
    fn search_movie(&mut self, title: &str) -> anyhow::Result<Option<Movie>>;

    /// 更新评分，返回更新后的记录；id不存在时返回 `None`
    fn update_rating(&mut self, id: i64, rating: f64) -> anyhow::Result<Option<Movie>>;

    /// 删除电影，返回被删除电影的标题；id不存在时返回 `None`
    fn delete_movie(&mut self, id: i64) -> anyhow::Result<Option<String>>;
}

/// 把驱动错误转换为存储错误
pub(crate) fn store_error(e: anyhow::Error) -> crate::error::QuickCacheError {
    crate::quick_error!(store, e)
}
