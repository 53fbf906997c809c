//! 带缓存的电影目录适配器
//!
//! 单部电影缓存在 `movie:<小写标题>` 下，全部电影的列表缓存在
//! `list_movies` 下。任何写操作成功后都会让列表失效。

use rat_logger::debug;
use std::sync::Arc;

use super::{MovieConnection, store_error};
use crate::cache::{LruCache, MOVIE_LIST_KEY, movie_cache_key};
use crate::error::QuickCacheResult;
use crate::pool::{ConnectionFactory, ConnectionPool};
use crate::types::{Movie, NewMovie};

/// 带缓存的电影目录
pub struct CachedMovieCatalog<F>
where
    F: ConnectionFactory,
    F::Connection: MovieConnection,
{
    cache: Arc<LruCache>,
    pool: Arc<ConnectionPool<F>>,
}

impl<F> CachedMovieCatalog<F>
where
    F: ConnectionFactory,
    F::Connection: MovieConnection,
{
    pub fn new(cache: Arc<LruCache>, pool: Arc<ConnectionPool<F>>) -> Self {
        Self { cache, pool }
    }

    /// 新增电影并缓存
    pub fn add_movie(&self, movie: NewMovie) -> QuickCacheResult<Movie> {
        let connection = self.pool.acquire()?;
        let id = connection
            .with(|conn| conn.add_movie(&movie))?
            .map_err(store_error)?;

        let movie = movie.with_id(id);
        self.cache
            .put(movie_cache_key(&movie.title), serde_json::to_string(&movie)?);
        self.cache.remove(MOVIE_LIST_KEY);
        debug!("新增电影: id={}, title={}", movie.id, movie.title);
        Ok(movie)
    }

    /// 列出全部电影，返回JSON数组
    pub fn list_movies(&self) -> QuickCacheResult<String> {
        if let Some(cached) = self.cache.get(MOVIE_LIST_KEY) {
            return Ok(cached);
        }

        let connection = self.pool.acquire()?;
        let movies = connection
            .with(|conn| conn.list_movies())?
            .map_err(store_error)?;

        let payload = serde_json::to_string(&movies)?;
        self.cache.put(MOVIE_LIST_KEY.to_string(), payload.clone());
        Ok(payload)
    }

    /// 按标题查找电影，返回JSON对象
    ///
    /// 缓存键与存储查找都忽略ASCII大小写，缓存未命中与命中时结果相同。
    pub fn search_movie(&self, title: &str) -> QuickCacheResult<Option<String>> {
        let key = movie_cache_key(title);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(cached));
        }

        let connection = self.pool.acquire()?;
        let found = connection
            .with(|conn| conn.search_movie(title))?
            .map_err(store_error)?;

        match found {
            Some(movie) => {
                let payload = serde_json::to_string(&movie)?;
                self.cache.put(key, payload.clone());
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }

    /// 更新评分，刷新该电影的缓存并使列表失效
    pub fn update_rating(&self, id: i64, rating: f64) -> QuickCacheResult<Movie> {
        let connection = self.pool.acquire()?;
        let updated = connection
            .with(|conn| conn.update_rating(id, rating))?
            .map_err(store_error)?;

        let movie = updated.ok_or_else(|| crate::quick_error!(not_found, format!("movie id={}", id)))?;
        self.cache
            .put(movie_cache_key(&movie.title), serde_json::to_string(&movie)?);
        self.cache.remove(MOVIE_LIST_KEY);
        Ok(movie)
    }

    /// 删除电影，使该电影与列表的缓存失效，返回被删除电影的标题
    pub fn delete_movie(&self, id: i64) -> QuickCacheResult<String> {
        let connection = self.pool.acquire()?;
        let deleted = connection
            .with(|conn| conn.delete_movie(id))?
            .map_err(store_error)?;

        let title = deleted.ok_or_else(|| crate::quick_error!(not_found, format!("movie id={}", id)))?;
        self.cache.remove(&movie_cache_key(&title));
        self.cache.remove(MOVIE_LIST_KEY);
        Ok(title)
    }

    pub fn cache(&self) -> &Arc<LruCache> {
        &self.cache
    }
}
