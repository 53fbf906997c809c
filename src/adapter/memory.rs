//! 进程内存储驱动
//!
//! 所有连接共享同一份数据。支持故障注入，便于验证连接池与缓存适配器
//! 在后端不可用时的行为。

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{KvConnection, MovieConnection};
use crate::pool::{BackingConnection, ConnectionFactory};
use crate::types::{Movie, NewMovie};

#[derive(Debug, Default)]
struct MemoryState {
    kv: HashMap<String, String>,
    movies: BTreeMap<i64, Movie>,
    last_movie_id: i64,
}

/// 共享的开关与计数器
#[derive(Debug, Default)]
struct MemoryControl {
    available: AtomicBool,
    failing_operations: AtomicBool,
    fail_next_connects: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// 进程内存储后端，同时是连接工厂
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<RwLock<MemoryState>>,
    control: Arc<MemoryControl>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let control = MemoryControl::default();
        control.available.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            control: Arc::new(control),
        }
    }

    /// 设置后端是否接受新连接
    pub fn set_available(&self, available: bool) {
        self.control.available.store(available, Ordering::SeqCst);
    }

    /// 让接下来的 `n` 次建立连接失败
    pub fn fail_next_connects(&self, n: usize) {
        self.control.fail_next_connects.store(n, Ordering::SeqCst);
    }

    /// 设置已建立的连接上的读写操作是否失败
    pub fn set_failing_operations(&self, failing: bool) {
        self.control.failing_operations.store(failing, Ordering::SeqCst);
    }

    /// 累计建立的连接数
    pub fn opened_connections(&self) -> usize {
        self.control.opened.load(Ordering::SeqCst)
    }

    /// 累计关闭的连接数
    pub fn closed_connections(&self) -> usize {
        self.control.closed.load(Ordering::SeqCst)
    }

    /// 直接读取键值，不经过连接（测试校验用）
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.state.read().kv.get(key).cloned()
    }

    /// 当前电影数量
    pub fn movie_count(&self) -> usize {
        self.state.read().movies.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFactory for MemoryBackend {
    type Connection = MemoryConnection;

    fn connect(&self) -> anyhow::Result<MemoryConnection> {
        if !self.control.available.load(Ordering::SeqCst) {
            anyhow::bail!("memory backend is unavailable");
        }

        let injected = self
            .control
            .fail_next_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            anyhow::bail!("injected connect failure");
        }

        let serial = self.control.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            serial,
            state: Arc::clone(&self.state),
            control: Arc::clone(&self.control),
        })
    }
}

/// 进程内存储连接
#[derive(Debug)]
pub struct MemoryConnection {
    serial: usize,
    state: Arc<RwLock<MemoryState>>,
    control: Arc<MemoryControl>,
}

impl MemoryConnection {
    /// 连接序号，从0开始按建立顺序递增
    pub fn serial(&self) -> usize {
        self.serial
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.control.failing_operations.load(Ordering::SeqCst) {
            anyhow::bail!("memory backend operation failed");
        }
        Ok(())
    }
}

impl BackingConnection for MemoryConnection {
    fn close(&mut self) -> anyhow::Result<()> {
        self.control.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl KvConnection for MemoryConnection {
    fn read(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.state.read().kv.get(key).cloned())
    }

    fn upsert(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.check()?;
        self.state.write().kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self.state.write().kv.remove(key).is_some())
    }
}

impl MovieConnection for MemoryConnection {
    fn add_movie(&mut self, movie: &NewMovie) -> anyhow::Result<i64> {
        self.check()?;
        let mut state = self.state.write();
        state.last_movie_id += 1;
        let id = state.last_movie_id;
        state.movies.insert(id, movie.clone().with_id(id));
        Ok(id)
    }

    fn list_movies(&mut self) -> anyhow::Result<Vec<Movie>> {
        self.check()?;
        Ok(self.state.read().movies.values().cloned().collect())
    }

    fn search_movie(&mut self, title: &str) -> anyhow::Result<Option<Movie>> {
        self.check()?;
        Ok(self
            .state
            .read()
            .movies
            .values()
            .find(|movie| movie.title.eq_ignore_ascii_case(title))
            .cloned())
    }

    fn update_rating(&mut self, id: i64, rating: f64) -> anyhow::Result<Option<Movie>> {
        self.check()?;
        let mut state = self.state.write();
        Ok(state.movies.get_mut(&id).map(|movie| {
            movie.rating = rating;
            movie.clone()
        }))
    }

    fn delete_movie(&mut self, id: i64) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.state.write().movies.remove(&id).map(|movie| movie.title))
    }
}
