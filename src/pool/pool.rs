//! 连接池核心模块
//!
//! 每个调用线程最多持有一个连接，首次使用时惰性建立，之后按线程复用。
//! 连接数达到上限时按溢出策略处理：默认关闭并移除全部连接（全量重置），
//! 而不是挑一个空闲连接淘汰。

use parking_lot::Mutex;
use rat_logger::{debug, info, warn};
use std::collections::HashMap;
use std::thread::{self, ThreadId};

use super::types::{ConnectionFactory, PoolStats, PooledConnection};
use crate::error::{QuickCacheError, QuickCacheResult};
use crate::types::{OverflowPolicy, PoolConfig};

/// 锁内状态
struct PoolState<C> {
    connections: HashMap<ThreadId, PooledConnection<C>>,
    stats: PoolStats,
}

/// 按线程绑定的连接池
pub struct ConnectionPool<F: ConnectionFactory> {
    factory: F,
    config: PoolConfig,
    state: Mutex<PoolState<F::Connection>>,
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// 使用配置创建连接池
    pub fn new(factory: F, config: PoolConfig) -> QuickCacheResult<Self> {
        config.validate()?;
        info!(
            "创建连接池: 最大连接数={}, 溢出策略={:?}",
            config.max_connections, config.overflow_policy
        );

        let stats = PoolStats {
            max_connections: config.max_connections,
            ..Default::default()
        };
        Ok(Self {
            factory,
            config,
            state: Mutex::new(PoolState {
                connections: HashMap::new(),
                stats,
            }),
        })
    }

    /// 为当前线程获取连接
    pub fn acquire(&self) -> QuickCacheResult<PooledConnection<F::Connection>> {
        self.acquire_for(thread::current().id())
    }

    /// 为指定线程获取连接
    ///
    /// 已有连接直接返回；否则在必要时执行溢出策略，再建立新连接。
    /// 建立失败时不保存任何条目，也不重试。
    ///
    /// 溢出重置关闭旧连接失败时返回关闭错误；此时新连接已经保存，
    /// 再次获取会直接复用它。
    pub fn acquire_for(&self, owner: ThreadId) -> QuickCacheResult<PooledConnection<F::Connection>> {
        let mut drained = Vec::new();

        let result = {
            let mut state = self.state.lock();

            if let Some(existing) = state.connections.get(&owner).cloned() {
                state.stats.reused += 1;
                return Ok(existing);
            }

            if state.connections.len() >= self.config.max_connections {
                match self.config.overflow_policy {
                    OverflowPolicy::ResetAll => {
                        // 当前线程正在某个连接的闭包内，关闭它会自锁
                        if let Some(held) = Self::held_by_current_thread(&state) {
                            return Err(QuickCacheError::ConnectionInUse {
                                connection_id: held.id().to_string(),
                            });
                        }
                        drained.extend(state.connections.drain().map(|(_, handle)| handle));
                        state.stats.resets += 1;
                        state.stats.recycled += drained.len() as u64;
                        debug!("连接池达到上限，全量重置: 关闭连接数={}", drained.len());
                    }
                    OverflowPolicy::Reject => {
                        state.stats.rejected += 1;
                        return Err(QuickCacheError::PoolExhausted {
                            max_connections: self.config.max_connections,
                        });
                    }
                }
            }

            match self.factory.connect() {
                Ok(connection) => {
                    let handle = PooledConnection::new(connection, owner);
                    state.connections.insert(owner, handle.clone());
                    state.stats.created += 1;
                    state.stats.active = state.connections.len();
                    debug!("新建连接: id={}, 线程={:?}", handle.id(), owner);
                    Ok(handle)
                }
                Err(e) => {
                    state.stats.failed_opens += 1;
                    state.stats.active = state.connections.len();
                    Err(crate::quick_error!(connection, e))
                }
            }
        };

        // 旧连接在锁外关闭，关闭动作可能等待其它线程的在途操作
        self.close_handles(drained)?;
        result
    }

    /// 释放指定线程的连接，返回是否存在该连接
    ///
    /// 不存在时什么也不做。关闭失败时连接已从连接池移除，错误返回给调用方。
    pub fn release(&self, owner: ThreadId) -> QuickCacheResult<bool> {
        let removed = {
            let mut state = self.state.lock();
            if let Some(handle) = state.connections.get(&owner) {
                if handle.held_by_current_thread() {
                    return Err(QuickCacheError::ConnectionInUse {
                        connection_id: handle.id().to_string(),
                    });
                }
            }

            let removed = state.connections.remove(&owner);
            if removed.is_some() {
                state.stats.released += 1;
                state.stats.active = state.connections.len();
            }
            removed
        };

        match removed {
            Some(handle) => {
                debug!("释放连接: id={}, 线程={:?}", handle.id(), owner);
                self.close_handles(vec![handle])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 释放当前线程的连接
    pub fn release_current(&self) -> QuickCacheResult<bool> {
        self.release(thread::current().id())
    }

    /// 关闭并移除全部连接，返回移除的连接数
    ///
    /// 所有连接都会被尝试关闭，之后返回遇到的第一个关闭错误。
    pub fn reset(&self) -> QuickCacheResult<usize> {
        let drained: Vec<_> = {
            let mut state = self.state.lock();
            if let Some(held) = Self::held_by_current_thread(&state) {
                return Err(QuickCacheError::ConnectionInUse {
                    connection_id: held.id().to_string(),
                });
            }

            let drained: Vec<_> = state.connections.drain().map(|(_, handle)| handle).collect();
            state.stats.resets += 1;
            state.stats.recycled += drained.len() as u64;
            state.stats.active = 0;
            drained
        };
        let count = drained.len();
        self.close_handles(drained)?;
        Ok(count)
    }

    /// 关闭连接池中的全部连接
    ///
    /// 之后的 `acquire` 仍会惰性建立新连接。
    pub fn shutdown(&self) -> QuickCacheResult<usize> {
        let closed = self.reset()?;
        info!("连接池已关闭: 关闭连接数={}", closed);
        Ok(closed)
    }

    /// 当前连接数
    pub fn len(&self) -> usize {
        self.state.lock().connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定线程是否持有连接
    pub fn contains(&self, owner: ThreadId) -> bool {
        self.state.lock().connections.contains_key(&owner)
    }

    pub fn max_connections(&self) -> usize {
        self.config.max_connections
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// 获取统计信息
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            active: state.connections.len(),
            ..state.stats.clone()
        }
    }

    fn held_by_current_thread(
        state: &PoolState<F::Connection>,
    ) -> Option<&PooledConnection<F::Connection>> {
        state
            .connections
            .values()
            .find(|handle| handle.held_by_current_thread())
    }

    /// 逐个关闭连接，全部尝试之后返回第一个错误
    fn close_handles(&self, handles: Vec<PooledConnection<F::Connection>>) -> QuickCacheResult<()> {
        let mut first_error = None;
        let mut failures = 0;

        for handle in handles {
            if let Err(e) = handle.close() {
                warn!("关闭连接失败: id={}, 错误={}", handle.id(), e);
                failures += 1;
                first_error.get_or_insert(e);
            }
        }

        if failures > 0 {
            self.state.lock().stats.failed_closes += failures;
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<F: ConnectionFactory> Drop for ConnectionPool<F> {
    fn drop(&mut self) {
        let drained: Vec<_> = self
            .state
            .get_mut()
            .connections
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        if !drained.is_empty() {
            debug!("连接池销毁: 关闭连接数={}", drained.len());
        }
        // 销毁时无法返回错误，只记录日志
        let _ = self.close_handles(drained);
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for ConnectionPool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("active", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::BackingConnection;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFactory {
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
        refuse: AtomicBool,
        fail_close: Arc<AtomicBool>,
    }

    struct CountingConnection {
        serial: usize,
        closed: Arc<AtomicUsize>,
        fail_close: Arc<AtomicBool>,
    }

    impl BackingConnection for CountingConnection {
        fn close(&mut self) -> anyhow::Result<()> {
            if self.fail_close.load(Ordering::SeqCst) {
                anyhow::bail!("socket close failed");
            }
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl ConnectionFactory for CountingFactory {
        type Connection = CountingConnection;

        fn connect(&self) -> anyhow::Result<CountingConnection> {
            if self.refuse.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            Ok(CountingConnection {
                serial: self.opened.fetch_add(1, Ordering::SeqCst),
                closed: Arc::clone(&self.closed),
                fail_close: Arc::clone(&self.fail_close),
            })
        }
    }

    fn pool(max: usize, policy: OverflowPolicy) -> ConnectionPool<Arc<CountingFactory>> {
        let config = PoolConfig {
            max_connections: max,
            overflow_policy: policy,
        };
        ConnectionPool::new(Arc::new(CountingFactory::default()), config).unwrap()
    }

    fn thread_ids(n: usize) -> Vec<ThreadId> {
        (0..n)
            .map(|_| thread::spawn(|| thread::current().id()).join().unwrap())
            .collect()
    }

    #[test]
    fn test_same_thread_reuses_connection() {
        let pool = pool(2, OverflowPolicy::ResetAll);
        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();

        assert!(first.same_connection(&second));
        assert_eq!(first.id(), second.id());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().created, 1);
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let config = PoolConfig {
            max_connections: 0,
            overflow_policy: OverflowPolicy::ResetAll,
        };
        let result = ConnectionPool::new(CountingFactory::default(), config);
        assert!(matches!(result, Err(QuickCacheError::ConfigError { .. })));
    }

    #[test]
    fn test_overflow_resets_all_connections() {
        let pool = pool(2, OverflowPolicy::ResetAll);
        let ids = thread_ids(3);

        let first = pool.acquire_for(ids[0]).unwrap();
        pool.acquire_for(ids[1]).unwrap();
        assert_eq!(pool.len(), 2);

        pool.acquire_for(ids[2]).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(ids[2]));
        assert!(first.is_closed());
        assert!(matches!(
            first.with(|c| c.serial),
            Err(QuickCacheError::ConnectionClosed { .. })
        ));

        let renewed = pool.acquire_for(ids[0]).unwrap();
        assert!(!renewed.same_connection(&first));
        assert!(pool.len() <= 2);

        let stats = pool.stats();
        assert_eq!(stats.resets, 1);
        assert_eq!(stats.recycled, 2);
        assert_eq!(stats.created, 4);
    }

    #[test]
    fn test_reject_policy_keeps_existing() {
        let pool = pool(1, OverflowPolicy::Reject);
        let ids = thread_ids(2);

        let held = pool.acquire_for(ids[0]).unwrap();
        let refused = pool.acquire_for(ids[1]);

        assert!(matches!(
            refused,
            Err(QuickCacheError::PoolExhausted { max_connections: 1 })
        ));
        assert!(!held.is_closed());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().rejected, 1);
    }

    #[test]
    fn test_failed_open_stores_nothing() {
        let factory = Arc::new(CountingFactory::default());
        factory.refuse.store(true, Ordering::SeqCst);
        let pool = ConnectionPool::new(Arc::clone(&factory), PoolConfig::default()).unwrap();

        let result = pool.acquire();
        assert!(matches!(result, Err(QuickCacheError::ConnectionUnavailable { .. })));
        assert!(pool.is_empty());
        assert_eq!(pool.stats().failed_opens, 1);

        factory.refuse.store(false, Ordering::SeqCst);
        assert!(pool.acquire().is_ok());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_release_absent_is_noop() {
        let pool = pool(4, OverflowPolicy::ResetAll);
        let ids = thread_ids(2);
        let held = pool.acquire_for(ids[0]).unwrap();

        assert!(!pool.release(ids[1]).unwrap());
        assert!(pool.contains(ids[0]));
        assert!(!held.is_closed());

        assert!(pool.release(ids[0]).unwrap());
        assert!(held.is_closed());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_drop_closes_remaining() {
        let factory = Arc::new(CountingFactory::default());
        {
            let pool = ConnectionPool::new(Arc::clone(&factory), PoolConfig::default()).unwrap();
            for id in thread_ids(3) {
                pool.acquire_for(id).unwrap();
            }
        }
        assert_eq!(factory.closed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shutdown_then_lazy_recreate() {
        let pool = pool(4, OverflowPolicy::ResetAll);
        let before = pool.acquire().unwrap();

        assert_eq!(pool.shutdown().unwrap(), 1);
        assert!(before.is_closed());

        let after = pool.acquire().unwrap();
        assert!(!after.same_connection(&before));
        assert_eq!(after.with(|c| c.serial).unwrap(), 1);
    }

    #[test]
    fn test_release_reports_close_failure() {
        let factory = Arc::new(CountingFactory::default());
        let pool = ConnectionPool::new(Arc::clone(&factory), PoolConfig::default()).unwrap();
        let held = pool.acquire().unwrap();

        factory.fail_close.store(true, Ordering::SeqCst);
        let result = pool.release_current();

        assert!(matches!(result, Err(QuickCacheError::CloseFailed { .. })));
        // 连接已从连接池移除，句柄不可再用
        assert!(pool.is_empty());
        assert!(held.is_closed());
        assert_eq!(pool.stats().failed_closes, 1);
    }

    #[test]
    fn test_reset_closes_all_then_reports_error() {
        let factory = Arc::new(CountingFactory::default());
        let pool = ConnectionPool::new(Arc::clone(&factory), PoolConfig::default()).unwrap();
        for id in thread_ids(3) {
            pool.acquire_for(id).unwrap();
        }

        factory.fail_close.store(true, Ordering::SeqCst);
        assert!(matches!(pool.reset(), Err(QuickCacheError::CloseFailed { .. })));
        assert!(pool.is_empty());
        assert_eq!(pool.stats().failed_closes, 3);

        factory.fail_close.store(false, Ordering::SeqCst);
        assert_eq!(pool.shutdown().unwrap(), 0);
    }

    #[test]
    fn test_overflow_reports_close_failure_and_keeps_new_connection() {
        let factory = Arc::new(CountingFactory::default());
        let config = PoolConfig {
            max_connections: 1,
            overflow_policy: OverflowPolicy::ResetAll,
        };
        let pool = ConnectionPool::new(Arc::clone(&factory), config).unwrap();
        let ids = thread_ids(2);
        pool.acquire_for(ids[0]).unwrap();

        factory.fail_close.store(true, Ordering::SeqCst);
        let result = pool.acquire_for(ids[1]);
        assert!(matches!(result, Err(QuickCacheError::CloseFailed { .. })));
        assert!(pool.contains(ids[1]));

        let retried = pool.acquire_for(ids[1]).unwrap();
        assert_eq!(retried.with(|c| c.serial).unwrap(), 1);
        factory.fail_close.store(false, Ordering::SeqCst);
    }

    #[test]
    fn test_nested_with_on_same_connection_is_refused() {
        let pool = pool(2, OverflowPolicy::ResetAll);
        let outer = pool.acquire().unwrap();

        let nested = outer
            .with(|c| {
                let serial = c.serial;
                let inner = pool.acquire().unwrap();
                (serial, inner.with(|c2| c2.serial))
            })
            .unwrap();

        assert_eq!(nested.0, 0);
        assert!(matches!(nested.1, Err(QuickCacheError::ConnectionInUse { .. })));
        assert!(!outer.held_by_current_thread());
        // 闭包结束后可以正常使用
        assert_eq!(outer.with(|c| c.serial).unwrap(), 0);
    }

    #[test]
    fn test_release_and_reset_inside_closure_are_refused() {
        let pool = pool(2, OverflowPolicy::ResetAll);
        let handle = pool.acquire().unwrap();

        let (released, reset) = handle
            .with(|_| (pool.release_current(), pool.reset()))
            .unwrap();

        assert!(matches!(released, Err(QuickCacheError::ConnectionInUse { .. })));
        assert!(matches!(reset, Err(QuickCacheError::ConnectionInUse { .. })));
        assert!(!handle.is_closed());
        assert_eq!(pool.len(), 1);

        assert!(pool.release_current().unwrap());
        assert!(handle.is_closed());
    }

    #[test]
    fn test_overflow_inside_closure_is_refused() {
        let pool = pool(1, OverflowPolicy::ResetAll);
        let ids = thread_ids(1);
        let handle = pool.acquire().unwrap();

        let result = handle.with(|_| pool.acquire_for(ids[0]).map(|_| ())).unwrap();

        assert!(matches!(result, Err(QuickCacheError::ConnectionInUse { .. })));
        assert!(!handle.is_closed());
        assert!(!pool.contains(ids[0]));
    }
}
