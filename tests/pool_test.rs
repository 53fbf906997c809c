//! 连接池集成测试
//!
//! 使用真实线程的身份验证按线程绑定、溢出重置以及旧句柄失效。

use rat_quickcache::*;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, ThreadId};
use std::time::Duration;

fn pool(max_connections: usize, policy: OverflowPolicy) -> (MemoryBackend, Arc<ConnectionPool<MemoryBackend>>) {
    let backend = MemoryBackend::new();
    let config = PoolConfig::builder()
        .max_connections(max_connections)
        .overflow_policy(policy)
        .build()
        .unwrap();
    let pool = ConnectionPool::new(backend.clone(), config).unwrap();
    (backend, Arc::new(pool))
}

/// 在一个新线程里获取连接，返回线程身份和句柄
fn acquire_in_new_thread(
    pool: &Arc<ConnectionPool<MemoryBackend>>,
) -> (ThreadId, PooledConnection<MemoryConnection>) {
    let pool = Arc::clone(pool);
    thread::spawn(move || {
        let handle = pool.acquire().unwrap();
        (thread::current().id(), handle)
    })
    .join()
    .unwrap()
}

#[test]
fn test_same_thread_gets_same_handle() {
    let (backend, pool) = pool(4, OverflowPolicy::ResetAll);

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();

    assert!(first.same_connection(&second));
    assert_eq!(first.owner(), thread::current().id());
    assert_eq!(pool.len(), 1);
    assert_eq!(backend.opened_connections(), 1);
    assert_eq!(pool.stats().reused, 1);
}

#[test]
fn test_max_plus_one_threads_trigger_reset() {
    let max = 3;
    let (backend, pool) = pool(max, OverflowPolicy::ResetAll);

    let mut earlier = Vec::new();
    for _ in 0..max {
        earlier.push(acquire_in_new_thread(&pool));
    }
    assert_eq!(pool.len(), max);

    let (newest_id, newest) = acquire_in_new_thread(&pool);
    assert!(pool.len() <= max);
    assert_eq!(pool.len(), 1);
    assert!(pool.contains(newest_id));
    assert_eq!(backend.closed_connections(), max);

    // 旧句柄全部失效
    for (owner, handle) in &earlier {
        assert!(!pool.contains(*owner));
        let result = handle.with(|conn| conn.read("anything"));
        assert!(matches!(result, Err(QuickCacheError::ConnectionClosed { .. })));
    }
    assert!(newest.with(|conn| conn.read("anything")).unwrap().is_ok());

    // 之前活跃的身份再次获取时得到新连接
    let (first_id, first_handle) = &earlier[0];
    let fresh = pool.acquire_for(*first_id).unwrap();
    assert!(!fresh.same_connection(first_handle));
    assert!(!fresh.is_closed());
    assert_eq!(pool.len(), 2);

    let stats = pool.stats();
    assert_eq!(stats.resets, 1);
    assert_eq!(stats.recycled, max as u64);
    assert_eq!(stats.created, max as u64 + 2);
}

#[test]
fn test_reject_policy_across_threads() {
    let (_backend, pool) = pool(2, OverflowPolicy::Reject);

    let (a, _) = acquire_in_new_thread(&pool);
    let (b, _) = acquire_in_new_thread(&pool);

    let pool_for_third = Arc::clone(&pool);
    let third = thread::spawn(move || pool_for_third.acquire())
        .join()
        .unwrap();
    assert!(matches!(
        third,
        Err(QuickCacheError::PoolExhausted { max_connections: 2 })
    ));
    assert!(pool.contains(a));
    assert!(pool.contains(b));
    assert_eq!(pool.stats().rejected, 1);
}

#[test]
fn test_release_only_affects_one_identity() {
    let (_backend, pool) = pool(4, OverflowPolicy::ResetAll);

    let (a, handle_a) = acquire_in_new_thread(&pool);
    let (b, handle_b) = acquire_in_new_thread(&pool);

    assert!(pool.release(a).unwrap());
    assert!(!pool.release(a).unwrap());
    assert!(handle_a.is_closed());
    assert!(!handle_b.is_closed());
    assert!(pool.contains(b));
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_release_absent_identity_is_noop() {
    let (backend, pool) = pool(4, OverflowPolicy::ResetAll);
    let (other, _) = thread::spawn(|| (thread::current().id(), ()))
        .join()
        .unwrap();

    pool.acquire().unwrap();
    assert!(!pool.release(other).unwrap());
    assert_eq!(pool.len(), 1);
    assert_eq!(backend.closed_connections(), 0);
}

#[test]
fn test_unavailable_backend_is_not_retried() {
    let (backend, pool) = pool(4, OverflowPolicy::ResetAll);
    backend.set_available(false);

    let result = pool.acquire();
    assert!(matches!(result, Err(QuickCacheError::ConnectionUnavailable { .. })));
    assert!(pool.is_empty());
    assert_eq!(pool.stats().failed_opens, 1);

    backend.set_available(true);
    assert!(pool.acquire().is_ok());
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_many_threads_never_exceed_limit() {
    let max = 4;
    let (_backend, pool) = pool(max, OverflowPolicy::ResetAll);

    let workers: Vec<_> = (0..16)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..20 {
                    if let Ok(handle) = pool.acquire() {
                        // 其它线程可能已经触发了重置
                        let _ = handle.with(|conn| conn.upsert("shared", "value"));
                    }
                    assert!(pool.len() <= max);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(pool.len() <= max);
    let stats = pool.stats();
    assert!(stats.resets > 0);
    assert_eq!(stats.active, pool.len());
}

#[test]
fn test_overflow_reset_waits_for_running_closure() {
    let (backend, pool) = pool(1, OverflowPolicy::ResetAll);
    let (entered_tx, entered_rx) = mpsc::channel();
    let (proceed_tx, proceed_rx) = mpsc::channel::<()>();

    // 线程A在闭包内等待放行
    let worker = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let handle = pool.acquire().unwrap();
            let written = handle
                .with(|conn| {
                    entered_tx.send(()).unwrap();
                    proceed_rx.recv().unwrap();
                    conn.upsert("in-flight", "done")
                })
                .unwrap();
            (handle, written)
        })
    };
    entered_rx.recv().unwrap();

    // 线程B触发溢出重置，关闭A的连接时必须等待
    let overflow = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.acquire().map(|handle| handle.id().to_string()))
    };
    thread::sleep(Duration::from_millis(100));
    assert_eq!(backend.closed_connections(), 0);
    assert!(!overflow.is_finished());

    proceed_tx.send(()).unwrap();
    let (stale, written) = worker.join().unwrap();
    assert!(written.is_ok());
    assert_eq!(backend.raw_value("in-flight"), Some("done".to_string()));

    let new_id = overflow.join().unwrap().unwrap();
    assert_ne!(new_id, stale.id());
    assert_eq!(backend.closed_connections(), 1);
    assert!(stale.is_closed());
    assert!(matches!(
        stale.with(|conn| conn.read("in-flight")),
        Err(QuickCacheError::ConnectionClosed { .. })
    ));
}

#[test]
fn test_nested_acquire_on_same_thread_does_not_block() {
    let (_backend, pool) = pool(2, OverflowPolicy::ResetAll);
    let (done_tx, done_rx) = mpsc::channel();

    {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let outer = pool.acquire().unwrap();
            let nested = outer
                .with(|conn| {
                    conn.upsert("a", "1").unwrap();
                    pool.acquire().unwrap().with(|inner| inner.read("a"))
                })
                .unwrap();
            let after = outer.with(|conn| conn.read("a")).unwrap();
            done_tx.send((nested.map(|_| ()), after)).unwrap();
        });
    }

    let (nested, after) = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("嵌套使用连接时线程被阻塞");
    assert!(matches!(nested, Err(QuickCacheError::ConnectionInUse { .. })));
    assert_eq!(after.unwrap(), Some("1".to_string()));
}

#[test]
fn test_release_failure_is_reported() {
    struct FlakyConnection;

    impl BackingConnection for FlakyConnection {
        fn close(&mut self) -> anyhow::Result<()> {
            anyhow::bail!("socket close failed")
        }
    }

    struct FlakyFactory;

    impl ConnectionFactory for FlakyFactory {
        type Connection = FlakyConnection;

        fn connect(&self) -> anyhow::Result<FlakyConnection> {
            Ok(FlakyConnection)
        }
    }

    let pool = ConnectionPool::new(FlakyFactory, PoolConfig::default()).unwrap();
    pool.acquire().unwrap();

    let result = pool.release_current();
    assert!(matches!(result, Err(QuickCacheError::CloseFailed { .. })));
    assert!(pool.is_empty());
    assert_eq!(pool.stats().failed_closes, 1);
}
