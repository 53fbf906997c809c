//! 连接池类型定义模块

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{QuickCacheError, QuickCacheResult};

/// 后端存储连接
///
/// 由驱动实现。连接只会被一个线程使用，因此只要求 `Send`。
pub trait BackingConnection: Send + 'static {
    /// 关闭连接，释放底层资源
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 后端存储连接工厂
///
/// 建立连接失败时返回驱动自己的错误，连接池会把它转换为
/// `ConnectionUnavailable`，不做重试。
pub trait ConnectionFactory: Send + Sync {
    /// 连接类型
    type Connection: BackingConnection;

    /// 建立一个新连接
    fn connect(&self) -> anyhow::Result<Self::Connection>;
}

impl<F: ConnectionFactory + ?Sized> ConnectionFactory for Arc<F> {
    type Connection = F::Connection;

    fn connect(&self) -> anyhow::Result<Self::Connection> {
        (**self).connect()
    }
}

/// 连接槽位，连接池与调用线程共享
struct ConnectionSlot<C> {
    /// 连接ID
    id: String,
    /// 所属线程
    owner: ThreadId,
    /// 创建时间
    created_at: Instant,
    /// 底层连接，关闭后为 `None`
    connection: Mutex<Option<C>>,
    /// 正在执行闭包的线程
    holder: Mutex<Option<ThreadId>>,
}

/// 闭包结束（包括panic）时清除持有线程
struct HolderGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for HolderGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

/// 池化连接句柄
///
/// 克隆句柄不会复制连接。连接池关闭槽位（释放、溢出重置、关闭连接池）
/// 之后，任何句柄上的 [`PooledConnection::with`] 都返回
/// `ConnectionClosed`。关闭操作会等待正在执行的闭包结束。
///
/// `with` 不可重入：同一线程在闭包内再次对同一连接调用 `with`
/// 会得到 `ConnectionInUse`，而不是阻塞。
pub struct PooledConnection<C> {
    slot: Arc<ConnectionSlot<C>>,
}

impl<C> Clone for PooledConnection<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C: BackingConnection> PooledConnection<C> {
    pub(crate) fn new(connection: C, owner: ThreadId) -> Self {
        Self {
            slot: Arc::new(ConnectionSlot {
                id: Uuid::new_v4().to_string(),
                owner,
                created_at: Instant::now(),
                connection: Mutex::new(Some(connection)),
                holder: Mutex::new(None),
            }),
        }
    }

    /// 在连接上执行操作
    ///
    /// 执行期间独占连接；其它线程的 `with` 与连接池的关闭操作会等待。
    pub fn with<R, F>(&self, f: F) -> QuickCacheResult<R>
    where
        F: FnOnce(&mut C) -> R,
    {
        let current = thread::current().id();
        if self.held_by(current) {
            return Err(self.in_use_error());
        }

        let mut guard = self.slot.connection.lock();
        let connection = match guard.as_mut() {
            Some(connection) => connection,
            None => {
                return Err(QuickCacheError::ConnectionClosed {
                    connection_id: self.slot.id.clone(),
                });
            }
        };

        *self.slot.holder.lock() = Some(current);
        let _holding = HolderGuard(&self.slot.holder);
        Ok(f(connection))
    }

    /// 关闭底层连接，返回此前是否处于打开状态
    ///
    /// 当前线程正在此连接的闭包内时返回 `ConnectionInUse`，连接保持打开。
    pub(crate) fn close(&self) -> QuickCacheResult<bool> {
        if self.held_by_current_thread() {
            return Err(self.in_use_error());
        }

        let taken = self.slot.connection.lock().take();
        match taken {
            Some(mut connection) => {
                connection.close().map_err(|e| QuickCacheError::CloseFailed {
                    message: crate::i18n::tf(
                        "error.connection_close",
                        &[
                            ("connection_id", self.slot.id.as_str()),
                            ("message", e.to_string().as_str()),
                        ],
                    ),
                })?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn in_use_error(&self) -> QuickCacheError {
        QuickCacheError::ConnectionInUse {
            connection_id: self.slot.id.clone(),
        }
    }
}

impl<C> PooledConnection<C> {
    /// 连接ID
    pub fn id(&self) -> &str {
        &self.slot.id
    }

    /// 所属线程
    pub fn owner(&self) -> ThreadId {
        self.slot.owner
    }

    /// 创建时间
    pub fn created_at(&self) -> Instant {
        self.slot.created_at
    }

    /// 连接是否已被关闭
    ///
    /// 其它线程正在使用该连接时会等待其闭包结束。
    pub fn is_closed(&self) -> bool {
        // 在自己的闭包内，连接必然是打开的
        if self.held_by_current_thread() {
            return false;
        }
        self.slot.connection.lock().is_none()
    }

    /// 当前线程是否正在此连接的 `with` 闭包内
    pub fn held_by_current_thread(&self) -> bool {
        self.held_by(thread::current().id())
    }

    fn held_by(&self, thread_id: ThreadId) -> bool {
        *self.slot.holder.lock() == Some(thread_id)
    }

    /// 两个句柄是否指向同一个连接
    pub fn same_connection(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<C> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.slot.id)
            .field("owner", &self.slot.owner)
            .field("created_at", &self.slot.created_at)
            .finish()
    }
}

/// 连接池计数器
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// 新建连接数
    pub created: u64,
    /// 复用已有连接次数
    pub reused: u64,
    /// 按线程显式释放的连接数
    pub released: u64,
    /// 全量重置次数（溢出触发或显式调用）
    pub resets: u64,
    /// 因重置或关闭连接池而关闭的连接数
    pub recycled: u64,
    /// 拒绝策略下被拒绝的请求数
    pub rejected: u64,
    /// 建立连接失败次数
    pub failed_opens: u64,
    /// 关闭连接失败次数
    pub failed_closes: u64,
    /// 当前活动连接数
    pub active: usize,
    /// 最大连接数
    pub max_connections: usize,
}
