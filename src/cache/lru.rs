//! LRU缓存模块
//!
//! 固定容量、线程安全的最近最少使用缓存。
//!
//! 最近使用顺序保存在一个稠密节点数组里（键 + 前后索引），另有一张
//! 键到 (值, 节点索引) 的哈希表。提升、插入、淘汰、删除都是 O(1)：
//! 删除节点时把数组末尾节点挪到空位并修正它的邻居，数组长度因此始终
//! 等于条目数。
//!
//! 淘汰在“达到容量”时触发：键不存在且条目数已等于容量时，先淘汰
//! 链表尾部，再插入新键，所以缓存最多只保留 `capacity` 个条目。

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::stats::{CachePerformanceStats, CacheStats};
use crate::debug_log;

/// 空链接
const NIL: usize = usize::MAX;

/// 最近使用链表节点
#[derive(Debug, Clone)]
struct LruNode<K> {
    key: K,
    /// 更近使用的一侧
    prev: usize,
    /// 更久未用的一侧
    next: usize,
}

/// 哈希表中的条目
#[derive(Debug, Clone)]
struct LruEntry<V> {
    value: V,
    node: usize,
}

/// 非线程安全的LRU核心结构，由 [`LruCache`] 在锁内驱动
#[derive(Debug)]
struct LruCore<K, V> {
    capacity: usize,
    map: HashMap<K, LruEntry<V>>,
    nodes: Vec<LruNode<K>>,
    /// 最近使用
    head: usize,
    /// 最久未用
    tail: usize,
    stats: CachePerformanceStats,
}

impl<K, V> LruCore<K, V>
where
    K: Hash + Eq + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            stats: CachePerformanceStats::new(),
        }
    }

    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = match self.map.get(key) {
            Some(entry) => entry.node,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };
        self.stats.hits += 1;
        self.move_to_head(node);
        self.map.get(key).map(|entry| &entry.value)
    }

    fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|entry| &entry.value)
    }

    /// 写入条目，返回因容量被淘汰的条目
    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
            let node = entry.node;
            self.move_to_head(node);
            self.stats.updates += 1;
            return PutOutcome::Updated;
        }

        if self.capacity == 0 {
            self.stats.rejected += 1;
            return PutOutcome::Rejected;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_tail()
        } else {
            None
        };
        if evicted.is_some() {
            self.stats.evictions += 1;
        }

        let node = self.nodes.len();
        self.nodes.push(LruNode {
            key: key.clone(),
            prev: NIL,
            next: NIL,
        });
        self.attach_head(node);
        self.map.insert(key, LruEntry { value, node });
        self.stats.inserts += 1;

        match evicted {
            Some((key, value)) => PutOutcome::Evicted(key, value),
            None => PutOutcome::Inserted,
        }
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.map.remove(key)?;
        self.release_node(entry.node);
        self.stats.removals += 1;
        Some(entry.value)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    /// 淘汰最久未用的条目
    fn pop_tail(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let key = self.release_node(self.tail);
        let entry = self.map.remove(&key)?;
        Some((key, entry.value))
    }

    fn move_to_head(&mut self, node: usize) {
        if self.head == node {
            return;
        }
        self.detach(node);
        self.attach_head(node);
    }

    fn detach(&mut self, node: usize) {
        let prev = self.nodes[node].prev;
        let next = self.nodes[node].next;

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[node].prev = NIL;
        self.nodes[node].next = NIL;
    }

    fn attach_head(&mut self, node: usize) {
        self.nodes[node].prev = NIL;
        self.nodes[node].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = node;
        }
        self.head = node;

        if self.tail == NIL {
            self.tail = node;
        }
    }

    /// 从链表和节点数组中摘除节点，返回节点上的键
    ///
    /// 末尾节点被挪到空出的槽位，它的邻居和哈希表索引随之修正。
    fn release_node(&mut self, node: usize) -> K {
        self.detach(node);

        let last = self.nodes.len() - 1;
        if node != last {
            self.nodes.swap(node, last);
            let prev = self.nodes[node].prev;
            let next = self.nodes[node].next;

            if prev != NIL {
                self.nodes[prev].next = node;
            } else {
                self.head = node;
            }
            if next != NIL {
                self.nodes[next].prev = node;
            } else {
                self.tail = node;
            }

            if let Some(entry) = self.map.get_mut(&self.nodes[node].key) {
                entry.node = node;
            }
        }

        // detach之后节点已经不在链表上，pop出来的就是它
        match self.nodes.pop() {
            Some(released) => released.key,
            None => unreachable!("release_node called on an empty arena"),
        }
    }

    fn snapshot(&self) -> CacheSnapshot<K> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut linked = true;
        let mut expected_prev = NIL;
        let mut cursor = self.head;

        while cursor != NIL {
            // 环或越界都视为损坏
            if order.len() > self.nodes.len() || cursor >= self.nodes.len() {
                linked = false;
                break;
            }
            let node = &self.nodes[cursor];
            let indexed = self
                .map
                .get(&node.key)
                .map(|entry| entry.node == cursor)
                .unwrap_or(false);
            if node.prev != expected_prev || !indexed {
                linked = false;
            }
            order.push(node.key.clone());
            expected_prev = cursor;
            cursor = node.next;
        }

        if expected_prev != self.tail {
            linked = false;
        }

        CacheSnapshot {
            recency_order: order,
            map_len: self.map.len(),
            arena_len: self.nodes.len(),
            capacity: self.capacity,
            linked,
        }
    }
}

/// 单次写入的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome<K, V> {
    /// 新键已插入，没有淘汰
    Inserted,
    /// 已存在的键被覆盖并提升为最近使用
    Updated,
    /// 新键已插入，并淘汰了原先最久未用的条目
    Evicted(K, V),
    /// 容量为零，写入被丢弃
    Rejected,
}

/// 在一次加锁内取得的缓存结构快照
#[derive(Debug, Clone)]
pub struct CacheSnapshot<K> {
    /// 从最近使用到最久未用的键
    pub recency_order: Vec<K>,
    /// 哈希表条目数
    pub map_len: usize,
    /// 节点数组长度
    pub arena_len: usize,
    /// 容量
    pub capacity: usize,
    linked: bool,
}

impl<K: Hash + Eq> CacheSnapshot<K> {
    /// 检查哈希表与最近使用链表是否描述同一组键，且未超出容量
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.recency_order.len());
        let unique = self.recency_order.iter().all(|key| seen.insert(key));

        self.linked
            && unique
            && self.recency_order.len() == self.map_len
            && self.arena_len == self.map_len
            && self.map_len <= self.capacity
    }
}

/// 线程安全的固定容量LRU缓存
///
/// 每个操作（包括 [`LruCache::len`]）都在同一把互斥锁内完成，对同一实例
/// 的其它调用来说是原子的。读取返回值的拷贝，不暴露内部引用。
pub struct LruCache<K = String, V = String> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone,
{
    /// 创建指定容量的缓存；容量为零的缓存不保留任何条目
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// 读取条目，命中时提升为最近使用
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    /// 读取条目但不改变最近使用顺序
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// 是否包含指定键（不改变最近使用顺序）
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).is_some()
    }

    /// 写入条目
    ///
    /// 返回被淘汰的 `(key, value)`；覆盖已存在的键不会触发淘汰。
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let outcome = self.inner.lock().put(key, value);
        match outcome {
            PutOutcome::Evicted(key, value) => {
                debug_log!("缓存淘汰: key={:?}", key);
                Some((key, value))
            }
            PutOutcome::Rejected => {
                debug_log!("缓存容量为零，丢弃写入");
                None
            }
            PutOutcome::Inserted | PutOutcome::Updated => None,
        }
    }

    /// 删除条目，返回被删除的值
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// 清空所有条目
    pub fn clear(&self) {
        let mut core = self.inner.lock();
        let dropped = core.map.len();
        core.clear();
        debug_log!("缓存已清空: 条目数={}", dropped);
    }

    /// 当前条目数
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// 当前条目数，与 [`LruCache::len`] 相同
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// 从最近使用到最久未用的键列表
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }

    /// 在一次加锁内取得结构快照
    pub fn snapshot(&self) -> CacheSnapshot<K> {
        self.inner.lock().snapshot()
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        let core = self.inner.lock();
        CacheStats::from_counters(&core.stats, core.map.len(), core.capacity)
    }

    /// 重置统计计数器，不影响缓存内容
    pub fn reset_stats(&self) {
        self.inner.lock().stats = CachePerformanceStats::new();
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("capacity", &core.capacity)
            .field("len", &core.map.len())
            .finish()
    }
}
