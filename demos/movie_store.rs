//! 电影目录缓存示例
//!
//! 使用进程内存储演示读穿/写穿缓存、按线程绑定的连接池，
//! 以及连接数超过上限时的整体重置。

use rat_logger::{LoggerBuilder, handler::term::TermConfig, info};
use rat_quickcache::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// 工作线程数，故意超过连接池上限以触发溢出重置
const WORKERS: usize = 6;

fn build_config() -> QuickCacheResult<GlobalConfig> {
    GlobalConfig::builder()
        .database(memory_config())
        .pool(
            PoolConfig::builder()
                .max_connections(4)
                .overflow_policy(OverflowPolicy::ResetAll)
                .build()?,
        )
        .add_cache(CacheConfig::builder().alias("movies").capacity(64).build()?)
        .add_cache(CacheConfig::builder().alias("kv").capacity(32).build()?)
        .build()
}

fn main() -> QuickCacheResult<()> {
    LoggerBuilder::new()
        .add_terminal_with_config(TermConfig::default())
        .init()
        .expect("日志初始化失败");

    rat_quickcache::init();
    println!("=== {} 电影目录缓存示例 ===", get_info());

    // 1. 配置
    println!("\n1. 构建配置...");
    let config = build_config()?;
    println!("后端存储: {}", config.database.db_type.as_str());
    println!("最大连接数: {}", config.pool.max_connections);

    // 2. 缓存注册表与连接池
    println!("\n2. 创建缓存与连接池...");
    let registry = Arc::new(CacheRegistry::new());
    for cache_config in &config.caches {
        registry.create_cache(cache_config)?;
    }
    let backend = MemoryBackend::new();
    let pool = Arc::new(ConnectionPool::new(backend.clone(), config.pool.clone())?);

    let catalog = Arc::new(CachedMovieCatalog::new(
        registry.get_cache("movies")?,
        Arc::clone(&pool),
    ));
    let kv = Arc::new(CachedKvStore::new(registry.get_cache("kv")?, Arc::clone(&pool)));

    // 3. 写入初始数据
    println!("\n3. 新增电影...");
    let seed = [
        ("Inception", "Sci-Fi", 2010, 8.8),
        ("Parasite", "Thriller", 2019, 8.5),
        ("Spirited Away", "Animation", 2001, 8.6),
    ];
    for (title, genre, release_year, rating) in seed {
        let movie = catalog.add_movie(NewMovie {
            title: title.to_string(),
            genre: genre.to_string(),
            release_year,
            rating,
        })?;
        println!("✅ id={} title={}", movie.id, movie.title);
    }

    // 4. 多线程读写
    println!("\n4. 启动 {} 个工作线程...", WORKERS);
    let start = Instant::now();
    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let catalog = Arc::clone(&catalog);
            let kv = Arc::clone(&kv);
            thread::spawn(move || -> QuickCacheResult<usize> {
                let mut found = 0;
                for round in 0..50 {
                    let key = format!("session:{}:{}", worker, round % 5);
                    kv.put(&key, &format!("round-{}", round))?;
                    if kv.get(&key)?.is_some() {
                        found += 1;
                    }
                    // 标题大小写不同，命中同一个缓存键
                    if catalog.search_movie("INCEPTION")?.is_some() {
                        found += 1;
                    }
                    catalog.list_movies()?;
                }
                Ok(found)
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(found)) => println!("线程 {} 完成，命中 {} 次", worker, found),
            // 其它线程触发重置后，旧句柄上的操作会得到 ConnectionClosed
            Ok(Err(e)) => println!("线程 {} 出错: {}", worker, e),
            Err(_) => println!("线程 {} 异常退出", worker),
        }
    }
    info!("工作线程全部结束，耗时 {:?}", start.elapsed());

    // 5. 更新与删除
    println!("\n5. 更新评分并删除电影...");
    let updated = catalog.update_rating(1, 9.0)?;
    println!("更新后: {} => {}", updated.title, updated.rating);
    let removed = catalog.delete_movie(2)?;
    println!("已删除: {}", removed);
    println!("当前列表: {}", catalog.list_movies()?);

    // 6. 统计
    println!("\n6. 统计信息");
    let mut aliases = registry.all_cache_stats().into_iter().collect::<Vec<_>>();
    aliases.sort_by(|a, b| a.0.cmp(&b.0));
    for (alias, stats) in aliases {
        println!(
            "缓存 {}: 条目={}/{} 命中率={:.2}% 淘汰={}",
            alias,
            stats.entries,
            stats.capacity,
            stats.hit_rate * 100.0,
            stats.evictions
        );
    }
    let pool_stats = pool.stats();
    println!(
        "连接池: 新建={} 复用={} 重置={} 回收={} 活动={}",
        pool_stats.created, pool_stats.reused, pool_stats.resets, pool_stats.recycled, pool_stats.active
    );
    println!(
        "后端: 打开={} 关闭={}",
        backend.opened_connections(),
        backend.closed_connections()
    );

    pool.shutdown()?;
    println!("\n=== 示例完成 ===");
    Ok(())
}
