//! 缓存键生成模块
//!
//! 同一份数据无论从哪个处理器写入或失效，都必须落在同一个键上，
//! 所以键只在这里生成。

/// 电影条目键前缀
pub const MOVIE_KEY_PREFIX: &str = "movie";

/// 电影列表聚合视图的缓存键
pub const MOVIE_LIST_KEY: &str = "list_movies";

/// 生成电影条目缓存键：`movie:<小写标题>`
///
/// 标题只做ASCII小写化，非ASCII字符原样保留。
pub fn movie_cache_key(title: &str) -> String {
    format!("{}:{}", MOVIE_KEY_PREFIX, title.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_key_is_case_insensitive() {
        assert_eq!(movie_cache_key("Inception"), "movie:inception");
        assert_eq!(movie_cache_key("INCEPTION"), movie_cache_key("inception"));
    }

    #[test]
    fn test_movie_key_keeps_non_ascii() {
        assert_eq!(movie_cache_key("Amélie"), "movie:amélie");
        assert_eq!(movie_cache_key("千と千尋"), "movie:千と千尋");
    }

    #[test]
    fn test_list_key_cannot_collide_with_movie_key() {
        assert!(!MOVIE_LIST_KEY.starts_with(&format!("{}:", MOVIE_KEY_PREFIX)));
    }
}
