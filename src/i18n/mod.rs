//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

/// 插入一条三语翻译
fn entry(
    translations: &mut HashMap<String, HashMap<String, String>>,
    key: &str,
    zh: &str,
    en: &str,
    ja: &str,
) {
    let mut messages = HashMap::new();
    messages.insert("zh-CN".to_string(), zh.to_string());
    messages.insert("en-US".to_string(), en.to_string());
    messages.insert("ja-JP".to_string(), ja.to_string());
    translations.insert(key.to_string(), messages);
}

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // 后端存储连接错误
        entry(
            &mut translations,
            "error.connection",
            "无法建立后端存储连接: {message}",
            "Backing store connection unavailable: {message}",
            "バックエンドストアに接続できません: {message}",
        );

        // 句柄已被连接池关闭
        entry(
            &mut translations,
            "error.connection_closed",
            "连接 {connection_id} 已被连接池关闭",
            "Connection {connection_id} has been closed by the pool",
            "接続 {connection_id} はプールによって閉じられました",
        );

        // 同一线程嵌套使用连接
        entry(
            &mut translations,
            "error.connection_in_use",
            "连接 {connection_id} 正被当前线程使用，不能嵌套使用或关闭",
            "Connection {connection_id} is already in use by the current thread and cannot be nested or closed",
            "接続 {connection_id} は現在のスレッドで使用中のため、入れ子で使用したり閉じたりできません",
        );

        // 关闭连接失败
        entry(
            &mut translations,
            "error.connection_close",
            "关闭连接 {connection_id} 失败: {message}",
            "Failed to close connection {connection_id}: {message}",
            "接続 {connection_id} を閉じられませんでした: {message}",
        );

        // 连接池已满
        entry(
            &mut translations,
            "error.pool_exhausted",
            "连接池已满（上限 {max}），拒绝新连接",
            "Connection pool exhausted (limit {max}), new connection refused",
            "接続プールが上限 {max} に達したため新しい接続を拒否しました",
        );

        // 存储操作错误
        entry(
            &mut translations,
            "error.store",
            "后端存储操作失败: {message}",
            "Backing store operation failed: {message}",
            "バックエンドストア操作が失敗しました: {message}",
        );

        // 配置错误
        entry(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );

        // 记录不存在
        entry(
            &mut translations,
            "error.not_found",
            "记录不存在: {message}",
            "Record not found: {message}",
            "レコードが見つかりません: {message}",
        );

        // JSON序列化错误
        entry(
            &mut translations,
            "error.json",
            "JSON序列化失败: {message}",
            "JSON serialization failed: {message}",
            "JSONシリアライズが失敗しました: {message}",
        );

        // 配置文件解析错误
        entry(
            &mut translations,
            "error.config_parse",
            "解析配置文件失败: {format} - {message}",
            "Failed to parse {format} config file: {message}",
            "{format} 設定ファイルの解析に失敗しました: {message}",
        );

        // 缓存别名未找到
        entry(
            &mut translations,
            "error.cache_alias_not_found",
            "缓存别名 '{alias}' 未找到",
            "Cache alias '{alias}' not found",
            "キャッシュエイリアス '{alias}' が見つかりません",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
