use chrono::Utc;

/// 根据标题生成 slug，并追加毫秒时间戳保证唯一。
///
/// 规则：
/// - 转为小写
/// - 去掉除 ASCII 字母数字、空白和 `-` 以外的字符
/// - 连续空白折叠为单个 `-`
/// - 追加 `-{millis}`
///
/// 处理后为空的标题使用 `post` 作为前缀。
pub fn slugify(title: &str, millis: i64) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let base = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    let base = if base.is_empty() { "post" } else { base.as_str() };

    format!("{base}-{millis}")
}

/// 使用当前时间生成 slug
pub fn new_slug(title: &str) -> String {
    slugify(title, Utc::now().timestamp_millis())
}
