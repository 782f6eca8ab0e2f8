use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::PostSummary;

/// 搜索词的最小字符数
pub const MIN_TERM_CHARS: usize = 2;
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Post,
    Quiz,
    Tool,
}

/// 搜索来源筛选
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    #[default]
    All,
    Posts,
    Quizzes,
    Tools,
}

impl SearchCategory {
    pub fn includes(self, kind: HitKind) -> bool {
        matches!(
            (self, kind),
            (SearchCategory::All, _)
                | (SearchCategory::Posts, HitKind::Post)
                | (SearchCategory::Quizzes, HitKind::Quiz)
                | (SearchCategory::Tools, HitKind::Tool)
        )
    }
}

/// 统一的搜索结果
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HitKind,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<PostSummary> for SearchHit {
    fn from(post: PostSummary) -> Self {
        Self {
            id: post.id.to_string(),
            kind: HitKind::Post,
            url: format!("/blog/{}", post.slug),
            title: post.title,
            description: post.excerpt.unwrap_or_default(),
            category: post.category,
            created_at: Some(post.created_at),
        }
    }
}

/// 去除首尾空白，不足 [`MIN_TERM_CHARS`] 个字符时返回 `None`
pub fn normalize_term(raw: &str) -> Option<&str> {
    let term = raw.trim();
    (term.chars().count() >= MIN_TERM_CHARS).then_some(term)
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// 转义 LIKE 通配符，返回 `%term%`
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// 排序：标题包含搜索词优先，其次按时间倒序（无时间的排后），最后按标题字典序
pub fn rank(hits: &mut [SearchHit], term: &str) {
    let term = term.to_lowercase();
    hits.sort_by(|a, b| {
        let a_title = a.title.to_lowercase();
        let b_title = b.title.to_lowercase();
        b_title
            .contains(&term)
            .cmp(&a_title.contains(&term))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a_title.cmp(&b_title))
    });
}

/// 由命中结果的标题和常用词生成搜索建议，忽略大小写去重，最多 [`MAX_SUGGESTIONS`] 条
pub fn suggestions(hits: &[SearchHit], common_terms: &[String], term: &str) -> Vec<String> {
    let term = term.to_lowercase();
    let mut seen = HashSet::new();

    hits.iter()
        .map(|h| h.title.as_str())
        .chain(
            common_terms
                .iter()
                .map(String::as_str)
                .filter(|t| t.to_lowercase().contains(&term)),
        )
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, kind: HitKind, ts: Option<i64>) -> SearchHit {
        SearchHit {
            id: title.to_string(),
            kind,
            title: title.to_string(),
            description: String::new(),
            url: String::new(),
            category: None,
            created_at: ts.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
        }
    }

    #[test]
    fn test_normalize_term_requires_two_chars() {
        assert_eq!(normalize_term("a"), None);
        assert_eq!(normalize_term("  a "), None);
        assert_eq!(normalize_term(""), None);
        assert_eq!(normalize_term(" ab "), Some("ab"));
        assert_eq!(normalize_term("日本"), Some("日本"));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("rust"), "%rust%");
    }

    #[test]
    fn test_rank_prefers_title_matches_then_recency_then_title() {
        let mut hits = vec![
            hit("Unrelated old", HitKind::Post, Some(100)),
            hit("Rust tool", HitKind::Tool, None),
            hit("Rust story", HitKind::Post, Some(200)),
            hit("Another rust story", HitKind::Post, Some(200)),
            hit("Unrelated new", HitKind::Post, Some(300)),
        ];

        rank(&mut hits, "RUST");

        let titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Another rust story",
                "Rust story",
                "Rust tool",
                "Unrelated new",
                "Unrelated old",
            ]
        );
    }

    #[test]
    fn test_suggestions_dedup_and_cap() {
        let hits = vec![
            hit("Word Counter", HitKind::Tool, None),
            hit("word counter", HitKind::Tool, None),
            hit("Words of Wisdom", HitKind::Post, Some(1)),
        ];
        let common = vec![
            "word counter".to_string(),
            "wordplay".to_string(),
            "crosswords".to_string(),
            "unrelated".to_string(),
            "word games".to_string(),
        ];

        let result = suggestions(&hits, &common, "word");
        assert_eq!(
            result,
            vec![
                "Word Counter",
                "Words of Wisdom",
                "wordplay",
                "crosswords",
                "word games"
            ]
        );
    }

    #[test]
    fn test_category_includes() {
        assert!(SearchCategory::All.includes(HitKind::Quiz));
        assert!(SearchCategory::Posts.includes(HitKind::Post));
        assert!(!SearchCategory::Posts.includes(HitKind::Tool));
        assert!(SearchCategory::Tools.includes(HitKind::Tool));
    }
}
