use serde::Deserialize;

use super::search::{HitKind, SearchHit};
use crate::error::Result;

const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.toml");

/// 内置的测验与工具目录，搜索时与文章结果合并
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub quizzes: Vec<CatalogEntry>,
    pub tools: Vec<CatalogEntry>,
    /// 搜索建议使用的常用词
    #[serde(default)]
    pub common_terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogEntry {
    /// `term` 需为小写
    fn matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(term)
            || self.description.to_lowercase().contains(term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(term))
    }

    fn to_hit(&self, kind: HitKind) -> SearchHit {
        SearchHit {
            id: self.id.clone(),
            kind,
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            category: self.category.clone(),
            created_at: None,
        }
    }
}

impl Catalog {
    /// 解析随程序打包的 `assets/catalog.toml`
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_CATALOG)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn search_quizzes(&self, term: &str) -> Vec<SearchHit> {
        Self::search(&self.quizzes, HitKind::Quiz, term)
    }

    pub fn search_tools(&self, term: &str) -> Vec<SearchHit> {
        Self::search(&self.tools, HitKind::Tool, term)
    }

    fn search(entries: &[CatalogEntry], kind: HitKind, term: &str) -> Vec<SearchHit> {
        let term = term.to_lowercase();
        entries
            .iter()
            .filter(|e| e.matches(&term))
            .map(|e| e.to_hit(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = Catalog::bundled().expect("内置目录解析失败");
        assert_eq!(catalog.quizzes.len(), 3);
        assert!(!catalog.tools.is_empty());
        assert!(!catalog.common_terms.is_empty());
    }

    #[test]
    fn test_search_matches_title_description_and_tags() {
        let catalog = Catalog::bundled().expect("内置目录解析失败");

        let by_title = catalog.search_tools("CURRENCY");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].kind, HitKind::Tool);

        let by_tag = catalog.search_tools("exchange");
        assert_eq!(by_tag[0].id, "currency-converter");

        let quizzes = catalog.search_quizzes("vocabulary");
        assert!(quizzes.iter().any(|q| q.id == "vocabulary"));
        assert!(catalog.search_quizzes("no-such-thing").is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid_catalog() {
        assert!(Catalog::parse("quizzes = 3").is_err());
    }
}
