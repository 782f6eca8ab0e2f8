use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use super::ApiQuery;
use crate::{
    content::{
        HitKind, MAX_LIMIT, SearchCategory, SearchHit, clamp_limit, like_pattern, normalize_term,
        rank, suggestions,
    },
    error::Result,
    state::AppState,
    storage::PostQuery,
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    q: String,
    category: SearchCategory,
    limit: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct SearchResponse {
    results: Vec<SearchHit>,
    suggestions: Vec<String>,
    /// 截断前的命中数
    total: usize,
}

/// 合并文章、测验和工具的搜索结果
///
/// 搜索词不足两个字符时直接返回空结果，不访问任何数据源。
async fn search(
    ApiQuery(params): ApiQuery<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>> {
    let Some(term) = normalize_term(&params.q) else {
        return Ok(Json(SearchResponse::default()));
    };
    let limit = clamp_limit(params.limit);
    let category = params.category;
    let catalog = state.catalog();

    let mut hits: Vec<SearchHit> = Vec::new();
    if category.includes(HitKind::Post) {
        // 先取足够多的文章再统一排序截断，`total` 才不会只算到 limit
        let posts = state
            .pool()
            .search_posts(&like_pattern(term), MAX_LIMIT as i64)
            .await?;
        hits.extend(posts.into_iter().map(SearchHit::from));
    }
    if category.includes(HitKind::Quiz) {
        hits.extend(catalog.search_quizzes(term));
    }
    if category.includes(HitKind::Tool) {
        hits.extend(catalog.search_tools(term));
    }

    rank(&mut hits, term);
    let suggestions = suggestions(&hits, &catalog.common_terms, term);
    let total = hits.len();
    hits.truncate(limit);

    Ok(Json(SearchResponse {
        results: hits,
        suggestions,
        total,
    }))
}
