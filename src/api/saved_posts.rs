use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiJson, ApiQuery};
use crate::{
    auth::AuthUser,
    content::SaveAction,
    error::{ApiError, Result},
    state::AppState,
    storage::{DBPool, EngagementStore, SavedPost, ToggleState},
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/saved-posts", get(saved_posts).post(save))
}

#[derive(Debug, Deserialize)]
pub struct SavedParams {
    post_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SaveStatus {
    saved: bool,
    count: i64,
}

impl From<ToggleState> for SaveStatus {
    fn from(state: ToggleState) -> Self {
        Self {
            saved: state.active,
            count: state.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedList {
    posts: Vec<SavedPost>,
}

/// 带 `post_id` 时返回该文章的收藏状态，否则返回当前用户的收藏列表
async fn saved_posts(
    ApiQuery(params): ApiQuery<SavedParams>,
    State(pool): State<DBPool>,
    user: AuthUser,
) -> Result<Response> {
    match params.post_id {
        Some(post_id) => {
            let state = pool.save_state(post_id, user.id).await?;
            Ok(Json(SaveStatus::from(state)).into_response())
        }
        None => {
            let posts = pool.saved_posts(user.id).await?;
            Ok(Json(SavedList { posts }).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    post_id: Option<Uuid>,
    #[serde(default)]
    action: SaveAction,
}

async fn save(
    State(pool): State<DBPool>,
    user: AuthUser,
    ApiJson(body): ApiJson<SaveRequest>,
) -> Result<Json<SaveStatus>> {
    let post_id = body
        .post_id
        .ok_or_else(|| ApiError::invalid("post_id is required"))?;

    let state = pool.apply_save(post_id, user.id, body.action.into()).await?;
    Ok(Json(state.into()))
}
