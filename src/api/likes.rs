use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiJson, ApiQuery};
use crate::{
    auth::AuthUser,
    content::{LikeAction, LikeTarget},
    error::Result,
    state::AppState,
    storage::{DBPool, EngagementStore, ToggleState},
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/likes", get(like_status).post(like))
}

#[derive(Debug, Deserialize)]
pub struct TargetParams {
    post_id: Option<Uuid>,
    comment_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LikeStatus {
    liked: bool,
    count: i64,
}

impl From<ToggleState> for LikeStatus {
    fn from(state: ToggleState) -> Self {
        Self {
            liked: state.active,
            count: state.count,
        }
    }
}

/// 点赞状态与总数，未登录时 `liked` 为 `false`
async fn like_status(
    ApiQuery(params): ApiQuery<TargetParams>,
    State(pool): State<DBPool>,
    user: Option<AuthUser>,
) -> Result<Json<LikeStatus>> {
    let target = LikeTarget::from_ids(params.post_id, params.comment_id)?;

    let state = pool.like_state(target, user.map(|u| u.id)).await?;
    Ok(Json(state.into()))
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    post_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    #[serde(default)]
    action: LikeAction,
}

async fn like(
    State(pool): State<DBPool>,
    user: AuthUser,
    ApiJson(body): ApiJson<LikeRequest>,
) -> Result<Json<LikeStatus>> {
    let target = LikeTarget::from_ids(body.post_id, body.comment_id)?;

    let state = pool.apply_like(target, user.id, body.action.into()).await?;
    Ok(Json(state.into()))
}
