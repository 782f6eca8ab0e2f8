use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiQuery, ensure_author};
use crate::{
    auth::AuthUser,
    content::{CommentNode, build_thread},
    error::{ApiError, Result},
    state::AppState,
    storage::{CommentStore, DBPool, NewComment},
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/comments", get(list_comments).post(create_comment))
}

#[derive(Debug, Deserialize)]
pub struct CommentParams {
    post_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    comments: Vec<CommentNode>,
    total: usize,
}

/// 获取文章的评论树
async fn list_comments(
    ApiQuery(params): ApiQuery<CommentParams>,
    State(pool): State<DBPool>,
) -> Result<Json<CommentList>> {
    let post_id = params
        .post_id
        .ok_or_else(|| ApiError::invalid("post_id is required"))?;

    let records = pool.comments_for_post(post_id).await?;
    let total = records.len();

    Ok(Json(CommentList {
        comments: build_thread(records),
        total,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(required(message = "post_id is required"))]
    post_id: Option<Uuid>,
    parent_id: Option<Uuid>,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 2000, message = "Content must be between 1 and 2000 characters"))]
    content: String,
}

/// 发表评论或回复，返回 201
async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateComment>,
) -> Result<(StatusCode, Json<CommentNode>)> {
    body.validate()?;
    let CreateComment {
        post_id: Some(post_id),
        parent_id,
        content,
    } = body
    else {
        return Err(ApiError::invalid("post_id is required").into());
    };

    ensure_author(&state, &user).await;

    let record = state
        .pool()
        .insert_comment(&NewComment {
            post_id,
            parent_id,
            author_id: user.id,
            content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentNode::from(record))))
}
