use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, ApiQuery, ensure_author};
use crate::{
    auth::AuthUser,
    content::{QuizSubmission, QuizType},
    error::Result,
    state::AppState,
    storage::{DBPool, Leaderboard, Profile, QuizAttempt, QuizStore},
};

const DEFAULT_LEADERBOARD_SIZE: i64 = 10;
const MAX_LEADERBOARD_SIZE: i64 = 100;
const DEFAULT_ATTEMPTS: i64 = 20;
const MAX_ATTEMPTS: i64 = 100;

/// 测验相关路由。
///
/// - `POST /quiz/submit`：提交测验结果
/// - `GET /quiz/leaderboard`：排行榜
/// - `GET /quiz/attempts`：当前用户的测验记录
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/quiz/submit", post(submit))
        .route("/quiz/leaderboard", get(leaderboard))
        .route("/quiz/attempts", get(attempts))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    attempt: QuizAttempt,
    profile: Profile,
}

async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(submission): ApiJson<QuizSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    submission.validate()?;

    // 先补全名字和头像，排行榜才能显示
    ensure_author(&state, &user).await;

    let (attempt, profile) = state.pool().record_attempt(user.id, &submission).await?;

    tracing::info!(
        user_id = %user.id,
        quiz_type = submission.quiz_type.as_str(),
        percentage = submission.percentage,
        "quiz attempt recorded"
    );
    Ok((StatusCode::CREATED, Json(SubmitResponse { attempt, profile })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeaderboardParams {
    quiz_type: Option<QuizType>,
    limit: Option<i64>,
}

async fn leaderboard(
    ApiQuery(params): ApiQuery<LeaderboardParams>,
    State(pool): State<DBPool>,
) -> Result<Json<Leaderboard>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .clamp(1, MAX_LEADERBOARD_SIZE);

    let board = pool.leaderboard(params.quiz_type, limit).await?;
    Ok(Json(board))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AttemptParams {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AttemptList {
    attempts: Vec<QuizAttempt>,
}

async fn attempts(
    ApiQuery(params): ApiQuery<AttemptParams>,
    State(pool): State<DBPool>,
    user: AuthUser,
) -> Result<Json<AttemptList>> {
    let limit = params.limit.unwrap_or(DEFAULT_ATTEMPTS).clamp(1, MAX_ATTEMPTS);

    let attempts = pool.attempts_for_user(user.id, limit).await?;
    Ok(Json(AttemptList { attempts }))
}
