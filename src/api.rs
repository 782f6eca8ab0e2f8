mod blog_posts;
mod comments;
mod contact;
mod likes;
mod oauth;
mod profile;
mod quiz;
mod saved_posts;
mod search;
mod speech;
mod tools;
mod verification;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
};
use serde::{Deserialize, Deserializer};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::{Error, Result},
    state::AppState,
    storage::ProfileStore,
};

/// JSON 请求体，解析失败时返回 `{error}` 和 400
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// 查询参数，解析失败时返回 `{error}` 和 400
#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// 设置应用的路由。
///
/// `/api` 下为 JSON 接口，`/auth` 下为 OAuth 回调和退出登录。
pub fn setup_route(app: AppState) -> Router {
    let api = Router::new()
        .merge(blog_posts::setup_route())
        .merge(comments::setup_route())
        .merge(likes::setup_route())
        .merge(saved_posts::setup_route())
        .merge(search::setup_route())
        .merge(quiz::setup_route())
        .merge(profile::setup_route())
        .merge(contact::setup_route())
        .merge(verification::setup_route())
        .merge(speech::setup_route())
        .merge(tools::setup_route());

    Router::new()
        .nest("/api", api)
        .nest("/auth", oauth::setup_route())
        .with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server(app: AppState, addr: &str) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, addr).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
pub fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}

/// 去掉首尾空白，请求体在 `validate` 之前统一处理
fn trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// 同 [`trimmed`]，空白字符串视为未提供
fn trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// 写入内容前确保作者资料存在，失败只记录日志
async fn ensure_author(state: &AppState, user: &AuthUser) {
    if let Err(e) = state
        .pool()
        .ensure_profile(user.id, user.display_name(), user.avatar_url())
        .await
    {
        tracing::warn!(error = %e, user_id = %user.id, "failed to ensure profile");
    }
}
