use axum::{
    Json, Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiQuery;
use crate::{
    auth::{ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE, REFRESH_TOKEN_COOKIE},
    state::AppState,
    storage::ProfileStore,
};

const AUTH_ERROR_PATH: &str = "/auth/auth-code-error";

/// OAuth 回调与退出登录。
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/callback", get(callback))
        .route("/signout", post(signout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    code: Option<String>,
    next: Option<String>,
}

/// 只允许跳转到站内路径，`//host` 和反斜杠形式视为外部地址
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// 用授权码换取会话，写入会话 Cookie 后跳转
async fn callback(
    ApiQuery(params): ApiQuery<CallbackParams>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (jar, Redirect::to(AUTH_ERROR_PATH));
    };

    let verifier = jar.get(CODE_VERIFIER_COOKIE).map(|c| c.value().to_string());
    let session = match state.auth().exchange_code(&code, verifier.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "failed to exchange auth code");
            return (jar, Redirect::to(AUTH_ERROR_PATH));
        }
    };

    let user = &session.user;
    if let Err(e) = state
        .pool()
        .ensure_profile(user.id, user.display_name(), user.avatar_url())
        .await
    {
        tracing::warn!(error = %e, user_id = %user.id, "failed to ensure profile");
    }
    state.audit().record(
        &user.id.to_string(),
        "auth.signin",
        json!({ "email": user.email }),
    );

    let secure = state.settings().secure_cookies();
    let jar = jar
        .remove(removal(CODE_VERIFIER_COOKIE))
        .add(session_cookie(ACCESS_TOKEN_COOKIE, session.access_token, secure))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, session.refresh_token, secure));

    (jar, Redirect::to(safe_next(params.next.as_deref())))
}

#[derive(Debug, Serialize)]
pub struct SignedOut {
    success: bool,
}

async fn signout(jar: CookieJar) -> (CookieJar, Json<SignedOut>) {
    let jar = jar
        .remove(removal(ACCESS_TOKEN_COOKIE))
        .remove(removal(REFRESH_TOKEN_COOKIE));

    (jar, Json(SignedOut { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/blog/a-story-1")), "/blog/a-story-1");
        assert_eq!(safe_next(Some("/profile?tab=quiz")), "/profile?tab=quiz");
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/");
        assert_eq!(safe_next(Some("//evil.example.com")), "/");
        assert_eq!(safe_next(Some("/\\evil.example.com")), "/");
    }
}
