use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::AuthUser;
use crate::{
    error::{ApiError, Error},
    state::AppState,
};

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";
pub const CODE_VERIFIER_COOKIE: &str = "sb-code-verifier";

/// 优先读取 `Authorization: Bearer`，其次读取会话 Cookie
fn access_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token =
            access_token(parts).ok_or(ApiError::Unauthorized("Authentication required"))?;

        state
            .auth()
            .user(&token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session").into())
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(token) = access_token(parts) else {
            return Ok(None);
        };

        match state.auth().user(&token).await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::warn!(%e, "failed to resolve session, treating request as anonymous");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).expect("构造请求失败").into_parts().0
    }

    #[test]
    fn test_access_token_prefers_bearer() {
        let p = parts(
            Request::get("/")
                .header(header::AUTHORIZATION, "Bearer header-token")
                .header(header::COOKIE, format!("{ACCESS_TOKEN_COOKIE}=cookie-token")),
        );
        assert_eq!(access_token(&p).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_access_token_from_cookie() {
        let p = parts(
            Request::get("/").header(header::COOKIE, format!("a=b; {ACCESS_TOKEN_COOKIE}=cookie-token")),
        );
        assert_eq!(access_token(&p).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_access_token_missing() {
        let p = parts(Request::get("/").header(header::AUTHORIZATION, "Basic abc"));
        assert_eq!(access_token(&p), None);
    }
}
