use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationError};

use super::ApiJson;
use crate::{
    auth::AuthUser,
    error::{ApiError, Result},
    state::AppState,
    storage::{Profile, ProfileStore},
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/profile", get(profile).patch(update_profile))
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    email: Option<String>,
    #[serde(flatten)]
    profile: Profile,
}

/// 当前用户资料和测验统计，首次访问时创建资料
async fn profile(State(state): State<AppState>, user: AuthUser) -> Result<Json<ProfileView>> {
    let pool = state.pool();
    let profile = match pool.profile(user.id).await? {
        Some(profile) => profile,
        None => {
            pool.ensure_profile(user.id, user.display_name(), user.avatar_url())
                .await?
        }
    };

    Ok(Json(ProfileView {
        email: user.email,
        profile,
    }))
}

/// 空白字段视为不修改
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    full_name: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(custom(function = "http_url"))]
    avatar_url: Option<String>,
}

fn http_url(url: &str) -> std::result::Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::new("http_url").with_message("avatar_url must be an http(s) URL".into()))
    }
}

impl ProfileUpdate {
    fn check(&self) -> Result<()> {
        self.validate()?;
        if self.full_name.is_none() && self.avatar_url.is_none() {
            return Err(ApiError::invalid("Nothing to update").into());
        }
        Ok(())
    }
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    body.check()?;
    let ProfileUpdate {
        full_name,
        avatar_url,
    } = body;
    let pool = state.pool();

    pool.ensure_profile(user.id, user.display_name(), user.avatar_url())
        .await?;
    let profile = pool
        .update_profile(user.id, full_name.as_deref(), avatar_url.as_deref())
        .await?
        .ok_or(ApiError::NotFound)?;

    state.audit().record(
        &user.id.to_string(),
        "profile.update",
        json!({ "full_name": full_name, "avatar_url": avatar_url }),
    );

    Ok(Json(ProfileView {
        email: user.email,
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(body: serde_json::Value) -> ProfileUpdate {
        serde_json::from_value(body).expect("反序列化失败")
    }

    #[test]
    fn test_profile_update_validation() {
        let body = update(json!({ "full_name": "  Ada " }));
        assert!(body.check().is_ok());
        assert_eq!(body.full_name.as_deref(), Some("Ada"));
        assert!(body.avatar_url.is_none());

        assert!(update(json!({})).check().is_err());
        assert!(update(json!({ "full_name": "   " })).check().is_err(), "空白名字视为未修改");
        assert!(update(json!({ "full_name": "x".repeat(101) })).check().is_err());
        assert!(update(json!({ "avatar_url": "javascript:alert(1)" })).check().is_err());
        assert!(update(json!({ "avatar_url": "https://img.example.com/a.png" })).check().is_ok());
    }
}
