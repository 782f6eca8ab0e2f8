mod extract;
mod hosted;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use self::{
    extract::{ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE, REFRESH_TOKEN_COOKIE},
    hosted::HostedAuthClient,
};

/// 托管的 OAuth / 会话服务
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// 用授权码（PKCE）换取会话
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Session>;

    /// 根据 access token 查询用户，token 无效时返回 `None`
    async fn user(&self, access_token: &str) -> Result<Option<AuthUser>>;
}

pub type DynAuth = Arc<dyn AuthProvider>;

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: AuthUser,
}

/// 已登录用户
///
/// 作为提取器使用时要求请求已登录；`Option<AuthUser>` 在未登录时得到 `None`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// OAuth 提供方返回的用户资料，不同提供方字段名不一致
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
}

impl AuthUser {
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .full_name
            .as_deref()
            .or(self.user_metadata.name.as_deref())
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.user_metadata
            .avatar_url
            .as_deref()
            .or(self.user_metadata.picture.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_fallbacks() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "email": "reader@example.com",
            "user_metadata": { "name": "Reader", "picture": "https://img/p.png" }
        }))
        .expect("反序列化失败");

        assert_eq!(user.display_name(), Some("Reader"));
        assert_eq!(user.avatar_url(), Some("https://img/p.png"));
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000002",
            "email": null
        }))
        .expect("反序列化失败");

        assert!(user.display_name().is_none());
        assert!(user.avatar_url().is_none());
    }
}
