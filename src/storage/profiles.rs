use std::future::Future;

use uuid::Uuid;

use super::{DBPool, Profile};
use crate::error::Result;

pub(super) const PROFILE_COLUMNS: &str = r#"
    id, full_name, avatar_url, quizzes_taken, best_percentage, total_score,
    created_at, updated_at
"#;

pub trait ProfileStore: Send + Sync {
    fn profile(&self, id: Uuid) -> impl Future<Output = Result<Option<Profile>>> + Send;

    /// 确保资料存在；已有的名字和头像不会被覆盖
    fn ensure_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> impl Future<Output = Result<Profile>> + Send;

    /// 更新名字和头像，`None` 表示保持不变
    fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> impl Future<Output = Result<Option<Profile>>> + Send;
}

impl ProfileStore for DBPool {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(profile)
    }

    async fn ensure_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, full_name, avatar_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                full_name = COALESCE(profiles.full_name, EXCLUDED.full_name),
                avatar_url = COALESCE(profiles.avatar_url, EXCLUDED.avatar_url)
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(avatar_url)
            .fetch_one(self)
            .await?;
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(full_name)
            .bind(avatar_url)
            .fetch_optional(self)
            .await?;
        Ok(profile)
    }
}
