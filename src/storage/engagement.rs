use std::future::Future;

use sqlx::PgConnection;
use uuid::Uuid;

use super::{DBPool, SavedPost, ToggleState, posts::SUMMARY_COLUMNS};
use crate::{
    content::{LikeTarget, ToggleAction},
    error::{ApiError, Result},
};

/// 锁定已发布文章
pub(super) const LOCK_POST: &str =
    "SELECT id FROM blog_posts WHERE id = $1 AND published = TRUE FOR UPDATE";

/// 锁定已发布文章下的评论
const LOCK_COMMENT: &str = r#"
    SELECT c.id FROM comments c
    JOIN blog_posts p ON p.id = c.post_id
    WHERE c.id = $1 AND p.published = TRUE
    FOR UPDATE OF c
"#;

/// 点赞目标对应的 (likes 列名, 目标表名, 加锁语句, 目标 id)
fn like_parts(target: LikeTarget) -> (&'static str, &'static str, &'static str, Uuid) {
    match target {
        LikeTarget::Post(id) => ("post_id", "blog_posts", LOCK_POST, id),
        LikeTarget::Comment(id) => ("comment_id", "comments", LOCK_COMMENT, id),
    }
}

/// 计数列是 `INTEGER`，超出范围时报错而不是截断
fn counter_value(count: i64) -> Result<i32> {
    Ok(i32::try_from(count)?)
}

/// 点赞与收藏
///
/// 写操作在同一事务内完成：先对目标行加 `FOR UPDATE` 锁，依赖唯一索引做
/// `INSERT .. ON CONFLICT DO NOTHING` 或 `DELETE`，再重新统计行数并回写计数列。
/// 同一目标的写入因此串行执行，返回的计数与库中行数一致。
///
/// 未发布的文章及其评论视为不存在。
pub trait EngagementStore: Send + Sync {
    /// 当前用户是否已点赞，以及点赞总数；匿名用户 `active` 恒为 `false`
    fn like_state(
        &self,
        target: LikeTarget,
        user_id: Option<Uuid>,
    ) -> impl Future<Output = Result<ToggleState>> + Send;

    fn apply_like(
        &self,
        target: LikeTarget,
        user_id: Uuid,
        action: ToggleAction,
    ) -> impl Future<Output = Result<ToggleState>> + Send;

    fn save_state(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<ToggleState>> + Send;

    fn apply_save(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        action: ToggleAction,
    ) -> impl Future<Output = Result<ToggleState>> + Send;

    /// 用户收藏的文章，最近收藏的在前
    fn saved_posts(&self, user_id: Uuid) -> impl Future<Output = Result<Vec<SavedPost>>> + Send;
}

/// 锁定目标行，直到事务结束；目标不存在返回 [`ApiError::NotFound`]
async fn lock_target(conn: &mut PgConnection, lock_sql: &str, id: Uuid) -> Result<()> {
    let found: Option<Uuid> = sqlx::query_scalar(lock_sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    found.map(|_| ()).ok_or_else(|| ApiError::NotFound.into())
}

/// 按 [`ToggleAction`] 执行插入或删除，返回操作后的状态
async fn apply_toggle(
    conn: &mut PgConnection,
    action: ToggleAction,
    insert_sql: &str,
    delete_sql: &str,
    user_id: Uuid,
    target_id: Uuid,
) -> Result<bool> {
    match action {
        ToggleAction::On => {
            execute_bound(conn, insert_sql, user_id, target_id).await?;
            Ok(true)
        }
        ToggleAction::Off => {
            execute_bound(conn, delete_sql, user_id, target_id).await?;
            Ok(false)
        }
        ToggleAction::Toggle => {
            if execute_bound(&mut *conn, delete_sql, user_id, target_id).await? > 0 {
                Ok(false)
            } else {
                execute_bound(conn, insert_sql, user_id, target_id).await?;
                Ok(true)
            }
        }
    }
}

async fn execute_bound(
    conn: &mut PgConnection,
    sql: &str,
    user_id: Uuid,
    target_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(sql)
        .bind(user_id)
        .bind(target_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

impl EngagementStore for DBPool {
    async fn like_state(&self, target: LikeTarget, user_id: Option<Uuid>) -> Result<ToggleState> {
        let (column, _, _, id) = like_parts(target);

        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM likes WHERE {column} = $1"))
                .bind(id)
                .fetch_one(self)
                .await?;

        let active = match user_id {
            Some(user_id) => sqlx::query_scalar::<_, bool>(&format!(
                "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND {column} = $2)"
            ))
            .bind(user_id)
            .bind(id)
            .fetch_one(self)
            .await?,
            None => false,
        };

        Ok(ToggleState { active, count })
    }

    async fn apply_like(
        &self,
        target: LikeTarget,
        user_id: Uuid,
        action: ToggleAction,
    ) -> Result<ToggleState> {
        let (column, table, lock_sql, id) = like_parts(target);
        let mut tx = self.begin().await?;

        lock_target(&mut *tx, lock_sql, id).await?;

        let insert_sql = format!(
            r#"
            INSERT INTO likes (user_id, {column}) VALUES ($1, $2)
            ON CONFLICT (user_id, {column}) WHERE {column} IS NOT NULL DO NOTHING
            "#
        );
        let delete_sql = format!("DELETE FROM likes WHERE user_id = $1 AND {column} = $2");
        let active =
            apply_toggle(&mut *tx, action, &insert_sql, &delete_sql, user_id, id).await?;

        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM likes WHERE {column} = $1"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(&format!("UPDATE {table} SET like_count = $2 WHERE id = $1"))
            .bind(id)
            .bind(counter_value(count)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ToggleState { active, count })
    }

    async fn save_state(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleState> {
        let (active, count): (bool, i64) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM saved_posts WHERE post_id = $1 AND user_id = $2),
                (SELECT COUNT(*) FROM saved_posts WHERE post_id = $1)
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(self)
        .await?;

        Ok(ToggleState { active, count })
    }

    async fn apply_save(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        action: ToggleAction,
    ) -> Result<ToggleState> {
        let mut tx = self.begin().await?;

        lock_target(&mut *tx, LOCK_POST, post_id).await?;

        let active = apply_toggle(
            &mut *tx,
            action,
            r#"
            INSERT INTO saved_posts (user_id, post_id) VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
            "DELETE FROM saved_posts WHERE user_id = $1 AND post_id = $2",
            user_id,
            post_id,
        )
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_posts WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ToggleState { active, count })
    }

    async fn saved_posts(&self, user_id: Uuid) -> Result<Vec<SavedPost>> {
        let sql = format!(
            r#"
            SELECT s.created_at AS saved_at, {SUMMARY_COLUMNS}
            FROM saved_posts s
            JOIN blog_posts p ON p.id = s.post_id
            LEFT JOIN profiles pr ON pr.id = p.author_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, SavedPost>(&sql)
            .bind(user_id)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_value_out_of_range() {
        assert_eq!(counter_value(40).ok(), Some(40));
        assert!(counter_value(i64::from(i32::MAX) + 1).is_err(), "超出 INTEGER 范围应报错");
    }

    #[test]
    fn test_lock_statements() {
        for target in [LikeTarget::Post(Uuid::nil()), LikeTarget::Comment(Uuid::nil())] {
            let (_, _, lock_sql, _) = like_parts(target);
            assert!(lock_sql.contains("FOR UPDATE"), "写入前必须锁定目标行");
            assert!(lock_sql.contains("published = TRUE"), "未发布文章不可写入");
        }
    }
}
