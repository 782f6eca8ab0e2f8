use std::future::Future;

use uuid::Uuid;

use super::{CommentRecord, DBPool, NewComment, engagement::LOCK_POST};
use crate::error::{ApiError, Result};

const COMMENT_COLUMNS: &str = r#"
    c.id, c.post_id, c.parent_id, c.author_id,
    pr.full_name AS author_name, pr.avatar_url AS author_avatar_url,
    c.content, c.like_count, c.created_at, c.updated_at
"#;

pub trait CommentStore: Send + Sync {
    /// 查询文章下的全部评论，按创建时间正序
    fn comments_for_post(
        &self,
        post_id: Uuid,
    ) -> impl Future<Output = Result<Vec<CommentRecord>>> + Send;

    /// 写入评论并刷新文章的 `comment_count`
    ///
    /// 事务内先锁定文章行，同一文章的评论写入串行执行。
    ///
    /// - 文章不存在或未发布返回 [`ApiError::NotFound`]
    /// - 父评论不存在或不属于同一篇文章返回 [`ApiError::Validation`]
    fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> impl Future<Output = Result<CommentRecord>> + Send;
}

impl CommentStore for DBPool {
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            LEFT JOIN profiles pr ON pr.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#
        );

        let rows = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(post_id)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRecord> {
        let mut tx = self.begin().await?;

        let post: Option<Uuid> = sqlx::query_scalar(LOCK_POST)
            .bind(comment.post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if post.is_none() {
            return Err(ApiError::NotFound.into());
        }

        if let Some(parent_id) = comment.parent_id {
            let parent_post: Option<Uuid> =
                sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match parent_post {
                None => return Err(ApiError::invalid("Parent comment not found").into()),
                Some(post_id) if post_id != comment.post_id => {
                    return Err(
                        ApiError::invalid("Parent comment belongs to a different post").into(),
                    );
                }
                Some(_) => {}
            }
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, parent_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE blog_posts
            SET comment_count = (SELECT COUNT(*) FROM comments WHERE post_id = $1)
            WHERE id = $1
            "#,
        )
        .bind(comment.post_id)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            LEFT JOIN profiles pr ON pr.id = c.author_id
            WHERE c.id = $1
            "#
        );
        let record = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }
}
