use std::future::Future;

use super::{DBPool, NewPost, PostDetail, PostFilter, PostSummary};
use crate::error::Result;

pub(super) const SUMMARY_COLUMNS: &str = r#"
    p.id, p.title, p.excerpt, p.slug, p.author_id,
    pr.full_name AS author_name, pr.avatar_url AS author_avatar_url,
    p.category, p.content_type, p.section, p.featured, p.cover_image_url,
    p.like_count, p.comment_count, p.created_at, p.published_at,
    cardinality(regexp_split_to_array(btrim(p.content), '\s+')) AS word_count
"#;

const DETAIL_COLUMNS: &str = r#"
    p.content, p.published, p.audio_url, p.video_url, p.updated_at
"#;

/// 文章查询与写入
pub trait PostQuery: Send + Sync {
    /// 分页查询已发布文章，按创建时间倒序
    fn list_posts(
        &self,
        filter: &PostFilter,
    ) -> impl Future<Output = Result<Vec<PostSummary>>> + Send;

    /// 根据 slug 查询已发布文章
    fn post_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<PostDetail>>> + Send;

    fn insert_post(&self, post: &NewPost) -> impl Future<Output = Result<PostDetail>> + Send;

    /// 在已发布文章的标题、摘要和正文中做 `ILIKE` 匹配
    ///
    /// 标题命中的排在前面，其次按创建时间倒序，与合并后的排序一致。
    ///
    /// `pattern` 需已转义，参见 [`crate::content::like_pattern`]
    fn search_posts(
        &self,
        pattern: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<PostSummary>>> + Send;
}

impl PostQuery for DBPool {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostSummary>> {
        let limit = filter.limit.max(1);
        let offset = (filter.page.max(1) - 1) * limit;

        let mut builder = sqlx::QueryBuilder::new(format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM blog_posts p
            LEFT JOIN profiles pr ON pr.id = p.author_id
            "#
        ));

        builder.push("WHERE p.published = TRUE");
        if let Some(category) = &filter.category {
            builder.push(" AND p.category = ").push_bind(category.clone());
        }
        if let Some(content_type) = &filter.content_type {
            builder.push(" AND p.content_type = ").push_bind(content_type.clone());
        }
        if let Some(section) = &filter.section {
            builder.push(" AND p.section = ").push_bind(section.clone());
        }
        if let Some(featured) = filter.featured {
            builder.push(" AND p.featured = ").push_bind(featured);
        }

        builder.push(" ORDER BY p.created_at DESC ");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let rows = builder
            .build_query_as::<PostSummary>()
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>> {
        let sql = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}, {DETAIL_COLUMNS}
            FROM blog_posts p
            LEFT JOIN profiles pr ON pr.id = p.author_id
            WHERE p.slug = $1 AND p.published = TRUE
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, PostDetail>(&sql)
            .bind(slug)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostDetail> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO blog_posts (
                    title, content, excerpt, slug, author_id, category, content_type,
                    section, published, featured, cover_image_url, audio_url, video_url,
                    published_at
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    CASE WHEN $9 THEN now() ELSE NULL END
                )
                RETURNING *
            )
            SELECT {SUMMARY_COLUMNS}, {DETAIL_COLUMNS}
            FROM p
            LEFT JOIN profiles pr ON pr.id = p.author_id
            "#
        );

        let row = sqlx::query_as::<_, PostDetail>(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.excerpt)
            .bind(&post.slug)
            .bind(post.author_id)
            .bind(&post.category)
            .bind(&post.content_type)
            .bind(&post.section)
            .bind(post.published)
            .bind(post.featured)
            .bind(&post.cover_image_url)
            .bind(&post.audio_url)
            .bind(&post.video_url)
            .fetch_one(self)
            .await?;
        Ok(row)
    }

    async fn search_posts(&self, pattern: &str, limit: i64) -> Result<Vec<PostSummary>> {
        let sql = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM blog_posts p
            LEFT JOIN profiles pr ON pr.id = p.author_id
            WHERE p.published = TRUE
            AND (p.title ILIKE $1 OR p.excerpt ILIKE $1 OR p.content ILIKE $1)
            ORDER BY (p.title ILIKE $1) DESC, p.created_at DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }
}
