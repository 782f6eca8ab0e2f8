use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ApiJson, ApiQuery, ensure_author};
use crate::{
    auth::AuthUser,
    content::new_slug,
    error::{ApiError, Result},
    state::AppState,
    storage::{DBPool, NewPost, PostDetail, PostFilter, PostQuery, PostSummary},
    util::{ShareLinks, excerpt, format::EXCERPT_CHARS, minutes_for_words, reading_time},
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

/// 配置文章相关路由。
///
/// - `GET /blog-posts`：已发布文章列表
/// - `POST /blog-posts`：发布文章
/// - `GET /blog-posts/{slug}`：文章详情
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/blog-posts", get(list_posts).post(create_post))
        .route("/blog-posts/{slug}", get(post_detail))
}

/// 查询参数，用于文章列表分页和筛选。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    category: Option<String>,
    content_type: Option<String>,
    section: Option<String>,
    featured: Option<bool>,
    page: Option<i64>,
    limit: Option<i64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<ListParams> for PostFilter {
    fn from(params: ListParams) -> Self {
        PostFilter {
            category: non_empty(params.category),
            content_type: non_empty(params.content_type),
            section: non_empty(params.section),
            featured: params.featured,
            page: params.page.unwrap_or(1).max(1),
            limit: params
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostItem {
    #[serde(flatten)]
    post: PostSummary,
    /// 阅读时间，单位：分钟
    reading_time: u32,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    posts: Vec<PostItem>,
    page: i64,
    limit: i64,
}

/// 获取已发布文章列表，按创建时间倒序。
async fn list_posts(
    ApiQuery(params): ApiQuery<ListParams>,
    State(pool): State<DBPool>,
) -> Result<Json<PostList>> {
    let filter = PostFilter::from(params);

    let posts = pool
        .list_posts(&filter)
        .await?
        .into_iter()
        .map(|post| PostItem {
            reading_time: minutes_for_words(post.word_count.max(0) as usize),
            post,
        })
        .collect();

    Ok(Json(PostList {
        posts,
        page: filter.page,
        limit: filter.limit,
    }))
}

#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    post: PostDetail,
    reading_time: u32,
    share: ShareLinks,
}

/// 根据 slug 获取单篇文章，附带阅读时间和分享链接。
async fn post_detail(Path(slug): Path<String>, State(state): State<AppState>) -> Result<Json<PostView>> {
    let post = state
        .pool()
        .post_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(view(&state, post)))
}

fn view(state: &AppState, post: PostDetail) -> PostView {
    let url = format!("{}/blog/{}", state.settings().site_url, post.summary.slug);

    PostView {
        reading_time: reading_time(&post.content),
        share: ShareLinks::new(&url, &post.summary.title),
        post,
    }
}

fn default_content_type() -> String {
    "story".to_string()
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePost {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    title: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(
        min = 1,
        max = 100000,
        message = "Content must be between 1 and 100000 characters"
    ))]
    content: String,
    excerpt: Option<String>,
    category: Option<String>,
    #[serde(default = "default_content_type")]
    content_type: String,
    section: Option<String>,
    #[serde(default = "default_published")]
    published: bool,
    #[serde(default)]
    featured: bool,
    cover_image_url: Option<String>,
    audio_url: Option<String>,
    video_url: Option<String>,
}

impl CreatePost {
    /// 校验并生成待写入的文章；`featured` 仅管理员可设置
    fn into_new_post(self, author: &AuthUser, is_admin: bool) -> Result<NewPost> {
        self.validate()?;
        let Self { title, content, .. } = self;

        let excerpt = non_empty(self.excerpt)
            .map(|e| e.chars().take(EXCERPT_CHARS * 2).collect())
            .unwrap_or_else(|| excerpt(&content, EXCERPT_CHARS));

        Ok(NewPost {
            slug: new_slug(&title),
            title,
            excerpt,
            content,
            author_id: author.id,
            category: non_empty(self.category),
            content_type: non_empty(Some(self.content_type)).unwrap_or_else(default_content_type),
            section: non_empty(self.section),
            published: self.published,
            featured: self.featured && is_admin,
            cover_image_url: non_empty(self.cover_image_url),
            audio_url: non_empty(self.audio_url),
            video_url: non_empty(self.video_url),
        })
    }
}

/// 发布文章，返回 201 和文章详情。
async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreatePost>,
) -> Result<(StatusCode, Json<PostView>)> {
    let is_admin = state.settings().is_admin(user.email.as_deref());
    let post = body.into_new_post(&user, is_admin)?;

    ensure_author(&state, &user).await;
    let post = state.pool().insert_post(&post).await?;

    tracing::info!(slug = %post.summary.slug, author = %user.id, "post created");
    Ok((StatusCode::CREATED, Json(view(&state, post))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn author() -> AuthUser {
        serde_json::from_value(json!({
            "id": Uuid::nil(),
            "email": "writer@example.com"
        }))
        .expect("反序列化失败")
    }

    fn create(body: serde_json::Value) -> CreatePost {
        serde_json::from_value(body).expect("反序列化失败")
    }

    #[test]
    fn test_list_params_clamped() {
        let filter = PostFilter::from(ListParams {
            category: Some("  ".to_string()),
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        });

        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_new_post_defaults() {
        let post = create(json!({
            "title": "  A Quiet Harbor ",
            "content": "<p>The boats came in at dusk.</p>",
            "featured": true
        }))
        .into_new_post(&author(), false)
        .expect("校验应通过");

        assert_eq!(post.title, "A Quiet Harbor");
        assert!(post.slug.starts_with("a-quiet-harbor-"));
        assert_eq!(post.excerpt, "The boats came in at dusk.");
        assert_eq!(post.content_type, "story");
        assert!(post.published);
        assert!(!post.featured, "非管理员不能设置推荐");
    }

    #[test]
    fn test_new_post_validation() {
        let missing = create(json!({ "title": " ", "content": "body" })).into_new_post(&author(), true);
        assert!(missing.is_err());

        let long = create(json!({ "title": "x".repeat(201), "content": "body" }))
            .into_new_post(&author(), true);
        assert!(long.is_err());

        let empty = create(json!({ "title": "Title" })).into_new_post(&author(), true);
        assert!(empty.is_err());
    }
}
