use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 文章列表项，不含正文
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub slug: String,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub category: Option<String>,
    pub content_type: String,
    pub section: Option<String>,
    pub featured: bool,
    pub cover_image_url: Option<String>,
    pub like_count: i32,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// 正文词数，用于估算阅读时间
    #[serde(skip)]
    pub word_count: i32,
}

/// 文章详情
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PostDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub published: bool,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// 待写入的文章
#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub author_id: Uuid,
    pub category: Option<String>,
    pub content_type: String,
    pub section: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub cover_image_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

/// 文章列表筛选条件
#[derive(Debug, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub content_type: Option<String>,
    pub section: Option<String>,
    pub featured: Option<bool>,
    pub page: i64,
    pub limit: i64,
}

/// 评论行，附带作者资料
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub content: String,
}

/// 开关类关系写入后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    pub active: bool,
    /// 写入后重新统计的行数
    pub count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SavedPost {
    pub saved_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: PostSummary,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub quizzes_taken: i32,
    pub best_percentage: f64,
    pub total_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_type: String,
    pub score: i32,
    pub percentage: f64,
    pub time_taken_seconds: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub avatar_url: Option<String>,
    pub attempts: i64,
    pub best_percentage: f64,
    pub average_percentage: f64,
    pub total_score: i64,
}

/// 排行榜，没有任何测验记录时各项均为零
#[derive(Debug, Default, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub total_players: i64,
    pub total_attempts: i64,
}
