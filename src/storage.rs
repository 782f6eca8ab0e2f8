mod comments;
mod engagement;
mod models;
mod postgres;
mod posts;
mod profiles;
mod quiz;

pub use self::{
    comments::CommentStore,
    engagement::EngagementStore,
    models::{
        CommentRecord, Leaderboard, LeaderboardEntry, NewComment, NewPost, PostDetail,
        PostFilter, PostSummary, Profile, QuizAttempt, SavedPost, ToggleState,
    },
    postgres::{DBPool, SCHEMA, migrate, new_db_pool},
    posts::PostQuery,
    profiles::ProfileStore,
    quiz::QuizStore,
};
