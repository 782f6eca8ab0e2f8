use std::future::Future;

use uuid::Uuid;

use super::{DBPool, Leaderboard, LeaderboardEntry, Profile, QuizAttempt, profiles::PROFILE_COLUMNS};
use crate::{
    content::{QuizSubmission, QuizType},
    error::Result,
};

const ATTEMPT_COLUMNS: &str = r#"
    id, user_id, quiz_type, score, percentage, time_taken_seconds,
    correct_answers, total_questions, answers, created_at
"#;

pub trait QuizStore: Send + Sync {
    /// 写入测验记录并更新用户资料中的测验统计
    fn record_attempt(
        &self,
        user_id: Uuid,
        submission: &QuizSubmission,
    ) -> impl Future<Output = Result<(QuizAttempt, Profile)>> + Send;

    fn attempts_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<QuizAttempt>>> + Send;

    /// 按最好成绩、总分排序的排行榜，可按测验类型过滤
    fn leaderboard(
        &self,
        quiz_type: Option<QuizType>,
        limit: i64,
    ) -> impl Future<Output = Result<Leaderboard>> + Send;
}

impl QuizStore for DBPool {
    async fn record_attempt(
        &self,
        user_id: Uuid,
        submission: &QuizSubmission,
    ) -> Result<(QuizAttempt, Profile)> {
        let mut tx = self.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO quiz_attempts (
                user_id, quiz_type, score, percentage, time_taken_seconds,
                correct_answers, total_questions, answers
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ATTEMPT_COLUMNS}
            "#
        );
        let attempt = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(user_id)
            .bind(submission.quiz_type.as_str())
            .bind(submission.score)
            .bind(submission.percentage)
            .bind(submission.time_taken_seconds)
            .bind(submission.correct_answers)
            .bind(submission.total_questions)
            .bind(&submission.answers)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO profiles (id, quizzes_taken, best_percentage, total_score)
            VALUES ($1, 1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                quizzes_taken = profiles.quizzes_taken + 1,
                best_percentage = GREATEST(profiles.best_percentage, EXCLUDED.best_percentage),
                total_score = profiles.total_score + EXCLUDED.total_score,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(submission.percentage)
            .bind(submission.score)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((attempt, profile))
    }

    async fn attempts_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<QuizAttempt>> {
        let sql = format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM quiz_attempts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn leaderboard(&self, quiz_type: Option<QuizType>, limit: i64) -> Result<Leaderboard> {
        let quiz_type = quiz_type.map(QuizType::as_str);

        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                a.user_id,
                pr.full_name AS user_name,
                pr.avatar_url,
                COUNT(*) AS attempts,
                MAX(a.percentage) AS best_percentage,
                AVG(a.percentage) AS average_percentage,
                SUM(a.score)::BIGINT AS total_score
            FROM quiz_attempts a
            LEFT JOIN profiles pr ON pr.id = a.user_id
            WHERE ($1::TEXT IS NULL OR a.quiz_type = $1)
            GROUP BY a.user_id, pr.full_name, pr.avatar_url
            ORDER BY best_percentage DESC, total_score DESC
            LIMIT $2
            "#,
        )
        .bind(quiz_type)
        .bind(limit)
        .fetch_all(self)
        .await?;

        let (total_players, total_attempts): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT user_id), COUNT(*)
            FROM quiz_attempts
            WHERE ($1::TEXT IS NULL OR quiz_type = $1)
            "#,
        )
        .bind(quiz_type)
        .fetch_one(self)
        .await?;

        Ok(Leaderboard {
            entries,
            total_players,
            total_attempts,
        })
    }
}
