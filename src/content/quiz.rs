use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// 测验类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Trivia,
    Personality,
    Vocabulary,
}

impl QuizType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::Trivia => "trivia",
            QuizType::Personality => "personality",
            QuizType::Vocabulary => "vocabulary",
        }
    }
}

/// 一次测验提交
#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    pub quiz_type: QuizType,
    pub score: i32,
    pub percentage: f64,
    #[serde(alias = "time_taken")]
    pub time_taken_seconds: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    #[serde(default)]
    pub answers: serde_json::Value,
}

impl QuizSubmission {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.total_questions <= 0 {
            return Err(ApiError::invalid("total_questions must be positive"));
        }
        if self.correct_answers < 0 || self.correct_answers > self.total_questions {
            return Err(ApiError::invalid(
                "correct_answers must be between 0 and total_questions",
            ));
        }
        if !(0.0..=100.0).contains(&self.percentage) {
            return Err(ApiError::invalid("percentage must be between 0 and 100"));
        }
        if self.score < 0 {
            return Err(ApiError::invalid("score must not be negative"));
        }
        if self.time_taken_seconds < 0 {
            return Err(ApiError::invalid("time_taken_seconds must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission() -> QuizSubmission {
        serde_json::from_value(json!({
            "quiz_type": "trivia",
            "score": 80,
            "percentage": 80.0,
            "time_taken": 95,
            "correct_answers": 8,
            "total_questions": 10,
            "answers": {"q1": "b"}
        }))
        .expect("反序列化失败")
    }

    #[test]
    fn test_valid_submission() {
        let s = submission();
        assert_eq!(s.quiz_type, QuizType::Trivia);
        assert_eq!(s.time_taken_seconds, 95);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_unknown_quiz_type_is_rejected() {
        let result = serde_json::from_value::<QuizSubmission>(json!({
            "quiz_type": "astrology",
            "score": 1,
            "percentage": 1.0,
            "time_taken_seconds": 1,
            "correct_answers": 1,
            "total_questions": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_counts() {
        let mut s = submission();
        s.correct_answers = 11;
        assert!(s.validate().is_err());

        let mut s = submission();
        s.total_questions = 0;
        assert!(s.validate().is_err());

        let mut s = submission();
        s.percentage = 100.5;
        assert!(s.validate().is_err());

        let mut s = submission();
        s.time_taken_seconds = -1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_as_str_matches_serde_name() {
        for t in [QuizType::Trivia, QuizType::Personality, QuizType::Vocabulary] {
            assert_eq!(
                serde_json::to_value(t).expect("序列化失败"),
                json!(t.as_str())
            );
        }
    }
}
