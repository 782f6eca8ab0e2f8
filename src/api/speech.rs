use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::ApiJson;
use crate::{
    error::{ApiError, Result},
    state::AppState,
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/text-to-speech", post(text_to_speech))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SpeechRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 5000, message = "Text must be between 1 and 5000 characters"))]
    text: String,
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(custom(function = "alphanumeric_voice"))]
    voice_id: Option<String>,
}

/// 声音 id 会拼进上游 URL 路径，只允许字母和数字
fn alphanumeric_voice(voice: &str) -> std::result::Result<(), ValidationError> {
    if voice.len() <= 64 && voice.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("voice_id").with_message("Invalid voice_id".into()))
    }
}

/// 将文本转为 `audio/mpeg` 音频
async fn text_to_speech(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SpeechRequest>,
) -> Result<Response> {
    body.validate()?;

    let synthesizer = state
        .speech()
        .ok_or(ApiError::Unavailable("Text-to-speech is not configured"))?;

    let audio = synthesizer
        .synthesize(&body.text, body.voice_id.as_deref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        audio,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> SpeechRequest {
        serde_json::from_value(body).expect("反序列化失败")
    }

    #[test]
    fn test_voice_id_validation() {
        assert!(alphanumeric_voice("21m00Tcm4TlvDq8ikWAM").is_ok());
        assert!(alphanumeric_voice("../../v1/user").is_err());
        assert!(alphanumeric_voice(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_speech_request_validation() {
        let ok = request(json!({ "text": " hello ", "voice_id": "  " }));
        assert!(ok.validate().is_ok());
        assert_eq!(ok.text, "hello");
        assert_eq!(ok.voice_id, None, "空白 voice_id 使用默认声音");

        assert!(request(json!({ "text": "   " })).validate().is_err());
        assert!(request(json!({ "text": "x".repeat(5001) })).validate().is_err());
        assert!(request(json!({ "text": "hi", "voice_id": "a/b" })).validate().is_err());
    }
}
