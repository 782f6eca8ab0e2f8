use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;

use crate::error::{Error, Result};

/// 文本转语音服务，返回 `audio/mpeg` 音频
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<Bytes>;
}

pub type DynSpeech = Arc<dyn SpeechSynthesizer>;

const ELEVENLABS_API: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const MODEL_ID: &str = "eleven_multilingual_v2";

/// ElevenLabs 文本转语音客户端
#[derive(Clone)]
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    default_voice: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: &str, default_voice: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "xi-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| Error::Config("TTS_API_KEY is not a valid header value".into()))?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("audio/mpeg"));

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            default_voice: default_voice.into(),
        })
    }
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<Bytes> {
        let voice = voice_id.unwrap_or(&self.default_voice);

        let resp = self
            .client
            .post(format!("{ELEVENLABS_API}/{voice}"))
            .json(&RequestBody {
                text,
                model_id: MODEL_ID,
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                },
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Upstream {
                service: "speech",
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.bytes().await?)
    }
}
