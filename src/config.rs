use std::env;

use crate::error::{Error, Result};

/// 运行配置，全部来自环境变量
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// 监听地址，默认 `0.0.0.0:3000`
    pub bind_addr: String,
    /// 站点对外地址，用于生成分享链接和判断 Cookie 是否需要 `Secure`
    pub site_url: String,

    pub auth_url: String,
    pub auth_anon_key: String,

    pub mail_api_key: String,
    pub mail_from: String,
    /// 联系表单的收件箱
    pub contact_inbox: String,
    pub admin_emails: Vec<String>,

    /// 未设置时禁用文本转语音
    pub tts_api_key: Option<String>,
    pub tts_voice_id: String,
}

impl Config {
    /// 从环境变量读取配置
    ///
    /// 必填：`DATABASE_URL`、`AUTH_URL`、`AUTH_ANON_KEY`、`MAIL_API_KEY`、`CONTACT_INBOX`
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: optional("STORYHUB_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            site_url: optional("SITE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            auth_url: required("AUTH_URL")?,
            auth_anon_key: required("AUTH_ANON_KEY")?,
            mail_api_key: required("MAIL_API_KEY")?,
            mail_from: optional("MAIL_FROM")
                .unwrap_or_else(|| "Stories & Tools <noreply@localhost>".to_string()),
            contact_inbox: required("CONTACT_INBOX")?,
            admin_emails: parse_list(&optional("ADMIN_EMAILS").unwrap_or_default()),
            tts_api_key: optional("TTS_API_KEY"),
            tts_voice_id: optional("TTS_VOICE_ID")
                .unwrap_or_else(|| "21m00Tcm4TlvDq8ikWAM".to_string()),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &'static str) -> Result<String> {
    optional(key).ok_or(Error::MissingEnv(key))
}

/// 解析逗号分隔的邮箱列表，统一转为小写
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}
