use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;

use crate::error::{Error, Result};

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: Email) -> Result<()>;
}

pub type DynMailer = Arc<dyn Mailer>;

const RESEND_API: &str = "https://api.resend.com/emails";

/// 基于 Resend HTTP API 的邮件发送器
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, from: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| Error::Config("MAIL_API_KEY is not a valid header value".into()))?,
        );

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
            from: from.into(),
        })
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: Email) -> Result<()> {
        let resp = self
            .client
            .post(RESEND_API)
            .json(&RequestBody {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
                text: email.text.as_deref(),
                reply_to: email.reply_to.as_deref(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Upstream {
                service: "mail",
                status: resp.status().as_u16(),
            });
        }

        tracing::debug!(to = ?email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_skips_empty_fields() {
        let to = vec!["reader@example.com".to_string()];
        let body = serde_json::to_value(RequestBody {
            from: "site <noreply@example.com>",
            to: &to,
            subject: "hi",
            html: "<p>hi</p>",
            text: None,
            reply_to: Some("writer@example.com"),
        })
        .expect("序列化失败");

        assert!(body.get("text").is_none());
        assert_eq!(body["reply_to"], "writer@example.com");
        assert_eq!(body["to"][0], "reader@example.com");
    }
}
