use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{HeaderMap, HeaderValue},
};
use serde::Serialize;

use super::{AuthProvider, AuthUser, Session};
use crate::error::{Error, Result};

/// 托管认证服务的 HTTP 客户端
///
/// 请求统一携带 `apikey` 头，`base_url` 形如 `https://<project>.example.co/auth/v1`。
#[derive(Clone)]
pub struct HostedAuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl HostedAuthClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key)
                .map_err(|_| Error::Config("AUTH_ANON_KEY is not a valid header value".into()))?,
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
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<&'a str>,
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Session> {
        let resp = self
            .client
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "pkce")])
            .json(&PkceGrant {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Upstream {
                service: "auth",
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let resp = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(Some(resp.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(Error::Upstream {
                service: "auth",
                status: status.as_u16(),
            }),
        }
    }
}
