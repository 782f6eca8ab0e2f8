use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    audit::{DynAudit, MemoryAuditSink},
    auth::{DynAuth, HostedAuthClient},
    config::Config,
    content::Catalog,
    error::Result,
    mail::{DynMailer, ResendMailer},
    speech::{DynSpeech, ElevenLabsSynthesizer},
    storage::DBPool,
    util::Translations,
    verification::VerificationCodes,
};

/// 与外部服务无关的站点设置
#[derive(Debug, Clone)]
pub struct Settings {
    /// 站点对外地址，不带结尾 `/`
    pub site_url: String,
    /// 管理员邮箱，小写
    pub admin_emails: Vec<String>,
    pub contact_inbox: String,
}

impl Settings {
    pub fn is_admin(&self, email: Option<&str>) -> bool {
        email
            .map(|e| e.trim().to_lowercase())
            .is_some_and(|e| self.admin_emails.contains(&e))
    }

    /// 站点以 https 对外提供服务时，Cookie 需要 `Secure`
    pub fn secure_cookies(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

/// 外部服务客户端
pub struct Providers {
    pub auth: DynAuth,
    pub mailer: DynMailer,
    /// 未配置时文本转语音接口返回 503
    pub speech: Option<DynSpeech>,
    pub audit: DynAudit,
}

/// 应用程序上下文
///
/// [`AppState`] 持有数据库连接池、外部服务客户端以及进程内的审计日志和验证码，
/// 处理函数只通过它访问共享资源。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: DBPool,
    auth: DynAuth,
    mailer: DynMailer,
    speech: Option<DynSpeech>,
    audit: DynAudit,
    verification: Arc<VerificationCodes>,
    catalog: Arc<Catalog>,
    translations: Arc<Translations>,
    settings: Arc<Settings>,
}

impl AppState {
    /// 创建一个新的 [`AppState`]，同时解析内置的目录和翻译文件
    pub fn new(pool: DBPool, settings: Settings, providers: Providers) -> Result<Self> {
        Ok(Self {
            pool,
            auth: providers.auth,
            mailer: providers.mailer,
            speech: providers.speech,
            audit: providers.audit,
            verification: Arc::new(VerificationCodes::default()),
            catalog: Arc::new(Catalog::bundled()?),
            translations: Arc::new(Translations::bundled()?),
            settings: Arc::new(settings),
        })
    }

    /// 根据配置创建真实的外部服务客户端
    pub fn from_config(pool: DBPool, config: &Config) -> Result<Self> {
        let speech = match &config.tts_api_key {
            Some(key) => Some(
                Arc::new(ElevenLabsSynthesizer::new(key, &config.tts_voice_id)?) as DynSpeech,
            ),
            None => {
                tracing::warn!("TTS_API_KEY not set, text-to-speech is disabled");
                None
            }
        };

        let providers = Providers {
            auth: Arc::new(HostedAuthClient::new(
                &config.auth_url,
                &config.auth_anon_key,
            )?),
            mailer: Arc::new(ResendMailer::new(
                &config.mail_api_key,
                &config.mail_from,
            )?),
            speech,
            audit: Arc::new(MemoryAuditSink::new()),
        };

        let settings = Settings {
            site_url: config.site_url.clone(),
            admin_emails: config.admin_emails.clone(),
            contact_inbox: config.contact_inbox.clone(),
        };

        Self::new(pool, settings, providers)
    }

    pub fn pool(&self) -> &DBPool {
        &self.pool
    }

    pub fn auth(&self) -> &DynAuth {
        &self.auth
    }

    pub fn mailer(&self) -> &DynMailer {
        &self.mailer
    }

    pub fn speech(&self) -> Option<&DynSpeech> {
        self.speech.as_ref()
    }

    pub fn audit(&self) -> &DynAudit {
        &self.audit
    }

    pub fn verification(&self) -> &VerificationCodes {
        &self.verification
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin_ignores_case() {
        let settings = Settings {
            site_url: "https://stories.example.com".to_string(),
            admin_emails: vec!["admin@example.com".to_string()],
            contact_inbox: "inbox@example.com".to_string(),
        };

        assert!(settings.is_admin(Some(" Admin@Example.com")));
        assert!(!settings.is_admin(Some("reader@example.com")));
        assert!(!settings.is_admin(None));
        assert!(settings.secure_cookies());
    }
}
