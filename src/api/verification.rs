use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::{ApiJson, ApiQuery};
use crate::{
    audit::{AuditEntry, MAX_ENTRIES},
    auth::AuthUser,
    error::{ApiError, Result},
    mail::Email,
    state::AppState,
    util::escape_html,
    verification::CodeCheck,
};

const DEFAULT_AUDIT_ENTRIES: usize = 100;

/// 管理员验证码与审计日志。
///
/// - `POST /send-verification`：向管理员邮箱发送验证码
/// - `POST /verify-code`：校验验证码
/// - `GET /admin/audit-log`：查看审计日志
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/send-verification", post(send_verification))
        .route("/verify-code", post(verify_code))
        .route("/admin/audit-log", get(audit_log))
}

#[derive(Debug, Serialize)]
pub struct Ack {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(email(message = "A valid email is required"))]
    email: String,
}

async fn send_verification(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendRequest>,
) -> Result<Json<Ack>> {
    body.validate()?;
    let email = body.email.to_lowercase();

    if !state.settings().is_admin(Some(email.as_str())) {
        state
            .audit()
            .record(&email, "verification.denied", json!({}));
        return Err(ApiError::Forbidden("Email is not authorized for admin access").into());
    }

    let Some(code) = state.verification().issue(&email) else {
        state
            .audit()
            .record(&email, "verification.throttled", json!({}));
        return Err(ApiError::TooManyRequests(
            "Please wait before requesting another code",
        )
        .into());
    };
    let t = state.translations();
    let text = t.render("en", "verification.body", &[("code", code.as_str())]);

    state
        .mailer()
        .send(Email {
            to: vec![email.clone()],
            subject: t.get("en", "verification.subject").to_string(),
            html: format!("<p>{}</p>", escape_html(&text)),
            text: Some(text),
            reply_to: None,
        })
        .await?;

    state.audit().record(&email, "verification.sent", json!({}));

    Ok(Json(Ack {
        success: true,
        message: "Verification code sent",
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Verification code is required"))]
    code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    success: bool,
    verified: bool,
}

async fn verify_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    body.validate()?;
    let email = body.email.to_lowercase();

    match state.verification().verify(&email, &body.code) {
        CodeCheck::Valid => {
            state.audit().record(&email, "verification.succeeded", json!({}));
            Ok(Json(VerifyResponse {
                success: true,
                verified: true,
            }))
        }
        check => {
            state.audit().record(
                &email,
                "verification.failed",
                json!({ "reason": format!("{check:?}").to_lowercase() }),
            );
            Err(ApiError::Unauthorized("Invalid or expired verification code").into())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuditParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

/// 最近的审计记录，新的在前；仅管理员可见
async fn audit_log(
    ApiQuery(params): ApiQuery<AuditParams>,
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AuditLog>> {
    if !state.settings().is_admin(user.email.as_deref()) {
        return Err(ApiError::Forbidden("Admin access required").into());
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_AUDIT_ENTRIES)
        .clamp(1, MAX_ENTRIES);

    Ok(Json(AuditLog {
        entries: state.audit().recent(limit),
    }))
}
