use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::ApiJson;
use crate::{error::Result, mail::Email, state::AppState, util::escape_html};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/contact", post(contact))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    name: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[serde(default, deserialize_with = "super::trimmed_opt")]
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    subject: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(
        min = 10,
        max = 5000,
        message = "Message must be between 10 and 5000 characters"
    ))]
    message: String,
    /// 确认邮件的语言
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    success: bool,
    message: String,
}

fn inbox_email(to: &str, msg: &ContactForm) -> Email {
    let subject = match &msg.subject {
        Some(s) => format!("Contact form: {s}"),
        None => format!("Contact form message from {}", msg.name),
    };

    Email {
        to: vec![to.to_string()],
        subject,
        html: format!(
            "<h2>New contact form message</h2>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p style=\"white-space: pre-wrap\">{}</p>",
            escape_html(&msg.name),
            escape_html(&msg.email),
            escape_html(&msg.message),
        ),
        text: Some(format!(
            "Name: {}\nEmail: {}\n\n{}",
            msg.name, msg.email, msg.message
        )),
        reply_to: Some(msg.email.clone()),
    }
}

fn confirmation_email(state: &AppState, locale: &str, msg: &ContactForm) -> Email {
    let t = state.translations();
    let greeting = t.render(
        locale,
        "contact.confirmation.greeting",
        &[("name", msg.name.as_str())],
    );
    let body = t.get(locale, "contact.confirmation.body");
    let signoff = t.get(locale, "contact.confirmation.signoff");

    Email {
        to: vec![msg.email.clone()],
        subject: t.get(locale, "contact.confirmation.subject").to_string(),
        html: format!(
            "<p>{}</p><p>{}</p><p>{}</p>",
            escape_html(&greeting),
            escape_html(body),
            escape_html(signoff)
        ),
        text: Some(format!("{greeting}\n\n{body}\n\n{signoff}")),
        reply_to: None,
    }
}

/// 联系表单：发送到站点收件箱，再给用户发确认邮件
///
/// 确认邮件发送失败只记录日志，不影响响应。
async fn contact(
    State(state): State<AppState>,
    ApiJson(msg): ApiJson<ContactForm>,
) -> Result<Json<ContactResponse>> {
    msg.validate()?;
    let locale = state
        .translations()
        .resolve_locale(msg.locale.as_deref())
        .to_string();

    state
        .mailer()
        .send(inbox_email(&state.settings().contact_inbox, &msg))
        .await?;

    if let Err(e) = state
        .mailer()
        .send(confirmation_email(&state, &locale, &msg))
        .await
    {
        tracing::warn!(error = %e, "failed to send contact confirmation email");
    }

    state
        .audit()
        .record(&msg.email, "contact.submit", json!({ "name": msg.name }));

    Ok(Json(ContactResponse {
        success: true,
        message: state.translations().get(&locale, "contact.success").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        serde_json::from_value(json!({
            "name": name,
            "email": email,
            "subject": "  ",
            "message": message,
        }))
        .expect("反序列化失败")
    }

    #[test]
    fn test_message_length_bounds() {
        assert!(form("Ada", "ada@example.com", "too short").validate().is_err());
        assert!(form("Ada", "ada@example.com", "just long enough").validate().is_ok());
        assert!(form("Ada", "ada@example.com", &"x".repeat(5001)).validate().is_err());
        assert!(form("Ada", "ada@example.com", &"x".repeat(5000)).validate().is_ok());
        assert!(
            form("Ada", "ada@example.com", "   short     ").validate().is_err(),
            "首尾空白不计入长度"
        );
    }

    #[test]
    fn test_rejects_bad_email_and_name() {
        assert!(form("Ada", "not-an-email", "a long enough message").validate().is_err());
        assert!(form(" ", "ada@example.com", "a long enough message").validate().is_err());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let msg = form("  Ada ", " ada@example.com ", " a long enough message ");
        assert!(msg.validate().is_ok());
        assert_eq!(msg.name, "Ada");
        assert_eq!(msg.email, "ada@example.com");
        assert_eq!(msg.subject, None, "空白主题视为未提供");
    }

    #[test]
    fn test_inbox_email_escapes_input() {
        let msg = form("<b>Ada</b>", "ada@example.com", "hello <script>");
        assert!(msg.validate().is_ok());
        let email = inbox_email("inbox@example.com", &msg);

        assert_eq!(email.to, vec!["inbox@example.com"]);
        assert_eq!(email.reply_to.as_deref(), Some("ada@example.com"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
    }
}
