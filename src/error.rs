use std::{io, num::TryFromIntError};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use serde::Serialize;
use validator::ValidationErrors;

pub type Result<T> = core::result::Result<T, Error>;

/// 面向客户端的错误，消息会原样返回给调用方。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    TooManyRequests(&'static str),

    #[error("{0}")]
    Unavailable(&'static str),
}

impl ApiError {
    /// 构造一个 400 校验错误
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    IntRange(#[from] TryFromIntError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text()).into()
    }
}

/// 取字段名最小的那条校验错误作为响应消息，保证同一请求返回的消息稳定
impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .and_then(|(field, errors)| {
                errors.first().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .unwrap_or_else(|| "Invalid request".to_string());
        ApiError::Validation(message).into()
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.to_string()).into()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

const INTERNAL: &str = "Internal server error";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::ApiError(api_error) => {
                let status = match &api_error {
                    ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                    ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ApiError::NotFound => StatusCode::NOT_FOUND,
                    ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
                    ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                json_error(status, &api_error.to_string())
            }
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
            Error::Reqwest(e) => {
                tracing::error!(%e, "upstream request error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
            e @ Error::Upstream { .. } => {
                tracing::error!(%e, "upstream service error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
            e => {
                tracing::error!(%e, "unexpected error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (Error::from(ApiError::invalid("bad")), StatusCode::BAD_REQUEST),
            (
                Error::from(ApiError::Unauthorized("Authentication required")),
                StatusCode::UNAUTHORIZED,
            ),
            (Error::from(ApiError::Forbidden("nope")), StatusCode::FORBIDDEN),
            (Error::from(ApiError::NotFound), StatusCode::NOT_FOUND),
            (
                Error::from(ApiError::TooManyRequests("slow down")),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                Error::Upstream {
                    service: "mail",
                    status: 502,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::MissingEnv("DATABASE_URL"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let resp = Error::Config("secret detail".to_string()).into_response();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("读取数据失败");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("反序列化失败");
        assert_eq!(json["error"], "Internal server error");
    }

    #[derive(validator::Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validation_errors_message() {
        use validator::Validate;

        let form = Form {
            name: String::new(),
            email: "nope".to_string(),
        };
        let err = Error::from(form.validate().expect_err("校验应失败"));
        assert!(
            matches!(&err, Error::ApiError(ApiError::Validation(m)) if m == "email is invalid"),
            "按字段名取第一条错误，没有自定义消息时使用字段名: {err}"
        );

        let form = Form {
            name: String::new(),
            email: "ada@example.com".to_string(),
        };
        let err = Error::from(form.validate().expect_err("校验应失败"));
        assert_eq!(err.to_string(), "Name is required");
    }
}
