use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};

use super::ApiQuery;
use crate::{
    error::{ApiError, Result},
    state::AppState,
    util::currency,
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/tools/currency", get(convert_currency))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConvertParams {
    amount: Option<f64>,
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
pub struct Conversion {
    amount: f64,
    from: String,
    to: String,
    rate: f64,
    result: f64,
}

fn unsupported(code: &str) -> ApiError {
    let supported = currency::supported().collect::<Vec<_>>().join(", ");
    ApiError::invalid(format!(
        "Unsupported currency '{code}', expected one of: {supported}"
    ))
}

/// 货币换算
async fn convert_currency(ApiQuery(params): ApiQuery<ConvertParams>) -> Result<Json<Conversion>> {
    let amount = params
        .amount
        .filter(|a| a.is_finite() && *a >= 0.0)
        .ok_or_else(|| ApiError::invalid("amount must be a non-negative number"))?;

    let from = params.from.trim().to_uppercase();
    let to = params.to.trim().to_uppercase();

    let rate = currency::convert(1.0, &from, &to).ok_or_else(|| {
        if currency::rate(&from).is_none() {
            unsupported(&from)
        } else {
            unsupported(&to)
        }
    })?;
    let result = currency::convert(amount, &from, &to).ok_or_else(|| unsupported(&to))?;

    Ok(Json(Conversion {
        amount,
        from,
        to,
        rate,
        result,
    }))
}
