use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use crate::sources::SourceError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream { context: &'static str, source: SourceError },
    Unavailable(&'static str),
}

impl ApiError {
    pub fn upstream(context: &'static str) -> impl FnOnce(SourceError) -> ApiError {
        move |source| {
            tracing::error!("{}: {}", context, source);
            ApiError::Upstream { context, source }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg) => json!({ "error": msg }),
            ApiError::Upstream { context, source } => json!({ "error": context, "details": source.to_string() }),
            ApiError::Unavailable(what) => json!({ "error": format!("{} is not configured", what) }),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unavailable("0x gasless relay").status(), StatusCode::SERVICE_UNAVAILABLE);
        let upstream = ApiError::upstream("Failed to fetch token balances")(SourceError::RateLimit);
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
