//! Error-to-response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use glimpse_shared::AppError;
use serde_json::json;
use tracing::error;

/// An [`AppError`] on its way out as an HTTP response.
///
/// Renders `{"error": <code>, "detail": <message>}` with the mapped status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "detail": self.0.detail(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound("Post not found".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::Forbidden("nope".into()), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(AppError::Timeout("slow".into()), StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT")]
    #[case(AppError::PayloadTooLarge("big".into()), StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")]
    #[case(AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")]
    #[tokio::test]
    async fn test_error_body(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let detail = err.detail().to_string();
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), status);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], code);
        assert_eq!(json["detail"], detail);
    }
}
