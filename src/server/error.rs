//! Error type for JSON API responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::pages::status_of;

/// Unified error type for API responses
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(status_of(&self.0)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::from(BuildError::NotFound("post".into()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn schema_error_maps_to_500() {
        let err = AppError::from(BuildError::Schema {
            slug: "post".into(),
            message: "missing field `title`".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn context_keeps_not_found() {
        let err = anyhow::Error::from(BuildError::NotFound("post".into())).context("loading page");
        assert_eq!(AppError(err).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn response_is_json() {
        let response = AppError(anyhow::anyhow!("boom")).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
