//! Request extractors
//!
//! Wraps axum's JSON extractor so malformed request bodies are rejected
//! with the same `{"error": ...}` envelope as every other failure,
//! instead of axum's built-in rejection body.

use crate::types::AppError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

/// JSON body extractor whose rejection is an [`AppError::InvalidInput`].
///
/// Also usable on the response side; serialization delegates to
/// [`axum::Json`].
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::InvalidInput(rejection.body_text())),
        }
    }
}

impl<T: serde::Serialize> axum::response::IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}
