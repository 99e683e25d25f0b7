//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::response::ApiError;

/// Session handle id from a `/:session_id` segment
#[derive(Debug, Clone, Copy)]
pub struct SessionIdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for SessionIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        raw.parse()
            .map(SessionIdPath)
            .map_err(|_| ApiError::invalid_path("Invalid session_id format"))
    }
}
