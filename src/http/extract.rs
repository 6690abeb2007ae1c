use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::http::error::ApiError;
use crate::http::state::AppState;

/// The customer id carried by the request's bearer token. Adding this
/// extractor to a handler is what gates the route behind authentication.
pub struct CurrentCustomer(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for CurrentCustomer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let customer_id = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(CurrentCustomer(customer_id))
    }
}
