//! Request extractors that reject with the failure envelope

use axum::extract::FromRequest;

use crate::data::EntityId;
use crate::error::AppError;

/// `Json<T>` whose rejection is an [`AppError::Validation`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Validate a path or body id, naming the field on failure
pub fn parse_id(raw: &str, field: &str) -> Result<String, AppError> {
    EntityId::parse(raw, field).map(|id| id.0)
}
