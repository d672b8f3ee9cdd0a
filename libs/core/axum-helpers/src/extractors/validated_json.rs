//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Deserializes the body, then runs the `validator` crate's `Validate` rules.
/// Rejections are returned before the handler body runs:
/// - malformed JSON: 400 `INVALID_JSON`
/// - JSON that does not fit `T` (missing or mistyped field): 400 `VALIDATION_ERROR`
/// - body that fails validation: 400 `VALIDATION_ERROR` with per-field `details`
/// - wrong content type: 415 `JSON_EXTRACTION`
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct Search {
///     #[validate(length(min = 1))]
///     query: String,
/// }
///
/// async fn search(ValidatedJson(payload): ValidatedJson<Search>) -> String {
///     payload.query
/// }
///
/// let app = Router::new().route("/search", post(search));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
