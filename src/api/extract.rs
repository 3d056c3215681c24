//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::error::AppError;
use crate::query::{ApiFeatures, QueryMap};

/// Extract the request query string into an [`ApiFeatures`] translator.
///
/// ```ignore
/// async fn list_tours(features: ApiFeatures) -> Result<JsonResponse<..>, AppError> {
///     let filter = features.filter()?;
///     let sort = features.sort();
///     ...
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for ApiFeatures
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(ApiFeatures::new(QueryMap::from_pairs(pairs)))
    }
}
