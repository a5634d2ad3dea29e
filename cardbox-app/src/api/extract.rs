//! Extractors that reject with `ApiError`, so malformed paths and bodies
//! get the same error body as every other 400. JSON bodies also run their
//! `validator` rules before a handler sees them.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use cardbox_core::{CoreError, FieldError};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::error::ApiError;

pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| CoreError::Validation(field_errors(&e, None)))?;
        Ok(Self(value))
    }
}

/// A JSON array body; failing fields are keyed `<index>.<field>`.
pub struct ValidJsonList<T>(pub Vec<T>);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJsonList<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(items) = Json::<Vec<T>>::from_request(req, state).await?;
        let mut errors = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if let Err(e) = item.validate() {
                errors.extend(field_errors(&e, Some(i)));
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors).into());
        }
        Ok(Self(items))
    }
}

pub fn field_errors(errors: &ValidationErrors, index: Option<usize>) -> Vec<FieldError> {
    // Fields sorted within one item; items stay in index order.
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::new();
    for (field, errs) in fields {
        let key = match index {
            Some(i) => format!("{i}.{field}"),
            None => field.to_string(),
        };
        for err in errs.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| match &*err.code {
                    "required" => "field required".to_string(),
                    "length" => "invalid length".to_string(),
                    "range" => "value out of range".to_string(),
                    _ => "invalid value".to_string(),
                });
            out.push(FieldError::new(key.clone(), message));
        }
    }
    out
}
