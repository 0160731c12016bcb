use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use semver::Version;
use service::config::ApiVersion;

#[derive(Debug)]
pub(crate) struct CompareApiVersion(pub Version);

// Checks the x-version header against the set of API versions the router
// currently exposes. Requests without a parseable, supported version never
// reach a handler.
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(ApiVersion::field_name())
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Missing {} header", ApiVersion::field_name()),
                )
            })?;

        let version = Version::parse(header_value).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid {} header value", ApiVersion::field_name()),
            )
        })?;

        if !ApiVersion::versions().contains(&header_value) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version {header_value}"),
            ));
        }

        Ok(CompareApiVersion(version))
    }
}
