use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use domain::users;
use log::*;

pub(crate) struct AuthenticatedMember(pub users::Model);

// Resolves the bearer token from the Authorization header to a member.
// Anonymous callers (missing header, malformed scheme, bad or expired token,
// unknown member) are rejected with 401 before the handler runs.
impl FromRequestParts<AppState> for AuthenticatedMember {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        match domain::user::resolve(state.db_conn_ref(), &state.config, credential).await {
            Some(member) => Ok(AuthenticatedMember(member)),
            None => {
                debug!("rejecting anonymous request");
                Err(unauthorized())
            }
        }
    }
}

fn unauthorized() -> RejectionType {
    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
}
