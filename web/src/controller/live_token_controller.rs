use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_member::AuthenticatedMember, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use domain::jwt as JwtApi;
use log::*;
use service::config::ApiVersion;

/// POST mint a short-lived live-channel token for the caller.
/// The WebSocket handshake cannot carry an Authorization header, so the
/// token is presented in the query string instead.
#[utoipa::path(
    post,
    path = "/live_tokens",
    params(ApiVersion),
    responses(
        (status = 201, description = "Successfully minted a live-channel token", body = domain::jwt::Jwt),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST mint live token for {}", member.member_id);

    let jwt = JwtApi::issue_live_token(&app_state.config, &member.member_id)?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), jwt)))
}
