use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_member::AuthenticatedMember, compare_api_version::CompareApiVersion,
};
use crate::params::user::SearchParams;
use crate::{AppState, Error};
use domain::user as UserApi;
use log::*;
use service::config::ApiVersion;

/// GET search for members to connect with
#[utoipa::path(
    get,
    path = "/users/search",
    params(
        ApiVersion,
        SearchParams
    ),
    responses(
        (status = 200, description = "Successfully retrieved matching users, excluding the caller", body = [domain::users::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn search(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET search users for {}", member.member_id);

    let users = UserApi::search(app_state.db_conn_ref(), &params.q, &member.member_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), users)))
}
