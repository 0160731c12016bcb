use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_member::AuthenticatedMember, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use domain::{connection as ConnectionApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET the caller's Connections
#[utoipa::path(
    get,
    path = "/connections",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved Connections", body = [domain::connections::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Connections for {}", member.member_id);

    let connections = ConnectionApi::list(app_state.db_conn_ref(), &member.member_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), connections)))
}

/// DELETE a Connection the caller is part of
#[utoipa::path(
    delete,
    path = "/connections/{id}",
    params(
        ApiVersion,
        ("id" = sea_orm::prelude::Uuid, Path, description = "Connection id to delete")
    ),
    responses(
        (status = 204, description = "Successfully deleted the Connection"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Connection not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Connection {id} by {}", member.member_id);

    ConnectionApi::remove(app_state.db_conn_ref(), id, &member.member_id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
