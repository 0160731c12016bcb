use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_member::AuthenticatedMember, compare_api_version::CompareApiVersion,
};
use crate::params::connection_request::{CreateParams, IndexParams};
use crate::{AppState, Error};
use domain::error::{EntityErrorKind, Error as DomainError};
use domain::{connection_request as ConnectionRequestApi, Id};
use log::*;
use service::config::ApiVersion;

/// POST create a new ConnectionRequest
#[utoipa::path(
    post,
    path = "/connection_requests",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new ConnectionRequest", body = domain::connection_requests::Model),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A pending request or a connection already exists"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new ConnectionRequest from {}", member.member_id);

    let Some(to_member_id) = params.to_member_id.normalize() else {
        return Err(Error::from(DomainError::entity(EntityErrorKind::Invalid(
            "to_member_id must be a single member id".to_string(),
        ))));
    };

    let request = ConnectionRequestApi::create(
        app_state.db_conn_ref(),
        &member.member_id,
        to_member_id,
        params.message,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), request)))
}

/// GET the caller's ConnectionRequests
#[utoipa::path(
    get,
    path = "/connection_requests",
    params(
        ApiVersion,
        IndexParams
    ),
    responses(
        (status = 200, description = "Successfully retrieved ConnectionRequests", body = [domain::connection_requests::Model]),
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
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "GET ConnectionRequests for {} direction: {:?}",
        member.member_id, params.direction
    );

    let requests = ConnectionRequestApi::index(
        app_state.db_conn_ref(),
        &member.member_id,
        params.direction,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), requests)))
}

/// POST accept a pending ConnectionRequest addressed to the caller
#[utoipa::path(
    post,
    path = "/connection_requests/{id}/accept",
    params(
        ApiVersion,
        ("id" = sea_orm::prelude::Uuid, Path, description = "ConnectionRequest id to accept")
    ),
    responses(
        (status = 200, description = "Request accepted; the response carries the updated request and the new connection"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "ConnectionRequest not found"),
        (status = 409, description = "Request already responded to; body carries its current status"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn accept(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST accept ConnectionRequest {id} by {}", member.member_id);

    let (request, connection) = ConnectionRequestApi::accept(
        app_state.db_conn_ref(),
        &app_state.dispatch_queue,
        id,
        &member.member_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "request": request, "connection": connection }),
    )))
}

/// POST reject a pending ConnectionRequest addressed to the caller
#[utoipa::path(
    post,
    path = "/connection_requests/{id}/reject",
    params(
        ApiVersion,
        ("id" = sea_orm::prelude::Uuid, Path, description = "ConnectionRequest id to reject")
    ),
    responses(
        (status = 200, description = "Request rejected", body = domain::connection_requests::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "ConnectionRequest not found"),
        (status = 409, description = "Request already responded to; body carries its current status"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reject(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST reject ConnectionRequest {id} by {}", member.member_id);

    let request = ConnectionRequestApi::reject(
        app_state.db_conn_ref(),
        &app_state.dispatch_queue,
        id,
        &member.member_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), request)))
}
