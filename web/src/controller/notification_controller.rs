use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_member::AuthenticatedMember, compare_api_version::CompareApiVersion,
};
use crate::params::notification::IndexParams;
use crate::{AppState, Error};
use domain::{notification as NotificationApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET the caller's Notifications
#[utoipa::path(
    get,
    path = "/notifications",
    params(
        ApiVersion,
        IndexParams
    ),
    responses(
        (status = 200, description = "Successfully retrieved Notifications, most recent first", body = [domain::notifications::Model]),
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
        "GET Notifications for {} read filter: {:?}",
        member.member_id, params.read
    );

    let notifications =
        NotificationApi::list(app_state.db_conn_ref(), &member.member_id, params.read).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}

/// POST mark one of the caller's Notifications read
#[utoipa::path(
    post,
    path = "/notifications/{id}/mark_read",
    params(
        ApiVersion,
        ("id" = sea_orm::prelude::Uuid, Path, description = "Notification id to mark read")
    ),
    responses(
        (status = 200, description = "Notification marked read; idempotent", body = domain::notifications::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Notification not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST mark Notification {id} read by {}", member.member_id);

    let notification =
        NotificationApi::mark_read(app_state.db_conn_ref(), id, &member.member_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notification)))
}

/// POST mark all of the caller's Notifications read
#[utoipa::path(
    post,
    path = "/notifications/mark_all_read",
    params(ApiVersion),
    responses(
        (status = 200, description = "All unread Notifications flipped; the body carries the affected count"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_all_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedMember(member): AuthenticatedMember,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST mark all Notifications read for {}", member.member_id);

    let marked_read =
        NotificationApi::mark_all_read(app_state.db_conn_ref(), &member.member_id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({ "marked_read": marked_read }),
    )))
}
