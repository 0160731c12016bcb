//! Connection-request state machine: create, accept, reject, list.
//!
//! Accept and reject run inside a single transaction holding a row lock on
//! the request, so exactly one of two racing responders wins; the loser
//! observes the terminal status. The winner's notification is enqueued only
//! after the transaction commits.

use crate::error::{EntityErrorKind, Error};
use dispatch::{Job, JobQueue};
use entity::connection_requests::{Column, Entity, Model};
use entity::connections;
use entity::status::RequestStatus;
use entity::Id;
use entity_api::{connection, connection_request, query, user, QueryFilterMap};
use log::*;
use sea_orm::{DatabaseConnection, Order, TransactionTrait, Value};

pub use entity_api::connection_request::Direction;

pub async fn create(
    db: &DatabaseConnection,
    caller_member_id: &str,
    to_member_id: &str,
    message: String,
) -> Result<Model, Error> {
    if !user::is_valid_member_id(to_member_id) {
        return Err(Error::entity(EntityErrorKind::Invalid(
            "recipient member id is malformed".to_string(),
        )));
    }
    if to_member_id == caller_member_id {
        return Err(Error::entity(EntityErrorKind::Invalid(
            "cannot send a connection request to yourself".to_string(),
        )));
    }

    // An unknown recipient is a client input problem, not a missing resource.
    if user::find_by_member_id(db, to_member_id).await.is_err() {
        return Err(Error::entity(EntityErrorKind::Invalid(
            "User with this ID does not exist".to_string(),
        )));
    }

    if connection_request::exists_pending_pair(db, caller_member_id, to_member_id).await? {
        return Err(Error::entity(EntityErrorKind::Conflict(
            "a pending request to this member already exists".to_string(),
        )));
    }
    if connection::exists_between(db, caller_member_id, to_member_id).await? {
        return Err(Error::entity(EntityErrorKind::Conflict(
            "you are already connected with this member".to_string(),
        )));
    }

    Ok(connection_request::create(
        db,
        caller_member_id.to_owned(),
        to_member_id.to_owned(),
        message,
    )
    .await?)
}

/// Accepts a pending request addressed to the caller and returns the updated
/// request together with the resulting connection.
pub async fn accept(
    db: &DatabaseConnection,
    dispatch_queue: &JobQueue,
    request_id: Id,
    caller_member_id: &str,
) -> Result<(Model, connections::Model), Error> {
    let txn = db.begin().await?;

    let request = authorize_pending(&txn, request_id, caller_member_id).await?;

    let (member_a, member_b) =
        connection::canonical_pair(&request.from_member_id, &request.to_member_id);
    let new_connection = connection::get_or_create(&txn, member_a, member_b).await?;
    let updated = connection_request::mark_responded(&txn, request, RequestStatus::Accepted).await?;

    txn.commit().await?;

    schedule_notification(dispatch_queue, &updated, "accepted");

    Ok((updated, new_connection))
}

/// Rejects a pending request addressed to the caller.
pub async fn reject(
    db: &DatabaseConnection,
    dispatch_queue: &JobQueue,
    request_id: Id,
    caller_member_id: &str,
) -> Result<Model, Error> {
    let txn = db.begin().await?;

    let request = authorize_pending(&txn, request_id, caller_member_id).await?;
    let updated = connection_request::mark_responded(&txn, request, RequestStatus::Rejected).await?;

    txn.commit().await?;

    schedule_notification(dispatch_queue, &updated, "rejected");

    Ok(updated)
}

/// Locks the request row and checks that the caller may respond to it.
/// A dropped transaction rolls back, so early returns here are safe.
async fn authorize_pending(
    txn: &sea_orm::DatabaseTransaction,
    request_id: Id,
    caller_member_id: &str,
) -> Result<Model, Error> {
    let request = connection_request::find_by_id_locked(txn, request_id).await?;

    if request.to_member_id != caller_member_id {
        return Err(Error::entity(EntityErrorKind::Unauthorized));
    }
    if request.status != RequestStatus::Pending {
        return Err(Error::entity(EntityErrorKind::InvalidState(
            request.status.to_string(),
        )));
    }

    Ok(request)
}

/// The request path must never fail because the queue is gone; log and move on.
fn schedule_notification(dispatch_queue: &JobQueue, request: &Model, action: &str) {
    let job = Job {
        recipient: request.from_member_id.clone(),
        actor: Some(request.to_member_id.clone()),
        action: action.to_string(),
        request_id: request.id,
    };

    if let Err(err) = dispatch_queue.enqueue(job) {
        error!("failed to schedule {action} notification: {err}");
    }
}

/// Requests involving the caller, most recent first. `direction` narrows the
/// listing to requests the caller received (`incoming`) or sent (`outgoing`).
pub async fn index(
    db: &DatabaseConnection,
    caller_member_id: &str,
    direction: Option<Direction>,
) -> Result<Vec<Model>, Error> {
    let Some(direction) = direction else {
        return Ok(connection_request::find_involving(db, caller_member_id).await?);
    };

    let column_name = match direction {
        Direction::Incoming => "to_member_id",
        Direction::Outgoing => "from_member_id",
    };

    let mut query_filter_map = QueryFilterMap::new();
    query_filter_map.insert(
        column_name.to_string(),
        Some(Value::String(Some(Box::new(caller_member_id.to_owned())))),
    );

    Ok(query::find_by::<Entity, Column, _>(
        db,
        query_filter_map,
        Some((Column::CreatedAt, Order::Desc)),
    )
    .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase};

    const FROM: &str = "SPC-20240915-a1b2c3";
    const TO: &str = "SPC-20240915-d4e5f6";

    fn request_model(status: RequestStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            from_member_id: FROM.to_owned(),
            to_member_id: TO.to_owned(),
            message: "Hello!".to_owned(),
            status,
            created_at: now.into(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn accept_commits_and_schedules_the_sender_notification() -> Result<(), Error> {
        let pending = request_model(RequestStatus::Pending);
        let mut accepted = pending.clone();
        accepted.status = RequestStatus::Accepted;
        accepted.responded_at = Some(chrono::Utc::now().into());

        let new_connection = connections::Model {
            id: Id::new_v4(),
            member_a: FROM.to_owned(),
            member_b: TO.to_owned(),
            connected_at: chrono::Utc::now().into(),
        };

        // Query order: locked fetch, connection pair lookup (empty), connection
        // insert returning, request update returning.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![pending.clone()]])
            .append_query_results(vec![Vec::<connections::Model>::new()])
            .append_query_results(vec![vec![new_connection.clone()]])
            .append_query_results(vec![vec![accepted.clone()]])
            .into_connection();

        let (queue, mut rx) = dispatch::channel();

        let (request, connection) = accept(&db, &queue, pending.id, TO).await?;

        assert_eq!(request.status, RequestStatus::Accepted);
        assert!(connection.member_a < connection.member_b);

        let job = rx.recv().await.unwrap();
        assert_eq!(job.recipient, FROM);
        assert_eq!(job.actor.as_deref(), Some(TO));
        assert_eq!(job.action, "accepted");
        assert_eq!(job.request_id, pending.id);

        Ok(())
    }

    #[tokio::test]
    async fn create_conflicts_when_the_members_are_already_connected() {
        let recipient = entity::users::Model {
            id: Id::new_v4(),
            member_id: TO.to_owned(),
            username: "bob".to_owned(),
            email: "bob@spcconnect.com".to_owned(),
            full_name: "Bob Castellano".to_owned(),
            contact: "+15550101".to_owned(),
            company_name: String::new(),
            password: "hash".to_owned(),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };
        let existing_connection = connections::Model {
            id: Id::new_v4(),
            member_a: FROM.to_owned(),
            member_b: TO.to_owned(),
            connected_at: chrono::Utc::now().into(),
        };

        // Query order: recipient lookup, pending-pair probe (empty),
        // connection probe (hit).
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![recipient]])
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_results(vec![vec![existing_connection]])
            .into_connection();

        let result = create(&db, FROM, TO, "Hello again".to_owned()).await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn accept_rejects_a_caller_who_is_not_the_recipient() {
        let pending = request_model(RequestStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![pending.clone()]])
            .into_connection();

        let (queue, _rx) = dispatch::channel();

        let result = accept(&db, &queue, pending.id, FROM).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthorized))
        );
    }

    #[tokio::test]
    async fn reject_after_accept_reports_the_current_status() {
        let already_accepted = request_model(RequestStatus::Accepted);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![already_accepted.clone()]])
            .into_connection();

        let (queue, mut rx) = dispatch::channel();

        let result = reject(&db, &queue, already_accepted.id, TO).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::InvalidState(
                "accepted".to_string()
            )))
        );
        assert!(rx.try_recv().is_err(), "no notification may be scheduled");
    }
}
