use super::error::{EntityApiErrorKind, Error};
use entity::connection_requests::{ActiveModel, Column, Entity, Model};
use entity::status::RequestStatus;
use entity::Id;
use log::*;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TryIntoModel,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// Which side of a request the caller is on when listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

pub async fn create(
    db: &impl ConnectionTrait,
    from_member_id: String,
    to_member_id: String,
    message: String,
) -> Result<Model, Error> {
    debug!("New ConnectionRequest to be inserted: {from_member_id} -> {to_member_id}");

    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        from_member_id: Set(from_member_id),
        to_member_id: Set(to_member_id),
        message: Set(message),
        status: Set(RequestStatus::Pending),
        created_at: Set(now.into()),
        responded_at: Set(None),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Fetches the request row under `SELECT ... FOR UPDATE`. Must run inside a
/// transaction; concurrent accept/reject calls for the same id serialize on
/// this row lock.
pub async fn find_by_id_locked(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

pub async fn exists_pending_pair(
    db: &impl ConnectionTrait,
    from_member_id: &str,
    to_member_id: &str,
) -> Result<bool, Error> {
    Ok(Entity::find()
        .filter(Column::FromMemberId.eq(from_member_id))
        .filter(Column::ToMemberId.eq(to_member_id))
        .filter(Column::Status.eq(RequestStatus::Pending))
        .one(db)
        .await?
        .is_some())
}

/// Moves a pending request to a terminal status and stamps `responded_at`.
pub async fn mark_responded(
    db: &impl ConnectionTrait,
    request: Model,
    status: RequestStatus,
) -> Result<Model, Error> {
    debug!(
        "ConnectionRequest {} transitioning {} -> {status}",
        request.id, request.status
    );

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(request.id),
        from_member_id: Unchanged(request.from_member_id),
        to_member_id: Unchanged(request.to_member_id),
        message: Unchanged(request.message),
        status: Set(status),
        created_at: Unchanged(request.created_at),
        responded_at: Set(Some(chrono::Utc::now().into())),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// All requests where the member is sender or recipient, most recent first.
pub async fn find_involving(
    db: &impl ConnectionTrait,
    member_id: &str,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::FromMemberId.eq(member_id))
                .add(Column::ToMemberId.eq(member_id)),
        )
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request_model(status: RequestStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            from_member_id: "SPC-20240915-a1b2c3".to_owned(),
            to_member_id: "SPC-20240915-d4e5f6".to_owned(),
            message: "Hello!".to_owned(),
            status,
            created_at: now.into(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_pending_request() -> Result<(), Error> {
        let model = request_model(RequestStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let request = create(
            &db,
            model.from_member_id.clone(),
            model.to_member_id.clone(),
            model.message.clone(),
        )
        .await?;

        assert_eq!(request.status, RequestStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_locked_returns_error_when_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id_locked(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn mark_responded_sets_terminal_status() -> Result<(), Error> {
        let pending = request_model(RequestStatus::Pending);
        let mut accepted = pending.clone();
        accepted.status = RequestStatus::Accepted;
        accepted.responded_at = Some(chrono::Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![accepted.clone()]])
            .into_connection();

        let request = mark_responded(&db, pending, RequestStatus::Accepted).await?;

        assert_eq!(request.status, RequestStatus::Accepted);
        assert!(request.responded_at.is_some());

        Ok(())
    }
}
