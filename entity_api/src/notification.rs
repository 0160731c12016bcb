use super::error::{EntityApiErrorKind, Error};
use crate::{query, QueryFilterMap};
use entity::notifications::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, TryIntoModel, Value,
};

pub async fn create(
    db: &impl ConnectionTrait,
    recipient_member_id: String,
    actor_member_id: Option<String>,
    verb: String,
    message: String,
) -> Result<Model, Error> {
    debug!("New Notification to be inserted for {recipient_member_id}: {verb}");

    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        recipient_member_id: Set(recipient_member_id),
        actor_member_id: Set(actor_member_id),
        verb: Set(verb),
        message: Set(message),
        read: Set(false),
        created_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// A recipient's notifications, most recent first, optionally filtered on
/// the read flag.
pub async fn find_by_recipient(
    db: &impl ConnectionTrait,
    recipient_member_id: &str,
    read: Option<bool>,
) -> Result<Vec<Model>, Error> {
    let mut query_filter_map = QueryFilterMap::new();
    query_filter_map.insert(
        "recipient_member_id".to_string(),
        Some(Value::String(Some(Box::new(
            recipient_member_id.to_owned(),
        )))),
    );
    if let Some(read) = read {
        query_filter_map.insert("read".to_string(), Some(Value::Bool(Some(read))));
    }

    query::find_by::<Entity, Column, _>(db, query_filter_map, Some((Column::CreatedAt, Order::Desc)))
        .await
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn mark_read(db: &impl ConnectionTrait, notification: Model) -> Result<Model, Error> {
    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(notification.id),
        recipient_member_id: Unchanged(notification.recipient_member_id),
        actor_member_id: Unchanged(notification.actor_member_id),
        verb: Unchanged(notification.verb),
        message: Unchanged(notification.message),
        read: Set(true),
        created_at: Unchanged(notification.created_at),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Flips every unread notification for the recipient; returns how many rows
/// changed.
pub async fn mark_all_read(
    db: &impl ConnectionTrait,
    recipient_member_id: &str,
) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::Read, sea_orm::sea_query::Expr::value(true))
        .filter(Column::RecipientMemberId.eq(recipient_member_id))
        .filter(Column::Read.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn notification_model(read: bool) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            recipient_member_id: "SPC-20240915-a1b2c3".to_owned(),
            actor_member_id: Some("SPC-20240915-d4e5f6".to_owned()),
            verb: "accepted your connection request".to_owned(),
            message: "bob accepted your connection request.".to_owned(),
            read,
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_an_unread_notification() -> Result<(), Error> {
        let model = notification_model(false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let notification = create(
            &db,
            model.recipient_member_id.clone(),
            model.actor_member_id.clone(),
            model.verb.clone(),
            model.message.clone(),
        )
        .await?;

        assert!(!notification.read);

        Ok(())
    }

    #[tokio::test]
    async fn mark_all_read_reports_affected_rows() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let affected = mark_all_read(&db, "SPC-20240915-a1b2c3").await?;

        assert_eq!(affected, 3);

        Ok(())
    }
}
