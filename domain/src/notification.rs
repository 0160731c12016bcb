//! Notification reads and read-state transitions for the authenticated
//! member. Creation happens server-side only, through the dispatch worker.

use crate::error::{EntityErrorKind, Error};
use entity::notifications::Model;
use entity::Id;
use entity_api::notification;
use sea_orm::DatabaseConnection;

pub async fn list(
    db: &DatabaseConnection,
    caller_member_id: &str,
    read: Option<bool>,
) -> Result<Vec<Model>, Error> {
    Ok(notification::find_by_recipient(db, caller_member_id, read).await?)
}

/// Marks one of the caller's notifications read. Already-read notifications
/// are returned unchanged; the read flag only ever moves false -> true.
pub async fn mark_read(
    db: &DatabaseConnection,
    notification_id: Id,
    caller_member_id: &str,
) -> Result<Model, Error> {
    let existing = notification::find_by_id(db, notification_id).await?;

    if existing.recipient_member_id != caller_member_id {
        return Err(Error::entity(EntityErrorKind::Unauthorized));
    }
    if existing.read {
        return Ok(existing);
    }

    Ok(notification::mark_read(db, existing).await?)
}

/// Returns how many notifications were flipped to read.
pub async fn mark_all_read(
    db: &DatabaseConnection,
    caller_member_id: &str,
) -> Result<u64, Error> {
    Ok(notification::mark_all_read(db, caller_member_id).await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn mark_read_is_idempotent_for_an_already_read_notification() -> Result<(), Error> {
        let recipient = "SPC-20240915-a1b2c3";
        let already_read = Model {
            id: Id::new_v4(),
            recipient_member_id: recipient.to_owned(),
            actor_member_id: None,
            verb: "accepted your connection request".to_owned(),
            message: "Someone accepted your connection request.".to_owned(),
            read: true,
            created_at: chrono::Utc::now().into(),
        };

        // Only the fetch hits the database; a second query would panic the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![already_read.clone()]])
            .into_connection();

        let notification = mark_read(&db, already_read.id, recipient).await?;

        assert!(notification.read);

        Ok(())
    }
}
