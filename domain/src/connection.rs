//! Established connections: listing and unilateral removal.

use crate::error::{EntityErrorKind, Error};
use entity::connections::Model;
use entity::Id;
use entity_api::connection;
use log::*;
use sea_orm::DatabaseConnection;

pub async fn list(db: &DatabaseConnection, caller_member_id: &str) -> Result<Vec<Model>, Error> {
    Ok(connection::find_by_member(db, caller_member_id).await?)
}

/// Removes a connection the caller is part of. Either member may remove it,
/// immediately and without consent from the other side.
pub async fn remove(
    db: &DatabaseConnection,
    connection_id: Id,
    caller_member_id: &str,
) -> Result<(), Error> {
    let existing = connection::find_by_id(db, connection_id).await?;

    if existing.member_a != caller_member_id && existing.member_b != caller_member_id {
        warn!("member {caller_member_id} attempted to remove connection {connection_id}");
        return Err(Error::entity(EntityErrorKind::Unauthorized));
    }

    Ok(connection::delete(db, existing).await?)
}
