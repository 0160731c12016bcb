use super::error::{EntityApiErrorKind, Error};
use entity::connections::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Orders a member pair canonically: the lexicographically smaller id is
/// always `member_a`. Connections are undirected so both (x, y) and (y, x)
/// map to the same row.
pub fn canonical_pair(x: &str, y: &str) -> (String, String) {
    if x < y {
        (x.to_owned(), y.to_owned())
    } else {
        (y.to_owned(), x.to_owned())
    }
}

/// Idempotent insert of a canonical pair. A unique violation means a
/// concurrent accept already created the row, which counts as success; the
/// existing row is fetched and returned.
pub async fn get_or_create(
    db: &impl ConnectionTrait,
    member_a: String,
    member_b: String,
) -> Result<Model, Error> {
    if let Some(existing) = find_pair(db, &member_a, &member_b).await? {
        return Ok(existing);
    }

    let active_model = ActiveModel {
        member_a: Set(member_a.clone()),
        member_b: Set(member_b.clone()),
        connected_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    match active_model.insert(db).await {
        Ok(model) => Ok(model),
        Err(err) => match Error::from(err) {
            Error {
                error_kind: EntityApiErrorKind::RecordConflict,
                ..
            } => existing_pair_after_conflict(db, &member_a, &member_b).await,
            other => Err(other),
        },
    }
}

/// Recovery path when the insert lost a race: the row that won carries the
/// same canonical pair and is the correct result.
async fn existing_pair_after_conflict(
    db: &impl ConnectionTrait,
    member_a: &str,
    member_b: &str,
) -> Result<Model, Error> {
    debug!("connection ({member_a}, {member_b}) already inserted concurrently");

    find_pair(db, member_a, member_b)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

async fn find_pair(
    db: &impl ConnectionTrait,
    member_a: &str,
    member_b: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MemberA.eq(member_a))
        .filter(Column::MemberB.eq(member_b))
        .one(db)
        .await?)
}

/// True when the two members are connected, regardless of argument order.
pub async fn exists_between(db: &impl ConnectionTrait, x: &str, y: &str) -> Result<bool, Error> {
    let (member_a, member_b) = canonical_pair(x, y);
    Ok(find_pair(db, &member_a, &member_b).await?.is_some())
}

pub async fn find_by_member(
    db: &impl ConnectionTrait,
    member_id: &str,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::MemberA.eq(member_id))
                .add(Column::MemberB.eq(member_id)),
        )
        .order_by_desc(Column::ConnectedAt)
        .all(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn delete(db: &impl ConnectionTrait, connection: Model) -> Result<(), Error> {
    use sea_orm::ModelTrait;

    connection.delete(db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_orders_lexicographically() {
        let (a, b) = canonical_pair("SPC-20240915-ffffff", "SPC-20240915-000001");
        assert_eq!(a, "SPC-20240915-000001");
        assert_eq!(b, "SPC-20240915-ffffff");

        // already ordered input stays put
        let (a, b) = canonical_pair("SPC-20240101-aaaaaa", "SPC-20240915-bbbbbb");
        assert_eq!(a, "SPC-20240101-aaaaaa");
        assert_eq!(b, "SPC-20240915-bbbbbb");

        assert!(a < b);
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    #[tokio::test]
    async fn get_or_create_returns_existing_row_without_inserting() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let existing = Model {
            id: Id::new_v4(),
            member_a: "SPC-20240915-a1b2c3".to_owned(),
            member_b: "SPC-20240915-d4e5f6".to_owned(),
            connected_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()]])
            .into_connection();

        let connection = get_or_create(
            &db,
            existing.member_a.clone(),
            existing.member_b.clone(),
        )
        .await?;

        assert_eq!(connection.id, existing.id);

        Ok(())
    }

    #[tokio::test]
    async fn conflicting_insert_falls_back_to_the_winning_row() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let winner = Model {
            id: Id::new_v4(),
            member_a: "SPC-20240915-a1b2c3".to_owned(),
            member_b: "SPC-20240915-d4e5f6".to_owned(),
            connected_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![winner.clone()]])
            .into_connection();

        let connection =
            existing_pair_after_conflict(&db, &winner.member_a, &winner.member_b).await?;

        assert_eq!(connection.id, winner.id);

        Ok(())
    }

    #[tokio::test]
    async fn get_or_create_propagates_non_conflict_insert_errors() {
        // Pair lookup comes back empty, then the insert itself fails with
        // something other than a uniqueness violation
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_errors(vec![DbErr::Custom("connection reset".to_owned())])
            .into_connection();

        let err = get_or_create(
            &db,
            "SPC-20240915-a1b2c3".to_owned(),
            "SPC-20240915-d4e5f6".to_owned(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::SystemError);
    }
}
