use crate::{error::Error, QueryFilterMap};
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder};

/// Find all records of an entity matching the given query filter map,
/// optionally ordered by a single column.
pub async fn find_by<E, C, D>(
    db: &D,
    query_filter_map: QueryFilterMap,
    order_by: Option<(C, Order)>,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait,
    C: ColumnTrait + IntoEnumIterator,
    D: ConnectionTrait,
{
    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    if let Some((column, order)) = order_by {
        query = query.order_by(column, order);
    }

    Ok(query.all(db).await?)
}
