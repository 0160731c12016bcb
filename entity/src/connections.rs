use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An established connection between two members. Rows are only ever
/// created by accepting a connection request and are stored in canonical
/// order: `member_a < member_b` lexicographically.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[sea_orm(schema_name = "connect_platform", table_name = "connections")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    pub member_a: String,
    pub member_b: String,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub connected_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MemberA",
        to = "super::users::Column::MemberId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MemberA,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MemberB",
        to = "super::users::Column::MemberId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MemberB,
}

impl ActiveModelBehavior for ActiveModel {}
