use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::users::{ActiveModel, Column, Entity, Model};
use log::*;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set, TryIntoModel,
};

/// Upper bound on collision retries when minting a new member id. The id
/// space is 16^6 per day so collisions are rare; hitting the bound means
/// something is wrong with the RNG or the table.
const MEMBER_ID_ATTEMPTS: usize = 10;

/// Number of results a lite search will return at most.
const SEARCH_LIMIT: u64 = 50;

/// Mints a candidate member id of the form `SPC-YYYYMMDD-xxxxxx` where the
/// suffix is 6 lowercase hex characters.
pub fn generate_member_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x0100_0000);
    format!("SPC-{}-{:06x}", Utc::now().format("%Y%m%d"), suffix)
}

/// Validates the member id wire format: `SPC-<8 digits>-<6 lowercase hex>`.
pub fn is_valid_member_id(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(prefix), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == "SPC"
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == 6
        && suffix
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {}", user_model.username);

    let now = Utc::now();
    let member_id = generate_unique_member_id(db).await?;

    let user_active_model: ActiveModel = ActiveModel {
        member_id: Set(member_id),
        username: Set(user_model.username),
        email: Set(user_model.email),
        full_name: Set(user_model.full_name),
        contact: Set(user_model.contact),
        company_name: Set(user_model.company_name),
        password: Set(user_model.password),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.save(db).await?.try_into_model()?)
}

async fn generate_unique_member_id(db: &impl ConnectionTrait) -> Result<String, Error> {
    for _ in 0..MEMBER_ID_ATTEMPTS {
        let candidate = generate_member_id();

        let taken = Entity::find()
            .filter(Column::MemberId.eq(&candidate))
            .one(db)
            .await?
            .is_some();

        if !taken {
            return Ok(candidate);
        }
    }

    error!("exhausted member id generation attempts");
    Err(Error {
        source: None,
        error_kind: EntityApiErrorKind::SystemError,
    })
}

pub async fn find_by_member_id(db: &impl ConnectionTrait, member_id: &str) -> Result<Model, Error> {
    Entity::find()
        .filter(Column::MemberId.eq(member_id))
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// Lite search across the human-readable user fields, excluding the caller.
pub async fn search(
    db: &impl ConnectionTrait,
    term: &str,
    exclude_member_id: &str,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::FullName.contains(term))
                .add(Column::CompanyName.contains(term))
                .add(Column::Email.contains(term))
                .add(Column::Contact.contains(term))
                .add(Column::Username.contains(term)),
        )
        .filter(Column::MemberId.ne(exclude_member_id))
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?)
}
