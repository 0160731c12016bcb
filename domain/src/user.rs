//! Identity resolution and lite user search.

use crate::error::Error;
use crate::jwt;
use entity::users::Model;
use entity_api::user;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

/// Resolves a bearer credential to a member. Any failure along the way,
/// whether a malformed or expired token or an unknown member, degrades to
/// anonymous (`None`); callers decide whether anonymous is acceptable.
pub async fn resolve(
    db: &DatabaseConnection,
    config: &Config,
    credential: &str,
) -> Option<Model> {
    let claims = match jwt::verify(config, credential) {
        Ok(claims) => claims,
        Err(err) => {
            debug!("credential rejected: {err}");
            return None;
        }
    };

    match user::find_by_member_id(db, &claims.sub).await {
        Ok(member) => Some(member),
        Err(err) => {
            debug!("credential subject {} not found: {err}", claims.sub);
            None
        }
    }
}

/// Lite search across name, company, email, contact and username. The caller
/// is excluded from the results.
pub async fn search(
    db: &DatabaseConnection,
    term: &str,
    caller_member_id: &str,
) -> Result<Vec<Model>, Error> {
    Ok(user::search(db, term, caller_member_id).await?)
}
