use domain::connection_request::Direction;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// The recipient field as clients actually send it: either a scalar member
/// id or a one-element list. Longer lists are rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MemberIdParam {
    One(String),
    Many(Vec<String>),
}

impl MemberIdParam {
    pub fn normalize(&self) -> Option<&str> {
        match self {
            MemberIdParam::One(member_id) => Some(member_id),
            MemberIdParam::Many(member_ids) if member_ids.len() == 1 => {
                Some(member_ids[0].as_str())
            }
            MemberIdParam::Many(_) => None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParams {
    pub to_member_id: MemberIdParam,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct IndexParams {
    /// Narrow the listing to requests the caller received or sent.
    pub direction: Option<Direction>,
}
