use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct IndexParams {
    /// Filter by read state; omit for all notifications.
    pub read: Option<bool>,
}
