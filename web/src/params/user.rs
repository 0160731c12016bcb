use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Search term matched against name, company, email, contact and username.
    pub q: String,
}
