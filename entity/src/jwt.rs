use serde::Serialize;
use utoipa::ToSchema;

/// A signed live-channel credential handed back to an authenticated caller.
/// Not backed by a database table.
///
/// - `token`: the encoded JWT.
/// - `sub`: the subject (member id) so clients can read it without decoding.
#[derive(Serialize, Debug, ToSchema)]
#[schema(as = jwt::Jwt)] // OpenAPI schema
pub struct Jwt {
    pub token: String,
    pub sub: String,
}
