use serde::{Deserialize, Serialize};

/// Claims carried by a live-channel session token. `sub` is the member id;
/// `exp` is enforced on verification.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}
