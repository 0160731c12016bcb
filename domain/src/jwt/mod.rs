//! Issuing and verifying live-channel session tokens.
//!
//! The WebSocket handshake cannot carry arbitrary headers from a browser, so
//! authenticated members mint a short-lived token over HTTP and present it in
//! the query string. The HS256 signing key is shared configuration with the
//! identity subsystem that issues the regular bearer tokens.

pub(crate) mod claims;

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use claims::SessionClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use entity::jwt::Jwt;

pub fn issue_live_token(config: &Config, member_id: &str) -> Result<Jwt, Error> {
    let signing_key = signing_key(config)?;

    let now = chrono::Utc::now().timestamp() as usize;
    let session_claims = SessionClaims {
        sub: member_id.to_string(),
        iat: now,
        exp: now + config.live_token_ttl_secs as usize,
    };

    let token = encode(
        &Header::default(),
        &session_claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )?;

    Ok(Jwt {
        token,
        sub: session_claims.sub,
    })
}

pub(crate) fn verify(config: &Config, token: &str) -> Result<SessionClaims, Error> {
    let signing_key = signing_key(config)?;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn signing_key(config: &Config) -> Result<String, Error> {
    config.token_signing_key().ok_or_else(|| {
        warn!("TOKEN_SIGNING_KEY is not configured");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config() -> Config {
        Config::parse_from(["domain-test"]).set_token_signing_key("test-signing-key".to_string())
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_member_id() -> Result<(), Error> {
        let config = test_config();

        let jwt = issue_live_token(&config, "SPC-20240915-a1b2c3")?;
        let claims = verify(&config, &jwt.token)?;

        assert_eq!(claims.sub, "SPC-20240915-a1b2c3");
        assert!(claims.exp > claims.iat);

        Ok(())
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let config = test_config();

        let now = chrono::Utc::now().timestamp() as usize;
        let stale_claims = SessionClaims {
            sub: "SPC-20240915-a1b2c3".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &stale_claims,
            &EncodingKey::from_secret("test-signing-key".as_bytes()),
        )
        .unwrap();

        assert!(verify(&config, &token).is_err());
    }

    #[test]
    fn tokens_signed_with_another_key_are_rejected() {
        let config = test_config();
        let other_config =
            Config::parse_from(["domain-test"]).set_token_signing_key("other-key".to_string());

        let jwt = issue_live_token(&other_config, "SPC-20240915-a1b2c3").unwrap();

        assert!(verify(&config, &jwt.token).is_err());
    }

    #[test]
    fn missing_signing_key_is_a_config_error() {
        let config = Config::parse_from(["domain-test"]);

        let result = issue_live_token(&config, "SPC-20240915-a1b2c3");

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }
}
