use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, TokenStatus};
use crate::{config::JwtConfig, state::AppState};

/// Signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl: TimeDuration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        self.sign_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn sign_at(&self, user_id: i64, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = Claims {
            user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn inspect(&self, token: &str) -> TokenStatus {
        self.inspect_at(token, OffsetDateTime::now_utc())
    }

    /// Checks signature and issuer, then compares `exp` against `now` ourselves.
    pub fn inspect_at(&self, token: &str, now: OffsetDateTime) -> TokenStatus {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let claims = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                return TokenStatus::Malformed;
            }
        };

        if claims.exp <= now.unix_timestamp() {
            debug!(user_id = claims.user_id, exp = claims.exp, "jwt expired");
            TokenStatus::Expired
        } else {
            TokenStatus::Valid(claims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn token_carries_user_id_and_one_hour_lifetime() {
        let keys = make_keys("dev-secret", "test-issuer");
        let now = OffsetDateTime::now_utc();
        let token = keys.sign_at(42, now).expect("sign");

        let claims = match keys.inspect_at(&token, now) {
            TokenStatus::Valid(c) => c,
            other => panic!("expected valid token, got {other:?}"),
        };
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.iat, now.unix_timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn expires_exactly_at_exp() {
        let keys = make_keys("dev-secret", "iss");
        let issued = OffsetDateTime::now_utc();
        let token = keys.sign_at(7, issued).expect("sign");

        let just_before = issued + TimeDuration::minutes(60) - TimeDuration::seconds(1);
        assert!(matches!(
            keys.inspect_at(&token, just_before),
            TokenStatus::Valid(_)
        ));
        assert_eq!(
            keys.inspect_at(&token, issued + TimeDuration::minutes(60)),
            TokenStatus::Expired
        );
    }

    #[test]
    fn old_token_is_expired_not_malformed() {
        let keys = make_keys("dev-secret", "iss");
        let token = keys
            .sign_at(1, OffsetDateTime::now_utc() - TimeDuration::hours(3))
            .expect("sign");
        assert_eq!(keys.inspect(&token), TokenStatus::Expired);
    }

    #[test]
    fn garbage_and_foreign_tokens_are_malformed() {
        let keys = make_keys("dev-secret", "iss");
        assert_eq!(keys.inspect("not.a.jwt"), TokenStatus::Malformed);

        let other_secret = make_keys("other-secret", "iss").sign(1).expect("sign");
        assert_eq!(keys.inspect(&other_secret), TokenStatus::Malformed);

        let other_issuer = make_keys("dev-secret", "someone-else").sign(1).expect("sign");
        assert_eq!(keys.inspect(&other_issuer), TokenStatus::Malformed);
    }

    #[test]
    fn valid_for_checks_owner() {
        let keys = make_keys("dev-secret", "iss");
        let token = keys.sign(5).expect("sign");
        assert!(keys.inspect(&token).valid_for(5).is_some());
        assert!(keys.inspect(&token).valid_for(6).is_none());
        assert!(TokenStatus::Expired.valid_for(5).is_none());
    }
}
