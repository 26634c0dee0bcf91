use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload. The subject is the user's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

/// Signing and verification keys derived from process-wide configuration.
/// Established once at startup; never rotated mid-process.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_minutes } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: email.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %email, "jwt signed");
        Ok(token)
    }

    /// Valid only while the signature matches and `exp` lies in the future.
    /// No leeway: a purely time-and-bytes decision, no per-request state.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs(30 * 60),
        }
    }

    fn encode_claims(keys: &JwtKeys, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: "advocate@example.com".into(),
            iat: iat as usize,
            exp: exp as usize,
        };
        encode(&Header::default(), &claims, &keys.encoding).unwrap()
    }

    #[test]
    fn sign_and_verify_returns_subject() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("advocate@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "advocate@example.com");
    }

    #[test]
    fn token_survives_a_restart_with_the_same_secret() {
        let before = make_keys("same-secret");
        let after = make_keys("same-secret");
        let token = before.sign("pm@example.com").expect("sign");
        assert_eq!(after.verify(&token).expect("verify").sub, "pm@example.com");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("secret-a");
        let other = make_keys("secret-b");
        let token = keys.sign("advocate@example.com").expect("sign");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = encode_claims(&keys, now - 120, now - 60);
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_accepts_token_shortly_before_expiry() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = encode_claims(&keys, now, now + 60);
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn verify_rejects_token_one_second_past_expiry() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        // exp strictly in the past relative to verification time
        let token = encode_claims(&keys, now - 1800, now - 1);
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("advocate@example.com").expect("sign");

        let (head, sig) = token.rsplit_once('.').expect("compact jwt");
        let mut sig_bytes = sig.as_bytes().to_vec();
        sig_bytes[0] = if sig_bytes[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{head}.{}", String::from_utf8(sig_bytes).unwrap());

        assert_ne!(tampered, token);
        assert!(keys.verify(&tampered).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("advocate@example.com").expect("sign");

        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims {
            sub: "pm@example.com".into(),
            iat: 0,
            exp: usize::MAX / 2,
        };
        let forged_payload = {
            use base64ct::{Base64UrlUnpadded, Encoding};
            Base64UrlUnpadded::encode_string(&serde_json::to_vec(&forged_claims).unwrap())
        };
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(keys.verify(&forged).is_err());
    }
}
