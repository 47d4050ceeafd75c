use std::fmt;

use anyhow::anyhow;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::JwtConfig;

/// Why a token was rejected. Only for logs; callers see [`InvalidToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFault {
    Malformed,
    Signature,
    Algorithm,
    MissingClaim,
    Expired,
}

impl fmt::Display for TokenFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenFault::Malformed => "malformed",
            TokenFault::Signature => "signature mismatch",
            TokenFault::Algorithm => "algorithm mismatch",
            TokenFault::MissingClaim => "missing claim",
            TokenFault::Expired => "expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("invalid token")]
pub struct InvalidToken {
    reason: TokenFault,
}

impl InvalidToken {
    fn new(reason: TokenFault) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> TokenFault {
        self.reason
    }
}

impl From<jsonwebtoken::errors::Error> for InvalidToken {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let reason = match err.kind() {
            ErrorKind::InvalidSignature => TokenFault::Signature,
            ErrorKind::InvalidAlgorithm => TokenFault::Algorithm,
            ErrorKind::ExpiredSignature => TokenFault::Expired,
            ErrorKind::MissingRequiredClaim(_) => TokenFault::MissingClaim,
            _ => TokenFault::Malformed,
        };
        Self::new(reason)
    }
}

/// Issues and validates access tokens. Build once at start-up.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::seconds(cfg.ttl_minutes.saturating_mul(60)),
        }
    }

    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: &str, now: OffsetDateTime) -> anyhow::Result<String> {
        let expires = now
            .checked_add(self.ttl)
            .ok_or_else(|| anyhow!("token expiry out of range"))?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: expires.unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(sub = %subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.decode_at(token, OffsetDateTime::now_utc())
    }

    /// Verifies signature and algorithm, then requires `exp` to be strictly
    /// after `now`. No leeway.
    pub fn decode_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        // exp is checked below against `now`, not the library's clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if claims.exp <= now.unix_timestamp() {
            return Err(InvalidToken::new(TokenFault::Expired));
        }
        debug!(sub = %claims.sub, "jwt verified");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service(secret: &str, algorithm: Algorithm, ttl_minutes: i64) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.into(),
            algorithm,
            ttl_minutes,
        })
    }

    #[test]
    fn issue_then_decode_returns_subject() {
        let tokens = make_service("dev-secret", Algorithm::HS256, 30);
        for sub in ["a@x.com", "", "ünïcode@例え.jp"] {
            let token = tokens.issue(sub).expect("sign");
            let claims = tokens.decode(&token).expect("verify");
            assert_eq!(claims.sub, sub);
            assert_eq!(claims.exp - claims.iat, 30 * 60);
        }
    }

    #[test]
    fn oversized_lifetime_fails_to_issue_instead_of_panicking() {
        for ttl_minutes in [i64::MAX, 10_000_000_000] {
            let tokens = make_service("dev-secret", Algorithm::HS256, ttl_minutes);
            assert!(tokens.issue("a@x.com").is_err(), "ttl {ttl_minutes} issued a token");
        }
    }

    #[test]
    fn token_is_valid_until_expiry_and_not_after() {
        let tokens = make_service("dev-secret", Algorithm::HS384, 30);
        let issued = OffsetDateTime::now_utc();
        let token = tokens.issue_at("a@x.com", issued).expect("sign");

        let before = issued + Duration::minutes(29);
        assert!(tokens.decode_at(&token, before).is_ok());

        let after = issued + Duration::minutes(31);
        let err = tokens.decode_at(&token, after).unwrap_err();
        assert_eq!(err.reason(), TokenFault::Expired);
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let tokens = make_service("dev-secret", Algorithm::HS256, 1);
        let issued = OffsetDateTime::now_utc();
        let token = tokens.issue_at("a@x.com", issued).expect("sign");
        assert!(tokens.decode_at(&token, issued + Duration::minutes(1)).is_err());
    }

    #[test]
    fn flipping_any_signature_char_is_rejected() {
        let tokens = make_service("dev-secret", Algorithm::HS256, 30);
        let token = tokens.issue("a@x.com").expect("sign");
        let sig_start = token.rfind('.').expect("three segments") + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(tokens.decode(&tampered).is_err(), "tampered at {i} accepted");
        }
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let ours = make_service("our-secret", Algorithm::HS256, 30);
        let theirs = make_service("their-secret", Algorithm::HS256, 30);
        let token = theirs.issue("a@x.com").expect("sign");
        let err = ours.decode(&token).unwrap_err();
        assert_eq!(err.reason(), TokenFault::Signature);
    }

    #[test]
    fn rejects_token_signed_with_other_algorithm() {
        let ours = make_service("same-secret", Algorithm::HS256, 30);
        let theirs = make_service("same-secret", Algorithm::HS512, 30);
        let token = theirs.issue("a@x.com").expect("sign");
        let err = ours.decode(&token).unwrap_err();
        assert_eq!(err.reason(), TokenFault::Algorithm);
    }

    #[test]
    fn garbage_input_is_rejected_without_panicking() {
        let tokens = make_service("dev-secret", Algorithm::HS256, 30);
        for raw in ["", ".", "a.b", "a.b.c", "not a token", "eyJ.eyJ.sig", "💥.💥.💥"] {
            let err = tokens.decode(raw).unwrap_err();
            assert_eq!(err.to_string(), "invalid token");
        }
    }

    #[test]
    fn error_message_does_not_reveal_cause() {
        let tokens = make_service("dev-secret", Algorithm::HS256, 1);
        let issued = OffsetDateTime::now_utc() - Duration::hours(1);
        let expired = tokens.issue_at("a@x.com", issued).expect("sign");
        let expired_err = tokens.decode(&expired).unwrap_err();
        let garbage_err = tokens.decode("garbage").unwrap_err();
        assert_eq!(expired_err.to_string(), garbage_err.to_string());
        assert_ne!(expired_err.reason(), garbage_err.reason());
    }
}
