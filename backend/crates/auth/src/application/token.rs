//! Session Token Issuer / Verifier
//!
//! HS256 JWTs carrying [`SessionClaims`]. Stateless: nothing is stored
//! server-side and there is no revocation list.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::application::config::AuthConfig;
use crate::domain::entity::{SessionClaims, User};
use crate::domain::value_object::PermissionSet;
use crate::error::{AuthError, AuthResult};

/// Token plus the claims it was built from
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// ## Errors
    /// `Internal` if the secret is empty or the TTL does not fit a
    /// timestamp.
    pub fn new(secret: &[u8], ttl: Duration) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Internal("token secret is empty".to_string()));
        }
        if i64::try_from(ttl.as_secs()).is_err() {
            return Err(AuthError::Internal("token ttl out of range".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(&config.token_secret, config.token_ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user` with its resolved permissions
    pub fn issue(&self, user: &User, permissions: &PermissionSet) -> AuthResult<SignedToken> {
        self.issue_at(user, permissions, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_at(
        &self,
        user: &User,
        permissions: &PermissionSet,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<SignedToken> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AuthError::Internal("token ttl out of range".to_string()))?;
        let iat = issued_at.timestamp();

        let claims = SessionClaims {
            sub: user.user_id,
            email: user.email.as_str().to_string(),
            role: user.role.as_str().to_string(),
            permissions: permissions.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))?;

        Ok(SignedToken { token, claims })
    }

    /// Verify signature and expiry and return the claims
    ///
    /// ## Errors
    /// * `InvalidSignature` - content does not match the signature
    /// * `Expired` - now is at or past `exp`
    /// * `Malformed` - anything else (bad encoding, wrong algorithm, bad claims)
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                JwtErrorKind::InvalidSignature => AuthError::InvalidSignature,
                JwtErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            },
        )?;

        // jsonwebtoken accepts exp == now; a session ends at its expiry
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::fixtures::user;
    use crate::domain::value_object::Permission;

    const SECRET: &[u8] = b"test-secret-please-ignore";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::from_secs(3600)).unwrap()
    }

    fn permissions() -> PermissionSet {
        [Permission::ListUsers, Permission::CreateProduct]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(TokenIssuer::new(b"", Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_ttl_out_of_range_rejected() {
        assert!(TokenIssuer::new(SECRET, Duration::from_secs(u64::MAX)).is_err());
    }

    #[test]
    fn test_issue_and_verify() {
        let alice = user("alice@example.com", "admin");
        let signed = issuer().issue(&alice, &permissions()).unwrap();

        let claims = issuer().verify(&signed.token).unwrap();
        assert_eq!(claims, signed.claims);
        assert_eq!(claims.sub, alice.user_id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_permissions_round_trip() {
        let alice = user("alice@example.com", "admin");
        for subset in [
            PermissionSet::new(),
            permissions(),
            Permission::ALL.into_iter().collect(),
        ] {
            let signed = issuer().issue(&alice, &subset).unwrap();
            assert_eq!(issuer().verify(&signed.token).unwrap().permissions, subset);
        }
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let alice = user("alice@example.com", "customer");
        let signed = issuer().issue(&alice, &PermissionSet::new()).unwrap();

        let mut parts: Vec<String> = signed.token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let last = payload.pop().unwrap();
        payload.push(if last == 'A' { 'B' } else { 'A' });
        let tampered = parts.join(".");

        assert!(matches!(
            issuer().verify(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let alice = user("alice@example.com", "customer");
        let signed = issuer().issue(&alice, &PermissionSet::new()).unwrap();
        let other = TokenIssuer::new(b"another-secret", Duration::from_secs(3600)).unwrap();

        assert!(matches!(
            other.verify(&signed.token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let alice = user("alice@example.com", "customer");
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        let signed = issuer()
            .issue_at(&alice, &PermissionSet::new(), two_hours_ago)
            .unwrap();

        assert!(matches!(issuer().verify(&signed.token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(issuer().verify("not-a-token"), Err(AuthError::Malformed)));
        assert!(matches!(issuer().verify(""), Err(AuthError::Malformed)));
    }
}
