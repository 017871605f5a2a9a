//! Auth Middleware
//!
//! Per-route gate: extract token → verify → check guard → admit or deny.
//! The gate never touches the database; everything it needs is in the
//! token.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;

use crate::application::token::TokenIssuer;
use crate::domain::entity::SessionClaims;
use crate::domain::value_object::{Permission, UserId};
use crate::error::{AuthError, AuthResult};

/// What a route requires of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Any valid session
    Authenticated,
    /// Session whose role is exactly this name
    Role(String),
    /// Session whose permission snapshot contains this permission
    Permission(Permission),
}

impl Guard {
    pub fn role(name: impl Into<String>) -> Self {
        Guard::Role(name.into())
    }

    pub fn admits(&self, claims: &SessionClaims) -> bool {
        match self {
            Guard::Authenticated => true,
            Guard::Role(name) => claims.has_role(name),
            Guard::Permission(permission) => claims.has_permission(*permission),
        }
    }
}

/// Verified identity of the current request
///
/// Inserted into request extensions by [`require_guard`]; read-only.
#[derive(Debug, Clone)]
pub struct AuthContext(Arc<SessionClaims>);

impl AuthContext {
    pub fn new(claims: SessionClaims) -> Self {
        Self(Arc::new(claims))
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.0
    }

    pub fn user_id(&self) -> UserId {
        self.0.sub
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    /// Fails closed when no gate ran in front of the handler
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Token extraction and verification shared by every guarded route
#[derive(Clone)]
pub struct Gate {
    tokens: Arc<TokenIssuer>,
    cookie_name: Arc<str>,
}

impl Gate {
    pub fn new(tokens: Arc<TokenIssuer>, cookie_name: &str) -> Self {
        Self {
            tokens,
            cookie_name: Arc::from(cookie_name),
        }
    }

    /// `authToken` cookie first, then `Authorization: Bearer`
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        platform::cookie::extract_cookie(headers, &self.cookie_name)
            .or_else(|| platform::cookie::extract_bearer_token(headers))
    }

    /// Decide on a request
    ///
    /// * no token → `MissingToken` (401)
    /// * verification failure → `InvalidSignature` / `Expired` / `Malformed` (401)
    /// * guard mismatch → `Forbidden` (403)
    pub fn authorize(&self, token: Option<&str>, guard: &Guard) -> AuthResult<AuthContext> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify(token)?;

        if !guard.admits(&claims) {
            tracing::info!(
                user_id = %claims.sub,
                role = %claims.role,
                guard = ?guard,
                "Guard rejected session"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(AuthContext::new(claims))
    }
}

/// Middleware state: the gate plus this route's guard
#[derive(Clone)]
pub struct GuardState {
    pub gate: Gate,
    pub guard: Guard,
}

impl GuardState {
    pub fn new(gate: &Gate, guard: Guard) -> Self {
        Self {
            gate: gate.clone(),
            guard,
        }
    }
}

/// Middleware enforcing a [`Guard`]
pub async fn require_guard(
    State(state): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = state.gate.extract_token(req.headers());

    match state.gate.authorize(token.as_deref(), &state.guard) {
        Ok(context) => {
            tracing::debug!(user_id = %context.user_id(), guard = ?state.guard, "Request admitted");
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(err) => {
            if err.is_token_error() {
                tracing::info!(reason = %err, path = %req.uri().path(), "Request not authenticated");
            }
            err.into_response()
        }
    }
}

/// Attach a guard to every method registered so far on `route`
pub fn guarded<S>(route: MethodRouter<S>, gate: &Gate, guard: Guard) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(GuardState::new(gate, guard), require_guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::fixtures::user;
    use crate::domain::value_object::PermissionSet;
    use axum::http::{HeaderValue, header};
    use std::time::Duration;

    fn gate() -> Gate {
        let tokens = TokenIssuer::new(b"gate-secret", Duration::from_secs(3600)).unwrap();
        Gate::new(Arc::new(tokens), "authToken")
    }

    fn token_for(gate: &Gate, role: &str, permissions: &[Permission]) -> String {
        let permissions: PermissionSet = permissions.iter().copied().collect();
        gate.tokens
            .issue(&user("alice@example.com", role), &permissions)
            .unwrap()
            .token
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(
            gate().authorize(None, &Guard::Authenticated),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            gate().authorize(Some("garbage"), &Guard::Authenticated),
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn test_role_guard() {
        let gate = gate();
        let token = token_for(&gate, "customer", &[]);

        assert!(gate.authorize(Some(&token), &Guard::Authenticated).is_ok());
        assert!(matches!(
            gate.authorize(Some(&token), &Guard::role("admin")),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_permission_guard() {
        let gate = gate();
        let token = token_for(&gate, "employee", &[Permission::CreateProduct]);

        let context = gate
            .authorize(Some(&token), &Guard::Permission(Permission::CreateProduct))
            .unwrap();
        assert_eq!(context.claims().role, "employee");

        assert!(matches!(
            gate.authorize(Some(&token), &Guard::Permission(Permission::DeleteProduct)),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("authToken=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(gate().extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.remove(header::COOKIE);
        assert_eq!(gate().extract_token(&headers).as_deref(), Some("from-header"));
    }
}
