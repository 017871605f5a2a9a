//! Auth Router
//!
//! Routes under `/api/users`. Guards are attached per route with
//! [`guarded`].

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenIssuer;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::Permission;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{Gate, Guard, guarded};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: PgAuthRepository,
    config: Arc<AuthConfig>,
    tokens: Arc<TokenIssuer>,
) -> Router {
    auth_router_generic(repo, config, tokens)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: Arc<AuthConfig>, tokens: Arc<TokenIssuer>) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let gate = Gate::new(tokens.clone(), &config.cookie_name);
    let state = AuthAppState {
        repo: Arc::new(repo),
        config,
        tokens,
    };

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/register", post(handlers::register::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route(
            "/me",
            guarded(
                get(handlers::get_me::<R>).put(handlers::update_me::<R>),
                &gate,
                Guard::Authenticated,
            ),
        )
        .route(
            "/list",
            guarded(
                get(handlers::list_users::<R>),
                &gate,
                Guard::Permission(Permission::ListUsers),
            ),
        )
        .route(
            "/{user_id}",
            guarded(
                get(handlers::get_user::<R>),
                &gate,
                Guard::Permission(Permission::ReadUser),
            ),
        )
        .route(
            "/{user_id}",
            guarded(
                put(handlers::update_user::<R>),
                &gate,
                Guard::Permission(Permission::UpdateUser),
            ),
        )
        .route(
            "/{user_id}",
            guarded(
                delete(handlers::delete_user::<R>),
                &gate,
                Guard::Permission(Permission::DeleteUser),
            ),
        )
        .with_state(state)
}
