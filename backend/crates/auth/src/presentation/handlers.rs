//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::{SignedToken, TokenIssuer};
use crate::application::{
    AdminUpdateInput, ManageUsersUseCase, ProfileUseCase, SignInInput, SignInUseCase,
    SignUpInput, SignUpUseCase, UpdateProfileInput,
};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::UserId;
use crate::domain::value_object::user_id::parse_user_id;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AdminUpdateUserRequest, DeleteUserResponse, LoginRequest, MessageResponse, RegisterRequest,
    SessionResponse, UpdateMeRequest, UpdatedUserResponse, UserResponse,
};
use crate::presentation::middleware::AuthContext;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenIssuer>,
}

/// Body + `Set-Cookie` for a freshly issued session
fn session_response(
    config: &AuthConfig,
    message: &str,
    user_id: UserId,
    session: SignedToken,
) -> impl IntoResponse + use<> {
    let cookie = config.cookie_config().build_set_cookie(&session.token);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            message: message.into(),
            user_id,
            auth_token: session.token,
        }),
    )
}

// ============================================================================
// Login / Register / Logout
// ============================================================================

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.password_hasher(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(session_response(
        &state.config,
        "Welcome back!",
        output.user_id,
        output.session,
    ))
}

/// POST /api/users/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            given_name: req.given_name,
            family_name: req.family_name,
            role: req.role,
        })
        .await?;

    Ok(session_response(
        &state.config,
        "User Registered!",
        output.user_id,
        output.session,
    ))
}

/// POST /api/users/logout
///
/// Tokens stay valid until expiry; this only clears the cookie.
pub async fn logout<R>(State(state): State<AuthAppState<R>>) -> impl IntoResponse
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let cookie = state.config.cookie_config().build_delete_cookie();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

// ============================================================================
// Own Profile
// ============================================================================

/// GET /api/users/me
pub async fn get_me<R>(
    State(state): State<AuthAppState<R>>,
    auth: AuthContext,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.password_hasher(),
    );

    let user = use_case.get(auth.claims()).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/me
pub async fn update_me<R>(
    State(state): State<AuthAppState<R>>,
    auth: AuthContext,
    Json(req): Json<UpdateMeRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.password_hasher(),
    );

    let output = use_case
        .update(
            auth.claims(),
            UpdateProfileInput {
                email: req.email,
                password: req.password,
                full_name: req.full_name,
            },
        )
        .await?;

    Ok(session_response(
        &state.config,
        "Profile updated",
        output.user.user_id,
        output.session,
    ))
}

// ============================================================================
// Administration
// ============================================================================

/// GET /api/users/list
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.password_hasher(),
    );

    let users = use_case.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{userId}
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let use_case = ManageUsersUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.password_hasher(),
    );

    let user = use_case.get(&user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{userId}
///
/// The target's session is not touched: the caller is an administrator
/// and must not receive the target's token.
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    auth: AuthContext,
    Path(user_id): Path<String>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> AuthResult<Json<UpdatedUserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let use_case = ManageUsersUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.password_hasher(),
    );

    let user = use_case
        .update(
            auth.claims(),
            &user_id,
            AdminUpdateInput {
                email: req.email,
                password: req.password,
                full_name: req.full_name,
                given_name: req.given_name,
                family_name: req.family_name,
                role: req.role,
                permission_overrides: req.permission_overrides,
            },
        )
        .await?;

    Ok(Json(UpdatedUserResponse {
        message: format!("User {} updated!", user_id),
        user: user.into(),
    }))
}

/// DELETE /api/users/{userId}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> AuthResult<Json<DeleteUserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let use_case = ManageUsersUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.password_hasher(),
    );

    use_case.delete(auth.claims(), &user_id).await?;

    Ok(Json(DeleteUserResponse {
        message: format!("User {} deleted!", user_id),
        user_id,
    }))
}
