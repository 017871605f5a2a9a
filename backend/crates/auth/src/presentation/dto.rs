//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::entity::User;
use crate::domain::value_object::UserId;

// ============================================================================
// Login / Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Login, registration and self-update response
///
/// The token is also set as the `authToken` cookie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: String,
    pub user_id: UserId,
    pub auth_token: String,
}

// ============================================================================
// Profile / Administration
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub role: Option<String>,
    pub permission_overrides: Option<BTreeMap<String, bool>>,
}

/// Public view of a user; never includes the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub permission_overrides: BTreeMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_updated_by: Option<UserId>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id,
            email: user.email.as_str().to_string(),
            role: user.role.as_str().to_string(),
            full_name: user.full_name.as_str().to_string(),
            given_name: user.given_name.as_str().to_string(),
            family_name: user.family_name.as_str().to_string(),
            permission_overrides: user
                .permission_overrides
                .iter()
                .map(|(permission, granted)| (permission.code().to_string(), *granted))
                .collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_updated_by: user.last_updated_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUserResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub message: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
