//! Session Claims
//!
//! Payload of a session token. Not persisted: the permission set is a
//! snapshot taken at issuance and stays valid until `exp`.

use serde::{Deserialize, Serialize};

use crate::domain::entity::edit_record::ActingIdentity;
use crate::domain::value_object::{Permission, PermissionSet, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id
    pub sub: UserId,
    pub email: String,
    pub role: String,
    pub permissions: PermissionSet,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Identity recorded in edit records
    pub fn acting_identity(&self) -> ActingIdentity {
        ActingIdentity {
            user_id: self.sub,
            email: self.email.clone(),
        }
    }
}
