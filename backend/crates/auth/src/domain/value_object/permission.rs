//! Permission Value Object
//!
//! Capability tags carried in session tokens and role documents.
//! Serialized as `"area:action"` strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Permission {
    ListUsers,
    ReadUser,
    UpdateUser,
    DeleteUser,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ManageRoles,
}

/// Effective permissions of a session
pub type PermissionSet = BTreeSet<Permission>;

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ListUsers,
        Permission::ReadUser,
        Permission::UpdateUser,
        Permission::DeleteUser,
        Permission::CreateProduct,
        Permission::UpdateProduct,
        Permission::DeleteProduct,
        Permission::ManageRoles,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use Permission::*;
        match self {
            ListUsers => "user:list",
            ReadUser => "user:read",
            UpdateUser => "user:update",
            DeleteUser => "user:delete",
            CreateProduct => "product:create",
            UpdateProduct => "product:update",
            DeleteProduct => "product:delete",
            ManageRoles => "role:manage",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Parse stored codes, dropping (and logging) anything unknown
    pub fn parse_lossy<I, S>(codes: I) -> PermissionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter_map(|code| {
                let code = code.as_ref();
                let parsed = Self::from_code(code);
                if parsed.is_none() {
                    tracing::warn!(permission = %code, "Ignoring unknown permission");
                }
                parsed
            })
            .collect()
    }
}

/// Returned when a string is not a known permission code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl TryFrom<String> for Permission {
    type Error = UnknownPermission;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.code().to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
