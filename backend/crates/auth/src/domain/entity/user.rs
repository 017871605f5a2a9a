//! User Entity
//!
//! Account record: credentials, role and profile.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::entity::edit_record::{FieldDiff, REDACTED};
use crate::domain::value_object::{Email, Permission, ProfileName, RoleName, UserId};

/// User entity
///
/// `password_hash` is always a PHC digest; plaintext never reaches this type.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, lower-cased
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: RoleName,
    pub full_name: ProfileName,
    pub given_name: ProfileName,
    pub family_name: ProfileName,
    /// Applied after role permissions: `true` grants, `false` revokes
    pub permission_overrides: BTreeMap<Permission, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Acting user of the last update
    pub last_updated_by: Option<UserId>,
}

/// Validated registration data
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: RoleName,
    pub full_name: ProfileName,
    pub given_name: ProfileName,
    pub family_name: ProfileName,
}

impl User {
    /// Create a new user
    pub fn new(input: NewUser) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            full_name: input.full_name,
            given_name: input.given_name,
            family_name: input.family_name,
            permission_overrides: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_updated_by: None,
        }
    }

    /// Apply the present fields of `patch`
    ///
    /// Returns the diff of fields whose value actually changed; the entity
    /// is left untouched (timestamps included) when the diff is empty.
    /// A new password hash always counts as a change and is redacted.
    pub fn apply(&mut self, patch: &UserPatch, actor: &UserId, now: DateTime<Utc>) -> FieldDiff {
        let mut diff = FieldDiff::new();

        if let Some(email) = patch.email.as_ref().filter(|e| **e != self.email) {
            self.email = email.clone();
            diff.insert("email".to_string(), Value::from(email.as_str()));
        }

        if let Some(hash) = &patch.password_hash {
            self.password_hash = hash.clone();
            diff.insert("password".to_string(), Value::from(REDACTED));
        }

        if let Some(role) = patch.role.as_ref().filter(|r| **r != self.role) {
            self.role = role.clone();
            diff.insert("role".to_string(), Value::from(role.as_str()));
        }

        for (field, current, next) in [
            ("fullName", &mut self.full_name, &patch.full_name),
            ("givenName", &mut self.given_name, &patch.given_name),
            ("familyName", &mut self.family_name, &patch.family_name),
        ] {
            if let Some(next) = next.as_ref().filter(|n| **n != *current) {
                *current = next.clone();
                diff.insert(field.to_string(), Value::from(next.as_str()));
            }
        }

        if let Some(overrides) = patch
            .permission_overrides
            .as_ref()
            .filter(|o| **o != self.permission_overrides)
        {
            self.permission_overrides = overrides.clone();
            let value = overrides
                .iter()
                .map(|(permission, granted)| (permission.code().to_string(), Value::from(*granted)))
                .collect::<serde_json::Map<_, _>>();
            diff.insert("permissionOverrides".to_string(), Value::Object(value));
        }

        if !diff.is_empty() {
            self.updated_at = now;
            self.last_updated_by = Some(*actor);
        }

        diff
    }
}

/// Partial update; `None` leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<Email>,
    /// Already hashed
    pub password_hash: Option<HashedPassword>,
    pub role: Option<RoleName>,
    pub full_name: Option<ProfileName>,
    pub given_name: Option<ProfileName>,
    pub family_name: Option<ProfileName>,
    pub permission_overrides: Option<BTreeMap<Permission, bool>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.full_name.is_none()
            && self.given_name.is_none()
            && self.family_name.is_none()
            && self.permission_overrides.is_none()
    }

    /// Fields that need elevated rights to change
    pub fn touches_authorization(&self) -> bool {
        self.role.is_some() || self.permission_overrides.is_some()
    }
}
