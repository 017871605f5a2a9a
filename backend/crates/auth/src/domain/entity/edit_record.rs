//! Edit Record Entity
//!
//! Append-only audit trail of user updates.

use chrono::{DateTime, Utc};
use kernel::id::EditRecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::value_object::UserId;

/// Field name to new value
pub type FieldDiff = BTreeMap<String, Value>;

/// Placeholder written instead of a password hash
pub const REDACTED: &str = "[REDACTED]";

/// Collection name recorded for user edits
pub const USER_COLLECTION: &str = "User";

/// Who performed a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingIdentity {
    pub user_id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Update,
}

impl EditOperation {
    pub const fn code(&self) -> &'static str {
        match self {
            EditOperation::Update => "update",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "update" => Some(EditOperation::Update),
            _ => None,
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub edit_id: EditRecordId,
    pub timestamp: DateTime<Utc>,
    pub collection: String,
    pub operation: EditOperation,
    pub target_id: Uuid,
    pub changes: FieldDiff,
    pub acting_user: ActingIdentity,
}

impl EditRecord {
    /// Record an update to a user document
    pub fn user_update(
        target: &UserId,
        changes: FieldDiff,
        acting_user: ActingIdentity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            edit_id: EditRecordId::new(),
            timestamp,
            collection: USER_COLLECTION.to_string(),
            operation: EditOperation::Update,
            target_id: *target.as_uuid(),
            changes,
            acting_user,
        }
    }
}
