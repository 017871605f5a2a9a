//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use uuid::Uuid;

use crate::domain::entity::{ActingIdentity, EditRecord, Role, User, UserPatch};
use crate::domain::value_object::{Email, RoleName, UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    ///
    /// Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, user: &User) -> AuthResult<UserId>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> AuthResult<Vec<User>>;

    /// Apply a partial update and write its edit record
    ///
    /// Only fields present in `patch` are written, so concurrent updates to
    /// different fields of one user both survive. No edit record is written
    /// when nothing changes. Returns `None` if the user does not exist.
    async fn update(
        &self,
        user_id: &UserId,
        patch: &UserPatch,
        actor: &ActingIdentity,
    ) -> AuthResult<Option<User>>;

    /// Delete a user; `false` if it did not exist
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// Role document repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    async fn find_role(&self, name: &RoleName) -> AuthResult<Option<Role>>;

    /// Insert or replace a role document
    async fn save_role(&self, role: &Role) -> AuthResult<()>;
}

/// Edit record (audit) repository trait
///
/// Records are written by [`UserRepository::update`]; this is the read side.
#[trait_variant::make(EditRecordRepository: Send)]
pub trait LocalEditRecordRepository {
    /// Records targeting `target_id`, oldest first
    async fn list_edits(&self, target_id: &Uuid) -> AuthResult<Vec<EditRecord>>;
}
