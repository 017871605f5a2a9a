//! Role / Permission Resolver
//!
//! Walks a user's role and its parents through the [`RoleRepository`].

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::domain::entity::{Role, User};
use crate::domain::repository::RoleRepository;
use crate::domain::services::merge_permissions;
use crate::domain::value_object::PermissionSet;
use crate::error::AuthResult;

pub struct RoleResolver<R>
where
    R: RoleRepository,
{
    role_repo: Arc<R>,
}

impl<R> RoleResolver<R>
where
    R: RoleRepository,
{
    pub fn new(role_repo: Arc<R>) -> Self {
        Self { role_repo }
    }

    /// Breadth-first from the user's role through parent links
    ///
    /// Each role is fetched at most once, so cycles terminate. Names with
    /// no role document are skipped.
    pub async fn resolve_roles(&self, user: &User) -> AuthResult<Vec<Role>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([user.role.clone()]);
        let mut resolved = Vec::new();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }

            match self.role_repo.find_role(&name).await? {
                Some(role) => {
                    queue.extend(
                        role.parents
                            .iter()
                            .filter(|parent| !visited.contains(*parent))
                            .cloned(),
                    );
                    resolved.push(role);
                }
                None => {
                    tracing::warn!(role = %name, user_id = %user.user_id, "Role is not defined");
                }
            }
        }

        Ok(resolved)
    }

    pub async fn resolve_permissions(&self, user: &User) -> AuthResult<PermissionSet> {
        let roles = self.resolve_roles(user).await?;
        Ok(merge_permissions(user, &roles))
    }
}
