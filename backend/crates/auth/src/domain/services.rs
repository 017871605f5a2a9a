//! Domain Services

use crate::domain::entity::{Role, User};
use crate::domain::value_object::PermissionSet;

/// Effective permissions of `user` given its resolved roles
///
/// Union of every role's permissions, then the user's overrides: a `true`
/// override grants, a `false` override revokes even if a role grants it.
pub fn merge_permissions(user: &User, roles: &[Role]) -> PermissionSet {
    let mut permissions: PermissionSet = roles
        .iter()
        .flat_map(|role| role.permissions.iter().copied())
        .collect();

    for (permission, granted) in &user.permission_overrides {
        if *granted {
            permissions.insert(*permission);
        } else {
            permissions.remove(permission);
        }
    }

    permissions
}
