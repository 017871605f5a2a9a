//! Role Entity

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Permission, PermissionSet, RoleName};

/// A named permission set, optionally aggregating parent roles
///
/// Parent links may form cycles; resolution tolerates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    pub permissions: PermissionSet,
    /// Ordered; earlier parents are resolved first
    pub parents: Vec<RoleName>,
}

impl Role {
    pub fn new(name: RoleName, permissions: PermissionSet) -> Self {
        Self {
            name,
            permissions,
            parents: Vec::new(),
        }
    }

    pub fn with_parents(mut self, parents: Vec<RoleName>) -> Self {
        self.parents = parents;
        self
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Built-in roles: `customer` < `employee` < `admin`
///
/// Mirrors the rows seeded by the database migrations.
pub fn default_roles() -> Vec<Role> {
    use Permission::*;

    let customer = Role::new(RoleName::from_db(RoleName::CUSTOMER), PermissionSet::new());

    let employee = Role::new(
        RoleName::from_db(RoleName::EMPLOYEE),
        [CreateProduct, UpdateProduct].into_iter().collect(),
    )
    .with_parents(vec![RoleName::from_db(RoleName::CUSTOMER)]);

    let admin = Role::new(
        RoleName::from_db(RoleName::ADMIN),
        [ListUsers, ReadUser, UpdateUser, DeleteUser, DeleteProduct, ManageRoles]
            .into_iter()
            .collect(),
    )
    .with_parents(vec![RoleName::from_db(RoleName::EMPLOYEE)]);

    vec![customer, employee, admin]
}
