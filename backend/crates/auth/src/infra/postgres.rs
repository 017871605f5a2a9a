//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use sqlx::types::Json;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::entity::{
    ActingIdentity, EditOperation, EditRecord, FieldDiff, Role, User, UserPatch,
};
use crate::domain::repository::{EditRecordRepository, RoleRepository, UserRepository};
use crate::domain::value_object::{Email, Permission, ProfileName, RoleName, UserId};
use crate::error::{AuthError, AuthResult};
use kernel::id::EditRecordId;

const USER_COLUMNS: &str = r#"
    user_id,
    email,
    password_hash,
    role,
    full_name,
    given_name,
    family_name,
    permission_overrides,
    created_at,
    updated_at,
    last_updated_by
"#;

/// PostgreSQL-backed auth repository
///
/// The pool is created once by the binary and shared by every clone.
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations on `users` can only come from the email constraint
fn map_user_write_error(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::DuplicateEmail,
        _ => AuthError::Database(err),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<UserId> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                password_hash,
                role,
                full_name,
                given_name,
                family_name,
                permission_overrides,
                created_at,
                updated_at,
                last_updated_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.as_str())
        .bind(user.full_name.as_str())
        .bind(user.given_name.as_str())
        .bind(user.family_name.as_str())
        .bind(Json(overrides_to_db(&user.permission_overrides)))
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_updated_by.map(Uuid::from))
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(user.user_id)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn update(
        &self,
        user_id: &UserId,
        patch: &UserPatch,
        actor: &ActingIdentity,
    ) -> AuthResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut user = row.into_user();
        let now = Utc::now();
        let diff = user.apply(patch, &actor.user_id, now);

        if diff.is_empty() {
            // Nothing written; dropping the transaction rolls it back
            return Ok(Some(user));
        }

        // Unchanged fields bind NULL and keep their stored value
        let changed = |field: &str| diff.contains_key(field);
        let sql = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                full_name = COALESCE($5, full_name),
                given_name = COALESCE($6, given_name),
                family_name = COALESCE($7, family_name),
                permission_overrides = COALESCE($8, permission_overrides),
                updated_at = $9,
                last_updated_by = $10
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(changed("email").then(|| user.email.as_str()))
            .bind(changed("password").then(|| user.password_hash.as_phc_string()))
            .bind(changed("role").then(|| user.role.as_str()))
            .bind(changed("fullName").then(|| user.full_name.as_str()))
            .bind(changed("givenName").then(|| user.given_name.as_str()))
            .bind(changed("familyName").then(|| user.family_name.as_str()))
            .bind(
                changed("permissionOverrides")
                    .then(|| Json(overrides_to_db(&user.permission_overrides))),
            )
            .bind(now)
            .bind(actor.user_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_user_write_error)?;

        let record = EditRecord::user_update(user_id, diff, actor.clone(), now);
        insert_edit_record(&mut tx, &record).await?;

        tx.commit().await?;

        tracing::debug!(
            user_id = %user_id,
            edit_id = %record.edit_id,
            fields = record.changes.len(),
            "User updated"
        );

        Ok(Some(row.into_user()))
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

async fn insert_edit_record(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &EditRecord,
) -> AuthResult<()> {
    sqlx::query(
        r#"
        INSERT INTO edit_records (
            edit_id,
            edited_at,
            collection,
            operation,
            target_id,
            changes,
            acting_user_id,
            acting_email
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(record.edit_id.as_uuid())
    .bind(record.timestamp)
    .bind(&record.collection)
    .bind(record.operation.code())
    .bind(record.target_id)
    .bind(Json(&record.changes))
    .bind(record.acting_user.user_id.as_uuid())
    .bind(&record.acting_user.email)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgAuthRepository {
    async fn find_role(&self, name: &RoleName) -> AuthResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, permissions, parents
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoleRow::into_role))
    }

    async fn save_role(&self, role: &Role) -> AuthResult<()> {
        let permissions: Vec<String> = role.permissions.iter().map(|p| p.to_string()).collect();
        let parents: Vec<String> = role.parents.iter().map(|p| p.to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO roles (name, permissions, parents)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET permissions = EXCLUDED.permissions,
                parents = EXCLUDED.parents
            "#,
        )
        .bind(role.name.as_str())
        .bind(&permissions)
        .bind(&parents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Edit Record Repository Implementation
// ============================================================================

impl EditRecordRepository for PgAuthRepository {
    async fn list_edits(&self, target_id: &Uuid) -> AuthResult<Vec<EditRecord>> {
        let rows = sqlx::query_as::<_, EditRecordRow>(
            r#"
            SELECT
                edit_id,
                edited_at,
                collection,
                operation,
                target_id,
                changes,
                acting_user_id,
                acting_email
            FROM edit_records
            WHERE target_id = $1
            ORDER BY edited_at, edit_id
            "#,
        )
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EditRecordRow::into_record).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

fn overrides_to_db(overrides: &BTreeMap<Permission, bool>) -> BTreeMap<String, bool> {
    overrides
        .iter()
        .map(|(permission, granted)| (permission.code().to_string(), *granted))
        .collect()
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    full_name: String,
    given_name: String,
    family_name: String,
    permission_overrides: Json<BTreeMap<String, bool>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_updated_by: Option<Uuid>,
}

impl UserRow {
    fn into_user(self) -> User {
        let permission_overrides = self
            .permission_overrides
            .0
            .into_iter()
            .filter_map(|(code, granted)| match Permission::from_code(&code) {
                Some(permission) => Some((permission, granted)),
                None => {
                    tracing::warn!(
                        user_id = %self.user_id,
                        permission = %code,
                        "Ignoring unknown permission override"
                    );
                    None
                }
            })
            .collect();

        User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            password_hash: HashedPassword::from_db(self.password_hash),
            role: RoleName::from_db(self.role),
            full_name: ProfileName::from_db(self.full_name),
            given_name: ProfileName::from_db(self.given_name),
            family_name: ProfileName::from_db(self.family_name),
            permission_overrides,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_updated_by: self.last_updated_by.map(UserId::from_uuid),
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    name: String,
    permissions: Vec<String>,
    parents: Vec<String>,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role::new(RoleName::from_db(self.name), Permission::parse_lossy(&self.permissions))
            .with_parents(self.parents.into_iter().map(RoleName::from_db).collect())
    }
}

#[derive(sqlx::FromRow)]
struct EditRecordRow {
    edit_id: Uuid,
    edited_at: DateTime<Utc>,
    collection: String,
    operation: String,
    target_id: Uuid,
    changes: Json<FieldDiff>,
    acting_user_id: Uuid,
    acting_email: String,
}

impl EditRecordRow {
    fn into_record(self) -> AuthResult<EditRecord> {
        let operation = EditOperation::from_code(&self.operation).ok_or_else(|| {
            AuthError::Internal(format!("Invalid edit operation: {}", self.operation))
        })?;

        Ok(EditRecord {
            edit_id: EditRecordId::from_uuid(self.edit_id),
            timestamp: self.edited_at,
            collection: self.collection,
            operation,
            target_id: self.target_id,
            changes: self.changes.0,
            acting_user: ActingIdentity {
                user_id: UserId::from_uuid(self.acting_user_id),
                email: self.acting_email,
            },
        })
    }
}
