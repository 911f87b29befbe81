//! [`AssignmentRepository`] over PostgreSQL.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::grant::{GrantSnapshot, RoleGrant, dedup};
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::Role;

use super::db_error;
use crate::repositories::AssignmentRepository;

/// Assignment repository backed by `user_roles`.
#[derive(Debug, Clone)]
pub struct PgAssignmentRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct RoleMenuRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    menu: Menu,
}

#[derive(FromRow)]
struct RoleButtonRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    button: Button,
}

impl PgAssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_exists(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(db_error("Failed to check user"))
    }

    async fn load_roles(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("Failed to load user roles"))
    }

    async fn read_only(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to set snapshot isolation"))?;
        Ok(tx)
    }
}

#[async_trait]
impl AssignmentRepository for PgAssignmentRepository {
    async fn roles_for_user(&self, user_id: UserId) -> AppResult<Option<Vec<Role>>> {
        let mut tx = self.read_only().await?;
        if !Self::user_exists(&mut tx, user_id).await? {
            return Ok(None);
        }
        let roles = Self::load_roles(&mut tx, user_id).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to finish read"))?;
        Ok(Some(roles))
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let role_ids = dedup(role_ids.iter().copied());
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Locking the user row serializes replacements for one user and
        // blocks a concurrent delete until commit.
        let locked = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock user"))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let known = sqlx::query_scalar::<_, RoleId>(
            "SELECT id FROM roles WHERE id = ANY($1) FOR SHARE",
        )
        .bind(&role_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to check roles"))?;
        if let Some(missing) = role_ids.iter().find(|id| !known.contains(id)) {
            return Err(AppError::invalid_input(format!(
                "Role {missing} does not exist"
            )));
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear user roles"))?;
        sqlx::query("INSERT INTO user_roles (user_id, role_id) SELECT $1, UNNEST($2::BIGINT[])")
            .bind(user_id)
            .bind(&role_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to assign roles"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role assignment"))?;
        Ok(())
    }

    async fn grant_snapshot(&self, user_id: UserId) -> AppResult<Option<GrantSnapshot>> {
        let mut tx = self.read_only().await?;
        if !Self::user_exists(&mut tx, user_id).await? {
            return Ok(None);
        }
        let roles = Self::load_roles(&mut tx, user_id).await?;
        let role_ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();

        let menus = sqlx::query_as::<_, RoleMenuRow>(
            "SELECT rm.role_id, m.* FROM role_menus rm JOIN menus m ON m.id = rm.menu_id \
             WHERE rm.role_id = ANY($1) ORDER BY m.id",
        )
        .bind(&role_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load granted menus"))?;

        let buttons = sqlx::query_as::<_, RoleButtonRow>(
            "SELECT rb.role_id, b.* FROM role_buttons rb JOIN buttons b ON b.id = rb.button_id \
             WHERE rb.role_id = ANY($1) ORDER BY b.id",
        )
        .bind(&role_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load granted buttons"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to finish snapshot"))?;

        let roles = roles
            .into_iter()
            .map(|role| RoleGrant {
                menus: menus
                    .iter()
                    .filter(|row| row.role_id == role.id)
                    .map(|row| row.menu.clone())
                    .collect(),
                buttons: buttons
                    .iter()
                    .filter(|row| row.role_id == role.id)
                    .map(|row| row.button.clone())
                    .collect(),
                role,
            })
            .collect();
        Ok(Some(GrantSnapshot { user_id, roles }))
    }
}
