//! User CRUD queries.
//!
//! Every write runs inside a transaction taken from the pool. `sqlx`'s
//! `Transaction` rolls back when dropped, so any early return (not found,
//! conflict, `?`) leaves the table untouched; only an explicit `commit()`
//! persists.

use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};

use crate::{Database, DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Payload for create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

const SELECT_USER: &str = "SELECT id, username, email FROM users";

async fn fetch_in_tx(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(user)
}

impl Database {
    /// Page through users ordered by id.
    pub async fn list_users(&self, offset: i64, limit: i64) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "{SELECT_USER} ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    pub async fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// First user (lowest id) whose username or email matches. A `None`
    /// criterion matches nothing.
    pub async fn find_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "{SELECT_USER} WHERE username = ? OR email = ? ORDER BY id LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    /// Insert a user. Fails with `DbError::Conflict` when the username or
    /// the email is already taken.
    pub async fn create_user(&self, new: &NewUser) -> DbResult<User> {
        let mut tx = self.pool().begin().await?;

        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ? LIMIT 1")
                .bind(&new.username)
                .bind(&new.email)
                .fetch_optional(&mut *tx)
                .await?;
        if taken.is_some() {
            return Err(DbError::Conflict);
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email) VALUES (?, ?) RETURNING id, username, email",
        )
        .bind(&new.username)
        .bind(&new.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

        tx.commit().await?;
        tracing::debug!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Apply the set fields of `patch`. `Ok(None)` when the user is absent.
    pub async fn update_user(&self, id: i64, patch: &UserPatch) -> DbResult<Option<User>> {
        let mut tx = self.pool().begin().await?;
        if fetch_in_tx(&mut tx, id).await?.is_none() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email) \
             WHERE id = ? RETURNING id, username, email",
        )
        .bind(patch.username.as_deref())
        .bind(patch.email.as_deref())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Overwrite both fields. `Ok(None)` when the user is absent.
    pub async fn replace_user(&self, id: i64, new: &NewUser) -> DbResult<Option<User>> {
        let mut tx = self.pool().begin().await?;
        if fetch_in_tx(&mut tx, id).await?.is_none() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET username = ?, email = ? WHERE id = ? RETURNING id, username, email",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Returns `false` when no such user existed.
    pub async fn delete_user(&self, id: i64) -> DbResult<bool> {
        let mut tx = self.pool().begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }
}
