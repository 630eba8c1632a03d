use chrono::Utc;
use helperhub_types::models::User;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{format_timestamp, timestamp_at};
use crate::error::write_error;
use crate::models::{NewUser, UserPatch};
use crate::{Database, DbError, Result};

const ENTITY: &str = "user";

const SELECT_USER: &str = "SELECT id, email, password_hash, full_name, role, identity_id, created_at, updated_at
     FROM users";

impl Database {
    pub fn create_user(&self, new: &NewUser) -> Result<User> {
        let now = format_timestamp(&Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, password_hash, full_name, role, identity_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![new.email, new.password_hash, new.full_name, new.role, new.identity_id, now],
            )
            .map_err(write_error(ENTITY))?;

            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    /// Merge `patch` into the user addressed by `email`.
    pub fn update_user(&self, email: &str, patch: UserPatch) -> Result<User> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut user =
                query_user_by_email(&tx, email)?.ok_or_else(|| DbError::not_found(ENTITY, email))?;
            patch.apply(&mut user);
            user.updated_at = Utc::now();

            tx.execute(
                "UPDATE users
                 SET email = ?1, password_hash = ?2, full_name = ?3, role = ?4, identity_id = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    user.email,
                    user.password_hash,
                    user.full_name,
                    user.role,
                    user.identity_id,
                    format_timestamp(&user.updated_at),
                    user.id
                ],
            )
            .map_err(write_error(ENTITY))?;

            tx.commit()?;
            Ok(user)
        })
    }

    pub fn delete_user(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM users WHERE email = ?1", [email])?;
            if removed == 0 {
                return Err(DbError::not_found(ENTITY, email));
            }
            Ok(())
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        identity_id: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(&format!("{SELECT_USER} WHERE email = ?1"), [email], user_from_row)
        .optional()?;
    Ok(user)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(&format!("{SELECT_USER} WHERE id = ?1"), [id], user_from_row)
        .optional()?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> NewUser {
        NewUser {
            email: "alice@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            full_name: "Alice Doe".into(),
            role: "admin".into(),
            identity_id: String::new(),
        }
    }

    #[test]
    fn create_then_get() {
        let db = Database::open_in_memory().unwrap();

        let created = db.create_user(&alice()).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&alice()).unwrap();

        let err = db.create_user(&alice()).unwrap_err();
        match err {
            DbError::Conflict { entity, field } => {
                assert_eq!(entity, "user");
                assert_eq!(field, "email");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.get_user_by_email("ghost@example.com").unwrap().is_none());
        assert!(matches!(
            db.update_user(
                "ghost@example.com",
                UserPatch {
                    role: Some("x".into()),
                    ..Default::default()
                }
            ),
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.delete_user("ghost@example.com"),
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn update_merges_and_advances_timestamp() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_user(&alice()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));

        let updated = db
            .update_user(
                "alice@example.com",
                UserPatch {
                    role: Some("coordinator".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.role, "coordinator");
        assert_eq!(updated.full_name, created.full_name);
        assert_eq!(updated.password_hash, created.password_hash);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let stored = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn delete_removes_the_row() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&alice()).unwrap();

        db.delete_user("alice@example.com").unwrap();
        assert!(db.get_user_by_email("alice@example.com").unwrap().is_none());
    }
}
