use chrono::Utc;
use helperhub_types::models::Volunteer;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{format_timestamp, string_list_at, timestamp_at};
use crate::error::write_error;
use crate::models::{NewVolunteer, VolunteerPatch};
use crate::{Database, DbError, Result};

const ENTITY: &str = "volunteer";

const SELECT_VOLUNTEER: &str = "SELECT id, email, password_hash, name, phone, location, bio, category_list,
            available_hours, created_at, updated_at
     FROM volunteers";

impl Database {
    pub fn create_volunteer(&self, new: &NewVolunteer) -> Result<Volunteer> {
        let now = format_timestamp(&Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO volunteers
                    (email, password_hash, name, phone, location, bio, category_list, available_hours, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    new.email,
                    new.password_hash,
                    new.name,
                    new.phone,
                    new.location,
                    new.bio,
                    new.category_list.encode(),
                    new.available_hours,
                    now
                ],
            )
            .map_err(write_error(ENTITY))?;

            let id = conn.last_insert_rowid();
            query_volunteer_by_id(conn, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))
        })
    }

    pub fn get_volunteer_by_email(&self, email: &str) -> Result<Option<Volunteer>> {
        self.with_conn(|conn| query_volunteer_by_email(conn, email))
    }

    pub fn update_volunteer(&self, email: &str, patch: VolunteerPatch) -> Result<Volunteer> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut volunteer = query_volunteer_by_email(&tx, email)?
                .ok_or_else(|| DbError::not_found(ENTITY, email))?;
            patch.apply(&mut volunteer);
            volunteer.updated_at = Utc::now();

            tx.execute(
                "UPDATE volunteers
                 SET email = ?1, password_hash = ?2, name = ?3, phone = ?4, location = ?5, bio = ?6,
                     category_list = ?7, available_hours = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    volunteer.email,
                    volunteer.password_hash,
                    volunteer.name,
                    volunteer.phone,
                    volunteer.location,
                    volunteer.bio,
                    volunteer.category_list.encode(),
                    volunteer.available_hours,
                    format_timestamp(&volunteer.updated_at),
                    volunteer.id
                ],
            )
            .map_err(write_error(ENTITY))?;

            tx.commit()?;
            Ok(volunteer)
        })
    }

    /// Applications that reference the volunteer are left in place.
    pub fn delete_volunteer(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM volunteers WHERE email = ?1", [email])?;
            if removed == 0 {
                return Err(DbError::not_found(ENTITY, email));
            }
            Ok(())
        })
    }
}

fn volunteer_from_row(row: &Row<'_>) -> rusqlite::Result<Volunteer> {
    Ok(Volunteer {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        location: row.get(5)?,
        bio: row.get(6)?,
        category_list: string_list_at(row, 7)?,
        available_hours: row.get(8)?,
        created_at: timestamp_at(row, 9)?,
        updated_at: timestamp_at(row, 10)?,
    })
}

fn query_volunteer_by_email(conn: &Connection, email: &str) -> Result<Option<Volunteer>> {
    let volunteer = conn
        .query_row(
            &format!("{SELECT_VOLUNTEER} WHERE email = ?1"),
            [email],
            volunteer_from_row,
        )
        .optional()?;
    Ok(volunteer)
}

fn query_volunteer_by_id(conn: &Connection, id: i64) -> Result<Option<Volunteer>> {
    let volunteer = conn
        .query_row(
            &format!("{SELECT_VOLUNTEER} WHERE id = ?1"),
            [id],
            volunteer_from_row,
        )
        .optional()?;
    Ok(volunteer)
}
