use chrono::Utc;
use helperhub_types::api::ApplicationFilter;
use helperhub_types::models::Application;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{format_timestamp, timestamp_at};
use crate::error::write_error;
use crate::models::{ApplicationPatch, NewApplication};
use crate::{Database, DbError, Result};

const ENTITY: &str = "application";

const SELECT_APPLICATION: &str = "SELECT id, volunteer_id, opportunity_id, status, cover_letter, created_at, updated_at
     FROM applications";

impl Database {
    pub fn create_application(&self, new: &NewApplication) -> Result<Application> {
        let now = format_timestamp(&Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO applications
                    (volunteer_id, opportunity_id, status, cover_letter, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    new.volunteer_id,
                    new.opportunity_id,
                    new.status,
                    new.cover_letter,
                    now
                ],
            )
            .map_err(write_error(ENTITY))?;

            let id = conn.last_insert_rowid();
            query_application(conn, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))
        })
    }

    pub fn get_application(&self, id: i64) -> Result<Option<Application>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    pub fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_APPLICATION}
                 WHERE (?1 IS NULL OR volunteer_id = ?1)
                   AND (?2 IS NULL OR opportunity_id = ?2)
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map(
                    params![filter.volunteer_id, filter.opportunity_id],
                    application_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_application(&self, id: i64, patch: ApplicationPatch) -> Result<Application> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut application =
                query_application(&tx, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))?;
            patch.apply(&mut application);
            application.updated_at = Utc::now();

            tx.execute(
                "UPDATE applications
                 SET volunteer_id = ?1, opportunity_id = ?2, status = ?3, cover_letter = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    application.volunteer_id,
                    application.opportunity_id,
                    application.status,
                    application.cover_letter,
                    format_timestamp(&application.updated_at),
                    application.id
                ],
            )
            .map_err(write_error(ENTITY))?;

            tx.commit()?;
            Ok(application)
        })
    }

    pub fn delete_application(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM applications WHERE id = ?1", [id])?;
            if removed == 0 {
                return Err(DbError::not_found(ENTITY, id));
            }
            Ok(())
        })
    }
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: row.get(0)?,
        volunteer_id: row.get(1)?,
        opportunity_id: row.get(2)?,
        status: row.get(3)?,
        cover_letter: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

fn query_application(conn: &Connection, id: i64) -> Result<Option<Application>> {
    let application = conn
        .query_row(
            &format!("{SELECT_APPLICATION} WHERE id = ?1"),
            [id],
            application_from_row,
        )
        .optional()?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewVolunteer;
    use helperhub_types::codec::StringList;

    fn application(volunteer_id: i64, opportunity_id: i64) -> NewApplication {
        NewApplication {
            volunteer_id,
            opportunity_id,
            status: "pending".into(),
            cover_letter: "I'd love to help".into(),
        }
    }

    #[test]
    fn filter_by_volunteer_and_opportunity() {
        let db = Database::open_in_memory().unwrap();
        db.create_application(&application(1, 10)).unwrap();
        db.create_application(&application(1, 11)).unwrap();
        db.create_application(&application(2, 10)).unwrap();

        let by_volunteer = db
            .list_applications(&ApplicationFilter {
                volunteer_id: Some(1),
                opportunity_id: None,
            })
            .unwrap();
        assert_eq!(by_volunteer.len(), 2);

        let by_opportunity = db
            .list_applications(&ApplicationFilter {
                volunteer_id: None,
                opportunity_id: Some(10),
            })
            .unwrap();
        assert_eq!(by_opportunity.len(), 2);
        assert!(by_opportunity.iter().all(|a| a.opportunity_id == 10));
    }

    #[test]
    fn status_update_keeps_cover_letter() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_application(&application(1, 10)).unwrap();

        let updated = db
            .update_application(
                created.id,
                ApplicationPatch {
                    status: Some("accepted".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, "accepted");
        assert_eq!(updated.cover_letter, created.cover_letter);
    }

    #[test]
    fn deleting_volunteer_leaves_applications() {
        let db = Database::open_in_memory().unwrap();
        let volunteer = db
            .create_volunteer(&NewVolunteer {
                email: "a@b.com".into(),
                password_hash: String::new(),
                name: "A".into(),
                phone: "123".into(),
                location: String::new(),
                bio: String::new(),
                category_list: StringList::default(),
                available_hours: 3,
            })
            .unwrap();
        let app = db.create_application(&application(volunteer.id, 10)).unwrap();

        db.delete_volunteer("a@b.com").unwrap();

        assert_eq!(db.get_application(app.id).unwrap(), Some(app));
    }
}
