use chrono::Utc;
use helperhub_types::models::Organization;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{format_timestamp, timestamp_at};
use crate::error::write_error;
use crate::models::{NewOrganization, OrganizationPatch};
use crate::{Database, DbError, Result};

const ENTITY: &str = "organization";

const SELECT_ORGANIZATION: &str = "SELECT id, email, password_hash, name, phone, location, description, website_url,
            created_at, updated_at
     FROM organizations";

impl Database {
    pub fn create_organization(&self, new: &NewOrganization) -> Result<Organization> {
        let now = format_timestamp(&Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO organizations
                    (email, password_hash, name, phone, location, description, website_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    new.email,
                    new.password_hash,
                    new.name,
                    new.phone,
                    new.location,
                    new.description,
                    new.website_url,
                    now
                ],
            )
            .map_err(write_error(ENTITY))?;

            let id = conn.last_insert_rowid();
            query_organization_by_id(conn, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))
        })
    }

    pub fn get_organization_by_email(&self, email: &str) -> Result<Option<Organization>> {
        self.with_conn(|conn| query_organization_by_email(conn, email))
    }

    pub fn update_organization(&self, email: &str, patch: OrganizationPatch) -> Result<Organization> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut organization = query_organization_by_email(&tx, email)?
                .ok_or_else(|| DbError::not_found(ENTITY, email))?;
            patch.apply(&mut organization);
            organization.updated_at = Utc::now();

            tx.execute(
                "UPDATE organizations
                 SET email = ?1, password_hash = ?2, name = ?3, phone = ?4, location = ?5,
                     description = ?6, website_url = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    organization.email,
                    organization.password_hash,
                    organization.name,
                    organization.phone,
                    organization.location,
                    organization.description,
                    organization.website_url,
                    format_timestamp(&organization.updated_at),
                    organization.id
                ],
            )
            .map_err(write_error(ENTITY))?;

            tx.commit()?;
            Ok(organization)
        })
    }

    /// Opportunities posted under this organization's email are left in place.
    pub fn delete_organization(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM organizations WHERE email = ?1", [email])?;
            if removed == 0 {
                return Err(DbError::not_found(ENTITY, email));
            }
            Ok(())
        })
    }
}

fn organization_from_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        location: row.get(5)?,
        description: row.get(6)?,
        website_url: row.get(7)?,
        created_at: timestamp_at(row, 8)?,
        updated_at: timestamp_at(row, 9)?,
    })
}

fn query_organization_by_email(conn: &Connection, email: &str) -> Result<Option<Organization>> {
    let organization = conn
        .query_row(
            &format!("{SELECT_ORGANIZATION} WHERE email = ?1"),
            [email],
            organization_from_row,
        )
        .optional()?;
    Ok(organization)
}

fn query_organization_by_id(conn: &Connection, id: i64) -> Result<Option<Organization>> {
    let organization = conn
        .query_row(
            &format!("{SELECT_ORGANIZATION} WHERE id = ?1"),
            [id],
            organization_from_row,
        )
        .optional()?;
    Ok(organization)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organization(email: &str, name: &str) -> NewOrganization {
        NewOrganization {
            email: email.into(),
            password_hash: String::new(),
            name: name.into(),
            phone: "555-0100".into(),
            location: "St. Paul".into(),
            description: "Food shelf".into(),
            website_url: "https://example.org".into(),
        }
    }

    #[test]
    fn name_must_be_unique() {
        let db = Database::open_in_memory().unwrap();
        db.create_organization(&organization("a@org.org", "Food Shelf")).unwrap();

        let err = db
            .create_organization(&organization("b@org.org", "Food Shelf"))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { ref field, .. } if field == "name"));
    }

    #[test]
    fn update_merges_fields() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_organization(&organization("a@org.org", "Food Shelf")).unwrap();

        let updated = db
            .update_organization(
                "a@org.org",
                OrganizationPatch {
                    website_url: Some("https://foodshelf.example.org".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.website_url, "https://foodshelf.example.org");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
    }

    #[test]
    fn delete_then_get_is_none() {
        let db = Database::open_in_memory().unwrap();
        db.create_organization(&organization("a@org.org", "Food Shelf")).unwrap();

        db.delete_organization("a@org.org").unwrap();
        assert!(db.get_organization_by_email("a@org.org").unwrap().is_none());
        assert!(matches!(
            db.delete_organization("a@org.org"),
            Err(DbError::NotFound { .. })
        ));
    }
}
