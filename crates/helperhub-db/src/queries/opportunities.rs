use chrono::Utc;
use helperhub_types::api::OpportunityFilter;
use helperhub_types::models::Opportunity;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{format_timestamp, timestamp_at};
use crate::error::write_error;
use crate::models::{NewOpportunity, OpportunityPatch};
use crate::{Database, DbError, Result};

const ENTITY: &str = "opportunity";

const SELECT_OPPORTUNITY: &str = "SELECT id, organization_email, category, title, description, location, hours_required,
            created_at, updated_at
     FROM opportunities";

impl Database {
    pub fn create_opportunity(&self, new: &NewOpportunity) -> Result<Opportunity> {
        let now = format_timestamp(&Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO opportunities
                    (organization_email, category, title, description, location, hours_required, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    new.organization_email,
                    new.category,
                    new.title,
                    new.description,
                    new.location,
                    format_timestamp(&new.hours_required),
                    now
                ],
            )
            .map_err(write_error(ENTITY))?;

            let id = conn.last_insert_rowid();
            query_opportunity(conn, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))
        })
    }

    pub fn get_opportunity(&self, id: i64) -> Result<Option<Opportunity>> {
        self.with_conn(|conn| query_opportunity(conn, id))
    }

    /// Opportunities matching every filter field that is set, oldest first.
    pub fn list_opportunities(&self, filter: &OpportunityFilter) -> Result<Vec<Opportunity>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_OPPORTUNITY}
                 WHERE (?1 IS NULL OR organization_email = ?1)
                   AND (?2 IS NULL OR category = ?2)
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map(
                    params![filter.organization_email, filter.category],
                    opportunity_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_opportunity(&self, id: i64, patch: OpportunityPatch) -> Result<Opportunity> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut opportunity =
                query_opportunity(&tx, id)?.ok_or_else(|| DbError::not_found(ENTITY, id))?;
            patch.apply(&mut opportunity);
            opportunity.updated_at = Utc::now();

            tx.execute(
                "UPDATE opportunities
                 SET organization_email = ?1, category = ?2, title = ?3, description = ?4,
                     location = ?5, hours_required = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    opportunity.organization_email,
                    opportunity.category,
                    opportunity.title,
                    opportunity.description,
                    opportunity.location,
                    format_timestamp(&opportunity.hours_required),
                    format_timestamp(&opportunity.updated_at),
                    opportunity.id
                ],
            )
            .map_err(write_error(ENTITY))?;

            tx.commit()?;
            Ok(opportunity)
        })
    }

    /// Applications to the opportunity are left in place.
    pub fn delete_opportunity(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM opportunities WHERE id = ?1", [id])?;
            if removed == 0 {
                return Err(DbError::not_found(ENTITY, id));
            }
            Ok(())
        })
    }
}

fn opportunity_from_row(row: &Row<'_>) -> rusqlite::Result<Opportunity> {
    Ok(Opportunity {
        id: row.get(0)?,
        organization_email: row.get(1)?,
        category: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        location: row.get(5)?,
        hours_required: timestamp_at(row, 6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}

fn query_opportunity(conn: &Connection, id: i64) -> Result<Option<Opportunity>> {
    let opportunity = conn
        .query_row(
            &format!("{SELECT_OPPORTUNITY} WHERE id = ?1"),
            [id],
            opportunity_from_row,
        )
        .optional()?;
    Ok(opportunity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn opportunity(org: &str, category: &str) -> NewOpportunity {
        NewOpportunity {
            organization_email: org.into(),
            category: category.into(),
            title: "Pantry shift".into(),
            description: "Sort donations".into(),
            location: "Minneapolis".into(),
            hours_required: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn organization_is_not_enforced() {
        let db = Database::open_in_memory().unwrap();
        let created = db
            .create_opportunity(&opportunity("nobody@org.org", "Food"))
            .unwrap();

        let fetched = db.get_opportunity(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.hours_required,
            Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn list_applies_filters() {
        let db = Database::open_in_memory().unwrap();
        db.create_opportunity(&opportunity("a@org.org", "Food")).unwrap();
        db.create_opportunity(&opportunity("a@org.org", "Education")).unwrap();
        db.create_opportunity(&opportunity("b@org.org", "Food")).unwrap();

        assert_eq!(db.list_opportunities(&OpportunityFilter::default()).unwrap().len(), 3);

        let food = db
            .list_opportunities(&OpportunityFilter {
                category: Some("Food".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(food.len(), 2);

        let a_food = db
            .list_opportunities(&OpportunityFilter {
                organization_email: Some("a@org.org".into()),
                category: Some("Food".into()),
            })
            .unwrap();
        assert_eq!(a_food.len(), 1);
    }

    #[test]
    fn update_and_delete_by_id() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_opportunity(&opportunity("a@org.org", "Food")).unwrap();

        let updated = db
            .update_opportunity(
                created.id,
                OpportunityPatch {
                    title: Some("Weekend pantry shift".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Weekend pantry shift");
        assert_eq!(updated.category, "Food");

        db.delete_opportunity(created.id).unwrap();
        assert!(db.get_opportunity(created.id).unwrap().is_none());
        assert!(matches!(
            db.update_opportunity(created.id, OpportunityPatch::default()),
            Err(DbError::NotFound { .. })
        ));
    }
}
