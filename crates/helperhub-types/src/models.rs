use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::StringList;

/// Platform account (staff, admins). Addressed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    /// Subject id in the external identity provider, empty when the user was
    /// never mirrored there.
    #[serde(default)]
    pub identity_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub category_list: StringList,
    pub available_hours: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub website_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// An opening posted by an organization. `organization_email` and `category`
/// are plain values, not enforced references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    pub organization_email: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub hours_required: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub volunteer_id: i64,
    pub opportunity_id: i64,
    pub status: String,
    pub cover_letter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status given to applications created without one.
pub const DEFAULT_APPLICATION_STATUS: &str = "pending";

/// Accounts that can sign in with a locally stored password.
pub trait Account {
    fn email(&self) -> &str;
    fn password_hash(&self) -> &str;
}

impl Account for Volunteer {
    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl Account for Organization {
    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let volunteer = Volunteer {
            id: 1,
            email: "a@b.com".into(),
            password_hash: "$argon2id$secret".into(),
            name: "A".into(),
            phone: "123".into(),
            location: String::new(),
            bio: String::new(),
            category_list: StringList::new(vec!["cleanup".into()]),
            available_hours: 5,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&volunteer).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["category_list"], serde_json::json!(["cleanup"]));
        assert_eq!(json["available_hours"], 5);
    }
}
