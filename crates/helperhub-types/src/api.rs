//! Request and response payloads.
//!
//! Field names are snake_case. The web client still sends some payloads with
//! the capitalised names of the old backend (`Name`, `Bio_Data`,
//! `Category_List`, ...), so those are accepted as aliases.
//!
//! Create payloads default missing strings to empty and `validate` rejects
//! blank required fields. Update payloads are all-optional: only the fields
//! present in the body are applied to the stored record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::StringList;
use crate::error::ValidationError;

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn require_some<T>(value: &Option<T>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::MissingField(field)),
    }
}

fn not_blank(value: &Option<String>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::EmptyField(field)),
        _ => Ok(()),
    }
}

// -- Users --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default, alias = "password_hash", alias = "Password_Hash", alias = "Password")]
    pub password: String,
    #[serde(default, alias = "Full_Name")]
    pub full_name: String,
    #[serde(default, alias = "Role")]
    pub role: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.email, "email")?;
        require(&self.password, "password")?;
        require(&self.full_name, "full_name")?;
        require(&self.role, "role")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "password_hash", alias = "Password_Hash", alias = "Password")]
    pub password: Option<String>,
    #[serde(default, alias = "Full_Name")]
    pub full_name: Option<String>,
    #[serde(default, alias = "Role")]
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        not_blank(&self.email, "email")?;
        not_blank(&self.password, "password")?;
        not_blank(&self.full_name, "full_name")?;
        not_blank(&self.role, "role")
    }
}

// -- Volunteers --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVolunteerRequest {
    #[serde(default, alias = "Email")]
    pub email: String,
    /// Optional: volunteers who sign in only through the identity provider
    /// have no local password.
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Phone")]
    pub phone: String,
    #[serde(default, alias = "Location")]
    pub location: String,
    #[serde(default, alias = "bio_data", alias = "Bio_Data")]
    pub bio: String,
    #[serde(default, alias = "Category_List")]
    pub category_list: StringList,
    #[serde(default, alias = "Available_Hours", alias = "Availabile_Hours")]
    pub available_hours: Option<u32>,
}

impl CreateVolunteerRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.email, "email")?;
        not_blank(&self.password, "password")?;
        require(&self.name, "name")?;
        require(&self.phone, "phone")?;
        require_some(&self.available_hours, "available_hours")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVolunteerRequest {
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "Location")]
    pub location: Option<String>,
    #[serde(default, alias = "bio_data", alias = "Bio_Data")]
    pub bio: Option<String>,
    #[serde(default, alias = "Category_List")]
    pub category_list: Option<StringList>,
    #[serde(default, alias = "Available_Hours", alias = "Availabile_Hours")]
    pub available_hours: Option<u32>,
}

impl UpdateVolunteerRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.bio.is_none()
            && self.category_list.is_none()
            && self.available_hours.is_none()
    }

    /// `location` and `bio` may be cleared; identity fields may not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        not_blank(&self.email, "email")?;
        not_blank(&self.password, "password")?;
        not_blank(&self.name, "name")?;
        not_blank(&self.phone, "phone")
    }
}

// -- Organizations --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrganizationRequest {
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Phone")]
    pub phone: String,
    #[serde(default, alias = "Location", alias = "address")]
    pub location: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "Website_Url", alias = "website")]
    pub website_url: String,
}

impl CreateOrganizationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.email, "email")?;
        not_blank(&self.password, "password")?;
        require(&self.name, "name")?;
        require(&self.phone, "phone")?;
        require(&self.location, "location")?;
        require(&self.description, "description")?;
        require(&self.website_url, "website_url")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrganizationRequest {
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "Location", alias = "address")]
    pub location: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Website_Url", alias = "website")]
    pub website_url: Option<String>,
}

impl UpdateOrganizationRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.website_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        not_blank(&self.email, "email")?;
        not_blank(&self.password, "password")?;
        not_blank(&self.name, "name")?;
        not_blank(&self.phone, "phone")?;
        not_blank(&self.location, "location")?;
        not_blank(&self.description, "description")?;
        not_blank(&self.website_url, "website_url")
    }
}

// -- Categories --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default, alias = "Category", alias = "name")]
    pub category: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.category, "category")
    }
}

// -- Opportunities --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOpportunityRequest {
    #[serde(default, alias = "Organization_mail", alias = "organization_mail")]
    pub organization_email: String,
    #[serde(default, alias = "Category")]
    pub category: String,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "Location")]
    pub location: String,
    #[serde(default, alias = "Hours_Required")]
    pub hours_required: Option<DateTime<Utc>>,
}

impl CreateOpportunityRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.organization_email, "organization_email")?;
        require(&self.category, "category")?;
        require(&self.title, "title")?;
        require(&self.description, "description")?;
        require(&self.location, "location")?;
        require_some(&self.hours_required, "hours_required")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOpportunityRequest {
    #[serde(default, alias = "Organization_mail", alias = "organization_mail")]
    pub organization_email: Option<String>,
    #[serde(default, alias = "Category")]
    pub category: Option<String>,
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Location")]
    pub location: Option<String>,
    #[serde(default, alias = "Hours_Required")]
    pub hours_required: Option<DateTime<Utc>>,
}

impl UpdateOpportunityRequest {
    pub fn is_empty(&self) -> bool {
        self.organization_email.is_none()
            && self.category.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.hours_required.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        not_blank(&self.organization_email, "organization_email")?;
        not_blank(&self.category, "category")?;
        not_blank(&self.title, "title")?;
        not_blank(&self.description, "description")?;
        not_blank(&self.location, "location")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityFilter {
    pub organization_email: Option<String>,
    pub category: Option<String>,
}

// -- Applications --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApplicationRequest {
    #[serde(default, alias = "Volunteer_ID")]
    pub volunteer_id: Option<i64>,
    #[serde(default, alias = "Opportunity_ID")]
    pub opportunity_id: Option<i64>,
    /// Defaults to `pending` when absent.
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    #[serde(default, alias = "Cover_Letter")]
    pub cover_letter: String,
}

impl CreateApplicationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_some(&self.volunteer_id, "volunteer_id")?;
        require_some(&self.opportunity_id, "opportunity_id")?;
        not_blank(&self.status, "status")?;
        require(&self.cover_letter, "cover_letter")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default, alias = "Volunteer_ID")]
    pub volunteer_id: Option<i64>,
    #[serde(default, alias = "Opportunity_ID")]
    pub opportunity_id: Option<i64>,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    #[serde(default, alias = "Cover_Letter")]
    pub cover_letter: Option<String>,
}

impl UpdateApplicationRequest {
    pub fn is_empty(&self) -> bool {
        self.volunteer_id.is_none()
            && self.opportunity_id.is_none()
            && self.status.is_none()
            && self.cover_letter.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        not_blank(&self.status, "status")?;
        not_blank(&self.cover_letter, "cover_letter")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub volunteer_id: Option<i64>,
    pub opportunity_id: Option<i64>,
}

// -- Login --

/// The web client also sends a `role` hint; it is ignored because the route
/// already selects the account kind.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse<T> {
    pub user: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volunteer_create_without_password_is_valid() {
        let req: CreateVolunteerRequest = serde_json::from_value(serde_json::json!({
            "email": "a@b.com",
            "phone": "123",
            "name": "A",
            "category_list": ["cleanup", "tutoring"],
            "available_hours": 5
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.password, None);
        assert_eq!(req.category_list.len(), 2);
    }

    #[test]
    fn volunteer_create_requires_phone_and_hours() {
        let mut req = CreateVolunteerRequest {
            email: "a@b.com".into(),
            name: "A".into(),
            ..Default::default()
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingField("phone")));

        req.phone = "123".into();
        assert_eq!(
            req.validate(),
            Err(ValidationError::MissingField("available_hours"))
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let req = CreateUserRequest {
            email: "   ".into(),
            password: "pw".into(),
            full_name: "Alice".into(),
            role: "admin".into(),
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn blank_optional_password_is_rejected() {
        let req = CreateOrganizationRequest {
            email: "org@x.org".into(),
            password: Some(String::new()),
            name: "Org".into(),
            phone: "555".into(),
            ..Default::default()
        };
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("password")));
    }

    #[test]
    fn organization_profile_fields_are_required() {
        let mut req: CreateOrganizationRequest = serde_json::from_value(serde_json::json!({
            "email": "org@x.org",
            "name": "Food Shelf",
            "phone": "555-0100",
            "address": "12 Main St",
            "description": "Weekly food pantry"
        }))
        .unwrap();
        assert_eq!(
            req.validate(),
            Err(ValidationError::MissingField("website_url"))
        );

        req.website_url = "https://foodshelf.example.org".into();
        assert!(req.validate().is_ok());
        assert_eq!(req.location, "12 Main St");

        let update = UpdateOrganizationRequest {
            description: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(
            update.validate(),
            Err(ValidationError::EmptyField("description"))
        );
    }

    #[test]
    fn accepts_legacy_capitalised_update_fields() {
        let req: UpdateVolunteerRequest = serde_json::from_value(serde_json::json!({
            "Name": "Updated Volunteer",
            "Phone": "1234567890",
            "Location": "Some City",
            "Bio_Data": "A passionate volunteer.",
            "Available_Hours": 10,
            "Category_List": ["Teaching", "Event Planning"]
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.name.as_deref(), Some("Updated Volunteer"));
        assert_eq!(req.bio.as_deref(), Some("A passionate volunteer."));
        assert_eq!(req.available_hours, Some(10));
        assert_eq!(req.email, None);
    }

    #[test]
    fn empty_update_is_rejected() {
        let req = UpdateOrganizationRequest::default();
        assert_eq!(req.validate(), Err(ValidationError::NothingToUpdate));
    }

    #[test]
    fn update_may_clear_free_text_but_not_names() {
        let req = UpdateVolunteerRequest {
            bio: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let req = UpdateVolunteerRequest {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("name")));
    }

    #[test]
    fn opportunity_requires_every_field() {
        let req: CreateOpportunityRequest = serde_json::from_value(serde_json::json!({
            "organization_email": "org@x.org",
            "category": "Food",
            "title": "Pantry shift",
            "description": "Sort donations",
            "location": "Minneapolis"
        }))
        .unwrap();
        assert_eq!(
            req.validate(),
            Err(ValidationError::MissingField("hours_required"))
        );
    }

    #[test]
    fn application_status_is_optional() {
        let req: CreateApplicationRequest = serde_json::from_value(serde_json::json!({
            "volunteer_id": 1,
            "opportunity_id": 2,
            "cover_letter": "I'd love to help"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.status, None);
    }
}
