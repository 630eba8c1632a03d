//! Insert and patch types for the store.
//!
//! Records read back from the store are the entity types from
//! `helperhub_types::models`. Writes go through the types here, which carry
//! an already-hashed password instead of the plaintext in the request.
//! Patches hold only the fields to change; `apply` merges them into a
//! loaded record.

use chrono::{DateTime, Utc};
use helperhub_types::api::{
    CreateApplicationRequest, CreateOpportunityRequest, CreateOrganizationRequest,
    CreateUserRequest, CreateVolunteerRequest, UpdateApplicationRequest, UpdateOpportunityRequest,
    UpdateOrganizationRequest, UpdateUserRequest, UpdateVolunteerRequest,
};
use helperhub_types::codec::StringList;
use helperhub_types::models::{
    Application, DEFAULT_APPLICATION_STATUS, Opportunity, Organization, User, Volunteer,
};

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

// -- Users --

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub identity_id: String,
}

impl NewUser {
    pub fn from_request(req: CreateUserRequest, password_hash: String, identity_id: String) -> Self {
        Self {
            email: req.email,
            password_hash,
            full_name: req.full_name,
            role: req.role,
            identity_id,
        }
    }
}

#[derive(Debug, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl UserPatch {
    pub fn from_request(req: UpdateUserRequest, password_hash: Option<String>) -> Self {
        Self {
            email: req.email,
            password_hash,
            full_name: req.full_name,
            role: req.role,
        }
    }

    pub fn apply(self, user: &mut User) {
        set(&mut user.email, self.email);
        set(&mut user.password_hash, self.password_hash);
        set(&mut user.full_name, self.full_name);
        set(&mut user.role, self.role);
    }
}

// -- Volunteers --

pub struct NewVolunteer {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub category_list: StringList,
    pub available_hours: u32,
}

impl NewVolunteer {
    /// `password_hash` is empty for volunteers without a local password.
    pub fn from_request(req: CreateVolunteerRequest, password_hash: String) -> Self {
        Self {
            email: req.email,
            password_hash,
            name: req.name,
            phone: req.phone,
            location: req.location,
            bio: req.bio,
            category_list: req.category_list,
            available_hours: req.available_hours.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct VolunteerPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub category_list: Option<StringList>,
    pub available_hours: Option<u32>,
}

impl VolunteerPatch {
    pub fn from_request(req: UpdateVolunteerRequest, password_hash: Option<String>) -> Self {
        Self {
            email: req.email,
            password_hash,
            name: req.name,
            phone: req.phone,
            location: req.location,
            bio: req.bio,
            category_list: req.category_list,
            available_hours: req.available_hours,
        }
    }

    pub fn apply(self, volunteer: &mut Volunteer) {
        set(&mut volunteer.email, self.email);
        set(&mut volunteer.password_hash, self.password_hash);
        set(&mut volunteer.name, self.name);
        set(&mut volunteer.phone, self.phone);
        set(&mut volunteer.location, self.location);
        set(&mut volunteer.bio, self.bio);
        set(&mut volunteer.category_list, self.category_list);
        set(&mut volunteer.available_hours, self.available_hours);
    }
}

// -- Organizations --

pub struct NewOrganization {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub website_url: String,
}

impl NewOrganization {
    pub fn from_request(req: CreateOrganizationRequest, password_hash: String) -> Self {
        Self {
            email: req.email,
            password_hash,
            name: req.name,
            phone: req.phone,
            location: req.location,
            description: req.description,
            website_url: req.website_url,
        }
    }
}

#[derive(Debug, Default)]
pub struct OrganizationPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
}

impl OrganizationPatch {
    pub fn from_request(req: UpdateOrganizationRequest, password_hash: Option<String>) -> Self {
        Self {
            email: req.email,
            password_hash,
            name: req.name,
            phone: req.phone,
            location: req.location,
            description: req.description,
            website_url: req.website_url,
        }
    }

    pub fn apply(self, organization: &mut Organization) {
        set(&mut organization.email, self.email);
        set(&mut organization.password_hash, self.password_hash);
        set(&mut organization.name, self.name);
        set(&mut organization.phone, self.phone);
        set(&mut organization.location, self.location);
        set(&mut organization.description, self.description);
        set(&mut organization.website_url, self.website_url);
    }
}

// -- Opportunities --

pub struct NewOpportunity {
    pub organization_email: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub hours_required: DateTime<Utc>,
}

impl From<CreateOpportunityRequest> for NewOpportunity {
    fn from(req: CreateOpportunityRequest) -> Self {
        Self {
            organization_email: req.organization_email,
            category: req.category,
            title: req.title,
            description: req.description,
            location: req.location,
            hours_required: req.hours_required.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct OpportunityPatch {
    pub organization_email: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub hours_required: Option<DateTime<Utc>>,
}

impl From<UpdateOpportunityRequest> for OpportunityPatch {
    fn from(req: UpdateOpportunityRequest) -> Self {
        Self {
            organization_email: req.organization_email,
            category: req.category,
            title: req.title,
            description: req.description,
            location: req.location,
            hours_required: req.hours_required,
        }
    }
}

impl OpportunityPatch {
    pub fn apply(self, opportunity: &mut Opportunity) {
        set(&mut opportunity.organization_email, self.organization_email);
        set(&mut opportunity.category, self.category);
        set(&mut opportunity.title, self.title);
        set(&mut opportunity.description, self.description);
        set(&mut opportunity.location, self.location);
        set(&mut opportunity.hours_required, self.hours_required);
    }
}

// -- Applications --

pub struct NewApplication {
    pub volunteer_id: i64,
    pub opportunity_id: i64,
    pub status: String,
    pub cover_letter: String,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(req: CreateApplicationRequest) -> Self {
        Self {
            volunteer_id: req.volunteer_id.unwrap_or_default(),
            opportunity_id: req.opportunity_id.unwrap_or_default(),
            status: req
                .status
                .unwrap_or_else(|| DEFAULT_APPLICATION_STATUS.to_string()),
            cover_letter: req.cover_letter,
        }
    }
}

#[derive(Debug, Default)]
pub struct ApplicationPatch {
    pub volunteer_id: Option<i64>,
    pub opportunity_id: Option<i64>,
    pub status: Option<String>,
    pub cover_letter: Option<String>,
}

impl From<UpdateApplicationRequest> for ApplicationPatch {
    fn from(req: UpdateApplicationRequest) -> Self {
        Self {
            volunteer_id: req.volunteer_id,
            opportunity_id: req.opportunity_id,
            status: req.status,
            cover_letter: req.cover_letter,
        }
    }
}

impl ApplicationPatch {
    pub fn apply(self, application: &mut Application) {
        set(&mut application.volunteer_id, self.volunteer_id);
        set(&mut application.opportunity_id, self.opportunity_id);
        set(&mut application.status, self.status);
        set(&mut application.cover_letter, self.cover_letter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_status_defaults_to_pending() {
        let new = NewApplication::from(CreateApplicationRequest {
            volunteer_id: Some(1),
            opportunity_id: Some(2),
            status: None,
            cover_letter: "hi".into(),
        });
        assert_eq!(new.status, "pending");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let now = Utc::now();
        let mut volunteer = Volunteer {
            id: 7,
            email: "a@b.com".into(),
            password_hash: "hash".into(),
            name: "A".into(),
            phone: "123".into(),
            location: "Here".into(),
            bio: "Bio".into(),
            category_list: StringList::new(vec!["cleanup".into()]),
            available_hours: 5,
            created_at: now,
            updated_at: now,
        };

        VolunteerPatch {
            name: Some("B".into()),
            ..Default::default()
        }
        .apply(&mut volunteer);

        assert_eq!(volunteer.name, "B");
        assert_eq!(volunteer.email, "a@b.com");
        assert_eq!(volunteer.password_hash, "hash");
        assert_eq!(volunteer.category_list.len(), 1);
        assert_eq!(volunteer.available_hours, 5);
    }
}
