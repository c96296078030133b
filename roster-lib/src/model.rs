//! Records and partial updates of the `users` table.
//!
//! [`UserRecord`] mirrors one row of the table. Writes never send a whole
//! record back: they send a [`UserPatch`] naming exactly the columns that
//! changed, so two editors working on different columns of the same record
//! never overwrite each other.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use heck::ToTitleCase;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;
use tracing::warn;

/// Opaque identifier assigned by the store when a record is created.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The columns shown in the roster list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Roster rows paired with their 1-based display index. The index is not
/// stored and shifts when earlier rows are deleted.
pub fn roster_rows(users: &[UserSummary]) -> impl Iterator<Item = (usize, &UserSummary)> {
    (1..).zip(users)
}

/// Payload of the "Add user" flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(Field),
    #[error("`{0}` is not an e-mail address")]
    Email(String),
}

impl NewUser {
    pub fn new(name: &str, email: &str, contact: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            contact: contact.to_string(),
        }
    }

    /// Checks the same things the creation form enforces: a name, and an
    /// e-mail that at least looks like one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Missing(Field::Name));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::Missing(Field::Email));
        }
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ValidationError::Email(self.email.clone())),
        }
    }
}

/// One entry of a user's work history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub subdomain: String,
    /// One of [`crate::options::EXPERIENCE_BRACKETS`], or empty.
    #[serde(default)]
    pub experience: String,
}

/// A full row of the `users` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub year_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub alternate_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub domicile_state: Option<String>,
    #[serde(default)]
    pub domicile_country: Option<String>,

    #[serde(default)]
    pub school_college: Option<String>,
    #[serde(default)]
    pub highest_degree: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year_of_completion: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub projects: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WorkExperience>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WorkExperience>>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserRecord {
    /// Current value of a text column. Always `None` for
    /// [`Field::WorkExperience`].
    pub fn text(&self, field: Field) -> Option<&str> {
        use Field::*;

        match field {
            Name => Some(self.name.as_str()),
            Email => Some(self.email.as_str()),
            Contact => Some(self.contact.as_str()),
            WorkExperience => None,
            _ => self.optional_text(field).and_then(|v| v.as_deref()),
        }
    }

    /// Text column with absent values read as the empty string, the way every
    /// editor initialises its inputs.
    pub fn text_or_empty(&self, field: Field) -> String {
        self.text(field).unwrap_or_default().to_string()
    }

    fn set_text(&mut self, field: Field, value: Option<String>) {
        use Field::*;

        match field {
            Name => self.name = value.unwrap_or_default(),
            Email => self.email = value.unwrap_or_default(),
            Contact => self.contact = value.unwrap_or_default(),
            WorkExperience => {
                if value.is_none() {
                    self.work_experience.clear();
                }
            }
            _ => {
                if let Some(slot) = self.optional_text_mut(field) {
                    *slot = value;
                }
            }
        }
    }

    fn optional_text(&self, field: Field) -> Option<&Option<String>> {
        use Field::*;

        Some(match field {
            FirstName => &self.first_name,
            LastName => &self.last_name,
            YearOfBirth => &self.year_of_birth,
            Gender => &self.gender,
            PhoneNumber => &self.phone_number,
            AlternatePhone => &self.alternate_phone,
            Address => &self.address,
            Pincode => &self.pincode,
            DomicileState => &self.domicile_state,
            DomicileCountry => &self.domicile_country,
            SchoolCollege => &self.school_college,
            HighestDegree => &self.highest_degree,
            Course => &self.course,
            YearOfCompletion => &self.year_of_completion,
            Grade => &self.grade,
            Skills => &self.skills,
            Projects => &self.projects,
            LinkedinUrl => &self.linkedin_url,
            ResumeUrl => &self.resume_url,
            AvatarUrl => &self.avatar_url,
            Name | Email | Contact | WorkExperience => return None,
        })
    }

    fn optional_text_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        use Field::*;

        Some(match field {
            FirstName => &mut self.first_name,
            LastName => &mut self.last_name,
            YearOfBirth => &mut self.year_of_birth,
            Gender => &mut self.gender,
            PhoneNumber => &mut self.phone_number,
            AlternatePhone => &mut self.alternate_phone,
            Address => &mut self.address,
            Pincode => &mut self.pincode,
            DomicileState => &mut self.domicile_state,
            DomicileCountry => &mut self.domicile_country,
            SchoolCollege => &mut self.school_college,
            HighestDegree => &mut self.highest_degree,
            Course => &mut self.course,
            YearOfCompletion => &mut self.year_of_completion,
            Grade => &mut self.grade,
            Skills => &mut self.skills,
            Projects => &mut self.projects,
            LinkedinUrl => &mut self.linkedin_url,
            ResumeUrl => &mut self.resume_url,
            AvatarUrl => &mut self.avatar_url,
            Name | Email | Contact | WorkExperience => return None,
        })
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Every mutable column of the `users` table. `id` and `created_at` are
/// owned by the store and never appear here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Contact,
    FirstName,
    LastName,
    YearOfBirth,
    Gender,
    PhoneNumber,
    AlternatePhone,
    Address,
    Pincode,
    DomicileState,
    DomicileCountry,
    SchoolCollege,
    HighestDegree,
    Course,
    YearOfCompletion,
    Grade,
    Skills,
    Projects,
    WorkExperience,
    LinkedinUrl,
    ResumeUrl,
    AvatarUrl,
}

impl Field {
    /// Column name in the table.
    pub fn column(self) -> &'static str {
        self.into()
    }

    /// Columns every row carries. Clearing one stores the empty string.
    pub fn is_required(self) -> bool {
        matches!(self, Field::Name | Field::Email | Field::Contact)
    }

    /// Human friendly label, e.g. `Year Of Birth`.
    pub fn label(self) -> String {
        self.column().to_title_case()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `None` clears the column.
    Text(Option<String>),
    WorkExperience(Vec<WorkExperience>),
}

/// A set of column writes against a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserPatch {
    changes: BTreeMap<Field, FieldValue>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into a text column.
    pub fn text(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set_text(field, Some(value.into()));
        self
    }

    /// Clear a column.
    pub fn clear(mut self, field: Field) -> Self {
        self.set_text(field, None);
        self
    }

    pub fn work_experience(mut self, entries: Vec<WorkExperience>) -> Self {
        self.changes
            .insert(Field::WorkExperience, FieldValue::WorkExperience(entries));
        self
    }

    pub fn set_text(&mut self, field: Field, value: Option<String>) {
        if field == Field::WorkExperience {
            match value {
                None => {
                    self.changes
                        .insert(field, FieldValue::WorkExperience(Vec::new()));
                }
                Some(_) => warn!("Ignoring text value for the work_experience column"),
            }
            return;
        }

        let value = match value {
            None if field.is_required() => Some(String::new()),
            value => value,
        };
        self.changes.insert(field, FieldValue::Text(value));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.changes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.changes.iter().map(|(field, value)| (*field, value))
    }

    /// Apply the patch to a local copy of a record. Columns the patch does not
    /// name are left alone.
    pub fn apply_to(&self, record: &mut UserRecord) {
        for (field, value) in &self.changes {
            match value {
                FieldValue::Text(text) => record.set_text(*field, text.clone()),
                FieldValue::WorkExperience(entries) => {
                    record.work_experience = entries.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_patch_touches_only_named_fields() {
        let mut record = UserRecord {
            id: "u1".into(),
            name: "A".into(),
            course: Some("Maths".into()),
            skills: Some("Rust".into()),
            ..Default::default()
        };
        let before = record.clone();

        UserPatch::new()
            .text(Field::Course, "CS")
            .apply_to(&mut record);

        assert_eq!(record.course.as_deref(), Some("CS"));
        assert_eq!(
            UserRecord {
                course: before.course.clone(),
                ..record.clone()
            },
            before
        );
    }

    #[test]
    fn test_patch_serializes_as_column_object() {
        let patch = UserPatch::new()
            .text(Field::LinkedinUrl, "linkedin.com/in/a")
            .clear(Field::ResumeUrl)
            .work_experience(vec![WorkExperience {
                domain: "Tech".into(),
                ..Default::default()
            }]);

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "linkedin_url": "linkedin.com/in/a",
                "resume_url": null,
                "work_experience": [{"domain": "Tech", "subdomain": "", "experience": ""}],
            })
        );
    }

    #[test]
    fn test_clearing_required_column_blanks_it() {
        let patch = UserPatch::new()
            .clear(Field::Contact)
            .clear(Field::Skills);

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"contact": "", "skills": null})
        );
    }

    #[test]
    fn test_record_reads_null_work_experience_as_empty() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": "1",
            "name": "A",
            "email": "a@x.com",
            "contact": "123",
            "work_experience": null,
            "skills": null,
        }))
        .unwrap();

        assert!(record.work_experience.is_empty());
        assert_eq!(record.skills, None);
        assert_eq!(record.text_or_empty(Field::Skills), "");
    }

    #[test]
    fn test_validate_new_user() {
        assert!(NewUser::new("A", "a@x.com", "123").validate().is_ok());
        assert!(NewUser::new("A", "a@x.com", "").validate().is_ok());
        assert_eq!(
            NewUser::new(" ", "a@x.com", "1").validate(),
            Err(ValidationError::Missing(Field::Name))
        );
        assert_eq!(
            NewUser::new("A", "nope", "1").validate(),
            Err(ValidationError::Email("nope".into()))
        );
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::SchoolCollege.column(), "school_college");
        assert_eq!(Field::YearOfBirth.label(), "Year Of Birth");
        assert_eq!("linkedin_url".parse::<Field>().unwrap(), Field::LinkedinUrl);
    }
}
