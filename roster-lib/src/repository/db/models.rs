use agdb::{DbElement, DbId};
use chrono::{DateTime, Utc};

use crate::model::{UserRecord, UserSummary, WorkExperience};

pub(crate) const CURRENT_MODEL_VERSION: u64 = 1;

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ModelVersion {
    db_id: Option<DbId>,
    version: u64,
}

impl ModelVersion {
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self {
            db_id: None,
            version: CURRENT_MODEL_VERSION,
        }
    }
}

/// A row of the `users` table as stored in agdb.
#[derive(Debug, Clone, Default, DbElement, PartialEq, PartialOrd)]
pub(crate) struct UserModel {
    pub(crate) db_id: Option<DbId>,
    /// Creation sequence number, used for ordering
    pub(crate) uid: u64,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) contact: String,
    /// RFC 3339 timestamp
    pub(crate) created_at: String,

    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) year_of_birth: Option<String>,
    pub(crate) gender: Option<String>,
    pub(crate) phone_number: Option<String>,
    pub(crate) alternate_phone: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) pincode: Option<String>,
    pub(crate) domicile_state: Option<String>,
    pub(crate) domicile_country: Option<String>,

    pub(crate) school_college: Option<String>,
    pub(crate) highest_degree: Option<String>,
    pub(crate) course: Option<String>,
    pub(crate) year_of_completion: Option<String>,
    pub(crate) grade: Option<String>,
    pub(crate) skills: Option<String>,
    pub(crate) projects: Option<String>,

    /// JSON encoded `Vec<WorkExperience>`
    pub(crate) work_experience: Option<String>,
    pub(crate) linkedin_url: Option<String>,
    pub(crate) resume_url: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

impl UserModel {
    pub fn new(uid: u64, id: String, name: &str, email: &str, contact: &str) -> Self {
        Self {
            uid,
            id,
            name: name.to_string(),
            email: email.to_string(),
            contact: contact.to_string(),
            created_at: Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.as_str().into(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn into_record(self) -> Result<UserRecord, serde_json::Error> {
        let work_experience: Vec<WorkExperience> = match &self.work_experience {
            Some(json) if !json.is_empty() => serde_json::from_str(json)?,
            _ => Vec::new(),
        };
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc));

        Ok(UserRecord {
            id: self.id.into(),
            name: self.name,
            email: self.email,
            contact: self.contact,
            created_at,
            first_name: self.first_name,
            last_name: self.last_name,
            year_of_birth: self.year_of_birth,
            gender: self.gender,
            phone_number: self.phone_number,
            alternate_phone: self.alternate_phone,
            address: self.address,
            pincode: self.pincode,
            domicile_state: self.domicile_state,
            domicile_country: self.domicile_country,
            school_college: self.school_college,
            highest_degree: self.highest_degree,
            course: self.course,
            year_of_completion: self.year_of_completion,
            grade: self.grade,
            skills: self.skills,
            projects: self.projects,
            work_experience,
            linkedin_url: self.linkedin_url,
            resume_url: self.resume_url,
            avatar_url: self.avatar_url,
        })
    }
}
