//! Read-only / editing controllers for one section of a profile.
//!
//! Each section of the profile owns a fixed, disjoint set of columns. An
//! [`EditSession`] holds a local draft of those columns, lets the user flip
//! between looking at them and editing them, and on commit produces a
//! [`UserPatch`] naming exactly those columns. After the store accepts the
//! patch the draft is thrown away and rebuilt from the re-fetched record.

use std::fmt::{Debug, Display};

use getset::Getters;
use strum::{EnumIter, IntoStaticStr};

use crate::{
    model::{Field, UserPatch, UserRecord, WorkExperience},
    phone,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum SessionMode {
    #[default]
    ReadOnly,
    Editing,
}

/// A group of columns edited together behind one edit/save toggle.
pub trait Section {
    type Draft: Debug + Clone + PartialEq;

    const TITLE: &'static str;
    /// The columns this section owns.
    const FIELDS: &'static [Field];

    /// Build a draft from the record, reading absent values as empty.
    fn draft(record: &UserRecord) -> Self::Draft;

    /// The update committing `draft`. Must only name [`Section::FIELDS`].
    fn patch(draft: &Self::Draft) -> UserPatch;
}

#[derive(Debug, Clone, Getters)]
pub struct EditSession<S: Section> {
    #[getset(get = "pub")]
    draft: S::Draft,
    mode: SessionMode,
    /// Message of the last failed commit, kept until the next attempt
    #[getset(get = "pub")]
    error: Option<String>,
}

impl<S: Section> EditSession<S> {
    pub fn new(record: &UserRecord) -> Self {
        Self {
            draft: S::draft(record),
            mode: SessionMode::ReadOnly,
            error: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.mode == SessionMode::Editing
    }

    pub fn title(&self) -> &'static str {
        S::TITLE
    }

    /// The edit/save control. Entering edit mode returns `None`; pressing it
    /// while editing returns the patch to commit. The session stays in edit
    /// mode until [`EditSession::finish`] reports the outcome.
    pub fn toggle(&mut self) -> Option<UserPatch> {
        match self.mode {
            SessionMode::ReadOnly => {
                self.mode = SessionMode::Editing;
                None
            }
            SessionMode::Editing => {
                self.error = None;
                Some(S::patch(&self.draft))
            }
        }
    }

    /// Mutable access to the draft. Inputs are only writable while editing.
    pub fn draft_mut(&mut self) -> Option<&mut S::Draft> {
        match self.mode {
            SessionMode::Editing => Some(&mut self.draft),
            SessionMode::ReadOnly => None,
        }
    }

    /// Report the outcome of a commit. A failed commit leaves the session in
    /// edit mode with its draft intact so it can be retried.
    pub fn finish<E: Display>(&mut self, outcome: &Result<(), E>) {
        match outcome {
            Ok(()) => {
                self.mode = SessionMode::ReadOnly;
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Leave edit mode without committing, restoring the record's values.
    pub fn cancel(&mut self, record: &UserRecord) {
        self.mode = SessionMode::ReadOnly;
        self.error = None;
        self.draft = S::draft(record);
    }

    /// Pick up a re-fetched record. Sessions in edit mode keep their
    /// uncommitted draft.
    pub fn sync(&mut self, record: &UserRecord) {
        if self.mode == SessionMode::ReadOnly {
            self.draft = S::draft(record);
        }
    }
}

/// A draft of plain text columns, in [`Section::FIELDS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDraft {
    values: Vec<(Field, String)>,
}

impl TextDraft {
    fn from_record(record: &UserRecord, fields: &[Field]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| (*field, record.text_or_empty(*field)))
                .collect(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map_or("", |(_, value)| value.as_str())
    }

    /// Set a column. Returns `false` if this draft does not own `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.as_str()))
    }

    fn patch(&self) -> UserPatch {
        self.values
            .iter()
            .fold(UserPatch::new(), |patch, (field, value)| {
                patch.text(*field, value.clone())
            })
    }

    /// Subscriber part of a phone column.
    pub fn phone_subscriber(&self, field: Field) -> &str {
        phone::subscriber(self.get(field))
    }

    /// Calling code of a phone column, defaulting when there is none.
    pub fn phone_code(&self, field: Field) -> String {
        phone::split(self.get(field)).code
    }

    /// Rewrite the subscriber part of a phone column, keeping its code.
    pub fn set_phone_subscriber(&mut self, field: Field, subscriber: &str) -> bool {
        let full = phone::with_subscriber(self.get(field), subscriber);
        self.set(field, full)
    }

    /// Rewrite the calling code of a phone column, keeping the subscriber.
    pub fn set_phone_code(&mut self, field: Field, code: &str) -> bool {
        let full = phone::with_code(self.get(field), code);
        self.set(field, full)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BasicInfo;

impl Section for BasicInfo {
    type Draft = TextDraft;

    const TITLE: &'static str = "Basic Details";
    const FIELDS: &'static [Field] = &[
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::YearOfBirth,
        Field::Gender,
        Field::PhoneNumber,
        Field::AlternatePhone,
        Field::Address,
        Field::Pincode,
        Field::DomicileState,
        Field::DomicileCountry,
    ];

    fn draft(record: &UserRecord) -> TextDraft {
        TextDraft::from_record(record, Self::FIELDS)
    }

    fn patch(draft: &TextDraft) -> UserPatch {
        draft.patch()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Education;

impl Section for Education {
    type Draft = TextDraft;

    const TITLE: &'static str = "Education Details";
    const FIELDS: &'static [Field] = &[
        Field::SchoolCollege,
        Field::HighestDegree,
        Field::Course,
        Field::YearOfCompletion,
        Field::Grade,
    ];

    fn draft(record: &UserRecord) -> TextDraft {
        TextDraft::from_record(record, Self::FIELDS)
    }

    fn patch(draft: &TextDraft) -> UserPatch {
        draft.patch()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Skills;

impl Section for Skills {
    type Draft = TextDraft;

    const TITLE: &'static str = "Skills & Projects";
    const FIELDS: &'static [Field] = &[Field::Skills, Field::Projects];

    fn draft(record: &UserRecord) -> TextDraft {
        TextDraft::from_record(record, Self::FIELDS)
    }

    fn patch(draft: &TextDraft) -> UserPatch {
        draft.patch()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LinkedIn;

impl Section for LinkedIn {
    type Draft = TextDraft;

    const TITLE: &'static str = "LinkedIn";
    const FIELDS: &'static [Field] = &[Field::LinkedinUrl];

    fn draft(record: &UserRecord) -> TextDraft {
        TextDraft::from_record(record, Self::FIELDS)
    }

    fn patch(draft: &TextDraft) -> UserPatch {
        draft.patch()
    }
}

/// Number of blank entries offered when a user has no work history yet.
pub const BLANK_WORK_ENTRIES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExperienceField {
    Domain,
    Subdomain,
    Experience,
}

/// Work history draft. Entries are addressed by position and the number of
/// entries is fixed once the draft is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkHistoryDraft {
    entries: Vec<WorkExperience>,
}

impl WorkHistoryDraft {
    pub fn entries(&self) -> &[WorkExperience] {
        &self.entries
    }

    /// Set one attribute of the entry at `index`. Returns `false` when there is
    /// no such entry.
    pub fn set(&mut self, index: usize, field: ExperienceField, value: impl Into<String>) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };

        let slot = match field {
            ExperienceField::Domain => &mut entry.domain,
            ExperienceField::Subdomain => &mut entry.subdomain,
            ExperienceField::Experience => &mut entry.experience,
        };
        *slot = value.into();

        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkHistory;

impl Section for WorkHistory {
    type Draft = WorkHistoryDraft;

    const TITLE: &'static str = "Work Experience";
    const FIELDS: &'static [Field] = &[Field::WorkExperience];

    fn draft(record: &UserRecord) -> WorkHistoryDraft {
        let entries = if record.work_experience.is_empty() {
            vec![WorkExperience::default(); BLANK_WORK_ENTRIES]
        } else {
            record.work_experience.clone()
        };

        WorkHistoryDraft { entries }
    }

    fn patch(draft: &WorkHistoryDraft) -> UserPatch {
        UserPatch::new().work_experience(draft.entries.clone())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::{Error, repository::StoreError};

    fn record() -> UserRecord {
        UserRecord {
            id: "u1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            contact: "123".into(),
            phone_number: Some("+919876543210".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_read_only_with_empty_strings() {
        let session = EditSession::<Education>::new(&record());

        assert!(!session.is_editing());
        assert_eq!(session.draft().get(Field::Course), "");
    }

    #[test]
    fn test_draft_is_locked_while_read_only() {
        let mut session = EditSession::<Education>::new(&record());

        assert!(session.draft_mut().is_none());

        assert_eq!(session.toggle(), None);
        assert!(session.is_editing());
        assert!(session.draft_mut().is_some());
    }

    #[test]
    fn test_commit_names_exactly_the_owned_fields() {
        let mut session = EditSession::<Education>::new(&record());
        session.toggle();
        session.draft_mut().unwrap().set(Field::Course, "CS");

        let patch = session.toggle().unwrap();

        assert_eq!(
            patch.fields().collect::<Vec<_>>(),
            {
                let mut fields = Education::FIELDS.to_vec();
                fields.sort();
                fields
            }
        );
        // Not committed yet
        assert!(session.is_editing());

        session.finish(&Ok::<_, Error>(()));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_failed_commit_stays_editable() {
        let mut session = EditSession::<Skills>::new(&record());
        session.toggle();
        session.draft_mut().unwrap().set(Field::Skills, "Rust");
        session.toggle();

        session.finish(&Err(Error::Store(StoreError::MissingId)));

        assert!(session.is_editing());
        assert!(session.error().is_some());
        assert_eq!(session.draft().get(Field::Skills), "Rust");
    }

    #[test]
    fn test_sync_keeps_uncommitted_drafts() {
        let mut editing = EditSession::<WorkHistory>::new(&record());
        let mut idle = EditSession::<Skills>::new(&record());
        editing.toggle();
        editing
            .draft_mut()
            .unwrap()
            .set(0, ExperienceField::Domain, "Tech");

        let mut refetched = record();
        refetched.skills = Some("Go".into());
        editing.sync(&refetched);
        idle.sync(&refetched);

        assert_eq!(editing.draft().entries().first().unwrap().domain, "Tech");
        assert_eq!(idle.draft().get(Field::Skills), "Go");
    }

    #[test]
    fn test_cancel_restores_record() {
        let mut session = EditSession::<LinkedIn>::new(&record());
        session.toggle();
        session.draft_mut().unwrap().set(Field::LinkedinUrl, "x");

        session.cancel(&record());

        assert!(!session.is_editing());
        assert_eq!(session.draft().get(Field::LinkedinUrl), "");
    }

    #[test]
    fn test_sections_are_disjoint() {
        let all = [
            BasicInfo::FIELDS,
            Education::FIELDS,
            Skills::FIELDS,
            WorkHistory::FIELDS,
            LinkedIn::FIELDS,
        ];
        let total: usize = all.iter().map(|fields| fields.len()).sum();
        let unique: HashSet<Field> = all.iter().flat_map(|fields| fields.iter().copied()).collect();

        assert_eq!(total, unique.len());
    }

    #[test]
    fn test_text_draft_rejects_foreign_fields() {
        let mut draft = Education::draft(&record());

        assert!(!draft.set(Field::Skills, "Rust"));
    }

    #[test]
    fn test_work_history_starts_with_two_blank_entries() {
        let draft = WorkHistory::draft(&record());

        assert_eq!(draft.entries().len(), BLANK_WORK_ENTRIES);
        assert!(draft.entries().iter().all(|e| *e == WorkExperience::default()));
    }

    #[test]
    fn test_work_history_update_by_position() {
        let mut rec = record();
        rec.work_experience = vec![
            WorkExperience {
                domain: "Tech".into(),
                subdomain: "MERN".into(),
                experience: "1-3".into(),
            },
            WorkExperience {
                domain: "Design".into(),
                subdomain: "UX".into(),
                experience: "0-1".into(),
            },
        ];
        let mut draft = WorkHistory::draft(&rec);

        assert!(draft.set(1, ExperienceField::Domain, "Research"));
        assert!(!draft.set(2, ExperienceField::Domain, "Nope"));

        let first = draft.entries().first().unwrap();
        let second = draft.entries().get(1).unwrap();
        assert_eq!(first, rec.work_experience.first().unwrap());
        assert_eq!(second.domain, "Research");
        assert_eq!(second.subdomain, "UX");
        assert_eq!(second.experience, "0-1");
        assert_eq!(draft.entries().len(), 2);
    }

    #[test]
    fn test_phone_editing_keeps_code() {
        let mut draft = BasicInfo::draft(&record());

        assert_eq!(draft.phone_subscriber(Field::PhoneNumber), "9876543210");
        let subscriber = draft.phone_subscriber(Field::PhoneNumber).to_string();
        draft.set_phone_subscriber(Field::PhoneNumber, &subscriber);
        assert_eq!(draft.get(Field::PhoneNumber), "+919876543210");

        draft.set_phone_subscriber(Field::AlternatePhone, "98765");
        assert_eq!(draft.get(Field::AlternatePhone), "+9198765");

        draft.set_phone_code(Field::AlternatePhone, "+44");
        assert_eq!(draft.get(Field::AlternatePhone), "+4498765");
    }
}
