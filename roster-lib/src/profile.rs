//! State behind the profile view: one fetched record, the selected tab, and
//! the editing sessions each tab shows.

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use clap::ValueEnum;
use strum::{EnumIter, IntoStaticStr};

use crate::{
    model::{UserPatch, UserRecord},
    session::{
        BasicInfo, EditSession, Education, LinkedIn, Section, Skills, TextDraft, WorkHistory,
    },
    upload::ResumePreview,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum Tab {
    #[default]
    Basic,
    Education,
    Experience,
}

impl Tab {
    /// Sections shown by the tab, in display order.
    pub fn sections(self) -> &'static [SectionKind] {
        match self {
            Tab::Basic => &[SectionKind::Basic],
            Tab::Education => &[SectionKind::Education, SectionKind::Skills],
            Tab::Experience => &[SectionKind::Work, SectionKind::Linkedin],
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tab::Basic => "Basic Info",
            Tab::Education => "Education & skills",
            Tab::Experience => "Experience",
        })
    }
}

/// Names one of the editing sessions of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum SectionKind {
    Basic,
    Education,
    Skills,
    Work,
    Linkedin,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Basic => BasicInfo::TITLE,
            SectionKind::Education => Education::TITLE,
            SectionKind::Skills => Skills::TITLE,
            SectionKind::Work => WorkHistory::TITLE,
            SectionKind::Linkedin => LinkedIn::TITLE,
        }
    }

    pub fn tab(self) -> Tab {
        match self {
            SectionKind::Basic => Tab::Basic,
            SectionKind::Education | SectionKind::Skills => Tab::Education,
            SectionKind::Work | SectionKind::Linkedin => Tab::Experience,
        }
    }
}

/// The resume card of the experience tab.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResumePanel {
    #[default]
    Idle,
    /// Waiting for the user to pick a file
    Choosing,
    /// The preview overlay is open
    Previewing,
}

#[derive(Debug, Clone)]
pub struct ProfileState {
    record: UserRecord,
    pub tab: Tab,
    pub basic: EditSession<BasicInfo>,
    pub education: EditSession<Education>,
    pub skills: EditSession<Skills>,
    pub work: EditSession<WorkHistory>,
    pub linkedin: EditSession<LinkedIn>,
    pub resume: ResumePanel,
    /// Locally picked avatar, shown until the view is left
    pub avatar_preview: Option<PathBuf>,
}

/// Forward a call to the session named by a [`SectionKind`].
macro_rules! with_session {
    ($state:expr, $kind:expr, |$session:ident| $body:expr) => {
        match $kind {
            SectionKind::Basic => {
                let $session = &mut $state.basic;
                $body
            }
            SectionKind::Education => {
                let $session = &mut $state.education;
                $body
            }
            SectionKind::Skills => {
                let $session = &mut $state.skills;
                $body
            }
            SectionKind::Work => {
                let $session = &mut $state.work;
                $body
            }
            SectionKind::Linkedin => {
                let $session = &mut $state.linkedin;
                $body
            }
        }
    };
}

impl ProfileState {
    pub fn new(record: UserRecord) -> Self {
        Self {
            tab: Tab::default(),
            basic: EditSession::new(&record),
            education: EditSession::new(&record),
            skills: EditSession::new(&record),
            work: EditSession::new(&record),
            linkedin: EditSession::new(&record),
            resume: ResumePanel::default(),
            avatar_preview: None,
            record,
        }
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    /// Replace the record with a re-fetched one and let every session pick it
    /// up.
    pub fn reload(&mut self, record: UserRecord) {
        self.basic.sync(&record);
        self.education.sync(&record);
        self.skills.sync(&record);
        self.work.sync(&record);
        self.linkedin.sync(&record);
        self.record = record;
    }

    /// Press the edit/save control of a section. See [`EditSession::toggle`].
    pub fn toggle(&mut self, kind: SectionKind) -> Option<UserPatch> {
        with_session!(self, kind, |session| session.toggle())
    }

    pub fn finish<E: Display>(&mut self, kind: SectionKind, outcome: &Result<(), E>) {
        with_session!(self, kind, |session| session.finish(outcome))
    }

    pub fn cancel(&mut self, kind: SectionKind) {
        let record = &self.record;
        match kind {
            SectionKind::Basic => self.basic.cancel(record),
            SectionKind::Education => self.education.cancel(record),
            SectionKind::Skills => self.skills.cancel(record),
            SectionKind::Work => self.work.cancel(record),
            SectionKind::Linkedin => self.linkedin.cancel(record),
        }
    }

    pub fn is_editing(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Basic => self.basic.is_editing(),
            SectionKind::Education => self.education.is_editing(),
            SectionKind::Skills => self.skills.is_editing(),
            SectionKind::Work => self.work.is_editing(),
            SectionKind::Linkedin => self.linkedin.is_editing(),
        }
    }

    /// Message of the last failed commit of a section.
    pub fn error(&self, kind: SectionKind) -> Option<&str> {
        match kind {
            SectionKind::Basic => self.basic.error(),
            SectionKind::Education => self.education.error(),
            SectionKind::Skills => self.skills.error(),
            SectionKind::Work => self.work.error(),
            SectionKind::Linkedin => self.linkedin.error(),
        }
        .as_deref()
    }

    /// The draft of a plain text section. `None` for the work history.
    pub fn text_draft(&self, kind: SectionKind) -> Option<&TextDraft> {
        match kind {
            SectionKind::Basic => Some(self.basic.draft()),
            SectionKind::Education => Some(self.education.draft()),
            SectionKind::Skills => Some(self.skills.draft()),
            SectionKind::Linkedin => Some(self.linkedin.draft()),
            SectionKind::Work => None,
        }
    }

    /// Writable draft of a plain text section, while it is being edited.
    pub fn text_draft_mut(&mut self, kind: SectionKind) -> Option<&mut TextDraft> {
        match kind {
            SectionKind::Basic => self.basic.draft_mut(),
            SectionKind::Education => self.education.draft_mut(),
            SectionKind::Skills => self.skills.draft_mut(),
            SectionKind::Linkedin => self.linkedin.draft_mut(),
            SectionKind::Work => None,
        }
    }

    /// The stored resume value, if any.
    pub fn stored_resume(&self) -> Option<&str> {
        self.record
            .resume_url
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    pub fn resume_preview(&self) -> Option<ResumePreview> {
        self.stored_resume().map(ResumePreview::for_value)
    }

    /// What the avatar shows: a local preview first, then the stored value.
    pub fn avatar(&self) -> Option<PathBuf> {
        self.avatar_preview.clone().or_else(|| {
            self.record
                .avatar_url
                .as_deref()
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }
}
