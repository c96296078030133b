//! Detail view of one user: a header card and three tabs of independently
//! editable sections.

use std::path::PathBuf;

use iced::{
    Alignment, Element, Length, Task, clipboard,
    widget::{
        Column, button, column, container, image, pick_list, row, scrollable, space, text,
        text_input,
    },
};
use rfd::AsyncFileDialog;
use roster_lib::{
    Repository,
    model::{Field, UserId, UserPatch, UserRecord},
    options::{self, Choice},
    profile::{ProfileState, ResumePanel, SectionKind, Tab},
    session::ExperienceField,
    upload::{self, ResumePreview},
};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::{components::blocking, icons::icon, modal};

mod basic_info;
mod education;
mod experience;

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Result<Option<UserRecord>, String>),
    TabSelected(Tab),
    // Sections
    EditPressed(SectionKind),
    CancelPressed(SectionKind),
    Committed(SectionKind, Result<Option<UserRecord>, String>),
    TextInput(SectionKind, Field, String),
    ChoiceSelected(SectionKind, Field, Choice),
    YearSelected(SectionKind, Field, String),
    PhoneInput(Field, String),
    PhoneCodeSelected(Field, Choice),
    ExperienceInput(usize, ExperienceField, String),
    ExperienceSelected(usize, Choice),
    // Header
    CopyEmailPressed,
    AvatarPressed,
    AvatarPicked(Option<PathBuf>),
    // Resume
    UploadResumePressed,
    ResumePicked(Option<PathBuf>),
    RemoveResumePressed,
    PreviewResumePressed,
    CopyResumeLinkPressed,
    ClosePreview,
    /// An avatar or resume write finished
    FileStored(Result<Option<UserRecord>, String>),
}

pub enum Action {
    None,
    Run(Task<Message>),
}

#[derive(Debug, Clone)]
pub enum State {
    Loading,
    Error(String),
    Missing,
    Loaded(Box<ProfileState>),
}

pub struct Profile {
    repo: Repository,
    id: UserId,
    state: State,
    /// Failure of the last avatar or resume write
    notice: Option<String>,
}

impl Profile {
    pub fn new(repo: Repository, id: UserId) -> (Self, Task<Message>) {
        let task = fetch(repo.clone(), id.clone());

        (
            Self {
                repo,
                id,
                state: State::Loading,
                notice: None,
            },
            task,
        )
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::Loaded(result) => {
                self.state = match result {
                    Ok(Some(record)) => State::Loaded(Box::new(ProfileState::new(record))),
                    Ok(None) => State::Missing,
                    Err(err) => State::Error(err),
                };
                Action::None
            }
            message => match &mut self.state {
                State::Loaded(profile) => {
                    let (repo, id) = (self.repo.clone(), self.id.clone());
                    update_loaded(profile, &mut self.notice, repo, id, message)
                }
                _ => Action::None,
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let profile = match &self.state {
            State::Loading => return text("Loading profile...").into(),
            State::Error(e) => return text(e.as_str()).style(text::danger).into(),
            State::Missing => return text("This user no longer exists").into(),
            State::Loaded(profile) => profile,
        };

        let tabs = row(Tab::iter().map(|tab| {
            button(text(tab.to_string()))
                .style(if tab == profile.tab {
                    button::primary
                } else {
                    button::subtle
                })
                .on_press(Message::TabSelected(tab))
                .into()
        }))
        .spacing(4);

        let body = match profile.tab {
            Tab::Basic => basic_info::view(profile),
            Tab::Education => education::view(profile),
            Tab::Experience => experience::view(profile),
        };

        let mut content = column![self.header(profile), tabs].spacing(16);
        if let Some(notice) = &self.notice {
            content = content.push(text(notice.as_str()).style(text::danger));
        }
        let content = container(scrollable(content.push(body).padding(20))).height(Length::Fill);

        if profile.resume == ResumePanel::Previewing {
            modal(content, resume_preview(profile), Some(Message::ClosePreview))
        } else {
            content.into()
        }
    }

    fn header<'a>(&'a self, profile: &'a ProfileState) -> Element<'a, Message> {
        let record = profile.record();

        let avatar: Element<'a, Message> = match profile.avatar().filter(|path| path.is_file()) {
            Some(path) => image(image::Handle::from_path(path))
                .width(96)
                .height(96)
                .into(),
            None => icon("avatar").width(96).height(96).into(),
        };

        container(
            row![
                button(avatar)
                    .style(button::text)
                    .on_press(Message::AvatarPressed),
                column![
                    text(record.name.as_str()).size(24),
                    row![
                        text(record.email.as_str()),
                        button(icon("copy"))
                            .style(button::subtle)
                            .on_press(Message::CopyEmailPressed),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                    text(record.contact.as_str()).style(text::secondary),
                ]
                .spacing(4),
            ]
            .spacing(16)
            .align_y(Alignment::Center),
        )
        .padding(16)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
    }
}

fn update_loaded(
    profile: &mut ProfileState,
    notice: &mut Option<String>,
    repo: Repository,
    id: UserId,
    message: Message,
) -> Action {
    match message {
        // Handled by the caller
        Message::Loaded(_) => Action::None,
        Message::TabSelected(tab) => {
            profile.tab = tab;
            Action::None
        }
        Message::EditPressed(kind) => match profile.toggle(kind) {
            Some(patch) => Action::Run(commit(repo, id, kind, patch)),
            None => Action::None,
        },
        Message::CancelPressed(kind) => {
            profile.cancel(kind);
            Action::None
        }
        Message::Committed(kind, result) => {
            profile.finish(kind, &result.as_ref().map(|_| ()));
            match result {
                Ok(Some(record)) => profile.reload(record),
                Ok(None) => warn!("User {id} disappeared while saving {}", kind.title()),
                Err(_) => {}
            }
            Action::None
        }
        Message::TextInput(kind, field, value) => {
            if let Some(draft) = profile.text_draft_mut(kind) {
                draft.set(field, value);
            }
            Action::None
        }
        Message::ChoiceSelected(kind, field, choice) => {
            if let Some(draft) = profile.text_draft_mut(kind) {
                draft.set(field, choice.value);
            }
            Action::None
        }
        Message::YearSelected(kind, field, year) => {
            if let Some(draft) = profile.text_draft_mut(kind) {
                draft.set(field, year);
            }
            Action::None
        }
        Message::PhoneInput(field, value) => {
            if let Some(draft) = profile.text_draft_mut(SectionKind::Basic) {
                draft.set_phone_subscriber(field, &value);
            }
            Action::None
        }
        Message::PhoneCodeSelected(field, code) => {
            if let Some(draft) = profile.text_draft_mut(SectionKind::Basic) {
                draft.set_phone_code(field, code.value);
            }
            Action::None
        }
        Message::ExperienceInput(index, field, value) => {
            if let Some(draft) = profile.work.draft_mut() {
                draft.set(index, field, value);
            }
            Action::None
        }
        Message::ExperienceSelected(index, choice) => {
            if let Some(draft) = profile.work.draft_mut() {
                draft.set(index, ExperienceField::Experience, choice.value);
            }
            Action::None
        }
        Message::CopyEmailPressed => {
            Action::Run(clipboard::write(profile.record().email.clone()))
        }
        Message::AvatarPressed => Action::Run(Task::perform(
            pick_file("Images", upload::AVATAR_EXTENSIONS),
            Message::AvatarPicked,
        )),
        Message::AvatarPicked(path) => match path {
            Some(path) => {
                profile.avatar_preview = Some(path.clone());
                *notice = None;
                Action::Run(Task::perform(
                    blocking(move || {
                        repo.set_avatar(&id, &path)?;
                        repo.user(&id)
                    }),
                    Message::FileStored,
                ))
            }
            None => Action::None,
        },
        Message::UploadResumePressed => {
            profile.resume = ResumePanel::Choosing;
            Action::Run(Task::perform(
                pick_file("Documents", upload::RESUME_EXTENSIONS),
                Message::ResumePicked,
            ))
        }
        Message::ResumePicked(path) => {
            profile.resume = ResumePanel::Idle;
            match path {
                Some(path) => {
                    *notice = None;
                    Action::Run(Task::perform(
                        blocking(move || {
                            repo.set_resume(&id, &path)?;
                            repo.user(&id)
                        }),
                        Message::FileStored,
                    ))
                }
                None => Action::None,
            }
        }
        Message::RemoveResumePressed => {
            *notice = None;
            Action::Run(Task::perform(
                blocking(move || {
                    repo.clear_resume(&id)?;
                    repo.user(&id)
                }),
                Message::FileStored,
            ))
        }
        Message::PreviewResumePressed => {
            profile.resume = ResumePanel::Previewing;
            Action::None
        }
        Message::CopyResumeLinkPressed => {
            match profile.resume_preview().as_ref().and_then(ResumePreview::url) {
                Some(url) => Action::Run(clipboard::write(url.to_string())),
                None => Action::None,
            }
        }
        Message::ClosePreview => {
            profile.resume = ResumePanel::Idle;
            Action::None
        }
        Message::FileStored(result) => {
            match result {
                Ok(Some(record)) => profile.reload(record),
                Ok(None) => {}
                Err(err) => *notice = Some(err),
            }
            Action::None
        }
    }
}

fn fetch(repo: Repository, id: UserId) -> Task<Message> {
    Task::perform(blocking(move || repo.user(&id)), Message::Loaded)
}

/// Apply a section's patch and read the record back.
fn commit(repo: Repository, id: UserId, kind: SectionKind, patch: UserPatch) -> Task<Message> {
    debug!("Committing {} of user {id}", kind.title());

    Task::perform(
        blocking(move || repo.update_and_fetch(&id, &patch)),
        move |result| Message::Committed(kind, result),
    )
}

async fn pick_file(filter: &'static str, extensions: &'static [&'static str]) -> Option<PathBuf> {
    AsyncFileDialog::new()
        .add_filter(filter, extensions)
        .pick_file()
        .await
        .map(|file_handle| file_handle.path().to_path_buf())
}

fn resume_preview(profile: &ProfileState) -> Element<'_, Message> {
    let body: Element<'_, Message> = match profile.resume_preview() {
        Some(preview @ (ResumePreview::Embedded(_) | ResumePreview::Linked(_))) => column![
            text(preview.url().unwrap_or_default().to_string()),
            button(row![icon("copy"), text("Copy link")].spacing(6))
                .on_press(Message::CopyResumeLinkPressed),
        ]
        .spacing(8)
        .into(),
        _ => text(ResumePreview::UNAVAILABLE_MESSAGE).into(),
    };

    container(
        column![
            row![
                text("Resume preview").size(20),
                space::horizontal(),
                button(icon("cancel"))
                    .style(button::subtle)
                    .on_press(Message::ClosePreview),
            ],
            body,
        ]
        .spacing(16),
    )
    .padding(20)
    .width(480)
    .style(container::rounded_box)
    .into()
}

/// A titled card with the edit/save control of one section.
fn section<'a>(
    profile: &'a ProfileState,
    kind: SectionKind,
    body: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    let editing = profile.is_editing(kind);

    let mut controls = row![].spacing(6);
    if editing {
        controls = controls.push(
            button(icon("cancel"))
                .style(button::secondary)
                .on_press(Message::CancelPressed(kind)),
        );
    }
    let (glyph, label) = if editing {
        ("save", "Save")
    } else {
        ("edit", "Edit")
    };
    controls = controls.push(
        button(row![icon(glyph), text(label)].spacing(6)).on_press(Message::EditPressed(kind)),
    );

    let mut content = column![
        row![text(kind.title()).size(18), space::horizontal(), controls]
            .align_y(Alignment::Center)
    ]
    .spacing(12);

    if let Some(error) = profile.error(kind) {
        content = content.push(text(format!("Could not save: {error}")).style(text::danger));
    }

    container(content.push(body))
        .padding(16)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn labeled<'a>(label: String, input: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    column![text(label).size(12), input.into()]
        .spacing(4)
        .width(Length::Fill)
        .into()
}

/// A free text input bound to one column. Disabled unless the section is
/// being edited.
fn text_field(profile: &ProfileState, kind: SectionKind, field: Field) -> Element<'_, Message> {
    let value = profile
        .text_draft(kind)
        .map_or("", |draft| draft.get(field));

    labeled(
        field.label(),
        text_input("", value).on_input_maybe(
            profile
                .is_editing(kind)
                .then_some(move |value: String| Message::TextInput(kind, field, value)),
        ),
    )
}

/// A column restricted to a fixed list of choices.
fn choice_field<'a>(
    profile: &'a ProfileState,
    kind: SectionKind,
    field: Field,
    choices: &'static [Choice],
) -> Element<'a, Message> {
    let value = profile
        .text_draft(kind)
        .map_or("", |draft| draft.get(field));

    let input: Element<'a, Message> = if profile.is_editing(kind) {
        pick_list(choices, options::find(choices, value), move |choice| {
            Message::ChoiceSelected(kind, field, choice)
        })
        .placeholder("Select...")
        .width(Length::Fill)
        .into()
    } else {
        text_input("", options::label_of(choices, value)).into()
    };

    labeled(field.label(), input)
}

/// A year picked from `years`, newest first.
fn year_field<'a>(
    profile: &'a ProfileState,
    kind: SectionKind,
    field: Field,
    years: Vec<String>,
    placeholder: &'static str,
) -> Element<'a, Message> {
    let value = profile
        .text_draft(kind)
        .map_or("", |draft| draft.get(field));

    let input: Element<'a, Message> = if profile.is_editing(kind) {
        pick_list(
            years,
            (!value.is_empty()).then(|| value.to_string()),
            move |year| Message::YearSelected(kind, field, year),
        )
        .placeholder(placeholder)
        .width(Length::Fill)
        .into()
    } else {
        text_input("", value).into()
    };

    labeled(field.label(), input)
}

/// Stack fields two per row.
fn grid<'a>(fields: Vec<Element<'a, Message>>) -> Column<'a, Message> {
    let mut rows = Vec::new();
    let mut fields = fields.into_iter();
    while let Some(first) = fields.next() {
        let second = fields
            .next()
            .unwrap_or_else(|| space::horizontal().into());
        rows.push(row![first, second].spacing(12).into());
    }

    Column::with_children(rows).spacing(12)
}

#[cfg(test)]
mod test {
    use roster_lib::model::NewUser;

    use super::*;

    fn loaded() -> (Profile, UserRecord) {
        let repo = Repository::in_memory().unwrap();
        let id = repo.add_user(&NewUser::new("A", "a@x.com", "123")).unwrap();
        let record = repo.user(&id).unwrap().unwrap();

        let (mut profile, _) = Profile::new(repo, id);
        profile.update(Message::Loaded(Ok(Some(record.clone()))));

        (profile, record)
    }

    fn state(profile: &Profile) -> &ProfileState {
        match &profile.state {
            State::Loaded(state) => state,
            other => panic!("profile not loaded: {other:?}"),
        }
    }

    #[test]
    fn test_inputs_are_ignored_while_read_only() {
        let (mut profile, _) = loaded();

        profile.update(Message::TextInput(
            SectionKind::Education,
            Field::Course,
            "CS".into(),
        ));

        assert_eq!(
            state(&profile)
                .text_draft(SectionKind::Education)
                .unwrap()
                .get(Field::Course),
            ""
        );
    }

    #[test]
    fn test_save_runs_a_commit() {
        let (mut profile, _) = loaded();

        assert!(matches!(
            profile.update(Message::EditPressed(SectionKind::Education)),
            Action::None
        ));
        profile.update(Message::TextInput(
            SectionKind::Education,
            Field::Course,
            "CS".into(),
        ));
        assert!(matches!(
            profile.update(Message::EditPressed(SectionKind::Education)),
            Action::Run(_)
        ));

        // Still editing until the store answers
        assert!(state(&profile).is_editing(SectionKind::Education));
    }

    #[test]
    fn test_commit_outcome_is_applied() {
        let (mut profile, record) = loaded();
        profile.update(Message::EditPressed(SectionKind::Skills));
        profile.update(Message::EditPressed(SectionKind::Skills));

        profile.update(Message::Committed(
            SectionKind::Skills,
            Err("connection refused".into()),
        ));
        assert!(state(&profile).is_editing(SectionKind::Skills));
        assert!(state(&profile).error(SectionKind::Skills).is_some());

        let saved = UserRecord {
            skills: Some("Rust".into()),
            ..record
        };
        profile.update(Message::Committed(SectionKind::Skills, Ok(Some(saved))));
        assert!(!state(&profile).is_editing(SectionKind::Skills));
        assert_eq!(state(&profile).record().skills.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_phone_input_keeps_calling_code() {
        let (mut profile, _) = loaded();
        profile.update(Message::EditPressed(SectionKind::Basic));

        profile.update(Message::PhoneInput(Field::PhoneNumber, "98765".into()));
        profile.update(Message::PhoneCodeSelected(
            Field::PhoneNumber,
            options::find(options::CALLING_CODES, "+44").unwrap(),
        ));

        assert_eq!(
            state(&profile)
                .text_draft(SectionKind::Basic)
                .unwrap()
                .get(Field::PhoneNumber),
            "+4498765"
        );
    }

    #[test]
    fn test_every_tab_renders_while_editing() {
        let (mut profile, _) = loaded();
        for kind in SectionKind::iter() {
            profile.update(Message::EditPressed(kind));
        }

        for tab in Tab::iter() {
            profile.update(Message::TabSelected(tab));
            let _ = profile.view();
        }
    }

    #[test]
    fn test_year_of_completion_is_picked() {
        let (mut profile, _) = loaded();
        let year = options::years_of_completion().remove(0);
        profile.update(Message::EditPressed(SectionKind::Education));

        profile.update(Message::YearSelected(
            SectionKind::Education,
            Field::YearOfCompletion,
            year.clone(),
        ));

        assert_eq!(
            state(&profile)
                .text_draft(SectionKind::Education)
                .unwrap()
                .get(Field::YearOfCompletion),
            year
        );
    }

    #[test]
    fn test_missing_user() {
        let repo = Repository::in_memory().unwrap();
        let (mut profile, _) = Profile::new(repo, UserId::from("nope"));

        profile.update(Message::Loaded(Ok(None)));

        assert!(matches!(profile.state, State::Missing));
    }
}
