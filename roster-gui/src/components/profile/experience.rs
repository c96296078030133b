use iced::{
    Alignment, Element, Length,
    widget::{Column, button, column, container, pick_list, row, space, text, text_input},
};
use roster_lib::{
    model::{Field, WorkExperience},
    options::{self, EXPERIENCE_BRACKETS},
    profile::{ProfileState, ResumePanel, SectionKind},
    session::ExperienceField,
};

use super::{Message, labeled, section, text_field};
use crate::icons::icon;

pub fn view(profile: &ProfileState) -> Element<'_, Message> {
    column![
        section(
            profile,
            SectionKind::Work,
            Column::with_children(
                profile
                    .work
                    .draft()
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| work_entry(profile, index, entry)),
            )
            .spacing(12),
        ),
        section(
            profile,
            SectionKind::Linkedin,
            text_field(profile, SectionKind::Linkedin, Field::LinkedinUrl),
        ),
        resume(profile),
    ]
    .spacing(16)
    .into()
}

fn work_entry<'a>(
    profile: &'a ProfileState,
    index: usize,
    entry: &'a WorkExperience,
) -> Element<'a, Message> {
    let editing = profile.work.is_editing();

    let input = |field: ExperienceField, value: &'a str| {
        text_input("", value).on_input_maybe(
            editing.then_some(move |value: String| Message::ExperienceInput(index, field, value)),
        )
    };

    let experience: Element<'a, Message> = if editing {
        pick_list(
            EXPERIENCE_BRACKETS,
            options::find(EXPERIENCE_BRACKETS, &entry.experience),
            move |choice| Message::ExperienceSelected(index, choice),
        )
        .placeholder("Select...")
        .width(Length::Fill)
        .into()
    } else {
        text_input(
            "",
            options::label_of(EXPERIENCE_BRACKETS, &entry.experience),
        )
        .into()
    };

    row![
        labeled("Domain".into(), input(ExperienceField::Domain, &entry.domain)),
        labeled(
            "Sub-domain".into(),
            input(ExperienceField::Subdomain, &entry.subdomain)
        ),
        labeled("Experience".into(), experience),
    ]
    .spacing(12)
    .into()
}

fn resume(profile: &ProfileState) -> Element<'_, Message> {
    let status: Element<'_, Message> = match (profile.resume, profile.stored_resume()) {
        (ResumePanel::Choosing, _) => text("Choosing a file...").into(),
        (_, Some(name)) => row![
            text(name),
            space::horizontal(),
            button(row![icon("view"), text("Preview")].spacing(6))
                .style(button::secondary)
                .on_press(Message::PreviewResumePressed),
            button(row![icon("upload"), text("Replace")].spacing(6))
                .style(button::secondary)
                .on_press(Message::UploadResumePressed),
            button(row![icon("delete"), text("Remove")].spacing(6))
                .style(button::danger)
                .on_press(Message::RemoveResumePressed),
        ]
        .spacing(6)
        .align_y(Alignment::Center)
        .into(),
        (_, None) => row![
            text("No resume uploaded").style(text::secondary),
            space::horizontal(),
            button(row![icon("upload"), text("Upload")].spacing(6))
                .on_press(Message::UploadResumePressed),
        ]
        .align_y(Alignment::Center)
        .into(),
    };

    container(column![text("Resume").size(18), status].spacing(12))
        .padding(16)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}
