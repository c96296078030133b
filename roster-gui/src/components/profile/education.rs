use iced::{Element, widget::column};
use roster_lib::{
    model::Field,
    options,
    profile::{ProfileState, SectionKind},
};

use super::{Message, grid, section, text_field, year_field};

pub fn view(profile: &ProfileState) -> Element<'_, Message> {
    let education = SectionKind::Education;
    let skills = SectionKind::Skills;

    column![
        section(
            profile,
            education,
            grid(vec![
                text_field(profile, education, Field::SchoolCollege),
                text_field(profile, education, Field::HighestDegree),
                text_field(profile, education, Field::Course),
                year_field(
                    profile,
                    education,
                    Field::YearOfCompletion,
                    options::years_of_completion(),
                    "YYYY",
                ),
                text_field(profile, education, Field::Grade),
            ]),
        ),
        section(
            profile,
            skills,
            column![
                text_field(profile, skills, Field::Skills),
                text_field(profile, skills, Field::Projects),
            ]
            .spacing(12),
        ),
    ]
    .spacing(16)
    .into()
}
