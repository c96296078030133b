use iced::{
    Element,
    widget::{pick_list, row, text_input},
};
use roster_lib::{
    model::Field,
    options::{self, CALLING_CODES, DOMICILE_COUNTRIES, DOMICILE_STATES, GENDERS},
    profile::{ProfileState, SectionKind},
};

use super::{Message, choice_field, grid, labeled, section, text_field, year_field};

const KIND: SectionKind = SectionKind::Basic;

pub fn view(profile: &ProfileState) -> Element<'_, Message> {
    section(
        profile,
        KIND,
        grid(vec![
            text_field(profile, KIND, Field::FirstName),
            text_field(profile, KIND, Field::LastName),
            text_field(profile, KIND, Field::Email),
            year_field(
                profile,
                KIND,
                Field::YearOfBirth,
                options::years_of_birth(),
                "Select...",
            ),
            choice_field(profile, KIND, Field::Gender, GENDERS),
            phone_field(profile, Field::PhoneNumber),
            phone_field(profile, Field::AlternatePhone),
            text_field(profile, KIND, Field::Address),
            text_field(profile, KIND, Field::Pincode),
            choice_field(profile, KIND, Field::DomicileState, DOMICILE_STATES),
            choice_field(profile, KIND, Field::DomicileCountry, DOMICILE_COUNTRIES),
        ]),
    )
}

/// Calling code picker next to the subscriber number. While read-only the
/// stored value is shown as is.
fn phone_field(profile: &ProfileState, field: Field) -> Element<'_, Message> {
    let draft = profile.basic.draft();

    let input: Element<'_, Message> = if profile.basic.is_editing() {
        row![
            pick_list(
                CALLING_CODES,
                options::find(CALLING_CODES, &draft.phone_code(field)),
                move |code| Message::PhoneCodeSelected(field, code),
            )
            .width(90),
            text_input("Phone number", draft.phone_subscriber(field))
                .on_input(move |value| Message::PhoneInput(field, value)),
        ]
        .spacing(6)
        .into()
    } else {
        text_input("", draft.get(field)).into()
    };

    labeled(field.label(), input)
}
