use iced::{
    Element, Length,
    widget::{button, column, container, row, space, text, text_input},
};
use roster_lib::model::NewUser;

#[derive(Debug, Clone)]
pub enum Message {
    NameInput(String),
    EmailInput(String),
    ContactInput(String),
    CancelPressed,
    AddPressed,
}

pub enum Action {
    None,
    Add(NewUser),
    Cancel,
}

#[derive(Debug, Default)]
pub struct AddUserDialog {
    name: String,
    email: String,
    contact: String,
    /// Shown when the store rejected the last attempt
    error: Option<String>,
}

impl AddUserDialog {
    /// Reset the dialog state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::NameInput(content) => {
                self.name = content;
                Action::None
            }
            Message::EmailInput(content) => {
                self.email = content;
                Action::None
            }
            Message::ContactInput(content) => {
                self.contact = content;
                Action::None
            }
            Message::CancelPressed => {
                self.clear();
                Action::Cancel
            }
            Message::AddPressed => {
                self.error = None;
                Action::Add(self.new_user())
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let validation = self.new_user().validate().err();

        let mut content = column![
            text("Add user").size(20),
            labeled(
                "Name",
                text_input("Jane Doe", &self.name).on_input(Message::NameInput)
            ),
            labeled(
                "Email",
                text_input("jane@example.com", &self.email).on_input(Message::EmailInput)
            ),
            labeled(
                "Contact",
                text_input("...", &self.contact).on_input(Message::ContactInput)
            ),
        ]
        .spacing(12);

        if let Some(error) = &self.error {
            content = content.push(text(error.as_str()).style(text::danger));
        }

        content = content.push(
            row![
                text(
                    validation
                        .as_ref()
                        .map(|err| err.to_string())
                        .unwrap_or_default()
                )
                .size(12)
                .style(text::secondary),
                space::horizontal(),
                button("Cancel")
                    .style(button::secondary)
                    .on_press(Message::CancelPressed),
                button("Add").on_press_maybe(validation.is_none().then_some(Message::AddPressed)),
            ]
            .spacing(8),
        );

        container(content)
            .padding(20)
            .width(420)
            .height(Length::Shrink)
            .style(container::rounded_box)
            .into()
    }

    fn new_user(&self) -> NewUser {
        NewUser::new(&self.name, &self.email, &self.contact)
    }
}

fn labeled<'a>(
    label: &'a str,
    input: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    column![text(label).size(12), input.into()].spacing(4).into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_hands_over_input() {
        let mut dialog = AddUserDialog::default();
        dialog.update(Message::NameInput(" Ada ".into()));
        dialog.update(Message::EmailInput("ada@x.com".into()));

        match dialog.update(Message::AddPressed) {
            Action::Add(user) => {
                assert!(user.validate().is_ok());
                assert_eq!(user.email, "ada@x.com");
            }
            _ => panic!("expected an add action"),
        }
    }

    #[test]
    fn test_cancel_clears_inputs() {
        let mut dialog = AddUserDialog::default();
        dialog.update(Message::NameInput("Ada".into()));

        assert!(matches!(dialog.update(Message::CancelPressed), Action::Cancel));
        assert!(dialog.name.is_empty());
    }
}
