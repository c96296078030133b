use iced::{
    Element, Length, Task,
    widget::{button, column, container, row, scrollable, space, table, text},
};
use roster_lib::{
    Repository,
    model::{UserId, UserSummary, roster_rows},
};
use tracing::debug;

use crate::{
    components::{
        add_user_dialog::{self, AddUserDialog},
        blocking,
    },
    icons::icon,
    modal,
};

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Result<Vec<UserSummary>, String>),
    RetryPressed,
    ViewPressed(UserId),
    DeletePressed(UserId),
    Deleted(Result<(), String>),
    AddPressed,
    UserAdded(Result<UserId, String>),
    // Child messages
    AddUserDialog(add_user_dialog::Message),
}

pub enum Action {
    None,
    Run(Task<Message>),
    /// Switch to the profile of a user
    Open(UserId),
}

#[derive(Debug, Clone)]
pub enum State {
    Loading,
    Error(String),
    Loaded(Vec<UserSummary>),
}

pub struct Roster {
    repo: Repository,
    state: State,
    show_add_dialog: bool,

    // Children
    add_user_dialog: AddUserDialog,
}

impl Roster {
    pub fn new(repo: Repository) -> (Self, Task<Message>) {
        (
            Self {
                repo: repo.clone(),
                state: State::Loading,
                show_add_dialog: false,
                add_user_dialog: AddUserDialog::default(),
            },
            list_users(repo),
        )
    }

    pub fn refresh(&self) -> Task<Message> {
        list_users(self.repo.clone())
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::Loaded(Ok(users)) => {
                debug!("Showing {} users", users.len());
                self.state = State::Loaded(users);
                Action::None
            }
            Message::Loaded(Err(err)) => {
                self.state = State::Error(err);
                Action::None
            }
            Message::RetryPressed => {
                self.state = State::Loading;
                Action::Run(self.refresh())
            }
            Message::ViewPressed(id) => Action::Open(id),
            Message::DeletePressed(id) => {
                let repo = self.repo.clone();
                Action::Run(Task::perform(
                    blocking(move || repo.remove_user(&id)),
                    Message::Deleted,
                ))
            }
            // The list is re-fetched either way; a failure was already logged
            Message::Deleted(_) => Action::Run(self.refresh()),
            Message::AddPressed => {
                self.show_add_dialog = true;
                Action::None
            }
            Message::UserAdded(Ok(_)) => {
                self.add_user_dialog.clear();
                self.show_add_dialog = false;
                Action::Run(self.refresh())
            }
            Message::UserAdded(Err(err)) => {
                self.add_user_dialog.set_error(err);
                Action::None
            }
            Message::AddUserDialog(message) => match self.add_user_dialog.update(message) {
                add_user_dialog::Action::None => Action::None,
                add_user_dialog::Action::Cancel => {
                    self.show_add_dialog = false;
                    Action::None
                }
                add_user_dialog::Action::Add(user) => {
                    let repo = self.repo.clone();
                    Action::Run(Task::perform(
                        blocking(move || repo.add_user(&user)),
                        Message::UserAdded,
                    ))
                }
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = column![
            row![
                text("Users").size(24),
                space::horizontal(),
                button(row![icon("add"), text("Add user")].spacing(6))
                    .on_press(Message::AddPressed),
            ]
            .spacing(8),
            match &self.state {
                State::Loading => Element::from(text("Loading users...")),
                State::Error(e) => column![
                    text(e.as_str()).style(text::danger),
                    button("Retry").on_press(Message::RetryPressed)
                ]
                .spacing(8)
                .into(),
                State::Loaded(users) if users.is_empty() => text("No users yet").into(),
                State::Loaded(users) => self.user_table(users),
            },
        ]
        .spacing(16)
        .padding(20)
        .height(Length::Fill);

        if self.show_add_dialog {
            modal(
                content,
                self.add_user_dialog.view().map(Message::AddUserDialog),
                Some(Message::AddUserDialog(add_user_dialog::Message::CancelPressed)),
            )
        } else {
            content.into()
        }
    }

    fn user_table<'a>(&'a self, users: &'a [UserSummary]) -> Element<'a, Message> {
        let columns = [
            table::column(text("#"), |(index, _): (usize, UserSummary)| {
                text(index.to_string())
            }),
            table::column(text("Name"), |(_, user): (usize, UserSummary)| {
                text(user.name)
            }),
            table::column(text("Email"), |(_, user): (usize, UserSummary)| {
                text(user.email)
            }),
            table::column(text("Actions"), |(_, user): (usize, UserSummary)| {
                row![
                    button(icon("view"))
                        .style(button::secondary)
                        .on_press(Message::ViewPressed(user.id.clone())),
                    button(icon("delete"))
                        .style(button::danger)
                        .on_press(Message::DeletePressed(user.id)),
                ]
                .spacing(6)
            }),
        ];

        container(scrollable(
            table(
                columns,
                roster_rows(users).map(|(index, user)| (index, user.clone())),
            )
            .width(Length::Fill),
        ))
        .style(container::bordered_box)
        .into()
    }
}

fn list_users(repo: Repository) -> Task<Message> {
    Task::perform(blocking(move || repo.users()), Message::Loaded)
}
