use iced::{
    Alignment, Color, Element,
    Length::{self, Fill},
    Task, Theme, application,
    widget::{button, center, column, container, mouse_area, opaque, row, space, stack, text},
};
use roster_lib::Repository;
use tracing::{Level, error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    components::{
        profile::{self, Profile},
        roster::{self, Roster},
    },
    config::{Cfg, GuiConfig},
    icons::icon,
};

pub mod components;
pub mod config;
pub mod icons;

fn main() -> iced::Result {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    application(App::new, App::update, App::view)
        .theme(App::theme)
        .title(App::title)
        .run()
}

#[derive(Debug, Clone)]
enum Message {
    Roster(roster::Message),
    Profile(profile::Message),
    LogoPressed,
    ThemeToggled,
}

enum Screen {
    /// The store could not be opened
    Failed(String),
    Roster,
    Profile(Profile),
}

struct App {
    title: String,
    cfg: Cfg,
    repo: Option<Repository>,
    screen: Screen,
    // Components
    roster: Option<Roster>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let cfg = Cfg::new(GuiConfig::load().unwrap_or_else(|err| {
            warn!("Using default GUI settings: {err}");
            GuiConfig::default()
        }));

        let repo = match Repository::new() {
            Ok(repo) => repo,
            Err(err) => {
                error!("Could not open the user store: {err}");
                return (
                    Self {
                        title: "Roster".into(),
                        cfg,
                        repo: None,
                        screen: Screen::Failed(err.to_string()),
                        roster: None,
                    },
                    Task::none(),
                );
            }
        };

        let (roster, roster_task) = Roster::new(repo.clone());

        (
            Self {
                title: "Roster".into(),
                cfg,
                repo: Some(repo),
                screen: Screen::Roster,
                roster: Some(roster),
            },
            roster_task.map(Message::Roster),
        )
    }

    // Update application state based on messages passed by view()
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // Redirect messages to relevant child components
            Message::Roster(message) => {
                let (Some(roster), Some(repo)) = (&mut self.roster, &self.repo) else {
                    return Task::none();
                };

                match roster.update(message) {
                    roster::Action::None => Task::none(),
                    roster::Action::Run(task) => task.map(Message::Roster),
                    roster::Action::Open(id) => {
                        let (profile, task) = Profile::new(repo.clone(), id);
                        self.screen = Screen::Profile(profile);
                        task.map(Message::Profile)
                    }
                }
            }
            Message::Profile(message) => match &mut self.screen {
                Screen::Profile(profile) => match profile.update(message) {
                    profile::Action::None => Task::none(),
                    profile::Action::Run(task) => task.map(Message::Profile),
                },
                // Late replies for a profile that was already left
                _ => Task::none(),
            },
            Message::LogoPressed => {
                if !matches!(self.screen, Screen::Profile(_)) {
                    return Task::none();
                }

                self.screen = Screen::Roster;
                match &self.roster {
                    Some(roster) => roster.refresh().map(Message::Roster),
                    None => Task::none(),
                }
            }
            Message::ThemeToggled => {
                let mut cfg = self.cfg.write();
                cfg.theme = cfg.theme.toggled();
                if let Err(err) = cfg.save() {
                    warn!("Could not save GUI settings: {err}");
                }
                Task::none()
            }
        }
    }

    // Render the application and pass along messages from components to update()
    pub fn view(&self) -> Element<'_, Message> {
        let header = container(
            row![
                button(row![icon("logo"), text("Roster").size(20)].spacing(8))
                    .style(button::text)
                    .on_press(Message::LogoPressed),
                space::horizontal(),
                button(icon("theme"))
                    .style(button::subtle)
                    .on_press(Message::ThemeToggled),
            ]
            .align_y(Alignment::Center),
        )
        .padding(8)
        .style(container::bordered_box);

        let body: Element<'_, Message> = match (&self.screen, &self.roster) {
            (Screen::Failed(err), _) => center(
                column![
                    text("Could not open the user store").size(20),
                    text(err.as_str()).style(text::danger),
                ]
                .spacing(8),
            )
            .into(),
            (Screen::Profile(profile), _) => profile.view().map(Message::Profile),
            (Screen::Roster, Some(roster)) => roster.view().map(Message::Roster),
            (Screen::Roster, None) => space::vertical().into(),
        };

        column![header, body].height(Fill).into()
    }

    pub fn title(&self) -> String {
        match &self.screen {
            Screen::Profile(_) => format!("{} - Profile", self.title),
            _ => self.title.clone(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.cfg.read().theme()
    }
}

pub fn modal<'a, Message>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_click_outside: Option<Message>,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let mouse_area = mouse_area(center(opaque(content)).style(|_theme| {
        container::Style {
            background: Some(
                Color {
                    a: 0.8,
                    ..Color::BLACK
                }
                .into(),
            ),
            ..container::Style::default()
        }
    }));

    stack![
        base.into(),
        opaque(if let Some(msg) = on_click_outside {
            mouse_area.on_press(msg)
        } else {
            mouse_area
        })
    ]
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}
