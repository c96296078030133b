use std::{path::PathBuf, str::FromStr};

use clap::Subcommand;
use colored::Colorize;
use roster_lib::{
    Repository,
    model::{Field, NewUser, UserId, UserRecord, roster_rows},
    profile::{ProfileState, SectionKind, Tab},
    session::{ExperienceField, TextDraft, WorkHistoryDraft},
    upload::ResumePreview,
};
use strum::IntoEnumIterator;
use sysexits::ExitCode;

use crate::{fail, reject};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List users, oldest first
    List,
    /// Add a new user
    Add {
        name: String,
        email: String,
        #[arg(short, long, default_value = "")]
        contact: String,
    },
    /// Show a user's profile
    Show {
        id: String,
        #[arg(short, long, value_enum, default_value_t = Tab::Basic)]
        tab: Tab,
    },
    /// Delete a user
    Delete { id: String },
    /// Edit one section of a user's profile
    Edit {
        id: String,
        #[arg(value_enum)]
        section: SectionKind,
        /// Column assignment, e.g. `course=CS`. An empty value clears the input.
        #[arg(short, long = "set", value_parser = parse_assignment, required = true)]
        assignments: Vec<(String, String)>,
        /// Work history entry the assignments apply to
        #[arg(short, long, default_value_t = 0)]
        entry: usize,
    },
    /// Record a profile picture
    Avatar { id: String, path: PathBuf },
    /// Record or clear a resume
    Resume {
        id: String,
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        path: Option<PathBuf>,
        #[arg(long)]
        clear: bool,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("`{s}` is not of the form field=value"))
}

pub fn handle(repo: &Repository, cmd: &Command) -> Result<(), ExitCode> {
    match cmd {
        Command::List => {
            let users = repo.users().map_err(|err| fail(&err))?;
            if users.is_empty() {
                println!("{}", "No users".dimmed());
            }
            for (index, user) in roster_rows(&users) {
                println!(
                    "{:>3}  {}  {}  {}",
                    index,
                    user.name.bold(),
                    user.email,
                    user.id.as_str().dimmed()
                );
            }
        }
        Command::Add {
            name,
            email,
            contact,
        } => {
            let id = repo
                .add_user(&NewUser::new(name, email, contact))
                .map_err(|err| fail(&err))?;
            println!("{} {}", "Added".green(), id);
        }
        Command::Show { id, tab } => {
            let record = fetch(repo, id)?;
            let mut state = ProfileState::new(record);
            state.tab = *tab;
            print_profile(&state);
        }
        Command::Delete { id } => {
            let record = fetch(repo, id)?;
            repo.remove_user(&record.id).map_err(|err| fail(&err))?;
            println!("{} {}", "Deleted".green(), record.name);
        }
        Command::Edit {
            id,
            section,
            assignments,
            entry,
        } => {
            let record = fetch(repo, id)?;
            let state = edit(repo, record, *section, assignments, *entry)?;
            print_profile(&state);
        }
        Command::Avatar { id, path } => {
            let record = fetch(repo, id)?;
            if !path.is_file() {
                return Err(reject(
                    format!("no such file `{}`", path.display()),
                    ExitCode::NoInput,
                ));
            }
            repo.set_avatar(&record.id, path)
                .map_err(|err| fail(&err))?;
            println!("{} avatar of {}", "Updated".green(), record.name);
        }
        Command::Resume { id, path, clear } => {
            let record = fetch(repo, id)?;
            match path {
                Some(path) if !clear => {
                    if !path.is_file() {
                        return Err(reject(
                            format!("no such file `{}`", path.display()),
                            ExitCode::NoInput,
                        ));
                    }
                    repo.set_resume(&record.id, path)
                        .map_err(|err| fail(&err))?;
                    println!("{} resume of {}", "Updated".green(), record.name);
                }
                _ => {
                    repo.clear_resume(&record.id).map_err(|err| fail(&err))?;
                    println!("{} resume of {}", "Cleared".green(), record.name);
                }
            }
        }
    }

    Ok(())
}

fn fetch(repo: &Repository, id: &str) -> Result<UserRecord, ExitCode> {
    let id = UserId::from(id);
    repo.user(&id)
        .map_err(|err| fail(&err))?
        .ok_or_else(|| reject(format!("no user with id `{id}`"), ExitCode::NoInput))
}

/// Run one edit cycle: enter edit mode, write the assignments into the draft,
/// commit, and hand back the state holding the re-fetched record.
fn edit(
    repo: &Repository,
    record: UserRecord,
    kind: SectionKind,
    assignments: &[(String, String)],
    entry: usize,
) -> Result<ProfileState, ExitCode> {
    let mut state = ProfileState::new(record);
    state.tab = kind.tab();
    state.toggle(kind);

    for (key, value) in assignments {
        let applied = match kind {
            SectionKind::Work => state
                .work
                .draft_mut()
                .map(|draft| set_experience(draft, entry, key, value)),
            _ => state
                .text_draft_mut(kind)
                .map(|draft| set_text(draft, key, value)),
        };
        applied
            .unwrap_or(Ok(()))
            .map_err(|message| reject(message, ExitCode::DataErr))?;
    }

    let Some(patch) = state.toggle(kind) else {
        return Ok(state);
    };

    let id = state.record().id.clone();
    let (outcome, fetched) = match repo.update_and_fetch(&id, &patch) {
        Ok(fetched) => (Ok(()), fetched),
        Err(err) => (Err(err), None),
    };
    state.finish(kind, &outcome);
    outcome.map_err(|err| fail(&err))?;

    let record = fetched.ok_or_else(|| {
        reject(
            format!("user `{id}` disappeared while saving"),
            ExitCode::NoInput,
        )
    })?;
    state.reload(record);

    Ok(state)
}

fn set_text(draft: &mut TextDraft, key: &str, value: &str) -> Result<(), String> {
    let field = Field::from_str(key).map_err(|_| format!("unknown field `{key}`"))?;

    let accepted = match field {
        // A bare number keeps the calling code already stored
        Field::PhoneNumber | Field::AlternatePhone
            if !value.is_empty() && !value.starts_with('+') =>
        {
            draft.set_phone_subscriber(field, value)
        }
        _ => draft.set(field, value),
    };

    if accepted {
        Ok(())
    } else {
        Err(format!("`{key}` is not part of this section"))
    }
}

fn set_experience(
    draft: &mut WorkHistoryDraft,
    entry: usize,
    key: &str,
    value: &str,
) -> Result<(), String> {
    let field = ExperienceField::iter()
        .find(|field| <&str>::from(*field) == key)
        .ok_or_else(|| format!("unknown work history field `{key}`"))?;

    if draft.set(entry, field, value) {
        Ok(())
    } else {
        Err(format!(
            "no work history entry {entry} ({} entries)",
            draft.entries().len()
        ))
    }
}

fn print_profile(state: &ProfileState) {
    let record = state.record();

    println!("{}", record.name.bold());
    println!("{}", record.email);
    if !record.contact.is_empty() {
        println!("{}", record.contact);
    }
    println!();

    let tabs = Tab::iter()
        .map(|tab| {
            if tab == state.tab {
                tab.to_string().bold().underline().to_string()
            } else {
                tab.to_string().dimmed().to_string()
            }
        })
        .collect::<Vec<_>>();
    println!("{}\n", tabs.join("  "));

    match state.tab {
        Tab::Basic => print_text_section(state.basic.title(), state.basic.draft()),
        Tab::Education => {
            print_text_section(state.education.title(), state.education.draft());
            print_text_section(state.skills.title(), state.skills.draft());
        }
        Tab::Experience => {
            println!("{}", state.work.title().cyan().bold());
            for (index, entry) in state.work.draft().entries().iter().enumerate() {
                println!(
                    "  [{index}] {} / {} / {}",
                    or_dash(&entry.domain),
                    or_dash(&entry.subdomain),
                    or_dash(&entry.experience)
                );
            }
            println!();

            print_text_section(state.linkedin.title(), state.linkedin.draft());

            println!("{}", "Resume".cyan().bold());
            match (state.stored_resume(), state.resume_preview()) {
                (Some(name), Some(preview)) => {
                    println!("  {name}");
                    match preview.url() {
                        Some(url) => println!("  {}", url.underline()),
                        None => println!("  {}", ResumePreview::UNAVAILABLE_MESSAGE.dimmed()),
                    }
                }
                _ => println!("  {}", "-".dimmed()),
            }
        }
    }
}

fn print_text_section(title: &str, draft: &TextDraft) {
    println!("{}", title.cyan().bold());
    for (field, value) in draft.iter() {
        println!("  {:<20} {}", field.label(), or_dash(value));
    }
    println!();
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".dimmed().to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod test {
    use roster_lib::session::{BasicInfo, Education, Section};

    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("course=CS").unwrap(),
            ("course".to_string(), "CS".to_string())
        );
        assert_eq!(
            parse_assignment("grade=").unwrap(),
            ("grade".to_string(), String::new())
        );
        assert!(parse_assignment("course").is_err());
    }

    #[test]
    fn test_set_text_rejects_foreign_fields() {
        let mut draft = Education::draft(&UserRecord::default());

        assert!(set_text(&mut draft, "course", "CS").is_ok());
        assert!(set_text(&mut draft, "skills", "Rust").is_err());
        assert!(set_text(&mut draft, "nope", "x").is_err());
        assert_eq!(draft.get(Field::Course), "CS");
    }

    #[test]
    fn test_bare_phone_number_keeps_code() {
        let mut draft = BasicInfo::draft(&UserRecord::default());

        set_text(&mut draft, "phone_number", "9876543210").unwrap();
        assert_eq!(draft.get(Field::PhoneNumber), "+919876543210");

        set_text(&mut draft, "phone_number", "+447700900123").unwrap();
        assert_eq!(draft.get(Field::PhoneNumber), "+447700900123");
    }

    #[test]
    fn test_empty_phone_number_clears_input() {
        let mut draft = BasicInfo::draft(&UserRecord {
            phone_number: Some("+919876543210".into()),
            ..Default::default()
        });

        set_text(&mut draft, "phone_number", "").unwrap();

        assert_eq!(draft.get(Field::PhoneNumber), "");
    }

    fn assignments(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_edit_commits_one_section() {
        let repo = Repository::in_memory().unwrap();
        let id = repo.add_user(&NewUser::new("A", "a@x.com", "1")).unwrap();
        let record = repo.user(&id).unwrap().unwrap();

        let state = edit(
            &repo,
            record,
            SectionKind::Work,
            &assignments(&[("domain", "Tech")]),
            1,
        )
        .unwrap();

        let record = state.record();
        assert_eq!(record.work_experience.len(), 2);
        assert_eq!(record.work_experience.get(1).unwrap().domain, "Tech");
        assert_eq!(record.course, None);
        assert!(!state.is_editing(SectionKind::Work));
        assert_eq!(state.tab, Tab::Experience);
    }

    #[test]
    fn test_edit_text_section() {
        let repo = Repository::in_memory().unwrap();
        let id = repo.add_user(&NewUser::new("A", "a@x.com", "1")).unwrap();
        let record = repo.user(&id).unwrap().unwrap();

        let state = edit(
            &repo,
            record,
            SectionKind::Education,
            &assignments(&[("course", "CS"), ("grade", "A")]),
            0,
        )
        .unwrap();

        assert_eq!(state.record().course.as_deref(), Some("CS"));
        assert_eq!(state.record().grade.as_deref(), Some("A"));
        assert_eq!(repo.user(&id).unwrap().unwrap().course.as_deref(), Some("CS"));
    }

    #[test]
    fn test_edit_rejects_unknown_entry() {
        let repo = Repository::in_memory().unwrap();
        let id = repo.add_user(&NewUser::new("A", "a@x.com", "1")).unwrap();
        let record = repo.user(&id).unwrap().unwrap();

        let result = edit(
            &repo,
            record,
            SectionKind::Work,
            &assignments(&[("domain", "Tech")]),
            5,
        );

        assert_eq!(result.unwrap_err(), ExitCode::DataErr);
        assert!(repo.user(&id).unwrap().unwrap().work_experience.is_empty());
    }
}
