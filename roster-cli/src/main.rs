use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use roster_lib::{Error, Repository};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod user;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Work against a throwaway in-memory store instead of the configured one
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on users
    #[command(subcommand)]
    User(user::Command),
}

fn main() -> ExitCode {
    human_panic::setup_panic!();

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install the log subscriber");
    }

    let cli = Cli::parse();

    let repo = if cli.ephemeral {
        Repository::in_memory()
    } else {
        Repository::new()
    };
    let repo = match repo {
        Ok(repo) => repo,
        Err(err) => return fail(&err).into(),
    };

    let result = match &cli.command {
        Command::User(cmd) => user::handle(&repo, cmd),
    };

    match result {
        Ok(()) => sysexits::ExitCode::Ok.into(),
        Err(code) => code.into(),
    }
}

/// Report a library error and pick the matching exit code.
pub fn fail(err: &Error) -> sysexits::ExitCode {
    eprintln!("{} {err}", "error:".red().bold());

    match err {
        Error::Invalid(_) => sysexits::ExitCode::DataErr,
        Error::Store(_) => sysexits::ExitCode::Unavailable,
        Error::Config(_) => sysexits::ExitCode::Config,
        Error::NoFileName(_) => sysexits::ExitCode::NoInput,
    }
}

/// Report a problem with the command line input itself.
pub fn reject(message: impl std::fmt::Display, code: sysexits::ExitCode) -> sysexits::ExitCode {
    eprintln!("{} {message}", "error:".red().bold());
    code
}
