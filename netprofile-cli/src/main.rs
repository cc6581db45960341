use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use netprofile_lib::{
    Error, Repository, Result,
    repository::{CoreConfig, FileStorage},
};
use sysexits::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod profile;

#[derive(Parser, Debug)]
#[command(name = "netprofile")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: profile::Command,

    /// Keep profiles in this file instead of the configured store
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let cli = Cli::parse();

    match open(&cli).and_then(|mut repo| profile::handle(&mut repo, &cli.command)) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            exit_code(&err)
        }
    }
}

fn open(cli: &Cli) -> Result<Repository> {
    match &cli.store {
        Some(path) => Ok(Repository::with_storage(
            CoreConfig::load()?,
            FileStorage::new(path),
        )),
        None => Repository::new(),
    }
}

fn report(err: &Error) {
    match err {
        Error::Invalid(errors) => {
            eprintln!("{}", "Profile not saved:".red().bold());
            for (field, message) in errors.iter() {
                let field: &str = field.as_ref();
                eprintln!("  {}: {message}", field.bold());
            }
        }
        Error::Format(err) => eprintln!("{} {err}", "Invalid JSON file.".red().bold()),
        other => eprintln!("{} {other}", "error:".red().bold()),
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::Invalid(_) | Error::Format(_) => ExitCode::DataErr,
        Error::UnknownProfile(_)
        | Error::NoMatch(_)
        | Error::AmbiguousMatch(_)
        | Error::NothingSelected => ExitCode::NoInput,
        Error::Io(_) => ExitCode::IoErr,
        Error::Config(_) => ExitCode::Config,
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use clap::Parser;
    use netprofile_lib::{Error, repository::Mode};
    use sysexits::ExitCode;

    use crate::{Cli, exit_code, profile::Command};

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "netprofile",
            "add",
            "--name",
            "Office",
            "--interface",
            "eth0",
            "--mode",
            "static",
            "--ip",
            "192.168.1.10",
        ])
        .unwrap();

        match cli.command {
            Command::Add(fields) => {
                assert_eq!(fields.name.as_deref(), Some("Office"));
                assert_eq!(fields.mode, Some(Mode::Static));
                assert_eq!(fields.ip.as_deref(), Some("192.168.1.10"));
                assert_eq!(fields.gateway, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_store() {
        let cli = Cli::try_parse_from(["netprofile", "list", "--store", "/tmp/p.json"]).unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/p.json")));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["netprofile", "add", "--mode", "manual"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&Error::NoMatch("x".into())), ExitCode::NoInput);
        assert_eq!(
            exit_code(&Error::Io(std::io::Error::other("x"))),
            ExitCode::IoErr
        );
        assert_eq!(exit_code(&Error::NothingSelected), ExitCode::NoInput);
    }
}
