use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Subcommand};
use colored::Colorize;
use netprofile_lib::{
    Repository, Result,
    repository::{Mode, Profile, Store},
    session::Session,
};
use sysexits::ExitCode;
use tracing::debug;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List profiles
    List,
    /// Show a single profile
    Show {
        /// Id, id prefix, or name of the profile
        profile: String,
    },
    /// Add a new profile
    Add(Fields),
    /// Change an existing profile
    Edit {
        /// Id, id prefix, or name of the profile
        profile: String,
        #[command(flatten)]
        fields: Fields,
    },
    /// Delete a profile
    Remove {
        /// Id, id prefix, or name of the profile
        profile: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Write every profile to a JSON file
    Export {
        /// Destination file, defaults to the configured export file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace every profile with the ones in a JSON file
    Import { path: PathBuf },
    /// Check every stored profile, e.g. after an import
    Validate,
}

/// Profile fields settable from the command line. Unset fields are left alone.
#[derive(Args, Debug, Clone, Default)]
pub struct Fields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Network interface, e.g. "eth0"
    #[arg(long)]
    pub interface: Option<String>,
    /// How the address is obtained
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    /// IPv4 address, static mode only
    #[arg(long)]
    pub ip: Option<String>,
    /// Subnet mask, static mode only
    #[arg(long)]
    pub subnet: Option<String>,
    /// Default gateway, static mode only
    #[arg(long)]
    pub gateway: Option<String>,
    /// Comma separated name servers, static mode only
    #[arg(long)]
    pub dns: Option<String>,
}

impl Fields {
    fn apply(&self, draft: &mut Profile) {
        let set = |field: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                field.clone_from(value);
            }
        };

        set(&mut draft.name, &self.name);
        set(&mut draft.interface, &self.interface);
        set(&mut draft.ip, &self.ip);
        set(&mut draft.subnet, &self.subnet);
        set(&mut draft.gateway, &self.gateway);
        set(&mut draft.dns, &self.dns);

        if let Some(mode) = self.mode {
            draft.mode = mode;
        }
    }
}

pub fn handle(repo: &mut Repository, cmd: &Command) -> Result<ExitCode> {
    match cmd {
        Command::List => list(repo.store()),
        Command::Show { profile } => show(repo.store().find(profile)?),
        Command::Add(fields) => {
            let mut session = Session::new();
            session.edit(|draft| fields.apply(draft));

            let id = session.save(repo.store_mut())?;

            notify("Profile added");
            println!("{id}");
        }
        Command::Edit { profile, fields } => {
            let id = repo.store().find(profile)?.id;
            let store = repo.store_mut();

            let mut session = Session::new();
            session.select(store, id)?;
            session.edit(|draft| fields.apply(draft));
            session.save(store)?;

            notify("Changes saved");
        }
        Command::Remove { profile, yes } => {
            let (id, name) = {
                let profile = repo.store().find(profile)?;
                (profile.id, profile.name.clone())
            };

            if !yes && !confirm(&format!("Delete profile \"{name}\"?"))? {
                println!("Cancelled");
                return Ok(ExitCode::Ok);
            }

            let store = repo.store_mut();
            let mut session = Session::new();
            session.select(store, id)?;
            session.delete(store)?;

            notify("Profile deleted");
        }
        Command::Export { output } => {
            if repo.store().is_empty() {
                println!("No profiles to export");
                return Ok(ExitCode::Ok);
            }

            let path = match output {
                Some(path) => {
                    repo.export_to(path)?;
                    path.clone()
                }
                None => repo.export(Path::new("."))?,
            };

            notify("Exported profiles");
            println!("{}", path.display());
        }
        Command::Import { path } => {
            let count = repo.import_from(path)?;

            notify("Import complete");
            println!("{count} profiles");

            let invalid = repo
                .profiles()
                .iter()
                .filter(|p| !p.validate().is_empty())
                .count();
            if invalid > 0 {
                println!(
                    "{}",
                    format!("{invalid} imported profiles need fixing, see `netprofile validate`")
                        .yellow()
                );
            }
        }
        Command::Validate => return Ok(validate(repo.store())),
    }

    Ok(ExitCode::Ok)
}

fn list(store: &Store) {
    if store.is_empty() {
        println!(
            "No profiles yet. Run {} to create one.",
            "netprofile add".bold()
        );
        return;
    }

    for profile in store.profiles() {
        println!(
            "{}  {}  {}",
            profile.id.short().dimmed(),
            profile.name.bold(),
            profile.summary().dimmed()
        );
    }
}

fn show(profile: &Profile) {
    println!("{}", profile.name.bold());
    println!("  id:        {}", profile.id);
    println!("  interface: {}", profile.interface);
    println!("  mode:      {}", profile.mode);

    if profile.mode == Mode::Static {
        println!("  ip:        {}", profile.ip);
        println!("  subnet:    {}", profile.subnet);
        println!("  gateway:   {}", profile.gateway);
        println!("  dns:       {}", profile.dns_servers().join(", "));
    }

    for (field, message) in profile.validate().iter() {
        let field: &str = field.as_ref();
        println!("  {}", format!("{field}: {message}").yellow());
    }
}

fn validate(store: &Store) -> ExitCode {
    let mut invalid = 0usize;

    for profile in store.profiles() {
        let errors = profile.validate();
        if errors.is_empty() {
            continue;
        }

        invalid += 1;
        println!("{}  {}  {}", profile.id.short().dimmed(), profile.name.bold(), errors);
    }

    debug!("{invalid} of {} profiles failed validation", store.len());

    if invalid == 0 {
        println!("All {} profiles are valid", store.len());
        ExitCode::Ok
    } else {
        ExitCode::DataErr
    }
}

fn notify(message: &str) {
    println!("{}", message.green());
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod test {
    use std::fs;

    use netprofile_lib::{
        Error, Repository,
        repository::{CoreConfig, MemoryStorage, Mode, Profile, deserialize},
    };
    use sysexits::ExitCode;
    use tempfile::tempdir;

    use super::{Command, Fields, handle};

    fn repo(storage: &MemoryStorage) -> Repository {
        Repository::with_storage(CoreConfig::default(), storage.clone())
    }

    fn office() -> Fields {
        Fields {
            name: Some("Office".into()),
            interface: Some("eth0".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_only_set_fields() {
        let mut draft = Profile::new("Office", "eth0");
        let fields = Fields {
            mode: Some(Mode::Static),
            ip: Some("10.0.0.2".into()),
            ..Default::default()
        };

        fields.apply(&mut draft);

        assert_eq!(draft.name, "Office");
        assert_eq!(draft.mode, Mode::Static);
        assert_eq!(draft.ip, "10.0.0.2");
        assert_eq!(draft.subnet, "");
    }

    #[test]
    fn test_add() {
        let storage = MemoryStorage::new();
        let mut repo = repo(&storage);

        assert_eq!(
            handle(&mut repo, &Command::Add(office())).unwrap(),
            ExitCode::Ok
        );

        let stored = deserialize(&storage.contents().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.first().unwrap().name, "Office");
    }

    #[test]
    fn test_add_invalid() {
        let storage = MemoryStorage::new();
        let mut repo = repo(&storage);
        let fields = Fields {
            mode: Some(Mode::Static),
            ip: Some("192.168.1.999".into()),
            ..office()
        };

        assert!(matches!(
            handle(&mut repo, &Command::Add(fields)),
            Err(Error::Invalid(_))
        ));
        assert!(repo.profiles().is_empty());
        assert_eq!(storage.contents(), None);
    }

    #[test]
    fn test_edit_by_name() {
        let mut repo = repo(&MemoryStorage::new());
        handle(&mut repo, &Command::Add(office())).unwrap();

        let edit = Command::Edit {
            profile: "Office".into(),
            fields: Fields {
                interface: Some("eth1".into()),
                ..Default::default()
            },
        };
        handle(&mut repo, &edit).unwrap();

        let profiles = repo.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles.first().unwrap().interface, "eth1");
    }

    #[test]
    fn test_remove_confirmed() {
        let storage = MemoryStorage::new();
        let mut repo = repo(&storage);
        handle(&mut repo, &Command::Add(office())).unwrap();

        let remove = Command::Remove {
            profile: "Office".into(),
            yes: true,
        };
        handle(&mut repo, &remove).unwrap();

        assert!(repo.profiles().is_empty());
        assert_eq!(storage.contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_unknown() {
        let mut repo = repo(&MemoryStorage::new());

        let remove = Command::Remove {
            profile: "Nowhere".into(),
            yes: true,
        };
        assert!(matches!(
            handle(&mut repo, &remove),
            Err(Error::NoMatch(_))
        ));
    }

    #[test]
    fn test_export_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut repo = repo(&MemoryStorage::new());
        handle(&mut repo, &Command::Add(office())).unwrap();

        handle(
            &mut repo,
            &Command::Export {
                output: Some(path.clone()),
            },
        )
        .unwrap();

        let mut other = Repository::with_storage(CoreConfig::default(), MemoryStorage::new());
        handle(&mut other, &Command::Import { path }).unwrap();

        assert_eq!(other.profiles(), repo.profiles());
    }

    #[test]
    fn test_import_rejects_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"not":"an array"}"#).unwrap();

        let storage = MemoryStorage::new();
        let mut repo = repo(&storage);
        handle(&mut repo, &Command::Add(office())).unwrap();
        let before = storage.contents();

        assert!(matches!(
            handle(&mut repo, &Command::Import { path }),
            Err(Error::Format(_))
        ));
        assert_eq!(repo.profiles().len(), 1);
        assert_eq!(storage.contents(), before);
    }

    #[test]
    fn test_validate_flags_imported_problems() {
        let storage = MemoryStorage::with_contents(r#"[{"name":"Half done","mode":"Static"}]"#);
        let mut repo = repo(&storage);

        assert_eq!(
            handle(&mut repo, &Command::Validate).unwrap(),
            ExitCode::DataErr
        );

        let mut empty = Repository::with_storage(CoreConfig::default(), MemoryStorage::new());
        assert_eq!(handle(&mut empty, &Command::Validate).unwrap(), ExitCode::Ok);
    }
}
