//! # SimLab CLI
//!
//! Terminal front end for scenario authoring. Every subcommand works on the
//! file-backed key-value store in the configured storage directory.

mod session;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use simlab_core::auth;
use simlab_core::checklists::{ChecklistBook, ChecklistKind, DebriefingModel, DebriefingTemplate, MaterialsChecklist};
use simlab_core::form::Field;
use simlab_core::storage::{FileStorage, ScenarioFilter, ScenarioRepository, ScenarioStore};
use simlab_core::{
    export_scenario, import_scenario, LabConfig, ProfileKind, PublishOutcome, ScenarioStatus, ValidationProfile,
    Wizard,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "simlab", version, about = "Clinical simulation scenario authoring")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage directory (overrides the configuration)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Validate with the strict profile
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Scenario(ScenarioCommand),
    #[command(subcommand)]
    Checklist(ChecklistCommand),
    Login { email: String, password: String },
    Logout,
    Whoami,
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    /// Create a draft scenario
    New {
        #[arg(long)]
        title: String,
    },
    /// Edit a scenario interactively (latest draft when no id is given)
    Wizard {
        id: Option<Uuid>,
        /// Start a blank scenario even if a draft exists
        #[arg(long)]
        fresh: bool,
    },
    /// List stored scenarios
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Case-insensitive title filter
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print a scenario as JSON
    Show {
        id: Uuid,
        /// Show the published snapshot instead of the working record
        #[arg(long)]
        published: bool,
    },
    /// Print the review of a scenario
    Validate { id: Uuid },
    /// Publish a scenario if every tab passes
    Publish { id: Uuid },
    Delete { id: Uuid },
    /// Write a scenario to a .simlab file
    Export { id: Uuid, path: PathBuf },
    /// Read a .simlab file into the store
    Import { path: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ChecklistCommand {
    /// Create a materials checklist (--item "Section: label") or a debriefing template
    Create {
        #[arg(long)]
        title: String,
        #[arg(long = "item")]
        items: Vec<String>,
        #[arg(long)]
        debriefing: Option<String>,
    },
    List,
    Delete { id: Uuid },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Draft,
    Published,
}

impl From<StatusArg> for ScenarioStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Draft => ScenarioStatus::Draft,
            StatusArg::Published => ScenarioStatus::Published,
        }
    }
}

fn load_config(cli: &Cli) -> Result<LabConfig> {
    let mut config = LabConfig::resolve(cli.config.as_deref())?;
    if let Some(dir) = &cli.storage {
        config.storage_dir = dir.clone();
    }
    if cli.strict {
        config.profile = ProfileKind::Strict;
    }
    Ok(config)
}

fn open_storage(config: &LabConfig) -> Result<FileStorage> {
    FileStorage::open_locked(&config.storage_dir, lock_owner(&config.storage_dir))
        .with_context(|| format!("opening storage at {}", config.storage_dir.display()))
}

/// Identity written into the storage lock: the logged-in user, if any
fn lock_owner(dir: &Path) -> String {
    FileStorage::open(dir)
        .ok()
        .and_then(|storage| auth::current_user(&storage).ok().flatten())
        .map(|user| user.email)
        .unwrap_or_else(|| "simlab".to_string())
}

fn author(storage: &FileStorage, config: &LabConfig) -> Result<String> {
    Ok(match auth::current_user(storage)? {
        Some(user) => user.email,
        None => config.author.clone(),
    })
}

fn load_existing(repo: &ScenarioStore<FileStorage>, id: &Uuid, profile: ValidationProfile) -> Result<Wizard> {
    Ok(Wizard::resume(repo, id, profile)?)
}

fn parse_materials(items: &[String]) -> MaterialsChecklist {
    let mut materials = MaterialsChecklist::default();
    for item in items {
        match item.split_once(':') {
            Some((section, label)) => materials.add_item(section.trim(), label.trim()),
            None => materials.add_item("Geral", item.trim()),
        }
    }
    materials
}

fn run_checklist(command: ChecklistCommand, storage: FileStorage) -> Result<()> {
    let mut book = ChecklistBook::new(storage);
    match command {
        ChecklistCommand::Create {
            title,
            items,
            debriefing,
        } => {
            let kind = match debriefing {
                Some(model) => {
                    if !items.is_empty() {
                        bail!("a checklist is either materials (--item) or a debriefing template, not both");
                    }
                    ChecklistKind::Debriefing(DebriefingTemplate::blank(DebriefingModel::parse(&model)?))
                }
                None => ChecklistKind::Materials(parse_materials(&items)),
            };
            let record = book.create(title, kind)?;
            println!("{}", record.id);
        }
        ChecklistCommand::List => {
            for record in book.list()? {
                println!(
                    "{}  {:<10}  {}  {}",
                    record.id,
                    record.kind.display_name(),
                    record.created.format("%Y-%m-%d"),
                    record.title
                );
            }
        }
        ChecklistCommand::Delete { id } => {
            if !book.delete(&id)? {
                bail!("no checklist {}", id);
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let profile = config.validation_profile();
    let mut storage = open_storage(&config)?;
    debug!(dir = %config.storage_dir.display(), profile = %config.profile, "storage opened");

    match cli.command {
        Commands::Login { email, password } => {
            let user = auth::login(&mut storage, &email, &password)?;
            println!("Logged in as {} ({})", user.name, user.email);
        }
        Commands::Logout => {
            if !auth::logout(&mut storage)? {
                println!("Nobody was logged in.");
            }
        }
        Commands::Whoami => match auth::current_user(&storage)? {
            Some(user) => println!("{} <{}> {:?}", user.name, user.email, user.role),
            None => println!("Not logged in."),
        },
        Commands::Checklist(command) => run_checklist(command, storage)?,
        Commands::Scenario(command) => {
            let author = author(&storage, &config)?;
            let mut repo = ScenarioStore::new(storage);
            run_scenario_command(command, &mut repo, &config, profile, author)?;
        }
    }
    Ok(())
}

fn run_scenario_command(
    command: ScenarioCommand,
    repo: &mut ScenarioStore<FileStorage>,
    config: &LabConfig,
    profile: ValidationProfile,
    author: String,
) -> Result<()> {
    match command {
        ScenarioCommand::New { title } => {
            let mut wizard = Wizard::from_config(config, author);
            wizard.scenario_mut().set_field(Field::Title, title);
            println!("{}", wizard.save_draft(repo)?);
        }
        ScenarioCommand::Wizard { id, fresh } => {
            let wizard = match (id, fresh) {
                (Some(id), _) => Some(load_existing(repo, &id, profile)?),
                (None, false) => Wizard::resume_latest(repo, profile)?,
                (None, true) => None,
            };
            let mut wizard = match wizard {
                Some(w) => w.with_gated_selection(config.gate_direct_selection),
                None => Wizard::from_config(config, author),
            };
            session::run(&mut wizard, repo)?;
        }
        ScenarioCommand::List { status, title, json } => {
            let filter = ScenarioFilter {
                status: status.map(ScenarioStatus::from),
                title_contains: title,
                author: None,
            };
            let rows = repo.list(&filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "{}  {:<9}  {:>2} frame(s)  {}  {}",
                        row.id,
                        row.status.display_name(),
                        row.frame_count,
                        row.modified.format("%Y-%m-%d %H:%M"),
                        row.title
                    );
                }
            }
        }
        ScenarioCommand::Show { id, published } => {
            let scenario = if published {
                repo.get_published(&id)?
            } else {
                repo.get(&id)?
            };
            match scenario {
                Some(s) => println!("{}", serde_json::to_string_pretty(&s)?),
                None => bail!("no scenario {}", id),
            }
        }
        ScenarioCommand::Validate { id } => {
            let wizard = load_existing(repo, &id, profile)?;
            println!("{} ({} profile)", wizard.scenario().title(), wizard.profile().name);
            session::print_review(&wizard);
        }
        ScenarioCommand::Publish { id } => {
            let mut wizard = load_existing(repo, &id, profile)?;
            match wizard.publish(repo)? {
                PublishOutcome::Published(id) => println!("Published {}", id),
                PublishOutcome::Blocked(report) => {
                    session::print_review(&wizard);
                    bail!("{} tab(s) incomplete", report.incomplete_tabs().len());
                }
            }
        }
        ScenarioCommand::Delete { id } => {
            if !repo.delete(&id)? {
                bail!("no scenario {}", id);
            }
        }
        ScenarioCommand::Export { id, path } => {
            let scenario = repo.get(&id)?.with_context(|| format!("no scenario {}", id))?;
            export_scenario(&scenario, &path)?;
            println!("Exported to {}", path.display());
        }
        ScenarioCommand::Import { path } => {
            let scenario = import_scenario(&path)?;
            repo.put(&scenario)?;
            println!("{}", scenario.id());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
