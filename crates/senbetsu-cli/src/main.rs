use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use senbetsu_core::config::{checkbox_to_value, AppConfig};
use senbetsu_core::error::SenbetsuError;
use senbetsu_core::models::EntityId;
use senbetsu_runtime::FilterHandle;

/// Per-show release group allow and deny lists
#[derive(Parser)]
#[command(name = "senbetsu", version)]
struct Cli {
    /// Keyword database (defaults to the configured path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the allow and deny lists of a show
    Show {
        entity: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the allow list of a show (no groups clears it)
    Allow { entity: String, groups: Vec<String> },
    /// Replace the deny list of a show (no groups clears it)
    Deny { entity: String, groups: Vec<String> },
    /// Check a release group against a show's lists; exits 1 when rejected
    Check {
        entity: String,
        /// Release group to check (omit for an ungrouped result)
        group: Option<String>,
    },
    /// List shows that have any keywords configured
    List,
    /// Show or update the anime settings
    Anime(AnimeArgs),
}

/// Checkbox values accept on/off, true/false, 1/0.
#[derive(Args)]
struct AnimeArgs {
    #[arg(long)]
    use_anidb: Option<String>,
    #[arg(long)]
    anidb_username: Option<String>,
    #[arg(long)]
    anidb_password: Option<String>,
    #[arg(long)]
    use_mylist: Option<String>,
    #[arg(long)]
    split_home: Option<String>,
}

#[derive(Serialize)]
struct ListsOutput<'a> {
    entity: &'a str,
    allow: &'a [String],
    deny: &'a [String],
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: {e}, using defaults");
            AppConfig::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode, SenbetsuError> {
    match cli.command {
        Command::Show { entity, json } => {
            let handle = open_handle(cli.db, &config)?;
            let entity = EntityId::new(entity)?;
            let lists = handle.lists(entity.clone()).await?;
            if json {
                let out = ListsOutput {
                    entity: entity.as_str(),
                    allow: &lists.allow,
                    deny: &lists.deny,
                };
                let text = serde_json::to_string_pretty(&out)
                    .map_err(|e| SenbetsuError::Config(e.to_string()))?;
                println!("{text}");
            } else {
                println!("allow: {}", lists.allow.join(", "));
                println!("deny:  {}", lists.deny.join(", "));
            }
        }
        Command::Allow { entity, groups } => {
            let handle = open_handle(cli.db, &config)?;
            let entity = EntityId::new(entity)?;
            handle.set_allow(entity.clone(), groups).await?;
            println!("Allow list for {entity} updated");
        }
        Command::Deny { entity, groups } => {
            let handle = open_handle(cli.db, &config)?;
            let entity = EntityId::new(entity)?;
            handle.set_deny(entity.clone(), groups).await?;
            println!("Deny list for {entity} updated");
        }
        Command::Check { entity, group } => {
            let handle = open_handle(cli.db, &config)?;
            let verdict = handle.evaluate(EntityId::new(entity)?, group).await?;
            println!("{verdict}");
            if !verdict.is_accepted() {
                return Ok(ExitCode::from(1));
            }
        }
        Command::List => {
            let handle = open_handle(cli.db, &config)?;
            for entity in handle.entities().await? {
                println!("{entity}");
            }
        }
        Command::Anime(args) => anime_settings(config, args)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn open_handle(db: Option<PathBuf>, config: &AppConfig) -> Result<FilterHandle, SenbetsuError> {
    let path = match db {
        Some(path) => path,
        None => config.ensure_db_path()?,
    };
    FilterHandle::open(&path)
}

fn anime_settings(mut config: AppConfig, args: AnimeArgs) -> Result<(), SenbetsuError> {
    let anime = &mut config.anime;
    let mut changed = false;
    if let Some(v) = args.use_anidb {
        anime.use_anidb = checkbox_to_value(Some(&v));
        changed = true;
    }
    if let Some(v) = args.anidb_username {
        anime.anidb_username = v;
        changed = true;
    }
    if let Some(v) = args.anidb_password {
        anime.anidb_password = v;
        changed = true;
    }
    if let Some(v) = args.use_mylist {
        anime.anidb_use_mylist = checkbox_to_value(Some(&v));
        changed = true;
    }
    if let Some(v) = args.split_home {
        anime.split_home = checkbox_to_value(Some(&v));
        changed = true;
    }
    if changed {
        config.save()?;
        println!("Saved {}", AppConfig::config_path().display());
    }

    let anime = &config.anime;
    println!("use_anidb        {}", anime.use_anidb);
    println!("anidb_username   {}", anime.anidb_username);
    println!(
        "anidb_password   {}",
        if anime.anidb_password.is_empty() { "" } else { "********" }
    );
    println!("anidb_use_mylist {}", anime.anidb_use_mylist);
    println!("split_home       {}", anime.split_home);
    Ok(())
}
