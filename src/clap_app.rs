use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use log::debug;
use serde::Serialize;
use std::path::Path;
use std::process;
use std::str::FromStr;

use crate::clap_models::*;
use envstore::models::environment::{
    environment_name, Environment, EnvironmentCreate, EnvironmentId, EnvironmentPatch, EnvironmentTier,
    RowStatus, EMPTY_ID, UNKNOWN_ID,
};
use envstore::models::policy::PolicyType;
use envstore::{ApiClient, EnvironmentStore, PolicyFetcher, PolicyStore, StoreConfig};

type Store = EnvironmentStore<ApiClient, PolicyStore<ApiClient>>;

pub async fn init_cli() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "❌".red(), format!("{:#}", err).red());
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match &cli.command {
        Some(command) => command,
        None => bail!("No command given, see --help for available commands."),
    };
    let config = load_config(&cli)?;
    let client = ApiClient::from(config);
    let mut store = EnvironmentStore::new(client.clone(), PolicyStore::new(client));

    match command {
        Commands::Env { env_command } => match env_command {
            EnvCommands::List { row_status } => {
                let row_status_list = parse_row_statuses(row_status)?;
                let envs = store
                    .fetch_environment_list(row_status_list.as_deref())
                    .await
                    .context("Unable to list environments")?;
                print_json(&envs)?;
            }

            EnvCommands::Show { id } => {
                fetch_all(&mut store).await?;
                let env = existing_environment(&store, *id)?;
                println!("{}", store.get_environment_name_by_id(*id).bold());
                print_json(env)?;
                if let Some(policy) = store
                    .policy_store()
                    .get_policy_by_environment_and_type(*id, PolicyType::PipelineApproval)
                {
                    print_json(&policy)?;
                }
            }

            EnvCommands::Create { name, order, tier } => {
                let created = store
                    .create_environment(EnvironmentCreate {
                        name: name.clone(),
                        order: *order,
                        tier: parse_tier(tier)?,
                    })
                    .await
                    .context("Unable to create environment")?;
                println!(
                    "{} {}",
                    "✅ Created environment".green(),
                    created.id.to_string().bold()
                );
                print_json(&created)?;
            }

            EnvCommands::Reorder { ids } => {
                fetch_all(&mut store).await?;
                let ordered = ids
                    .iter()
                    .map(|id| existing_environment(&store, *id).map(Environment::clone))
                    .collect::<Result<Vec<Environment>>>()?;
                let envs = store
                    .reorder_environment_list(&ordered)
                    .await
                    .context("Unable to reorder environments")?;
                println!("{}", "✅ Environments reordered".green());
                print_json(&envs)?;
            }

            EnvCommands::Patch {
                id,
                name,
                order,
                tier,
            } => {
                let patch = EnvironmentPatch {
                    name: name.clone(),
                    order: *order,
                    tier: parse_tier(tier)?,
                    row_status: None,
                };
                if patch == EnvironmentPatch::default() {
                    bail!("Nothing to patch, pass at least one of --name, --order or --tier");
                }
                patch_and_print(&mut store, *id, patch).await?;
            }

            EnvCommands::Archive { id } => {
                patch_and_print(&mut store, *id, EnvironmentPatch::row_status(RowStatus::Archived))
                    .await?;
            }

            EnvCommands::Restore { id } => {
                patch_and_print(&mut store, *id, EnvironmentPatch::row_status(RowStatus::Normal))
                    .await?;
            }
        },

        Commands::Policy { policy_command } => match policy_command {
            PolicyCommands::Show {
                environment_id,
                policy_type,
            } => {
                let policy_type = PolicyType::from_str(policy_type)
                    .map_err(|_| anyhow!("Unknown policy type '{}'", policy_type))?;
                let policy = store
                    .policy_store()
                    .fetch_policy_by_environment_and_type(*environment_id, policy_type)
                    .await
                    .context("Unable to fetch policy")?;
                print_json(&policy)?;
            }
        },
    }

    Ok(())
}

/// Reads the config file if it exists and applies overrides from the command line.
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = if Path::new(&cli.config).exists() {
        StoreConfig::from_file(cli.config.as_str())?
    } else {
        debug!("no config at '{}', using defaults", cli.config);
        StoreConfig::default()
    };
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(token) = &cli.token {
        config.access_token = Some(token.clone());
    }
    Ok(config)
}

/// Looks up a cached environment, failing for the empty and unknown placeholders.
fn existing_environment(store: &Store, id: EnvironmentId) -> Result<&Environment> {
    let env = store.get_environment_by_id(id);
    if env.id == EMPTY_ID || env.id == UNKNOWN_ID {
        bail!("Environment {} does not exist", id);
    }
    Ok(env)
}

async fn fetch_all(store: &mut Store) -> Result<()> {
    store
        .fetch_environment_list(Some(&[RowStatus::Normal, RowStatus::Archived]))
        .await
        .context("Unable to list environments")?;
    Ok(())
}

async fn patch_and_print(store: &mut Store, id: i64, patch: EnvironmentPatch) -> Result<()> {
    let updated = store
        .patch_environment(id, patch)
        .await
        .with_context(|| format!("Unable to patch environment {}", id))?;
    println!(
        "{} {}",
        "✅ Patched environment".green(),
        environment_name_line(&updated).bold()
    );
    print_json(&updated)
}

fn environment_name_line(env: &Environment) -> String {
    format!("{} ({})", env.id, environment_name(env))
}

fn parse_row_statuses(values: &[String]) -> Result<Option<Vec<RowStatus>>> {
    if values.is_empty() {
        return Ok(None);
    }
    values
        .iter()
        .map(|v| RowStatus::from_str(v.trim()).map_err(|_| anyhow!("Unknown row status '{}'", v)))
        .collect::<Result<Vec<RowStatus>>>()
        .map(Some)
}

fn parse_tier(tier: &Option<String>) -> Result<Option<EnvironmentTier>> {
    tier.as_deref()
        .map(|t| EnvironmentTier::from_str(t).map_err(|_| anyhow!("Unknown tier '{}'", t)))
        .transpose()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
