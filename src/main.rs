// hbnb console - create / show / list / update / unset / destroy stored objects
//
// Backend selection comes from the environment (see config.rs); a `.env`
// file in the working directory is honoured.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use hbnb_storage::{open_storage, Entity, ModelRegistry, Storage, StorageConfig};

#[derive(Parser)]
#[command(name = "hbnb", version, about = "Manage hbnb objects in the configured storage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an object and print its id
    Create {
        class: String,
        /// Initial attributes as key=value (values parsed as JSON when possible)
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Print one object
    Show { class: String, id: String },
    /// Print every object, optionally of one class
    All { class: Option<String> },
    /// Set one attribute and save
    Update {
        class: String,
        id: String,
        attribute: String,
        value: String,
    },
    /// Remove one attribute and save
    Unset {
        class: String,
        id: String,
        attribute: String,
    },
    /// Delete one object
    Destroy { class: String, id: String },
    /// Print object counts per class
    Count { class: Option<String> },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = StorageConfig::from_env();
    let registry = Arc::new(ModelRegistry::with_defaults());
    let mut storage =
        open_storage(&config, registry.clone()).context("Failed to open storage")?;

    run(cli.command, &registry, storage.as_mut())
}

fn run(command: Command, registry: &ModelRegistry, storage: &mut dyn Storage) -> Result<()> {
    match command {
        Command::Create { class, params } => {
            ensure_class(registry, &class)?;
            let mut obj = registry.construct(&class, serde_json::Map::new())?;
            for param in &params {
                let Some((key, raw)) = param.split_once('=') else {
                    bail!("expected KEY=VALUE, got `{param}`");
                };
                obj.base_mut().set(key, parse_value(raw))?;
            }
            obj.save(storage)?;
            println!("{}", obj.id());
        }
        Command::Show { class, id } => {
            ensure_class(registry, &class)?;
            match storage.get(&class, &id)? {
                Some(obj) => println!("{obj}"),
                None => bail!("** no instance found **"),
            }
        }
        Command::All { class } => {
            if let Some(class) = &class {
                ensure_class(registry, class)?;
            }
            for obj in storage.all(class.as_deref())?.values() {
                println!("{obj}");
            }
        }
        Command::Update {
            class,
            id,
            attribute,
            value,
        } => {
            ensure_class(registry, &class)?;
            let Some(mut obj) = storage.get(&class, &id)? else {
                bail!("** no instance found **");
            };
            obj.base_mut().set(&attribute, parse_value(&value))?;
            obj.save(storage)?;
        }
        Command::Unset {
            class,
            id,
            attribute,
        } => {
            ensure_class(registry, &class)?;
            let Some(mut obj) = storage.get(&class, &id)? else {
                bail!("** no instance found **");
            };
            if obj.base_mut().remove(&attribute).is_none() {
                bail!("** attribute doesn't exist **");
            }
            obj.save(storage)?;
        }
        Command::Destroy { class, id } => {
            ensure_class(registry, &class)?;
            let Some(obj) = storage.get(&class, &id)? else {
                bail!("** no instance found **");
            };
            obj.delete(storage)?;
        }
        Command::Count { class } => {
            let names = match &class {
                Some(class) => {
                    ensure_class(registry, class)?;
                    vec![class.as_str()]
                }
                None => registry.type_names(),
            };
            for name in names {
                println!("{name}: {}", storage.count(Some(name))?);
            }
        }
    }

    Ok(())
}

fn ensure_class(registry: &ModelRegistry, class: &str) -> Result<()> {
    if !registry.contains(class) {
        bail!("** class doesn't exist **");
    }
    Ok(())
}

/// JSON literal when it parses (`3`, `1.5`, `"a b"`, `[..]`), plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
