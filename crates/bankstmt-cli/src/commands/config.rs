//! Config command - inspect and edit the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use bankstmt_core::models::config::StatementConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a configuration value by dotted key
    Get {
        /// Configuration key (e.g., "extraction.min_records_before_escalation")
        key: String,
    },

    /// Set a configuration value by dotted key
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init { force } => init_config(&path, force),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

/// `<config_dir>/bankstmt/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bankstmt")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<StatementConfig> {
    if path.exists() {
        Ok(StatementConfig::from_file(path)?)
    } else {
        Ok(StatementConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
    }

    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    StatementConfig::default().save(path)?;

    println!("{} Created configuration file at {}", style("✓").green(), path.display());

    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;
    let value = lookup_key(&json, key)?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &Path, key: &str, raw_value: &str) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    set_key(&mut json, key, value.clone())?;

    let config: StatementConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!("{} Set {} = {}", style("✓").green(), key, serde_json::to_string(&value)?);

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'bankstmt config init' to create a configuration file.");
    }

    Ok(())
}

/// Follow a dotted key through nested objects.
fn lookup_key<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Set a dotted key; intermediate objects must exist, the leaf may be new.
fn set_key(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut current = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    match current.as_object_mut() {
        Some(obj) => {
            obj.insert(leaf.to_string(), value);
            Ok(())
        }
        None => anyhow::bail!("Cannot set value at non-object path: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_key() {
        let json = serde_json::to_value(StatementConfig::default()).unwrap();
        assert_eq!(lookup_key(&json, "extraction.min_records_before_escalation").unwrap(), &json!(3));
        assert_eq!(lookup_key(&json, "export.sheet_name").unwrap(), &json!("Transactions"));
        assert!(lookup_key(&json, "extraction.nope").is_err());
    }

    #[test]
    fn test_set_key_round_trips_through_config() {
        let mut json = serde_json::to_value(StatementConfig::default()).unwrap();
        set_key(&mut json, "tables.column_mapping", json!({"date": 0, "amount": 2})).unwrap();
        set_key(&mut json, "extraction.enhancer", json!("identity")).unwrap();

        let config: StatementConfig = serde_json::from_value(json).unwrap();
        let mapping = config.tables.column_mapping.unwrap();
        assert_eq!(mapping.date, Some(0));
        assert_eq!(mapping.amount, Some(2));
        assert_eq!(config.extraction.enhancer, bankstmt_core::EnhancerKind::Identity);
    }

    #[test]
    fn test_set_key_rejects_missing_parent() {
        let mut json = serde_json::to_value(StatementConfig::default()).unwrap();
        assert!(set_key(&mut json, "missing.key", json!(1)).is_err());
        assert!(set_key(&mut json, "export.sheet_name.inner", json!(1)).is_err());
    }
}
