use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use fedprep_core::BackendId;

use super::Context;
use crate::config::Config;
use crate::output::print_success;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

pub fn run(action: ConfigCommand, ctx: &Context) -> Result<()> {
    match action {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Set { key, value } => set(ctx, key, value),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;

    if ctx.json_output {
        return crate::output::print_json(&config);
    }

    let path = match &ctx.config_path {
        Some(p) => p.clone(),
        None => Config::default_path()?,
    };
    println!("{} {}", "Configuration:".bold(), path.display().to_string().dimmed());
    print!("{}", toml::to_string_pretty(&config)?);

    println!();
    println!("{}", "To set a value:".dimmed());
    println!("  fedprep config set <key> <value>");
    Ok(())
}

fn set(ctx: &Context, key: String, value: String) -> Result<()> {
    let mut config = ctx.config()?;
    apply(&mut config, &key, &value)?;

    let path = config.save(ctx.config_path.as_deref())?;
    print_success(format!("Set {key} = {value} in {}", path.display()));
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "backend" => {
            value
                .parse::<BackendId>()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            config.backend = value.to_owned();
        }
        "threads" => {
            config.threads = match value {
                "" | "auto" => None,
                n => Some(
                    n.parse()
                        .map_err(|_| anyhow::anyhow!("threads must be a number or 'auto'"))?,
                ),
            };
        }
        "self_test" => {
            config.self_test = value
                .parse()
                .map_err(|_| anyhow::anyhow!("self_test must be true or false"))?;
        }
        "output_dir" => {
            config.output_dir = Some(value.to_owned()).filter(|v| !v.is_empty());
        }
        _ => {
            anyhow::bail!(
                "Unknown config key '{key}'.\n\n\
                Valid keys:\n  \
                  backend      (tfhe or mock)\n  \
                  threads      (number, or auto)\n  \
                  self_test    (true or false)\n  \
                  output_dir   (e.g., /path/to/submissions)"
            );
        }
    }
    Ok(())
}
