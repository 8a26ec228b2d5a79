// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! External Hooks CLI
//!
//! Loads, saves and applies global external hook settings against a
//! running server, using a TOML description of the settings form.

mod commands;
mod views;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::Session;
use external_hooks_client::{ClientConfig, HookSettingsClient};
use external_hooks_core::PanelConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "external-hooks")]
#[command(about = "External Hooks - global hook settings administration", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "EXTERNAL_HOOKS_CONFIG")]
    config: Option<PathBuf>,

    /// Server root URL (overrides the configuration)
    #[arg(long)]
    base_url: Option<String>,

    /// Context path the server is deployed under
    #[arg(long)]
    context_path: Option<String>,

    /// Administrator login
    #[arg(short, long, env = "EXTERNAL_HOOKS_USER")]
    user: Option<String>,

    /// Administrator password
    #[arg(long, env = "EXTERNAL_HOOKS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every hook kind into the form and print the settings
    Load {
        /// Form description (TOML)
        #[arg(long)]
        form: PathBuf,

        /// Write the loaded values back into the form file
        #[arg(long)]
        write: bool,
    },

    /// Save every hook kind of the form
    Save {
        /// Form description (TOML)
        #[arg(long)]
        form: PathBuf,

        /// Apply to existing repositories after saving
        #[arg(long)]
        apply: bool,
    },

    /// Apply the global settings to every existing repository
    Apply,

    /// Legacy trigger settings
    Triggers {
        #[command(subcommand)]
        command: TriggerCommands,
    },
}

#[derive(Subcommand)]
enum TriggerCommands {
    /// Show the stored triggers
    Show {
        /// Also check the matching boxes in this form file
        #[arg(long)]
        form: Option<PathBuf>,
    },

    /// Show the default triggers
    Defaults {
        /// Also check the matching boxes in this form file
        #[arg(long)]
        form: Option<PathBuf>,
    },

    /// Store the checked triggers of the form
    Save {
        /// Form description (TOML)
        #[arg(long)]
        form: PathBuf,

        /// Apply to existing repositories after saving
        #[arg(long)]
        apply: bool,
    },
}

impl Cli {
    /// Command-line flags take precedence over file and environment.
    fn panel_config(&self) -> Result<PanelConfig> {
        let mut config = PanelConfig::load(self.config.clone())?;

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(context_path) = &self.context_path {
            config.server.context_path = context_path.clone();
        }
        if let Some(user) = &self.user {
            config.server.username = Some(user.clone());
        }
        if let Some(password) = &self.password {
            config.server.password = Some(password.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.panel_config()?;
    tracing::debug!(
        base_url = %config.server.base_url,
        context_path = %config.server.context_path,
        load_policy = ?config.load_policy,
        "Configuration loaded"
    );

    let client = HookSettingsClient::new(ClientConfig::from_server_config(&config.server))
        .context("Failed to create HTTP client")?;
    let session = Session {
        config,
        client: Arc::new(client),
    };

    match cli.command {
        Commands::Load { form, write } => commands::load(&session, &form, write).await,
        Commands::Save { form, apply } => commands::save(&session, &form, apply).await,
        Commands::Apply => commands::apply(&session).await,
        Commands::Triggers { command } => match command {
            TriggerCommands::Show { form } => {
                commands::triggers_show(&session, form.as_deref()).await
            }
            TriggerCommands::Defaults { form } => {
                commands::triggers_defaults(&session, form.as_deref()).await
            }
            TriggerCommands::Save { form, apply } => {
                commands::triggers_save(&session, &form, apply).await
            }
        },
    }
}
