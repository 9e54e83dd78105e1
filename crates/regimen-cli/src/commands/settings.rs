use clap::Subcommand;
use regimen_core::Settings;
use std::path::PathBuf;

use crate::paths::settings_path;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the effective settings
    Show {
        /// Settings file (defaults to the config directory)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Validate a settings file
    Check {
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Write a default settings file
    Init {
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show { settings, json } => {
            let path = settings_path(settings.as_deref());
            let settings = Settings::load_or_default(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print!("{}", settings.to_toml_string()?);
            }
        }
        SettingsAction::Check { settings } => {
            let path = settings_path(settings.as_deref());
            Settings::load(&path)?;
            println!("ok: {}", path.display());
        }
        SettingsAction::Init { settings, force } => {
            let path = settings_path(settings.as_deref());
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force)", path.display()).into());
            }
            Settings::default().save(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
