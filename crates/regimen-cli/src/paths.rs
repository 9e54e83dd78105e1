use std::path::{Path, PathBuf};

/// Config directory: `~/.config/regimen`, or `~/.config/regimen-dev` when
/// `REGIMEN_ENV=dev`.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REGIMEN_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("regimen-dev")
    } else {
        base_dir.join("regimen")
    }
}

/// The settings file to use: an explicit path, or the default location.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => config_dir().join("settings.toml"),
    }
}
