//! Writes a config file holding the default analysis settings.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use udimscan_core::AnalysisConfig;

/// Default settings as pretty JSON.
pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(&AnalysisConfig::default())
        .context("Failed to serialize default config")
}

/// Run the init-config command.
///
/// Prints to stdout when no output path is given. An existing file is only
/// replaced with `force`.
pub fn run(output: Option<&str>, force: bool) -> Result<ExitCode> {
    let json = default_config_json()?;

    let Some(output) = output else {
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    };

    write_config(Path::new(output), &json, force)?;
    println!("{} {}", "Wrote".green().bold(), output);
    Ok(ExitCode::SUCCESS)
}

fn write_config(path: &Path, json: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, format!("{}\n", json))
        .with_context(|| format!("Failed to write config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udimscan.json");

        write_config(&path, &default_config_json().unwrap(), false).unwrap();
        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udimscan.json");
        std::fs::write(&path, "{}").unwrap();

        let err = write_config(&path, "{}", false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(write_config(&path, "{}", true).is_ok());
    }

    #[test]
    fn test_default_json_fields() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"tolerance\": 0.0001"));
        assert!(json.contains("\"tile_assignment\": \"min_corner\""));
    }
}
