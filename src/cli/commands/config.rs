//! Config Command
//!
//! Usage:
//!   repodoc config show [-g] [-f json|yaml|text]
//!   repodoc config path
//!   repodoc config init [-g] [--force]

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration, or only the global file
/// layered over defaults
pub fn show(global: bool, format: &str) -> Result<()> {
    let config = if global {
        match ConfigLoader::global_config_path() {
            Some(path) if path.exists() => ConfigLoader::load_from_file(&path)?,
            Some(path) => {
                Output::new().warning(&format!(
                    "No global config at {}. Run 'repodoc config init --global' to create one.",
                    path.display()
                ));
                return Ok(());
            }
            None => {
                Output::new().error("Cannot determine global config directory");
                return Ok(());
            }
        }
    } else {
        ConfigLoader::load()?
    };
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

/// Show configuration file locations and whether they exist
pub fn path() -> Result<()> {
    let output = Output::new();
    output.section("Configuration files");

    match ConfigLoader::global_config_path() {
        Some(global) => output.field("Global", describe(&global)),
        None => output.field("Global", "(no config directory on this platform)"),
    }
    output.field("Project", describe(&ConfigLoader::project_config_path()));
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    Output::new().success(&format!("Configuration at {}", path.display()));
    Ok(())
}
