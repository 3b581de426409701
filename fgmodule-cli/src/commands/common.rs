//! Arguments and config resolution shared by all commands.

use std::path::PathBuf;

use clap::Args;
use fgmodule::config::parse_asset_kinds;
use fgmodule::{AssetKind, ModuleVersion, OutputTargets, PackagerConfig};

use crate::error::CliError;

/// Module settings accepted by every command.
///
/// Flags override values loaded from `--config`.
#[derive(Debug, Clone, Default, Args)]
pub struct ModuleArgs {
    /// INI file with [module], [paths] and [assets] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Module name (also the archive file name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Ruleset the module is restricted to
    #[arg(short, long)]
    pub ruleset: Option<String>,

    /// Author stamped into the definition
    #[arg(short, long)]
    pub author: Option<String>,

    /// Directory containing the assets
    #[arg(short, long)]
    pub library: Option<PathBuf>,

    /// Directory receiving db.xml and definition.xml
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use this version instead of bumping the previous one (e.g. 5.0)
    #[arg(long = "set-version", value_name = "VERSION")]
    pub set_version: Option<String>,

    /// Asset kinds to include: image, encounter (repeatable or comma separated)
    #[arg(short, long = "kind", value_name = "KIND")]
    pub kinds: Vec<String>,
}

impl ModuleArgs {
    /// Merge config file and flags into a packager configuration.
    pub fn resolve(&self) -> Result<(PackagerConfig, OutputTargets), CliError> {
        let (mut config, targets) = match &self.config {
            Some(path) => PackagerConfig::from_ini_file(path)?,
            None => (PackagerConfig::default(), OutputTargets::default()),
        };

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CliError::Config("module name is empty".to_string()));
            }
            config.name = name.clone();
        }
        if let Some(ruleset) = &self.ruleset {
            config.ruleset = ruleset.clone();
        }
        if let Some(author) = &self.author {
            config.author = author.clone();
        }
        if let Some(library) = &self.library {
            config.library_dir = library.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(version) = &self.set_version {
            config.version = Some(version.parse::<ModuleVersion>()?);
        }
        if !self.kinds.is_empty() {
            config = config.with_asset_kinds(self.asset_kinds()?);
        }

        Ok((config, targets))
    }

    fn asset_kinds(&self) -> Result<Vec<AssetKind>, CliError> {
        let mut kinds = Vec::new();
        for value in &self.kinds {
            kinds.extend(parse_asset_kinds(value)?);
        }
        if kinds.is_empty() {
            return Err(CliError::Config("--kind needs a value".to_string()));
        }
        Ok(kinds)
    }
}
