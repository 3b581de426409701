//! Packager configuration.
//!
//! [`PackagerConfig`] is the single value a [`ModulePackager`](crate::packager::ModulePackager)
//! is built from. It can be assembled in code with the `with_*` builders or
//! loaded from an INI file:
//!
//! ```ini
//! [module]
//! name = HMaps
//! ruleset = Any
//! author = Hooker
//! ; version = 5.0
//! ; extension = mod
//!
//! [paths]
//! library = data
//! output = bin
//! archive = .
//! ; install = /path/to/Fantasy Grounds/Data/modules
//!
//! [assets]
//! kinds = image
//! ```
//!
//! Relative paths in the file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{PackageError, PackageResult};
use crate::module::{AssetKind, ModuleVersion};

/// Default module name.
pub const DEFAULT_NAME: &str = "MyModule";

/// Default ruleset (no restriction).
pub const DEFAULT_RULESET: &str = "Any";

/// Default author.
pub const DEFAULT_AUTHOR: &str = "Me";

/// Default library directory.
pub const DEFAULT_LIBRARY_DIR: &str = "data";

/// File extension of module archives.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "mod";

/// Configuration for a packaging run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackagerConfig {
    /// Module name; also the archive file stem.
    pub name: String,

    /// Ruleset label.
    pub ruleset: String,

    /// Author label.
    pub author: String,

    /// Directory scanned for assets.
    pub library_dir: PathBuf,

    /// Directory receiving `db.xml` and `definition.xml`; archived as a whole.
    pub output_dir: PathBuf,

    /// Explicit version. `None` bumps the version found in the output directory.
    pub version: Option<ModuleVersion>,

    /// Archive file extension, without the dot.
    pub archive_extension: String,

    /// Asset kinds included in the catalog, in order.
    pub asset_kinds: Vec<AssetKind>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            ruleset: DEFAULT_RULESET.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            library_dir: PathBuf::from(DEFAULT_LIBRARY_DIR),
            output_dir: PathBuf::from("."),
            version: None,
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            asset_kinds: vec![AssetKind::Image],
        }
    }
}

impl PackagerConfig {
    /// Create a config for the named module with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.ruleset = ruleset.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Pin the version instead of bumping the previous one.
    pub fn with_version(mut self, version: ModuleVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Archive file extension; a leading dot is dropped.
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        self.archive_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Replace the enabled asset kinds. Duplicates are dropped.
    pub fn with_asset_kinds(mut self, kinds: impl IntoIterator<Item = AssetKind>) -> Self {
        self.asset_kinds.clear();
        for kind in kinds {
            if !self.asset_kinds.contains(&kind) {
                self.asset_kinds.push(kind);
            }
        }
        self
    }

    /// Archive file name, e.g. `HMaps.mod`.
    pub fn archive_file_name(&self) -> String {
        format!("{}.{}", self.name, self.archive_extension)
    }

    /// Load configuration from an INI file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn from_ini_file(path: &Path) -> PackageResult<(Self, OutputTargets)> {
        let ini = Ini::load_from_file(path).map_err(|e| {
            PackageError::Config(format!("failed to load {}: {}", path.display(), e))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_ini(&ini, base_dir)
    }

    /// Build configuration from parsed INI data.
    pub fn from_ini(ini: &Ini, base_dir: &Path) -> PackageResult<(Self, OutputTargets)> {
        let mut config = Self::default();
        let mut targets = OutputTargets::default();
        let resolve = |value: &str| base_dir.join(value.trim());

        if let Some(section) = ini.section(Some("module")) {
            if let Some(name) = section.get("name") {
                config.name = name.trim().to_string();
            }
            if let Some(ruleset) = section.get("ruleset") {
                config.ruleset = ruleset.trim().to_string();
            }
            if let Some(author) = section.get("author") {
                config.author = author.trim().to_string();
            }
            if let Some(version) = section.get("version") {
                config.version = Some(version.parse()?);
            }
            if let Some(extension) = section.get("extension") {
                config.archive_extension = extension.trim().trim_start_matches('.').to_string();
            }
        }

        if let Some(section) = ini.section(Some("paths")) {
            if let Some(library) = section.get("library") {
                config.library_dir = resolve(library);
            }
            if let Some(output) = section.get("output") {
                config.output_dir = resolve(output);
            }
            if let Some(archive) = section.get("archive") {
                targets.archive_dir = Some(resolve(archive));
            }
            if let Some(install) = section.get("install") {
                targets.install_dir = Some(resolve(install));
            }
        }

        if let Some(kinds) = ini.section(Some("assets")).and_then(|s| s.get("kinds")) {
            let kinds = parse_asset_kinds(kinds)?;
            if kinds.is_empty() {
                return Err(PackageError::Config(
                    "[assets] kinds must name at least one asset kind".to_string(),
                ));
            }
            config = config.with_asset_kinds(kinds);
        }

        if config.name.is_empty() {
            return Err(PackageError::Config("module name is empty".to_string()));
        }

        Ok((config, targets))
    }
}

/// Where the finished archive goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTargets {
    /// Directory the archive is written to. `None` means the current directory.
    pub archive_dir: Option<PathBuf>,

    /// Modules directory of the host application to install into.
    pub install_dir: Option<PathBuf>,
}

/// Parse a comma separated list of asset kinds.
pub fn parse_asset_kinds(list: &str) -> PackageResult<Vec<AssetKind>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
