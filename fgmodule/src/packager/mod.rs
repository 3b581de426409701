//! Module packager: turns a library directory into a module archive.
//!
//! # Overview
//!
//! A packaging run is a straight pipeline:
//!
//! 1. Resolve the version (explicit, or previous `definition.xml` + 0.1)
//! 2. Build the catalog (`db.xml`) from the library directory
//! 3. Build the definition (`definition.xml`) from the module descriptor
//! 4. Write both documents to the output directory
//! 5. Zip the output directory into `<name>.mod`
//!
//! A failed run is simply run again once the cause is fixed; nothing is
//! rolled back.
//!
//! # Example
//!
//! ```ignore
//! use fgmodule::config::PackagerConfig;
//! use fgmodule::packager::ModulePackager;
//!
//! let config = PackagerConfig::new("HMaps")
//!     .with_author("Hooker")
//!     .with_library_dir("data")
//!     .with_output_dir("bin");
//!
//! let packager = ModulePackager::new(config)?;
//! let report = packager.package(std::path::Path::new("."))?;
//! println!("Built {} ({} assets)", report.archive.path.display(), report.catalog_entries);
//! ```

mod archive;
mod catalog;

pub use archive::{build_archive, calculate_sha256, install_archive, ArchiveBuildResult};
pub use catalog::{relative_path, Catalog, CatalogSection};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::PackagerConfig;
use crate::error::{PackageError, PackageResult};
use crate::module::{ModuleDescriptor, ModuleVersion, DEFAULT_VERSION_INCREMENT};
use crate::xml::{read_root_attribute, XmlElement};

/// Catalog file name inside the output directory.
pub const CATALOG_FILENAME: &str = "db.xml";

/// Definition file name inside the output directory.
pub const METADATA_FILENAME: &str = "definition.xml";

/// Documents produced by [`ModulePackager::generate`].
#[derive(Debug, Clone)]
pub struct GeneratedDocuments {
    /// The catalog as built.
    pub catalog: Catalog,

    /// The catalog document.
    pub catalog_xml: XmlElement,

    /// The definition document.
    pub metadata_xml: XmlElement,

    /// Where the catalog was written.
    pub catalog_path: PathBuf,

    /// Where the definition was written.
    pub metadata_path: PathBuf,
}

/// Summary of a full packaging run.
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Version stamped into the module.
    pub version: ModuleVersion,

    /// Number of catalog entries across all asset kinds.
    pub catalog_entries: usize,

    /// The written archive.
    pub archive: ArchiveBuildResult,
}

/// Builds a single module from a validated configuration.
#[derive(Debug, Clone)]
pub struct ModulePackager {
    config: PackagerConfig,
    module: ModuleDescriptor,
}

impl ModulePackager {
    /// Validate the configuration and resolve the module version.
    ///
    /// Both the library and the output directory must already exist.
    pub fn new(config: PackagerConfig) -> PackageResult<Self> {
        if !config.library_dir.is_dir() {
            return Err(PackageError::LibraryDirNotFound(config.library_dir.clone()));
        }
        if !config.output_dir.is_dir() {
            return Err(PackageError::OutputDirNotFound(config.output_dir.clone()));
        }

        let version = resolve_version(
            &config.output_dir,
            config.version,
            DEFAULT_VERSION_INCREMENT,
        )?;
        let module = ModuleDescriptor::new(
            config.name.clone(),
            config.ruleset.clone(),
            config.author.clone(),
            version,
        );

        info!(module = %module.name, version = %module.version, "Packager ready");
        Ok(Self { config, module })
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    pub fn module(&self) -> &ModuleDescriptor {
        &self.module
    }

    pub fn version(&self) -> ModuleVersion {
        self.module.version
    }

    /// Path of the definition file in the output directory.
    pub fn metadata_path(&self) -> PathBuf {
        self.config.output_dir.join(METADATA_FILENAME)
    }

    /// Path of the catalog file in the output directory.
    pub fn catalog_path(&self) -> PathBuf {
        self.config.output_dir.join(CATALOG_FILENAME)
    }

    /// Resolve a version against this packager's output directory.
    ///
    /// Read-only; see [`resolve_version`].
    pub fn resolve_version(
        &self,
        override_version: Option<ModuleVersion>,
        increment: f64,
    ) -> PackageResult<ModuleVersion> {
        resolve_version(&self.config.output_dir, override_version, increment)
    }

    /// Scan the library directory and build the catalog.
    pub fn build_catalog(&self) -> PackageResult<Catalog> {
        let files = catalog::list_library(&self.config.library_dir)?;
        let prefix = relative_path(&self.config.output_dir, &self.config.library_dir)?;

        let sections = self
            .config
            .asset_kinds
            .iter()
            .map(|&kind| catalog::build_section(kind, &files, &prefix))
            .collect::<PackageResult<Vec<_>>>()?;

        Ok(Catalog {
            version: self.module.version,
            sections,
        })
    }

    /// Build the definition document.
    pub fn build_metadata(&self) -> XmlElement {
        self.module.to_metadata_xml()
    }

    /// Build both documents and write them to the output directory.
    pub fn generate(&self) -> PackageResult<GeneratedDocuments> {
        let catalog = self.build_catalog()?;
        let catalog_xml = catalog.to_xml();
        let metadata_xml = self.build_metadata();

        let catalog_path = self.catalog_path();
        let metadata_path = self.metadata_path();
        catalog_xml.write_document(&catalog_path)?;
        metadata_xml.write_document(&metadata_path)?;

        info!(
            module = %self.module.name,
            version = %self.module.version,
            entries = catalog.entry_count(),
            output = %self.config.output_dir.display(),
            "Module documents written"
        );

        Ok(GeneratedDocuments {
            catalog,
            catalog_xml,
            metadata_xml,
            catalog_path,
            metadata_path,
        })
    }

    /// Archive the output directory into `<name>.<ext>` in the current directory.
    pub fn archive(&self) -> PackageResult<ArchiveBuildResult> {
        self.archive_to(Path::new("."))
    }

    /// Archive the output directory into `<name>.<ext>` inside `dest_dir`.
    ///
    /// `dest_dir` is created if it does not exist yet.
    pub fn archive_to(&self, dest_dir: &Path) -> PackageResult<ArchiveBuildResult> {
        fs::create_dir_all(dest_dir).map_err(|e| PackageError::CreateDirectoryFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let archive_path = dest_dir.join(self.config.archive_file_name());
        info!(archive = %archive_path.display(), "Zipping module");
        build_archive(&self.config.output_dir, &archive_path)
    }

    /// Generate both documents and archive the output directory.
    pub fn package(&self, dest_dir: &Path) -> PackageResult<PackageReport> {
        let documents = self.generate()?;
        let archive = self.archive_to(dest_dir)?;

        Ok(PackageReport {
            version: self.module.version,
            catalog_entries: documents.catalog.entry_count(),
            archive,
        })
    }

    /// Move a built archive into the host application's modules directory.
    pub fn install(&self, archive: &ArchiveBuildResult, modules_dir: &Path) -> PackageResult<PathBuf> {
        install_archive(&archive.path, modules_dir)
    }
}

/// Resolve the version for the next build.
///
/// An explicit version wins. Otherwise the `version` attribute of an existing
/// `definition.xml` in `output_dir` (or `0.0` when there is none) is bumped by
/// `increment`. A definition file without a usable version is an error.
pub fn resolve_version(
    output_dir: &Path,
    override_version: Option<ModuleVersion>,
    increment: f64,
) -> PackageResult<ModuleVersion> {
    if let Some(version) = override_version {
        return Ok(version);
    }

    let metadata_path = output_dir.join(METADATA_FILENAME);
    let previous = if metadata_path.is_file() {
        let raw = read_root_attribute(&metadata_path, "version")?.ok_or_else(|| {
            PackageError::InvalidVersion(format!(
                "{} has no version attribute",
                metadata_path.display()
            ))
        })?;
        raw.parse::<ModuleVersion>().map_err(|_| {
            PackageError::InvalidVersion(format!(
                "{} has unreadable version '{}'",
                metadata_path.display(),
                raw
            ))
        })?
    } else {
        ModuleVersion::default()
    };

    previous.bump(increment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        library: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let library = temp.path().join("data");
        let output = temp.path().join("bin");
        fs::create_dir_all(&library).unwrap();
        fs::create_dir_all(&output).unwrap();
        Fixture {
            _temp: temp,
            library,
            output,
        }
    }

    fn config(f: &Fixture) -> PackagerConfig {
        PackagerConfig::new("HMaps")
            .with_author("Hooker")
            .with_library_dir(&f.library)
            .with_output_dir(&f.output)
    }

    fn write_definition(dir: &Path, version: &str) {
        XmlElement::new("root")
            .with_attr("version", version)
            .write_document(&dir.join(METADATA_FILENAME))
            .unwrap();
    }

    #[test]
    fn test_new_rejects_missing_library() {
        let f = fixture();
        let config = config(&f).with_library_dir(f.library.join("missing"));

        let err = ModulePackager::new(config).unwrap_err();
        assert!(matches!(err, PackageError::LibraryDirNotFound(_)));
    }

    #[test]
    fn test_new_rejects_missing_output() {
        let f = fixture();
        let config = config(&f).with_output_dir(f.output.join("missing"));

        let err = ModulePackager::new(config).unwrap_err();
        assert!(matches!(err, PackageError::OutputDirNotFound(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_resolve_version_fresh_output() {
        let f = fixture();
        let version = resolve_version(&f.output, None, DEFAULT_VERSION_INCREMENT).unwrap();
        assert_eq!(version.to_string(), "0.1");
    }

    #[test]
    fn test_resolve_version_bumps_previous() {
        let f = fixture();
        write_definition(&f.output, "2.3");

        let version = resolve_version(&f.output, None, DEFAULT_VERSION_INCREMENT).unwrap();
        assert_eq!(version.to_string(), "2.4");
    }

    #[test]
    fn test_resolve_version_override_wins() {
        let f = fixture();
        write_definition(&f.output, "2.3");

        let version = resolve_version(
            &f.output,
            Some("5.0".parse().unwrap()),
            DEFAULT_VERSION_INCREMENT,
        )
        .unwrap();
        assert_eq!(version.to_string(), "5.0");
    }

    #[test]
    fn test_resolve_version_missing_attribute() {
        let f = fixture();
        XmlElement::new("root")
            .write_document(&f.output.join(METADATA_FILENAME))
            .unwrap();

        let err = resolve_version(&f.output, None, DEFAULT_VERSION_INCREMENT).unwrap_err();
        assert!(matches!(err, PackageError::InvalidVersion(_)));
    }

    #[test]
    fn test_resolve_version_unparseable() {
        let f = fixture();
        write_definition(&f.output, "beta");

        let err = ModulePackager::new(config(&f)).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("beta"));
    }

    #[test]
    fn test_build_catalog_empty_library() {
        let f = fixture();
        let packager = ModulePackager::new(config(&f)).unwrap();

        let catalog = packager.build_catalog().unwrap();
        assert_eq!(catalog.entry_count(), 0);

        let xml = catalog.to_xml();
        assert_eq!(xml.attribute("version"), Some("0.1"));
        let category = xml.find("image").and_then(|i| i.find("category")).unwrap();
        assert!(category.children().is_empty());
    }

    #[test]
    fn test_build_catalog_relative_paths() {
        let f = fixture();
        fs::write(f.library.join("cave.png"), b"png").unwrap();

        let packager = ModulePackager::new(config(&f)).unwrap();
        let catalog = packager.build_catalog().unwrap();
        let section = catalog.section(crate::module::AssetKind::Image).unwrap();

        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].relative_path(), Some("../data/cave.png"));
    }

    #[test]
    fn test_generate_writes_both_documents() {
        let f = fixture();
        fs::write(f.library.join("a.jpg"), b"jpg").unwrap();

        let packager = ModulePackager::new(config(&f)).unwrap();
        let docs = packager.generate().unwrap();

        assert!(docs.catalog_path.is_file());
        assert!(docs.metadata_path.is_file());
        let written = fs::read(&docs.catalog_path).unwrap();
        assert_eq!(written, docs.catalog_xml.to_latin1_document().unwrap());
        assert_eq!(
            read_root_attribute(&docs.metadata_path, "version")
                .unwrap()
                .as_deref(),
            Some("0.1")
        );
    }

    #[test]
    fn test_archive_to_creates_missing_dir() {
        let f = fixture();
        let packager = ModulePackager::new(config(&f)).unwrap();
        let dist = f.library.join("dist").join("modules");

        let result = packager.archive_to(&dist).unwrap();
        assert_eq!(result.path, dist.join("HMaps.mod"));
        assert!(result.path.is_file());
    }

    #[test]
    fn test_archive_to_uncreatable_dir() {
        let f = fixture();
        let blocker = f.library.join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();
        let packager = ModulePackager::new(config(&f)).unwrap();

        let err = packager.archive_to(&blocker.join("dist")).unwrap_err();
        assert!(matches!(err, PackageError::CreateDirectoryFailed { .. }));
    }

    #[test]
    fn test_resolve_version_negative_previous_is_rejected() {
        let f = fixture();
        write_definition(&f.output, "-1.0");

        let err = resolve_version(&f.output, None, DEFAULT_VERSION_INCREMENT).unwrap_err();
        assert!(matches!(err, PackageError::InvalidVersion(_)));
        assert!(err.to_string().contains("-1.0"));
    }
}
