//! Catalog (`db.xml`) construction.
//!
//! The library directory is listed once; each enabled [`AssetKind`] then
//! picks the files whose extension it accepts, in listing order.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{PackageError, PackageResult};
use crate::module::{
    split_extension, AssetContent, AssetEntry, AssetKind, ContentMode, ModuleVersion,
};
use crate::xml::XmlElement;

/// A file found in the library directory.
#[derive(Debug, Clone)]
pub(crate) struct LibraryFile {
    pub file_name: String,
    pub path: PathBuf,
}

/// All entries of one asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSection {
    /// Kind of every entry in this section.
    pub kind: AssetKind,

    /// Entries in scan order, numbered from 1.
    pub entries: Vec<AssetEntry>,
}

impl CatalogSection {
    /// Serialize as `<image><category ...>entries</category></image>`.
    pub fn to_xml(&self) -> XmlElement {
        let category = XmlElement::new("category")
            .with_attr("name", "")
            .with_attr("mergeid", "")
            .with_attr("baseicon", "1")
            .with_attr("decalicon", "1")
            .with_children(self.entries.iter().map(AssetEntry::to_xml));

        XmlElement::new(self.kind.category_tag()).with_child(category)
    }
}

/// The module catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Version stamped on the root element.
    pub version: ModuleVersion,

    /// One section per enabled asset kind.
    pub sections: Vec<CatalogSection>,
}

impl Catalog {
    /// Section for the given kind, if enabled.
    pub fn section(&self, kind: AssetKind) -> Option<&CatalogSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Total number of entries across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Build the `db.xml` document.
    pub fn to_xml(&self) -> XmlElement {
        XmlElement::new("root")
            .with_attr("version", self.version.to_string())
            .with_children(self.sections.iter().map(CatalogSection::to_xml))
    }
}

/// List regular files in the library directory, in file system order.
///
/// Names that are not valid UTF-8 cannot be written to the catalog and are skipped.
pub(crate) fn list_library(library_dir: &Path) -> PackageResult<Vec<LibraryFile>> {
    let read_failed = |e: std::io::Error| PackageError::ReadFailed {
        path: library_dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(library_dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(file_name) => files.push(LibraryFile { file_name, path }),
            Err(raw) => {
                warn!(file = ?raw, "Skipping library file with non UTF-8 name");
            }
        }
    }

    Ok(files)
}

/// Select and number the files belonging to `kind`.
///
/// Files without an extension or with an extension the kind does not accept
/// are excluded. Identifiers count accepted files only.
pub(crate) fn build_section(
    kind: AssetKind,
    files: &[LibraryFile],
    reference_prefix: &str,
) -> PackageResult<CatalogSection> {
    let mut entries = Vec::new();

    for file in files {
        let Some((base_name, extension)) = split_extension(&file.file_name) else {
            trace!(file = %file.file_name, "No extension, skipping");
            continue;
        };

        if !kind.accepts(extension) {
            trace!(file = %file.file_name, kind = %kind, "Extension not accepted, skipping");
            continue;
        }

        let content = match kind.content_mode() {
            ContentMode::Reference => {
                AssetContent::Reference(format!("{}/{}", reference_prefix, file.file_name))
            }
            ContentMode::Inline => {
                let bytes = fs::read(&file.path).map_err(|e| PackageError::ReadFailed {
                    path: file.path.clone(),
                    source: e,
                })?;
                AssetContent::Inline(String::from_utf8_lossy(&bytes).into_owned())
            }
        };

        let entry = AssetEntry {
            id: entries.len() as u32 + 1,
            kind,
            display_name: kind.display_name(&file.file_name, base_name),
            content,
        };
        debug!(id = %entry.tag(), file = %file.file_name, kind = %kind, "Catalog entry");
        entries.push(entry);
    }

    Ok(CatalogSection { kind, entries })
}

/// Path from `from` to `to` as a `/`-separated string.
///
/// Both paths are canonicalized first, so they must exist. Identical
/// directories yield `"."`. Paths on different roots yield `to` itself.
pub fn relative_path(from: &Path, to: &Path) -> PackageResult<String> {
    let canonical = |p: &Path| {
        p.canonicalize().map_err(|e| PackageError::ReadFailed {
            path: p.to_path_buf(),
            source: e,
        })
    };
    let from = canonical(from)?;
    let to = canonical(to)?;

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return Ok(join_components(&to_parts));
    }

    let mut parts: Vec<String> = vec!["..".to_string(); from_parts.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

fn join_components(parts: &[Component<'_>]) -> String {
    let mut joined = String::new();
    for part in parts {
        match part {
            Component::RootDir => joined.push('/'),
            other => {
                if !joined.is_empty() && !joined.ends_with('/') {
                    joined.push('/');
                }
                joined.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    joined
}
