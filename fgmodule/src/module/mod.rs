//! Module identity types.
//!
//! A module is the unit the virtual tabletop loads: a catalog of assets
//! (`db.xml`), a definition (`definition.xml`) and the assets themselves,
//! zipped into a single `.mod` file.
//!
//! # Type Overview
//!
//! ```text
//! ModuleDescriptor            AssetEntry
//! ├── name                    ├── id (1-based, per category)
//! ├── ruleset                 ├── kind: AssetKind
//! ├── author                  ├── display_name
//! └── version: ModuleVersion  └── content: AssetContent
//! ```

mod asset;
mod version;

pub use asset::{entry_tag, split_extension, AssetContent, AssetEntry, AssetKind, ContentMode};
pub use version::{ModuleVersion, DEFAULT_VERSION_INCREMENT};

use crate::xml::XmlElement;

/// Identity of the module being built.
///
/// Created once per run; the version is resolved before any document is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Module name, also used as the archive file stem.
    pub name: String,

    /// Ruleset the module is restricted to (`Any` for none).
    pub ruleset: String,

    /// Author stamped into the definition.
    pub author: String,

    /// Version stamped into both documents.
    pub version: ModuleVersion,
}

impl ModuleDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        ruleset: impl Into<String>,
        author: impl Into<String>,
        version: ModuleVersion,
    ) -> Self {
        Self {
            name: name.into(),
            ruleset: ruleset.into(),
            author: author.into(),
            version,
        }
    }

    /// Build the definition document.
    ///
    /// # Example
    ///
    /// ```
    /// use fgmodule::module::{ModuleDescriptor, ModuleVersion};
    ///
    /// let module = ModuleDescriptor::new("HMaps", "Any", "Hooker", ModuleVersion::from_tenths(1));
    /// let xml = module.to_metadata_xml();
    ///
    /// assert_eq!(xml.attribute("version"), Some("0.1"));
    /// assert_eq!(xml.find("author").and_then(|e| e.text()), Some("Hooker"));
    /// ```
    pub fn to_metadata_xml(&self) -> XmlElement {
        XmlElement::new("root")
            .with_attr("version", self.version.to_string())
            .with_child(XmlElement::new("name").with_text(&self.name))
            .with_child(XmlElement::new("ruleset").with_text(&self.ruleset))
            .with_child(XmlElement::new("author").with_text(&self.author))
    }
}
