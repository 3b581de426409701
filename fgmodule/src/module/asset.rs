//! Asset kinds and catalog entries.
//!
//! Every kind of asset a module can carry is a variant of [`AssetKind`].
//! A kind decides which file extensions it accepts, whether the file is
//! referenced by path or inlined as text, and the XML shape of its entries.

use std::fmt;
use std::str::FromStr;

use crate::error::PackageError;
use crate::xml::XmlElement;

/// How an asset's content ends up in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// The catalog stores a path to the file, relative to the output directory.
    Reference,
    /// The catalog stores the file's text content.
    Inline,
}

/// The closed set of asset kinds a module can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Map and handout images, referenced by path.
    Image,
    /// Encounter text, inlined as formatted text.
    Text,
}

impl AssetKind {
    /// All kinds, in catalog order.
    pub const ALL: [AssetKind; 2] = [AssetKind::Image, AssetKind::Text];

    /// Tag of the wrapper element holding this kind's category.
    pub fn category_tag(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Text => "encounter",
        }
    }

    /// File extensions accepted for this kind (exact, case-sensitive).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => &["jpg", "png"],
            AssetKind::Text => &["txt"],
        }
    }

    /// Whether the extension belongs to this kind.
    ///
    /// Only whole-extension equality counts: `batxt` is not a `txt` file.
    pub fn accepts(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }

    /// How content of this kind is stored in the catalog.
    pub fn content_mode(&self) -> ContentMode {
        match self {
            AssetKind::Image => ContentMode::Reference,
            AssetKind::Text => ContentMode::Inline,
        }
    }

    /// Build the XML element for one asset of this kind.
    fn content_element(&self, content: &AssetContent) -> XmlElement {
        let (inner_tag, inner_type) = match self {
            AssetKind::Image => ("bitmap", None),
            AssetKind::Text => ("text", Some("formattedtext")),
        };

        let mut inner = XmlElement::new(inner_tag).with_text(content.as_str());
        if let Some(kind) = inner_type {
            inner = inner.with_attr("type", kind);
        }

        let wrapper = XmlElement::new(self.category_tag());
        let wrapper = match self {
            AssetKind::Image => wrapper.with_attr("type", "image"),
            AssetKind::Text => wrapper,
        };
        wrapper.with_child(inner)
    }

    /// The display name recorded for a file of this kind.
    pub fn display_name(&self, file_name: &str, base_name: &str) -> String {
        match self {
            AssetKind::Image => file_name.to_string(),
            AssetKind::Text => base_name.to_string(),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_tag())
    }
}

impl FromStr for AssetKind {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" | "images" => Ok(AssetKind::Image),
            "encounter" | "encounters" | "text" => Ok(AssetKind::Text),
            other => Err(PackageError::Config(format!(
                "unknown asset kind '{}' (expected image or encounter)",
                other
            ))),
        }
    }
}

/// Catalog payload of a single asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetContent {
    /// Path from the output directory to the asset, `/`-separated.
    Reference(String),
    /// Inlined text content.
    Inline(String),
}

impl AssetContent {
    /// The string stored in the catalog.
    pub fn as_str(&self) -> &str {
        match self {
            AssetContent::Reference(path) => path,
            AssetContent::Inline(text) => text,
        }
    }
}

/// One asset listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Sequential identifier, starting at 1 within a category.
    pub id: u32,

    /// Kind of the asset.
    pub kind: AssetKind,

    /// Name shown by the host application.
    pub display_name: String,

    /// Path reference or inlined text.
    pub content: AssetContent,
}

impl AssetEntry {
    /// Element tag for this entry, e.g. `id-00007`.
    pub fn tag(&self) -> String {
        entry_tag(self.id)
    }

    /// Relative path of a referenced asset.
    pub fn relative_path(&self) -> Option<&str> {
        match &self.content {
            AssetContent::Reference(path) => Some(path),
            AssetContent::Inline(_) => None,
        }
    }

    /// Serialize the entry into its catalog element.
    pub fn to_xml(&self) -> XmlElement {
        XmlElement::new(self.tag())
            .with_child(self.kind.content_element(&self.content))
            .with_child(
                XmlElement::new("name")
                    .with_attr("type", "string")
                    .with_text(&self.display_name),
            )
    }
}

/// Format a catalog identifier tag.
pub fn entry_tag(id: u32) -> String {
    format!("id-{:05}", id)
}

/// Split a file name on its last `.` into base name and extension.
///
/// Returns `None` for names without a `.`; such files never enter a catalog.
pub fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    file_name.rsplit_once('.')
}
