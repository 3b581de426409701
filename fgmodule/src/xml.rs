//! Minimal XML tree used for the module documents.
//!
//! Documents are built from explicitly tagged [`XmlElement`] values and
//! serialized with `quick-xml`. The host application reads its files as
//! ISO-8859-1, so [`XmlElement::to_latin1_document`] encodes accordingly.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{PackageError, PackageResult};

/// Encoding declared in every written document.
pub const DOCUMENT_ENCODING: &str = "iso-8859-1";

const INDENT_SIZE: usize = 2;

/// An XML element with attributes, optional text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute. Attribute order is preserved.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Set the element's text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child elements.
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given tag.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First element with the given tag anywhere below this one (depth first).
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|c| {
            if c.name == name {
                Some(c)
            } else {
                c.find_descendant(name)
            }
        })
    }

    /// Render the document as indented UTF-8 text with an XML declaration.
    pub fn to_document_string(&self) -> PackageResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
        writer
            .write_event(Event::Decl(BytesDecl::new(
                "1.0",
                Some(DOCUMENT_ENCODING),
                None,
            )))
            .map_err(|e| PackageError::Xml(e.to_string()))?;
        self.write_to(&mut writer)?;

        let mut rendered = String::from_utf8(writer.into_inner())
            .map_err(|e| PackageError::Xml(e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Render the document as ISO-8859-1 bytes, ready to be written to disk.
    pub fn to_latin1_document(&self) -> PackageResult<Vec<u8>> {
        Ok(encode_latin1(&self.to_document_string()?))
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn write_document(&self, path: &Path) -> PackageResult<()> {
        let bytes = self.to_latin1_document()?;
        fs::write(path, bytes).map_err(|e| PackageError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> PackageResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| PackageError::Xml(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| PackageError::Xml(e.to_string()))?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| PackageError::Xml(e.to_string()))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| PackageError::Xml(e.to_string()))
    }
}

/// Encode text as ISO-8859-1.
///
/// Characters outside Latin-1 become numeric character references, which is
/// only valid inside text and attribute values. Tags are always ASCII here.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code <= 0xFF {
            out.push(code as u8);
        } else {
            out.extend_from_slice(format!("&#{};", code).as_bytes());
        }
    }
    out
}

/// Decode ISO-8859-1 bytes. Every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read an attribute of the root element of the XML file at `path`.
///
/// Returns `Ok(None)` when the root element lacks the attribute.
pub fn read_root_attribute(path: &Path, attribute: &str) -> PackageResult<Option<String>> {
    let bytes = fs::read(path).map_err(|e| PackageError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let invalid = |reason: String| PackageError::InvalidMetadata {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_reader(bytes.as_slice());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let attr = e
                    .try_get_attribute(attribute)
                    .map_err(|err| invalid(err.to_string()))?;
                return Ok(attr.map(|a| decode_latin1(&a.value)));
            }
            Ok(Event::Eof) => return Err(invalid("no root element".to_string())),
            Ok(_) => {}
            Err(e) => return Err(invalid(e.to_string())),
        }
        buf.clear();
    }
}
