//! fgmodule - Fantasy Grounds module packaging
//!
//! This library turns a directory of images into a module the Fantasy
//! Grounds virtual tabletop can load: it writes a catalog (`db.xml`) and a
//! definition (`definition.xml`) into an output directory and zips that
//! directory into `<name>.mod`.
//!
//! # Example
//!
//! ```ignore
//! use fgmodule::{ModulePackager, PackagerConfig};
//!
//! let packager = ModulePackager::new(
//!     PackagerConfig::new("HMaps")
//!         .with_author("Hooker")
//!         .with_library_dir("data")
//!         .with_output_dir("bin"),
//! )?;
//! let report = packager.package(std::path::Path::new("."))?;
//! ```

pub mod config;
pub mod error;
pub mod module;
pub mod packager;
pub mod xml;

pub use config::{OutputTargets, PackagerConfig};
pub use error::{PackageError, PackageResult};
pub use module::{AssetKind, ModuleDescriptor, ModuleVersion};
pub use packager::{ArchiveBuildResult, GeneratedDocuments, ModulePackager, PackageReport};
