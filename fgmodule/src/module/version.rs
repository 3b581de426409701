//! Module version numbers.
//!
//! Module versions are plain decimals with a single fractional digit
//! (`0.1`, `2.4`, `5.0`). Each build bumps the version by a fixed increment
//! unless an explicit version is supplied.

use std::fmt;
use std::str::FromStr;

use crate::error::{PackageError, PackageResult};

/// Amount added to the previous version on each automatic bump.
pub const DEFAULT_VERSION_INCREMENT: f64 = 0.1;

/// A module version rounded to one fractional digit.
///
/// Stored as a count of tenths so comparisons and formatting are exact.
///
/// # Example
///
/// ```
/// use fgmodule::module::ModuleVersion;
///
/// let version: ModuleVersion = "2.3".parse().unwrap();
/// assert_eq!(version.bump(0.1).unwrap().to_string(), "2.4");
/// assert_eq!(ModuleVersion::default().to_string(), "0.0");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    tenths: u64,
}

impl ModuleVersion {
    /// Create a version from a number of tenths (`24` is `2.4`).
    pub fn from_tenths(tenths: u64) -> Self {
        Self { tenths }
    }

    /// The version expressed in tenths.
    pub fn tenths(&self) -> u64 {
        self.tenths
    }

    /// Round an arbitrary decimal to one fractional digit.
    pub fn from_f64(value: f64) -> PackageResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(PackageError::InvalidVersion(format!(
                "{} is not a non-negative number",
                value
            )));
        }
        Ok(Self {
            tenths: (value * 10.0).round() as u64,
        })
    }

    /// Return the version obtained by adding `increment` and rounding.
    pub fn bump(&self, increment: f64) -> PackageResult<Self> {
        Self::from_f64(self.as_f64() + increment)
    }

    fn as_f64(&self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

impl FromStr for ModuleVersion {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PackageError::InvalidVersion(format!("'{}' is not a number", s)))?;
        Self::from_f64(value)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}
