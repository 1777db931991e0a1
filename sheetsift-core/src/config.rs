//! Configuration system for the row filter and the output layout

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Marker meaning "applies to everyone"
pub const DEFAULT_ALL_MARKER: &str = "כולם";
/// Marker meaning "everyone except"
pub const DEFAULT_EXCEPT_MARKER: &str = "חוץ";

/// Excel sheet name maximum length
const SHEET_NAME_MAX_LEN: usize = 31;
/// Characters not allowed in sheet names
const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Main sifter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SifterConfig {
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl SifterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SifterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values that would make the filter or the writer misbehave
    pub fn validate(&self) -> Result<()> {
        if self.markers.all.is_empty() {
            anyhow::bail!("Configuration error: markers.all must not be empty");
        }
        if self.markers.except.is_empty() {
            anyhow::bail!("Configuration error: markers.except must not be empty");
        }

        let name = &self.layout.sheet_name;
        if name.trim().is_empty() {
            anyhow::bail!("Configuration error: layout.sheet_name must not be empty");
        }
        if name.chars().count() > SHEET_NAME_MAX_LEN {
            anyhow::bail!(
                "Configuration error: layout.sheet_name '{}' is longer than {} characters",
                name,
                SHEET_NAME_MAX_LEN
            );
        }
        if let Some(c) = name.chars().find(|c| SHEET_NAME_ILLEGAL.contains(c)) {
            anyhow::bail!(
                "Configuration error: layout.sheet_name '{}' contains illegal character '{}'",
                name,
                c
            );
        }

        let sizes = [
            ("column_width", self.layout.column_width),
            ("row_height", self.layout.row_height),
        ];
        for (key, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("Configuration error: layout.{} must be positive", key);
            }
        }
        if self.layout.image_width == 0 || self.layout.image_height == 0 {
            anyhow::bail!("Configuration error: image size must be positive");
        }

        Ok(())
    }
}

/// Literal substrings with special meaning in the filter column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Unconditional inclusion marker
    pub all: String,
    /// Exclusion marker, effective when the filter value is also present
    pub except: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            all: DEFAULT_ALL_MARKER.to_string(),
            except: DEFAULT_EXCEPT_MARKER.to_string(),
        }
    }
}

/// Fixed dimensions of the output workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub sheet_name: String,
    /// Column width in character units
    pub column_width: f64,
    /// Row height in points, sized for the images
    pub row_height: f64,
    /// Image display width in pixels
    pub image_width: u32,
    /// Image display height in pixels
    pub image_height: u32,
    /// Vertical offset inside the anchor cell, in pixels
    pub image_row_offset: u32,
    /// Horizontal offset inside the anchor cell, in pixels
    pub image_col_offset: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Filtered".to_string(),
            column_width: 15.0,
            row_height: 80.0,
            image_width: 100,
            image_height: 100,
            image_row_offset: 5,
            image_col_offset: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SifterConfig::default();
        assert_eq!(config.markers.all, "כולם");
        assert_eq!(config.markers.except, "חוץ");
        assert_eq!(config.layout.sheet_name, "Filtered");
        assert_eq!(config.layout.image_width, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[markers]\nall = \"everyone\"\n\n[layout]\nrow_height = 60.0")?;

        let config = SifterConfig::from_file(file.path())?;
        assert_eq!(config.markers.all, "everyone");
        assert_eq!(config.markers.except, DEFAULT_EXCEPT_MARKER);
        assert_eq!(config.layout.row_height, 60.0);
        assert_eq!(config.layout.column_width, 15.0);
        Ok(())
    }

    #[test]
    fn test_validation() {
        let config = SifterConfig::default();

        let mut bad_config = config.clone();
        bad_config.markers.except.clear();
        assert!(bad_config.validate().is_err());

        let mut bad_config = config.clone();
        bad_config.layout.sheet_name = "Bad/Name".to_string();
        assert!(bad_config.validate().is_err());

        let mut bad_config = config.clone();
        bad_config.layout.sheet_name = "x".repeat(32);
        assert!(bad_config.validate().is_err());

        let mut bad_config = config.clone();
        bad_config.layout.row_height = 0.0;
        assert!(bad_config.validate().is_err());

        let mut bad_config = config;
        bad_config.layout.image_height = 0;
        assert!(bad_config.validate().is_err());
    }
}
