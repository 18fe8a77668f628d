//! Spreadsheet configuration
//!
//! Everything here has a compiled-in default; a TOML file can override any
//! subset of it:
//!
//! ```toml
//! vendors = ["Mouser", "Digikey"]
//! vendor_fields = ["Price", "Cost", "Link"]
//! sum_label = "Sum:"
//!
//! [colors]
//! header = "F7CB4D"
//! row_dark = "#FEF8E3"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ConfigError, FixedColumn};

/// Index of the price field within a vendor block
pub const PRICE_FIELD: usize = 0;
/// Index of the cost field within a vendor block
pub const COST_FIELD: usize = 1;
/// Excel's worksheet width (columns A to XFD)
pub const MAX_COLUMNS: usize = 16_384;

/// Vendor blocks, labels and colors for the BOM sheet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BomConfig {
    /// One column block per vendor, in order
    pub vendors: Vec<String>,
    /// Sub-columns of every vendor block; the first two are price and cost
    pub vendor_fields: Vec<String>,
    /// Label written next to each vendor's cost total
    pub sum_label: String,
    pub colors: ColorConfig,
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            vendors: ["Mouser", "Farnell", "TME", "Digikey"]
                .into_iter()
                .map(String::from)
                .collect(),
            vendor_fields: ["Price", "Cost", "Link"]
                .into_iter()
                .map(String::from)
                .collect(),
            sum_label: "Sum:".into(),
            colors: ColorConfig::default(),
        }
    }
}

impl BomConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Replace the vendor list
    pub fn vendors<S: Into<String>>(mut self, vendors: impl IntoIterator<Item = S>) -> Self {
        self.vendors = vendors.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the per-vendor field labels
    pub fn vendor_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.vendor_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Check vendor names, field list and colors
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self.vendors.iter().position(|v| v.trim().is_empty()) {
            return Err(ConfigError::EmptyVendorName(index + 1));
        }
        if self.vendor_fields.is_empty() {
            return Err(ConfigError::NoVendorFields);
        }
        let columns = self.total_columns();
        if columns > MAX_COLUMNS {
            return Err(ConfigError::TooManyColumns {
                columns,
                max: MAX_COLUMNS,
            });
        }
        if !self.has_cost_formula() {
            warn!(
                fields = self.vendor_fields.len(),
                "vendor blocks need a price and a cost field; cost formulas are disabled"
            );
        }
        self.colors.palette()?;
        Ok(())
    }

    /// Fixed columns plus every vendor block, saturating on overflow
    pub fn total_columns(&self) -> usize {
        self.vendors
            .len()
            .saturating_mul(self.vendor_fields.len())
            .saturating_add(FixedColumn::ALL.len())
    }

    /// Whether vendor blocks have both a price and a cost column
    pub fn has_cost_formula(&self) -> bool {
        self.vendor_fields.len() > COST_FIELD
    }

    /// Resolved colors
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        self.colors.palette()
    }
}

/// Colors as hex strings, `RRGGBB` or `AARRGGBB`, optional leading `#`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub header: String,
    pub row_light: String,
    pub row_dark: String,
    pub border: String,
    pub footer: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            header: "F7CB4D".into(),
            row_light: "FFFFFF".into(),
            row_dark: "FEF8E3".into(),
            border: "000000".into(),
            footer: "F7CB4D".into(),
        }
    }
}

impl ColorConfig {
    /// Parse every color
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Ok(Palette {
            header: parse_hex_color("header", &self.header)?,
            row_light: parse_hex_color("row_light", &self.row_light)?,
            row_dark: parse_hex_color("row_dark", &self.row_dark)?,
            border: parse_hex_color("border", &self.border)?,
            footer: parse_hex_color("footer", &self.footer)?,
        })
    }
}

/// Resolved `0xRRGGBB` colors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub header: u32,
    pub row_light: u32,
    pub row_dark: u32,
    pub border: u32,
    pub footer: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header: 0xF7CB4D,
            row_light: 0xFFFFFF,
            row_dark: 0xFEF8E3,
            border: 0x000000,
            footer: 0xF7CB4D,
        }
    }
}

/// Parse `RRGGBB` / `AARRGGBB` (alpha dropped) into `0xRRGGBB`
pub fn parse_hex_color(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidColor {
        name,
        value: value.to_string(),
    };

    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let rgb = match hex.len() {
        6 => hex,
        8 => &hex[2..],
        _ => return Err(invalid()),
    };
    u32::from_str_radix(rgb, 16).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_the_default_palette() {
        let config = BomConfig::default();
        assert_eq!(config.palette().unwrap(), Palette::default());
        assert_eq!(config.vendors.len(), 4);
        assert_eq!(config.vendor_fields, vec!["Price", "Cost", "Link"]);
        assert!(config.has_cost_formula());
    }

    #[test]
    fn parse_hex_color_formats() {
        assert_eq!(parse_hex_color("header", "F7CB4D").unwrap(), 0xF7CB4D);
        assert_eq!(parse_hex_color("header", "#fef8e3").unwrap(), 0xFEF8E3);
        assert_eq!(parse_hex_color("header", "FFF7CB4D").unwrap(), 0xF7CB4D);
    }

    #[test]
    fn parse_hex_color_rejects_garbage() {
        assert!(parse_hex_color("border", "black").is_err());
        assert!(parse_hex_color("border", "12345").is_err());
        assert!(parse_hex_color("border", "+12345").is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BomConfig::from_toml_str(
            r##"
vendors = ["Mouser", "Digikey"]

[colors]
row_dark = "#EEEEEE"
"##,
        )
        .unwrap();

        assert_eq!(config.vendors, vec!["Mouser", "Digikey"]);
        assert_eq!(config.vendor_fields, BomConfig::default().vendor_fields);
        assert_eq!(config.palette().unwrap().row_dark, 0xEEEEEE);
        assert_eq!(config.palette().unwrap().header, 0xF7CB4D);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BomConfig::from_toml_str("vendor = [\"Mouser\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_color_is_rejected() {
        let err = BomConfig::from_toml_str("[colors]\nheader = \"yellow\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { name: "header", .. }));
    }

    #[test]
    fn empty_vendor_name_is_rejected() {
        let err = BomConfig::from_toml_str("vendors = [\"Mouser\", \" \"]").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyVendorName(2)));
    }

    #[test]
    fn empty_field_list_is_rejected() {
        let err = BomConfig::from_toml_str("vendor_fields = []").unwrap_err();
        assert!(matches!(err, ConfigError::NoVendorFields));
    }

    #[test]
    fn sheet_wider_than_excel_is_rejected() {
        // 8 fixed + 5462 * 3 = 16394 columns
        let config = BomConfig::default().vendors((0..5462).map(|i| format!("V{i}")));
        assert_eq!(config.total_columns(), 16_394);

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyColumns {
                columns: 16_394,
                max: MAX_COLUMNS
            }
        ));
    }

    #[test]
    fn sheet_exactly_excel_width_is_accepted() {
        // 8 fixed + 8188 * 2 = 16384 columns
        let config = BomConfig::default()
            .vendors((0..8188).map(|i| format!("V{i}")))
            .vendor_fields(["Price", "Cost"]);
        assert_eq!(config.total_columns(), MAX_COLUMNS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn too_many_vendors_in_toml() {
        let vendors: Vec<String> = (0..22_000).map(|i| format!("\"V{i}\"")).collect();
        let input = format!("vendors = [{}]", vendors.join(", "));

        let err = BomConfig::from_toml_str(&input).unwrap_err();
        assert!(err.to_string().contains("16384"));
    }

    #[test]
    fn single_field_disables_cost_formula() {
        let config = BomConfig::default().vendor_fields(["Link"]);
        assert!(config.validate().is_ok());
        assert!(!config.has_cost_formula());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "sum_label = \"Total:\"").unwrap();

        let config = BomConfig::load(file.path()).unwrap();
        assert_eq!(config.sum_label, "Total:");
    }

    #[test]
    fn load_missing_file() {
        let err = BomConfig::load(Path::new("/nonexistent/netbom.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
