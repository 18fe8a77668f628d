//! # netbom-core
//!
//! Core domain model for turning a netlist's parts list into a bill of materials.
//!
//! This crate provides:
//! - Domain types: `Component`, `ComponentGroup`, `BomRow`
//! - The `Equivalence` policy and the grouping engine
//! - `BomConfig`: vendor blocks, colors and labels for the spreadsheet
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use netbom_core::{build_rows, group_components, Component, PartEquivalence};
//!
//! let components = vec![
//!     Component::new("R1").value("10k").footprint("R_0402"),
//!     Component::new("R2").value("10k").footprint("R_0402"),
//!     Component::new("C1").value("100nF").footprint("C_0402"),
//! ];
//!
//! let groups = group_components(components, &PartEquivalence).unwrap();
//! let rows = build_rows(&groups);
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].references, "R1, R2");
//! assert_eq!(rows[0].quantity, 2);
//! ```

pub mod config;
pub mod group;
pub mod row;

pub use config::{BomConfig, ColorConfig, Palette};
pub use group::{group_components, ComponentGroup, Equivalence, PartEquivalence};
pub use row::{build_rows, BomRow, REFERENCE_SEPARATOR};

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Components
// ============================================================================

/// A single placed part, as read from the netlist
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Component {
    /// Reference designator (e.g. "R1")
    pub reference: String,
    /// Value field (e.g. "10k")
    pub value: String,
    /// Symbol name within its library (e.g. "R")
    pub part_name: String,
    /// Symbol library name (e.g. "Device")
    pub library_name: String,
    /// Footprint identifier, `library:footprint`
    pub footprint: String,
    /// Datasheet link, empty when unknown
    pub datasheet: String,
    /// Library description of the symbol
    pub description: String,
    /// Do Not Populate
    pub dnp: bool,
    /// Marked to be left out of the bill of materials
    pub exclude_from_bom: bool,
    /// Marked to be left off the board
    pub exclude_from_board: bool,
    /// User fields (MPN, manufacturer, ...)
    pub fields: BTreeMap<String, String>,
}

impl Component {
    /// Create a component with the given reference designator
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    /// Set the value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set library and part name
    pub fn part(mut self, library: impl Into<String>, part: impl Into<String>) -> Self {
        self.library_name = library.into();
        self.part_name = part.into();
        self
    }

    /// Set the footprint
    pub fn footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = footprint.into();
        self
    }

    /// Set the datasheet link
    pub fn datasheet(mut self, datasheet: impl Into<String>) -> Self {
        self.datasheet = datasheet.into();
        self
    }

    /// Set the library description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as Do Not Populate
    pub fn dnp(mut self) -> Self {
        self.dnp = true;
        self
    }

    /// Mark as excluded from the BOM
    pub fn exclude_from_bom(mut self) -> Self {
        self.exclude_from_bom = true;
        self
    }

    /// Add a user field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// `library:part`, as shown in the Name column
    pub fn display_name(&self) -> String {
        format!("{}:{}", self.library_name, self.part_name)
    }

    /// "DNP" when the part is not populated, empty otherwise
    pub fn dnp_string(&self) -> &'static str {
        if self.dnp {
            "DNP"
        } else {
            ""
        }
    }

    /// The fields that decide whether two components are the same part
    pub fn equivalence_key(&self) -> EquivalenceKey<'_> {
        EquivalenceKey {
            value: &self.value,
            part_name: &self.part_name,
            footprint: &self.footprint,
            dnp: self.dnp,
        }
    }
}

/// (value, part name, footprint, DNP) borrowed from a component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EquivalenceKey<'a> {
    pub value: &'a str,
    pub part_name: &'a str,
    pub footprint: &'a str,
    pub dnp: bool,
}

// ============================================================================
// Fixed columns
// ============================================================================

/// The fixed BOM columns, left of the vendor blocks, in sheet order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedColumn {
    Id,
    Quantity,
    References,
    Value,
    Name,
    Footprint,
    Datasheet,
    Dnp,
}

impl FixedColumn {
    /// All fixed columns in sheet order
    pub const ALL: [FixedColumn; 8] = [
        FixedColumn::Id,
        FixedColumn::Quantity,
        FixedColumn::References,
        FixedColumn::Value,
        FixedColumn::Name,
        FixedColumn::Footprint,
        FixedColumn::Datasheet,
        FixedColumn::Dnp,
    ];

    /// Header label
    pub const fn label(self) -> &'static str {
        match self {
            FixedColumn::Id => "Id",
            FixedColumn::Quantity => "Qty",
            FixedColumn::References => "Reference(s)",
            FixedColumn::Value => "Value",
            FixedColumn::Name => "Name",
            FixedColumn::Footprint => "Footprint",
            FixedColumn::Datasheet => "Datasheet",
            FixedColumn::Dnp => "DNP",
        }
    }

    /// Zero-based column index
    pub fn index(self) -> u16 {
        Self::ALL.iter().position(|c| *c == self).unwrap_or_default() as u16
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output backend for a finished list of BOM rows
pub trait Renderer {
    type Output;

    /// Render the rows to the output format
    fn render(&self, rows: &[BomRow]) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from grouping and row building
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BomError {
    #[error("Duplicate reference designator: {0}")]
    DuplicateReference(String),

    #[error("Component group must contain at least one component")]
    EmptyGroup,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid color for '{name}': {value} (expected RRGGBB or AARRGGBB hex)")]
    InvalidColor { name: &'static str, value: String },

    #[error("Vendor #{0} has an empty name")]
    EmptyVendorName(usize),

    #[error("At least one vendor field is required")]
    NoVendorFields,

    #[error("Sheet needs {columns} columns; a worksheet holds at most {max}")]
    TooManyColumns { columns: usize, max: usize },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
