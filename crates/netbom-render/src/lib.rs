//! # netbom-render
//!
//! Spreadsheet output for netbom BOM rows.
//!
//! Rendering happens in three steps:
//! - [`SheetLayout::generate`] places header labels, BOM fields, cost formulas
//!   and the footer
//! - [`apply_styles`] assigns fills, borders and column widths
//! - [`ExcelRenderer`] serializes the styled layout to XLSX with rust_xlsxwriter
//!
//! ## Example
//!
//! ```rust
//! use netbom_core::{build_rows, group_components, Component, PartEquivalence, Renderer};
//! use netbom_render::ExcelRenderer;
//!
//! let parts = vec![
//!     Component::new("R1").value("10k").part("Device", "R"),
//!     Component::new("R2").value("10k").part("Device", "R"),
//! ];
//! let groups = group_components(parts, &PartEquivalence).unwrap();
//! let rows = build_rows(&groups);
//!
//! let renderer = ExcelRenderer::new().vendors(["Mouser", "Digikey"]);
//! let xlsx = renderer.render(&rows).unwrap();
//! assert_eq!(&xlsx[0..2], b"PK");
//! ```

pub mod excel;
pub mod layout;
pub mod style;

pub use excel::ExcelRenderer;
pub use layout::{
    col_to_letter, Cell, CellValue, ColumnLayout, MergeRange, Region, SheetLayout,
    FIRST_DATA_ROW, HEADER_ROWS,
};
pub use style::{apply_styles, BorderWeight, Borders, CellStyle};
