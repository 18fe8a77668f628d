//! XLSX BOM renderer
//!
//! Serializes a styled [`SheetLayout`] into a single-sheet workbook with
//! rust_xlsxwriter. Merged ranges are written first, then every cell is
//! written with its own format so edge borders inside a merge survive.

use std::collections::HashMap;
use std::path::Path;

use netbom_core::{BomConfig, BomRow, Palette, RenderError, Renderer};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::layout::{CellValue, SheetLayout};
use crate::style::{apply_styles, BorderWeight, CellStyle};

/// Excel BOM renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Worksheet name
    pub sheet_name: String,
    /// Vendor blocks, footer label and colors
    pub config: BomConfig,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_name: "BOM".into(),
            config: BomConfig::default(),
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BomConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn vendors<S: Into<String>>(mut self, vendors: impl IntoIterator<Item = S>) -> Self {
        self.config = self.config.vendors(vendors);
        self
    }

    pub fn vendor_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.config = self.config.vendor_fields(fields);
        self
    }

    /// Laid out and styled sheet, without serializing it
    pub fn layout(&self, rows: &[BomRow]) -> Result<SheetLayout, RenderError> {
        self.styled_layout(rows).map(|(layout, _)| layout)
    }

    fn styled_layout(&self, rows: &[BomRow]) -> Result<(SheetLayout, Palette), RenderError> {
        let palette = self
            .config
            .palette()
            .map_err(|e| RenderError::InvalidData(e.to_string()))?;

        let mut layout = SheetLayout::generate(rows, &self.config)?;
        apply_styles(&mut layout, &palette);
        Ok((layout, palette))
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, rows: &[BomRow]) -> Result<Vec<u8>, RenderError> {
        let (layout, palette) = self.styled_layout(rows)?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).map_err(format_error)?;

        let mut formats = FormatCache::new(palette.border);
        write_layout(sheet, &layout, &mut formats)?;

        debug!(
            rows = layout.data_rows(),
            columns = layout.columns().total_columns(),
            formats = formats.len(),
            "rendered BOM sheet"
        );

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        Ok(buffer)
    }

    /// Render and write the workbook to `path`
    pub fn save(&self, rows: &[BomRow], path: &Path) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(rows)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, rows: &[BomRow]) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(rows)
    }
}

fn format_error(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

/// One `Format` per distinct cell style
struct FormatCache {
    border_color: u32,
    formats: HashMap<CellStyle, Format>,
}

impl FormatCache {
    fn new(border_color: u32) -> Self {
        Self {
            border_color,
            formats: HashMap::new(),
        }
    }

    fn get(&mut self, style: CellStyle) -> &Format {
        let border_color = self.border_color;
        self.formats
            .entry(style)
            .or_insert_with(|| create_format(style, border_color))
    }

    fn len(&self) -> usize {
        self.formats.len()
    }
}

fn border(weight: BorderWeight) -> FormatBorder {
    match weight {
        BorderWeight::None => FormatBorder::None,
        BorderWeight::Thin => FormatBorder::Thin,
        BorderWeight::Medium => FormatBorder::Medium,
    }
}

fn create_format(style: CellStyle, border_color: u32) -> Format {
    let mut format = Format::new();
    if let Some(fill) = style.fill {
        format = format.set_background_color(fill);
    }
    if !style.border.is_none() {
        format = format
            .set_border_top(border(style.border.top))
            .set_border_right(border(style.border.right))
            .set_border_bottom(border(style.border.bottom))
            .set_border_left(border(style.border.left))
            .set_border_color(border_color);
    }
    if style.centered {
        format = format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    format
}

fn write_layout(
    sheet: &mut Worksheet,
    layout: &SheetLayout,
    formats: &mut FormatCache,
) -> Result<(), RenderError> {
    for merge in layout.merges() {
        if merge.width() == 1 && merge.height() == 1 {
            continue;
        }
        let anchor = layout.cell(merge.first_row, merge.first_col);
        let text = match anchor.map(|c| &c.value) {
            Some(CellValue::Text(text)) => text.as_str(),
            _ => "",
        };
        let style = anchor.map(|c| c.style).unwrap_or_default();
        sheet
            .merge_range(
                merge.first_row,
                merge.first_col,
                merge.last_row,
                merge.last_col,
                text,
                formats.get(style),
            )
            .map_err(format_error)?;
    }

    for ((row, col), cell) in layout.cells() {
        let format = formats.get(cell.style);
        match &cell.value {
            CellValue::Blank => sheet.write_blank(row, col, format),
            CellValue::Text(text) => sheet.write_string_with_format(row, col, text, format),
            CellValue::Number(n) => sheet.write_number_with_format(row, col, *n, format),
            CellValue::Formula(f) => sheet.write_formula_with_format(row, col, f.as_str(), format),
        }
        .map_err(format_error)?;
    }

    for (col, width) in layout.column_widths() {
        sheet.set_column_width(col, width).map_err(format_error)?;
    }

    Ok(())
}
