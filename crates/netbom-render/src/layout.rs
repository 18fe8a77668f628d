//! Sheet layout: where every header label, BOM field and formula goes
//!
//! Coordinates are zero-based `(row, column)` like rust_xlsxwriter's; formula
//! text uses Excel's 1-based A1 references.
//!
//! ```text
//! row 0 | Id | Qty | Reference(s) | ... | DNP |      Mouser       |      Digikey      |
//! row 1 |    |     |              |     |     | Price | Cost | Link | Price | Cost | Link |
//! row 2 | 1  | 2   | R1, R2       | ... |     |       | =B3*I3 |    |       | =B3*L3 |    |
//! row 3 |    |     |              |     |     | Sum:  | =SUM(J3:J3) | | Sum: | =SUM(M3:M3) | |
//! ```

use std::collections::BTreeMap;

use netbom_core::config::{COST_FIELD, MAX_COLUMNS, PRICE_FIELD};
use netbom_core::{BomConfig, BomRow, FixedColumn, RenderError};

use crate::style::CellStyle;

/// Rows taken by the header: labels, then vendor field labels
pub const HEADER_ROWS: u32 = 2;
/// First BOM row
pub const FIRST_DATA_ROW: u32 = HEADER_ROWS;
/// Last zero-based worksheet row, used by the footer
const MAX_ROW: u32 = 1_048_575;
/// Added to a fixed column's label length to get its width
pub const COLUMN_WIDTH_PADDING: f64 = 4.0;

static BLANK: CellValue = CellValue::Blank;

/// Column positions, all derived from the fixed column list and the
/// vendor block shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    vendor_count: u16,
    fields_per_vendor: u16,
}

impl ColumnLayout {
    /// Column positions for `vendor_count` blocks of `fields_per_vendor`
    /// columns; fails when the sheet would not fit in a worksheet
    pub fn new(vendor_count: usize, fields_per_vendor: usize) -> Result<Self, RenderError> {
        let total = vendor_count
            .saturating_mul(fields_per_vendor)
            .saturating_add(FixedColumn::ALL.len());
        let too_wide = || {
            RenderError::InvalidData(format!(
                "{vendor_count} vendors x {fields_per_vendor} fields need {total} columns, \
                 a worksheet holds at most {MAX_COLUMNS}"
            ))
        };
        if total > MAX_COLUMNS {
            return Err(too_wide());
        }
        Ok(Self {
            vendor_count: u16::try_from(vendor_count).map_err(|_| too_wide())?,
            fields_per_vendor: u16::try_from(fields_per_vendor).map_err(|_| too_wide())?,
        })
    }

    pub fn from_config(config: &BomConfig) -> Result<Self, RenderError> {
        Self::new(config.vendors.len(), config.vendor_fields.len())
    }

    pub fn fixed_count(&self) -> u16 {
        FixedColumn::ALL.len() as u16
    }

    pub fn vendor_count(&self) -> usize {
        self.vendor_count as usize
    }

    pub fn fields_per_vendor(&self) -> usize {
        self.fields_per_vendor as usize
    }

    pub fn column(&self, column: FixedColumn) -> u16 {
        column.index()
    }

    pub fn quantity(&self) -> u16 {
        self.column(FixedColumn::Quantity)
    }

    /// First column of a vendor block
    pub fn vendor_start(&self, vendor: usize) -> u16 {
        self.fixed_count() + vendor as u16 * self.fields_per_vendor
    }

    /// Last column of a vendor block
    pub fn vendor_end(&self, vendor: usize) -> u16 {
        self.vendor_start(vendor) + self.fields_per_vendor.saturating_sub(1)
    }

    pub fn vendor_field(&self, vendor: usize, field: usize) -> u16 {
        self.vendor_start(vendor) + field as u16
    }

    pub fn price(&self, vendor: usize) -> u16 {
        self.vendor_field(vendor, PRICE_FIELD)
    }

    pub fn cost(&self, vendor: usize) -> u16 {
        self.vendor_field(vendor, COST_FIELD)
    }

    /// Whether vendor blocks are wide enough for price and cost
    pub fn has_cost_formula(&self) -> bool {
        self.fields_per_vendor as usize > COST_FIELD
    }

    pub fn total_columns(&self) -> u16 {
        self.fixed_count() + self.vendor_count * self.fields_per_vendor
    }

    /// Whether `col` opens a vendor block
    pub fn is_vendor_start(&self, col: u16) -> bool {
        let fixed = self.fixed_count();
        self.fields_per_vendor > 0
            && col >= fixed
            && col < self.total_columns()
            && (col - fixed) % self.fields_per_vendor == 0
    }
}

/// Cell content
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Blank,
    Text(String),
    Number(f64),
    /// Formula text including the leading `=`
    Formula(String),
}

impl CellValue {
    /// Text, or `Blank` for an empty string
    pub fn text(s: &str) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(s.to_string())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// An inclusive rectangle of merged cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl MergeRange {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn width(&self) -> u16 {
        self.last_col - self.first_col + 1
    }

    pub fn height(&self) -> u32 {
        self.last_row - self.first_row + 1
    }
}

/// Horizontal band a row belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// Row 0: column and vendor labels
    Header,
    /// Row 1: vendor field labels
    HeaderSubRow,
    /// BOM line, `index` counts from 0
    Data { index: u32 },
    Footer,
}

/// The whole BOM sheet, before styling and serialization
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    columns: ColumnLayout,
    data_rows: u32,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<MergeRange>,
    column_widths: BTreeMap<u16, f64>,
}

impl SheetLayout {
    /// Lay out header, one row per BOM line, cost formulas and the footer
    pub fn generate(rows: &[BomRow], config: &BomConfig) -> Result<Self, RenderError> {
        let data_rows = u32::try_from(rows.len())
            .ok()
            .filter(|n| n.saturating_add(FIRST_DATA_ROW) <= MAX_ROW)
            .ok_or_else(|| {
                RenderError::InvalidData(format!("{} BOM lines do not fit in a worksheet", rows.len()))
            })?;
        let mut layout = Self {
            columns: ColumnLayout::from_config(config)?,
            data_rows,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        };

        layout.write_header(config);
        for (index, row) in rows.iter().enumerate() {
            layout.write_row(FIRST_DATA_ROW + index as u32, row);
        }
        layout.write_footer(config);
        Ok(layout)
    }

    pub fn columns(&self) -> ColumnLayout {
        self.columns
    }

    pub fn data_rows(&self) -> u32 {
        self.data_rows
    }

    pub fn footer_row(&self) -> u32 {
        FIRST_DATA_ROW + self.data_rows
    }

    pub fn region(&self, row: u32) -> Option<Region> {
        match row {
            0 => Some(Region::Header),
            1 => Some(Region::HeaderSubRow),
            r if r < self.footer_row() => Some(Region::Data {
                index: r - FIRST_DATA_ROW,
            }),
            r if r == self.footer_row() => Some(Region::Footer),
            _ => None,
        }
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Content at `(row, col)`, `Blank` when nothing was written
    pub fn value(&self, row: u32, col: u16) -> &CellValue {
        self.cell(row, col).map_or(&BLANK, |c| &c.value)
    }

    /// Every written or styled cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Style slot of a cell, creating a blank cell if needed
    pub(crate) fn style_mut(&mut self, row: u32, col: u16) -> &mut CellStyle {
        &mut self.cells.entry((row, col)).or_default().style
    }

    fn put(&mut self, row: u32, col: u16, value: CellValue) {
        self.cells.entry((row, col)).or_default().value = value;
    }

    fn write_header(&mut self, config: &BomConfig) {
        for column in FixedColumn::ALL {
            let col = self.columns.column(column);
            self.put(0, col, CellValue::text(column.label()));
            self.merges.push(MergeRange::new(0, col, HEADER_ROWS - 1, col));
        }

        for (vendor, name) in config.vendors.iter().enumerate() {
            let first = self.columns.vendor_start(vendor);
            let last = self.columns.vendor_end(vendor);
            self.put(0, first, CellValue::text(name));
            if last > first {
                self.merges.push(MergeRange::new(0, first, 0, last));
            }
            for (field, label) in config.vendor_fields.iter().enumerate() {
                let col = self.columns.vendor_field(vendor, field);
                self.put(1, col, CellValue::text(label));
            }
        }
    }

    fn write_row(&mut self, row: u32, bom: &BomRow) {
        for column in FixedColumn::ALL {
            let value = match column {
                FixedColumn::Id => CellValue::Number(bom.item_id as f64),
                FixedColumn::Quantity => CellValue::Number(bom.quantity as f64),
                FixedColumn::References => CellValue::text(&bom.references),
                FixedColumn::Value => CellValue::text(&bom.value),
                FixedColumn::Name => CellValue::text(&bom.display_name),
                FixedColumn::Footprint => CellValue::text(&bom.footprint),
                FixedColumn::Datasheet => CellValue::text(&bom.datasheet),
                FixedColumn::Dnp => CellValue::text(&bom.dnp),
            };
            self.put(row, self.columns.column(column), value);
        }

        if self.columns.has_cost_formula() {
            for vendor in 0..self.columns.vendor_count() {
                let formula = cost_formula(&self.columns, row, vendor);
                self.put(row, self.columns.cost(vendor), CellValue::Formula(formula));
            }
        }
    }

    fn write_footer(&mut self, config: &BomConfig) {
        if !self.columns.has_cost_formula() {
            return;
        }
        let row = self.footer_row();
        for vendor in 0..self.columns.vendor_count() {
            let formula = sum_formula(&self.columns, vendor, self.data_rows);
            self.put(row, self.columns.price(vendor), CellValue::text(&config.sum_label));
            self.put(row, self.columns.cost(vendor), CellValue::Formula(formula));
        }
    }
}

/// Width of a fixed column: label length plus padding
pub fn fixed_column_width(label: &str) -> f64 {
    label.chars().count() as f64 + COLUMN_WIDTH_PADDING
}

/// Convert column number to Excel letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letter(col: u16) -> String {
    let mut result = String::new();
    let mut n = col as u32;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A1-style reference for a zero-based cell
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// `=<quantity>*<price>` for one vendor on one BOM row
pub fn cost_formula(columns: &ColumnLayout, row: u32, vendor: usize) -> String {
    format!(
        "={}*{}",
        cell_ref(row, columns.quantity()),
        cell_ref(row, columns.price(vendor))
    )
}

/// Sum of a vendor's cost column over all BOM rows; `=0` without rows
pub fn sum_formula(columns: &ColumnLayout, vendor: usize, data_rows: u32) -> String {
    if data_rows == 0 {
        return "=0".to_string();
    }
    let col = columns.cost(vendor);
    format!(
        "=SUM({}:{})",
        cell_ref(FIRST_DATA_ROW, col),
        cell_ref(FIRST_DATA_ROW + data_rows - 1, col)
    )
}
